use bible_vault::Catalog;
use clap::Parser;
use serde_json::json;
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Parser, Default)]
pub struct Books {
    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl Books {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self) -> anyhow::Result<()> {
        let catalog = Catalog::bible();
        match self.output {
            OutputFormat::Table => println!("{}", Self::table(&catalog)),
            OutputFormat::Json => println!("{}", Self::json(&catalog)?),
        }
        Ok(())
    }

    fn table(catalog: &Catalog) -> String {
        let name_width = catalog
            .iter()
            .map(|section| section.name().len())
            .max()
            .unwrap_or(0);

        let mut out = format!("{:>3}  {:<name_width$}  {:>8}", "#", "Book", "Chapters").dim();
        for section in catalog {
            out.push_str(&format!(
                "\n{:>3}  {:<name_width$}  {:>8}",
                section.order(),
                section.name(),
                section.chapters()
            ));
        }
        out.push_str(&format!(
            "\n\n{} books, {} chapters",
            catalog.len(),
            catalog.total_chapters()
        ));
        out
    }

    fn json(catalog: &Catalog) -> serde_json::Result<String> {
        let books: Vec<_> = catalog.iter().collect();
        serde_json::to_string_pretty(&json!({
            "books": books,
            "total_chapters": catalog.total_chapters(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_lists_every_book() {
        let catalog = Catalog::bible();
        let value: serde_json::Value = serde_json::from_str(&Books::json(&catalog).unwrap()).unwrap();

        assert_eq!(value["total_chapters"], 1189);
        let books = value["books"].as_array().unwrap();
        assert_eq!(books.len(), 66);
        assert_eq!(books[18]["name"], "Psalms");
        assert_eq!(books[18]["order"], 19);
        assert_eq!(books[18]["chapters"], 150);
    }

    #[test]
    fn table_ends_with_totals() {
        let table = Books::table(&Catalog::from_entries(&[("Ruth", 4), ("Jude", 1)]));
        assert!(table.ends_with("2 books, 5 chapters"));
        assert!(table.contains("Ruth"));
    }
}
