use std::{path::PathBuf, process};

use anyhow::Context;
use bible_vault::{
    Catalog, Converter, Downloader, Exclusions, Layout, Namer, RateLimited, RunConfig, RunSummary,
    Settings, Version,
};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Parser)]
#[allow(clippy::struct_excessive_bools)]
pub struct Download {
    /// REQUIRED - the bible version to download, e.g. 'kjv'
    #[arg(short = 'v', long = "version", value_name = "VERSION")]
    version: Version,

    /// Disable bolding the words of Jesus
    #[arg(short, long)]
    boldwords: bool,

    /// Exclude the copyright notice from files
    #[arg(short, long)]
    copyright: bool,

    /// Exclude editorial headers from files
    #[arg(short = 'e', long)]
    headers: bool,

    /// Exclude footnotes from files
    #[arg(short, long)]
    footnotes: bool,

    /// Exclude cross-references from files
    #[arg(short = 'r', long)]
    crossrefs: bool,

    /// Replacement for spaces in book file/folder names, e.g. in '1 Samuel'
    /// or 'Song of Solomon' [default: '_']
    #[arg(short, long)]
    divider: Option<String>,

    /// Format for chapter file names [default: '{version}-{book}-{chapter}']
    ///
    /// Use '{Book}' and '{Version}' for capitalised variants.
    #[arg(long, value_name = "FORMAT")]
    chaptername: Option<String>,

    /// Format for book folder names [default: '{version}-{order}-{book}']
    ///
    /// Use '{Book}' and '{Version}' for capitalised variants.
    #[arg(long, value_name = "FORMAT")]
    bookname: Option<String>,

    /// Directory to write the vault into [default: 'bin']
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Minimum pause between converter calls, in milliseconds [default: 100]
    #[arg(long, value_name = "MS")]
    cooldown_ms: Option<u64>,

    /// Kill a converter call that runs longer than this, in seconds [default:
    /// 60]
    #[arg(long, value_name = "SECS")]
    timeout_secs: Option<u64>,

    /// Read default settings from a TOML file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

impl Download {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self) -> anyhow::Result<()> {
        let exclusions = self.exclusions();
        let version = self.version.clone();
        let settings = self.settings()?;
        let config = RunConfig::new(version, settings, exclusions)
            .context("invalid download settings")?;

        let catalog = Catalog::bible();
        let layout = Layout::new(Namer::new(&catalog, &config));
        let fetcher = RateLimited::new(Converter::new(&config), config.cooldown());

        let progress = ProgressBar::new(0).with_style(Self::progress_style()?);
        let mut downloader = Downloader::new(layout, fetcher).with_progress(progress);
        let summary = downloader.run();

        Self::report(&summary, &layout.version_dir());

        if !summary.is_clean() {
            process::exit(1);
        }
        println!("{}", "FINISHED!".success());
        Ok(())
    }

    /// The bar position counts skipped and failed chapters as well as
    /// downloaded ones.
    const PROGRESS: &str = "{msg} - {pos}/{len} chapters processed.";

    fn progress_style() -> Result<ProgressStyle, indicatif::style::TemplateError> {
        ProgressStyle::with_template(Self::PROGRESS)
    }

    const fn exclusions(&self) -> Exclusions {
        Exclusions {
            bold_words: self.boldwords,
            copyright: self.copyright,
            headers: self.headers,
            footnotes: self.footnotes,
            cross_references: self.crossrefs,
        }
    }

    /// Loads the settings file, if any, then applies command-line overrides.
    fn settings(self) -> anyhow::Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };

        if let Some(divider) = self.divider {
            settings.divider = divider;
        }
        if let Some(chaptername) = self.chaptername {
            settings.chapter_name = chaptername;
        }
        if let Some(bookname) = self.bookname {
            settings.book_name = bookname;
        }
        if let Some(output) = self.output {
            settings.output = output;
        }
        if let Some(cooldown_ms) = self.cooldown_ms {
            settings.cooldown_ms = cooldown_ms;
        }
        if let Some(timeout_secs) = self.timeout_secs {
            settings.timeout_secs = timeout_secs;
        }

        Ok(settings)
    }

    fn report(summary: &RunSummary, root: &std::path::Path) {
        println!(
            "{} downloaded, {} already present",
            summary.downloaded, summary.skipped
        );
        if summary.unlinked > 0 {
            println!(
                "{}",
                format!(
                    "⚠️  {} chapter(s) had no title and were saved without navigation",
                    summary.unlinked
                )
                .warning()
            );
        }
        if summary.failed > 0 {
            eprintln!(
                "{}",
                format!("❌ {} chapter(s) failed to download", summary.failed).failure()
            );
            eprintln!(
                "{}",
                format!(
                    "Run the same command again to retry; finished chapters in {} are kept.",
                    root.display()
                )
                .dim()
            );
        }
    }
}
