//! Folder and file names for books and chapters.
//!
//! Indices are zero-padded to a width chosen from the *size* of the range they
//! belong to, not from the index itself. Every chapter of Psalms is three
//! digits wide (`001` to `150`), every chapter of Genesis two (`01` to `50`),
//! so names sort correctly within a book.

use super::{
    catalog::{Catalog, Section, UnknownSection},
    config::RunConfig,
    template::Fields,
};

/// The padding width for indices in a range of `count` items.
///
/// One digit up to 9, two up to 99, three beyond.
#[must_use]
pub const fn pad_width(count: usize) -> usize {
    if count <= 9 {
        1
    } else if count <= 99 {
        2
    } else {
        3
    }
}

/// Formats `index` zero-padded for a range of `count` items.
#[must_use]
pub fn pad(index: usize, count: usize) -> String {
    format!("{index:0width$}", width = pad_width(count))
}

/// Produces folder and file names for a run.
#[derive(Debug, Clone, Copy)]
pub struct Namer<'a> {
    catalog: &'a Catalog,
    config: &'a RunConfig,
}

impl<'a> Namer<'a> {
    /// Creates a namer over the given catalog and run configuration.
    #[must_use]
    pub const fn new(catalog: &'a Catalog, config: &'a RunConfig) -> Self {
        Self { catalog, config }
    }

    /// The catalog names are drawn from.
    #[must_use]
    pub const fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    /// The run configuration names are drawn from.
    #[must_use]
    pub const fn config(&self) -> &'a RunConfig {
        self.config
    }

    /// The book name with spaces replaced by the configured divider.
    #[must_use]
    pub fn book_for_file(&self, section: &Section) -> String {
        section.name().replace(' ', self.config.divider())
    }

    /// The folder name for a book.
    ///
    /// The `{order}` placeholder is the book's position in the catalog, padded
    /// against the number of books.
    #[must_use]
    pub fn folder_name(&self, section: &Section) -> String {
        let index = pad(section.order(), self.catalog.len());
        self.render_folder(section, &index)
    }

    /// The file name for a chapter, without the `.md` extension.
    ///
    /// The `{chapter}` placeholder is padded against the book's chapter count.
    #[must_use]
    pub fn file_name(&self, section: &Section, chapter: usize) -> String {
        let index = pad(chapter, section.chapters());
        let book = self.book_for_file(section);
        self.config.file_template().render(&Fields {
            book: &book,
            index: &index,
            version: self.config.version().as_str(),
        })
    }

    /// The file name for a chapter of the named book.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownSection`] if the book is not in the catalog.
    pub fn file_name_for(&self, book: &str, chapter: usize) -> Result<String, UnknownSection> {
        let section = self.catalog.section(book)?;
        Ok(self.file_name(section, chapter))
    }

    /// The folder name for the named book.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownSection`] if the book is not in the catalog.
    pub fn folder_name_for(&self, book: &str) -> Result<String, UnknownSection> {
        let section = self.catalog.section(book)?;
        Ok(self.folder_name(section))
    }

    fn render_folder(&self, section: &Section, index: &str) -> String {
        let book = self.book_for_file(section);
        self.config.folder_template().render(&Fields {
            book: &book,
            index,
            version: self.config.version().as_str(),
        })
    }
}
