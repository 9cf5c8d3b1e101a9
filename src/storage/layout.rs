use std::path::PathBuf;

use crate::domain::{Namer, Section};

/// Where each chapter lives on disk.
///
/// `<output>/<version>/<book folder>/<chapter file>.md`, with the version in
/// lowercase.
#[derive(Debug, Clone, Copy)]
pub struct Layout<'a> {
    namer: Namer<'a>,
}

impl<'a> Layout<'a> {
    /// Creates a layout using the given namer.
    #[must_use]
    pub const fn new(namer: Namer<'a>) -> Self {
        Self { namer }
    }

    /// The namer used to build file and folder names.
    #[must_use]
    pub const fn namer(&self) -> &Namer<'a> {
        &self.namer
    }

    /// The directory holding every book of this version.
    #[must_use]
    pub fn version_dir(&self) -> PathBuf {
        let config = self.namer.config();
        config.output().join(config.version().lowercase())
    }

    /// The folder for a book.
    #[must_use]
    pub fn book_dir(&self, section: &Section) -> PathBuf {
        self.version_dir().join(self.namer.folder_name(section))
    }

    /// The markdown file for a chapter.
    #[must_use]
    pub fn chapter_path(&self, section: &Section, chapter: usize) -> PathBuf {
        // not `with_extension`: a template may put a '.' in the file name
        let file_name = format!("{}.md", self.namer.file_name(section, chapter));
        self.book_dir(section).join(file_name)
    }
}
