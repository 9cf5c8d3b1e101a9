//! The fixed, ordered catalog of books and their chapter counts.

use std::{fmt, ops::RangeInclusive};

use serde::Serialize;

/// A single book in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Section {
    name: &'static str,
    order: usize,
    chapters: usize,
}

impl Section {
    /// The display name of the book, e.g. `Song of Solomon`.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// The 1-based position of the book in the catalog.
    #[must_use]
    pub const fn order(&self) -> usize {
        self.order
    }

    /// The number of chapters in the book.
    #[must_use]
    pub const fn chapters(&self) -> usize {
        self.chapters
    }

    /// Iterates over the chapter numbers of this book, starting at 1.
    #[must_use]
    pub fn chapter_numbers(&self) -> RangeInclusive<usize> {
        1..=self.chapters
    }

    /// Returns `true` if `chapter` is a valid chapter number for this book.
    #[must_use]
    pub const fn contains(&self, chapter: usize) -> bool {
        chapter >= 1 && chapter <= self.chapters
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Error returned when a book name is not present in the catalog.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown book '{0}'")]
pub struct UnknownSection(pub String);

const BOOKS: [(&str, usize); 66] = [
    ("Genesis", 50),
    ("Exodus", 40),
    ("Leviticus", 27),
    ("Numbers", 36),
    ("Deuteronomy", 34),
    ("Joshua", 24),
    ("Judges", 21),
    ("Ruth", 4),
    ("1 Samuel", 31),
    ("2 Samuel", 24),
    ("1 Kings", 22),
    ("2 Kings", 25),
    ("1 Chronicles", 29),
    ("2 Chronicles", 36),
    ("Ezra", 10),
    ("Nehemiah", 13),
    ("Esther", 10),
    ("Job", 42),
    ("Psalms", 150),
    ("Proverbs", 31),
    ("Ecclesiastes", 12),
    ("Song of Solomon", 8),
    ("Isaiah", 66),
    ("Jeremiah", 52),
    ("Lamentations", 5),
    ("Ezekiel", 48),
    ("Daniel", 12),
    ("Hosea", 14),
    ("Joel", 3),
    ("Amos", 9),
    ("Obadiah", 1),
    ("Jonah", 4),
    ("Micah", 7),
    ("Nahum", 3),
    ("Habakkuk", 3),
    ("Zephaniah", 3),
    ("Haggai", 2),
    ("Zechariah", 14),
    ("Malachi", 4),
    ("Matthew", 28),
    ("Mark", 16),
    ("Luke", 24),
    ("John", 21),
    ("Acts", 28),
    ("Romans", 16),
    ("1 Corinthians", 16),
    ("2 Corinthians", 13),
    ("Galatians", 6),
    ("Ephesians", 6),
    ("Philippians", 4),
    ("Colossians", 4),
    ("1 Thessalonians", 5),
    ("2 Thessalonians", 3),
    ("1 Timothy", 6),
    ("2 Timothy", 4),
    ("Titus", 3),
    ("Philemon", 1),
    ("Hebrews", 13),
    ("James", 5),
    ("1 Peter", 5),
    ("2 Peter", 3),
    ("1 John", 5),
    ("2 John", 1),
    ("3 John", 1),
    ("Jude", 1),
    ("Revelation", 22),
];

/// The ordered list of every book to download.
///
/// The catalog is closed: it is built once and never mutated. Components
/// receive it by reference rather than reaching for a global.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    sections: Vec<Section>,
}

impl Catalog {
    /// The 66-book protestant canon.
    #[must_use]
    pub fn bible() -> Self {
        Self::from_entries(&BOOKS)
    }

    /// Builds a catalog from `(name, chapters)` pairs in order.
    ///
    /// Ordinal positions are assigned by insertion order, starting at 1.
    #[must_use]
    pub fn from_entries(entries: &[(&'static str, usize)]) -> Self {
        let sections = entries
            .iter()
            .enumerate()
            .map(|(i, &(name, chapters))| Section {
                name,
                order: i + 1,
                chapters,
            })
            .collect();
        Self { sections }
    }

    /// Looks up a book by its exact name.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownSection`] if no book has that name.
    pub fn section(&self, name: &str) -> Result<&Section, UnknownSection> {
        self.sections
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| UnknownSection(name.to_string()))
    }

    /// Iterates over the books in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    /// The number of books.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Returns `true` if the catalog holds no books.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// The total number of chapters across every book.
    #[must_use]
    pub fn total_chapters(&self) -> usize {
        self.sections.iter().map(Section::chapters).sum()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Section;
    type IntoIter = std::slice::Iter<'a, Section>;

    fn into_iter(self) -> Self::IntoIter {
        self.sections.iter()
    }
}
