//! Rewriting fetched chapters into linked vault documents.
//!
//! A raw chapter from the converter has three regions, in order:
//!
//! 1. a title line starting with `# `
//! 2. verse lines starting with `###### `
//! 3. optionally, a footnote block starting with `### Footnotes`
//!
//! The rewriter makes a single pass over the lines. It inserts the navigation
//! block after the title and again before the footnotes, and splits every verse
//! line into a reference line and a text line.

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;

const TITLE_MARKER: &str = "# ";
const VERSE_MARKER: &str = "###### ";
const FOOTNOTES_MARKER: &str = "### Footnotes";

/// The region of the document the scanner is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Region {
    /// No title seen yet.
    #[default]
    BeforeTitle,
    /// Past the title, reading verses.
    Verses,
    /// Inside the footnote block. Everything from here on is copied verbatim.
    Footnotes,
}

/// Splits a verse line into its reference and text.
///
/// The reference runs from the start of the line up to the first space after
/// the verse marker; the text is everything from that space on, without the
/// line terminator. `###### 3 In the beginning` splits into `###### 3` and
/// ` In the beginning`.
///
/// Returns `None` if the line is not a verse line or has no space after the
/// verse number.
#[must_use]
pub fn split_verse(line: &str) -> Option<(&str, &str)> {
    let body = line.strip_prefix(VERSE_MARKER)?;
    let split = VERSE_MARKER.len() + body.find(' ')?;
    let (reference, text) = line.split_at(split);
    Some((reference, trim_line_ending(text)))
}

fn trim_line_ending(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// The result of rewriting a chapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewritten {
    text: String,
    region: Region,
}

impl Rewritten {
    /// The rewritten document.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Consumes the result, returning the rewritten document.
    #[must_use]
    pub fn into_text(self) -> String {
        self.text
    }

    /// The region the scanner finished in.
    #[must_use]
    pub const fn region(&self) -> Region {
        self.region
    }

    /// Whether a title was found and navigation inserted.
    ///
    /// When this is `false` the document was passed through unchanged.
    #[must_use]
    pub fn is_linked(&self) -> bool {
        self.region != Region::BeforeTitle
    }

    /// Whether a footnote block was found.
    #[must_use]
    pub fn has_footnotes(&self) -> bool {
        self.region == Region::Footnotes
    }
}

struct Scanner<'a> {
    navigation: &'a str,
    region: Region,
    out: String,
}

impl<'a> Scanner<'a> {
    fn new(navigation: &'a str, capacity: usize) -> Self {
        Self {
            navigation,
            region: Region::BeforeTitle,
            out: String::with_capacity(capacity),
        }
    }

    fn push_navigation(&mut self) {
        self.out.push_str(self.navigation);
        self.out.push_str("\n\n");
    }

    fn push_line(&mut self, line: &str) {
        match self.region {
            Region::BeforeTitle => {
                self.out.push_str(line);
                if line.starts_with(TITLE_MARKER) {
                    if !line.ends_with('\n') {
                        self.out.push('\n');
                    }
                    self.out.push('\n');
                    self.push_navigation();
                    self.region = Region::Verses;
                }
            }
            Region::Verses => {
                if let Some((reference, text)) = split_verse(line) {
                    self.out.push_str(reference);
                    self.out.push('\n');
                    self.out.push_str(text);
                    self.out.push('\n');
                } else {
                    if line.starts_with(FOOTNOTES_MARKER) {
                        self.push_navigation();
                        self.region = Region::Footnotes;
                    }
                    self.out.push_str(line);
                }
            }
            Region::Footnotes => self.out.push_str(line),
        }
    }

    fn finish(self) -> Rewritten {
        Rewritten {
            text: self.out,
            region: self.region,
        }
    }
}

/// Rewrites a raw chapter, splicing in `navigation`.
///
/// `navigation` is the rendered block without a trailing newline; see
/// [`Navigation`](crate::domain::Navigation). Lines that are not markers are
/// copied through byte for byte.
#[must_use]
pub fn rewrite(raw: &str, navigation: &str) -> Rewritten {
    let mut scanner = Scanner::new(navigation, raw.len() + 2 * navigation.len() + 8);
    for line in raw.split_inclusive('\n') {
        scanner.push_line(line);
    }
    scanner.finish()
}

/// Writes `contents` to `path` atomically.
///
/// The data is written to a temporary file in the same directory, which is
/// then renamed over `path`. If anything fails the temporary file is removed
/// and `path` is left untouched. Missing parent directories are created.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file cannot be
/// written or renamed into place.
pub fn write_atomic(path: &Path, contents: &str) -> Result<(), WriteError> {
    let wrap = |source| WriteError {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(wrap)?;

    let mut file = NamedTempFile::new_in(dir).map_err(wrap)?;
    file.write_all(contents.as_bytes()).map_err(wrap)?;
    file.as_file().sync_all().map_err(wrap)?;
    file.persist(path).map_err(|e| wrap(e.error))?;

    Ok(())
}

/// Error returned when a chapter file cannot be written.
#[derive(Debug, thiserror::Error)]
#[error("failed to write {}", path.display())]
pub struct WriteError {
    /// The file being written.
    pub path: PathBuf,
    /// The underlying I/O error.
    #[source]
    pub source: io::Error,
}
