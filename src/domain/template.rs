//! Name templates for book folders and chapter files.
//!
//! A template is a plain string with `{placeholder}` markers. Each placeholder
//! comes in a lowercase and a capitalised form:
//!
//! | placeholder               | renders                                        |
//! |---------------------------|------------------------------------------------|
//! | `{book}` / `{Book}`       | book name with spaces replaced, lower / as-is  |
//! | `{order}` / `{Order}`     | zero-padded index                              |
//! | `{chapter}` / `{Chapter}` | zero-padded index                              |
//! | `{version}` / `{Version}` | version, lowercase / uppercase                 |
//!
//! `{{` and `}}` produce literal braces.

use std::{fmt, str::FromStr, sync::LazyLock};

use regex::Regex;

static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{|\}\}|\{([^{}]*)\}|[{}]").expect("token pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placeholder {
    Book,
    BookLower,
    Index,
    Version,
    VersionLower,
}

impl FromStr for Placeholder {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Book" => Ok(Self::Book),
            "book" => Ok(Self::BookLower),
            "Order" | "order" | "Chapter" | "chapter" => Ok(Self::Index),
            "Version" => Ok(Self::Version),
            "version" => Ok(Self::VersionLower),
            other => Err(TemplateError::UnknownPlaceholder(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(Placeholder),
}

/// The values substituted into a [`NameTemplate`].
#[derive(Debug, Clone, Copy)]
pub struct Fields<'a> {
    /// Book name with the divider already substituted for spaces.
    pub book: &'a str,
    /// The zero-padded index (book order or chapter number).
    pub index: &'a str,
    /// The version identifier, uppercase.
    pub version: &'a str,
}

/// A validated file or folder name template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl NameTemplate {
    /// The default template for book folders.
    pub const DEFAULT_FOLDER: &'static str = "{version}-{order}-{book}";

    /// The default template for chapter files.
    pub const DEFAULT_FILE: &'static str = "{version}-{book}-{chapter}";

    /// Parses and validates a template.
    ///
    /// # Errors
    ///
    /// Returns an error if the template contains an unrecognised placeholder or
    /// a brace that is neither part of a placeholder nor escaped.
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut last = 0;

        for captures in TOKEN.captures_iter(source) {
            let Some(token) = captures.get(0) else {
                continue;
            };
            literal.push_str(&source[last..token.start()]);
            last = token.end();

            match token.as_str() {
                "{{" => literal.push('{'),
                "}}" => literal.push('}'),
                "{" | "}" => return Err(TemplateError::UnbalancedBrace(source.to_string())),
                _ => {
                    let name = captures.get(1).map_or("", |m| m.as_str());
                    let placeholder: Placeholder = name.parse()?;
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Placeholder(placeholder));
                }
            }
        }

        literal.push_str(&source[last..]);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// Whether the template contains an `{order}`/`{chapter}` placeholder.
    #[must_use]
    pub fn has_index(&self) -> bool {
        self.segments
            .contains(&Segment::Placeholder(Placeholder::Index))
    }

    /// Fails unless the template contains an index placeholder.
    ///
    /// Without one, every chapter of a book renders to the same name.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::MissingIndex`] if no index placeholder is
    /// present.
    pub fn require_index(self) -> Result<Self, TemplateError> {
        if self.has_index() {
            Ok(self)
        } else {
            Err(TemplateError::MissingIndex(self.source))
        }
    }

    /// The template text as originally supplied.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Substitutes `fields` into the template.
    #[must_use]
    pub fn render(&self, fields: &Fields<'_>) -> String {
        let mut out = String::with_capacity(self.source.len() + fields.book.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(Placeholder::Book) => out.push_str(fields.book),
                Segment::Placeholder(Placeholder::BookLower) => {
                    out.push_str(&fields.book.to_lowercase());
                }
                Segment::Placeholder(Placeholder::Index) => out.push_str(fields.index),
                Segment::Placeholder(Placeholder::Version) => {
                    out.push_str(&fields.version.to_uppercase());
                }
                Segment::Placeholder(Placeholder::VersionLower) => {
                    out.push_str(&fields.version.to_lowercase());
                }
            }
        }
        out
    }
}

impl FromStr for NameTemplate {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for NameTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Errors raised while parsing a [`NameTemplate`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TemplateError {
    /// The template names a placeholder that does not exist.
    #[error("unknown placeholder '{{{0}}}' (expected book, order, chapter or version)")]
    UnknownPlaceholder(String),

    /// The template has a stray `{` or `}`.
    #[error("unbalanced brace in template '{0}' (use '{{{{' or '}}}}' for a literal brace)")]
    UnbalancedBrace(String),

    /// The template has no `{order}`/`{chapter}` placeholder where one is
    /// needed to tell entries apart.
    #[error("template '{0}' needs a {{chapter}} or {{order}} placeholder")]
    MissingIndex(String),
}
