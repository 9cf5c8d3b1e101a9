//! Previous / book / next links between chapters.

use std::fmt;

use super::{catalog::Section, naming::Namer};

/// Heading line that introduces a navigation block.
pub const HEADING: &str = "### Navigation";

/// A wiki link, rendered as `[[target|label]]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// The file name being linked to, without extension.
    pub target: String,
    /// The text shown for the link.
    pub label: String,
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[[{}|{}]]", self.target, self.label)
    }
}

/// The navigation block for one chapter.
///
/// The link back to chapter 1 of the book is always present. The previous link
/// is omitted on the first chapter and the next link on the last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    previous: Option<Link>,
    book: Link,
    next: Option<Link>,
}

impl Navigation {
    /// Builds the navigation for `chapter` of `section`.
    #[must_use]
    pub fn new(namer: &Namer<'_>, section: &Section, chapter: usize) -> Self {
        let name = section.name();

        let previous = (chapter > 1).then(|| Link {
            target: namer.file_name(section, chapter - 1),
            label: format!("« {name} {}", chapter - 1),
        });
        let book = Link {
            target: namer.file_name(section, 1),
            label: name.to_string(),
        };
        let next = (chapter < section.chapters()).then(|| Link {
            target: namer.file_name(section, chapter + 1),
            label: format!("{name} {} »", chapter + 1),
        });

        Self {
            previous,
            book,
            next,
        }
    }

    /// The link to the preceding chapter, if any.
    #[must_use]
    pub const fn previous(&self) -> Option<&Link> {
        self.previous.as_ref()
    }

    /// The link to the first chapter of the book.
    #[must_use]
    pub const fn book(&self) -> &Link {
        &self.book
    }

    /// The link to the following chapter, if any.
    #[must_use]
    pub const fn next(&self) -> Option<&Link> {
        self.next.as_ref()
    }
}

/// Renders the two-line block: the heading, then the links separated by ` | `.
///
/// No trailing newline; callers add the surrounding blank lines.
impl fmt::Display for Navigation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{HEADING}")?;
        if let Some(previous) = &self.previous {
            write!(f, "{previous} | ")?;
        }
        write!(f, "{}", self.book)?;
        if let Some(next) = &self.next {
            write!(f, " | {next}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        catalog::Catalog,
        config::{Exclusions, RunConfig, Settings, Version},
    };

    fn navigation(book: &str, chapter: usize) -> Navigation {
        let catalog = Catalog::bible();
        let config = RunConfig::new(
            Version::new("kjv").unwrap(),
            Settings::default(),
            Exclusions::default(),
        )
        .unwrap();
        let namer = Namer::new(&catalog, &config);
        let section = catalog.section(book).unwrap();
        Navigation::new(&namer, section, chapter)
    }

    #[test]
    fn first_chapter_has_no_previous() {
        let nav = navigation("Genesis", 1);
        assert!(nav.previous().is_none());
        assert_eq!(
            nav.to_string(),
            "### Navigation\n[[kjv-genesis-01|Genesis]] | [[kjv-genesis-02|Genesis 2 »]]"
        );
    }

    #[test]
    fn last_chapter_has_no_next() {
        let nav = navigation("Genesis", 50);
        assert!(nav.next().is_none());
        assert_eq!(
            nav.to_string(),
            "### Navigation\n[[kjv-genesis-49|« Genesis 49]] | [[kjv-genesis-01|Genesis]]"
        );
    }

    #[test]
    fn middle_chapter_has_both() {
        let nav = navigation("Psalms", 23);
        assert_eq!(
            nav.to_string(),
            "### Navigation\n[[kjv-psalms-022|« Psalms 22]] | [[kjv-psalms-001|Psalms]] | \
             [[kjv-psalms-024|Psalms 24 »]]"
        );
    }

    #[test]
    fn single_chapter_book_only_links_to_itself() {
        let nav = navigation("Jude", 1);
        assert!(nav.previous().is_none());
        assert!(nav.next().is_none());
        assert_eq!(nav.book().target, "kjv-jude-1");
        assert_eq!(nav.to_string(), "### Navigation\n[[kjv-jude-1|Jude]]");
    }

    #[test]
    fn labels_use_the_undivided_book_name() {
        let nav = navigation("1 John", 2);
        assert_eq!(nav.previous().unwrap().label, "« 1 John 1");
        assert_eq!(nav.book().label, "1 John");
        assert_eq!(nav.next().unwrap().label, "1 John 3 »");
        assert_eq!(nav.book().target, "kjv-1_john-1");
    }
}
