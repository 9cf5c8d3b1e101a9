//! Downloading a whole version, chapter by chapter.
//!
//! The [`Downloader`] walks the catalog in order. A chapter whose file already
//! exists is skipped, so an interrupted run can simply be started again. Every
//! other chapter is fetched, rewritten with its navigation links, and written
//! into place atomically. A chapter that fails is logged and counted; the run
//! carries on with the next one.

use std::{fmt, path::PathBuf};

use indicatif::ProgressBar;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    domain::{Navigation, Section},
    fetch::{FetchError, Fetcher},
    storage::{rewrite, write_atomic, Layout, WriteError},
};

/// What happened to a single chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChapterOutcome {
    /// The file already existed.
    Skipped,
    /// The chapter was fetched and written.
    Downloaded {
        /// Whether a title was found and navigation inserted.
        linked: bool,
    },
}

/// Totals for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Chapters fetched and written.
    pub downloaded: usize,
    /// Chapters whose file already existed.
    pub skipped: usize,
    /// Chapters that could not be fetched or written.
    pub failed: usize,
    /// Downloaded chapters that had no title, so no navigation was inserted.
    pub unlinked: usize,
}

impl RunSummary {
    /// Returns `true` if no chapter failed.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.failed == 0
    }

    /// The number of chapters accounted for.
    #[must_use]
    pub const fn processed(&self) -> usize {
        self.downloaded + self.skipped + self.failed
    }

    fn record(&mut self, outcome: &Result<ChapterOutcome, ChapterError>) {
        match outcome {
            Ok(ChapterOutcome::Skipped) => self.skipped += 1,
            Ok(ChapterOutcome::Downloaded { linked }) => {
                self.downloaded += 1;
                if !linked {
                    self.unlinked += 1;
                }
            }
            Err(_) => self.failed += 1,
        }
    }
}

/// Fetches, rewrites and stores every chapter in the catalog.
pub struct Downloader<'a, F> {
    layout: Layout<'a>,
    fetcher: F,
    progress: ProgressBar,
}

impl<F: fmt::Debug> fmt::Debug for Downloader<'_, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Downloader")
            .field("layout", &self.layout)
            .field("fetcher", &self.fetcher)
            .finish_non_exhaustive()
    }
}

impl<'a, F: Fetcher> Downloader<'a, F> {
    /// Creates a downloader writing into `layout` and fetching with `fetcher`.
    ///
    /// Progress is not shown; see [`Downloader::with_progress`].
    #[must_use]
    pub fn new(layout: Layout<'a>, fetcher: F) -> Self {
        Self {
            layout,
            fetcher,
            progress: ProgressBar::hidden(),
        }
    }

    /// Reports progress on the given bar.
    ///
    /// The bar's length is set to the catalog's total chapter count.
    #[must_use]
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        progress.set_length(self.layout.namer().catalog().total_chapters() as u64);
        self.progress = progress;
        self
    }

    /// The fetcher in use.
    #[must_use]
    pub const fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Downloads every chapter of every book.
    #[instrument(skip(self), fields(version = %self.layout.namer().config().version()))]
    pub fn run(&mut self) -> RunSummary {
        let catalog = self.layout.namer().catalog();
        let mut summary = RunSummary::default();

        for section in catalog {
            self.download_book(section, &mut summary);
        }

        self.progress.finish_and_clear();
        info!(?summary, "run complete");
        summary
    }

    /// Downloads every chapter of one book, adding the results to `summary`.
    #[instrument(skip(self, section, summary), fields(book = section.name()))]
    pub fn download_book(&mut self, section: &Section, summary: &mut RunSummary) {
        for chapter in section.chapter_numbers() {
            let outcome = self.download_chapter(section, chapter);
            if let Err(e) = &outcome {
                self.progress.suspend(|| {
                    error!(error = %e, cause = ?std::error::Error::source(e), "chapter failed");
                });
            }
            summary.record(&outcome);
            self.progress.inc(1);
        }
    }

    /// Downloads a single chapter.
    ///
    /// # Errors
    ///
    /// Returns an error if the chapter could not be fetched or written. A
    /// chapter without a title is not an error: it is written unchanged and
    /// reported as unlinked.
    pub fn download_chapter(
        &mut self,
        section: &Section,
        chapter: usize,
    ) -> Result<ChapterOutcome, ChapterError> {
        let path = self.layout.chapter_path(section, chapter);
        if path.exists() {
            debug!(path = %path.display(), "already downloaded");
            return Ok(ChapterOutcome::Skipped);
        }

        let raw = self
            .fetcher
            .fetch(section, chapter)
            .map_err(|source| ChapterError::Fetch {
                book: section.name(),
                chapter,
                source,
            })?;

        let navigation = Navigation::new(self.layout.namer(), section, chapter);
        let rewritten = rewrite(&raw, &navigation.to_string());
        let linked = rewritten.is_linked();
        if !linked {
            self.progress.suspend(|| {
                warn!(
                    path = %path.display(),
                    "no title found; navigation not inserted (delete the file to retry)"
                );
            });
        }

        write_atomic(&path, rewritten.text())?;

        let version = self.layout.namer().config().version();
        self.progress
            .set_message(format!("Downloaded {section} {chapter} ({version})"));
        Ok(ChapterOutcome::Downloaded { linked })
    }

    /// The path a chapter is, or will be, stored at.
    #[must_use]
    pub fn chapter_path(&self, section: &Section, chapter: usize) -> PathBuf {
        self.layout.chapter_path(section, chapter)
    }
}

/// Errors that stop a single chapter from being stored.
#[derive(Debug, thiserror::Error)]
pub enum ChapterError {
    /// The converter failed.
    #[error("failed to fetch {book} {chapter}")]
    Fetch {
        /// The book being fetched.
        book: &'static str,
        /// The chapter being fetched.
        chapter: usize,
        /// Why the fetch failed.
        source: FetchError,
    },

    /// The rewritten chapter could not be saved.
    #[error(transparent)]
    Write(#[from] WriteError),
}

#[cfg(test)]
mod tests {
    use std::{collections::HashSet, fs};

    use tempfile::TempDir;

    use super::*;
    use crate::domain::{Catalog, Exclusions, Namer, RunConfig, Settings, Version};

    /// Serves a canned chapter, failing for any chapter in `fail`.
    #[derive(Default)]
    struct FakeFetcher {
        calls: usize,
        fail: HashSet<(&'static str, usize)>,
        untitled: HashSet<(&'static str, usize)>,
    }

    impl Fetcher for FakeFetcher {
        fn fetch(&mut self, section: &Section, chapter: usize) -> Result<String, FetchError> {
            self.calls += 1;
            let key = (section.name(), chapter);
            if self.fail.contains(&key) {
                return Err(FetchError::Empty);
            }
            if self.untitled.contains(&key) {
                return Ok("###### 1 no title here\n".to_string());
            }
            Ok(format!(
                "# {section} {chapter}\n###### 1 First verse.\n###### 2 Second verse.\n### Footnotes\na. note\n"
            ))
        }
    }

    fn small_catalog() -> Catalog {
        Catalog::from_entries(&[("Ruth", 4), ("Song of Solomon", 2), ("Jude", 1)])
    }

    fn config(root: &TempDir) -> RunConfig {
        let settings = Settings {
            output: root.path().to_path_buf(),
            ..Settings::default()
        };
        RunConfig::new(Version::new("kjv").unwrap(), settings, Exclusions::default()).unwrap()
    }

    #[test]
    fn downloads_every_chapter() {
        let tmp = TempDir::new().unwrap();
        let catalog = small_catalog();
        let config = config(&tmp);
        let layout = Layout::new(Namer::new(&catalog, &config));
        let mut downloader = Downloader::new(layout, FakeFetcher::default());

        let summary = downloader.run();

        assert_eq!(
            summary,
            RunSummary {
                downloaded: 7,
                skipped: 0,
                failed: 0,
                unlinked: 0
            }
        );
        assert_eq!(downloader.fetcher().calls, 7);
        assert_eq!(summary.processed(), catalog.total_chapters());

        let ruth_2 = tmp.path().join("kjv/kjv-1-ruth/kjv-ruth-2.md");
        let text = fs::read_to_string(ruth_2).unwrap();
        assert_eq!(text.matches("### Navigation").count(), 2);
        assert!(text.contains("[[kjv-ruth-1|« Ruth 1]] | [[kjv-ruth-1|Ruth]] | [[kjv-ruth-3|Ruth 3 »]]"));
        assert!(text.contains("###### 1\n First verse.\n"));

        assert!(tmp
            .path()
            .join("kjv/kjv-2-song_of_solomon/kjv-song_of_solomon-2.md")
            .exists());
    }

    #[test]
    fn second_run_fetches_nothing() {
        let tmp = TempDir::new().unwrap();
        let catalog = small_catalog();
        let config = config(&tmp);
        let layout = Layout::new(Namer::new(&catalog, &config));

        let mut first = Downloader::new(layout, FakeFetcher::default());
        first.run();

        let mut second = Downloader::new(layout, FakeFetcher::default());
        let summary = second.run();

        assert_eq!(second.fetcher().calls, 0);
        assert_eq!(summary.skipped, 7);
        assert_eq!(summary.downloaded, 0);
    }

    #[test]
    fn failures_do_not_stop_the_run_and_are_retried_next_time() {
        let tmp = TempDir::new().unwrap();
        let catalog = small_catalog();
        let config = config(&tmp);
        let layout = Layout::new(Namer::new(&catalog, &config));

        let fetcher = FakeFetcher {
            fail: HashSet::from([("Ruth", 3)]),
            ..FakeFetcher::default()
        };
        let mut downloader = Downloader::new(layout, fetcher);
        let summary = downloader.run();

        assert_eq!(summary.failed, 1);
        assert_eq!(summary.downloaded, 6);
        assert!(!summary.is_clean());
        let ruth_3 = downloader.chapter_path(catalog.section("Ruth").unwrap(), 3);
        assert!(!ruth_3.exists());

        let mut retry = Downloader::new(layout, FakeFetcher::default());
        let summary = retry.run();
        assert_eq!(retry.fetcher().calls, 1);
        assert_eq!(summary.downloaded, 1);
        assert!(ruth_3.exists());
    }

    #[test]
    fn untitled_chapter_is_written_but_reported() {
        let tmp = TempDir::new().unwrap();
        let catalog = small_catalog();
        let config = config(&tmp);
        let layout = Layout::new(Namer::new(&catalog, &config));

        let fetcher = FakeFetcher {
            untitled: HashSet::from([("Jude", 1)]),
            ..FakeFetcher::default()
        };
        let mut downloader = Downloader::new(layout, fetcher);
        let summary = downloader.run();

        assert_eq!(summary.unlinked, 1);
        assert!(summary.is_clean());
        let jude = downloader.chapter_path(catalog.section("Jude").unwrap(), 1);
        assert_eq!(fs::read_to_string(jude).unwrap(), "###### 1 no title here\n");
    }

    #[test]
    fn progress_counts_every_processed_chapter() {
        let tmp = TempDir::new().unwrap();
        let catalog = small_catalog();
        let config = config(&tmp);
        let layout = Layout::new(Namer::new(&catalog, &config));
        fs::create_dir_all(tmp.path().join("kjv/kjv-1-ruth")).unwrap();
        fs::write(tmp.path().join("kjv/kjv-1-ruth/kjv-ruth-1.md"), "# Ruth 1\n").unwrap();

        let fetcher = FakeFetcher {
            fail: HashSet::from([("Ruth", 2)]),
            untitled: HashSet::from([("Jude", 1)]),
            ..FakeFetcher::default()
        };
        let progress = ProgressBar::hidden();
        let mut downloader = Downloader::new(layout, fetcher).with_progress(progress.clone());
        let summary = downloader.run();

        assert_eq!(
            summary,
            RunSummary {
                downloaded: 5,
                skipped: 1,
                failed: 1,
                unlinked: 1
            }
        );
        assert_eq!(progress.length(), Some(7));
        assert_eq!(progress.position(), 7);
    }

    #[test]
    fn single_chapter() {
        let tmp = TempDir::new().unwrap();
        let catalog = small_catalog();
        let config = config(&tmp);
        let layout = Layout::new(Namer::new(&catalog, &config));
        let mut downloader = Downloader::new(layout, FakeFetcher::default());
        let jude = catalog.section("Jude").unwrap();

        let outcome = downloader.download_chapter(jude, 1).unwrap();
        assert_eq!(outcome, ChapterOutcome::Downloaded { linked: true });

        let outcome = downloader.download_chapter(jude, 1).unwrap();
        assert_eq!(outcome, ChapterOutcome::Skipped);
        assert_eq!(downloader.fetcher().calls, 1);
    }

    #[test]
    fn fetch_error_names_the_chapter() {
        let tmp = TempDir::new().unwrap();
        let catalog = small_catalog();
        let config = config(&tmp);
        let layout = Layout::new(Namer::new(&catalog, &config));
        let fetcher = FakeFetcher {
            fail: HashSet::from([("Jude", 1)]),
            ..FakeFetcher::default()
        };
        let mut downloader = Downloader::new(layout, fetcher);

        let error = downloader
            .download_chapter(catalog.section("Jude").unwrap(), 1)
            .unwrap_err();
        assert_eq!(error.to_string(), "failed to fetch Jude 1");
    }
}
