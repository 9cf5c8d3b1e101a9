//! Bible Markdown Vault
//!
//! Downloads a complete bible, one markdown file per chapter, into a folder
//! tree suitable for a wiki-style note editor. Each chapter links to the
//! previous and next chapter and back to the start of its book.

pub mod domain;
pub use domain::{Catalog, Exclusions, Namer, Navigation, RunConfig, Section, Settings, Version};

pub mod fetch;
pub use fetch::{Converter, FetchError, Fetcher, RateLimited};

/// On-disk layout and chapter rewriting.
pub mod storage;
pub use storage::Layout;

pub mod downloader;
pub use downloader::{ChapterError, ChapterOutcome, Downloader, RunSummary};
