//! Domain models for the vault.
//!
//! This module contains the book catalog, run configuration, the naming rules
//! for folders and files, and the navigation links between chapters.

/// The fixed catalog of books.
pub mod catalog;
pub use catalog::{Catalog, Section, UnknownSection};

mod config;
pub use config::{Exclusions, InvalidVersionError, RunConfig, Settings, SettingsError, Version};

/// Folder and file naming.
pub mod naming;
pub use naming::Namer;

/// Navigation links between chapters.
pub mod navigation;
pub use navigation::Navigation;

/// Name templates and placeholder substitution.
pub mod template;
pub use template::{NameTemplate, TemplateError};
