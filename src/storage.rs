pub mod document;
mod layout;

pub use document::{rewrite, split_verse, write_atomic, Region, Rewritten, WriteError};
pub use layout::Layout;
