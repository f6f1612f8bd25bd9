//! File system storage management
//!
//! Path resolution with jail enforcement and the directory operations built
//! on top of it. Every operation goes through the resolver, so nothing in
//! this module ever touches a path outside a manager's root.

pub mod entries;
pub mod operations;
pub mod resolve;

pub use entries::{EntryKind, FileContent, ListEntry, WriteTarget};
pub use resolve::{PathResolver, relative_display};
