//! File search
//!
//! Prefix search over a manager's root and the bounded cache of search
//! sessions awaiting an archive-download action.

pub mod cache;
pub mod engine;

pub use cache::{SESSION_CAPACITY, SearchSession, SessionCache};
pub use engine::{MIN_QUERY_CHARS, search_files};
