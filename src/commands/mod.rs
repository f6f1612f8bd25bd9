//! Command grammar
//!
//! The per-manager command set, the parser that turns inbound message text
//! into typed commands, and the namespace of follow-up action tokens.

pub mod parser;

pub use parser::{Command, CommandSet, Verb};

/// Token prefix of the interactive archive-download action. The full action
/// id is this prefix followed by the search session id.
pub const DOWNLOAD_ACTION_PREFIX: &str = "download_search_";
