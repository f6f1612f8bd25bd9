//! Command parsing
//!
//! Each manager binds its command words from its configured prefix at
//! construction (`$<prefix>-list`, `$<prefix>-read`, ...). Parsing compares
//! the first whitespace-separated token against the bound words; everything
//! after it is a single argument, so paths and queries may contain spaces.

use crate::transport::Attachment;

/// Operation requested by a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    List,
    Read,
    Upload,
    Delete,
    Mkdir,
    Rmdir,
    Search,
}

impl Verb {
    pub fn name(&self) -> &'static str {
        match self {
            Verb::List => "list",
            Verb::Read => "read",
            Verb::Upload => "upload",
            Verb::Delete => "delete",
            Verb::Mkdir => "mkdir",
            Verb::Rmdir => "rmdir",
            Verb::Search => "search",
        }
    }
}

/// A parsed command, derived per inbound message and never persisted.
#[derive(Debug, Clone)]
pub struct Command {
    pub verb: Verb,
    pub argument: String,
    pub attachments: Vec<Attachment>,
    pub requester_id: String,
}

/// The command words of one manager, bound from its prefix.
#[derive(Debug, Clone)]
pub struct CommandSet {
    pub list: String,
    pub read: String,
    pub upload: String,
    pub delete: String,
    pub mkdir: String,
    pub rmdir: String,
    pub search: String,
    pub help: String,
}

impl CommandSet {
    pub fn new(prefix: &str) -> Self {
        Self {
            list: format!("${}-list", prefix),
            read: format!("${}-read", prefix),
            upload: format!("${}-upload", prefix),
            delete: format!("${}-delete", prefix),
            mkdir: format!("${}-mkdir", prefix),
            rmdir: format!("${}-rmdir", prefix),
            search: format!("${}-search", prefix),
            help: format!("${}-help", prefix),
        }
    }

    /// Parses message text into a verb and argument, or `None` when the
    /// first token is not one of this set's command words.
    pub fn parse(&self, content: &str) -> Option<(Verb, String)> {
        let trimmed = content.trim();
        let mut parts = trimmed.splitn(2, char::is_whitespace);
        let word = parts.next()?;
        let argument = parts.next().unwrap_or("").trim().to_string();

        let verb = match word {
            w if w == self.list => Verb::List,
            w if w == self.read => Verb::Read,
            w if w == self.upload => Verb::Upload,
            w if w == self.delete => Verb::Delete,
            w if w == self.mkdir => Verb::Mkdir,
            w if w == self.rmdir => Verb::Rmdir,
            w if w == self.search => Verb::Search,
            _ => return None,
        };

        Some((verb, argument))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_commands() {
        let set = CommandSet::new("q");
        assert_eq!(set.parse("$q-list"), Some((Verb::List, String::new())));
        assert_eq!(
            set.parse("$q-read quest.yml"),
            Some((Verb::Read, "quest.yml".to_string()))
        );
        assert_eq!(set.parse("$q-upload"), Some((Verb::Upload, String::new())));
        assert_eq!(
            set.parse("$q-search drag"),
            Some((Verb::Search, "drag".to_string()))
        );
    }

    #[test]
    fn test_argument_keeps_inner_spaces() {
        let set = CommandSet::new("q");
        assert_eq!(
            set.parse("$q-read my quest file.yml"),
            Some((Verb::Read, "my quest file.yml".to_string()))
        );
    }

    #[test]
    fn test_parse_with_surrounding_whitespace() {
        let set = CommandSet::new("q");
        assert_eq!(
            set.parse("  $q-delete  old.yml  "),
            Some((Verb::Delete, "old.yml".to_string()))
        );
    }

    #[test]
    fn test_foreign_prefix_is_not_matched() {
        let set = CommandSet::new("q");
        assert_eq!(set.parse("$sm-list"), None);
        assert_eq!(set.parse("$q-listx"), None);
        assert_eq!(set.parse("hello there"), None);
        assert_eq!(set.parse(""), None);
    }

    #[test]
    fn test_directory_commands_parse() {
        let set = CommandSet::new("sm");
        assert_eq!(
            set.parse("$sm-mkdir drafts/new"),
            Some((Verb::Mkdir, "drafts/new".to_string()))
        );
        assert_eq!(
            set.parse("$sm-rmdir drafts/new"),
            Some((Verb::Rmdir, "drafts/new".to_string()))
        );
    }
}
