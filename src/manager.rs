//! File manager
//!
//! One manager per configured directory root. A manager owns its path
//! resolver, its command set and its search-session cache, and turns parsed
//! commands into filesystem operations and chat replies. Managers share no
//! state with each other.

use std::time::SystemTime;

use log::{error, info, warn};
use tokio::sync::Mutex;

use crate::archive;
use crate::chunker::split_into_chunks;
use crate::commands::{Command, CommandSet, DOWNLOAD_ACTION_PREFIX, Verb};
use crate::config::ManagerConfig;
use crate::error::VaultError;
use crate::search::cache::{SearchSession, SessionCache};
use crate::search::engine;
use crate::storage::entries::{EntryKind, FileContent};
use crate::storage::operations;
use crate::storage::resolve::{PathResolver, relative_display};
use crate::transport::{
    ActionButton, MAX_ATTACHMENT_BYTES, MESSAGE_CHUNK_LIMIT, Outbound, ReplySender,
};

fn mention(user_id: &str) -> String {
    format!("<@{}>", user_id)
}

/// A sandboxed file manager bound to one directory root.
pub struct FileManager {
    prefix: String,
    item_label: String,
    root_display: String,
    commands: CommandSet,
    resolver: PathResolver,
    // Insert, evict and consume all run under this lock; a concurrent search
    // and download on the same manager cannot race the cache.
    cache: Mutex<SessionCache>,
}

impl FileManager {
    /// Builds a manager from its configuration, creating the root directory
    /// when it does not exist yet.
    pub fn new(config: &ManagerConfig) -> Result<Self, VaultError> {
        let root = config.root_path();

        if !root.exists() {
            info!(
                "Root {} does not exist, attempting to create directory",
                config.root_directory
            );
            std::fs::create_dir_all(&root)?;
        }

        if !root.is_dir() {
            return Err(VaultError::Conflict(format!(
                "{} is not a directory",
                config.root_directory
            )));
        }

        let resolver = PathResolver::new(&root, config.allow_nested_dirs)?;

        Ok(Self {
            prefix: config.prefix.clone(),
            item_label: config.item_label.clone(),
            root_display: config.root_directory.clone(),
            commands: CommandSet::new(&config.prefix),
            resolver,
            cache: Mutex::new(SessionCache::default()),
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn item_label(&self) -> &str {
        &self.item_label
    }

    pub fn commands(&self) -> &CommandSet {
        &self.commands
    }

    pub fn allow_nested(&self) -> bool {
        self.resolver.allow_nested()
    }

    /// Parses message text against this manager's command set. Directory
    /// commands are not recognized when nesting is disabled.
    pub fn parse_content(&self, content: &str) -> Option<(Verb, String)> {
        let (verb, argument) = self.commands.parse(content)?;
        match verb {
            Verb::Mkdir | Verb::Rmdir if !self.allow_nested() => None,
            _ => Some((verb, argument)),
        }
    }

    /// Handles one command as an isolated failure domain: any error yields
    /// exactly one user-visible reply and one log entry, and never escapes.
    pub async fn handle(&self, command: Command, reply: &ReplySender) {
        let requester = command.requester_id.clone();
        let verb = command.verb;

        let result = match verb {
            Verb::List => self.handle_list(&command, reply),
            Verb::Read => self.handle_read(&command, reply),
            Verb::Upload => self.handle_upload(&command, reply),
            Verb::Delete => self.handle_delete(&command, reply),
            Verb::Mkdir => self.handle_mkdir(&command, reply),
            Verb::Rmdir => self.handle_rmdir(&command, reply),
            Verb::Search => self.handle_search(&command, reply).await,
        };

        if let Err(e) = result {
            error!(
                "[{}] {} command from {} failed: {}",
                self.prefix,
                verb.name(),
                requester,
                e
            );
            let _ = reply.send(Outbound::Message {
                text: format!("{} ❌ {}", mention(&requester), e.user_message()),
                action: None,
            });
        }
    }

    fn handle_list(&self, command: &Command, reply: &ReplySender) -> Result<(), VaultError> {
        let raw = command.argument.trim();
        let entries = operations::list_directory(&self.resolver, raw)?;

        let display_path = if raw.is_empty() {
            self.root_display.clone()
        } else {
            format!("{}/{}", self.root_display, raw)
        };

        if entries.is_empty() {
            let _ = reply.send(Outbound::Message {
                text: format!(
                    "{} 📖 No files found inside `{}`",
                    mention(&command.requester_id),
                    display_path
                ),
                action: None,
            });
            return Ok(());
        }

        let mut text = format!(
            "{}\n### 📖 {} Files in `{}`:\n",
            mention(&command.requester_id),
            self.item_label,
            display_path
        );

        if !raw.is_empty() && self.allow_nested() {
            text.push_str("📁 `../` (parent directory)\n");
        }

        for entry in &entries {
            match entry.kind {
                EntryKind::Directory => {
                    text.push_str(&format!("📁 `{}/`\n", entry.name));
                }
                EntryKind::File => {
                    text.push_str(&format!("📄 `{}`\n", entry.name));
                }
            }
        }

        self.send_chunked(&text, None, reply);
        Ok(())
    }

    fn handle_read(&self, command: &Command, reply: &ReplySender) -> Result<(), VaultError> {
        let raw = command.argument.trim();
        if raw.is_empty() {
            return Err(VaultError::Validation(self.path_usage(&self.commands.read)));
        }

        let content = operations::read_file(&self.resolver, raw)?;
        self.send_file(&command.requester_id, content, reply)?;

        info!(
            "{} file read: {} by {}",
            self.item_label, raw, command.requester_id
        );
        Ok(())
    }

    fn handle_upload(&self, command: &Command, reply: &ReplySender) -> Result<(), VaultError> {
        let requester = &command.requester_id;

        let attachment = match command.attachments.as_slice() {
            [] => {
                return Err(VaultError::Validation(
                    "Please attach a file to upload.".into(),
                ));
            }
            [one] => one,
            _ => {
                return Err(VaultError::Validation(
                    "Please attach only one file at a time.".into(),
                ));
            }
        };

        let raw = command.argument.trim();
        let target = if raw.is_empty() {
            attachment.filename.clone()
        } else if raw.ends_with('/') {
            format!("{}{}", raw, attachment.filename)
        } else {
            raw.to_string()
        };

        let staged = operations::prepare_write(&self.resolver, &target)?;

        if let Some(existing) = staged.existing {
            let _ = reply.send(Outbound::Message {
                text: format!(
                    "{} 📖 File `{}` already exists. Uploading the current copy before replacing it.",
                    mention(requester),
                    target
                ),
                action: None,
            });
            // An undeliverable backup does not block the replacement.
            if let Err(e) = self.send_file(requester, existing, reply) {
                let _ = reply.send(Outbound::Message {
                    text: format!("{} ❌ {}", mention(requester), e.user_message()),
                    action: None,
                });
            }
        }

        // The write completes on a separate task; completion posts through
        // the same reply port as the synchronous replies above.
        let path = staged.path;
        let tmp = path.with_extension(format!(
            "{}.tmp",
            path.extension().and_then(|ext| ext.to_str()).unwrap_or("")
        ));
        let data = attachment.data.clone();
        let reply = reply.clone();
        let requester = requester.clone();
        let item_label = self.item_label.clone();
        let root_display = self.root_display.clone();
        let prefix = self.prefix.clone();

        tokio::spawn(async move {
            let written = match tokio::fs::write(&tmp, &data).await {
                Ok(()) => tokio::fs::rename(&tmp, &path).await,
                Err(e) => Err(e),
            };

            match written {
                Ok(()) => {
                    let _ = reply.send(Outbound::Message {
                        text: format!(
                            "{} ✅ Successfully uploaded `{}` to {}",
                            mention(&requester),
                            target,
                            root_display
                        ),
                        action: None,
                    });
                    info!(
                        "{} file uploaded: {} by {}",
                        item_label, target, requester
                    );
                }
                Err(e) => {
                    let _ = tokio::fs::remove_file(&tmp).await;
                    error!(
                        "[{}] Failed to upload {} file {}: {}",
                        prefix, item_label, target, e
                    );
                    let _ = reply.send(Outbound::Message {
                        text: format!(
                            "{} ❌ Failed to upload `{}`. {}",
                            mention(&requester),
                            target,
                            VaultError::Io(e).user_message()
                        ),
                        action: None,
                    });
                }
            }
        });

        Ok(())
    }

    fn handle_delete(&self, command: &Command, reply: &ReplySender) -> Result<(), VaultError> {
        let raw = command.argument.trim();
        if raw.is_empty() {
            return Err(VaultError::Validation(
                self.path_usage(&self.commands.delete),
            ));
        }

        // Surface the content as a backup before any removal is attempted.
        let backup = operations::read_file(&self.resolver, raw)?;
        let _ = reply.send(Outbound::Message {
            text: format!(
                "{} 📖 Uploading the file as a backup before deleting.",
                mention(&command.requester_id)
            ),
            action: None,
        });
        if let Err(e) = self.send_file(&command.requester_id, backup, reply) {
            let _ = reply.send(Outbound::Message {
                text: format!("{} ❌ {}", mention(&command.requester_id), e.user_message()),
                action: None,
            });
        }

        operations::remove_file(&self.resolver, raw)?;

        let _ = reply.send(Outbound::Message {
            text: format!(
                "{} ✅ Successfully deleted `{}` from {}",
                mention(&command.requester_id),
                raw,
                self.root_display
            ),
            action: None,
        });
        info!(
            "{} file deleted: {} by {}",
            self.item_label, raw, command.requester_id
        );
        Ok(())
    }

    fn handle_mkdir(&self, command: &Command, reply: &ReplySender) -> Result<(), VaultError> {
        let raw = command.argument.trim();
        if raw.is_empty() {
            return Err(VaultError::Validation(format!(
                "Usage: `{} <directory/path>`",
                self.commands.mkdir
            )));
        }

        operations::make_directory(&self.resolver, raw)?;

        let _ = reply.send(Outbound::Message {
            text: format!(
                "{} ✅ Successfully created directory `{}`",
                mention(&command.requester_id),
                raw
            ),
            action: None,
        });
        info!("Directory created: {} by {}", raw, command.requester_id);
        Ok(())
    }

    fn handle_rmdir(&self, command: &Command, reply: &ReplySender) -> Result<(), VaultError> {
        let raw = command.argument.trim();
        if raw.is_empty() {
            return Err(VaultError::Validation(format!(
                "Usage: `{} <directory/path>`",
                self.commands.rmdir
            )));
        }

        operations::remove_directory(&self.resolver, raw)?;

        let _ = reply.send(Outbound::Message {
            text: format!(
                "{} ✅ Successfully deleted directory `{}`",
                mention(&command.requester_id),
                raw
            ),
            action: None,
        });
        info!("Directory deleted: {} by {}", raw, command.requester_id);
        Ok(())
    }

    async fn handle_search(&self, command: &Command, reply: &ReplySender) -> Result<(), VaultError> {
        let query = command.argument.trim();
        if query.is_empty() {
            return Err(VaultError::Validation(format!(
                "Usage: `{} <prefix>` - searches for files starting with the given prefix",
                self.commands.search
            )));
        }

        let matches = engine::search_files(&self.resolver, query)?;

        if matches.is_empty() {
            let _ = reply.send(Outbound::Message {
                text: format!(
                    "{} 📖 No files found starting with `{}`",
                    mention(&command.requester_id),
                    query
                ),
                action: None,
            });
            return Ok(());
        }

        let mut text = format!(
            "{}\n### 🔍 Search Results for prefix `{}`:\nFound **{} file(s)**:\n\n",
            mention(&command.requester_id),
            query,
            matches.len()
        );
        for path in &matches {
            text.push_str(&format!(
                "📄 `{}`\n",
                relative_display(path, self.resolver.root())
            ));
        }

        let session_id = {
            let mut cache = self.cache.lock().await;
            let id = new_session_id(&cache);
            cache.insert(SearchSession {
                id: id.clone(),
                matched_paths: matches.clone(),
                created_at: SystemTime::now(),
            });
            id
        };

        let button = ActionButton {
            id: format!("{}{}", DOWNLOAD_ACTION_PREFIX, session_id),
            label: "📥 Download as ZIP".to_string(),
        };
        self.send_chunked(&text, Some(button), reply);

        info!(
            "Search for prefix '{}' by {} found {} files (session {})",
            query,
            command.requester_id,
            matches.len(),
            session_id
        );
        Ok(())
    }

    /// Removes and returns a cached search session. A second call with the
    /// same id misses: sessions are single-use.
    pub async fn take_session(&self, session_id: &str) -> Option<SearchSession> {
        self.cache.lock().await.take(session_id)
    }

    /// Builds and delivers the archive for a consumed search session.
    pub async fn deliver_archive(
        &self,
        session: SearchSession,
        requester: &str,
        reply: &ReplySender,
    ) {
        match archive::build_archive(&session.matched_paths, self.resolver.root()) {
            Ok(built) => {
                let _ = reply.send(Outbound::Message {
                    text: format!("{} ✅ Here are your search results:", mention(requester)),
                    action: None,
                });
                let _ = reply.send(Outbound::File {
                    filename: format!("search_results_{}.zip", session.id),
                    data: built.data,
                });
                info!(
                    "[{}] Created archive with {} files for search session {}",
                    self.prefix, built.entry_count, session.id
                );
            }
            Err(e) => {
                error!(
                    "[{}] Failed to build archive for session {}: {}",
                    self.prefix, session.id, e
                );
                let _ = reply.send(Outbound::Message {
                    text: format!("{} ❌ {}", mention(requester), e.user_message()),
                    action: None,
                });
            }
        }
    }

    /// Sends a file through the reply port, refusing anything over the
    /// transport's attachment ceiling before any bytes leave the process.
    fn send_file(
        &self,
        requester: &str,
        content: FileContent,
        reply: &ReplySender,
    ) -> Result<(), VaultError> {
        let size = content.data.len() as u64;
        if size > MAX_ATTACHMENT_BYTES {
            warn!(
                "[{}] Refusing to deliver {} ({} bytes over the {} byte limit)",
                self.prefix, content.filename, size, MAX_ATTACHMENT_BYTES
            );
            return Err(VaultError::SizeExceeded {
                size,
                limit: MAX_ATTACHMENT_BYTES,
            });
        }

        let _ = reply.send(Outbound::Message {
            text: mention(requester),
            action: None,
        });
        let _ = reply.send(Outbound::File {
            filename: content.filename,
            data: content.data,
        });
        Ok(())
    }

    /// Splits reply text into transport-sized chunks; the optional action is
    /// attached to the final chunk.
    fn send_chunked(&self, text: &str, action: Option<ActionButton>, reply: &ReplySender) {
        let mut chunks = split_into_chunks(text, MESSAGE_CHUNK_LIMIT);
        let last = chunks.pop();

        for chunk in chunks {
            let _ = reply.send(Outbound::Message {
                text: chunk,
                action: None,
            });
        }

        if let Some(chunk) = last {
            let _ = reply.send(Outbound::Message {
                text: chunk,
                action,
            });
        }
    }

    fn path_usage(&self, command_word: &str) -> String {
        if self.allow_nested() {
            format!(
                "Usage: `{} <path/to/filename>` or `{} <filename>`",
                command_word, command_word
            )
        } else {
            format!("Usage: `{} <filename>`", command_word)
        }
    }
}

/// Allocates a short session id not already present in the cache.
fn new_session_id(cache: &SessionCache) -> String {
    loop {
        let id = uuid::Uuid::new_v4().simple().to_string()[..8].to_string();
        if !cache.contains(&id) {
            return id;
        }
    }
}
