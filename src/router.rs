//! Command routing
//!
//! The process-scoped context object: owns the allow-list and the mapping
//! from command prefix to file manager, dispatches inbound transport events,
//! and answers the generated help command. Reload swaps in a freshly built
//! manager set; managers are never mutated in place.

use std::sync::Arc;

use log::{info, warn};
use tokio::sync::RwLock;

use crate::chunker::split_into_chunks;
use crate::commands::{Command, DOWNLOAD_ACTION_PREFIX, Verb};
use crate::config::VaultConfig;
use crate::error::VaultError;
use crate::manager::FileManager;
use crate::transport::{
    InboundEvent, InboundMessage, MESSAGE_CHUNK_LIMIT, Outbound, ReplySender,
};

/// Builds one manager per configured root.
pub fn build_managers(config: &VaultConfig) -> Result<Vec<Arc<FileManager>>, VaultError> {
    config
        .managers
        .iter()
        .map(|manager| FileManager::new(manager).map(Arc::new))
        .collect()
}

struct RouterState {
    operator_ids: Vec<String>,
    managers: Vec<Arc<FileManager>>,
}

impl RouterState {
    fn is_operator(&self, user_id: &str) -> bool {
        self.operator_ids.iter().any(|id| id == user_id)
    }

    fn is_help_word(&self, word: &str) -> bool {
        word == "$help" || self.managers.iter().any(|m| word == m.commands().help)
    }

    fn help_text(&self) -> String {
        let mut triggers = vec!["`$help`".to_string()];
        triggers.extend(
            self.managers
                .iter()
                .map(|m| format!("`{}`", m.commands().help)),
        );

        let mut text = String::from("### 📖 Help\n");
        text.push_str(&format!("{} - Show this message.\n", triggers.join(" | ")));

        for manager in &self.managers {
            let commands = manager.commands();
            let label = manager.item_label();

            text.push_str(&format!("### 📖 {} Files\n", label));
            if manager.allow_nested() {
                text.push_str(&format!(
                    "`{} [path]` - List files in the {} directory.\n",
                    commands.list, label
                ));
                text.push_str(&format!(
                    "`{} <path/to/filename>` - Get a {} file. Uploads the file in the channel.\n",
                    commands.read, label
                ));
                text.push_str(&format!(
                    "`{} [path]` - Upload a {} file. Requires an attachment. \
                     Replaces an existing file after uploading the old copy.\n",
                    commands.upload, label
                ));
                text.push_str(&format!(
                    "`{} <path/to/filename>` - Delete a {} file and upload it in the channel.\n",
                    commands.delete, label
                ));
                text.push_str(&format!(
                    "`{} <directory/path>` - Create a directory.\n",
                    commands.mkdir
                ));
                text.push_str(&format!(
                    "`{} <directory/path>` - Delete an empty directory.\n",
                    commands.rmdir
                ));
            } else {
                text.push_str(&format!(
                    "`{}` - List files in the {} directory.\n",
                    commands.list, label
                ));
                text.push_str(&format!(
                    "`{} <filename>` - Get a {} file. Uploads the file in the channel.\n",
                    commands.read, label
                ));
                text.push_str(&format!(
                    "`{} [filename]` - Upload a {} file. Requires an attachment. \
                     Replaces an existing file after uploading the old copy.\n",
                    commands.upload, label
                ));
                text.push_str(&format!(
                    "`{} <filename>` - Delete a {} file and upload it in the channel.\n",
                    commands.delete, label
                ));
            }
            text.push_str(&format!(
                "`{} <prefix>` - Search for files starting with the prefix. \
                 Results can be downloaded as a ZIP.\n",
                commands.search
            ));
        }

        text
    }
}

/// Dispatches transport events to file managers by command prefix.
pub struct Router {
    state: RwLock<RouterState>,
}

impl Router {
    pub fn new(operator_ids: Vec<String>, managers: Vec<Arc<FileManager>>) -> Self {
        Self {
            state: RwLock::new(RouterState {
                operator_ids,
                managers,
            }),
        }
    }

    /// Replaces the allow-list and manager set with a freshly built one.
    pub async fn reload(&self, config: &VaultConfig) -> Result<(), VaultError> {
        let managers = build_managers(config)?;
        let mut state = self.state.write().await;
        state.operator_ids = config.operator_ids.clone();
        state.managers = managers;
        info!("Reloaded {} file managers", state.managers.len());
        Ok(())
    }

    /// Routes one inbound event. Each command runs as an isolated failure
    /// domain inside its manager; nothing here can take the loop down.
    pub async fn dispatch(&self, event: InboundEvent, reply: &ReplySender) {
        match event {
            InboundEvent::Message(message) => self.dispatch_message(message, reply).await,
            InboundEvent::Action {
                author_id,
                action_id,
            } => self.dispatch_action(&author_id, &action_id, reply).await,
        }
    }

    async fn dispatch_message(&self, message: InboundMessage, reply: &ReplySender) {
        let Some(first_word) = message.content.split_whitespace().next() else {
            return;
        };

        let routed = {
            let state = self.state.read().await;

            // Unknown senders are ignored outright, like any other chatter
            // in the channel.
            if !state.is_operator(&message.author_id) {
                return;
            }

            if state.is_help_word(first_word) {
                Routed::Help(state.help_text())
            } else {
                let mut found = Routed::None;
                for manager in &state.managers {
                    if let Some((verb, argument)) = manager.parse_content(&message.content) {
                        found = Routed::Manager(Arc::clone(manager), verb, argument);
                        break;
                    }
                }
                found
            }
        };

        match routed {
            Routed::Help(text) => {
                let text = format!("<@{}>\n{}", message.author_id, text);
                for chunk in split_into_chunks(&text, MESSAGE_CHUNK_LIMIT) {
                    let _ = reply.send(Outbound::Message {
                        text: chunk,
                        action: None,
                    });
                }
            }
            Routed::Manager(manager, verb, argument) => {
                info!(
                    "Routing {} command to [{}] for {}",
                    verb.name(),
                    manager.prefix(),
                    message.author_id
                );
                let command = Command {
                    verb,
                    argument,
                    attachments: message.attachments,
                    requester_id: message.author_id,
                };
                manager.handle(command, reply).await;
            }
            Routed::None => {}
        }
    }

    async fn dispatch_action(&self, author_id: &str, action_id: &str, reply: &ReplySender) {
        let Some(session_id) = action_id.strip_prefix(DOWNLOAD_ACTION_PREFIX) else {
            return;
        };

        let managers = {
            let state = self.state.read().await;

            if !state.is_operator(author_id) {
                warn!(
                    "Rejected {} action from non-operator {}",
                    action_id, author_id
                );
                let _ = reply.send(Outbound::Message {
                    text: format!(
                        "<@{}> ❌ You don't have permission to use this action.",
                        author_id
                    ),
                    action: None,
                });
                return;
            }

            state.managers.clone()
        };

        for manager in &managers {
            if let Some(session) = manager.take_session(session_id).await {
                manager.deliver_archive(session, author_id, reply).await;
                return;
            }
        }

        let _ = reply.send(Outbound::Message {
            text: format!(
                "<@{}> ❌ Search results have expired. Please run the search again.",
                author_id
            ),
            action: None,
        });
    }
}

enum Routed {
    None,
    Help(String),
    Manager(Arc<FileManager>, Verb, String),
}
