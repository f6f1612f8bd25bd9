//! Console transport adapter
//!
//! Drives the router from stdin/stdout for local operation. Each input line
//! is an inbound message from the configured operator; a line consisting of
//! a download action token triggers that action, and `!attach <path> <cmd>`
//! reads a local file as the message attachment. Delivered files are saved
//! under `downloads/`.

use std::path::Path;
use std::sync::Arc;

use log::{error, info};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::commands::DOWNLOAD_ACTION_PREFIX;
use crate::config::VaultConfig;
use crate::router::Router;
use crate::transport::{Attachment, InboundEvent, InboundMessage, Outbound};

const DOWNLOAD_DIR: &str = "downloads";

/// Runs the console session until stdin closes or `!quit` is entered.
pub async fn run(router: Arc<Router>, operator_id: String) {
    let (tx, mut rx) = mpsc::unbounded_channel();

    let printer = tokio::spawn(async move {
        while let Some(outbound) = rx.recv().await {
            match outbound {
                Outbound::Message { text, action } => {
                    println!("{}", text);
                    if let Some(action) = action {
                        println!("[action: type `{}` to trigger it]", action.id);
                    }
                }
                Outbound::File { filename, data } => match save_delivery(&filename, &data).await {
                    Ok(path) => {
                        println!("[file delivered: {} ({} bytes) -> {}]", filename, data.len(), path);
                    }
                    Err(e) => {
                        error!("Failed to save delivered file {}: {}", filename, e);
                    }
                },
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Ok(Some(line)) = lines.next_line().await {
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }

        if line == "!quit" {
            break;
        }

        if line == "!reload" {
            match VaultConfig::load() {
                Ok(config) => match router.reload(&config).await {
                    Ok(()) => println!("[config and file managers reloaded]"),
                    Err(e) => error!("Reload failed: {}", e),
                },
                Err(e) => error!("Reload failed, keeping the current configuration: {}", e),
            }
            continue;
        }

        let event = if line.starts_with(DOWNLOAD_ACTION_PREFIX) {
            InboundEvent::Action {
                author_id: operator_id.clone(),
                action_id: line,
            }
        } else if let Some(rest) = line.strip_prefix("!attach ") {
            match attach_message(rest, &operator_id).await {
                Some(message) => InboundEvent::Message(message),
                None => continue,
            }
        } else {
            InboundEvent::Message(InboundMessage {
                author_id: operator_id.clone(),
                content: line,
                attachments: Vec::new(),
            })
        };

        router.dispatch(event, &tx).await;
    }

    drop(tx);
    let _ = printer.await;
    info!("Console session ended");
}

/// Parses `!attach <local-path> <command...>` into a message carrying the
/// local file as its attachment.
async fn attach_message(rest: &str, operator_id: &str) -> Option<InboundMessage> {
    let mut parts = rest.trim().splitn(2, ' ');
    let local_path = parts.next().unwrap_or("");
    let content = parts.next().unwrap_or("").trim().to_string();

    if local_path.is_empty() || content.is_empty() {
        error!("Usage: !attach <local-path> <command>");
        return None;
    }

    match tokio::fs::read(local_path).await {
        Ok(data) => {
            let filename = Path::new(local_path)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| local_path.to_string());
            Some(InboundMessage {
                author_id: operator_id.to_string(),
                content,
                attachments: vec![Attachment { filename, data }],
            })
        }
        Err(e) => {
            error!("Cannot read attachment {}: {}", local_path, e);
            None
        }
    }
}

async fn save_delivery(filename: &str, data: &[u8]) -> std::io::Result<String> {
    tokio::fs::create_dir_all(DOWNLOAD_DIR).await?;

    let name = Path::new(filename)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "delivery.bin".to_string());
    let path = Path::new(DOWNLOAD_DIR).join(name);

    tokio::fs::write(&path, data).await?;
    Ok(path.to_string_lossy().into_owned())
}
