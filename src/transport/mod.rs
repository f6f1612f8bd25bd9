//! Chat transport port
//!
//! Event and reply types at the boundary between the vault core and the
//! external chat transport. The transport owns its connection lifecycle;
//! the core only consumes inbound events and posts outbound replies through
//! an mpsc channel, so handlers and deferred completion tasks reply through
//! one uniform port.

pub mod console;

use tokio::sync::mpsc;

/// Attachment ceiling inherited from the host chat transport (8 MiB).
pub const MAX_ATTACHMENT_BYTES: u64 = 8 * 1024 * 1024;

/// Per-message character limit; replies longer than this are chunked.
pub const MESSAGE_CHUNK_LIMIT: usize = 1900;

/// A file attached to an inbound message, already fetched by the transport.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub filename: String,
    pub data: Vec<u8>,
}

/// A text message received from the chat transport.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub author_id: String,
    pub content: String,
    pub attachments: Vec<Attachment>,
}

/// An event delivered by the transport to the router.
#[derive(Debug, Clone)]
pub enum InboundEvent {
    Message(InboundMessage),
    /// A follow-up interactive action, e.g. a pressed download button.
    Action { author_id: String, action_id: String },
}

/// An interactive action offered alongside a reply message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionButton {
    pub id: String,
    pub label: String,
}

/// A reply posted back to the chat transport.
#[derive(Debug, Clone)]
pub enum Outbound {
    Message {
        text: String,
        action: Option<ActionButton>,
    },
    File {
        filename: String,
        data: Vec<u8>,
    },
}

/// Sending half of the reply port. Cloned into deferred tasks so completion
/// replies travel the same channel as synchronous ones.
pub type ReplySender = mpsc::UnboundedSender<Outbound>;

/// Receiving half of the reply port, drained by the transport adapter.
pub type ReplyReceiver = mpsc::UnboundedReceiver<Outbound>;
