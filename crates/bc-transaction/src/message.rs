use serde::{Deserialize, Serialize};

use crate::NodeId;

/// The tag of an inter-process message (`spec.md` §3, §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageKind {
    #[serde(rename = "TRANSACTION")]
    Transaction,
    #[serde(rename = "BLOCK")]
    Block,
}

/// The outer broadcast-fabric envelope: `{sender, message, pl}`
/// (`spec.md` §6). `pl` carries the JSON-encoded signed envelope as a string
/// — a tagged variant at this layer, rather than a free-form dictionary,
/// while still matching the wire shape the original implementation used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireMessage {
    pub sender: NodeId,
    pub message: MessageKind,
    pub pl: String,
}

impl WireMessage {
    pub fn transaction(sender: NodeId, envelope_json: String) -> Self {
        Self {
            sender,
            message: MessageKind::Transaction,
            pl: envelope_json,
        }
    }

    pub fn block(sender: NodeId, envelope_json: String) -> Self {
        Self {
            sender,
            message: MessageKind::Block,
            pl: envelope_json,
        }
    }
}
