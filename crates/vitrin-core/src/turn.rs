//! Inbound turn and reply types shared between the transport adapter and
//! the orchestrator.

use crate::commerce::EntryStatus;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One inbound user turn: either a free-form chat message or an explicit
/// action from the chat surface (buttons, commands).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TurnInput {
    Message {
        text: Option<String>,
        #[serde(default)]
        images: Vec<ImageUpload>,
    },
    Action(TurnAction),
}

impl TurnInput {
    /// A text-only message turn.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Message {
            text: Some(text.into()),
            images: Vec::new(),
        }
    }

    /// An empty opening turn.
    pub fn empty() -> Self {
        Self::Message {
            text: None,
            images: Vec::new(),
        }
    }
}

/// Raw image bytes attached to a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub file_name: Option<String>,
}

/// An explicit, unambiguous action the caller requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TurnAction {
    /// Load an existing catalog entry into the draft for editing.
    LoadForEdit { entry_id: u64 },
    /// Save the draft to the commerce store.
    Save { status: EntryStatus },
    /// Announce the edited entry on the messaging channel.
    PostToChannel {
        topic: String,
        #[serde(default)]
        tone: Option<String>,
    },
    /// Ask for product ideas from trend signals.
    SuggestIdeas,
}

/// The orchestrator's answer for one turn.
///
/// `retry_after` is set when an external collaborator rate-limited the
/// turn, so the caller can present a countdown and resubmit the identical
/// input once it elapses.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnReply {
    pub text: String,
    pub retry_after: Option<Duration>,
}

impl TurnReply {
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            retry_after: None,
        }
    }
}
