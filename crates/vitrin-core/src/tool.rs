//! The closed tool-request set.
//!
//! Every operation the orchestrator can run against a draft is one of these
//! named, precondition-gated variants. The intent resolver classifies free
//! text into this set and nothing else; it is never an unconstrained
//! executor.

use crate::commerce::EntryStatus;
use crate::draft::DetailPatch;
use serde::{Deserialize, Serialize};

/// A named operation over the current draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tool", rename_all = "snake_case")]
pub enum ToolRequest {
    /// Merge the non-empty fields of the patch into the draft.
    UpdateDetails { patch: DetailPatch },
    /// Run the content generator over a complete draft.
    Optimize,
    /// Announce the edited entry on the configured messaging channel.
    PostToChannel {
        topic: String,
        #[serde(default)]
        tone: Option<String>,
    },
    /// Push the draft to the commerce store as a create or update.
    SaveOrUpdate { status: EntryStatus },
    /// Produce three ranked product ideas from trend signals.
    SuggestIdeas,
}
