//! Intent resolver collaborator.

use crate::draft::ProductDraft;
use crate::error::Result;
use crate::tool::ToolRequest;
use async_trait::async_trait;

/// Classifies free text into the closed [`ToolRequest`] set.
///
/// Consulted only when the orchestrator's deterministic shortcuts do not
/// match; those shortcuts short-circuit this collaborator entirely. A
/// resolver never executes anything itself and `None` means "no tool
/// applies", which the orchestrator answers with a scenario-appropriate
/// prompt.
#[async_trait]
pub trait IntentResolver: Send + Sync {
    async fn resolve(&self, text: &str, draft: &ProductDraft) -> Result<Option<ToolRequest>>;
}
