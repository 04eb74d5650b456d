//! The update-details tool.

use super::ToolReply;
use vitrin_core::draft::{DetailPatch, ProductDraft};

/// Merges the non-empty fields of `patch` into the draft. No cross-field
/// validation; always succeeds.
pub fn update_details(draft: &mut ProductDraft, patch: DetailPatch) -> ToolReply {
    if patch.is_empty() {
        return ToolReply::text(
            "I didn't catch any product details in that. You can send a name, a price, or photos.",
        );
    }

    let touched = draft.apply(patch);
    tracing::debug!(?touched, "draft details updated");

    let mut text = format!("Got it, noted the {}.", touched.join(", "));
    if draft.ready_for_optimize() {
        text.push_str(" Everything I need is here. Say \"optimize\" and I'll write the listing.");
    } else {
        text.push_str(&format!(
            " I still need: {}.",
            draft.missing_fields().join(", ")
        ));
    }
    ToolReply::text(text)
}
