//! Scenario selection.
//!
//! The scenario is re-evaluated fresh each turn from the loaded draft and
//! whether the turn carries any input; no state machine state survives
//! between turns beyond the draft itself.

use vitrin_core::draft::ProductDraft;

/// The authoring scenarios from the conversation's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    /// No prior turns and no input: greet.
    Welcome,
    /// Required fields still missing: collect them.
    Gathering,
    /// Name, price and a photo are present, nothing generated yet.
    ReadyToOptimize,
    /// Generated content present: only explicit save/publish moves forward.
    AwaitingSave,
}

/// Picks the scenario for this turn.
pub fn classify(draft: &ProductDraft, has_input: bool) -> Scenario {
    if draft.generated.is_some() {
        Scenario::AwaitingSave
    } else if draft.ready_for_optimize() {
        Scenario::ReadyToOptimize
    } else if draft.is_empty() && !has_input {
        Scenario::Welcome
    } else {
        Scenario::Gathering
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrin_core::draft::{GeneratedContent, ImageRef};

    fn ready_draft() -> ProductDraft {
        ProductDraft {
            raw_name: Some("Kids Bed".to_string()),
            price_minor: Some(420_000),
            images: vec![ImageRef::staged(vec![0])],
            ..Default::default()
        }
    }

    #[test]
    fn empty_draft_without_input_is_welcome() {
        assert_eq!(classify(&ProductDraft::default(), false), Scenario::Welcome);
    }

    #[test]
    fn empty_draft_with_input_is_gathering() {
        assert_eq!(classify(&ProductDraft::default(), true), Scenario::Gathering);
    }

    #[test]
    fn partial_draft_is_gathering_even_without_input() {
        let draft = ProductDraft {
            raw_name: Some("Kids Bed".to_string()),
            ..Default::default()
        };
        assert_eq!(classify(&draft, false), Scenario::Gathering);
    }

    #[test]
    fn complete_draft_is_ready_to_optimize() {
        assert_eq!(classify(&ready_draft(), true), Scenario::ReadyToOptimize);
    }

    #[test]
    fn generated_content_moves_to_awaiting_save() {
        let mut draft = ready_draft();
        draft.generated = Some(GeneratedContent::default());
        assert_eq!(classify(&draft, true), Scenario::AwaitingSave);
    }
}
