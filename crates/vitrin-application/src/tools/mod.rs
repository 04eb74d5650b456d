//! The tool implementations.
//!
//! Each tool is a function of the working draft, the collaborators and its
//! arguments, returning a [`ToolReply`]. Preconditions fail closed into
//! clarifying questions and collaborator failures degrade into apologies;
//! no error ever escapes a tool.

mod optimize;
mod post_to_channel;
mod save_or_update;
mod suggest;
mod update_details;

pub use optimize::optimize;
pub use post_to_channel::post_to_channel;
pub use save_or_update::save_or_update;
pub use suggest::suggest_ideas;
pub use update_details::update_details;

use std::sync::Arc;
use std::time::Duration;
use vitrin_core::VitrinError;
use vitrin_core::commerce::CommerceApi;
use vitrin_core::fetch::ImageFetcher;
use vitrin_core::generation::ContentGenerator;
use vitrin_core::messaging::MessagingTransport;
use vitrin_core::settings::SettingsProvider;

/// The external collaborators a tool may call. Injected once at
/// construction; tools receive them by reference and never reach for
/// globals.
#[derive(Clone)]
pub struct Collaborators {
    pub commerce: Arc<dyn CommerceApi>,
    pub generator: Arc<dyn ContentGenerator>,
    pub messaging: Arc<dyn MessagingTransport>,
    pub settings: Arc<dyn SettingsProvider>,
    pub fetcher: Arc<dyn ImageFetcher>,
}

/// What a tool hands back to the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolReply {
    /// The response text for the user
    pub text: String,
    /// Set when a collaborator rate-limited the call
    pub retry_after: Option<Duration>,
    /// True when the session should be deleted instead of saved
    pub close_session: bool,
}

impl ToolReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            retry_after: None,
            close_session: false,
        }
    }

    pub fn closing(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            retry_after: None,
            close_session: true,
        }
    }
}

/// Turns a collaborator failure into a user-facing reply: rate limits get a
/// countdown affordance, everything else an apology carrying the upstream
/// message. The turn still completes and the draft is still persisted.
pub(crate) fn degrade(err: VitrinError) -> ToolReply {
    if let Some(retry_after) = err.retry_after() {
        tracing::warn!(?retry_after, "collaborator rate limited");
        return ToolReply {
            text: format!(
                "The service is busy right now. Please try again in {} seconds; I kept everything as it was.",
                retry_after.as_secs()
            ),
            retry_after: Some(retry_after),
            close_session: false,
        };
    }
    tracing::warn!(error = %err, "collaborator call failed");
    ToolReply::text(format!(
        "Sorry, that didn't work: {}. Your draft is unchanged, so you can simply try again.",
        err.upstream_message()
    ))
}

/// Formats minor units for display, dropping the fraction when it is zero.
pub(crate) fn format_price(minor: i64) -> String {
    if minor % 100 == 0 {
        format!("{}", minor / 100)
    } else {
        format!("{}.{:02}", minor / 100, (minor % 100).abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limits_degrade_with_a_retry_affordance() {
        let reply = degrade(VitrinError::rate_limited(
            "generator",
            Duration::from_secs(45),
            "busy",
        ));
        assert_eq!(reply.retry_after, Some(Duration::from_secs(45)));
        assert!(reply.text.contains("45"));
        assert!(!reply.close_session);
    }

    #[test]
    fn other_failures_degrade_with_the_upstream_message() {
        let reply = degrade(VitrinError::external("commerce", "store exploded"));
        assert_eq!(reply.retry_after, None);
        assert!(reply.text.contains("store exploded"));
    }

    #[test]
    fn price_formatting_drops_zero_fractions() {
        assert_eq!(format_price(420_000), "4200");
        assert_eq!(format_price(420_050), "4200.50");
    }
}
