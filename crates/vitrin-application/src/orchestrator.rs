//! The dialogue orchestrator.
//!
//! Owns the working copy of the draft for the duration of one turn and is
//! the only writer back to the session store. Scenario selection is
//! re-evaluated fresh each turn; deterministic shortcuts (confirmation
//! keywords, field extraction) run before the intent resolver is ever
//! consulted.

use crate::extract::extract_detail_patch;
use crate::intent::is_confirmation;
use crate::scenario::{Scenario, classify};
use crate::tools::{
    Collaborators, ToolReply, degrade, format_price, optimize, post_to_channel, save_or_update,
    suggest_ideas, update_details,
};
use std::sync::Arc;
use vitrin_core::Result;
use vitrin_core::commerce::CatalogEntry;
use vitrin_core::draft::{DetailPatch, ImageRef, ProductDraft};
use vitrin_core::intent::IntentResolver;
use vitrin_core::session::SessionStore;
use vitrin_core::tool::ToolRequest;
use vitrin_core::turn::{ImageUpload, TurnAction, TurnInput, TurnReply};

const GREETING: &str = "Hi! Send me a product name, a price and a photo or two, \
and I'll write the whole listing for you.";
const AWAITING_SAVE_HINT: &str = "The listing is ready. Use the save or publish \
action to finish it, or load another product to start over.";

/// Meta field key the original listings use for SEO focus keywords.
const SEO_KEYWORDS_META: &str = "seo_keywords";

/// The per-conversation authoring state machine.
pub struct Orchestrator {
    store: Arc<dyn SessionStore>,
    resolver: Arc<dyn IntentResolver>,
    collaborators: Collaborators,
}

impl Orchestrator {
    /// Creates an orchestrator over an injected store and collaborators.
    pub fn new(
        store: Arc<dyn SessionStore>,
        resolver: Arc<dyn IntentResolver>,
        collaborators: Collaborators,
    ) -> Self {
        Self {
            store,
            resolver,
            collaborators,
        }
    }

    /// Handles one inbound turn: load, act, persist, reply.
    ///
    /// # Errors
    ///
    /// Returns an error only when the session store is unavailable; every
    /// collaborator failure degrades into the reply text instead.
    pub async fn handle_turn(&self, session_id: &str, input: TurnInput) -> Result<TurnReply> {
        let mut draft = self.store.load(session_id).await?;

        let reply = match input {
            TurnInput::Action(action) => self.handle_action(&mut draft, action).await,
            TurnInput::Message { text, images } => {
                self.handle_message(&mut draft, text, images).await
            }
        };

        if reply.close_session {
            self.store.delete(session_id).await?;
        } else {
            self.store.save(session_id, &draft).await?;
        }
        tracing::debug!(
            session_id,
            closed = reply.close_session,
            rate_limited = reply.retry_after.is_some(),
            "turn complete"
        );

        Ok(TurnReply {
            text: reply.text,
            retry_after: reply.retry_after,
        })
    }

    async fn handle_action(&self, draft: &mut ProductDraft, action: TurnAction) -> ToolReply {
        match action {
            TurnAction::LoadForEdit { entry_id } => self.load_for_edit(draft, entry_id).await,
            TurnAction::Save { status } => {
                save_or_update(draft, &self.collaborators, status).await
            }
            TurnAction::PostToChannel { topic, tone } => {
                post_to_channel(draft, &self.collaborators, &topic, tone.as_deref()).await
            }
            TurnAction::SuggestIdeas => suggest_ideas(&self.collaborators).await,
        }
    }

    async fn handle_message(
        &self,
        draft: &mut ProductDraft,
        text: Option<String>,
        images: Vec<ImageUpload>,
    ) -> ToolReply {
        let text = text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty());
        let has_input = text.is_some() || !images.is_empty();

        match classify(draft, has_input) {
            Scenario::Welcome => ToolReply::text(GREETING),
            Scenario::AwaitingSave => ToolReply::text(AWAITING_SAVE_HINT),
            Scenario::Gathering => self.gather(draft, text, images),
            Scenario::ReadyToOptimize => self.confirm_or_resolve(draft, text, images).await,
        }
    }

    /// S2: merge whatever the turn deterministically contains, otherwise
    /// ask for the specific missing fields.
    fn gather(
        &self,
        draft: &mut ProductDraft,
        text: Option<String>,
        images: Vec<ImageUpload>,
    ) -> ToolReply {
        let mut patch = text
            .as_deref()
            .map(|t| extract_detail_patch(t, draft))
            .unwrap_or_default();
        patch.images = images
            .into_iter()
            .map(|upload| ImageRef::staged(upload.bytes))
            .collect();

        if patch.is_empty() {
            return ToolReply::text(format!(
                "I still need: {}. Send them in any order.",
                draft.missing_fields().join(", ")
            ));
        }
        update_details(draft, patch)
    }

    /// S3: confirmation keywords short-circuit straight into optimize;
    /// anything else goes to the intent resolver, which may only pick from
    /// the closed tool set.
    async fn confirm_or_resolve(
        &self,
        draft: &mut ProductDraft,
        text: Option<String>,
        images: Vec<ImageUpload>,
    ) -> ToolReply {
        if let Some(text) = &text {
            if is_confirmation(text) {
                return optimize(draft, &self.collaborators).await;
            }
        }

        if !images.is_empty() {
            let patch = DetailPatch {
                images: images
                    .into_iter()
                    .map(|upload| ImageRef::staged(upload.bytes))
                    .collect(),
                ..Default::default()
            };
            return update_details(draft, patch);
        }

        if let Some(text) = text {
            match self.resolver.resolve(&text, draft).await {
                Ok(Some(request)) => return self.dispatch(draft, request).await,
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(error = %err, "intent resolver failed, falling back to summary");
                }
            }
        }

        ToolReply::text(self.summary(draft))
    }

    /// Runs one tool from the closed request set against the draft.
    async fn dispatch(&self, draft: &mut ProductDraft, request: ToolRequest) -> ToolReply {
        match request {
            ToolRequest::UpdateDetails { patch } => update_details(draft, patch),
            ToolRequest::Optimize => optimize(draft, &self.collaborators).await,
            ToolRequest::PostToChannel { topic, tone } => {
                post_to_channel(draft, &self.collaborators, &topic, tone.as_deref()).await
            }
            ToolRequest::SaveOrUpdate { status } => {
                save_or_update(draft, &self.collaborators, status).await
            }
            ToolRequest::SuggestIdeas => suggest_ideas(&self.collaborators).await,
        }
    }

    /// S1: fetch an existing entry and reverse-map it into a draft.
    async fn load_for_edit(&self, draft: &mut ProductDraft, entry_id: u64) -> ToolReply {
        if !draft.is_empty() && draft.edit_target_id != Some(entry_id) {
            return ToolReply::text(
                "You already have a draft in progress. Save it or let it expire before \
                 loading another product.",
            );
        }

        match self.collaborators.commerce.get_entry(entry_id).await {
            Ok(Some(entry)) => {
                let name = entry.name.clone();
                let image_count = entry.images.len();
                *draft = draft_from_entry(entry);
                ToolReply::text(format!(
                    "Loaded \"{name}\" ({image_count} photo(s)) for editing. Tell me what \
                     to change, or say \"optimize\" to rewrite the content."
                ))
            }
            Ok(None) => ToolReply::text(format!(
                "I couldn't find product {entry_id} in the store."
            )),
            Err(err) => degrade(err),
        }
    }

    fn summary(&self, draft: &ProductDraft) -> String {
        let name = draft.display_name().unwrap_or("(unnamed)");
        let price = draft
            .price_minor
            .map(format_price)
            .unwrap_or_else(|| "?".to_string());
        format!(
            "Ready to go: \"{name}\", price {price}, {} photo(s). Say \"optimize\" and \
             I'll write the listing.",
            draft.images.len()
        )
    }
}

/// Reverse-maps a stored entry into a draft for editing: price to a
/// number, material from its named attribute, keywords from the SEO meta
/// field or tag names, images with their existing external ids.
pub(crate) fn draft_from_entry(entry: CatalogEntry) -> ProductDraft {
    let focus_keywords = entry
        .meta_value(SEO_KEYWORDS_META)
        .map(|value| {
            value
                .split(',')
                .map(|part| part.trim().to_string())
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
        })
        .filter(|keywords| !keywords.is_empty())
        .unwrap_or_else(|| entry.tags.clone());

    ProductDraft {
        raw_name: Some(entry.name.clone()),
        price_minor: entry.price_minor,
        material: entry.attribute_value("material").map(str::to_string),
        localized_name: None,
        focus_keywords,
        images: entry
            .images
            .iter()
            .map(|image| ImageRef::existing(image.id, image.url.clone(), image.alt.clone()))
            .collect(),
        generated: None,
        edit_target_id: Some(entry.id),
    }
}