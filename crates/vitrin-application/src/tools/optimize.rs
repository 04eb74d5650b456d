//! The optimize tool.
//!
//! Gated on name, price and at least one image; that gate is the only
//! writer of `draft.generated`, which keeps the draft invariant without
//! further checks anywhere else.

use super::{Collaborators, ToolReply, degrade, format_price};
use futures::future::try_join_all;
use vitrin_core::Result;
use vitrin_core::draft::{ImageSource, ProductDraft};
use vitrin_core::generation::StoreContext;

/// Runs the content generator over a complete draft and replaces
/// `draft.generated` wholesale.
pub async fn optimize(draft: &mut ProductDraft, collaborators: &Collaborators) -> ToolReply {
    if !draft.ready_for_optimize() {
        return ToolReply::text(format!(
            "Before I can optimize I still need: {}. Send the rest and we're good to go.",
            draft.missing_fields().join(", ")
        ));
    }

    // Pull pixel data for URL-only images so the generator can caption
    // them. Fetched bytes are written back into the draft, which makes the
    // draft itself the per-session fetch cache.
    if let Err(err) = fetch_missing_bytes(draft, collaborators).await {
        return degrade(err);
    }

    let context = build_store_context(collaborators).await;
    let content = match collaborators.generator.generate(draft, &context).await {
        Ok(content) => content,
        Err(err) => return degrade(err),
    };

    for (image, alt) in draft.images.iter_mut().zip(content.image_alts.iter()) {
        image.alt_text = Some(alt.clone());
    }

    let price = content
        .price_minor
        .or(draft.price_minor)
        .map(format_price)
        .unwrap_or_default();
    let preview = if draft.edit_target_id.is_some() {
        format!(
            "Here's the refreshed content for \"{}\" (price {}):\n{}\n\nTags: {}\nUse the save action to update the listing.",
            content.name,
            price,
            content.short_description,
            content.tags.join(", ")
        )
    } else {
        format!(
            "Here's your optimized listing \"{}\" (price {}):\n{}\n\nTags: {}\nSave it as a draft or publish it when you're happy.",
            content.name,
            price,
            content.short_description,
            content.tags.join(", ")
        )
    };

    draft.generated = Some(content);
    ToolReply::text(preview)
}

/// Fetches bytes for every image that only has a URL, concurrently, and
/// joins on the whole batch before any result is written back.
async fn fetch_missing_bytes(draft: &mut ProductDraft, collaborators: &Collaborators) -> Result<()> {
    let pending: Vec<(usize, String)> = draft
        .images
        .iter()
        .enumerate()
        .filter_map(|(index, image)| image.url().map(|url| (index, url.to_string())))
        .collect();
    if pending.is_empty() {
        return Ok(());
    }

    tracing::debug!(count = pending.len(), "fetching image bytes for generation");
    let fetcher = collaborators.fetcher.as_ref();
    let fetched = try_join_all(pending.into_iter().map(|(index, url)| async move {
        let bytes = fetcher.fetch(&url).await?;
        Ok::<_, vitrin_core::VitrinError>((index, bytes))
    }))
    .await?;

    for (index, bytes) in fetched {
        draft.images[index].source = ImageSource::Bytes(bytes);
    }
    Ok(())
}

/// Assembles the store context for the generator. Context sources are
/// ancillary: a failing settings read or category listing degrades to an
/// empty section with a warning rather than blocking the generation.
async fn build_store_context(collaborators: &Collaborators) -> StoreContext {
    let settings = match collaborators.settings.load().await {
        Ok(settings) => settings,
        Err(err) => {
            tracing::warn!(error = %err, "settings unavailable, generating without them");
            Default::default()
        }
    };
    let category_names = match collaborators.commerce.list_categories().await {
        Ok(categories) => categories.into_iter().map(|c| c.name).collect(),
        Err(err) => {
            tracing::warn!(error = %err, "category listing failed, generating without it");
            Vec::new()
        }
    };

    StoreContext {
        contact_links: settings.contact_links,
        keyword_guide: settings.keyword_guide,
        category_names,
        trend_signals: settings.trend_signals,
    }
}
