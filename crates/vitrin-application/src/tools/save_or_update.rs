//! The save-or-update tool.
//!
//! Uploads pending images in parallel, builds the final payload preferring
//! generated content over raw draft fields, and pushes a create or update
//! to the commerce store. All mutation happens on a working copy so a
//! failed save leaves the draft byte-for-byte unchanged and a retry sends
//! the identical request.

use super::{Collaborators, ToolReply, degrade};
use futures::future::try_join_all;
use uuid::Uuid;
use vitrin_core::VitrinError;
use vitrin_core::commerce::{
    AttributePayload, Category, CategoryRef, EntryPayload, EntryStatus, ImagePayload,
};
use vitrin_core::draft::{ImageSource, MetaField, ProductDraft};
use vitrin_imaging::composite_watermark;

/// Pushes the draft to the commerce store. On success the orchestrator
/// deletes the session, closing the transaction so a duplicate
/// confirmation cannot re-create the entry.
pub async fn save_or_update(
    draft: &ProductDraft,
    collaborators: &Collaborators,
    status: EntryStatus,
) -> ToolReply {
    if draft.generated.is_none() && draft.edit_target_id.is_none() {
        return ToolReply::text(
            "There's nothing to save yet. Run the optimization first, then save or publish.",
        );
    }

    let mut working = draft.clone();

    let categories = match collaborators.commerce.list_categories().await {
        Ok(categories) => categories,
        Err(err) => return degrade(err),
    };

    if let Err(err) = upload_pending_images(&mut working, collaborators).await {
        return degrade(err);
    }

    let payload = build_payload(&working, &categories, status);
    let result = match working.edit_target_id {
        Some(id) => collaborators.commerce.update_entry(id, &payload).await,
        None => collaborators.commerce.create_entry(&payload).await,
    };

    match result {
        Ok(entry) => {
            tracing::info!(entry_id = entry.id, status = %status, "catalog entry saved");
            let verb = if draft.edit_target_id.is_some() {
                "updated"
            } else {
                "saved"
            };
            ToolReply::closing(format!(
                "Done! \"{}\" was {} as {}. Send me a new product whenever you're ready.",
                entry.name, verb, status
            ))
        }
        Err(err) => degrade(err),
    }
}

/// Uploads every image that has local bytes but no external id yet, in
/// parallel, waiting on the whole batch before any id is recorded. The
/// watermark from settings is composited in first when one is configured.
async fn upload_pending_images(
    working: &mut ProductDraft,
    collaborators: &Collaborators,
) -> Result<(), VitrinError> {
    let watermark = match collaborators.settings.load().await {
        Ok(settings) => settings.watermark,
        Err(err) => {
            tracing::warn!(error = %err, "settings unavailable, uploading without watermark");
            None
        }
    };

    let base_name = slug_base(working);
    let mut pending: Vec<(usize, Vec<u8>, String)> = Vec::new();
    for (index, image) in working.images.iter().enumerate() {
        if image.external_id.is_some() {
            continue;
        }
        let Some(bytes) = image.bytes() else { continue };
        let bytes = match &watermark {
            Some(spec) => match composite_watermark(bytes, spec) {
                Ok(stamped) => stamped,
                Err(err) => {
                    tracing::warn!(error = %err, "watermark compositing failed, uploading original");
                    bytes.to_vec()
                }
            },
            None => bytes.to_vec(),
        };
        pending.push((index, bytes, format!("{base_name}-{}.jpg", Uuid::new_v4())));
    }
    if pending.is_empty() {
        return Ok(());
    }

    tracing::debug!(count = pending.len(), "uploading images");
    let commerce = collaborators.commerce.as_ref();
    let uploaded = try_join_all(pending.into_iter().map(|(index, bytes, name)| async move {
        let result = commerce.upload_image(bytes, &name).await?;
        Ok::<_, VitrinError>((index, result))
    }))
    .await?;

    for (index, upload) in uploaded {
        working.images[index].external_id = Some(upload.id);
        working.images[index].source = ImageSource::Url(upload.url);
    }
    Ok(())
}

/// Builds the final entry payload, preferring generated fields over the
/// raw draft fallbacks.
fn build_payload(
    working: &ProductDraft,
    known_categories: &[Category],
    status: EntryStatus,
) -> EntryPayload {
    let generated = working.generated.as_ref();

    let name = generated
        .map(|g| g.name.clone())
        .or_else(|| working.localized_name.clone())
        .or_else(|| working.raw_name.clone())
        .unwrap_or_default();

    let mut attributes: Vec<AttributePayload> = generated
        .map(|g| g.attributes.iter().cloned().map(Into::into).collect())
        .unwrap_or_default();
    if let Some(material) = &working.material {
        let already = attributes
            .iter()
            .any(|attr| attr.name.eq_ignore_ascii_case("material"));
        if !already {
            attributes.push(AttributePayload {
                name: "Material".to_string(),
                values: vec![material.clone()],
            });
        }
    }

    let mut meta_fields: Vec<MetaField> =
        generated.map(|g| g.meta_fields.clone()).unwrap_or_default();
    if !working.focus_keywords.is_empty()
        && !meta_fields
            .iter()
            .any(|field| field.key.eq_ignore_ascii_case("seo_keywords"))
    {
        meta_fields.push(MetaField {
            key: "seo_keywords".to_string(),
            value: working.focus_keywords.join(", "),
        });
    }

    EntryPayload {
        name,
        sku: generated.and_then(|g| g.sku.clone()),
        slug: generated.and_then(|g| g.slug.clone()),
        price_minor: generated.and_then(|g| g.price_minor).or(working.price_minor),
        description: generated.map(|g| g.description.clone()).unwrap_or_default(),
        short_description: generated
            .map(|g| g.short_description.clone())
            .unwrap_or_default(),
        status,
        categories: generated
            .map(|g| resolve_categories(&g.categories, known_categories))
            .unwrap_or_default(),
        tags: generated.map(|g| g.tags.clone()).unwrap_or_default(),
        images: image_payloads(working),
        attributes,
        meta_fields,
    }
}

/// Resolves category names against the store's known list
/// (case-insensitive); unmatched names become name-only references the
/// store creates on the fly.
fn resolve_categories(names: &[String], known: &[Category]) -> Vec<CategoryRef> {
    names
        .iter()
        .map(|name| {
            known
                .iter()
                .find(|category| category.name.eq_ignore_ascii_case(name))
                .map(|category| CategoryRef::Id { id: category.id })
                .unwrap_or_else(|| CategoryRef::Name { name: name.clone() })
        })
        .collect()
}

fn image_payloads(working: &ProductDraft) -> Vec<ImagePayload> {
    let alts = working
        .generated
        .as_ref()
        .map(|g| g.image_alts.as_slice())
        .unwrap_or_default();
    working
        .images
        .iter()
        .enumerate()
        .map(|(index, image)| ImagePayload {
            id: image.external_id,
            url: match image.external_id {
                Some(_) => None,
                None => image.url().map(str::to_string),
            },
            alt: alts
                .get(index)
                .cloned()
                .or_else(|| image.alt_text.clone()),
        })
        .collect()
}

fn slug_base(working: &ProductDraft) -> String {
    let raw = working
        .generated
        .as_ref()
        .and_then(|g| g.slug.clone())
        .or_else(|| working.display_name().map(str::to_string))
        .unwrap_or_else(|| "product".to_string());
    let slug: String = raw
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect();
    let trimmed = slug.trim_matches('-');
    if trimmed.is_empty() {
        "product".to_string()
    } else {
        trimmed.to_string()
    }
}
