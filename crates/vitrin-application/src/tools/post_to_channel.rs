//! The post-to-channel tool.

use super::{Collaborators, ToolReply, degrade};
use vitrin_core::draft::ProductDraft;
use vitrin_core::messaging::ALBUM_LIMIT;

/// Generates announcement text for the entry being edited and sends it to
/// the configured channel with the entry's photos: one photo goes out as a
/// single captioned message, two or more as one album with the caption on
/// the first item.
pub async fn post_to_channel(
    draft: &ProductDraft,
    collaborators: &Collaborators,
    topic: &str,
    tone: Option<&str>,
) -> ToolReply {
    let Some(entry_id) = draft.edit_target_id else {
        return ToolReply::text(
            "Load the product you want to announce first, then ask me to post it.",
        );
    };
    if topic.trim().is_empty() {
        return ToolReply::text("What should the post be about? Give me a topic.");
    }

    let settings = match collaborators.settings.load().await {
        Ok(settings) => settings,
        Err(err) => return degrade(err),
    };
    let Some(channel) = settings.channel_chat_id else {
        return ToolReply::text(
            "No announcement channel is configured, so I have nowhere to post.",
        );
    };

    let entry = match collaborators.commerce.get_entry(entry_id).await {
        Ok(Some(entry)) => entry,
        Ok(None) => {
            return ToolReply::text(format!(
                "I couldn't find product {entry_id} in the store anymore."
            ));
        }
        Err(err) => return degrade(err),
    };
    if entry.images.is_empty() {
        return ToolReply::text(
            "That product has no photos yet, and a channel post needs at least one.",
        );
    }

    let caption = match collaborators
        .generator
        .generate_post(&entry, topic, tone)
        .await
    {
        Ok(text) => text,
        Err(err) => return degrade(err),
    };

    let urls: Vec<String> = entry
        .images
        .iter()
        .take(ALBUM_LIMIT)
        .map(|image| image.url.clone())
        .collect();
    let send_result = if urls.len() == 1 {
        collaborators
            .messaging
            .send_photo(&channel, &urls[0], &caption)
            .await
    } else {
        collaborators
            .messaging
            .send_album(&channel, &urls, &caption)
            .await
    };

    match send_result {
        Ok(()) => {
            tracing::info!(entry_id, images = urls.len(), "channel post sent");
            ToolReply::text(format!("Posted \"{}\" to the channel.", entry.name))
        }
        Err(err) => degrade(err),
    }
}
