//! The suggestion tool.

use super::{Collaborators, ToolReply, degrade};

/// Feeds the merchant's trend signals to the generator and formats the
/// three ranked product ideas it returns.
pub async fn suggest_ideas(collaborators: &Collaborators) -> ToolReply {
    let trend_signals = match collaborators.settings.load().await {
        Ok(settings) => settings.trend_signals,
        Err(err) => {
            tracing::warn!(error = %err, "settings unavailable, suggesting without signals");
            Vec::new()
        }
    };

    match collaborators.generator.suggest(&trend_signals).await {
        Ok(suggestions) => {
            let mut text = String::from("Here are ideas worth trying:\n");
            for (rank, suggestion) in suggestions.iter().enumerate() {
                text.push_str(&format!(
                    "{}. {}: {}\n",
                    rank + 1,
                    suggestion.name,
                    suggestion.reason
                ));
            }
            ToolReply::text(text.trim_end().to_string())
        }
        Err(err) => degrade(err),
    }
}
