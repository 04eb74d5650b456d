//! Telegram long-polling glue.
//!
//! Pulls updates off the Bot API, downloads attached photos, and maps
//! commands and free text onto turn inputs. Everything conversational
//! happens in `vitrin-application`; this module only adapts the wire shape.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use vitrin_core::commerce::EntryStatus;
use vitrin_core::turn::{ImageUpload, TurnAction, TurnInput};

const POLL_TIMEOUT_SECS: u64 = 50;

#[derive(Debug, Deserialize)]
struct UpdatesResponse {
    result: Vec<Update>,
}

#[derive(Debug, Deserialize)]
pub struct Update {
    update_id: i64,
    pub message: Option<IncomingMessage>,
}

#[derive(Debug, Deserialize)]
pub struct IncomingMessage {
    pub chat: Chat,
    pub text: Option<String>,
    pub caption: Option<String>,
    #[serde(default)]
    pub photo: Vec<PhotoSize>,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct PhotoSize {
    pub file_id: String,
    pub width: u32,
}

#[derive(Debug, Deserialize)]
struct FileResponse {
    result: FileInfo,
}

#[derive(Debug, Deserialize)]
struct FileInfo {
    file_path: String,
}

/// Long-polling client for one bot token.
pub struct Poller {
    client: Client,
    api_base: String,
    file_base: String,
    offset: i64,
}

impl Poller {
    pub fn new(bot_token: &str) -> Self {
        Self {
            client: Client::new(),
            api_base: format!("https://api.telegram.org/bot{bot_token}"),
            file_base: format!("https://api.telegram.org/file/bot{bot_token}"),
            offset: 0,
        }
    }

    /// Blocks up to the poll timeout and returns the next batch of updates,
    /// advancing the acknowledgement offset past them.
    pub async fn poll(&mut self) -> Result<Vec<Update>> {
        let response: UpdatesResponse = self
            .client
            .get(format!("{}/getUpdates", self.api_base))
            .query(&[
                ("timeout", POLL_TIMEOUT_SECS.to_string()),
                ("offset", self.offset.to_string()),
                ("allowed_updates", "[\"message\"]".to_string()),
            ])
            .send()
            .await
            .context("getUpdates request failed")?
            .error_for_status()
            .context("getUpdates returned an error status")?
            .json()
            .await
            .context("getUpdates body was not valid JSON")?;

        if let Some(last) = response.result.last() {
            self.offset = last.update_id + 1;
        }
        Ok(response.result)
    }

    /// Downloads the largest size of an attached photo.
    pub async fn download_photo(&self, sizes: &[PhotoSize]) -> Result<Option<ImageUpload>> {
        let Some(largest) = sizes.iter().max_by_key(|size| size.width) else {
            return Ok(None);
        };

        let info: FileResponse = self
            .client
            .get(format!("{}/getFile", self.api_base))
            .query(&[("file_id", largest.file_id.as_str())])
            .send()
            .await
            .context("getFile request failed")?
            .error_for_status()
            .context("getFile returned an error status")?
            .json()
            .await
            .context("getFile body was not valid JSON")?;

        let bytes = self
            .client
            .get(format!("{}/{}", self.file_base, info.result.file_path))
            .send()
            .await
            .context("photo download failed")?
            .error_for_status()
            .context("photo download returned an error status")?
            .bytes()
            .await
            .context("photo download was truncated")?;

        let file_name = info.result.file_path.rsplit('/').next().map(str::to_string);
        Ok(Some(ImageUpload {
            bytes: bytes.to_vec(),
            file_name,
        }))
    }
}

/// Maps a message onto a turn input. Slash commands become explicit
/// actions; anything else is a free-form message turn. `Err` carries usage
/// text to send straight back.
pub fn parse_turn(
    text: Option<String>,
    images: Vec<ImageUpload>,
) -> std::result::Result<TurnInput, String> {
    let trimmed = text.as_deref().map(str::trim).unwrap_or_default();
    if !trimmed.starts_with('/') {
        return Ok(TurnInput::Message { text, images });
    }

    let (command, rest) = trimmed.split_once(char::is_whitespace).unwrap_or((trimmed, ""));
    let rest = rest.trim();
    match command {
        "/start" => Ok(TurnInput::empty()),
        "/edit" => match rest.parse::<u64>() {
            Ok(entry_id) => Ok(TurnInput::Action(TurnAction::LoadForEdit { entry_id })),
            Err(_) => Err("Usage: /edit <product id>".to_string()),
        },
        "/save" => Ok(TurnInput::Action(TurnAction::Save {
            status: EntryStatus::Draft,
        })),
        "/publish" => Ok(TurnInput::Action(TurnAction::Save {
            status: EntryStatus::Published,
        })),
        "/post" => {
            if rest.is_empty() {
                Err("Usage: /post <topic>".to_string())
            } else {
                Ok(TurnInput::Action(TurnAction::PostToChannel {
                    topic: rest.to_string(),
                    tone: None,
                }))
            }
        }
        "/ideas" => Ok(TurnInput::Action(TurnAction::SuggestIdeas)),
        other => Err(format!(
            "Unknown command {other}. Try /edit, /save, /publish, /post or /ideas."
        )),
    }
}
