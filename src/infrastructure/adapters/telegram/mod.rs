//! Telegram adapter - long-poll getUpdates plus sendMessage over HTTP
//!
//! Telegram has no native card/embed construct, so cards render as
//! Markdown text before sending. Direct replies go to the user's private
//! chat, which on Telegram shares the user's id.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::application::errors::BotError;
use crate::domain::entities::{Card, DisplayUnit, User};
use crate::domain::traits::{ChatEvent, ChatPlatform, PlatformInfo};

/// Telegram API base URL
const API_BASE: &str = "https://api.telegram.org";

/// Long-poll wait in seconds
const POLL_TIMEOUT: i64 = 30;

/// Telegram update types
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<TgUser>,
    pub chat: Chat,
    pub text: Option<String>,
    pub new_chat_members: Option<Vec<TgUser>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TgUser {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    #[serde(default)]
    pub is_bot: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

/// Telegram platform adapter
pub struct TelegramAdapter {
    token: String,
    client: Client,
    info: RwLock<PlatformInfo>,
    offset: AtomicI64,
}

impl TelegramAdapter {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            client: Client::new(),
            info: RwLock::new(PlatformInfo {
                id: "unknown".to_string(),
                name: "brando-bot".to_string(),
                username: "brando_bot".to_string(),
            }),
            offset: AtomicI64::new(0),
        }
    }

    fn api_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", API_BASE, self.token, method)
    }

    async fn get_updates(&self, offset: i64) -> Result<Vec<Update>, BotError> {
        #[derive(Serialize)]
        struct GetUpdatesRequest {
            offset: i64,
            timeout: i64,
            allowed_updates: Vec<String>,
        }

        #[derive(Deserialize)]
        struct Response {
            result: Vec<Update>,
        }

        let request = GetUpdatesRequest {
            offset,
            timeout: POLL_TIMEOUT,
            allowed_updates: vec!["message".to_string()],
        };

        let response = self
            .client
            .post(self.api_url("getUpdates"))
            .json(&request)
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(BotError::Network(format!(
                "Telegram API error: {}",
                response.status()
            )));
        }

        let data: Response = response
            .json()
            .await
            .map_err(|e| BotError::Parse(e.to_string()))?;

        Ok(data.result)
    }

    async fn send_text(&self, chat_id: &str, text: &str) -> Result<(), BotError> {
        // Try Markdown first, fall back to plain on a rendering rejection
        match self.send_with_format(chat_id, text, Some("Markdown")).await {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::warn!("Markdown send failed, retrying plain: {}", e);
                self.send_with_format(chat_id, text, None).await
            }
        }
    }

    async fn send_with_format(
        &self,
        chat_id: &str,
        text: &str,
        parse_mode: Option<&str>,
    ) -> Result<(), BotError> {
        #[derive(Serialize)]
        struct SendMessageRequest {
            chat_id: String,
            text: String,
            #[serde(skip_serializing_if = "Option::is_none")]
            parse_mode: Option<String>,
        }

        let request = SendMessageRequest {
            chat_id: chat_id.to_string(),
            text: text.to_string(),
            parse_mode: parse_mode.map(|s| s.to_string()),
        };

        let response = self
            .client
            .post(self.api_url("sendMessage"))
            .json(&request)
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(BotError::Network(format!(
                "Telegram API error: {}",
                response.status()
            )));
        }

        Ok(())
    }
}

fn into_user(user: TgUser) -> User {
    let mut out = User::new(user.id.to_string());
    out.is_bot = user.is_bot;
    if let Some(username) = user.username {
        out = out.with_username(username);
    }
    if let Some(first) = user.first_name {
        out = out.with_first_name(first);
    }
    out
}

/// Render a card as Markdown text for platforms without embeds
pub fn render_card(card: &Card) -> String {
    let mut out = format!("*{}*\n", card.title);
    if let Some(ref author) = card.author {
        out.push_str(&format!("_{}_\n", author));
    }
    if let Some(ref description) = card.description {
        out.push_str(description);
        out.push('\n');
    }
    for field in &card.fields {
        out.push_str(&format!("{}: {}\n", field.name, field.value));
    }
    if let Some(ref url) = card.url {
        out.push_str(url);
        out.push('\n');
    }
    if let Some(ref image) = card.image {
        out.push_str(image);
        out.push('\n');
    }
    if let Some(ref footer) = card.footer {
        out.push_str(&format!("_{}_", footer));
    }
    out.trim_end().to_string()
}

fn render_unit(unit: &DisplayUnit) -> String {
    match unit {
        DisplayUnit::Text(text) => text.clone(),
        DisplayUnit::Card(card) => render_card(card),
    }
}

#[async_trait]
impl ChatPlatform for TelegramAdapter {
    async fn connect(&self) -> Result<(), BotError> {
        #[derive(Deserialize)]
        struct Response {
            result: Me,
        }

        #[derive(Deserialize)]
        struct Me {
            id: i64,
            first_name: String,
            username: String,
        }

        let response = self
            .client
            .get(self.api_url("getMe"))
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        let data: Response = response
            .json()
            .await
            .map_err(|e| BotError::Parse(e.to_string()))?;

        let info = PlatformInfo {
            id: data.result.id.to_string(),
            name: data.result.first_name,
            username: data.result.username,
        };
        tracing::info!("Connected as @{}", info.username);
        *self.info.write().expect("platform info lock poisoned") = info;
        Ok(())
    }

    async fn next_events(&self) -> Result<Vec<ChatEvent>, BotError> {
        let offset = self.offset.load(Ordering::SeqCst);
        let updates = self.get_updates(offset).await?;

        if let Some(next) = updates.iter().map(|u| u.update_id + 1).max() {
            self.offset.store(next, Ordering::SeqCst);
        }

        let mut events = Vec::new();
        for update in updates {
            let Some(message) = update.message else {
                continue;
            };
            let chat_id = message.chat.id.to_string();

            if let Some(joined) = message.new_chat_members {
                for member in joined {
                    events.push(ChatEvent::MemberJoined {
                        chat_id: chat_id.clone(),
                        user: into_user(member),
                    });
                }
                continue;
            }

            if let (Some(text), Some(from)) = (message.text, message.from) {
                events.push(ChatEvent::Message {
                    chat_id,
                    sender: into_user(from),
                    text,
                });
            }
        }
        Ok(events)
    }

    async fn send_to_channel(&self, chat_id: &str, unit: &DisplayUnit) -> Result<(), BotError> {
        self.send_text(chat_id, &render_unit(unit)).await
    }

    async fn send_direct(&self, user_id: &str, unit: &DisplayUnit) -> Result<(), BotError> {
        // A private conversation's chat id is the user's id
        self.send_text(user_id, &render_unit(unit)).await
    }

    fn platform_info(&self) -> PlatformInfo {
        self.info.read().expect("platform info lock poisoned").clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Card;

    #[test]
    fn renders_card_fields_in_order() {
        let card = Card::new("someone", 0x1DA1F2)
            .with_description("a post body")
            .with_field("# Reposts", 3, true)
            .with_field("# Favs", 9, true)
            .with_footer("10-10-2018 08:19 PM");
        let text = render_card(&card);
        let reposts = text.find("# Reposts: 3").unwrap();
        let favs = text.find("# Favs: 9").unwrap();
        assert!(text.starts_with("*someone*"));
        assert!(reposts < favs);
        assert!(text.ends_with("_10-10-2018 08:19 PM_"));
    }

    #[test]
    fn decodes_member_join_update() {
        let update: Update = serde_json::from_value(serde_json::json!({
            "update_id": 7,
            "message": {
                "message_id": 1,
                "chat": { "id": -100123 },
                "new_chat_members": [
                    { "id": 55, "first_name": "Ada", "is_bot": false }
                ]
            }
        }))
        .unwrap();
        let members = update.message.unwrap().new_chat_members.unwrap();
        assert_eq!(members[0].id, 55);
        assert_eq!(into_user(members[0].clone()).display_name(), "Ada");
    }
}
