use async_trait::async_trait;

use crate::application::errors::BotError;
use crate::domain::entities::{DisplayUnit, User};

/// A platform lifecycle or message event, re-emitted in a common shape
#[derive(Debug, Clone)]
pub enum ChatEvent {
    Message {
        chat_id: String,
        sender: User,
        text: String,
    },
    MemberJoined {
        chat_id: String,
        user: User,
    },
}

/// Identity of the connected bot account
#[derive(Debug, Clone)]
pub struct PlatformInfo {
    pub id: String,
    pub name: String,
    pub username: String,
}

/// ChatPlatform trait - abstraction for messaging platform adapters
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Connect and resolve the bot's own identity
    async fn connect(&self) -> Result<(), BotError>;

    /// Block until the next batch of inbound events (long poll)
    async fn next_events(&self) -> Result<Vec<ChatEvent>, BotError>;

    /// Send one unit to a channel/conversation
    async fn send_to_channel(&self, chat_id: &str, unit: &DisplayUnit) -> Result<(), BotError>;

    /// Send one unit privately to a user
    async fn send_direct(&self, user_id: &str, unit: &DisplayUnit) -> Result<(), BotError>;

    /// Get bot info
    fn platform_info(&self) -> PlatformInfo;
}
