//! Console adapter for development/testing

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;

use crate::application::errors::BotError;
use crate::domain::entities::{DisplayUnit, User};
use crate::domain::traits::{ChatEvent, ChatPlatform, PlatformInfo};

/// Console platform adapter: stdin lines in, stdout messages out
pub struct ConsoleAdapter {
    info: PlatformInfo,
    lines: Mutex<Lines<BufReader<Stdin>>>,
}

impl ConsoleAdapter {
    pub fn new() -> Self {
        Self {
            info: PlatformInfo {
                id: "console".to_string(),
                name: "brando-bot".to_string(),
                username: "console".to_string(),
            },
            lines: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        }
    }
}

impl Default for ConsoleAdapter {
    fn default() -> Self {
        Self::new()
    }
}

fn render_unit(unit: &DisplayUnit) -> String {
    match unit {
        DisplayUnit::Text(text) => text.clone(),
        DisplayUnit::Card(card) => {
            let mut out = format!("== {} ==\n", card.title);
            if let Some(ref description) = card.description {
                out.push_str(description);
                out.push('\n');
            }
            for field in &card.fields {
                out.push_str(&format!("  {}: {}\n", field.name, field.value));
            }
            if let Some(ref url) = card.url {
                out.push_str(&format!("  {}\n", url));
            }
            if let Some(ref footer) = card.footer {
                out.push_str(&format!("  -- {}\n", footer));
            }
            out.trim_end().to_string()
        }
    }
}

#[async_trait]
impl ChatPlatform for ConsoleAdapter {
    async fn connect(&self) -> Result<(), BotError> {
        tracing::info!("Starting console bot (dev mode)");
        Ok(())
    }

    async fn next_events(&self) -> Result<Vec<ChatEvent>, BotError> {
        let mut lines = self.lines.lock().await;
        match lines.next_line().await {
            Ok(Some(line)) => Ok(vec![ChatEvent::Message {
                chat_id: "console".to_string(),
                sender: User::new("console").with_username("console"),
                text: line,
            }]),
            Ok(None) => Err(BotError::Network("stdin closed".to_string())),
            Err(e) => Err(BotError::Network(e.to_string())),
        }
    }

    async fn send_to_channel(&self, _chat_id: &str, unit: &DisplayUnit) -> Result<(), BotError> {
        println!("[BOT] {}", render_unit(unit));
        Ok(())
    }

    async fn send_direct(&self, _user_id: &str, unit: &DisplayUnit) -> Result<(), BotError> {
        println!("[BOT -> PM] {}", render_unit(unit));
        Ok(())
    }

    fn platform_info(&self) -> PlatformInfo {
        self.info.clone()
    }
}
