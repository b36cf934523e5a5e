//! Configuration management
//!
//! Settings load once at startup from YAML with environment overrides.
//! A missing credential for the platform or an enabled integration is a
//! fatal startup error, never a runtime one.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::application::errors::ConfigError;

/// Bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub bot: BotConfig,
    pub platform: PlatformConfig,
    pub integrations: IntegrationsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BotConfig {
    pub name: String,
    pub prefix: String,
    /// Platform per-message character cap
    pub message_limit: usize,
    /// Chat that receives startup and member-join notices
    pub home_chat_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct PlatformConfig {
    pub telegram: Option<TelegramConfig>,
    pub console: Option<ConsoleConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TelegramConfig {
    pub enabled: bool,
    pub token: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConsoleConfig {
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct IntegrationsConfig {
    pub timeline: Option<TimelineConfig>,
    pub boards: Option<BoardsConfig>,
    pub weather: Option<WeatherConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TimelineConfig {
    pub enabled: bool,
    pub bearer_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BoardsConfig {
    pub enabled: bool,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct WeatherConfig {
    pub enabled: bool,
    pub api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                name: "brando-bot".to_string(),
                prefix: "!".to_string(),
                message_limit: 2000,
                home_chat_id: None,
            },
            platform: PlatformConfig {
                telegram: Some(TelegramConfig {
                    enabled: false,
                    token: None,
                }),
                console: Some(ConsoleConfig { enabled: true }),
            },
            integrations: IntegrationsConfig {
                timeline: Some(TimelineConfig {
                    enabled: false,
                    bearer_token: None,
                }),
                boards: Some(BoardsConfig {
                    enabled: true,
                    user_agent: None,
                }),
                weather: Some(WeatherConfig {
                    enabled: false,
                    api_key: None,
                }),
            },
        }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        let mut config: Config = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))?;
        config.apply_env();
        Ok(config)
    }

    pub fn load_env() -> Self {
        let mut config = Config::default();
        config.apply_env();
        config
    }

    /// Environment overrides on top of whatever the file said
    fn apply_env(&mut self) {
        if let Ok(token) = std::env::var("BOT_TOKEN") {
            let telegram = self.platform.telegram.get_or_insert(TelegramConfig {
                enabled: false,
                token: None,
            });
            telegram.token = Some(token);
            telegram.enabled = true;
        }
        if let Ok(prefix) = std::env::var("BOT_PREFIX") {
            self.bot.prefix = prefix;
        }
        if let Ok(token) = std::env::var("TIMELINE_BEARER_TOKEN") {
            let timeline = self.integrations.timeline.get_or_insert(TimelineConfig {
                enabled: false,
                bearer_token: None,
            });
            timeline.bearer_token = Some(token);
            timeline.enabled = true;
        }
        if let Ok(agent) = std::env::var("BOARDS_USER_AGENT") {
            let boards = self.integrations.boards.get_or_insert(BoardsConfig {
                enabled: false,
                user_agent: None,
            });
            boards.user_agent = Some(agent);
            boards.enabled = true;
        }
        if let Ok(key) = std::env::var("WEATHER_API_KEY") {
            let weather = self.integrations.weather.get_or_insert(WeatherConfig {
                enabled: false,
                api_key: None,
            });
            weather.api_key = Some(key);
            weather.enabled = true;
        }
    }

    /// Reject a config whose enabled pieces are missing credentials, or
    /// whose message limit the segmenter cannot honor
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bot.message_limit == 0 {
            return Err(ConfigError::Invalid("bot.message-limit".to_string()));
        }
        if let Some(telegram) = &self.platform.telegram {
            if telegram.enabled && telegram.token.as_deref().unwrap_or("").is_empty() {
                return Err(ConfigError::MissingField(
                    "platform.telegram.token".to_string(),
                ));
            }
        }
        if let Some(timeline) = &self.integrations.timeline {
            if timeline.enabled && timeline.bearer_token.as_deref().unwrap_or("").is_empty() {
                return Err(ConfigError::MissingField(
                    "integrations.timeline.bearer-token".to_string(),
                ));
            }
        }
        if let Some(weather) = &self.integrations.weather {
            if weather.enabled && weather.api_key.as_deref().unwrap_or("").is_empty() {
                return Err(ConfigError::MissingField(
                    "integrations.weather.api-key".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// User agent for the boards integration, with a sane fallback
    pub fn boards_user_agent(&self) -> String {
        self.integrations
            .boards
            .as_ref()
            .and_then(|b| b.user_agent.clone())
            .unwrap_or_else(|| format!("{}/{}", self.bot.name, env!("CARGO_PKG_VERSION")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
bot:
  name: brando-bot
  prefix: "!"
  message-limit: 2000
  home-chat-id: "12345"
platform:
  telegram:
    enabled: true
    token: "tg-token"
  console:
    enabled: false
integrations:
  timeline:
    enabled: true
    bearer-token: "bearer"
  boards:
    enabled: true
    user-agent: "brando-bot/0.1"
  weather:
    enabled: true
    api-key: "owm-key"
"#;

    #[test]
    fn parses_full_config() {
        let config: Config = serde_yaml::from_str(SAMPLE).unwrap();
        assert_eq!(config.bot.prefix, "!");
        assert_eq!(config.bot.message_limit, 2000);
        assert_eq!(config.bot.home_chat_id.as_deref(), Some("12345"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn enabled_platform_without_token_is_fatal() {
        let mut config: Config = serde_yaml::from_str(SAMPLE).unwrap();
        config.platform.telegram.as_mut().unwrap().token = None;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(f) if f == "platform.telegram.token"));
    }

    #[test]
    fn enabled_integration_without_credential_is_fatal() {
        let mut config: Config = serde_yaml::from_str(SAMPLE).unwrap();
        config.integrations.weather.as_mut().unwrap().api_key = Some(String::new());
        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::MissingField(f) if f == "integrations.weather.api-key")
        );
    }

    #[test]
    fn default_config_passes_validation() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn zero_message_limit_is_fatal() {
        let mut config = Config::default();
        config.bot.message_limit = 0;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(f) if f == "bot.message-limit"));
    }

    // Touches process-global env vars; keep all overrides in this one test
    // so nothing races a parallel sibling.
    #[test]
    fn environment_overrides_apply_and_enable() {
        std::env::set_var("BOT_PREFIX", "??");
        std::env::set_var("BOT_TOKEN", "env-tg-token");
        std::env::set_var("WEATHER_API_KEY", "env-owm-key");
        let config = Config::load_env();
        std::env::remove_var("BOT_PREFIX");
        std::env::remove_var("BOT_TOKEN");
        std::env::remove_var("WEATHER_API_KEY");

        assert_eq!(config.bot.prefix, "??");
        let telegram = config.platform.telegram.as_ref().unwrap();
        assert!(telegram.enabled);
        assert_eq!(telegram.token.as_deref(), Some("env-tg-token"));
        // The default leaves weather disabled; the env credential enables it
        let weather = config.integrations.weather.as_ref().unwrap();
        assert!(weather.enabled);
        assert_eq!(weather.api_key.as_deref(), Some("env-owm-key"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn default_round_trips_through_yaml() {
        let yaml = serde_yaml::to_string(&Config::default()).unwrap();
        let back: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back.bot.prefix, "!");
        assert_eq!(back.bot.message_limit, 2000);
    }
}
