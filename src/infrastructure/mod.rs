//! Infrastructure layer - External concerns
//!
//! This layer contains:
//! - Config: Configuration loading and validation
//! - Clients: Upstream API clients (timeline, boards, weather)
//! - Adapters: Chat platform integrations (Telegram, console)

pub mod adapters;
pub mod clients;
pub mod config;
