//! Domain traits - Abstractions for infrastructure implementations

pub mod chat;

pub use chat::{ChatEvent, ChatPlatform, PlatformInfo};
