//! brando-bot - a chat bot bridging social timelines, link-aggregator
//! boards and weather lookups behind prefixed text commands.

pub mod application;
pub mod domain;
pub mod infrastructure;
