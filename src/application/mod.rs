//! Application layer - Use cases and business logic
//!
//! This layer contains:
//! - Errors: Domain-specific errors
//! - Messaging: Message parsing, segmentation, command dispatch
//! - Formatting: API records rendered as display units
//! - Commands: Per-integration command registration groups

pub mod commands;
pub mod errors;
pub mod formatting;
pub mod messaging;
