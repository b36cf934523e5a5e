//! Domain layer - Core business objects with no external dependencies
//!
//! This layer contains:
//! - Entities: Core business objects (User, Command, DisplayUnit, InvocationContext)
//! - Traits: Abstractions for infrastructure (ChatPlatform)

pub mod entities;
pub mod traits;
