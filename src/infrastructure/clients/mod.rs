//! Upstream API clients - thin request/response wrappers
//!
//! One client per integration, constructed once at startup and injected
//! into the command groups. Transport and decode failures all surface as
//! `BotError::Upstream` carrying the integration name; nothing here
//! retries or caches.

pub mod boards;
pub mod timeline;
pub mod weather;

pub use boards::BoardsClient;
pub use timeline::{ExpireReport, TimelineClient};
pub use weather::WeatherClient;
