//! Command groups - one registration function per integration
//!
//! Each group is a set of command descriptors sharing one injected client,
//! registered against the router at startup. Composition only; no client is
//! ambient state.

pub mod boards;
pub mod general;
pub mod timeline;
pub mod weather;

use std::sync::Arc;

use crate::application::errors::CommandError;
use crate::application::messaging::Router;
use crate::infrastructure::clients::{BoardsClient, TimelineClient, WeatherClient};

/// Clients for the enabled integrations, built once in `main`
#[derive(Default)]
pub struct Integrations {
    pub timeline: Option<Arc<TimelineClient>>,
    pub boards: Option<Arc<BoardsClient>>,
    pub weather: Option<Arc<WeatherClient>>,
}

/// Register every enabled command group plus `help`
pub fn register_all(
    router: &mut Router,
    integrations: &Integrations,
    limit: usize,
) -> Result<(), CommandError> {
    general::register(router)?;
    if let Some(client) = &integrations.timeline {
        timeline::register(router, client.clone(), limit)?;
    }
    if let Some(client) = &integrations.boards {
        boards::register(router, client.clone(), limit)?;
    }
    if let Some(client) = &integrations.weather {
        weather::register(router, client.clone(), limit)?;
    }
    router.finalize_help(limit)
}
