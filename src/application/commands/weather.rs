//! Weather commands - conditions, forecasts and the allergen index

use std::sync::Arc;

use crate::application::errors::CommandError;
use crate::application::formatting::{format_current_weather, format_forecast, format_pollen};
use crate::application::messaging::Router;
use crate::domain::entities::{Command, ParamKind, ParamSpec, Reply};
use crate::infrastructure::clients::WeatherClient;

pub fn register(
    router: &mut Router,
    client: Arc<WeatherClient>,
    limit: usize,
) -> Result<(), CommandError> {
    let c = client.clone();
    router.register(
        Command::new("weather")
            .with_description("Show current conditions for a location")
            .with_usage("weather <location>")
            .with_param(ParamSpec::required("location", ParamKind::Str))
            .with_handler(move |ctx| {
                let c = c.clone();
                Box::pin(async move {
                    let location = ctx.args.str("location")?.to_string();
                    let (city, reading) = c.current(&location).await?;
                    Ok(Reply::channel(format_current_weather(&city, &reading, limit)))
                })
            }),
    )?;

    let c = client.clone();
    router.register(
        Command::new("forecast")
            .with_description("Show an N-step forecast for a location")
            .with_usage("forecast <location> [steps=1]")
            .with_param(ParamSpec::required("location", ParamKind::Str))
            .with_param(ParamSpec::optional("steps", ParamKind::Int, "1"))
            .with_handler(move |ctx| {
                let c = c.clone();
                Box::pin(async move {
                    let location = ctx.args.str("location")?.to_string();
                    let steps = ctx.args.int("steps")?.clamp(1, 40) as u32;
                    let (city, readings) = c.forecast(&location, steps).await?;
                    let readings = &readings[..readings.len().min(steps as usize)];
                    Ok(Reply::channel(format_forecast(&city, readings, limit)))
                })
            }),
    )?;

    let c = client;
    router.register(
        Command::new("pollen")
            .with_description("Show the 3-day allergen index for a postal code")
            .with_usage("pollen <postal_code>")
            .with_param(ParamSpec::required("postal_code", ParamKind::Str))
            .with_handler(move |ctx| {
                let c = c.clone();
                Box::pin(async move {
                    let postal_code = ctx.args.str("postal_code")?.to_string();
                    let days = c.pollen(&postal_code).await?;
                    Ok(Reply::channel(format_pollen(&postal_code, &days)))
                })
            }),
    )?;

    Ok(())
}
