//! Full command-wiring integration tests
//! Run with: cargo test --test dispatch_test
//!
//! Everything here stays offline: registration, prefix parsing and
//! argument binding all happen before any handler would touch the
//! network, so a binding failure proves no upstream request was made.

use std::sync::Arc;
use std::sync::Once;

use brando_bot::application::commands::{register_all, Integrations};
use brando_bot::application::errors::{BotError, CommandError};
use brando_bot::application::messaging::Router;
use brando_bot::domain::entities::{DisplayUnit, User};
use brando_bot::infrastructure::clients::{BoardsClient, TimelineClient, WeatherClient};

static INIT: Once = Once::new();

fn ensure_init() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt::try_init();
    });
}

fn full_router() -> Router {
    let integrations = Integrations {
        timeline: Some(Arc::new(TimelineClient::new("test-bearer"))),
        boards: Some(Arc::new(BoardsClient::new("brando-bot/test"))),
        weather: Some(Arc::new(WeatherClient::new("test-key"))),
    };
    let mut router = Router::new("!");
    register_all(&mut router, &integrations, 2000).expect("registration should not collide");
    router
}

fn sender() -> User {
    User::new("42").with_username("tester")
}

#[test]
fn every_command_group_registers_without_collision() {
    ensure_init();
    let router = full_router();
    // ping + help + 11 timeline + 4 boards + 3 weather
    assert_eq!(router.command_count(), 20);
}

#[tokio::test]
async fn unknown_command_is_reported_before_any_upstream_call() {
    ensure_init();
    let router = full_router();
    let err = router
        .dispatch(sender(), "chat", "!nosuchcommand")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        BotError::Command(CommandError::Unknown(name)) if name == "nosuchcommand"
    ));
}

#[tokio::test]
async fn create_list_without_a_name_names_the_parameter() {
    ensure_init();
    let router = full_router();
    let err = router
        .dispatch(sender(), "chat", "!create_list")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        BotError::Command(CommandError::MissingArgument(param)) if param == "list_name"
    ));
}

#[tokio::test]
async fn bad_count_is_rejected_before_any_upstream_call() {
    ensure_init();
    let router = full_router();
    let err = router
        .dispatch(sender(), "chat", "!hot_posts programming many")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        BotError::Command(CommandError::InvalidArgumentType { param, token })
            if param == "count" && token == "many"
    ));
}

#[tokio::test]
async fn plain_chatter_is_ignored() {
    ensure_init();
    let router = full_router();
    let reply = router
        .dispatch(sender(), "chat", "nothing to see here")
        .await
        .unwrap();
    assert!(reply.is_none());
}

#[tokio::test]
async fn help_covers_every_integration() {
    ensure_init();
    let router = full_router();
    let reply = router
        .dispatch(sender(), "chat", "!help")
        .await
        .unwrap()
        .expect("help should reply");
    let text: String = reply
        .units
        .iter()
        .map(|unit| match unit {
            DisplayUnit::Text(t) => t.as_str(),
            DisplayUnit::Card(_) => panic!("help should be plain text"),
        })
        .collect();
    for name in [
        "ping",
        "create_list",
        "display_list",
        "expire_posts",
        "hot_posts",
        "comments",
        "weather",
        "pollen",
    ] {
        assert!(text.contains(name), "help is missing {}", name);
    }
}

#[tokio::test]
async fn help_for_one_command_shows_usage() {
    ensure_init();
    let router = full_router();
    let reply = router
        .dispatch(sender(), "chat", "!help forecast")
        .await
        .unwrap()
        .expect("help should reply");
    let DisplayUnit::Text(text) = &reply.units[0] else {
        panic!("help should be plain text")
    };
    assert!(text.contains("forecast <location> [steps=1]"));
}
