//! Link-aggregator commands - board listings and comment threads

use std::sync::Arc;

use crate::application::errors::CommandError;
use crate::application::formatting::{format_comments, format_posts};
use crate::application::messaging::Router;
use crate::domain::entities::{Command, DisplayUnit, ParamKind, ParamSpec, Reply};
use crate::infrastructure::clients::boards::{COMMENT_SORTS, TOP_WINDOWS};
use crate::infrastructure::clients::BoardsClient;

/// Board listing default, matching the original bot's five-post digests
const DEFAULT_COUNT: &str = "5";

pub fn register(
    router: &mut Router,
    client: Arc<BoardsClient>,
    limit: usize,
) -> Result<(), CommandError> {
    let c = client.clone();
    router.register(
        Command::new("hot_posts")
            .with_description("Show hot posts from a board")
            .with_usage("hot_posts <board> [count=5]")
            .with_param(ParamSpec::required("board", ParamKind::Str))
            .with_param(ParamSpec::optional("count", ParamKind::Int, DEFAULT_COUNT))
            .with_handler(move |ctx| {
                let c = c.clone();
                Box::pin(async move {
                    let board = ctx.args.str("board")?.to_string();
                    let count = ctx.args.int("count")?.clamp(1, 25) as u32;
                    let posts = c.hot(&board, count).await?;
                    let mut units =
                        vec![DisplayUnit::text(format!("Fetched posts from: {}", board))];
                    units.extend(format_posts(&posts, limit));
                    Ok(Reply::channel(units))
                })
            }),
    )?;

    let c = client.clone();
    router.register(
        Command::new("top_posts")
            .with_description("Show top posts from a board over a time window")
            .with_usage("top_posts <board> [window=day] [count=5]")
            .with_param(ParamSpec::required("board", ParamKind::Str))
            .with_param(ParamSpec::optional("window", ParamKind::Str, "day"))
            .with_param(ParamSpec::optional("count", ParamKind::Int, DEFAULT_COUNT))
            .with_handler(move |ctx| {
                let c = c.clone();
                Box::pin(async move {
                    let board = ctx.args.str("board")?.to_string();
                    let window = ctx.args.str("window")?.to_string();
                    let count = ctx.args.int("count")?.clamp(1, 25) as u32;
                    if !TOP_WINDOWS.contains(&window.as_str()) {
                        return Err(CommandError::InvalidArgumentType {
                            param: "window".to_string(),
                            token: window,
                        }
                        .into());
                    }
                    let posts = c.top(&board, &window, count).await?;
                    let mut units = vec![DisplayUnit::text(format!(
                        "Top posts from {} ({})",
                        board, window
                    ))];
                    units.extend(format_posts(&posts, limit));
                    Ok(Reply::channel(units))
                })
            }),
    )?;

    let c = client.clone();
    router.register(
        Command::new("random_board")
            .with_description("Show recent posts from a random board")
            .with_handler(move |_ctx| {
                let c = c.clone();
                Box::pin(async move {
                    let (board, posts) = c.random(5).await?;
                    let mut units =
                        vec![DisplayUnit::text(format!("Fetched a random board: {}", board))];
                    units.extend(format_posts(&posts, limit));
                    Ok(Reply::channel(units))
                })
            }),
    )?;

    let c = client;
    router.register(
        Command::new("comments")
            .with_description("Show a post's replies in a named sort order")
            .with_usage("comments <post_id> [sort=top]")
            .with_param(ParamSpec::required("post_id", ParamKind::Str))
            .with_param(ParamSpec::optional("sort", ParamKind::Str, "top"))
            .with_handler(move |ctx| {
                let c = c.clone();
                Box::pin(async move {
                    let post_id = ctx.args.str("post_id")?.to_string();
                    let sort = ctx.args.str("sort")?.to_string();
                    if !COMMENT_SORTS.contains(&sort.as_str()) {
                        return Err(CommandError::InvalidArgumentType {
                            param: "sort".to_string(),
                            token: sort,
                        }
                        .into());
                    }
                    let comments = c.comments(&post_id, &sort).await?;
                    let mut units = vec![DisplayUnit::text(format!(
                        "Replies on {} ({})",
                        post_id, sort
                    ))];
                    units.extend(format_comments(&comments, limit));
                    Ok(Reply::channel(units))
                })
            }),
    )?;

    Ok(())
}
