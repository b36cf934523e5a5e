//! Social timeline commands - curated lists, timelines, account upkeep

use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::application::errors::{BotError, CommandError};
use crate::application::formatting::{format_lists, format_statuses};
use crate::application::messaging::{segment, Router};
use crate::domain::entities::{Command, DisplayUnit, ParamKind, ParamSpec, Reply, ReplyTarget};
use crate::infrastructure::clients::TimelineClient;

/// Timeline fetch default, matching the platform page size
const DEFAULT_COUNT: &str = "20";

pub fn register(
    router: &mut Router,
    client: Arc<TimelineClient>,
    limit: usize,
) -> Result<(), CommandError> {
    let c = client.clone();
    router.register(
        Command::new("create_list")
            .with_description("Create a private curated list")
            .with_usage("create_list <list_name> [\"description\"]")
            .with_param(ParamSpec::required("list_name", ParamKind::Str))
            .with_param(ParamSpec::optional("description", ParamKind::Str, ""))
            .with_handler(move |ctx| {
                let c = c.clone();
                Box::pin(async move {
                    let name = ctx.args.str("list_name")?.to_string();
                    let description = ctx.args.str("description")?.to_string();
                    let list = c
                        .create_list(&name, Some(description.as_str()).filter(|d| !d.is_empty()))
                        .await?;
                    Ok(Reply::channel_text(format!(
                        "Created list: {} ({} members)",
                        list.name, list.member_count
                    )))
                })
            }),
    )?;

    let c = client.clone();
    router.register(
        Command::new("delete_list")
            .with_description("Delete a curated list by name")
            .with_usage("delete_list <list_name>")
            .with_param(ParamSpec::required("list_name", ParamKind::Str))
            .with_handler(move |ctx| {
                let c = c.clone();
                Box::pin(async move {
                    let name = ctx.args.str("list_name")?.to_string();
                    let owner = c.verify_credentials().await?;
                    c.destroy_list(&name, &owner).await?;
                    Ok(Reply::channel_text(format!("Deleted list: {}", name)))
                })
            }),
    )?;

    let c = client.clone();
    router.register(
        Command::new("list_lists")
            .with_description("Show all curated lists with member counts")
            .with_handler(move |_ctx| {
                let c = c.clone();
                Box::pin(async move {
                    let owner = c.verify_credentials().await?;
                    let lists = c.lists_all(&owner).await?;
                    Ok(Reply::channel(format_lists(&lists, limit)))
                })
            }),
    )?;

    let c = client.clone();
    router.register(
        Command::new("add_list_members")
            .with_description("Add users to a curated list")
            .with_usage("add_list_members <list_name> <members...>")
            .with_param(ParamSpec::required("list_name", ParamKind::Str))
            .with_param(ParamSpec::variadic("members"))
            .with_handler(move |ctx| {
                let c = c.clone();
                Box::pin(async move {
                    let name = ctx.args.str("list_name")?.to_string();
                    let members = ctx.args.rest("members").to_vec();
                    let owner = c.verify_credentials().await?;
                    for member in &members {
                        c.add_list_member(&name, &owner, member).await?;
                    }
                    let text = format!(
                        "Added {} member(s) to {}:\n{}",
                        members.len(),
                        name,
                        members.join("\n")
                    );
                    Ok(Reply::channel(text_units(&text, limit)))
                })
            }),
    )?;

    let c = client.clone();
    router.register(
        Command::new("remove_list_members")
            .with_description("Remove users from a curated list")
            .with_usage("remove_list_members <list_name> <members...>")
            .with_param(ParamSpec::required("list_name", ParamKind::Str))
            .with_param(ParamSpec::variadic("members"))
            .with_handler(move |ctx| {
                let c = c.clone();
                Box::pin(async move {
                    let name = ctx.args.str("list_name")?.to_string();
                    let members = ctx.args.rest("members").to_vec();
                    let owner = c.verify_credentials().await?;
                    for member in &members {
                        c.remove_list_member(&name, &owner, member).await?;
                    }
                    let text = format!(
                        "Removed {} member(s) from {}:\n{}",
                        members.len(),
                        name,
                        members.join("\n")
                    );
                    Ok(Reply::channel(text_units(&text, limit)))
                })
            }),
    )?;

    register_list_timeline(router, client.clone(), limit, "display_list", ReplyTarget::Channel)?;
    register_list_timeline(router, client.clone(), limit, "pm_list", ReplyTarget::Direct)?;
    register_user_timeline(router, client.clone(), limit, "display_user", ReplyTarget::Channel)?;
    register_user_timeline(router, client.clone(), limit, "pm_user", ReplyTarget::Direct)?;

    let c = client.clone();
    router.register(
        Command::new("rate_limit")
            .with_description("Show the timeline API rate-limit status")
            .with_handler(move |_ctx| {
                let c = c.clone();
                Box::pin(async move {
                    let status = c.rate_limit_status().await?;
                    let text = serde_json::to_string_pretty(&status)
                        .map_err(|e| BotError::Parse(e.to_string()))?;
                    Ok(Reply::direct(text_units(&text, limit)))
                })
            }),
    )?;

    let c = client;
    router.register(
        Command::new("expire_posts")
            .with_description("Delete own posts older than N days (dry run by default)")
            .with_usage("expire_posts <days> [dry_run=true]")
            .with_param(ParamSpec::required("days", ParamKind::Int))
            .with_param(ParamSpec::optional("dry_run", ParamKind::Bool, "true"))
            .with_handler(move |ctx| {
                let c = c.clone();
                Box::pin(async move {
                    let days = ctx.args.int("days")?;
                    let dry_run = ctx.args.flag("dry_run")?;
                    if days < 0 {
                        return Err(CommandError::InvalidArgumentType {
                            param: "days".to_string(),
                            token: days.to_string(),
                        }
                        .into());
                    }
                    let cutoff = Utc::now() - Duration::days(days);
                    let report = c.expire_posts(cutoff, dry_run).await?;
                    let verb = if dry_run { "Would delete" } else { "Deleted" };
                    Ok(Reply::channel_text(format!(
                        "{} {} post(s), ignored {} post(s)",
                        verb, report.deleted, report.ignored
                    )))
                })
            }),
    )?;

    Ok(())
}

fn register_list_timeline(
    router: &mut Router,
    client: Arc<TimelineClient>,
    limit: usize,
    name: &'static str,
    target: ReplyTarget,
) -> Result<(), CommandError> {
    let description = match target {
        ReplyTarget::Channel => "Show a curated list's recent posts in the channel",
        ReplyTarget::Direct => "Send a curated list's recent posts privately",
    };
    router.register(
        Command::new(name)
            .with_description(description)
            .with_usage(format!("{} <list_name> [count=20] [include_reposts=true]", name))
            .with_param(ParamSpec::required("list_name", ParamKind::Str))
            .with_param(ParamSpec::optional("count", ParamKind::Int, DEFAULT_COUNT))
            .with_param(ParamSpec::optional("include_reposts", ParamKind::Bool, "true"))
            .with_handler(move |ctx| {
                let c = client.clone();
                Box::pin(async move {
                    let list = ctx.args.str("list_name")?.to_string();
                    let count = ctx.args.int("count")?.clamp(1, 100) as u32;
                    let reposts = ctx.args.flag("include_reposts")?;
                    let owner = c.verify_credentials().await?;
                    let statuses = c.list_timeline(&list, &owner, count, reposts).await?;
                    let mut units = vec![DisplayUnit::text(format!("Posts from list: {}", list))];
                    units.extend(format_statuses(&statuses, limit));
                    Ok(Reply { units, target })
                })
            }),
    )
}

fn register_user_timeline(
    router: &mut Router,
    client: Arc<TimelineClient>,
    limit: usize,
    name: &'static str,
    target: ReplyTarget,
) -> Result<(), CommandError> {
    let description = match target {
        ReplyTarget::Channel => "Show a user's recent posts in the channel",
        ReplyTarget::Direct => "Send a user's recent posts privately",
    };
    router.register(
        Command::new(name)
            .with_description(description)
            .with_usage(format!("{} <handle> [count=20]", name))
            .with_param(ParamSpec::required("handle", ParamKind::Str))
            .with_param(ParamSpec::optional("count", ParamKind::Int, DEFAULT_COUNT))
            .with_handler(move |ctx| {
                let c = client.clone();
                Box::pin(async move {
                    let handle = ctx.args.str("handle")?.to_string();
                    let count = ctx.args.int("count")?.clamp(1, 100) as u32;
                    let statuses = c.user_timeline(&handle, count).await?;
                    let mut units = vec![DisplayUnit::text(format!("Posts from: {}", handle))];
                    units.extend(format_statuses(&statuses, limit));
                    Ok(Reply { units, target })
                })
            }),
    )
}

fn text_units(text: &str, limit: usize) -> Vec<DisplayUnit> {
    segment(text, limit).into_iter().map(DisplayUnit::Text).collect()
}
