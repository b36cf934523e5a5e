//! Command router - matches prefixed messages to registered handlers
//!
//! The router owns the command registry and the argument binding rules.
//! It never sends messages itself; dispatch errors go back to the event
//! loop, which owns user-visible notification.

use crate::application::errors::{BotError, CommandError};
use crate::application::messaging::parser::Parser;
use crate::application::messaging::segmenter::segment;
use crate::domain::entities::{
    ArgValue, BoundArgs, Command, CommandRegistry, DisplayUnit, InvocationContext, ParamKind,
    ParamSpec, Reply, User,
};

pub struct Router {
    parser: Parser,
    registry: CommandRegistry,
}

impl Router {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            parser: Parser::new(prefix),
            registry: CommandRegistry::new(),
        }
    }

    /// Register a command; fails if the name is already taken
    pub fn register(&mut self, command: Command) -> Result<(), CommandError> {
        self.registry.register(command)
    }

    pub fn command_count(&self) -> usize {
        self.registry.len()
    }

    /// Register the `help` command from a snapshot of everything registered
    /// so far. Call after all integration groups are in place.
    pub fn finalize_help(&mut self, limit: usize) -> Result<(), CommandError> {
        let prefix = self.parser.prefix().to_string();
        let mut entries: Vec<(String, String, Option<String>)> = self
            .registry
            .all()
            .map(|c| {
                (
                    c.name.clone(),
                    c.description.clone().unwrap_or_default(),
                    c.usage.clone(),
                )
            })
            .collect();
        entries.push((
            "help".to_string(),
            "Show this message, or details for one command".to_string(),
            Some(format!("{}help [command]", prefix)),
        ));
        entries.sort();

        self.register(
            Command::new("help")
                .with_description("Show this message, or details for one command")
                .with_usage(format!("{}help [command]", prefix))
                .with_param(ParamSpec::optional("command", ParamKind::Str, ""))
                .with_handler(move |ctx| {
                    let entries = entries.clone();
                    let prefix = prefix.clone();
                    Box::pin(async move {
                        let wanted = ctx.args.str("command")?.to_string();
                        let text = if wanted.is_empty() {
                            let mut out = String::from("Available commands:\n");
                            for (name, desc, _) in &entries {
                                out.push_str(&format!("{}{} - {}\n", prefix, name, desc));
                            }
                            out
                        } else {
                            match entries.iter().find(|(name, _, _)| *name == wanted) {
                                Some((name, desc, usage)) => {
                                    let mut out = format!("{}{} - {}", prefix, name, desc);
                                    if let Some(usage) = usage {
                                        out.push_str(&format!("\nUsage: {}", usage));
                                    }
                                    out
                                }
                                None => format!("Command {}{} not found", prefix, wanted),
                            }
                        };
                        let units = segment(&text, limit)
                            .into_iter()
                            .map(DisplayUnit::Text)
                            .collect();
                        Ok(Reply::channel(units))
                    })
                }),
        )
    }

    /// Parse and dispatch one message.
    ///
    /// `Ok(None)` means the text was not addressed to the bot. Exactly one
    /// handler runs per matched message.
    pub async fn dispatch(
        &self,
        sender: User,
        chat_id: &str,
        text: &str,
    ) -> Result<Option<Reply>, BotError> {
        let Some(invocation) = self.parser.parse(text) else {
            return Ok(None);
        };

        let command = self
            .registry
            .get(&invocation.name)
            .ok_or_else(|| CommandError::Unknown(invocation.name.clone()))?;

        let args = bind(&command.params, &invocation.tokens)?;
        let ctx = InvocationContext::new(sender, chat_id, args);

        tracing::debug!(command = %command.name, invocation = %ctx.id, "dispatching");

        match &command.handler {
            Some(handler) => handler(ctx).await.map(Some),
            None => Err(BotError::Internal(format!(
                "command {} registered without a handler",
                command.name
            ))),
        }
    }
}

/// Bind raw tokens to declared parameters, positionally.
///
/// A trailing variadic parameter swallows the remainder; absent optionals
/// take their declared default through the same coercion path; extra
/// tokens past the schema are ignored.
fn bind(params: &[ParamSpec], tokens: &[String]) -> Result<BoundArgs, CommandError> {
    let mut args = BoundArgs::new();
    let mut idx = 0;

    for param in params {
        if param.variadic {
            args.insert(param.name, ArgValue::Rest(tokens[idx..].to_vec()));
            idx = tokens.len();
            continue;
        }
        match tokens.get(idx) {
            Some(token) => {
                args.insert(param.name, coerce(param, token)?);
                idx += 1;
            }
            None => match param.default {
                Some(default) => args.insert(param.name, coerce(param, default)?),
                None => return Err(CommandError::MissingArgument(param.name.to_string())),
            },
        }
    }

    Ok(args)
}

fn coerce(param: &ParamSpec, token: &str) -> Result<ArgValue, CommandError> {
    match param.kind {
        ParamKind::Str => Ok(ArgValue::Str(token.to_string())),
        ParamKind::Int => token
            .parse::<i64>()
            .map(ArgValue::Int)
            .map_err(|_| invalid(param, token)),
        ParamKind::Bool => match token.to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Ok(ArgValue::Bool(true)),
            "false" | "no" | "0" => Ok(ArgValue::Bool(false)),
            _ => Err(invalid(param, token)),
        },
    }
}

fn invalid(param: &ParamSpec, token: &str) -> CommandError {
    CommandError::InvalidArgumentType {
        param: param.name.to_string(),
        token: token.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn probe() -> User {
        User::new("42").with_username("tester")
    }

    /// A command that records each invocation, standing in for a handler
    /// that would hit an upstream API.
    fn counted_command(name: &str, params: Vec<ParamSpec>, calls: Arc<AtomicUsize>) -> Command {
        let mut cmd = Command::new(name);
        for p in params {
            cmd = cmd.with_param(p);
        }
        cmd.with_handler(move |_ctx| {
            let calls = calls.clone();
            Box::pin(async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(Reply::channel_text("ok"))
            })
        })
    }

    #[test]
    fn duplicate_registration_fails() {
        let mut router = Router::new("!");
        let calls = Arc::new(AtomicUsize::new(0));
        router
            .register(counted_command("ping", vec![], calls.clone()))
            .unwrap();
        let err = router
            .register(counted_command("ping", vec![], calls))
            .unwrap_err();
        assert_eq!(err, CommandError::Duplicate("ping".to_string()));
    }

    #[tokio::test]
    async fn unknown_command_reports_and_calls_nothing() {
        let mut router = Router::new("!");
        let calls = Arc::new(AtomicUsize::new(0));
        router
            .register(counted_command("ping", vec![], calls.clone()))
            .unwrap();

        let err = router
            .dispatch(probe(), "chat", "!nosuchcommand")
            .await
            .unwrap_err();
        match err {
            BotError::Command(CommandError::Unknown(name)) => {
                assert_eq!(name, "nosuchcommand")
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn non_prefixed_text_is_a_noop() {
        let mut router = Router::new("!");
        let calls = Arc::new(AtomicUsize::new(0));
        router
            .register(counted_command("ping", vec![], calls.clone()))
            .unwrap();

        let reply = router.dispatch(probe(), "chat", "just chatting").await.unwrap();
        assert!(reply.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_required_argument_names_the_parameter() {
        let mut router = Router::new("!");
        let calls = Arc::new(AtomicUsize::new(0));
        router
            .register(counted_command(
                "create_list",
                vec![
                    ParamSpec::required("list_name", ParamKind::Str),
                    ParamSpec::optional("description", ParamKind::Str, ""),
                ],
                calls.clone(),
            ))
            .unwrap();

        let err = router
            .dispatch(probe(), "chat", "!create_list")
            .await
            .unwrap_err();
        match err {
            BotError::Command(CommandError::MissingArgument(param)) => {
                assert_eq!(param, "list_name")
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn defaults_fill_absent_optionals() {
        let mut router = Router::new("!");
        let seen = Arc::new(std::sync::Mutex::new((0i64, false)));
        let seen2 = seen.clone();
        router
            .register(
                Command::new("display_list")
                    .with_param(ParamSpec::required("list_name", ParamKind::Str))
                    .with_param(ParamSpec::optional("count", ParamKind::Int, "20"))
                    .with_param(ParamSpec::optional("include_reposts", ParamKind::Bool, "true"))
                    .with_handler(move |ctx| {
                        let seen = seen2.clone();
                        Box::pin(async move {
                            let count = ctx.args.int("count")?;
                            let reposts = ctx.args.flag("include_reposts")?;
                            *seen.lock().unwrap() = (count, reposts);
                            Ok(Reply::channel_text("ok"))
                        })
                    }),
            )
            .unwrap();

        router
            .dispatch(probe(), "chat", "!display_list reading")
            .await
            .unwrap();
        assert_eq!(*seen.lock().unwrap(), (20, true));

        router
            .dispatch(probe(), "chat", "!display_list reading 5 false")
            .await
            .unwrap();
        assert_eq!(*seen.lock().unwrap(), (5, false));
    }

    #[tokio::test]
    async fn variadic_swallows_remaining_tokens() {
        let mut router = Router::new("!");
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let seen2 = seen.clone();
        router
            .register(
                Command::new("add_list_members")
                    .with_param(ParamSpec::required("list_name", ParamKind::Str))
                    .with_param(ParamSpec::variadic("members"))
                    .with_handler(move |ctx| {
                        let seen = seen2.clone();
                        Box::pin(async move {
                            *seen.lock().unwrap() = ctx.args.rest("members").to_vec();
                            Ok(Reply::channel_text("ok"))
                        })
                    }),
            )
            .unwrap();

        router
            .dispatch(probe(), "chat", "!add_list_members reading alice bob carol")
            .await
            .unwrap();
        assert_eq!(*seen.lock().unwrap(), vec!["alice", "bob", "carol"]);
    }

    #[tokio::test]
    async fn bad_coercion_names_param_and_token() {
        let mut router = Router::new("!");
        let calls = Arc::new(AtomicUsize::new(0));
        router
            .register(counted_command(
                "forecast",
                vec![
                    ParamSpec::required("location", ParamKind::Str),
                    ParamSpec::optional("steps", ParamKind::Int, "1"),
                ],
                calls.clone(),
            ))
            .unwrap();

        let err = router
            .dispatch(probe(), "chat", "!forecast Portland soon")
            .await
            .unwrap_err();
        match err {
            BotError::Command(CommandError::InvalidArgumentType { param, token }) => {
                assert_eq!(param, "steps");
                assert_eq!(token, "soon");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn help_lists_registered_commands() {
        let mut router = Router::new("!");
        let calls = Arc::new(AtomicUsize::new(0));
        router.register(counted_command("ping", vec![], calls)).unwrap();
        router.finalize_help(2000).unwrap();

        let reply = router
            .dispatch(probe(), "chat", "!help")
            .await
            .unwrap()
            .unwrap();
        let DisplayUnit::Text(text) = &reply.units[0] else {
            panic!("help should be plain text")
        };
        assert!(text.contains("!ping"));
        assert!(text.contains("!help"));
    }
}
