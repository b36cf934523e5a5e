use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::application::errors::{BotError, CommandError};
use crate::domain::entities::{InvocationContext, Reply};

/// Declared parameter types the router can coerce to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Str,
    Int,
    Bool,
}

/// One declared parameter of a command
#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    /// Raw default token, coerced like a user-supplied one
    pub default: Option<&'static str>,
    /// Consumes all remaining tokens; only valid in last position
    pub variadic: bool,
}

impl ParamSpec {
    pub fn required(name: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            kind,
            default: None,
            variadic: false,
        }
    }

    pub fn optional(name: &'static str, kind: ParamKind, default: &'static str) -> Self {
        Self {
            name,
            kind,
            default: Some(default),
            variadic: false,
        }
    }

    pub fn variadic(name: &'static str) -> Self {
        Self {
            name,
            kind: ParamKind::Str,
            default: None,
            variadic: true,
        }
    }
}

/// Boxed future returned by a command handler
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<Reply, BotError>> + Send>>;

/// Command handler function type
pub type Handler = Arc<dyn Fn(InvocationContext) -> HandlerFuture + Send + Sync>;

/// A named, user-invocable operation bound to a handler and parameter schema
#[derive(Clone)]
pub struct Command {
    pub name: String,
    pub description: Option<String>,
    pub usage: Option<String>,
    pub params: Vec<ParamSpec>,
    pub handler: Option<Handler>,
}

impl Command {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            usage: None,
            params: Vec::new(),
            handler: None,
        }
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }

    pub fn with_param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }

    pub fn with_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(InvocationContext) -> HandlerFuture + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }
}

/// Command registry. Built once at startup, read-only afterwards.
///
/// Names are case-sensitive and unique.
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<String, Command>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, command: Command) -> Result<(), CommandError> {
        if self.commands.contains_key(&command.name) {
            return Err(CommandError::Duplicate(command.name));
        }
        self.commands.insert(command.name.clone(), command);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }

    pub fn all(&self) -> impl Iterator<Item = &Command> {
        self.commands.values()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
