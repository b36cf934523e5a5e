use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::application::errors::CommandError;
use crate::domain::entities::User;

/// A coerced argument value, produced by the router during binding
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Str(String),
    Int(i64),
    Bool(bool),
    /// Tokens consumed by a trailing variadic parameter
    Rest(Vec<String>),
}

/// Arguments bound to a command's declared parameters, keyed by parameter name
#[derive(Debug, Clone, Default)]
pub struct BoundArgs {
    values: HashMap<String, ArgValue>,
}

impl BoundArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: ArgValue) {
        self.values.insert(name.into(), value);
    }

    pub fn str(&self, name: &str) -> Result<&str, CommandError> {
        match self.values.get(name) {
            Some(ArgValue::Str(s)) => Ok(s),
            _ => Err(CommandError::MissingArgument(name.to_string())),
        }
    }

    pub fn int(&self, name: &str) -> Result<i64, CommandError> {
        match self.values.get(name) {
            Some(ArgValue::Int(n)) => Ok(*n),
            _ => Err(CommandError::MissingArgument(name.to_string())),
        }
    }

    pub fn flag(&self, name: &str) -> Result<bool, CommandError> {
        match self.values.get(name) {
            Some(ArgValue::Bool(b)) => Ok(*b),
            _ => Err(CommandError::MissingArgument(name.to_string())),
        }
    }

    /// Variadic tokens; an absent or empty variadic yields an empty slice
    pub fn rest(&self, name: &str) -> &[String] {
        match self.values.get(name) {
            Some(ArgValue::Rest(v)) => v,
            _ => &[],
        }
    }
}

/// Everything a handler can know about one command invocation.
///
/// Constructed by the router per matched message and discarded after the
/// response is sent. Immutable for the duration of the invocation.
#[derive(Debug, Clone)]
pub struct InvocationContext {
    pub id: String,
    pub sender: User,
    pub chat_id: String,
    pub args: BoundArgs,
    pub received_at: DateTime<Utc>,
}

impl InvocationContext {
    pub fn new(sender: User, chat_id: impl Into<String>, args: BoundArgs) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            sender,
            chat_id: chat_id.into(),
            args,
            received_at: Utc::now(),
        }
    }
}
