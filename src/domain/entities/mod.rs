//! Domain entities - Core business objects with no external dependencies

pub mod command;
pub mod display;
pub mod invocation;
pub mod user;

pub use command::{Command, CommandRegistry, ParamKind, ParamSpec};
pub use display::{Card, CardField, DisplayUnit, Reply, ReplyTarget};
pub use invocation::{ArgValue, BoundArgs, InvocationContext};
pub use user::User;
