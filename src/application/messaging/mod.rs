//! Message handling - parsing, segmentation and command dispatch

pub mod dispatcher;
pub mod parser;
pub mod segmenter;

pub use dispatcher::Router;
pub use parser::{Invocation, Parser};
pub use segmenter::segment;
