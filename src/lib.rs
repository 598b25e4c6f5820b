//! Route pipeline: compiles declarative route patterns (`"deploy {env}
//! --force,-f --replicas {n:int?}"`) into matchers, resolves argument
//! vectors against them, and serves tab completion — all synchronously and
//! without regard to where those arguments came from.

pub mod ast;
pub mod compiler;
pub mod completion;
pub mod config;
pub mod converters;
pub mod endpoint;
pub mod error;
pub mod lexer;
pub mod logging;
pub mod matcher;
pub mod parser;
pub mod resolver;
pub mod route;
pub mod router;
pub mod token;
pub mod value;

#[cfg(feature = "repl")]
pub mod repl;

pub use endpoint::{Endpoint, EndpointTable, HandlerOutcome, HandlerRef, MessageType};
pub use error::{ConversionError, NoMatchReason, ParseError, ParseErrorKind};
pub use resolver::{BoundParameters, ResolveOutcome};
pub use router::{Router, RouterBuilder};
pub use value::Value;
