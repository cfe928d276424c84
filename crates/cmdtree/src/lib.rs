//! Declarative command-tree parsing and dispatch.
//!
//! A tool declares its commands as explicit data: option and positional
//! descriptors ([`OptDef`], [`ArgDef`]) grouped into [`Command`] leaves,
//! nested under [`Group`] nodes to any depth. One call to [`dispatch`] walks
//! an argument vector down the tree, binds and validates tokens against the
//! resolved command's descriptors, and invokes its handler with typed values.
//!
//! The tree is built once at startup, is immutable afterwards, and can serve
//! repeated dispatches. There is no global registry; the root [`Group`] is an
//! ordinary value passed to the dispatcher.

pub mod descriptor;
pub mod dispatch;
pub mod error;
pub mod help;
pub mod tree;
pub mod validate;

pub use descriptor::{ArgDef, OptDef, ValueKind};
pub use dispatch::{
    Completion, Invocation, Outcome, dispatch, dispatch_command, parse, parse_command,
};
pub use error::{
    ConfigError, DispatchError, Failure, FailureKind, HandlerError, ValidationError,
};
pub use tree::{Command, CommandBuilder, Group, Handler, HandlerResult, Node, NodeView};
pub use validate::{Check, Value};
