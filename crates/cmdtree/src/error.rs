//! Error taxonomy for tree construction, validation and dispatch.
//!
//! `ConfigError` is a programmer error in declaring the tree and is fatal at
//! build time. `ValidationError` and `DispatchError` are expected outcomes of
//! user input and are meant to be caught at the process boundary, formatted,
//! and turned into a clean non-zero exit.

use std::fmt;

use thiserror::Error;

/// Boxed error returned by a command handler.
///
/// Handler failures are not this engine's concern; they pass through dispatch
/// unmodified as [`FailureKind::Handler`].
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Programmer error in declaring the command tree.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("name cannot be empty")]
    EmptyName,

    #[error("duplicate name '{0}' among siblings")]
    DuplicateName(String),

    #[error("'{0}' cannot be required and carry a default")]
    RequiredWithDefault(String),

    #[error("required positional '{0}' declared after an optional one")]
    RequiredAfterOptional(String),

    #[error("variadic positional '{0}' must be declared last")]
    VariadicNotLast(String),

    #[error("option '{0}' takes a value and cannot be negatable")]
    NegatableValue(String),
}

/// A supplied token failed a type or content check.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("path does not exist: {0}")]
    PathNotFound(String),

    #[error("not a boolean token: '{0}'")]
    InvalidBool(String),

    #[error("invalid value '{token}' (possible values: {})", .allowed.join(", "))]
    InvalidChoice { token: String, allowed: Vec<String> },
}

/// Structural parse failure while resolving or binding an argument vector.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("unknown command '{token}' (expected one of: {})", .expected.join(", "))]
    UnknownCommand { token: String, expected: Vec<String> },

    #[error("unknown option: {0}")]
    UnknownOption(String),

    #[error("missing value for {0}")]
    MissingValue(String),

    #[error("unexpected argument: {0}")]
    TooManyArguments(String),

    #[error("missing required argument: <{0}>")]
    MissingArgument(String),

    #[error("missing required option: --{0}")]
    MissingOption(String),

    #[error("invalid value for '{name}': {source}")]
    Invalid {
        name: String,
        #[source]
        source: ValidationError,
    },
}

/// What went wrong during a dispatch.
#[derive(Debug)]
pub enum FailureKind {
    /// Resolution, binding or validation failed before the handler ran.
    Dispatch(DispatchError),
    /// The handler ran and failed; the error is passed through unmodified.
    Handler(HandlerError),
}

/// A failed dispatch, annotated with the deepest command path that resolved
/// and a pre-rendered usage string for that node.
#[derive(Debug)]
pub struct Failure {
    /// Program name followed by the names of every resolved node.
    pub path: Vec<String>,
    /// Usage text for the deepest node that resolved.
    pub usage: String,
    pub kind: FailureKind,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.path.is_empty() {
            write!(f, "{}: ", self.path.join(" "))?;
        }
        match &self.kind {
            FailureKind::Dispatch(err) => write!(f, "{err}"),
            FailureKind::Handler(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Failure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            FailureKind::Dispatch(err) => Some(err),
            FailureKind::Handler(err) => Some(&**err as &(dyn std::error::Error + 'static)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_error_lists_expected_commands() {
        let err = DispatchError::UnknownCommand {
            token: "unknown".to_string(),
            expected: vec!["stats".to_string(), "preprocess".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "unknown command 'unknown' (expected one of: stats, preprocess)"
        );
    }

    #[test]
    fn failure_prefixes_command_path() {
        let failure = Failure {
            path: vec!["lunchtime".to_string(), "stats".to_string()],
            usage: String::new(),
            kind: FailureKind::Dispatch(DispatchError::UnknownOption("--bogus".to_string())),
        };
        assert_eq!(
            failure.to_string(),
            "lunchtime stats: unknown option: --bogus"
        );
    }

    #[test]
    fn validation_error_names_the_path() {
        let err = ValidationError::PathNotFound("missing.csv".to_string());
        assert_eq!(err.to_string(), "path does not exist: missing.csv");

        let wrapped = DispatchError::Invalid {
            name: "inputfile".to_string(),
            source: err,
        };
        assert_eq!(
            wrapped.to_string(),
            "invalid value for 'inputfile': path does not exist: missing.csv"
        );
    }
}
