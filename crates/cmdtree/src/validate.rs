//! Pure per-token checks and typed conversion.
//!
//! A descriptor carries an ordered chain of [`Check`] functions that run
//! against the raw token before conversion, short-circuiting on the first
//! failure. Conversion itself is driven by the descriptor's
//! [`ValueKind`](crate::descriptor::ValueKind).

use std::path::{Path, PathBuf};

use crate::descriptor::ValueKind;
use crate::error::ValidationError;

/// A typed parameter value produced by validation and conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Str(String),
    Path(PathBuf),
    /// Values bound to a variadic trailing positional, in argv order.
    List(Vec<Value>),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_path(&self) -> Option<&Path> {
        match self {
            Value::Path(p) => Some(p.as_path()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(values) => Some(values.as_slice()),
            _ => None,
        }
    }
}

/// A pure check applied to a raw token before conversion.
pub type Check = fn(&str) -> Result<(), ValidationError>;

const TRUE_TOKENS: &[&str] = &["true", "1", "yes"];
const FALSE_TOKENS: &[&str] = &["false", "0", "no"];

/// Check that a token names an existing filesystem entry.
///
/// This is a point-in-time check: the entry can disappear between the check
/// and any later use of the path. Known limitation; one syscall per token.
pub fn path_exists(token: &str) -> Result<(), ValidationError> {
    if Path::new(token).exists() {
        Ok(())
    } else {
        Err(ValidationError::PathNotFound(token.to_string()))
    }
}

/// Check that a token is an accepted boolean spelling.
pub fn bool_token(token: &str) -> Result<(), ValidationError> {
    parse_bool(token).map(|_| ())
}

pub(crate) fn parse_bool(token: &str) -> Result<bool, ValidationError> {
    if TRUE_TOKENS.contains(&token) {
        Ok(true)
    } else if FALSE_TOKENS.contains(&token) {
        Ok(false)
    } else {
        Err(ValidationError::InvalidBool(token.to_string()))
    }
}

/// Run a check chain in declaration order, stopping at the first failure.
pub fn run_checks(token: &str, checks: &[Check]) -> Result<(), ValidationError> {
    for check in checks {
        check(token)?;
    }
    Ok(())
}

/// Convert a checked token into its typed value.
pub fn convert(kind: &ValueKind, token: &str) -> Result<Value, ValidationError> {
    match kind {
        ValueKind::Flag => parse_bool(token).map(Value::Bool),
        ValueKind::Str => Ok(Value::Str(token.to_string())),
        ValueKind::Path => Ok(Value::Path(PathBuf::from(token))),
        ValueKind::Choice(allowed) => {
            if allowed.iter().any(|a| a == token) {
                Ok(Value::Str(token.to_string()))
            } else {
                Err(ValidationError::InvalidChoice {
                    token: token.to_string(),
                    allowed: allowed.clone(),
                })
            }
        }
    }
}
