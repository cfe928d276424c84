//! Immutable metadata describing one option or positional argument.
//!
//! Descriptors are plain data with chaining constructors. Structural rules
//! (non-empty unique names, no required+default, ordering of positionals)
//! are enforced when the owning command is built, failing fast with
//! [`ConfigError`](crate::error::ConfigError).

use crate::error::ConfigError;
use crate::validate::{self, Check};

/// The shape of the value a descriptor accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueKind {
    /// Boolean flag; takes no value token on the command line.
    Flag,
    /// Free-form string.
    Str,
    /// Filesystem path.
    Path,
    /// One of a fixed token set.
    Choice(Vec<String>),
}

impl ValueKind {
    pub(crate) fn takes_value(&self) -> bool {
        !matches!(self, ValueKind::Flag)
    }

    /// Short type name used by the help renderer.
    pub(crate) fn display_name(&self) -> &'static str {
        match self {
            ValueKind::Flag => "flag",
            ValueKind::Str => "string",
            ValueKind::Path => "path",
            ValueKind::Choice(_) => "choice",
        }
    }
}

/// One named option (`--name`, `--name=value`, `--name value`).
///
/// The canonical name is stored without the `--` prefix and must be unique
/// among its siblings on the owning command.
#[derive(Debug, Clone)]
pub struct OptDef {
    name: String,
    kind: ValueKind,
    default: Option<String>,
    required: bool,
    negatable: bool,
    help: String,
    checks: Vec<Check>,
}

impl OptDef {
    pub fn new(name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            kind,
            default: None,
            required: false,
            negatable: false,
            help: String::new(),
            checks: Vec::new(),
        }
    }

    /// Shorthand for a boolean flag option.
    pub fn flag(name: impl Into<String>) -> Self {
        Self::new(name, ValueKind::Flag)
    }

    pub fn help(mut self, text: impl Into<String>) -> Self {
        self.help = text.into();
        self
    }

    /// Raw default token, used when the option is absent from argv.
    ///
    /// Defaults run through the same check chain and conversion as
    /// argv-supplied tokens at dispatch time.
    pub fn default_value(mut self, token: impl Into<String>) -> Self {
        self.default = Some(token.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Accept a `--no-<name>` paired form that sets the flag to false.
    pub fn negatable(mut self) -> Self {
        self.negatable = true;
        self
    }

    /// Append a check to the validation chain.
    pub fn check(mut self, check: Check) -> Self {
        self.checks.push(check);
        self
    }

    /// Require the value to name an existing filesystem entry.
    pub fn must_exist(self) -> Self {
        self.check(validate::path_exists)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &ValueKind {
        &self.kind
    }

    pub fn default(&self) -> Option<&str> {
        self.default.as_deref()
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_negatable(&self) -> bool {
        self.negatable
    }

    pub fn help_text(&self) -> &str {
        &self.help
    }

    pub fn checks(&self) -> &[Check] {
        &self.checks
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.name.is_empty() {
            return Err(ConfigError::EmptyName);
        }
        if self.required && self.default.is_some() {
            return Err(ConfigError::RequiredWithDefault(self.name.clone()));
        }
        if self.negatable && self.kind.takes_value() {
            return Err(ConfigError::NegatableValue(self.name.clone()));
        }
        Ok(())
    }
}

/// One positional argument; ordinal position is declaration order on the
/// owning command.
#[derive(Debug, Clone)]
pub struct ArgDef {
    name: String,
    kind: ValueKind,
    required: bool,
    variadic: bool,
    help: String,
    checks: Vec<Check>,
}

impl ArgDef {
    pub fn new(name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            variadic: false,
            help: String::new(),
            checks: Vec::new(),
        }
    }

    pub fn help(mut self, text: impl Into<String>) -> Self {
        self.help = text.into();
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Absorb all trailing positionals. At most one per command, last.
    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }

    /// Append a check to the validation chain.
    pub fn check(mut self, check: Check) -> Self {
        self.checks.push(check);
        self
    }

    /// Require the value to name an existing filesystem entry.
    pub fn must_exist(self) -> Self {
        self.check(validate::path_exists)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &ValueKind {
        &self.kind
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_variadic(&self) -> bool {
        self.variadic
    }

    pub fn help_text(&self) -> &str {
        &self.help
    }

    pub fn checks(&self) -> &[Check] {
        &self.checks
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.name.is_empty() {
            return Err(ConfigError::EmptyName);
        }
        Ok(())
    }
}
