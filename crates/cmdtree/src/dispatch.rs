//! Resolution, binding, validation and handler invocation.
//!
//! One call to [`dispatch`] consumes one argument vector: the tree is walked
//! until a command resolves, remaining tokens are classified and bound to the
//! command's descriptors, defaults are filled in, every raw value runs its
//! check chain and conversion, and the handler is called exactly once with
//! the typed parameter set. The tree itself is never mutated, so a built tree
//! can serve repeated dispatches.
//!
//! Boolean pairs (`--verbose`/`--no-verbose`) resolve to one descriptor;
//! when both appear, the last token in argv wins.

use std::collections::VecDeque;

use indexmap::IndexMap;

use crate::descriptor::ValueKind;
use crate::error::{DispatchError, Failure, FailureKind};
use crate::help;
use crate::tree::{Command, Group, HandlerResult, Node};
use crate::validate::{self, Check, Value};

/// Result of a successful parse, before any handler runs.
#[derive(Debug)]
pub enum Outcome<'t> {
    /// A command resolved and bound; ready to invoke.
    Ready(Invocation<'t>),
    /// Help text for the deepest resolved node; print to stdout.
    Help(String),
    /// Version text; print to stdout.
    Version(String),
}

/// Result of a full dispatch.
#[derive(Debug)]
pub enum Completion {
    /// The handler ran and returned success.
    Ran,
    Help(String),
    Version(String),
}

/// Ephemeral result of one dispatch: the resolved command and its validated
/// parameter mapping. Discarded after the handler returns.
#[derive(Debug)]
pub struct Invocation<'t> {
    command: &'t Command,
    path: Vec<String>,
    values: IndexMap<String, Value>,
}

impl<'t> Invocation<'t> {
    pub fn command(&self) -> &'t Command {
        self.command
    }

    /// Program name followed by every resolved node name.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn get_path(&self, name: &str) -> Option<&std::path::Path> {
        self.get(name).and_then(Value::as_path)
    }

    pub fn get_list(&self, name: &str) -> Option<&[Value]> {
        self.get(name).and_then(Value::as_list)
    }

    /// Bound values in declaration order: options first, then positionals.
    pub fn values(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Call the command's handler with this parameter set.
    pub fn invoke(&self) -> HandlerResult {
        self.command.call(self)
    }
}

/// Resolve `argv` against the tree rooted at `root` and bind parameters,
/// without invoking any handler.
///
/// `prog` is the program name used in usage lines and error paths. An empty
/// vector, `-h`/`--help` at any group or command position, and `-V`/
/// `--version` at the root short-circuit to [`Outcome::Help`] and
/// [`Outcome::Version`].
pub fn parse<'t>(root: &'t Group, prog: &str, argv: &[String]) -> Result<Outcome<'t>, Failure> {
    let mut path: Vec<String> = vec![prog.to_string()];
    let mut group = root;
    let mut at_root = true;
    let mut idx = 0usize;

    loop {
        match argv.get(idx).map(String::as_str) {
            None | Some("-h") | Some("--help") => {
                return Ok(Outcome::Help(help::render(group.describe(), &path)));
            }
            Some("-V") | Some("--version") if at_root => {
                return Ok(Outcome::Version(help::render_version(root, prog)));
            }
            Some(token) => match group.get(token) {
                Some(Node::Group(child)) => {
                    path.push(token.to_string());
                    group = child;
                    at_root = false;
                    idx += 1;
                }
                Some(Node::Command(cmd)) => {
                    path.push(token.to_string());
                    return bind(cmd, path, &argv[idx + 1..]);
                }
                None => {
                    let err = DispatchError::UnknownCommand {
                        token: token.to_string(),
                        expected: group.child_names(),
                    };
                    return Err(Failure {
                        usage: help::render(group.describe(), &path),
                        path,
                        kind: FailureKind::Dispatch(err),
                    });
                }
            },
        }
    }
}

/// Parse against a bare command with no surrounding group, for
/// single-command tools.
pub fn parse_command<'t>(
    cmd: &'t Command,
    prog: &str,
    argv: &[String],
) -> Result<Outcome<'t>, Failure> {
    bind(cmd, vec![prog.to_string()], argv)
}

/// Parse and, if a command resolved, invoke its handler exactly once.
///
/// Handler failures pass through unmodified as [`FailureKind::Handler`];
/// everything else is a [`FailureKind::Dispatch`] carrying the deepest
/// resolved path and its usage text.
pub fn dispatch(root: &Group, prog: &str, argv: &[String]) -> Result<Completion, Failure> {
    match parse(root, prog, argv)? {
        Outcome::Ready(invocation) => finish(invocation),
        Outcome::Help(text) => Ok(Completion::Help(text)),
        Outcome::Version(text) => Ok(Completion::Version(text)),
    }
}

/// [`dispatch`] for a bare command with no surrounding group.
pub fn dispatch_command(cmd: &Command, prog: &str, argv: &[String]) -> Result<Completion, Failure> {
    match parse_command(cmd, prog, argv)? {
        Outcome::Ready(invocation) => finish(invocation),
        Outcome::Help(text) => Ok(Completion::Help(text)),
        Outcome::Version(text) => Ok(Completion::Version(text)),
    }
}

fn finish(invocation: Invocation<'_>) -> Result<Completion, Failure> {
    match invocation.invoke() {
        Ok(()) => Ok(Completion::Ran),
        Err(err) => Err(Failure {
            usage: help::render(invocation.command().describe(), invocation.path()),
            path: invocation.path().to_vec(),
            kind: FailureKind::Handler(err),
        }),
    }
}

fn bind<'t>(
    cmd: &'t Command,
    path: Vec<String>,
    tokens: &[String],
) -> Result<Outcome<'t>, Failure> {
    match bind_values(cmd, tokens) {
        Ok(Some(values)) => Ok(Outcome::Ready(Invocation {
            command: cmd,
            path,
            values,
        })),
        Ok(None) => Ok(Outcome::Help(help::render(cmd.describe(), &path))),
        Err(err) => Err(Failure {
            usage: help::render(cmd.describe(), &path),
            path,
            kind: FailureKind::Dispatch(err),
        }),
    }
}

/// Classify, bind, default-fill and validate. `Ok(None)` means help was
/// requested.
fn bind_values(
    cmd: &Command,
    tokens: &[String],
) -> Result<Option<IndexMap<String, Value>>, DispatchError> {
    // The help builtin wins over any classification error.
    for token in tokens {
        if token == "--" {
            break;
        }
        if token == "-h" || token == "--help" {
            return Ok(None);
        }
    }

    // Raw option tokens by descriptor name; insert replaces, so the last
    // spelling in argv wins for repeated options and for `--x`/`--no-x`.
    let mut raw: IndexMap<String, String> = IndexMap::new();
    let mut positionals: Vec<&str> = Vec::new();
    let mut after_separator = false;

    let mut i = 0usize;
    while i < tokens.len() {
        let token = tokens[i].as_str();

        if !after_separator && token == "--" {
            after_separator = true;
            i += 1;
            continue;
        }

        if !after_separator && token.starts_with("--") {
            let body = &token[2..];

            // --name=value
            if let Some((name, value)) = body.split_once('=') {
                let opt = cmd
                    .find_opt(name)
                    .ok_or_else(|| DispatchError::UnknownOption(format!("--{name}")))?;
                // A flag spelled `--flag=yes` goes through boolean conversion.
                raw.insert(opt.name().to_string(), value.to_string());
                i += 1;
                continue;
            }

            // --no-<flag> paired form.
            if let Some(stem) = body.strip_prefix("no-") {
                if let Some(opt) = cmd.find_opt(stem) {
                    if opt.is_negatable() {
                        raw.insert(opt.name().to_string(), "false".to_string());
                        i += 1;
                        continue;
                    }
                }
            }

            let opt = cmd
                .find_opt(body)
                .ok_or_else(|| DispatchError::UnknownOption(token.to_string()))?;
            if opt.kind().takes_value() {
                let value = tokens
                    .get(i + 1)
                    .ok_or_else(|| DispatchError::MissingValue(token.to_string()))?;
                raw.insert(opt.name().to_string(), value.to_string());
                i += 2;
            } else {
                raw.insert(opt.name().to_string(), "true".to_string());
                i += 1;
            }
            continue;
        }

        if !after_separator && token.starts_with('-') && token != "-" {
            return Err(DispatchError::UnknownOption(token.to_string()));
        }

        positionals.push(token);
        i += 1;
    }

    // Bind positionals to argument descriptors in declaration order.
    let mut arg_raw: IndexMap<String, Vec<String>> = IndexMap::new();
    let mut queue: VecDeque<&str> = positionals.into();
    for arg in cmd.args() {
        if arg.is_variadic() {
            let rest: Vec<String> = queue.drain(..).map(str::to_string).collect();
            if rest.is_empty() && arg.is_required() {
                return Err(DispatchError::MissingArgument(arg.name().to_string()));
            }
            arg_raw.insert(arg.name().to_string(), rest);
        } else if let Some(token) = queue.pop_front() {
            arg_raw.insert(arg.name().to_string(), vec![token.to_string()]);
        } else if arg.is_required() {
            return Err(DispatchError::MissingArgument(arg.name().to_string()));
        }
    }
    if let Some(extra) = queue.pop_front() {
        return Err(DispatchError::TooManyArguments(extra.to_string()));
    }

    // Default fill, then check chain + conversion for every raw value.
    // Options first, then positionals, both in declaration order.
    let mut values: IndexMap<String, Value> = IndexMap::new();

    for opt in cmd.opts() {
        let token = raw
            .shift_remove(opt.name())
            .or_else(|| opt.default().map(str::to_string))
            .or_else(|| {
                // Absent flags with no declared default are plain false.
                matches!(opt.kind(), ValueKind::Flag).then(|| "false".to_string())
            });
        match token {
            Some(token) => {
                let value = checked_value(opt.name(), opt.kind(), opt.checks(), &token)?;
                values.insert(opt.name().to_string(), value);
            }
            None if opt.is_required() => {
                return Err(DispatchError::MissingOption(opt.name().to_string()));
            }
            None => {}
        }
    }

    for arg in cmd.args() {
        let Some(bound) = arg_raw.shift_remove(arg.name()) else {
            continue;
        };
        if arg.is_variadic() {
            let mut list = Vec::with_capacity(bound.len());
            for token in &bound {
                list.push(checked_value(arg.name(), arg.kind(), arg.checks(), token)?);
            }
            values.insert(arg.name().to_string(), Value::List(list));
        } else if let Some(token) = bound.first() {
            let value = checked_value(arg.name(), arg.kind(), arg.checks(), token)?;
            values.insert(arg.name().to_string(), value);
        }
    }

    Ok(Some(values))
}

fn checked_value(
    name: &str,
    kind: &ValueKind,
    checks: &[Check],
    token: &str,
) -> Result<Value, DispatchError> {
    validate::run_checks(token, checks)
        .and_then(|_| validate::convert(kind, token))
        .map_err(|source| DispatchError::Invalid {
            name: name.to_string(),
            source,
        })
}
