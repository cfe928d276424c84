//! Command and group nodes.
//!
//! The tree is built once at startup from explicit declarations and is
//! immutable afterwards. `Group` owns its children by value, so the tree is
//! structurally acyclic and finite-depth; no runtime cycle check is needed.

use std::fmt;

use indexmap::IndexMap;

use crate::descriptor::{ArgDef, OptDef};
use crate::dispatch::Invocation;
use crate::error::{ConfigError, HandlerError};

/// Result returned by a command handler.
pub type HandlerResult = Result<(), HandlerError>;

/// Opaque callable owned by the application, invoked exactly once per
/// successful dispatch with the fully validated parameter set.
pub type Handler = Box<dyn Fn(&Invocation<'_>) -> HandlerResult>;

/// A leaf node: ordered option and positional descriptors plus a handler.
pub struct Command {
    name: String,
    help: String,
    opts: Vec<OptDef>,
    args: Vec<ArgDef>,
    handler: Handler,
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("opts", &self.opts)
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}

impl Command {
    pub fn new(name: impl Into<String>, handler: Handler) -> CommandBuilder {
        CommandBuilder {
            name: name.into(),
            help: String::new(),
            opts: Vec::new(),
            args: Vec::new(),
            handler,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn help_text(&self) -> &str {
        &self.help
    }

    pub fn opts(&self) -> &[OptDef] {
        &self.opts
    }

    pub fn args(&self) -> &[ArgDef] {
        &self.args
    }

    pub(crate) fn find_opt(&self, name: &str) -> Option<&OptDef> {
        self.opts.iter().find(|opt| opt.name() == name)
    }

    pub(crate) fn call(&self, invocation: &Invocation<'_>) -> HandlerResult {
        (self.handler)(invocation)
    }

    /// Read-only view consumed by the help renderer.
    pub fn describe(&self) -> NodeView<'_> {
        NodeView::Command(self)
    }
}

/// Builds a [`Command`], deferring structural validation to [`build`].
///
/// [`build`]: CommandBuilder::build
pub struct CommandBuilder {
    name: String,
    help: String,
    opts: Vec<OptDef>,
    args: Vec<ArgDef>,
    handler: Handler,
}

impl CommandBuilder {
    pub fn help(mut self, text: impl Into<String>) -> Self {
        self.help = text.into();
        self
    }

    pub fn opt(mut self, def: OptDef) -> Self {
        self.opts.push(def);
        self
    }

    pub fn arg(mut self, def: ArgDef) -> Self {
        self.args.push(def);
        self
    }

    pub fn build(self) -> Result<Command, ConfigError> {
        if self.name.is_empty() {
            return Err(ConfigError::EmptyName);
        }

        let mut seen: Vec<&str> = Vec::new();
        for opt in &self.opts {
            opt.validate()?;
            if seen.contains(&opt.name()) {
                return Err(ConfigError::DuplicateName(opt.name().to_string()));
            }
            seen.push(opt.name());
        }

        let mut optional_seen = false;
        for (idx, arg) in self.args.iter().enumerate() {
            arg.validate()?;
            if seen.contains(&arg.name()) {
                return Err(ConfigError::DuplicateName(arg.name().to_string()));
            }
            seen.push(arg.name());

            if arg.is_variadic() && idx + 1 != self.args.len() {
                return Err(ConfigError::VariadicNotLast(arg.name().to_string()));
            }
            if arg.is_required() && optional_seen {
                return Err(ConfigError::RequiredAfterOptional(arg.name().to_string()));
            }
            if !arg.is_required() {
                optional_seen = true;
            }
        }

        Ok(Command {
            name: self.name,
            help: self.help,
            opts: self.opts,
            args: self.args,
            handler: self.handler,
        })
    }
}

/// An internal node routing to named children; insertion order is preserved
/// for help display.
#[derive(Debug, Default)]
pub struct Group {
    name: String,
    help: String,
    version: String,
    children: IndexMap<String, Node>,
}

impl Group {
    /// The nameless root of a tree. The program name shown in usage lines is
    /// supplied by the dispatcher caller, not stored on the root.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn help(mut self, text: impl Into<String>) -> Self {
        self.help = text.into();
        self
    }

    /// Version string reported by the root's `--version` builtin.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Add a child command or group under its own name.
    pub fn register(&mut self, child: impl Into<Node>) -> Result<(), ConfigError> {
        let child = child.into();
        let name = child.name().to_string();
        if name.is_empty() {
            return Err(ConfigError::EmptyName);
        }
        if self.children.contains_key(&name) {
            return Err(ConfigError::DuplicateName(name));
        }
        self.children.insert(name, child);
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn help_text(&self) -> &str {
        &self.help
    }

    pub(crate) fn version_text(&self) -> &str {
        &self.version
    }

    pub fn get(&self, name: &str) -> Option<&Node> {
        self.children.get(name)
    }

    pub fn children(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.children.iter().map(|(name, node)| (name.as_str(), node))
    }

    pub(crate) fn child_names(&self) -> Vec<String> {
        self.children.keys().cloned().collect()
    }

    /// Read-only view consumed by the help renderer.
    pub fn describe(&self) -> NodeView<'_> {
        NodeView::Group(self)
    }
}

/// A child of a [`Group`].
#[derive(Debug)]
pub enum Node {
    Command(Command),
    Group(Group),
}

impl Node {
    pub fn name(&self) -> &str {
        match self {
            Node::Command(cmd) => cmd.name(),
            Node::Group(group) => group.name(),
        }
    }

    /// First line of the node's help text, for group listings.
    pub fn help_line(&self) -> &str {
        let text = match self {
            Node::Command(cmd) => cmd.help_text(),
            Node::Group(group) => group.help_text(),
        };
        text.lines().next().unwrap_or("")
    }

    pub fn describe(&self) -> NodeView<'_> {
        match self {
            Node::Command(cmd) => cmd.describe(),
            Node::Group(group) => group.describe(),
        }
    }
}

impl From<Command> for Node {
    fn from(cmd: Command) -> Self {
        Node::Command(cmd)
    }
}

impl From<Group> for Node {
    fn from(group: Group) -> Self {
        Node::Group(group)
    }
}

/// Borrowed view over a node, the only thing the help renderer sees.
#[derive(Debug, Clone, Copy)]
pub enum NodeView<'a> {
    Command(&'a Command),
    Group(&'a Group),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ValueKind;

    fn noop(_: &Invocation<'_>) -> HandlerResult {
        Ok(())
    }

    fn command(name: &str) -> CommandBuilder {
        Command::new(name, Box::new(noop))
    }

    #[test]
    fn register_rejects_duplicate_names() {
        let mut root = Group::root();
        root.register(command("stats").build().unwrap()).unwrap();

        let err = root
            .register(command("stats").build().unwrap())
            .unwrap_err();
        match err {
            ConfigError::DuplicateName(name) => assert_eq!(name, "stats"),
            other => panic!("expected DuplicateName, got: {other:?}"),
        }
    }

    #[test]
    fn children_keep_insertion_order() {
        let mut root = Group::root();
        root.register(command("stats").build().unwrap()).unwrap();
        root.register(command("preprocess").build().unwrap()).unwrap();
        root.register(command("inspect").build().unwrap()).unwrap();

        let names: Vec<&str> = root.children().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["stats", "preprocess", "inspect"]);
    }

    #[test]
    fn build_rejects_duplicate_descriptor_names() {
        let err = command("stats")
            .opt(OptDef::flag("verbose"))
            .opt(OptDef::flag("verbose"))
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateName(_)));

        // Options and positionals share one namespace.
        let err = command("stats")
            .opt(OptDef::new("input", ValueKind::Path))
            .arg(ArgDef::new("input", ValueKind::Path))
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateName(_)));
    }

    #[test]
    fn build_rejects_required_positional_after_optional() {
        let err = command("stats")
            .arg(ArgDef::new("first", ValueKind::Str))
            .arg(ArgDef::new("second", ValueKind::Str).required())
            .build()
            .unwrap_err();
        match err {
            ConfigError::RequiredAfterOptional(name) => assert_eq!(name, "second"),
            other => panic!("expected RequiredAfterOptional, got: {other:?}"),
        }
    }

    #[test]
    fn build_rejects_non_trailing_variadic() {
        let err = command("stats")
            .arg(ArgDef::new("files", ValueKind::Path).variadic())
            .arg(ArgDef::new("last", ValueKind::Str))
            .build()
            .unwrap_err();
        match err {
            ConfigError::VariadicNotLast(name) => assert_eq!(name, "files"),
            other => panic!("expected VariadicNotLast, got: {other:?}"),
        }
    }

    #[test]
    fn groups_nest_to_arbitrary_depth() {
        let mut preprocess = Group::new("preprocess").help("Preprocessing commands");
        preprocess
            .register(command("normalize").build().unwrap())
            .unwrap();

        let mut root = Group::root();
        root.register(preprocess).unwrap();

        let Some(Node::Group(group)) = root.get("preprocess") else {
            panic!("expected a nested group");
        };
        assert!(matches!(group.get("normalize"), Some(Node::Command(_))));
    }
}
