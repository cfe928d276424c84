//! Help and usage rendering.
//!
//! Pure functions of the tree structure reachable from a node view; the tree
//! is never mutated and nothing is written. Callers decide where the text
//! goes.

use crate::descriptor::{ArgDef, OptDef, ValueKind};
use crate::tree::{Command, Group, NodeView};

/// Render help for a node. `path` is the program name followed by the names
/// of every node on the way down, ending with this node.
pub fn render(view: NodeView<'_>, path: &[String]) -> String {
    match view {
        NodeView::Command(cmd) => render_command(cmd, path),
        NodeView::Group(group) => render_group(group, path),
    }
}

fn render_command(cmd: &Command, path: &[String]) -> String {
    let mut out = String::new();

    if cmd.help_text().trim().is_empty() {
        out.push_str(cmd.name());
        out.push('\n');
    } else {
        out.push_str(&format!("{} - {}\n", cmd.name(), cmd.help_text().trim()));
    }

    let mut usage = format!("\nUsage: {} [OPTIONS]", path.join(" "));
    for arg in cmd.args() {
        usage.push(' ');
        usage.push_str(&arg_placeholder(arg));
    }
    out.push_str(&usage);
    out.push('\n');

    if !cmd.args().is_empty() {
        let rows: Vec<(String, String)> = cmd
            .args()
            .iter()
            .map(|arg| (arg_placeholder(arg), arg_help(arg)))
            .collect();
        out.push_str("\nArguments:\n");
        push_rows(&mut out, rows);
    }

    let mut rows: Vec<(String, String)> = cmd
        .opts()
        .iter()
        .map(|opt| (opt_left(opt), opt_help(opt)))
        .collect();
    rows.push(("-h, --help".to_string(), "Show help information".to_string()));
    out.push_str("\nOptions:\n");
    push_rows(&mut out, rows);

    out
}

fn render_group(group: &Group, path: &[String]) -> String {
    let mut out = String::new();

    let display = path.last().map(String::as_str).unwrap_or("");
    if group.help_text().trim().is_empty() {
        out.push_str(display);
        out.push('\n');
    } else {
        out.push_str(&format!("{} - {}\n", display, group.help_text().trim()));
    }

    out.push_str(&format!("\nUsage: {} <COMMAND>\n", path.join(" ")));

    let rows: Vec<(String, String)> = group
        .children()
        .map(|(name, node)| (name.to_string(), node.help_line().to_string()))
        .collect();
    if !rows.is_empty() {
        out.push_str("\nCommands:\n");
        push_rows(&mut out, rows);
    }

    let mut rows = vec![("-h, --help".to_string(), "Show help information".to_string())];
    // The version builtin only exists at the nameless root.
    if group.name().is_empty() {
        rows.push((
            "-V, --version".to_string(),
            "Show version information".to_string(),
        ));
    }
    out.push_str("\nOptions:\n");
    push_rows(&mut out, rows);

    out
}

/// Render the root's version line.
pub(crate) fn render_version(group: &Group, prog: &str) -> String {
    if group.version_text().trim().is_empty() {
        format!("{prog}\n")
    } else {
        format!("{prog} {}\n", group.version_text().trim())
    }
}

fn push_rows(out: &mut String, rows: Vec<(String, String)>) {
    let width = rows.iter().map(|(left, _)| left.len()).max().unwrap_or(0);
    for (left, help) in rows {
        if help.is_empty() {
            out.push_str(&format!("  {left}\n"));
        } else {
            out.push_str(&format!("  {left:width$}  {help}\n"));
        }
    }
}

fn arg_placeholder(arg: &ArgDef) -> String {
    let name = arg.name().to_ascii_uppercase();
    let mut out = if arg.is_required() {
        format!("<{name}>")
    } else {
        format!("[{name}]")
    };
    if arg.is_variadic() {
        out.push_str("...");
    }
    out
}

fn arg_help(arg: &ArgDef) -> String {
    let mut out = arg.help_text().trim().to_string();
    let note = kind_note(arg.kind());
    if out.is_empty() {
        out = format!("[{note}]");
    } else {
        out.push_str(&format!(" [{note}]"));
    }
    out
}

fn opt_left(opt: &OptDef) -> String {
    let mut out = format!("--{}", opt.name());
    if opt.is_negatable() {
        out.push_str(&format!("/--no-{}", opt.name()));
    }
    if opt.kind().takes_value() {
        out.push_str(&format!(" <{}>", metavar(opt.kind())));
    }
    out
}

fn opt_help(opt: &OptDef) -> String {
    let mut out = opt.help_text().trim().to_string();
    if let ValueKind::Choice(allowed) = opt.kind() {
        let values = format!("[possible values: {}]", allowed.join(", "));
        if out.is_empty() {
            out = values;
        } else {
            out.push_str(&format!(" {values}"));
        }
    }
    if opt.is_required() {
        if out.is_empty() {
            out.push_str("required");
        } else {
            out.push_str(" (required)");
        }
    }
    if let Some(default) = opt.default() {
        if out.is_empty() {
            out.push_str(&format!("[default: {default}]"));
        } else {
            out.push_str(&format!(" [default: {default}]"));
        }
    }
    out
}

fn metavar(kind: &ValueKind) -> String {
    kind.display_name().to_ascii_uppercase()
}

fn kind_note(kind: &ValueKind) -> String {
    match kind {
        ValueKind::Choice(allowed) => format!("choice: {}", allowed.join("|")),
        other => other.display_name().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{ArgDef, OptDef, ValueKind};
    use crate::dispatch::Invocation;
    use crate::tree::{Command, Group, HandlerResult};

    fn noop(_: &Invocation<'_>) -> HandlerResult {
        Ok(())
    }

    fn stats_command() -> Command {
        Command::new("stats", Box::new(noop))
            .help("Read data and calculate useful statistics")
            .opt(
                OptDef::new("input", ValueKind::Path)
                    .default_value("input.txt")
                    .help("The data file to read from"),
            )
            .opt(
                OptDef::flag("verbose")
                    .negatable()
                    .help("Whether to output intermediate results"),
            )
            .arg(
                ArgDef::new("extra", ValueKind::Str).help("Additional data files"),
            )
            .build()
            .expect("stats command should build")
    }

    fn path(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn command_help_lists_options_and_arguments() {
        let cmd = stats_command();
        let text = render(cmd.describe(), &path(&["lunchtime", "stats"]));

        assert!(text.contains("stats - Read data and calculate useful statistics"));
        assert!(text.contains("Usage: lunchtime stats [OPTIONS] [EXTRA]"));
        assert!(text.contains("Arguments:"));
        assert!(text.contains("[EXTRA]"));
        assert!(text.contains("Options:"));
        assert!(text.contains("--input <PATH>"));
        assert!(text.contains("[default: input.txt]"));
        assert!(text.contains("--verbose/--no-verbose"));
        assert!(text.contains("-h, --help"));
    }

    #[test]
    fn group_help_lists_children_in_insertion_order() {
        let mut root = Group::root().help("Read data files and calculate useful statistics");
        root.register(stats_command()).unwrap();
        root.register(
            Command::new("preprocess", Box::new(noop))
                .help("Apply preprocessing to the raw data")
                .build()
                .unwrap(),
        )
        .unwrap();

        let text = render(root.describe(), &path(&["lunchtime"]));
        assert!(text.contains("Usage: lunchtime <COMMAND>"));
        assert!(text.contains("Commands:"));
        assert!(text.contains("-V, --version"));

        let stats_at = text.find("stats").expect("stats listed");
        let preprocess_at = text.find("preprocess").expect("preprocess listed");
        assert!(stats_at < preprocess_at, "insertion order not preserved:\n{text}");
    }

    #[test]
    fn rendering_is_idempotent() {
        let cmd = stats_command();
        let p = path(&["lunchtime", "stats"]);
        assert_eq!(render(cmd.describe(), &p), render(cmd.describe(), &p));
    }

    #[test]
    fn required_option_is_annotated() {
        let cmd = Command::new("upload", Box::new(noop))
            .opt(
                OptDef::new("target", ValueKind::Str)
                    .required()
                    .help("Upload destination"),
            )
            .build()
            .unwrap();

        let text = render(cmd.describe(), &path(&["lunchtime", "upload"]));
        assert!(text.contains("--target <STRING>"));
        assert!(text.contains("Upload destination (required)"));
    }

    #[test]
    fn choice_options_list_possible_values() {
        let cmd = Command::new("export", Box::new(noop))
            .opt(OptDef::new(
                "format",
                ValueKind::Choice(vec!["plain".to_string(), "json".to_string()]),
            ))
            .build()
            .unwrap();

        let text = render(cmd.describe(), &path(&["lunchtime", "export"]));
        assert!(text.contains("--format <CHOICE>"));
        assert!(text.contains("[possible values: plain, json]"));
    }
}
