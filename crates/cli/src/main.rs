use std::fs;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use lunchtime_cmdtree::{
    ArgDef, Command, Completion, ConfigError, FailureKind, Group, Invocation, OptDef, ValueKind,
    dispatch,
};
use tracing_subscriber::{EnvFilter, fmt};

const PROG: &str = "lunchtime";

fn main() -> ExitCode {
    init_tracing();
    let argv: Vec<String> = std::env::args().skip(1).collect();

    let root = match build_tree() {
        Ok(root) => root,
        Err(err) => {
            // Programmer error in the command declarations; never user input.
            eprintln!("{PROG}: {err}");
            return ExitCode::FAILURE;
        }
    };

    match dispatch(&root, PROG, &argv) {
        Ok(Completion::Ran) => ExitCode::SUCCESS,
        Ok(Completion::Help(text)) | Ok(Completion::Version(text)) => {
            print!("{text}");
            ExitCode::SUCCESS
        }
        Err(failure) => {
            eprintln!("{failure}");
            match failure.kind {
                FailureKind::Dispatch(_) => {
                    // Usage for the deepest node that resolved.
                    print!("{}", failure.usage);
                    ExitCode::from(2)
                }
                FailureKind::Handler(_) => ExitCode::FAILURE,
            }
        }
    }
}

fn build_tree() -> Result<Group, ConfigError> {
    let mut root = Group::root()
        .help("Read data files and calculate useful statistics")
        .version(env!("CARGO_PKG_VERSION"));

    root.register(
        Command::new("stats", Box::new(|inv| stats(inv).map_err(Into::into)))
            .help("Read data and calculate useful statistics")
            .opt(
                OptDef::new("input", ValueKind::Path)
                    .default_value("input.txt")
                    .must_exist()
                    .help("The data file to read from"),
            )
            .opt(
                OptDef::flag("verbose")
                    .negatable()
                    .help("Whether to output intermediate results"),
            )
            .build()?,
    )?;

    root.register(
        Command::new("preprocess", Box::new(|inv| preprocess(inv).map_err(Into::into)))
            .help("Apply preprocessing to the raw data")
            .build()?,
    )?;

    root.register(
        Command::new("inspect", Box::new(|inv| inspect(inv).map_err(Into::into)))
            .help("Calculate statistics from a single input file")
            .arg(
                ArgDef::new("inputfile", ValueKind::Path)
                    .required()
                    .must_exist()
                    .help("The data file to inspect"),
            )
            .build()?,
    )?;

    Ok(root)
}

fn stats(inv: &Invocation<'_>) -> Result<()> {
    tracing::debug!("executing stats command");

    let verbose = inv.get_bool("verbose").unwrap_or(false);
    if verbose {
        println!("Started the CLI script");
    }

    let input = inv.get_path("input").unwrap_or_else(|| Path::new("input.txt"));
    println!("Calculating statistics from {}", input.display());
    report(input)
}

fn preprocess(_inv: &Invocation<'_>) -> Result<()> {
    tracing::debug!("executing preprocess command");
    println!("Apply preprocessing");
    Ok(())
}

fn inspect(inv: &Invocation<'_>) -> Result<()> {
    tracing::debug!("executing inspect command");

    let Some(input) = inv.get_path("inputfile") else {
        bail!("inputfile was not bound");
    };
    println!("Calculating statistics from {}", input.display());
    report(input)
}

fn report(input: &Path) -> Result<()> {
    let data = fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let lines = data.lines().count();
    let words = data.split_whitespace().count();
    println!("{lines} lines, {words} words, {} bytes", data.len());
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
