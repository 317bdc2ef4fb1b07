//! Command-line interface for the PIPE DSL syntax tools
//!
//! Usage:
//!   pipe tokenize `<path>` [--format text|json|yaml] [--show-whitespace]  - List classified tokens
//!   pipe highlight `<path>` [--no-color]                                 - Print the source highlighted
//!   pipe check `<path>`                                                  - Report malformed literals
//!   pipe monarch                                                         - Print the Monarch tokenizer JSON
//!   pipe language-config                                                 - Print the editor language configuration JSON
//!
//! `<path>` may be `-` to read from stdin.
mod render;

use anyhow::Context;
use clap::{Arg, ArgAction, ArgMatches, Command};
use pipe_syntax::config::{Loader, PipeConfig};
use pipe_syntax::dsl::{
    grammar, register, LanguageConfiguration, LanguageRegistry, MonarchDefinition, Tokenizer,
    LANGUAGE_ID,
};
use std::io::{Read, Write};
use tracing::{debug, Level};
use tracing_subscriber::EnvFilter;

fn path_arg() -> Arg {
    Arg::new("path")
        .help("Path to the .dsl file, or '-' for stdin")
        .required(true)
        .index(1)
}

fn cli() -> Command {
    Command::new("pipe")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Syntax tools for the PIPE image-processing DSL")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .help("Configuration file layered over the built-in defaults"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::Count)
                .help("Increase log verbosity (-v debug, -vv trace)"),
        )
        .subcommand(
            Command::new("tokenize")
                .about("List the classified tokens of a file")
                .arg(path_arg())
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .value_parser(["text", "json", "yaml"])
                        .help("Output format (default from configuration: text)"),
                )
                .arg(
                    Arg::new("show-whitespace")
                        .long("show-whitespace")
                        .action(ArgAction::SetTrue)
                        .help("Include whitespace tokens"),
                ),
        )
        .subcommand(
            Command::new("highlight")
                .about("Print a file with syntax highlighting")
                .arg(path_arg())
                .arg(
                    Arg::new("no-color")
                        .long("no-color")
                        .action(ArgAction::SetTrue)
                        .help("Disable ANSI colors"),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Report unterminated strings, bad escapes and unknown characters")
                .arg(path_arg()),
        )
        .subcommand(Command::new("monarch").about("Print the Monarch tokenizer definition"))
        .subcommand(
            Command::new("language-config").about("Print the editor language configuration"),
        )
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}

/// Builds the configuration: defaults, then `--config`, then per-command flags.
fn load_config(matches: &ArgMatches) -> anyhow::Result<PipeConfig> {
    let mut loader = Loader::new();
    if let Some(path) = matches.get_one::<String>("config") {
        loader = loader.with_file(path);
    }
    match matches.subcommand() {
        Some(("tokenize", sub)) => {
            if let Some(format) = sub.get_one::<String>("format") {
                loader = loader.set_override("output.format", format.as_str())?;
            }
            if sub.get_flag("show-whitespace") {
                loader = loader.set_override("output.show_whitespace", true)?;
            }
        }
        Some(("highlight", sub)) if sub.get_flag("no-color") => {
            loader = loader.set_override("highlight.color", false)?;
        }
        _ => {}
    }
    loader.build().context("failed to load configuration")
}

fn read_source(path: &str) -> anyhow::Result<String> {
    if path == "-" {
        let mut source = String::new();
        std::io::stdin()
            .read_to_string(&mut source)
            .context("failed to read stdin")?;
        return Ok(source);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path))
}

fn main() {
    let matches = cli().get_matches();
    init_logging(matches.get_count("verbose"));

    let outcome = run(&matches);
    let _ = std::io::stdout().flush();
    match outcome {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(2);
        }
    }
}

fn run(matches: &ArgMatches) -> anyhow::Result<i32> {
    let config = load_config(matches)?;
    debug!(?config, "configuration loaded");

    // Installing through the registry is the same path the editor bridge takes.
    let mut registry = LanguageRegistry::new();
    register(&mut registry, &grammar()).context("failed to register language")?;
    let grammar = registry
        .tokens_provider(LANGUAGE_ID)
        .cloned()
        .context("language has no tokenizer")?;
    let tokenizer = Tokenizer::new(&grammar).with_max_stack_depth(config.tokenizer.max_stack_depth);

    match matches.subcommand() {
        Some(("tokenize", sub)) => {
            let path = sub.get_one::<String>("path").expect("path is required");
            let source = read_source(path)?;
            let lines = tokenizer.tokenize(&source);
            let records = render::records(&source, &lines, config.output.show_whitespace);
            print!("{}", render::format_records(&records, config.output.format)?);
            Ok(0)
        }
        Some(("highlight", sub)) => {
            let path = sub.get_one::<String>("path").expect("path is required");
            let source = read_source(path)?;
            let lines = tokenizer.tokenize(&source);
            print!("{}", render::highlight(&source, &lines, config.highlight.color));
            Ok(0)
        }
        Some(("check", sub)) => {
            let path = sub.get_one::<String>("path").expect("path is required");
            let source = read_source(path)?;
            let lines = tokenizer.tokenize(&source);
            let problems: Vec<_> = render::records(&source, &lines, false)
                .into_iter()
                .filter(|record| record.kind.is_invalid())
                .collect();
            for problem in &problems {
                println!(
                    "{}:{}:{}: {}: {:?}",
                    path,
                    problem.line,
                    problem.start + 1,
                    problem.kind,
                    problem.text
                );
            }
            debug!(count = problems.len(), "check finished");
            Ok(if problems.is_empty() { 0 } else { 1 })
        }
        Some(("monarch", _)) => {
            println!("{}", MonarchDefinition::from_grammar(&grammar).to_json_pretty()?);
            Ok(0)
        }
        Some(("language-config", _)) => {
            let configuration = registry
                .configuration(LANGUAGE_ID)
                .cloned()
                .unwrap_or_else(LanguageConfiguration::imagedsl);
            println!("{}", configuration.to_json_pretty()?);
            Ok(0)
        }
        _ => unreachable!(),
    }
}
