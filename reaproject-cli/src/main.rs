//! Command-line interface for reaproject
//!
//! Usage:
//!   reaproject inspect `<file>` [--format `<format>`]                 - Render a project
//!   reaproject convert `<file>` --to `<format>` [--from `<format>`]   - Convert between formats
//!   reaproject transform `<source>` [`<others>`...] --script `<name>` - Run a transform script
//!   reaproject scripts [--show `<name>`] [--functions]                - Browse the script catalog
//!
//! Global options: `--config <path>` layers a TOML file over the built-in defaults, `-v` raises
//! the log level (`RUST_LOG` takes precedence).

mod commands;
mod output;

use clap::{Arg, ArgAction, ArgMatches, Command};
use commands::CliError;
use reaproject_config::{Loader, ReaprojectConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn build_cli() -> Command {
    Command::new("reaproject")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A tool for inspecting and transforming REAPER project files")
        .arg_required_else_help(true)
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_parser(clap::value_parser!(PathBuf))
                .help("TOML file layered over the built-in configuration"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::Count)
                .help("Log more (-v info, -vv debug, -vvv trace)"),
        )
        .subcommand(
            Command::new("inspect")
                .about("Parse a project and print it in the given format")
                .arg(
                    Arg::new("path")
                        .help("Path to the project file")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .index(1),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format (default from config: inspect.format)"),
                ),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert a document between formats")
                .arg(
                    Arg::new("path")
                        .help("Path to the input file")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .index(1),
                )
                .arg(
                    Arg::new("to")
                        .long("to")
                        .short('t')
                        .required(true)
                        .help("Output format"),
                )
                .arg(
                    Arg::new("from")
                        .long("from")
                        .help("Input format (default: guessed from the file extension)"),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_parser(clap::value_parser!(PathBuf))
                        .help("Write to this file instead of stdout"),
                ),
        )
        .subcommand(
            Command::new("transform")
                .about("Run a transform script over one or more projects")
                .arg(
                    Arg::new("source")
                        .help("The source project, bound to `source`")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .index(1),
                )
                .arg(
                    Arg::new("others")
                        .help("Further projects, bound to `others` in this order")
                        .num_args(0..)
                        .value_parser(clap::value_parser!(PathBuf))
                        .index(2),
                )
                .arg(
                    Arg::new("script")
                        .long("script")
                        .short('s')
                        .conflicts_with("script-file")
                        .help("Name of a built-in script (default: the first in the catalog)"),
                )
                .arg(
                    Arg::new("script-file")
                        .long("script-file")
                        .value_parser(clap::value_parser!(PathBuf))
                        .help("Read the script from a file"),
                )
                .arg(
                    Arg::new("out-dir")
                        .long("out-dir")
                        .short('o')
                        .default_value(".")
                        .value_parser(clap::value_parser!(PathBuf))
                        .help("Directory the resulting projects are written to"),
                ),
        )
        .subcommand(
            Command::new("scripts")
                .about("List the built-in transform scripts")
                .arg(
                    Arg::new("show")
                        .long("show")
                        .help("Print the body of the named script"),
                )
                .arg(
                    Arg::new("functions")
                        .long("functions")
                        .action(ArgAction::SetTrue)
                        .conflicts_with("show")
                        .help("List the helper functions available to scripts"),
                ),
        )
}

fn init_tracing(verbosity: u8) {
    let default = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(matches: &ArgMatches) -> Result<ReaprojectConfig, CliError> {
    let mut loader = Loader::new();
    if let Some(path) = matches.get_one::<PathBuf>("config") {
        loader = loader.with_file(path);
    }
    Ok(loader.with_environment().build()?)
}

async fn run(matches: ArgMatches) -> Result<(), CliError> {
    let config = load_config(&matches)?;
    tracing::debug!(?config, "configuration loaded");

    match matches.subcommand() {
        Some(("inspect", sub)) => commands::inspect(&config, sub).await,
        Some(("convert", sub)) => commands::convert(&config, sub).await,
        Some(("transform", sub)) => commands::transform(&config, sub).await,
        Some(("scripts", sub)) => commands::scripts(sub),
        _ => unreachable!("clap requires a subcommand"),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let matches = build_cli().get_matches();
    init_tracing(matches.get_count("verbose"));

    match run(matches).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Interrupted) => {
            eprintln!("error: {}", CliError::Interrupted);
            // Returning would drop the runtime, which waits for a script still running on the
            // blocking pool until its time limit.
            std::process::exit(i32::from(CliError::Interrupted.exit_code()))
        }
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::from(err.exit_code())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        build_cli().debug_assert();
    }

    #[test]
    fn test_script_options_conflict() {
        let result = build_cli().try_get_matches_from([
            "reaproject",
            "transform",
            "a.rpp",
            "--script",
            "copy-source",
            "--script-file",
            "x.rhai",
        ]);
        assert!(result.is_err());
    }
}
