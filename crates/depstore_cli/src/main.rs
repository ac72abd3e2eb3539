//! Depstore CLI: inspect and update an extension dependency record.
//!
//! Provides `depstore record` to write the record from a manifest of
//! extensions, `depstore list` and `depstore show` to read it back, and
//! `depstore paths` to print which virtual paths an extension's compiled
//! output depends on.

#![warn(missing_docs)]

mod list;
mod manifest;
mod paths;
mod project;
mod record;
mod show;

use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use depstore_config::LogLevel;
use tracing_subscriber::EnvFilter;

/// Depstore: a persisted, change-detecting extension dependency record.
#[derive(Parser, Debug)]
#[command(name = "depstore", version, about = "Extension dependency record tool")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a `depstore.toml` file or the directory containing one.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Content store root, overriding `storage.root` from the config.
    #[arg(long, global = true)]
    pub root: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Record the dependencies listed in a manifest.
    Record(RecordArgs),
    /// List every recorded dependency.
    List(ListArgs),
    /// Show the recorded dependency of one extension.
    Show(ShowArgs),
    /// Print the virtual paths an extension depends on.
    Paths(PathsArgs),
}

/// Arguments for the `depstore record` subcommand.
#[derive(Parser, Debug)]
pub struct RecordArgs {
    /// TOML manifest listing `[[extension]]` entries.
    pub manifest: String,
}

/// Arguments for the `depstore list` subcommand.
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Output format.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Arguments for the `depstore show` subcommand.
#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Extension identifier (case-insensitive).
    pub extension_id: String,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Arguments for the `depstore paths` subcommand.
#[derive(Parser, Debug)]
pub struct PathsArgs {
    /// Extension identifier (case-insensitive).
    pub extension_id: String,
}

/// Output format for descriptors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Optional path to a config file or its directory.
    pub config: Option<String>,
    /// Optional override of the content store root.
    pub root: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
        root: cli.root,
    };

    let project = match project::Project::open(&global) {
        Ok(project) => project,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };
    init_tracing(&global, project.config.logging.level);

    let result = match cli.command {
        Command::Record(ref args) => record::run(args, &project, &global),
        Command::List(ref args) => list::run(args, &project),
        Command::Show(ref args) => show::run(args, &project),
        Command::Paths(ref args) => paths::run(args, &project),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Installs the stderr log subscriber. `RUST_LOG` takes precedence over
/// the flags and the configured level.
fn init_tracing(global: &GlobalArgs, configured: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(global, configured)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Picks the log level when `RUST_LOG` is unset.
fn default_filter(global: &GlobalArgs, configured: LogLevel) -> &'static str {
    if global.verbose {
        "debug"
    } else if global.quiet {
        "error"
    } else {
        configured.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn global(quiet: bool, verbose: bool) -> GlobalArgs {
        GlobalArgs {
            quiet,
            verbose,
            config: None,
            root: None,
        }
    }

    #[test]
    fn parse_record() {
        let cli = Cli::parse_from(["depstore", "record", "extensions.toml"]);
        match cli.command {
            Command::Record(ref args) => assert_eq!(args.manifest, "extensions.toml"),
            _ => panic!("expected Record command"),
        }
    }

    #[test]
    fn parse_list_default() {
        let cli = Cli::parse_from(["depstore", "list"]);
        match cli.command {
            Command::List(ref args) => assert_eq!(args.format, OutputFormat::Text),
            _ => panic!("expected List command"),
        }
    }

    #[test]
    fn parse_list_json() {
        let cli = Cli::parse_from(["depstore", "list", "--format", "json"]);
        match cli.command {
            Command::List(ref args) => assert_eq!(args.format, OutputFormat::Json),
            _ => panic!("expected List command"),
        }
    }

    #[test]
    fn parse_show_with_format() {
        let cli = Cli::parse_from(["depstore", "show", "Blog", "-f", "json"]);
        match cli.command {
            Command::Show(ref args) => {
                assert_eq!(args.extension_id, "Blog");
                assert_eq!(args.format, OutputFormat::Json);
            }
            _ => panic!("expected Show command"),
        }
    }

    #[test]
    fn parse_paths() {
        let cli = Cli::parse_from(["depstore", "paths", "blog"]);
        match cli.command {
            Command::Paths(ref args) => assert_eq!(args.extension_id, "blog"),
            _ => panic!("expected Paths command"),
        }
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::parse_from([
            "depstore",
            "--quiet",
            "--config",
            "/srv/app/depstore.toml",
            "--root",
            "/srv/app/App_Data",
            "list",
        ]);
        assert!(cli.quiet);
        assert!(!cli.verbose);
        assert_eq!(cli.config.as_deref(), Some("/srv/app/depstore.toml"));
        assert_eq!(cli.root.as_deref(), Some("/srv/app/App_Data"));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["depstore", "show", "Blog", "--verbose"]);
        assert!(cli.verbose);
    }

    #[test]
    fn show_requires_extension_id() {
        assert!(Cli::try_parse_from(["depstore", "show"]).is_err());
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert!(Cli::try_parse_from(["depstore", "list", "--format", "yaml"]).is_err());
    }

    #[test]
    fn filter_prefers_flags_over_config() {
        assert_eq!(default_filter(&global(false, true), LogLevel::Warn), "debug");
        assert_eq!(default_filter(&global(true, false), LogLevel::Trace), "error");
        assert_eq!(default_filter(&global(false, false), LogLevel::Warn), "warn");
    }
}
