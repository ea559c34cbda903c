//! twig-cs-fixer CLI tool.
//!
//! Usage:
//! ```bash
//! twig-cs-fixer lint [OPTIONS] [PATHS]...
//! twig-cs-fixer lint --fix templates/
//! twig-cs-fixer list-rules
//! twig-cs-fixer init
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use twig_cs_fixer_core::Severity;

mod cache;
mod commands;
mod config_resolver;

use config_resolver::ConfigSource;

/// Linter and fixer for Twig templates
#[derive(Parser)]
#[command(name = "twig-cs-fixer")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lint templates, optionally fixing them
    Lint {
        /// Files or directories to lint (default: the configured root)
        paths: Vec<PathBuf>,

        /// Fix violations in place before reporting what remains
        #[arg(long)]
        fix: bool,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Only report violations at or above this level
        #[arg(short, long, value_parser = parse_severity)]
        level: Option<Severity>,

        /// Ignore and do not update the cache
        #[arg(long)]
        no_cache: bool,

        /// Exclude patterns (can be specified multiple times)
        #[arg(short, long)]
        exclude: Vec<String>,
    },

    /// List available rules and standards
    ListRules,

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Output format for lint results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output, grouped by file.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One-line-per-violation compact format.
    Compact,
}

fn parse_severity(value: &str) -> Result<Severity, String> {
    Severity::from_name(value)
        .ok_or_else(|| format!("expected one of notice, warning, error, fatal; got `{value}`"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Lint {
            paths,
            fix,
            format,
            level,
            no_cache,
            exclude,
        } => {
            let cwd = std::env::current_dir()?;
            let source = ConfigSource::discover(&cwd, cli.config.as_deref());
            let args = commands::lint::LintArgs {
                paths,
                fix,
                format,
                level,
                no_cache,
                exclude,
            };
            if commands::lint::run(&args, &source)? {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::ListRules => Ok(commands::list_rules::run()?),
        Commands::Init { force } => commands::init::run(force),
    }
}
