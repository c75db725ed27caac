//! kitreg - validation and indexing toolchain for the Starter Kit Registry
//!
//! Two batch subcommands over the registry tree: `validate` checks kit
//! metadata documents against the schema and registry invariants, `index`
//! regenerates the aggregate index.json. Logs go to stderr; reports and JSON
//! output go to stdout so automation can consume them.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use kitreg_core::validator::{ValidationIssue, ValidationReport, Validator};
use kitreg_core::{index, registry, schema::KitSchema};

/// Log levels
#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Parser, Debug)]
#[clap(
    name = "kitreg",
    about = "Validation and indexing toolchain for the Starter Kit Registry",
    version
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,

    /// Registry root directory
    #[clap(long, default_value = ".", global = true)]
    registry_dir: PathBuf,

    /// Override the kit schema path (default: <registry-dir>/schema/kit.schema.json)
    #[clap(long, global = true)]
    schema: Option<PathBuf>,

    /// Set log level
    #[clap(long, default_value = "warn", global = true)]
    log_level: LogLevel,
}

#[derive(Parser, Debug)]
enum Command {
    /// Validate kit metadata documents against the registry schema
    Validate {
        /// A single document or directory to validate (default: the whole kits tree)
        path: Option<PathBuf>,

        /// Output the report as JSON
        #[clap(long)]
        json: bool,
    },

    /// Regenerate the registry index (index.json)
    Index,
}

/// Initialize tracing from the --log-level flag.
///
/// Logs MUST go to stderr: stdout carries the report.
fn initialize_tracing(log_level: &LogLevel) {
    let filter = EnvFilter::new(log_level.to_filter_directive());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    initialize_tracing(&cli.log_level);

    let schema_path = cli
        .schema
        .unwrap_or_else(|| cli.registry_dir.join(registry::SCHEMA_FILE));

    match cli.command {
        Command::Validate { path, json } => {
            validate_command(&cli.registry_dir, &schema_path, path, json)
        }
        Command::Index => index_command(&cli.registry_dir),
    }
}

fn validate_command(
    registry_dir: &std::path::Path,
    schema_path: &std::path::Path,
    path: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let schema = KitSchema::load(schema_path).context("could not load the kit schema")?;

    let target = path.unwrap_or_else(|| registry_dir.join(registry::KITS_DIR));
    debug!("Validating kit documents under {:?}", target);

    let mut validator = Validator::new(schema);
    let report = validator
        .validate_path(&target)
        .context("validation could not run")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if !report.is_ok() {
        std::process::exit(1);
    }
    Ok(())
}

/// Counts first, then the itemized issues, so the headline is always the
/// first line automation or a contributor sees.
fn print_report(report: &ValidationReport) {
    println!(
        "Checked {} documents ({} unique slugs): {} errors, {} warnings",
        report.documents_checked,
        report.unique_slugs,
        report.errors.len(),
        report.warnings.len()
    );

    if !report.errors.is_empty() || !report.warnings.is_empty() {
        println!();
    }

    for issue in &report.errors {
        print_issue("error", issue);
    }
    for issue in &report.warnings {
        print_issue("warning", issue);
    }

    if report.is_ok() {
        println!("All kit documents are valid.");
    }
}

fn print_issue(label: &str, issue: &ValidationIssue) {
    println!(
        "{label}[{}] {}: {}",
        issue.rule_id,
        issue.path.display(),
        issue.message
    );
}

fn index_command(registry_dir: &std::path::Path) -> Result<()> {
    let index = index::generate(registry_dir).context("could not generate the registry index")?;

    let out = registry_dir.join(registry::INDEX_FILE);
    index::write(&index, &out).context("could not write the registry index")?;

    println!("Indexed {} kits -> {}", index.total, out.display());
    Ok(())
}

#[cfg(test)]
mod cli_tests {
    use super::*;

    #[test]
    fn test_parse_validate_defaults() {
        let cli = Cli::try_parse_from(["kitreg", "validate"]).unwrap();
        assert_eq!(cli.registry_dir, PathBuf::from("."));
        assert!(cli.schema.is_none());
        match cli.command {
            Command::Validate { path, json } => {
                assert!(path.is_none());
                assert!(!json);
            }
            _ => panic!("expected validate command"),
        }
    }

    #[test]
    fn test_parse_validate_with_path_and_json() {
        let cli =
            Cli::try_parse_from(["kitreg", "validate", "kits/saas/acme.json", "--json"]).unwrap();
        match cli.command {
            Command::Validate { path, json } => {
                assert_eq!(path, Some(PathBuf::from("kits/saas/acme.json")));
                assert!(json);
            }
            _ => panic!("expected validate command"),
        }
    }

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::try_parse_from([
            "kitreg",
            "index",
            "--registry-dir",
            "/srv/registry",
            "--schema",
            "/srv/custom.schema.json",
        ])
        .unwrap();
        assert_eq!(cli.registry_dir, PathBuf::from("/srv/registry"));
        assert_eq!(cli.schema, Some(PathBuf::from("/srv/custom.schema.json")));
        assert!(matches!(cli.command, Command::Index));
    }

    #[test]
    fn test_index_takes_no_positional_args() {
        assert!(Cli::try_parse_from(["kitreg", "index", "extra"]).is_err());
    }

    #[test]
    fn test_unknown_subcommand_rejected() {
        assert!(Cli::try_parse_from(["kitreg", "publish"]).is_err());
    }
}
