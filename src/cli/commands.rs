//! CLI commands and argument parsing

use crate::pagination::BudgetMode;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Auto-paginating client for AWS list/describe operations
#[derive(Parser, Debug)]
#[command(name = "service-pager")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Settings file (YAML)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Service definition: built-in name or YAML file (default: all built-ins)
    #[arg(short, long, global = true)]
    pub service: Option<PathBuf>,

    /// AWS region
    #[arg(short, long, global = true, env = "AWS_REGION")]
    pub region: Option<String>,

    /// Send requests here instead of the service endpoint
    #[arg(long, global = true, env = "SERVICE_PAGER_ENDPOINT_URL")]
    pub endpoint_url: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List services and their operations
    Services,

    /// Show an operation definition
    Describe {
        /// Operation alias (e.g., Get-HSM2Backup) or service:operation
        operation: String,
    },

    /// Validate the service definition
    Validate,

    /// Call an operation, following continuation tokens
    Invoke(InvokeArgs),
}

/// Arguments of `invoke`
#[derive(clap::Args, Debug, Clone, Default)]
pub struct InvokeArgs {
    /// Operation alias (e.g., Get-HSM2Backup) or service:operation
    pub operation: String,

    /// Request parameter as Key=Value (value parsed as JSON when valid)
    #[arg(short, long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<String>,

    /// Request body as a JSON object; --param entries override its keys
    #[arg(long)]
    pub body: Option<String>,

    /// Stop after this many items
    #[arg(long, allow_negative_numbers = true)]
    pub max_items: Option<i64>,

    /// Items per page requested from the service
    #[arg(long, allow_negative_numbers = true)]
    pub page_size: Option<i32>,

    /// Start from this continuation token
    #[arg(long)]
    pub next_token: Option<String>,

    /// Fetch one page only and print its continuation token
    #[arg(long)]
    pub no_auto_iterate: bool,

    /// Output selection: `*`, `^Param` or a dotted path (default: items)
    #[arg(long)]
    pub select: Option<String>,

    /// Who enforces --max-items (default: the operation's setting)
    #[arg(long, value_parser = parse_budget_mode)]
    pub budget_mode: Option<BudgetMode>,

    /// Continue from the token saved by the previous run of this operation
    #[arg(long, conflicts_with = "next_token")]
    pub resume: bool,
}

fn parse_budget_mode(s: &str) -> Result<BudgetMode, String> {
    s.parse().map_err(|e: crate::error::Error| e.to_string())
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one value per line)
    #[default]
    Json,
    /// Human-readable output
    Pretty,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_invoke() {
        let cli = Cli::try_parse_from([
            "service-pager",
            "--region",
            "eu-west-1",
            "invoke",
            "Get-HSM2Backup",
            "-p",
            "Filters={\"states\":[\"READY\"]}",
            "--max-items",
            "3",
            "--budget-mode",
            "legacy",
        ])
        .unwrap();

        assert_eq!(cli.region.as_deref(), Some("eu-west-1"));
        let Commands::Invoke(args) = cli.command else {
            panic!("expected invoke");
        };
        assert_eq!(args.operation, "Get-HSM2Backup");
        assert_eq!(args.params.len(), 1);
        assert_eq!(args.max_items, Some(3));
        assert_eq!(args.budget_mode, Some(BudgetMode::Enforced));
        assert!(!args.no_auto_iterate);
    }

    #[test]
    fn test_negative_max_items_accepted() {
        let cli = Cli::try_parse_from([
            "service-pager",
            "invoke",
            "Get-DFDeviceList",
            "--max-items",
            "-1",
        ])
        .unwrap();
        let Commands::Invoke(args) = cli.command else {
            panic!("expected invoke");
        };
        assert_eq!(args.max_items, Some(-1));
    }

    #[test]
    fn test_resume_conflicts_with_next_token() {
        let result = Cli::try_parse_from([
            "service-pager",
            "invoke",
            "Get-HSM2Backup",
            "--resume",
            "--next-token",
            "t1",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_bad_budget_mode() {
        let result = Cli::try_parse_from([
            "service-pager",
            "invoke",
            "Get-HSM2Backup",
            "--budget-mode",
            "sometimes",
        ]);
        assert!(result.is_err());
    }
}
