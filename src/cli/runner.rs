//! CLI runner - executes commands

use crate::catalog::Catalog;
use crate::cli::commands::{Cli, Commands, InvokeArgs, OutputFormat};
use crate::config::Settings;
use crate::error::{Error, Result, ResultExt};
use crate::http::HttpClient;
use crate::loader::{load_service, OperationDefinition};
use crate::operation::{parse_params, JsonOperation};
use crate::pagination::{FetchOptions, PageResponse, PaginatedFetcher};
use crate::select::Selection;
use crate::state::ResumeStore;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Services => self.services(),
            Commands::Describe { operation } => self.describe(operation),
            Commands::Validate => self.validate(),
            Commands::Invoke(args) => self.invoke(args).await,
        }
    }

    /// Settings from file, environment and flags
    fn settings(&self) -> Result<Settings> {
        let settings = Settings::load_or_default(self.cli.config.as_deref())?
            .with_overrides(self.cli.region.clone(), self.cli.endpoint_url.clone());
        settings.validate()?;
        Ok(settings)
    }

    /// The `--service` definition, or every built-in service
    fn catalog(&self) -> Result<Catalog> {
        match &self.cli.service {
            Some(service) => Catalog::load(service),
            None => Catalog::builtin(),
        }
    }

    /// List services and operations
    fn services(&self) -> Result<()> {
        let catalog = self.catalog()?;

        let services: Vec<Value> = catalog
            .services()
            .iter()
            .map(|service| {
                let operations: Vec<Value> = service
                    .operations
                    .iter()
                    .map(|op| {
                        json!({
                            "alias": op.alias,
                            "name": op.name,
                            "action": op.action,
                            "paginated": op.is_paginated(),
                            "max_page_size": op.pagination.as_ref().and_then(|p| p.max_page_size),
                        })
                    })
                    .collect();

                json!({
                    "name": service.name,
                    "title": service.title,
                    "operations": operations
                })
            })
            .collect();

        self.output_message(&json!({ "services": services }));
        Ok(())
    }

    /// Print an operation definition as YAML
    fn describe(&self, name: &str) -> Result<()> {
        let catalog = self.catalog()?;
        let resolved = catalog.resolve(name)?;

        let description = json!({
            "service": resolved.service.name,
            "target": resolved.service.target_for(resolved.operation),
            "json_version": resolved.service.json_version.to_string(),
            "operation": resolved.operation,
        });
        print!("{}", serde_yaml::to_string(&description)?);
        Ok(())
    }

    /// Validate service definition
    fn validate(&self) -> Result<()> {
        let path = self
            .cli
            .service
            .as_ref()
            .ok_or_else(|| Error::config("Service file not specified (use -s flag)"))?;
        let service =
            load_service(path).with_context(|| format!("Invalid service '{}'", path.display()))?;

        self.output_message(&json!({
            "valid": true,
            "service": service.name,
            "operations": service.operations.len()
        }));
        Ok(())
    }

    /// Run a fetch and print its output
    async fn invoke(&self, args: &InvokeArgs) -> Result<()> {
        let settings = self.settings()?;
        let catalog = self.catalog()?;
        let resolved = catalog.resolve(&args.operation)?;
        let key = resolved.key();

        let selection: Selection = args
            .select
            .as_deref()
            .map(str::parse)
            .transpose()?
            .unwrap_or_default();
        let params = parse_params(args.body.as_deref(), &args.params)?;

        let client = Arc::new(HttpClient::with_config(settings.http_config())?);
        let endpoint = settings.endpoint_for(resolved.service);
        let operation = JsonOperation::from_resolved(client, resolved, endpoint, params)?;
        selection.validate(&operation)?;

        let store = match &settings.state_file {
            Some(path) => ResumeStore::from_file(path)?,
            None => ResumeStore::in_memory(),
        };
        let initial_token = if args.resume {
            let token = store.get_token(&key).await;
            if token.is_none() {
                info!(operation = %key, "No saved token, starting from the first page");
            }
            token
        } else {
            args.next_token.clone()
        };

        let options = Self::fetch_options(resolved.operation, args, initial_token);
        let cancel = CancellationToken::new();
        let watcher = tokio::spawn({
            let cancel = cancel.clone();
            async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupted, stopping before the next page");
                    cancel.cancel();
                }
            }
        });

        let mut fetcher = PaginatedFetcher::new(operation, options)?.with_cancellation(cancel);
        let drained = self.drain(&mut fetcher, &selection).await;
        watcher.abort();
        drained?;

        if let Some(value) = selection.final_value(fetcher.source()) {
            self.output_message(&value);
        }

        let next_token = fetcher.next_token();
        if let Some(token) = next_token {
            eprintln!("NextToken: {token}");
        }
        store.record(&key, next_token).await?;

        Ok(())
    }

    /// Pull pages until the fetch ends or the item cap is met
    async fn drain(
        &self,
        fetcher: &mut PaginatedFetcher<JsonOperation>,
        selection: &Selection,
    ) -> Result<()> {
        let limit = fetcher.downstream_limit();
        let mut emitted = 0usize;

        while limit.map_or(true, |limit| emitted < limit) {
            let values = if *selection == Selection::Items {
                let Some(mut items) = fetcher.next_page().await? else {
                    break;
                };
                if let Some(limit) = limit {
                    items.truncate(limit - emitted);
                }
                emitted += items.len();
                items
            } else {
                let Some(response) = fetcher.next_response().await? else {
                    break;
                };
                emitted += response.item_count();
                selection.select_page(response)
            };

            for value in &values {
                self.output_message(value);
            }
        }
        Ok(())
    }

    /// Merge operation defaults with invoke flags
    fn fetch_options(
        operation: &OperationDefinition,
        args: &InvokeArgs,
        initial_token: Option<String>,
    ) -> FetchOptions {
        let mut options = operation.fetch_options();
        options.initial_token = initial_token;
        options.item_budget = args.max_items;
        options.page_size_hint = args.page_size;
        if args.no_auto_iterate {
            options.manual_control = true;
        }
        if let Some(mode) = args.budget_mode {
            options.budget_mode = mode;
        }
        options
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::BudgetMode;

    fn args(operation: &str) -> InvokeArgs {
        InvokeArgs {
            operation: operation.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_fetch_options_from_operation_defaults() {
        let catalog = Catalog::builtin().unwrap();
        let resolved = catalog.resolve("Get-HSM2Backup").unwrap();

        let mut invoke = args("Get-HSM2Backup");
        invoke.max_items = Some(7);
        invoke.page_size = Some(100);

        let options = Runner::fetch_options(resolved.operation, &invoke, Some("t1".into()));
        assert_eq!(options.max_page_size, Some(50));
        assert_eq!(options.budget_mode, BudgetMode::Enforced);
        assert_eq!(options.item_budget, Some(7));
        assert_eq!(options.page_size_hint, Some(100));
        assert_eq!(options.initial_token.as_deref(), Some("t1"));
        assert!(!options.manual_control);
    }

    #[test]
    fn test_fetch_options_flags_override() {
        let catalog = Catalog::builtin().unwrap();
        let resolved = catalog.resolve("Get-HSM2Backup").unwrap();

        let mut invoke = args("Get-HSM2Backup");
        invoke.no_auto_iterate = true;
        invoke.budget_mode = Some(BudgetMode::Downstream);

        let options = Runner::fetch_options(resolved.operation, &invoke, None);
        assert!(options.manual_control);
        assert_eq!(options.budget_mode, BudgetMode::Downstream);
    }

    #[test]
    fn test_fetch_options_single_call_operation() {
        let catalog = Catalog::builtin().unwrap();
        let resolved = catalog.resolve("Get-DFAccountSetting").unwrap();

        let options = Runner::fetch_options(resolved.operation, &args("x"), None);
        assert!(options.manual_control);
    }
}
