// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # service-pager
//!
//! Auto-pagination for AWS list/describe operations spoken over the AWS
//! JSON protocol.
//!
//! ## Features
//!
//! - **Auto-iteration**: follows continuation tokens until the service runs dry
//! - **Item budgets**: stop after N items, either enforced by the fetch loop
//!   (page sizes clamped, late failures truncate) or applied downstream
//! - **Manual control**: fetch one page and hand back its token
//! - **Resume**: persist leftover tokens between runs
//! - **Declarative services**: operations described in YAML, CloudHSM V2 and
//!   Device Farm built in
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use service_pager::catalog::Catalog;
//! use service_pager::http::HttpClient;
//! use service_pager::operation::JsonOperation;
//! use service_pager::pagination::{FetchOptions, PaginatedFetcher};
//!
//! let catalog = Catalog::builtin()?;
//! let resolved = catalog.resolve("Get-HSM2Backup")?;
//! let operation = JsonOperation::from_resolved(
//!     Arc::new(HttpClient::new()?),
//!     resolved,
//!     resolved.service.endpoint_for("us-east-1"),
//!     Default::default(),
//! )?;
//!
//! let options = resolved.operation.fetch_options().with_item_budget(10);
//! let outcome = PaginatedFetcher::new(operation, options)?.collect().await?;
//! println!("{} backups, next token {:?}", outcome.items.len(), outcome.next_token);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                 CLI  (services / describe / invoke)          │
//! └──────────────────────────────┬───────────────────────────────┘
//!                                │
//! ┌──────────┬───────────┬───────┴───────┬───────────┬───────────┐
//! │ Catalog  │ Operation │  Pagination   │  Select   │   State   │
//! ├──────────┼───────────┼───────────────┼───────────┼───────────┤
//! │ YAML     │ JSON body │ Token loop    │ Items     │ Resume    │
//! │ Aliases  │ Items     │ Budgets       │ Response  │ tokens    │
//! │ Validate │ path      │ Manual mode   │ Field     │           │
//! └──────────┴─────┬─────┴───────────────┴───────────┴───────────┘
//!                  │
//!          HTTP (retry, backoff, rate limit)
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// HTTP client with retry and rate limiting
pub mod http;

/// Paginated fetch loop
pub mod pagination;

/// Catalog operations as page sources
pub mod operation;

/// Output selection
pub mod select;

/// Built-in service definitions
pub mod catalog;

/// YAML loader for service definitions
pub mod loader;

/// Runtime settings
pub mod config;

/// Resume token persistence
pub mod state;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use loader::{load_service, load_service_from_str, ServiceDefinition};
pub use pagination::{FetchOptions, PaginatedFetcher};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
