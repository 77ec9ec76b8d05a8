//! Pagination types and traits
//!
//! Defines the seams the fetch loop works through (`PageSource`,
//! `PageRequest`, `PageResponse`) and the options and state it carries.

use crate::error::{Error, Result, ServiceResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A request that can be pointed at a specific page
pub trait PageRequest: Send {
    /// Set (or clear) the continuation token field
    fn set_continuation_token(&mut self, token: Option<String>);

    /// Whether the operation accepts a page-size field
    fn supports_page_size(&self) -> bool {
        false
    }

    /// Set the page-size field. Only called when `supports_page_size` is true.
    fn set_page_size(&mut self, _size: i32) {}
}

/// One page as returned by the service
pub trait PageResponse: Send {
    /// Item type carried by the page
    type Item: Send;

    /// Number of items in this page
    fn item_count(&self) -> usize;

    /// Token for the next page, if the service returned one
    fn next_token(&self) -> Option<&str>;

    /// Consume the page into its items, in server order
    fn into_items(self) -> Vec<Self::Item>;
}

/// Builds requests and performs one remote call per page
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Request type
    type Request: PageRequest;
    /// Response type
    type Response: PageResponse;

    /// Construct the base request from bound parameters
    fn build_request(&self) -> Self::Request;

    /// Perform one network call
    async fn invoke(&self, request: Self::Request) -> ServiceResult<Self::Response>;
}

/// Who enforces the item budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetMode {
    /// The fetch loop caps the total, clamps page sizes and truncates on
    /// late page failures
    Enforced,
    /// Page-size hints pass through untouched; the cap is applied to the
    /// emitted item sequence
    #[default]
    Downstream,
}

impl std::str::FromStr for BudgetMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "enforced" | "legacy" => Ok(Self::Enforced),
            "downstream" | "modern" => Ok(Self::Downstream),
            other => Err(Error::invalid_value(
                "budget_mode",
                format!("expected 'enforced' or 'downstream', got '{other}'"),
            )),
        }
    }
}

/// Caller-supplied options for one logical fetch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Token to resume a previous manually-controlled fetch
    pub initial_token: Option<String>,
    /// Cap on the total number of items
    pub item_budget: Option<i64>,
    /// Fetch exactly one page and hand its token back
    pub manual_control: bool,
    /// Page size forwarded to the service
    pub page_size_hint: Option<i32>,
    /// Largest page size the service accepts
    pub max_page_size: Option<i32>,
    /// Budget enforcement policy
    pub budget_mode: BudgetMode,
}

impl FetchOptions {
    /// Create default options (auto-iterate, no budget)
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from a continuation token
    #[must_use]
    pub fn with_initial_token(mut self, token: impl Into<String>) -> Self {
        self.initial_token = Some(token.into());
        self
    }

    /// Cap the total number of items
    #[must_use]
    pub fn with_item_budget(mut self, budget: i64) -> Self {
        self.item_budget = Some(budget);
        self
    }

    /// Fetch a single page only
    #[must_use]
    pub fn with_manual_control(mut self, manual: bool) -> Self {
        self.manual_control = manual;
        self
    }

    /// Set the page size hint
    #[must_use]
    pub fn with_page_size(mut self, size: i32) -> Self {
        self.page_size_hint = Some(size);
        self
    }

    /// Set the service page-size ceiling
    #[must_use]
    pub fn with_max_page_size(mut self, max: i32) -> Self {
        self.max_page_size = Some(max);
        self
    }

    /// Set the budget mode
    #[must_use]
    pub fn with_budget_mode(mut self, mode: BudgetMode) -> Self {
        self.budget_mode = mode;
        self
    }

    /// Reject option combinations that cannot be honored
    pub fn validate(&self) -> Result<()> {
        if let Some(size) = self.page_size_hint {
            if size < 1 {
                return Err(Error::misuse(format!(
                    "page size must be at least 1, got {size}"
                )));
            }
        }
        if let Some(max) = self.max_page_size {
            if max < 1 {
                return Err(Error::misuse(format!(
                    "maximum page size must be at least 1, got {max}"
                )));
            }
        }
        Ok(())
    }

    /// Whether the fetch loop itself tracks the budget
    pub fn budget_enforced(&self) -> bool {
        !self.manual_control
            && self.budget_mode == BudgetMode::Enforced
            && self.item_budget.is_some()
    }
}

/// Mutable state of one logical fetch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchState {
    /// Token for the next page to request
    pub continuation_token: Option<String>,
    /// Items still allowed (only while the loop enforces a budget)
    pub remaining_budget: Option<i64>,
    /// Single-page mode
    pub manual_control: bool,
}

impl FetchState {
    /// Build the initial state from caller options
    pub fn from_options(options: &FetchOptions) -> Self {
        Self {
            continuation_token: normalize_token(options.initial_token.as_deref()),
            remaining_budget: if options.budget_enforced() {
                options.item_budget
            } else {
                None
            },
            manual_control: options.manual_control,
        }
    }

    /// Whether another page is outstanding
    pub fn has_more(&self) -> bool {
        self.continuation_token.is_some()
    }
}

/// Where the fetch currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchPhase {
    /// Nothing requested yet
    #[default]
    Idle,
    /// A page request is in flight
    Fetching,
    /// A page was handed out and more may follow
    EmittingPage,
    /// Finished normally
    Done,
    /// Finished with an error
    Failed,
}

impl FetchPhase {
    /// No more pages will be requested
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

/// Why a fetch stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The service returned no continuation token
    Exhausted,
    /// The item budget was used up
    BudgetReached,
    /// Manual control: one page was fetched
    SinglePage,
    /// A later page failed under an enforced budget; earlier items kept
    PartialFailure,
    /// The caller cancelled between pages
    Cancelled,
}

impl StopReason {
    /// Whether the caller can resume from the final token
    pub fn is_resumable(self) -> bool {
        !matches!(self, Self::Exhausted)
    }
}

/// Everything a completed fetch produced
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome<T> {
    /// Emitted items (or selected values), in server order
    pub items: Vec<T>,
    /// Final continuation token
    pub next_token: Option<String>,
    /// Number of successful page requests
    pub pages_fetched: usize,
    /// Why the loop ended
    pub stop_reason: StopReason,
}

/// Treat empty tokens the same as absent ones
pub fn normalize_token(token: Option<&str>) -> Option<String> {
    token.filter(|t| !t.is_empty()).map(ToString::to_string)
}
