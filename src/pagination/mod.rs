//! Pagination module
//!
//! Auto-pagination for list/describe operations that return one page per
//! call plus a continuation token.
//!
//! # Overview
//!
//! A [`PageSource`] knows how to build a request and perform one call.
//! [`PaginatedFetcher`] drives it: it threads the continuation token from
//! page to page, honors an optional item budget and a single-page manual
//! mode, and decides whether a failed page is fatal or simply ends a
//! budgeted fetch early.
//!
//! Two budget policies are supported through [`BudgetMode`]:
//!
//! - `Enforced`: the loop tracks the remaining budget, clamps the page size
//!   to it and to the service maximum, and keeps earlier pages when a later
//!   one fails.
//! - `Downstream`: the page size hint passes through unchanged and the cap
//!   is applied to the emitted items, so failures always propagate.

mod fetcher;
mod types;

pub use fetcher::{ItemOf, PaginatedFetcher};
pub use types::{
    normalize_token, BudgetMode, FetchOptions, FetchOutcome, FetchPhase, FetchState, PageRequest,
    PageResponse, PageSource, StopReason,
};
