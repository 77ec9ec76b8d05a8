//! The paginated fetch loop
//!
//! `PaginatedFetcher` pulls one page per call, strictly in sequence, and
//! decides after every page whether another one is needed.

use super::types::{
    normalize_token, BudgetMode, FetchOptions, FetchOutcome, FetchPhase, FetchState, PageRequest,
    PageResponse, PageSource, StopReason,
};
use crate::error::{Error, Result, ServiceError};
use futures::stream::{self, Stream, StreamExt, TryStreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Item type produced by a page source
pub type ItemOf<S> = <<S as PageSource>::Response as PageResponse>::Item;

/// Drives repeated page requests against a [`PageSource`]
pub struct PaginatedFetcher<S: PageSource> {
    source: S,
    options: FetchOptions,
    state: FetchState,
    phase: FetchPhase,
    pages_fetched: usize,
    items_emitted: usize,
    /// Items the last page may emit before the budget is exceeded
    allowance: Option<usize>,
    stop_reason: Option<StopReason>,
    cancel: Option<CancellationToken>,
}

impl<S: PageSource> PaginatedFetcher<S> {
    /// Create a fetcher, rejecting invalid options
    pub fn new(source: S, options: FetchOptions) -> Result<Self> {
        options.validate()?;
        let state = FetchState::from_options(&options);
        Ok(Self {
            source,
            options,
            state,
            phase: FetchPhase::Idle,
            pages_fetched: 0,
            items_emitted: 0,
            allowance: None,
            stop_reason: None,
            cancel: None,
        })
    }

    /// Stop between pages once `token` is cancelled
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// The page source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// The options this fetch runs with
    pub fn options(&self) -> &FetchOptions {
        &self.options
    }

    /// Current fetch state
    pub fn state(&self) -> &FetchState {
        &self.state
    }

    /// Current phase
    pub fn phase(&self) -> FetchPhase {
        self.phase
    }

    /// Token for the next page, if any
    pub fn next_token(&self) -> Option<&str> {
        self.state.continuation_token.as_deref()
    }

    /// Successful page requests so far
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// Items handed out so far
    pub fn items_emitted(&self) -> usize {
        self.items_emitted
    }

    /// Why the fetch stopped, once it has
    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stop_reason
    }

    /// Fetch the next raw page.
    ///
    /// Returns `Ok(None)` once the fetch is over. A failure is returned as an
    /// error when nothing has been fetched yet or no budget is enforced;
    /// otherwise it ends the fetch quietly and the items already emitted
    /// stand as the result.
    pub async fn next_response(&mut self) -> Result<Option<S::Response>> {
        if self.phase.is_terminal() {
            return Ok(None);
        }
        if let Some(reason) = self.stop_before_fetch() {
            self.finish(reason);
            return Ok(None);
        }

        self.phase = FetchPhase::Fetching;
        let mut request = self.source.build_request();
        request.set_continuation_token(self.state.continuation_token.clone());
        if request.supports_page_size() {
            if let Some(size) = self.effective_page_size() {
                request.set_page_size(size);
            }
        }

        debug!(
            page = self.pages_fetched + 1,
            token = ?self.state.continuation_token,
            "Requesting page"
        );

        let response = match self.source.invoke(request).await {
            Ok(response) => response,
            Err(error) => return self.fail(error),
        };

        self.pages_fetched += 1;
        let received = response.item_count();
        self.state.continuation_token = normalize_token(response.next_token());

        self.allowance = self
            .state
            .remaining_budget
            .map(|remaining| usize::try_from(remaining).unwrap_or(0));
        if let Some(remaining) = self.state.remaining_budget.as_mut() {
            *remaining = remaining.saturating_sub(i64::try_from(received).unwrap_or(i64::MAX));
        }
        self.items_emitted += self.allowance.map_or(received, |a| a.min(received));

        debug!(
            page = self.pages_fetched,
            items = received,
            next_token = ?self.state.continuation_token,
            remaining = ?self.state.remaining_budget,
            "Received page"
        );

        match self.stop_after_page() {
            Some(reason) => self.finish(reason),
            None => self.phase = FetchPhase::EmittingPage,
        }

        Ok(Some(response))
    }

    /// Fetch the next page of items.
    ///
    /// Under an enforced budget the page is cut to what the budget still
    /// allows.
    pub async fn next_page(&mut self) -> Result<Option<Vec<ItemOf<S>>>> {
        let Some(response) = self.next_response().await? else {
            return Ok(None);
        };
        let mut items = response.into_items();
        if let Some(allowance) = self.allowance {
            items.truncate(allowance);
        }
        Ok(Some(items))
    }

    /// Run the fetch to completion, collecting every emitted item
    pub async fn collect(mut self) -> Result<FetchOutcome<ItemOf<S>>> {
        let limit = self.downstream_limit();
        let mut items = Vec::new();

        while limit.map_or(true, |limit| items.len() < limit) {
            match self.next_page().await? {
                Some(page) => items.extend(page),
                None => break,
            }
        }
        if let Some(limit) = limit {
            items.truncate(limit);
        }

        Ok(self.into_outcome(items))
    }

    /// Run the fetch to completion, mapping each raw page through `selector`
    pub async fn collect_selected<T, F>(mut self, mut selector: F) -> Result<FetchOutcome<T>>
    where
        F: FnMut(S::Response) -> T,
    {
        let limit = self.downstream_limit();
        let mut received = 0usize;
        let mut selected = Vec::new();

        while limit.map_or(true, |limit| received < limit) {
            let Some(response) = self.next_response().await? else {
                break;
            };
            received += response.item_count();
            selected.push(selector(response));
        }
        Ok(self.into_outcome(selected))
    }

    /// Lazily stream items; pages are requested only as items are consumed
    pub fn into_stream(self) -> impl Stream<Item = Result<ItemOf<S>>> {
        let limit = self.downstream_limit().unwrap_or(usize::MAX);
        stream::try_unfold(self, |mut fetcher| async move {
            let page = fetcher.next_page().await?;
            Ok::<_, Error>(page.map(|page| (page, fetcher)))
        })
        .map_ok(|page| stream::iter(page.into_iter().map(Ok::<_, Error>)))
        .try_flatten()
        .take(limit)
    }

    fn into_outcome<T>(self, items: Vec<T>) -> FetchOutcome<T> {
        FetchOutcome {
            items,
            next_token: self.state.continuation_token,
            pages_fetched: self.pages_fetched,
            stop_reason: self.stop_reason.unwrap_or(StopReason::BudgetReached),
        }
    }

    /// Cap the consumer applies to the emitted sequence in downstream mode
    pub fn downstream_limit(&self) -> Option<usize> {
        if self.options.manual_control || self.options.budget_mode != BudgetMode::Downstream {
            return None;
        }
        self.options
            .item_budget
            .map(|budget| usize::try_from(budget.max(0)).unwrap_or(usize::MAX))
    }

    fn stop_before_fetch(&self) -> Option<StopReason> {
        if self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled) {
            return Some(StopReason::Cancelled);
        }
        if !self.options.manual_control && self.options.item_budget.is_some_and(|b| b < 1) {
            return Some(StopReason::BudgetReached);
        }
        None
    }

    fn stop_after_page(&self) -> Option<StopReason> {
        if self.options.manual_control {
            Some(StopReason::SinglePage)
        } else if !self.state.has_more() {
            Some(StopReason::Exhausted)
        } else if self.state.remaining_budget.is_some_and(|r| r < 1) {
            Some(StopReason::BudgetReached)
        } else {
            None
        }
    }

    /// Page size to send: clamped under an enforced budget, else the hint
    fn effective_page_size(&self) -> Option<i32> {
        let Some(remaining) = self.state.remaining_budget else {
            return self.options.page_size_hint;
        };
        let remaining = i32::try_from(remaining.max(1)).unwrap_or(i32::MAX);
        let ceiling = match (self.options.page_size_hint, self.options.max_page_size) {
            (Some(hint), Some(max)) => Some(hint.min(max)),
            (hint, max) => hint.or(max),
        };
        Some(ceiling.map_or(remaining, |ceiling| ceiling.min(remaining)))
    }

    fn fail(&mut self, error: ServiceError) -> Result<Option<S::Response>> {
        if self.pages_fetched > 0 && self.state.remaining_budget.is_some() {
            warn!(
                pages = self.pages_fetched,
                items = self.items_emitted,
                error = %error,
                "Page request failed after partial progress, keeping items fetched so far"
            );
            self.finish(StopReason::PartialFailure);
            return Ok(None);
        }
        self.phase = FetchPhase::Failed;
        Err(Error::Service(error))
    }

    fn finish(&mut self, reason: StopReason) {
        self.phase = FetchPhase::Done;
        self.stop_reason = Some(reason);
        info!(
            pages = self.pages_fetched,
            items = self.items_emitted,
            reason = ?reason,
            "Fetch complete"
        );
    }
}

impl<S: PageSource> std::fmt::Debug for PaginatedFetcher<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaginatedFetcher")
            .field("options", &self.options)
            .field("state", &self.state)
            .field("phase", &self.phase)
            .field("pages_fetched", &self.pages_fetched)
            .finish_non_exhaustive()
    }
}
