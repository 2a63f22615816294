//! Live record table controller
//!
//! The controller owns the query and the last fetched collection, decides
//! when to fetch, and exposes selection and state-changing operations. The
//! presentation layer only reads [`TableView`] snapshots and calls intents.
//!
//! # Refresh protocol
//!
//! A refresh is split into [`TableController::begin_refresh`], which stamps a
//! [`RefreshTicket`] with the current query generation, and
//! [`TableController::complete_refresh`], which applies the list result.
//! Every query change bumps the generation, so a result for a superseded
//! query is discarded no matter when it resolves. Results for the same
//! generation apply in resolution order; the last one to resolve wins.
//!
//! The collection is never edited ahead of the server: deletes and re-runs
//! become visible only through the refresh that follows them.

use crate::client::{validate_address, ApiError, Listing, Mutation, Pagination, RecordApi};
use crate::record::{Record, RecordId, RecordStatus};
use crate::table::selection::Selection;
use crate::table::view::{derive_page, DerivedPage};
use crate::table::{QueryState, SortField, SortOrder};
use std::collections::BTreeSet;

/// Where the error in the controller's error slot came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSource {
    /// A foreground refresh failed; the view shows an error panel
    Refresh,

    /// A background refresh failed; the last collection is still shown
    Poll,

    /// A submit, delete or re-run failed; collection and selection are unchanged
    Action,
}

/// The controller's current error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableError {
    pub source: ErrorSource,
    pub error: ApiError,
}

impl TableError {
    /// True if the view should be replaced by an error panel
    pub fn blocks_view(&self) -> bool {
        self.source == ErrorSource::Refresh
    }
}

/// A list request issued by [`TableController::begin_refresh`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTicket {
    seq: u64,
    generation: u64,
    silent: bool,
    query: QueryState,
}

impl RefreshTicket {
    /// Query snapshot to send to the server
    pub fn query(&self) -> &QueryState {
        &self.query
    }

    /// Issue order of this request
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn is_silent(&self) -> bool {
        self.silent
    }
}

/// Result of completing a refresh
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The collection was replaced; `page_clamped` is set if the page moved back into range
    Applied { page_clamped: bool },

    /// The result belonged to a superseded query and was dropped
    Discarded,

    /// The request failed; the error is in the error slot
    Failed(ApiError),
}

/// Result of a polling tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Auto-refresh is switched off
    Paused,

    /// Every record is terminal; no request was made
    Idle,

    /// A silent refresh was issued
    Refreshed(RefreshOutcome),
}

impl PollOutcome {
    /// True if the tick issued a network call
    pub fn made_request(&self) -> bool {
        matches!(self, Self::Refreshed(_))
    }
}

/// Why an action was refused without contacting the server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// A bulk action was requested with no ids
    NothingSelected,

    /// The record is already being analyzed
    AlreadyRunning,
}

/// Result of a state-changing action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The server accepted the action; carries the outcome of the follow-up refresh
    Completed(RefreshOutcome),

    /// Refused locally, nothing was sent
    Rejected(RejectReason),

    /// The server or transport failed; the error is in the error slot
    Failed(ApiError),
}

/// Snapshot of everything the presentation layer renders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableView {
    /// Rows of the current page, in display order
    pub rows: Vec<Record>,

    /// Query the rows were derived with
    pub query: QueryState,

    /// Matches across all pages
    pub total: usize,

    pub total_pages: usize,

    /// 1-based inclusive row range shown, None when the page is empty
    pub range: Option<(usize, usize)>,

    /// Checked ids, ascending
    pub selected: Vec<RecordId>,

    /// True when every row on the page is checked
    pub all_visible_selected: bool,

    /// Primary loading indicator
    pub loading: bool,

    /// Secondary "updating" indicator for background refreshes
    pub updating: bool,

    pub auto_refresh: bool,

    /// True once any refresh has succeeded
    pub loaded: bool,

    /// True when a status filter narrows a server page; `total` then counts
    /// every record the server matched, not only those with the status
    pub page_filtered: bool,

    pub error: Option<TableError>,
}

/// Controller for the live record table
pub struct TableController<A> {
    api: A,
    query: QueryState,
    records: Vec<Record>,
    pagination: Pagination,
    selection: Selection,
    loaded: bool,
    foreground_in_flight: usize,
    background_in_flight: usize,
    auto_refresh: bool,
    error: Option<TableError>,
    generation: u64,
    next_seq: u64,
}

impl<A: RecordApi> TableController<A> {
    /// Creates a controller with an empty collection
    ///
    /// # Arguments
    ///
    /// * `api` - The record API to fetch from
    /// * `query` - Initial view parameters
    pub fn new(api: A, query: QueryState) -> Self {
        Self {
            api,
            query,
            records: Vec::new(),
            pagination: Pagination::Local,
            selection: Selection::new(),
            loaded: false,
            foreground_in_flight: 0,
            background_in_flight: 0,
            auto_refresh: true,
            error: None,
            generation: 0,
            next_seq: 0,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn query(&self) -> &QueryState {
        &self.query
    }

    /// The collection as last fetched, unfiltered
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn is_loading(&self) -> bool {
        self.foreground_in_flight > 0
    }

    pub fn is_updating(&self) -> bool {
        self.background_in_flight > 0
    }

    pub fn error(&self) -> Option<&TableError> {
        self.error.as_ref()
    }

    pub fn auto_refresh(&self) -> bool {
        self.auto_refresh
    }

    /// True if any record in the unfiltered collection is queued or running
    pub fn has_active_records(&self) -> bool {
        self.records.iter().any(|r| r.status.is_active())
    }

    /// Computes the current page of the derived view
    pub fn derived(&self) -> DerivedPage<'_> {
        derive_page(&self.records, &self.query, self.pagination)
    }

    /// Ids of the rows on the current page
    pub fn visible_ids(&self) -> Vec<RecordId> {
        self.derived().rows.iter().map(|r| r.id).collect()
    }

    /// Takes a snapshot for rendering
    pub fn view(&self) -> TableView {
        let derived = self.derived();
        let visible: Vec<RecordId> = derived.rows.iter().map(|r| r.id).collect();
        let range = if derived.rows.is_empty() {
            None
        } else {
            Some((
                derived.start_index.saturating_add(1),
                derived.start_index.saturating_add(derived.rows.len()),
            ))
        };

        TableView {
            rows: derived.rows.iter().map(|r| (*r).clone()).collect(),
            query: self.query.clone(),
            total: derived.total,
            total_pages: derived.total_pages,
            range,
            selected: self.selection.ids(),
            all_visible_selected: self.selection.covers(&visible),
            loading: self.is_loading(),
            updating: self.is_updating(),
            auto_refresh: self.auto_refresh,
            loaded: self.loaded,
            page_filtered: matches!(self.pagination, Pagination::Server { .. })
                && self.query.status_filter().is_some(),
            error: self.error.clone(),
        }
    }

    // ===== Refresh =====

    /// Starts a list request for the current query
    ///
    /// A foreground request raises the loading indicator and clears the error
    /// slot; a silent one only raises the updating indicator.
    pub fn begin_refresh(&mut self, silent: bool) -> RefreshTicket {
        self.next_seq += 1;
        if silent {
            self.background_in_flight += 1;
        } else {
            self.foreground_in_flight += 1;
            self.error = None;
        }

        tracing::trace!(
            "Refresh #{} issued (generation {}, silent: {})",
            self.next_seq,
            self.generation,
            silent
        );

        RefreshTicket {
            seq: self.next_seq,
            generation: self.generation,
            silent,
            query: self.query.clone(),
        }
    }

    /// Applies the result of a list request
    pub fn complete_refresh(
        &mut self,
        ticket: RefreshTicket,
        result: Result<Listing, ApiError>,
    ) -> RefreshOutcome {
        if ticket.silent {
            self.background_in_flight = self.background_in_flight.saturating_sub(1);
        } else {
            self.foreground_in_flight = self.foreground_in_flight.saturating_sub(1);
        }

        if ticket.generation != self.generation {
            tracing::debug!(
                "Discarding refresh #{} for superseded query (generation {}, now {})",
                ticket.seq,
                ticket.generation,
                self.generation
            );
            return RefreshOutcome::Discarded;
        }

        match result {
            Ok(listing) => {
                tracing::debug!(
                    "Refresh #{} applied: {} records",
                    ticket.seq,
                    listing.records.len()
                );
                self.records = listing.records;
                self.pagination = listing.pagination;
                self.loaded = true;
                if self
                    .error
                    .as_ref()
                    .is_some_and(|e| e.source != ErrorSource::Action)
                {
                    self.error = None;
                }

                let page_clamped = self.clamp_page();
                self.reconcile_selection();
                RefreshOutcome::Applied { page_clamped }
            }
            Err(error) => {
                let source = if ticket.silent && self.loaded {
                    ErrorSource::Poll
                } else {
                    ErrorSource::Refresh
                };

                if source == ErrorSource::Poll {
                    tracing::warn!("Background refresh failed, keeping last data: {}", error);
                    // A poll failure must not hide a foreground error panel
                    if self.error.as_ref().is_some_and(TableError::blocks_view) {
                        return RefreshOutcome::Failed(error);
                    }
                } else {
                    tracing::error!("Refresh failed: {}", error);
                }

                self.error = Some(TableError {
                    source,
                    error: error.clone(),
                });
                RefreshOutcome::Failed(error)
            }
        }
    }

    /// Fetches the collection for the current query
    ///
    /// In server-paginated mode a page clamped after the collection shrank is
    /// fetched once more so the rows match the page shown.
    pub async fn refresh(&mut self, silent: bool) -> RefreshOutcome {
        let outcome = self.fetch_once(silent).await;

        if outcome == (RefreshOutcome::Applied { page_clamped: true })
            && matches!(self.pagination, Pagination::Server { .. })
        {
            tracing::debug!("Page clamped to {}, fetching it", self.query.page());
            return self.fetch_once(silent).await;
        }

        outcome
    }

    async fn fetch_once(&mut self, silent: bool) -> RefreshOutcome {
        let ticket = self.begin_refresh(silent);
        let result = self.api.list(ticket.query()).await;
        self.complete_refresh(ticket, result)
    }

    /// Explicit "refresh now": re-enables auto-refresh and refreshes in the foreground
    pub async fn refresh_now(&mut self) -> RefreshOutcome {
        self.auto_refresh = true;
        self.refresh(false).await
    }

    /// One polling tick: a silent refresh, only while work is in flight
    pub async fn poll(&mut self) -> PollOutcome {
        if !self.auto_refresh {
            tracing::trace!("Poll skipped: auto-refresh off");
            return PollOutcome::Paused;
        }

        if !self.has_active_records() {
            tracing::trace!("Poll skipped: all records terminal");
            return PollOutcome::Idle;
        }

        PollOutcome::Refreshed(self.refresh(true).await)
    }

    /// True if the current rows depend on the server applying the query
    ///
    /// With a complete local collection, query changes only re-derive the view.
    pub fn query_needs_fetch(&self) -> bool {
        !self.loaded || matches!(self.pagination, Pagination::Server { .. })
    }

    /// Refreshes in the foreground if the last query change needs server data
    pub async fn sync_query(&mut self) -> Option<RefreshOutcome> {
        if self.query_needs_fetch() {
            Some(self.refresh(false).await)
        } else {
            None
        }
    }

    pub fn set_auto_refresh(&mut self, enabled: bool) {
        if self.auto_refresh != enabled {
            tracing::debug!("Auto-refresh {}", if enabled { "on" } else { "off" });
        }
        self.auto_refresh = enabled;
    }

    /// Empties the local table and stops auto-refresh; the server is untouched
    pub fn clear_table(&mut self) {
        self.records.clear();
        self.pagination = Pagination::Local;
        self.selection.clear();
        self.auto_refresh = false;
        self.generation += 1;
        tracing::info!("Table cleared");
    }

    // ===== Query intents =====

    pub fn set_search_term(&mut self, term: impl Into<String>) -> bool {
        let changed = self.query.set_search_term(term);
        self.after_query_change(changed)
    }

    pub fn set_status_filter(&mut self, status: Option<RecordStatus>) -> bool {
        let changed = self.query.set_status_filter(status);
        self.after_query_change(changed)
    }

    pub fn set_sort(&mut self, field: SortField, order: SortOrder) -> bool {
        let changed = self.query.set_sort(field, order);
        self.after_query_change(changed)
    }

    pub fn toggle_sort(&mut self, field: SortField) -> bool {
        let changed = self.query.toggle_sort(field);
        self.after_query_change(changed)
    }

    pub fn set_page_size(&mut self, page_size: usize) -> bool {
        let changed = self.query.set_page_size(page_size);
        self.after_query_change(changed)
    }

    /// Moves to `page`, clamped to the available pages
    pub fn set_page(&mut self, page: usize) -> bool {
        let last = self.derived().total_pages.max(1);
        let changed = self.query.set_page(page.clamp(1, last));
        self.after_query_change(changed)
    }

    pub fn next_page(&mut self) -> bool {
        self.set_page(self.query.page().saturating_add(1))
    }

    pub fn prev_page(&mut self) -> bool {
        self.set_page(self.query.page().saturating_sub(1))
    }

    fn after_query_change(&mut self, changed: bool) -> bool {
        if changed {
            self.generation += 1;
            tracing::trace!("Query changed (generation {})", self.generation);
            self.reconcile_selection();
        }
        changed
    }

    /// Moves the page back into range after the collection shrank
    fn clamp_page(&mut self) -> bool {
        let last = self.derived().total_pages.max(1);
        if self.query.page() <= last {
            return false;
        }

        tracing::debug!("Clamping page {} to {}", self.query.page(), last);
        self.query.set_page(last);
        self.generation += 1;
        true
    }

    fn reconcile_selection(&mut self) {
        let visible = self.visible_ids();
        let dropped = self.selection.retain_visible(&visible);
        if dropped > 0 {
            tracing::trace!("Dropped {} selected ids no longer visible", dropped);
        }
    }

    // ===== Selection =====

    /// Checks a row on the current page; ids not on the page are ignored
    pub fn select(&mut self, id: RecordId) -> bool {
        if !self.visible_ids().contains(&id) {
            tracing::trace!("Ignoring selection of {}: not on the current page", id);
            return false;
        }
        self.selection.insert(id)
    }

    pub fn deselect(&mut self, id: RecordId) -> bool {
        self.selection.remove(id)
    }

    /// Checks or unchecks every row on the current page
    pub fn select_all_visible(&mut self, checked: bool) {
        for id in self.visible_ids() {
            if checked {
                self.selection.insert(id);
            } else {
                self.selection.remove(id);
            }
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    // ===== Actions =====

    /// Deletes a batch of records in one request
    pub async fn bulk_delete(&mut self, ids: &[RecordId]) -> ActionOutcome {
        match batch(ids) {
            Some(ids) => self.run_mutation(Mutation::BulkDelete(ids), true).await,
            None => ActionOutcome::Rejected(RejectReason::NothingSelected),
        }
    }

    /// Re-runs a batch of records in one request
    pub async fn bulk_rerun(&mut self, ids: &[RecordId]) -> ActionOutcome {
        match batch(ids) {
            Some(ids) => self.run_mutation(Mutation::BulkRerun(ids), true).await,
            None => ActionOutcome::Rejected(RejectReason::NothingSelected),
        }
    }

    pub async fn bulk_delete_selected(&mut self) -> ActionOutcome {
        let ids = self.selection.ids();
        self.bulk_delete(&ids).await
    }

    pub async fn bulk_rerun_selected(&mut self) -> ActionOutcome {
        let ids = self.selection.ids();
        self.bulk_rerun(&ids).await
    }

    /// Deletes one record
    pub async fn delete(&mut self, id: RecordId) -> ActionOutcome {
        self.run_mutation(Mutation::Delete(id), true).await
    }

    /// Re-runs analysis of one record
    ///
    /// Refused locally, without an error, while the record is running.
    pub async fn reanalyze(&mut self, id: RecordId) -> ActionOutcome {
        let running = self
            .records
            .iter()
            .any(|r| r.id == id && r.status == RecordStatus::Running);

        if running {
            tracing::debug!("Not re-analyzing {}: already running", id);
            return ActionOutcome::Rejected(RejectReason::AlreadyRunning);
        }

        self.run_mutation(Mutation::Analyze(id), false).await
    }

    /// Submits a new address and refreshes so the queued record shows up
    ///
    /// Invalid addresses fail with [`ApiError::Validation`] before any request.
    pub async fn submit(&mut self, address: &str) -> Result<RecordId, ApiError> {
        if let Err(error) = validate_address(address) {
            tracing::debug!("Rejected address '{}': {}", address, error);
            self.error = Some(TableError {
                source: ErrorSource::Action,
                error: error.clone(),
            });
            return Err(error);
        }

        match self.api.submit(address.trim()).await {
            Ok(id) => {
                tracing::info!("Submitted {} as record {}", address.trim(), id);
                self.auto_refresh = true;
                self.refresh(false).await;
                Ok(id)
            }
            Err(error) => {
                tracing::warn!("Submitting {} failed: {}", address.trim(), error);
                self.error = Some(TableError {
                    source: ErrorSource::Action,
                    error: error.clone(),
                });
                Err(error)
            }
        }
    }

    async fn run_mutation(&mut self, mutation: Mutation, clears_selection: bool) -> ActionOutcome {
        tracing::info!("Requesting {}", mutation);

        match self.api.mutate(&mutation).await {
            Ok(()) => {
                if clears_selection {
                    self.selection.clear();
                }
                ActionOutcome::Completed(self.refresh(false).await)
            }
            Err(error) => {
                tracing::warn!("{} failed: {}", mutation, error);
                self.error = Some(TableError {
                    source: ErrorSource::Action,
                    error: error.clone(),
                });
                ActionOutcome::Failed(error)
            }
        }
    }
}

/// Deduplicated, ordered ids for one batch request; None when empty
fn batch(ids: &[RecordId]) -> Option<Vec<RecordId>> {
    let unique: BTreeSet<RecordId> = ids.iter().copied().collect();
    if unique.is_empty() {
        None
    } else {
        Some(unique.into_iter().collect())
    }
}
