//! Single record detail, kept fresh while its analysis is in flight

use crate::client::{ApiError, Mutation, RecordApi};
use crate::record::{Record, RecordId, RecordStatus};
use crate::table::{ActionOutcome, RefreshOutcome, RejectReason};

/// Watches one record by id
pub struct DetailWatcher<A> {
    api: A,
    id: RecordId,
    record: Option<Record>,
    error: Option<ApiError>,
    loading: bool,
}

impl<A: RecordApi> DetailWatcher<A> {
    pub fn new(api: A, id: RecordId) -> Self {
        Self {
            api,
            id,
            record: None,
            error: None,
            loading: false,
        }
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// The record as last fetched
    pub fn record(&self) -> Option<&Record> {
        self.record.as_ref()
    }

    pub fn error(&self) -> Option<&ApiError> {
        self.error.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// True while the record is queued or running
    pub fn is_active(&self) -> bool {
        self.record.as_ref().is_some_and(|r| r.status.is_active())
    }

    /// Fetches the record; on failure the last fetched record is kept
    pub async fn refresh(&mut self) -> Result<(), ApiError> {
        self.loading = true;
        let result = self.api.get(self.id).await;
        self.loading = false;

        match result {
            Ok(record) => {
                tracing::debug!("Record {} is {}", self.id, record.status);
                self.record = Some(record);
                self.error = None;
                Ok(())
            }
            Err(error) => {
                tracing::warn!("Fetching record {} failed: {}", self.id, error);
                self.error = Some(error.clone());
                Err(error)
            }
        }
    }

    /// One polling tick: refreshes only while the analysis is active
    ///
    /// Returns true if a request was made.
    pub async fn poll(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        // Failures land in the error slot
        let _ = self.refresh().await;
        true
    }

    /// Requests a new analysis of the record, then refetches it
    pub async fn reanalyze(&mut self) -> ActionOutcome {
        if self
            .record
            .as_ref()
            .is_some_and(|r| r.status == RecordStatus::Running)
        {
            tracing::debug!("Not re-analyzing {}: already running", self.id);
            return ActionOutcome::Rejected(RejectReason::AlreadyRunning);
        }

        let mutation = Mutation::Analyze(self.id);
        tracing::info!("Requesting {}", mutation);

        if let Err(error) = self.api.mutate(&mutation).await {
            tracing::warn!("{} failed: {}", mutation, error);
            self.error = Some(error.clone());
            return ActionOutcome::Failed(error);
        }

        match self.refresh().await {
            Ok(()) => ActionOutcome::Completed(RefreshOutcome::Applied {
                page_clamped: false,
            }),
            Err(error) => ActionOutcome::Completed(RefreshOutcome::Failed(error)),
        }
    }
}
