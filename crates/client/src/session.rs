//! Headless view-model for one record page.
//!
//! [`PageSession`] owns the editable [`FilterState`] and the currently
//! displayed result. Every `filter()` call snapshots the filters and is tagged
//! with a sequence number; a response is only committed if no newer call has
//! been issued since, so a slow early response cannot overwrite a newer one.
//! There is no cancellation: superseded requests run to completion and are
//! discarded. Loading state is released by drop guards, so dropping a
//! `filter()` or `export()` future mid-flight does not leave the page stuck.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use chrono::NaiveDate;
use tokio::sync::RwLock;

use ofs_core::date::{to_display, PLACEHOLDER};
use ofs_core::filter::{can_query, FilterState};
use ofs_core::records::RecordSchema;
use ofs_core::resource::Resource;
use ofs_core::shape::{display_columns, DisplayRow};

use crate::api::RecordSource;
use crate::error::{ErrorKind, QueryError};
use crate::export::ExportFile;
use crate::orchestrator::QueryOrchestrator;

// ---------------------------------------------------------------------------
// View state
// ---------------------------------------------------------------------------

/// A single dismissible notice shown above the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&QueryError> for Notice {
    fn from(err: &QueryError) -> Self {
        Self {
            kind: err.kind(),
            message: err.user_message(),
        }
    }
}

/// What the page currently shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageView {
    pub rows: Vec<DisplayRow>,
    pub total_count: Option<u64>,
    pub last_updated: Option<NaiveDate>,
    pub notice: Option<Notice>,
}

/// Result of a `filter()` call that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOutcome {
    /// The response was committed to the view.
    Loaded {
        rows: usize,
        total_count: Option<u64>,
    },
    /// A newer `filter()` was issued before this one finished; its response
    /// (success or failure) was discarded.
    Superseded,
}

// ---------------------------------------------------------------------------
// PageSession
// ---------------------------------------------------------------------------

/// One page session over records of type `R`.
pub struct PageSession<R, S> {
    orchestrator: QueryOrchestrator<S>,
    filters: RwLock<FilterState>,
    view: RwLock<PageView>,
    /// Sequence number of the most recently issued `filter()`.
    issued: AtomicU64,
    /// Sequence number of the most recently settled `filter()`.
    settled: AtomicU64,
    /// Number of `export()` calls in flight.
    exporting: AtomicUsize,
    _record: PhantomData<fn() -> R>,
}

impl<R: RecordSchema, S: RecordSource> PageSession<R, S> {
    pub fn new(source: S) -> Self {
        Self {
            orchestrator: QueryOrchestrator::new(source),
            filters: RwLock::new(FilterState::default()),
            view: RwLock::new(PageView::default()),
            issued: AtomicU64::new(0),
            settled: AtomicU64::new(0),
            exporting: AtomicUsize::new(0),
            _record: PhantomData,
        }
    }

    pub fn resource(&self) -> Resource {
        R::RESOURCE
    }

    pub fn columns(&self) -> &'static [&'static str] {
        display_columns(R::RESOURCE)
    }

    pub fn orchestrator(&self) -> &QueryOrchestrator<S> {
        &self.orchestrator
    }

    // ---- filters ----

    /// Snapshot of the current filters.
    pub async fn filters(&self) -> FilterState {
        self.filters.read().await.clone()
    }

    pub async fn set_filters(&self, filters: FilterState) {
        *self.filters.write().await = filters;
    }

    /// Edit the filters in place.
    pub async fn update_filters(&self, edit: impl FnOnce(&mut FilterState)) {
        edit(&mut *self.filters.write().await);
    }

    // ---- view ----

    pub async fn view(&self) -> PageView {
        self.view.read().await.clone()
    }

    pub async fn dismiss_notice(&self) {
        self.view.write().await.notice = None;
    }

    /// Count and last-updated lines shown above the table.
    pub async fn summary(&self) -> Vec<String> {
        let view = self.view.read().await;
        let mut lines = vec![format!(
            "Total de registros encontrados: {}",
            view.total_count
                .map(|n| n.to_string())
                .unwrap_or_else(|| PLACEHOLDER.to_string())
        )];
        if R::RESOURCE.has_last_updated() {
            lines.push(format!(
                "Última atualização: {}",
                view.last_updated
                    .map(to_display)
                    .unwrap_or_else(|| PLACEHOLDER.to_string())
            ));
        }
        lines
    }

    // ---- trigger state ----

    /// Whether a `filter()` or `export()` is in flight.
    pub fn is_loading(&self) -> bool {
        self.issued.load(Ordering::SeqCst) != self.settled.load(Ordering::SeqCst)
            || self.exporting.load(Ordering::SeqCst) > 0
    }

    /// The "Filter" trigger is disabled while loading.
    pub fn can_filter(&self) -> bool {
        !self.is_loading()
    }

    /// The "Export" trigger is disabled while loading or when nothing is
    /// displayed.
    pub async fn can_export(&self) -> bool {
        !self.is_loading() && !self.view.read().await.rows.is_empty()
    }

    // ---- actions ----

    /// Run a query with the current filters and update the view.
    ///
    /// Gate failures set the notice and leave the displayed rows untouched.
    /// Otherwise the view is cleared, and the response is committed only if
    /// this is still the latest call.
    pub async fn filter(&self) -> Result<FilterOutcome, QueryError> {
        let filters = self.filters().await;

        if !can_query(R::RESOURCE, &filters) {
            let err = QueryError::Validation(R::RESOURCE.missing_filters_message().to_string());
            self.view.write().await.notice = Some(Notice::from(&err));
            return Err(err);
        }

        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let _settle = SettleOnDrop {
            issued: &self.issued,
            settled: &self.settled,
            seq,
        };
        *self.view.write().await = PageView::default();

        let result = self.orchestrator.run_query::<R>(&filters).await;

        let mut view = self.view.write().await;
        if self.issued.load(Ordering::SeqCst) != seq {
            tracing::debug!(
                resource = %R::RESOURCE,
                seq,
                "Discarding superseded query response"
            );
            return Ok(FilterOutcome::Superseded);
        }

        match result {
            Ok(result) => {
                let outcome = FilterOutcome::Loaded {
                    rows: result.rows.len(),
                    total_count: result.total_count,
                };
                *view = PageView {
                    rows: result.display_rows(),
                    total_count: result.total_count,
                    last_updated: result.last_updated,
                    notice: None,
                };
                Ok(outcome)
            }
            Err(err) => {
                view.notice = Some(Notice::from(&err));
                Err(err)
            }
        }
    }

    /// Export the current filters to an in-memory workbook.
    pub async fn export(&self) -> Result<ExportFile, QueryError> {
        let filters = self.filters().await;

        let result = {
            let _exporting = InFlight::enter(&self.exporting);
            self.orchestrator
                .export_current_filters::<R>(&filters)
                .await
        };

        if let Err(err) = &result {
            self.view.write().await.notice = Some(Notice::from(err));
        }
        result
    }

    /// Export the current filters and save the workbook into `dir`.
    pub async fn export_to(&self, dir: &Path) -> Result<PathBuf, QueryError> {
        let file = self.export().await?;
        match file.save_to(dir).await {
            Ok(path) => Ok(path),
            Err(err) => {
                self.view.write().await.notice = Some(Notice::from(&err));
                Err(err)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Guards
// ---------------------------------------------------------------------------

/// Marks `seq` settled when dropped, unless a newer call was issued.
struct SettleOnDrop<'a> {
    issued: &'a AtomicU64,
    settled: &'a AtomicU64,
    seq: u64,
}

impl Drop for SettleOnDrop<'_> {
    fn drop(&mut self) {
        if self.issued.load(Ordering::SeqCst) == self.seq {
            self.settled.fetch_max(self.seq, Ordering::SeqCst);
        }
    }
}

/// Holds one slot of an in-flight counter.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
