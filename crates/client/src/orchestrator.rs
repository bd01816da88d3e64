//! Query and export sequencing around a [`RecordSource`].
//!
//! A query gates the filters, builds one [`QueryParams`] snapshot, fetches
//! the records (fatal on failure), then fetches the count and, for
//! equipment, the last-updated date. The two secondary requests run
//! concurrently and only degrade their own field when they fail.

use chrono::NaiveDate;

use ofs_core::filter::{FilterState, QueryParams};
use ofs_core::records::{decode_records, RecordSchema};
use ofs_core::shape::{DisplayRow, ExportRow};

use crate::api::RecordSource;
use crate::error::{ApiError, ErrorKind, Operation, QueryError};
use crate::export::{encode_workbook, ExportFile};

// ---------------------------------------------------------------------------
// QueryResult
// ---------------------------------------------------------------------------

/// Outcome of one successful query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult<R> {
    /// Records in API order.
    pub rows: Vec<R>,
    /// Total matching records; `None` when the count request failed.
    pub total_count: Option<u64>,
    /// Date of the most recent record in the dataset, if known.
    pub last_updated: Option<NaiveDate>,
}

impl<R: RecordSchema> QueryResult<R> {
    pub fn display_rows(&self) -> Vec<DisplayRow> {
        self.rows.iter().map(RecordSchema::display_row).collect()
    }
}

// ---------------------------------------------------------------------------
// QueryOrchestrator
// ---------------------------------------------------------------------------

/// Runs page actions against a record source.
pub struct QueryOrchestrator<S> {
    source: S,
}

impl<S: RecordSource> QueryOrchestrator<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Gate, fetch records, then fetch count and last-updated metadata.
    ///
    /// Only a failure of the records request is returned as an error.
    pub async fn run_query<R: RecordSchema>(
        &self,
        filters: &FilterState,
    ) -> Result<QueryResult<R>, QueryError> {
        let resource = R::RESOURCE;
        let params = QueryParams::gated(resource, filters)?;

        let raw = self
            .source
            .fetch_records(resource, &params)
            .await
            .map_err(|e| primary_failure(Operation::Query, e))?;
        let rows: Vec<R> = decode_records(raw)
            .map_err(|e| primary_failure(Operation::Query, ApiError::from(e)))?;

        let count = self.source.fetch_count(resource, &params);
        let last_updated = async {
            if resource.has_last_updated() {
                self.source.fetch_last_updated(resource).await
            } else {
                Ok(None)
            }
        };
        let (count, last_updated) = tokio::join!(count, last_updated);

        let total_count = count
            .map_err(|e| secondary_failure("count", &e))
            .ok();
        let last_updated = last_updated
            .map_err(|e| secondary_failure("last-updated", &e))
            .ok()
            .flatten();

        tracing::info!(
            resource = %resource,
            rows = rows.len(),
            total_count = ?total_count,
            "Query completed"
        );

        Ok(QueryResult {
            rows,
            total_count,
            last_updated,
        })
    }

    /// Re-derive parameters from `filters`, fetch export rows and encode them
    /// as a single-sheet workbook.
    ///
    /// Never reuses displayed rows; the export endpoint is always called.
    pub async fn export_current_filters<R: RecordSchema>(
        &self,
        filters: &FilterState,
    ) -> Result<ExportFile, QueryError> {
        let resource = R::RESOURCE;
        let params = QueryParams::gated(resource, filters)?;

        let raw = self
            .source
            .fetch_export(resource, &params)
            .await
            .map_err(|e| primary_failure(Operation::Export, e))?;
        let records: Vec<R> = decode_records(raw)
            .map_err(|e| primary_failure(Operation::Export, ApiError::from(e)))?;
        let rows: Vec<ExportRow> = records.iter().map(RecordSchema::export_row).collect();

        let bytes = encode_workbook(resource, &rows).map_err(|e| {
            tracing::error!(resource = %resource, error = %e, "Workbook encoding failed");
            QueryError::Export(e.to_string())
        })?;

        tracing::info!(
            resource = %resource,
            rows = rows.len(),
            bytes = bytes.len(),
            "Export encoded"
        );

        Ok(ExportFile {
            file_name: resource.export_file_name(),
            bytes,
        })
    }
}

fn primary_failure(operation: Operation, err: ApiError) -> QueryError {
    tracing::error!(%operation, kind = ?err.kind(), error = %err, "Primary request failed");
    QueryError::Api {
        operation,
        source: err,
    }
}

fn secondary_failure(request: &'static str, err: &ApiError) {
    tracing::warn!(
        request,
        kind = ?ErrorKind::Secondary,
        cause = ?err.kind(),
        error = %err,
        "Secondary request failed, metadata marked unknown"
    );
}
