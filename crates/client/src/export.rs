//! Spreadsheet encoding and saving of exported rows.

use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Format, Workbook, XlsxError};

use ofs_core::resource::Resource;
use ofs_core::shape::{export_columns, ExportRow};

use crate::error::QueryError;

/// MIME type of the produced workbook.
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// An encoded workbook ready to be saved under its fixed file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportFile {
    /// Write the workbook into `dir` under [`file_name`](Self::file_name).
    ///
    /// Bytes go to a temporary sibling first and are renamed into place, so
    /// a failed write never leaves a partial workbook under the final name.
    pub async fn save_to(&self, dir: &Path) -> Result<PathBuf, QueryError> {
        let target = dir.join(self.file_name);
        let partial = dir.join(format!(".{}.part", self.file_name));

        let written = async {
            tokio::fs::write(&partial, &self.bytes).await?;
            tokio::fs::rename(&partial, &target).await
        }
        .await;

        if let Err(e) = written {
            let _ = tokio::fs::remove_file(&partial).await;
            tracing::error!(path = %target.display(), error = %e, "Failed to save export");
            return Err(QueryError::Export(e.to_string()));
        }

        tracing::info!(path = %target.display(), bytes = self.bytes.len(), "Export saved");
        Ok(target)
    }
}

/// Encode `rows` as a one-sheet workbook: a bold header row with the
/// resource's export columns, then one row per record. Number fields are
/// written as numeric cells, everything else as text.
///
/// An empty `rows` slice yields a header-only sheet.
pub fn encode_workbook(resource: Resource, rows: &[ExportRow]) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(resource.sheet_name())?;

    for (col, title) in export_columns(resource).iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *title, &header)?;
    }

    for (i, row) in rows.iter().enumerate() {
        let excel_row = (i + 1) as u32;
        for (col, cell) in row.cells().iter().enumerate() {
            match cell.as_number() {
                Some(number) => worksheet.write_number(excel_row, col as u16, number)?,
                None => worksheet.write_string(excel_row, col as u16, cell.as_str())?,
            };
        }
    }

    workbook.save_to_buffer()
}
