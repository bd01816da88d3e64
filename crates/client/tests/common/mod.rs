#![allow(dead_code)]

use std::io::Read;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{json, Value};

use ofs_client::api::RecordSource;
use ofs_client::error::ApiError;
use ofs_core::filter::QueryParams;
use ofs_core::resource::Resource;

/// Install a test subscriber once; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ---------------------------------------------------------------------------
// Sample payloads
// ---------------------------------------------------------------------------

pub fn equipment_rows(n: usize) -> Vec<Value> {
    (0..n)
        .map(|i| {
            json!({
                "Instalação": format!("INST{i}"),
                "Nota": 4000 + i,
                "Cliente": "Cliente Teste",
                "Texto breve para o code": "Troca de equipamento",
                "Alavanca": null,
                "Data Conclusão": "2024-01-31T00:00:00Z",
                "Equipamento Removido": format!("EQ-R{i}"),
                "Equipamento Instalado": format!("EQ-I{i}"),
            })
        })
        .collect()
}

pub fn material_rows(n: usize) -> Vec<Value> {
    (0..n)
        .map(|i| {
            json!({
                "Data": "2024-03-05",
                "Nota": format!("9{i:03}"),
                "Descrição": "Ligação nova",
                "Texto Breve": "Instalar medidor",
                "Acao": "Instalado",
                "Quantidade": 1,
                "Serial": format!("SN{i}"),
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// FakeSource
// ---------------------------------------------------------------------------

/// Scripted reply of one fake endpoint.
#[derive(Debug, Clone)]
pub enum Reply<T> {
    Ok(T),
    Status(u16, Option<&'static str>),
    Unreachable,
}

impl<T: Clone> Reply<T> {
    fn produce(&self) -> Result<T, ApiError> {
        match self {
            Reply::Ok(v) => Ok(v.clone()),
            Reply::Status(status, detail) => Err(ApiError::Server {
                status: *status,
                detail: detail.map(str::to_string),
            }),
            Reply::Unreachable => Err(ApiError::Transport(
                reqwest::Client::new().get("://unreachable").build().unwrap_err(),
            )),
        }
    }
}

/// One recorded call against the fake source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub endpoint: &'static str,
    pub resource: Resource,
    pub params: Option<QueryParams>,
}

/// In-memory [`RecordSource`] with scripted replies and a call log.
pub struct FakeSource {
    pub records: Reply<Vec<Value>>,
    pub count: Reply<u64>,
    pub export: Reply<Vec<Value>>,
    pub last_updated: Reply<Option<NaiveDate>>,
    /// Delay applied to the records endpoint when the `nota` param matches.
    pub slow_note: Option<(&'static str, Duration)>,
    /// Delay applied to every export request.
    pub slow_export: Option<Duration>,
    calls: Mutex<Vec<Call>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self {
            records: Reply::Ok(Vec::new()),
            count: Reply::Ok(0),
            export: Reply::Ok(Vec::new()),
            last_updated: Reply::Ok(None),
            slow_note: None,
            slow_export: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_records(mut self, rows: Vec<Value>) -> Self {
        self.count = Reply::Ok(rows.len() as u64);
        self.records = Reply::Ok(rows);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn endpoints(&self) -> Vec<&'static str> {
        self.calls().iter().map(|c| c.endpoint).collect()
    }

    fn record(&self, endpoint: &'static str, resource: Resource, params: Option<&QueryParams>) {
        self.calls.lock().unwrap().push(Call {
            endpoint,
            resource,
            params: params.cloned(),
        });
    }
}

#[async_trait]
impl RecordSource for FakeSource {
    async fn fetch_records(
        &self,
        resource: Resource,
        params: &QueryParams,
    ) -> Result<Vec<Value>, ApiError> {
        self.record("records", resource, Some(params));

        if let Some((note, delay)) = self.slow_note {
            if params.get("nota") == Some(note) {
                tokio::time::sleep(delay).await;
            }
        }

        // Echo the note filter back so tests can tell responses apart.
        match (&self.records, params.get("nota")) {
            (Reply::Ok(rows), Some(note)) if rows.is_empty() => Ok(vec![json!({ "Nota": note })]),
            (reply, _) => reply.produce(),
        }
    }

    async fn fetch_count(&self, resource: Resource, params: &QueryParams) -> Result<u64, ApiError> {
        self.record("count", resource, Some(params));
        self.count.produce()
    }

    async fn fetch_export(
        &self,
        resource: Resource,
        params: &QueryParams,
    ) -> Result<Vec<Value>, ApiError> {
        self.record("export", resource, Some(params));
        if let Some(delay) = self.slow_export {
            tokio::time::sleep(delay).await;
        }
        self.export.produce()
    }

    async fn fetch_last_updated(&self, resource: Resource) -> Result<Option<NaiveDate>, ApiError> {
        self.record("last_updated", resource, None);
        self.last_updated.produce()
    }
}

// ---------------------------------------------------------------------------
// Workbook inspection
// ---------------------------------------------------------------------------

/// Read `xl/worksheets/sheet1.xml` out of an encoded workbook.
pub fn sheet_xml(bytes: &[u8]) -> String {
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
    let mut sheet = archive.by_name("xl/worksheets/sheet1.xml").unwrap();
    let mut xml = String::new();
    sheet.read_to_string(&mut xml).unwrap();
    xml
}

/// Read `xl/sharedStrings.xml` out of an encoded workbook.
pub fn shared_strings_xml(bytes: &[u8]) -> String {
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
    let mut strings = archive.by_name("xl/sharedStrings.xml").unwrap();
    let mut xml = String::new();
    strings.read_to_string(&mut xml).unwrap();
    xml
}

/// Number of `<row>` elements in a worksheet.
pub fn row_count(sheet_xml: &str) -> usize {
    sheet_xml.matches("<row ").count()
}

/// Opening tag of the cell at `reference` (e.g. `K2`), if present.
pub fn cell_tag<'a>(sheet_xml: &'a str, reference: &str) -> Option<&'a str> {
    let start = sheet_xml.find(&format!("<c r=\"{reference}\""))?;
    let end = start + sheet_xml[start..].find('>')?;
    Some(&sheet_xml[start..=end])
}
