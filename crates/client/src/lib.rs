//! HTTP client, orchestration and export for the OFS record pages.
//!
//! Wraps the pure logic of `ofs-core` with the remote API calls
//! ([`api::ApiClient`]), the query/count/last-updated sequence
//! ([`orchestrator::QueryOrchestrator`]), spreadsheet export
//! ([`export`]) and a headless page view-model ([`session::PageSession`]).

pub mod api;
pub mod config;
pub mod error;
pub mod export;
pub mod orchestrator;
pub mod session;
