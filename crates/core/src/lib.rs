//! Pure query logic for the OFS record pages.
//!
//! Filter normalization, query gating, query-parameter construction,
//! closed record schemas and display/export shaping. Nothing in this crate
//! performs I/O; the HTTP layer lives in `ofs-client`.

pub mod date;
pub mod error;
pub mod filter;
pub mod records;
pub mod resource;
pub mod shape;
pub mod status;
