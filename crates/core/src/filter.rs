//! Filter normalization, query gating and query-parameter construction.
//!
//! [`FilterState`] holds raw operator input exactly as typed. The functions
//! here turn it into a canonical [`QueryParams`] set: token-list text is
//! split on newlines, commas and whitespace, partial date ranges are dropped,
//! and an empty source never yields a present-but-empty parameter.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;

use crate::date::to_iso;
use crate::error::CoreError;
use crate::resource::Resource;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Wire names of the query parameters understood by the remote API.
pub mod param_names {
    pub const DATA_INICIAL: &str = "dataInicial";
    pub const DATA_FINAL: &str = "dataFinal";
    pub const EQUIPAMENTO: &str = "equipamento";
    pub const NOTA: &str = "nota";
}

/// Canonical delimiter of token-list parameter values.
pub const TOKEN_DELIMITER: &str = ",";

/// Any run of newline, comma or whitespace characters.
static DELIMITER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\n,\s]+").expect("valid regex"));

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Split free text into tokens.
///
/// Tokens are passed through exactly as typed: no deduplication, no case
/// folding, no trimming beyond the delimiters themselves.
///
/// # Examples
///
/// ```
/// use ofs_core::filter::normalize_tokens;
/// assert_eq!(normalize_tokens("A, B\nC"), vec!["A", "B", "C"]);
/// assert!(normalize_tokens(",, \n").is_empty());
/// ```
pub fn normalize_tokens(raw: &str) -> Vec<String> {
    DELIMITER_RE
        .split(raw)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Wire value for a token-list filter, or `None` when the text yields no
/// tokens.
pub fn token_param(raw: &str) -> Option<String> {
    let tokens = normalize_tokens(raw);
    if tokens.is_empty() {
        None
    } else {
        Some(tokens.join(TOKEN_DELIMITER))
    }
}

// ---------------------------------------------------------------------------
// FilterState
// ---------------------------------------------------------------------------

/// Operator-entered filters for one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Equipment codes (equipment page) or material descriptions (material
    /// page), as raw text.
    pub code_list: String,
    /// Note numbers, as raw text.
    pub note_list: String,
    /// Checked status/action labels. May contain the `"Todos"` sentinel.
    pub status_selection: BTreeSet<String>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dates(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    pub fn with_codes(mut self, text: impl Into<String>) -> Self {
        self.code_list = text.into();
        self
    }

    pub fn with_notes(mut self, text: impl Into<String>) -> Self {
        self.note_list = text.into();
        self
    }

    pub fn with_status<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.status_selection = labels.into_iter().map(Into::into).collect();
        self
    }

    /// Both ends of the date range, or `None` if either is missing.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.start_date.zip(self.end_date)
    }
}

// ---------------------------------------------------------------------------
// Gating
// ---------------------------------------------------------------------------

/// Whether at least one effective filter is set.
///
/// A lone start or end date does not count. A status selection only counts
/// when it narrows the result set, so `"Todos"`, the full vocabulary or
/// labels outside the resource's vocabulary do not satisfy the gate.
pub fn can_query(resource: Resource, filters: &FilterState) -> bool {
    filters.date_range().is_some()
        || !filters.code_list.trim().is_empty()
        || !filters.note_list.trim().is_empty()
        || resource
            .status_vocabulary()
            .wire_value(&filters.status_selection)
            .is_some()
}

/// Gate `filters`, returning the resource-specific validation error when no
/// filter is set.
pub fn ensure_can_query(resource: Resource, filters: &FilterState) -> Result<(), CoreError> {
    if can_query(resource, filters) {
        Ok(())
    } else {
        Err(CoreError::Validation(
            resource.missing_filters_message().to_string(),
        ))
    }
}

// ---------------------------------------------------------------------------
// QueryParams
// ---------------------------------------------------------------------------

/// Canonical query-parameter set derived from a [`FilterState`].
///
/// Keys appear in a fixed order and are never present with an empty value.
/// Serializes as a sequence of `(key, value)` pairs, which is what
/// `reqwest::RequestBuilder::query` expects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QueryParams(Vec<(&'static str, String)>);

impl QueryParams {
    /// Build parameters without gating.
    pub fn build(resource: Resource, filters: &FilterState) -> Self {
        let mut pairs = Vec::new();

        if let Some((start, end)) = filters.date_range() {
            pairs.push((param_names::DATA_INICIAL, to_iso(start)));
            pairs.push((param_names::DATA_FINAL, to_iso(end)));
        }
        if let Some(codes) = token_param(&filters.code_list) {
            pairs.push((param_names::EQUIPAMENTO, codes));
        }
        if let Some(notes) = token_param(&filters.note_list) {
            pairs.push((param_names::NOTA, notes));
        }

        let vocabulary = resource.status_vocabulary();
        if let Some(labels) = vocabulary.wire_value(&filters.status_selection) {
            pairs.push((vocabulary.param, labels));
        }

        Self(pairs)
    }

    /// Gate, then build.
    pub fn gated(resource: Resource, filters: &FilterState) -> Result<Self, CoreError> {
        ensure_can_query(resource, filters)?;
        Ok(Self::build(resource, filters))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.iter().map(|(k, _)| *k)
    }

    pub fn pairs(&self) -> &[(&'static str, String)] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for QueryParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("&")?;
            }
            write!(f, "{key}={value}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::SELECT_ALL;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // -- normalize_tokens ----------------------------------------------------

    #[test]
    fn splits_on_mixed_delimiters() {
        assert_eq!(normalize_tokens("A,B\nC D"), vec!["A", "B", "C", "D"]);
        assert_eq!(normalize_tokens("A, B\nC"), vec!["A", "B", "C"]);
    }

    #[test]
    fn blank_inputs_yield_no_tokens() {
        assert!(normalize_tokens("").is_empty());
        assert!(normalize_tokens("   ").is_empty());
        assert!(normalize_tokens(",, \n").is_empty());
    }

    #[test]
    fn tabs_and_crlf_are_delimiters() {
        assert_eq!(normalize_tokens("X1\tX2\r\nX3"), vec!["X1", "X2", "X3"]);
    }

    #[test]
    fn tokens_are_not_deduplicated_or_case_folded() {
        assert_eq!(normalize_tokens("ab AB ab"), vec!["ab", "AB", "ab"]);
    }

    #[test]
    fn normalization_is_idempotent_under_canonical_delimiter() {
        let inputs = [
            "A,B\nC D",
            "  ,x,,y \n\n z ",
            "single",
            "",
            "10203040\n10203041\n\n10203042,",
        ];
        for raw in inputs {
            let once = normalize_tokens(raw);
            let twice = normalize_tokens(&once.join(TOKEN_DELIMITER));
            assert_eq!(once, twice, "input {raw:?}");
        }
    }

    #[test]
    fn token_param_absent_for_blank_text() {
        assert_eq!(token_param(" \n "), None);
        assert_eq!(token_param("1\n2"), Some("1,2".to_string()));
    }

    // -- can_query -----------------------------------------------------------

    #[test]
    fn empty_filters_cannot_query() {
        assert!(!can_query(Resource::Equipamentos, &FilterState::new()));
    }

    #[test]
    fn full_date_range_can_query() {
        let filters = FilterState::new().with_dates(ymd(2024, 1, 1), ymd(2024, 1, 31));
        assert!(can_query(Resource::Materiais, &filters));
    }

    #[test]
    fn lone_start_date_cannot_query() {
        let filters = FilterState {
            start_date: Some(ymd(2024, 1, 1)),
            ..FilterState::default()
        };
        assert!(!can_query(Resource::Equipamentos, &filters));
    }

    #[test]
    fn whitespace_text_cannot_query() {
        let filters = FilterState::new().with_codes("  \n ").with_notes("\t");
        assert!(!can_query(Resource::Equipamentos, &filters));
    }

    #[test]
    fn note_text_can_query() {
        assert!(can_query(Resource::Materiais, &FilterState::new().with_notes("123")));
    }

    #[test]
    fn narrowing_status_selection_can_query() {
        let filters = FilterState::new().with_status(["Pendente"]);
        assert!(can_query(Resource::Equipamentos, &filters));
    }

    #[test]
    fn unknown_status_label_alone_cannot_query() {
        let filters = FilterState::new().with_status(["Perdido"]);
        assert!(!can_query(Resource::Equipamentos, &filters));
        assert!(matches!(
            QueryParams::gated(Resource::Equipamentos, &filters),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn select_all_alone_cannot_query() {
        let filters = FilterState::new().with_status([SELECT_ALL]);
        assert!(!can_query(Resource::Materiais, &filters));
    }

    #[test]
    fn full_vocabulary_alone_cannot_query() {
        let filters = FilterState::new().with_status(["Instalado", "Retirado"]);
        assert!(!can_query(Resource::Materiais, &filters));
    }

    #[test]
    fn label_from_other_resource_cannot_query() {
        let filters = FilterState::new().with_status(["Retirado"]);
        assert!(can_query(Resource::Materiais, &filters));
        assert!(!can_query(Resource::Equipamentos, &filters));
    }

    #[test]
    fn select_all_still_passes_with_other_filter() {
        let filters = FilterState::new().with_status([SELECT_ALL]).with_notes("1");
        let params = QueryParams::gated(Resource::Equipamentos, &filters).unwrap();
        assert_eq!(params.keys().collect::<Vec<_>>(), vec!["nota"]);
    }

    #[test]
    fn ensure_can_query_uses_resource_message() {
        let err = ensure_can_query(Resource::Materiais, &FilterState::new()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: Informe um intervalo de datas, Nota ou Descrição para continuar."
        );
    }

    // -- QueryParams ---------------------------------------------------------

    #[test]
    fn date_only_filters_produce_exactly_two_params() {
        let filters = FilterState::new().with_dates(ymd(2024, 1, 1), ymd(2024, 1, 31));
        let params = QueryParams::build(Resource::Equipamentos, &filters);

        assert_eq!(
            params.pairs(),
            &[
                ("dataInicial", "2024-01-01".to_string()),
                ("dataFinal", "2024-01-31".to_string()),
            ]
        );
        assert!(!params.contains_key(param_names::EQUIPAMENTO));
        assert!(!params.contains_key(param_names::NOTA));
    }

    #[test]
    fn partial_range_is_dropped() {
        let filters = FilterState {
            end_date: Some(ymd(2024, 1, 31)),
            note_list: "55".into(),
            ..FilterState::default()
        };
        let params = QueryParams::build(Resource::Materiais, &filters);
        assert_eq!(params.keys().collect::<Vec<_>>(), vec!["nota"]);
    }

    #[test]
    fn token_lists_are_comma_joined() {
        let filters = FilterState::new()
            .with_codes("EQ1\nEQ2  EQ3")
            .with_notes("900, 901");
        let params = QueryParams::build(Resource::Equipamentos, &filters);
        assert_eq!(params.get("equipamento"), Some("EQ1,EQ2,EQ3"));
        assert_eq!(params.get("nota"), Some("900,901"));
    }

    #[test]
    fn status_param_name_follows_resource() {
        let filters = FilterState::new().with_status(["Retirado"]);
        let params = QueryParams::build(Resource::Materiais, &filters);
        assert_eq!(params.get("acoes"), Some("Retirado"));
        assert!(!params.contains_key("status"));
    }

    #[test]
    fn select_all_status_is_absent() {
        let filters = FilterState::new().with_status([SELECT_ALL]);
        let params = QueryParams::build(Resource::Equipamentos, &filters);
        assert!(params.is_empty());
    }

    #[test]
    fn gated_rejects_empty_filters() {
        let result = QueryParams::gated(Resource::Equipamentos, &FilterState::new());
        assert!(matches!(result, Err(CoreError::Validation(_))));
    }

    #[test]
    fn display_renders_query_string() {
        let filters = FilterState::new().with_notes("1 2");
        let params = QueryParams::build(Resource::Materiais, &filters);
        assert_eq!(params.to_string(), "nota=1,2");
    }

    #[test]
    fn serializes_as_pairs() {
        let filters = FilterState::new().with_notes("7");
        let params = QueryParams::build(Resource::Materiais, &filters);
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json, serde_json::json!([["nota", "7"]]));
    }
}
