//! Closed status/action vocabularies for the checkbox filter.
//!
//! Each resource exposes one fixed vocabulary. A selection only becomes a
//! query parameter when it narrows the result set: selecting the `"Todos"`
//! sentinel, nothing, or every label means "do not filter".

use std::collections::BTreeSet;

/// Sentinel label meaning "all statuses".
pub const SELECT_ALL: &str = "Todos";

/// A fixed set of labels bound to one query-parameter name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusVocabulary {
    /// Wire name of the parameter (`status` or `acoes`).
    pub param: &'static str,
    /// Labels in canonical order.
    pub labels: &'static [&'static str],
}

/// Status vocabulary of the equipment page.
pub const EQUIPMENT_STATUS: StatusVocabulary = StatusVocabulary {
    param: "status",
    labels: &["Concluído", "Pendente", "Cancelado"],
};

/// Action vocabulary of the material page.
pub const MATERIAL_ACTIONS: StatusVocabulary = StatusVocabulary {
    param: "acoes",
    labels: &["Instalado", "Retirado"],
};

impl StatusVocabulary {
    /// Whether `label` belongs to this vocabulary.
    pub fn contains(&self, label: &str) -> bool {
        self.labels.contains(&label)
    }

    /// Comma-joined wire value for `selection`, or `None` when the selection
    /// does not restrict anything.
    ///
    /// Labels outside the vocabulary are ignored. Output follows vocabulary
    /// order, not selection order.
    pub fn wire_value(&self, selection: &BTreeSet<String>) -> Option<String> {
        if selection.contains(SELECT_ALL) {
            return None;
        }

        let picked: Vec<&str> = self
            .labels
            .iter()
            .copied()
            .filter(|label| selection.contains(*label))
            .collect();

        if picked.is_empty() || picked.len() == self.labels.len() {
            None
        } else {
            Some(picked.join(","))
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
