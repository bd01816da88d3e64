//! The two record resources served by the remote API.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::status::{StatusVocabulary, EQUIPMENT_STATUS, MATERIAL_ACTIONS};

/// A queryable resource. Each has its own record schema and endpoints under
/// `/api/{path_segment}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    /// Equipment install/removal records.
    Equipamentos,
    /// Material movement records.
    Materiais,
}

impl Resource {
    pub const ALL: [Resource; 2] = [Resource::Equipamentos, Resource::Materiais];

    /// Path segment under `/api/`.
    pub fn path_segment(self) -> &'static str {
        match self {
            Resource::Equipamentos => "equipamentos",
            Resource::Materiais => "materiais",
        }
    }

    /// Fixed file name of the exported workbook.
    pub fn export_file_name(self) -> &'static str {
        match self {
            Resource::Equipamentos => "equipamentos_filtrados.xlsx",
            Resource::Materiais => "materiais_filtrados.xlsx",
        }
    }

    /// Name of the single worksheet in the exported workbook.
    pub fn sheet_name(self) -> &'static str {
        match self {
            Resource::Equipamentos => "Equipamentos",
            Resource::Materiais => "Materiais",
        }
    }

    /// Only the equipment resource exposes `/ultima-data`.
    pub fn has_last_updated(self) -> bool {
        matches!(self, Resource::Equipamentos)
    }

    pub fn status_vocabulary(self) -> &'static StatusVocabulary {
        match self {
            Resource::Equipamentos => &EQUIPMENT_STATUS,
            Resource::Materiais => &MATERIAL_ACTIONS,
        }
    }

    /// User-facing message shown when a query is attempted with no filters.
    pub fn missing_filters_message(self) -> &'static str {
        match self {
            Resource::Equipamentos => {
                "Informe um intervalo de datas, Equipamento ou Nota para continuar."
            }
            Resource::Materiais => "Informe um intervalo de datas, Nota ou Descrição para continuar.",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}
