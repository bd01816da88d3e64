//! Display and export shaping of records.
//!
//! Display rows follow the on-screen table columns; export rows use their own
//! column names and order, independent of what is shown. Both substitute
//! [`PLACEHOLDER`] for absent values and render dates as `dd/MM/yyyy`.
//! Export cells keep numeric fields as [`Scalar::Number`].

use crate::date::{display_date, PLACEHOLDER};
use crate::records::{EquipmentRecord, MaterialRecord, RecordSchema, Scalar};
use crate::resource::Resource;

// ---------------------------------------------------------------------------
// Column sets
// ---------------------------------------------------------------------------

pub const EQUIPMENT_DISPLAY_COLUMNS: &[&str] = &[
    "Instalação",
    "Nota",
    "Cliente",
    "Descrição Nota",
    "Alavanca",
    "Data Conclusão",
    "Equipamento Removido",
    "Equipamento Instalado",
];

pub const EQUIPMENT_EXPORT_COLUMNS: &[&str] = &[
    "Data Conclusão",
    "Nota",
    "Instalação",
    "Cliente",
    "Descrição",
    "Alavanca",
    "Equipamento Removido",
    "Equipamento Instalado",
    "Status",
];

pub const MATERIAL_DISPLAY_COLUMNS: &[&str] = &[
    "Data",
    "Nota",
    "Descrição",
    "Acao",
    "Status do Usuário",
    "Tipo de nota",
    "Instalação",
    "Zona",
    "Lote",
    "Descricao",
    "Quantidade",
    "Serial",
    "Base Operacional",
];

pub const MATERIAL_EXPORT_COLUMNS: &[&str] = &[
    "Data",
    "Nota",
    "Texto",
    "Acao",
    "Status do Usuário",
    "Tipo de nota",
    "Instalação",
    "Zona",
    "Lote",
    "Descricao",
    "Quantidade",
    "Serial",
    "Base Operacional",
];

pub fn display_columns(resource: Resource) -> &'static [&'static str] {
    match resource {
        Resource::Equipamentos => EQUIPMENT_DISPLAY_COLUMNS,
        Resource::Materiais => MATERIAL_DISPLAY_COLUMNS,
    }
}

pub fn export_columns(resource: Resource) -> &'static [&'static str] {
    match resource {
        Resource::Equipamentos => EQUIPMENT_EXPORT_COLUMNS,
        Resource::Materiais => MATERIAL_EXPORT_COLUMNS,
    }
}

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

/// One on-screen table row. Cells line up with [`display_columns`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRow {
    columns: &'static [&'static str],
    cells: Vec<String>,
}

/// One exported worksheet row. Cells line up with [`export_columns`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRow {
    columns: &'static [&'static str],
    cells: Vec<Scalar>,
}

impl DisplayRow {
    pub fn columns(&self) -> &'static [&'static str] {
        self.columns
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    /// Cell under `column`, or `None` if the column is not displayed.
    pub fn get(&self, column: &str) -> Option<&str> {
        cell_for(self.columns, &self.cells, column)
    }
}

impl ExportRow {
    pub fn columns(&self) -> &'static [&'static str] {
        self.columns
    }

    pub fn cells(&self) -> &[Scalar] {
        &self.cells
    }

    pub fn cell(&self, column: &str) -> Option<&Scalar> {
        column_index(self.columns, column).and_then(|i| self.cells.get(i))
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.cell(column).map(Scalar::as_str)
    }
}

fn column_index(columns: &[&str], column: &str) -> Option<usize> {
    columns.iter().position(|c| *c == column)
}

fn cell_for<'a>(columns: &[&str], cells: &'a [String], column: &str) -> Option<&'a str> {
    column_index(columns, column)
        .and_then(|i| cells.get(i))
        .map(String::as_str)
}

/// Text cell with placeholder substitution.
fn text(value: &Option<Scalar>) -> String {
    value
        .as_ref()
        .map_or_else(|| PLACEHOLDER.to_string(), ToString::to_string)
}

/// Date cell rendered `dd/MM/yyyy`, or placeholder.
fn date(value: &Option<Scalar>) -> String {
    display_date(value.as_deref())
}

/// Export cell keeping the field's kind, with placeholder substitution.
fn cell(value: &Option<Scalar>) -> Scalar {
    value
        .clone()
        .unwrap_or_else(|| Scalar::Text(PLACEHOLDER.to_string()))
}

fn date_cell(value: &Option<Scalar>) -> Scalar {
    Scalar::Text(date(value))
}

// ---------------------------------------------------------------------------
// Schema bindings
// ---------------------------------------------------------------------------

impl RecordSchema for EquipmentRecord {
    const RESOURCE: Resource = Resource::Equipamentos;

    fn display_row(&self) -> DisplayRow {
        DisplayRow {
            columns: EQUIPMENT_DISPLAY_COLUMNS,
            cells: vec![
                text(&self.instalacao),
                text(&self.nota),
                text(&self.cliente),
                text(&self.texto_breve),
                text(&self.alavanca),
                date(&self.data_conclusao),
                text(&self.equipamento_removido),
                text(&self.equipamento_instalado),
            ],
        }
    }

    fn export_row(&self) -> ExportRow {
        ExportRow {
            columns: EQUIPMENT_EXPORT_COLUMNS,
            cells: vec![
                date_cell(&self.data_conclusao),
                cell(&self.nota),
                cell(&self.instalacao),
                cell(&self.cliente),
                cell(&self.texto_breve),
                cell(&self.alavanca),
                cell(&self.equipamento_removido),
                cell(&self.equipamento_instalado),
                cell(&self.status),
            ],
        }
    }
}

impl RecordSchema for MaterialRecord {
    const RESOURCE: Resource = Resource::Materiais;

    fn display_row(&self) -> DisplayRow {
        DisplayRow {
            columns: MATERIAL_DISPLAY_COLUMNS,
            cells: vec![
                date(&self.data),
                text(&self.nota),
                text(&self.descricao_nota),
                text(&self.acao),
                text(&self.status_usuario),
                text(&self.tipo_nota),
                text(&self.instalacao),
                text(&self.zona),
                text(&self.lote),
                text(&self.descricao_material),
                text(&self.quantidade),
                text(&self.serial),
                text(&self.base_operacional),
            ],
        }
    }

    fn export_row(&self) -> ExportRow {
        ExportRow {
            columns: MATERIAL_EXPORT_COLUMNS,
            cells: vec![
                date_cell(&self.data),
                cell(&self.nota),
                cell(&self.texto_breve),
                cell(&self.acao),
                cell(&self.status_usuario),
                cell(&self.tipo_nota),
                cell(&self.instalacao),
                cell(&self.zona),
                cell(&self.lote),
                cell(&self.descricao_material),
                cell(&self.quantidade),
                cell(&self.serial),
                cell(&self.base_operacional),
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
