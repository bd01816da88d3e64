//! Closed record schemas for the two resources.
//!
//! The API returns loosely-typed JSON objects keyed by Portuguese column
//! names. Each resource gets one explicit struct that names every field it
//! reads; missing keys, `null` and empty strings all decode to `None`.
//! Numbers keep their kind as [`Scalar::Number`] so the export can write
//! numeric cells; booleans become text.

use std::fmt;
use std::ops::Deref;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::CoreError;
use crate::resource::Resource;
use crate::shape::{DisplayRow, ExportRow};

// ---------------------------------------------------------------------------
// Schema trait
// ---------------------------------------------------------------------------

/// A record type bound to one [`Resource`], with its display and export
/// shaping.
pub trait RecordSchema: DeserializeOwned + Send + Sync + 'static {
    const RESOURCE: Resource;

    fn display_row(&self) -> DisplayRow;

    fn export_row(&self) -> ExportRow;
}

/// Decode raw API values into typed records, preserving order.
///
/// Fails on the first element that is not a JSON object.
pub fn decode_records<R: RecordSchema>(values: Vec<Value>) -> Result<Vec<R>, CoreError> {
    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            if !value.is_object() {
                return Err(CoreError::InvalidRecord {
                    index,
                    reason: format!("expected a JSON object, got {}", json_type_name(&value)),
                });
            }
            serde_json::from_value(value).map_err(|e| CoreError::InvalidRecord {
                index,
                reason: e.to_string(),
            })
        })
        .collect()
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ---------------------------------------------------------------------------
// Field decoding
// ---------------------------------------------------------------------------

/// A decoded field value: text, or a JSON number kept in its wire form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scalar {
    Text(String),
    Number(String),
}

impl Scalar {
    pub fn as_str(&self) -> &str {
        match self {
            Scalar::Text(s) | Scalar::Number(s) => s,
        }
    }

    /// Numeric value, for number fields only.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Scalar::Number(s) => s.parse().ok(),
            Scalar::Text(_) => None,
        }
    }
}

impl Deref for Scalar {
    type Target = str;

    fn deref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scalar form of a JSON value. `null` and `""` are absent.
pub fn value_to_scalar(value: Value) -> Option<Scalar> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(Scalar::Text(s)),
        Value::Number(n) => Some(Scalar::Number(n.to_string())),
        Value::Bool(b) => Some(Scalar::Text(b.to_string())),
        other => Some(Scalar::Text(other.to_string())),
    }
}

fn scalar_field<'de, D>(deserializer: D) -> Result<Option<Scalar>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(value_to_scalar))
}

// ---------------------------------------------------------------------------
// Equipment
// ---------------------------------------------------------------------------

/// One equipment install/removal record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EquipmentRecord {
    #[serde(rename = "Instalação", default, deserialize_with = "scalar_field")]
    pub instalacao: Option<Scalar>,
    #[serde(rename = "Nota", default, deserialize_with = "scalar_field")]
    pub nota: Option<Scalar>,
    #[serde(rename = "Cliente", default, deserialize_with = "scalar_field")]
    pub cliente: Option<Scalar>,
    #[serde(rename = "Texto breve para o code", default, deserialize_with = "scalar_field")]
    pub texto_breve: Option<Scalar>,
    #[serde(rename = "Alavanca", default, deserialize_with = "scalar_field")]
    pub alavanca: Option<Scalar>,
    #[serde(rename = "Data Conclusão", default, deserialize_with = "scalar_field")]
    pub data_conclusao: Option<Scalar>,
    #[serde(rename = "Equipamento Removido", default, deserialize_with = "scalar_field")]
    pub equipamento_removido: Option<Scalar>,
    #[serde(rename = "Equipamento Instalado", default, deserialize_with = "scalar_field")]
    pub equipamento_instalado: Option<Scalar>,
    #[serde(rename = "Status", default, deserialize_with = "scalar_field")]
    pub status: Option<Scalar>,
}

// ---------------------------------------------------------------------------
// Material
// ---------------------------------------------------------------------------

/// One material movement record.
///
/// `Descrição` (shown on screen) and `Descricao` (material description) are
/// distinct API columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MaterialRecord {
    #[serde(rename = "Data", default, deserialize_with = "scalar_field")]
    pub data: Option<Scalar>,
    #[serde(rename = "Nota", default, deserialize_with = "scalar_field")]
    pub nota: Option<Scalar>,
    #[serde(rename = "Descrição", default, deserialize_with = "scalar_field")]
    pub descricao_nota: Option<Scalar>,
    #[serde(rename = "Texto Breve", default, deserialize_with = "scalar_field")]
    pub texto_breve: Option<Scalar>,
    #[serde(rename = "Acao", default, deserialize_with = "scalar_field")]
    pub acao: Option<Scalar>,
    #[serde(rename = "Status do Usuário", default, deserialize_with = "scalar_field")]
    pub status_usuario: Option<Scalar>,
    #[serde(rename = "Tipo de nota", default, deserialize_with = "scalar_field")]
    pub tipo_nota: Option<Scalar>,
    #[serde(rename = "Instalação", default, deserialize_with = "scalar_field")]
    pub instalacao: Option<Scalar>,
    #[serde(rename = "Zona", default, deserialize_with = "scalar_field")]
    pub zona: Option<Scalar>,
    #[serde(rename = "Lote", default, deserialize_with = "scalar_field")]
    pub lote: Option<Scalar>,
    #[serde(rename = "Descricao", default, deserialize_with = "scalar_field")]
    pub descricao_material: Option<Scalar>,
    #[serde(rename = "Quantidade", default, deserialize_with = "scalar_field")]
    pub quantidade: Option<Scalar>,
    #[serde(rename = "Serial", default, deserialize_with = "scalar_field")]
    pub serial: Option<Scalar>,
    #[serde(rename = "Base Operacional", default, deserialize_with = "scalar_field")]
    pub base_operacional: Option<Scalar>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
