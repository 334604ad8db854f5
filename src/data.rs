//! Host data snapshot.
//!
//! Mirrors the JSON a dashboard host hands a visual on every update: column
//! metadata carrying role flags, plus the categorical payload split into
//! category columns and aggregate (measure/highlight) series.

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataView {
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub categorical: Option<Categorical>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default)]
    pub columns: Vec<ColumnMetadata>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMetadata {
    pub display_name: String,
    #[serde(default)]
    pub roles: BTreeMap<String, bool>,
    #[serde(default)]
    pub is_measure: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Categorical {
    /// `None` when the host sent no category array at all.
    #[serde(default)]
    pub categories: Option<Vec<CategoryColumn>>,
    #[serde(default)]
    pub values: Vec<ValueColumn>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSource {
    pub display_name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryColumn {
    pub source: ColumnSource,
    #[serde(default)]
    pub values: Vec<Value>,
}

/// An aggregate series. `highlights` is present when the host filters
/// cross-visual; the raw `values` stay authoritative for projection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueColumn {
    pub source: ColumnSource,
    #[serde(default)]
    pub values: Vec<Value>,
    #[serde(default)]
    pub highlights: Option<Vec<Value>>,
}

impl DataView {
    pub fn from_json(input: &str) -> serde_json::Result<Self> {
        serde_json::from_str(input)
    }

    /// Category columns, or nothing when the snapshot is not categorical.
    pub fn categories(&self) -> &[CategoryColumn] {
        self.categorical
            .as_ref()
            .and_then(|c| c.categories.as_deref())
            .unwrap_or(&[])
    }

    /// Whether the snapshot carries a category array, possibly empty.
    pub fn has_categories(&self) -> bool {
        self.categorical
            .as_ref()
            .is_some_and(|c| c.categories.is_some())
    }

    pub fn value_series(&self) -> &[ValueColumn] {
        self.categorical
            .as_ref()
            .map(|c| c.values.as_slice())
            .unwrap_or(&[])
    }

    pub fn row_count(&self) -> usize {
        self.categories()
            .iter()
            .map(|c| c.values.len())
            .chain(self.value_series().iter().map(|v| v.values.len()))
            .max()
            .unwrap_or(0)
    }
}

/// Text form of a cell; `None` only for a missing cell.
pub fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(number_text(n)),
        other => Some(other.to_string()),
    }
}

fn number_text(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}
