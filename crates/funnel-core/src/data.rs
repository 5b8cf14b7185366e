//! Raw input shapes handed over by a host data source

use serde::{Deserialize, Serialize};

/// One cell of host data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Display form used for stage and legend labels
    pub fn as_label(&self) -> Option<String> {
        match self {
            CellValue::Null => None,
            CellValue::Text(s) => Some(s.clone()),
            CellValue::Number(n) => Some(format_number(*n)),
        }
    }

    /// Whether the cell holds a usable number, either directly or as text
    pub fn is_numeric(&self) -> bool {
        match self {
            CellValue::Null => false,
            CellValue::Number(n) => n.is_finite(),
            CellValue::Text(s) => s.trim().parse::<f64>().map(|v| v.is_finite()).unwrap_or(false),
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

/// Integral values print without a fractional part
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// A grouping column (stage, legend, or extra hierarchy level)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryColumn {
    pub name: String,
    pub values: Vec<CellValue>,
}

/// A measure column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueColumn {
    pub name: String,
    pub values: Vec<CellValue>,
}

/// Parallel column arrays
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CategoricalData {
    #[serde(default)]
    pub categories: Vec<CategoryColumn>,
    #[serde(default)]
    pub values: Vec<ValueColumn>,
}

/// Row-oriented records
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableData {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

/// Data for one update, in whichever shape the host delivers it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum DataView {
    Categorical(CategoricalData),
    Table(TableData),
}

impl DataView {
    /// Number of source records
    pub fn row_count(&self) -> usize {
        match self {
            DataView::Categorical(data) => data
                .categories
                .first()
                .map(|c| c.values.len())
                .or_else(|| data.values.iter().map(|v| v.values.len()).max())
                .unwrap_or(0),
            DataView::Table(table) => table.rows.len(),
        }
    }
}

/// Trait for funnel data sources
#[async_trait::async_trait]
pub trait FunnelSource: Send + Sync {
    /// Materialize the data for one update
    async fn data_view(&self) -> anyhow::Result<DataView>;

    /// Get total row count
    async fn row_count(&self) -> anyhow::Result<usize>;

    /// Get the source name/path
    fn source_name(&self) -> &str;
}
