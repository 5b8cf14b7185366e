//! Funnel data source implementations

pub mod batch_source;
pub mod csv_source;

pub use batch_source::RecordBatchSource;
pub use csv_source::CsvSource;

use funnel_core::{DataView, FunnelSource};

/// Which named columns feed the stage/legend and value roles
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColumnRoles {
    /// Stage column first, then the legend column, then extra stage levels
    pub categories: Vec<String>,
    /// Value column first; with no categories every entry is a measure
    pub values: Vec<String>,
}

impl ColumnRoles {
    pub fn new(categories: Vec<String>, values: Vec<String>) -> Self {
        Self { categories, values }
    }
}

/// A view the host has already materialized
pub struct StaticSource {
    name: String,
    view: DataView,
}

impl StaticSource {
    pub fn new(name: impl Into<String>, view: DataView) -> Self {
        Self {
            name: name.into(),
            view,
        }
    }
}

#[async_trait::async_trait]
impl FunnelSource for StaticSource {
    async fn data_view(&self) -> anyhow::Result<DataView> {
        Ok(self.view.clone())
    }

    async fn row_count(&self) -> anyhow::Result<usize> {
        Ok(self.view.row_count())
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}
