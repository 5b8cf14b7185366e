use arrow::array::{Array, ArrayRef, Float64Array};
use arrow::datatypes::DataType;
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use funnel_core::{CategoricalData, CategoryColumn, CellValue, DataView, FunnelSource, TableData, ValueColumn};
use tracing::debug;

use crate::sources::ColumnRoles;
use crate::DataError;

/// Funnel source over an Arrow record batch.
///
/// Without roles the batch is handed over as a plain table; with roles the
/// named columns form a categorical view.
pub struct RecordBatchSource {
    name: String,
    batch: RecordBatch,
    roles: Option<ColumnRoles>,
}

impl RecordBatchSource {
    pub fn new(name: impl Into<String>, batch: RecordBatch) -> Self {
        Self {
            name: name.into(),
            batch,
            roles: None,
        }
    }

    pub fn with_roles(mut self, roles: ColumnRoles) -> Self {
        self.roles = Some(roles);
        self
    }

    fn column(&self, name: &str) -> Result<&ArrayRef, DataError> {
        self.batch
            .column_by_name(name)
            .ok_or_else(|| DataError::ColumnNotFound(name.to_string()))
    }

    /// Build the view for the current batch
    pub fn to_view(&self) -> Result<DataView, DataError> {
        match &self.roles {
            None => {
                let columns = self
                    .batch
                    .schema()
                    .fields()
                    .iter()
                    .map(|f| f.name().clone())
                    .collect();
                let cells = self
                    .batch
                    .columns()
                    .iter()
                    .map(array_cells)
                    .collect::<Result<Vec<_>, _>>()?;
                let rows = (0..self.batch.num_rows())
                    .map(|row| cells.iter().map(|column| column[row].clone()).collect())
                    .collect();
                debug!("Record batch '{}' handed over as a {} row table", self.name, self.batch.num_rows());
                Ok(DataView::Table(TableData { columns, rows }))
            }
            Some(roles) => {
                let categories = roles
                    .categories
                    .iter()
                    .map(|name| {
                        Ok(CategoryColumn {
                            name: name.clone(),
                            values: array_cells(self.column(name)?)?,
                        })
                    })
                    .collect::<Result<Vec<_>, DataError>>()?;
                let values = roles
                    .values
                    .iter()
                    .map(|name| {
                        Ok(ValueColumn {
                            name: name.clone(),
                            values: array_cells(self.column(name)?)?,
                        })
                    })
                    .collect::<Result<Vec<_>, DataError>>()?;
                Ok(DataView::Categorical(CategoricalData { categories, values }))
            }
        }
    }
}

/// Numeric arrays become numbers, everything else its display string
fn array_cells(array: &ArrayRef) -> Result<Vec<CellValue>, DataError> {
    if array.data_type().is_numeric() {
        let cast = arrow::compute::cast(array, &DataType::Float64)?;
        let floats = cast
            .as_any()
            .downcast_ref::<Float64Array>()
            .ok_or_else(|| ArrowError::CastError("expected a Float64 array after cast".to_string()))?;
        return Ok((0..floats.len())
            .map(|i| {
                if floats.is_null(i) {
                    CellValue::Null
                } else {
                    CellValue::Number(floats.value(i))
                }
            })
            .collect());
    }

    (0..array.len())
        .map(|i| {
            if array.is_null(i) {
                Ok(CellValue::Null)
            } else {
                Ok(CellValue::Text(arrow::util::display::array_value_to_string(array, i)?))
            }
        })
        .collect()
}

#[async_trait]
impl FunnelSource for RecordBatchSource {
    async fn data_view(&self) -> anyhow::Result<DataView> {
        Ok(self.to_view()?)
    }

    async fn row_count(&self) -> anyhow::Result<usize> {
        Ok(self.batch.num_rows())
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}
