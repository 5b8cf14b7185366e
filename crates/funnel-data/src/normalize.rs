//! Normalization of the host's raw shapes into one row sequence

use funnel_core::{
    CategoricalData, CellValue, Coordinate, CoordinateIdentities, DataView, FunnelError, Identity,
    IdentityProvider, TableData,
};
use tracing::{debug, warn};

use crate::config::NullConfig;

/// Label used when a category cell is empty
pub const BLANK_LABEL: &str = "(Blank)";

/// Separator between joined hierarchy levels of a stage label
pub const STAGE_LABEL_SEPARATOR: &str = " / ";

/// One normalized input record
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub stage: String,
    pub legend: Option<String>,
    pub value: f64,
    /// Index of the source record (or measure column) this row came from
    pub source_index: usize,
    pub identity: Option<Identity>,
}

impl Row {
    /// Legend key of the row; rows without a legend label use their stage
    pub fn legend_key(&self) -> &str {
        self.legend.as_deref().unwrap_or(&self.stage)
    }
}

/// Counts of value cells that had to be coerced to zero
#[derive(Debug, Default)]
struct Coercions {
    unreadable: usize,
    negative: usize,
}

/// Converts any [`DataView`] into rows
pub struct Normalizer<P = CoordinateIdentities> {
    provider: P,
    nulls: NullConfig,
}

impl Default for Normalizer<CoordinateIdentities> {
    fn default() -> Self {
        Self::new(CoordinateIdentities)
    }
}

/// Normalize with coordinate-derived identities and default null handling
pub fn normalize(view: &DataView) -> Result<Vec<Row>, FunnelError> {
    Normalizer::default().normalize(view)
}

impl<P: IdentityProvider> Normalizer<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            nulls: NullConfig::default(),
        }
    }

    pub fn with_nulls(mut self, nulls: NullConfig) -> Self {
        self.nulls = nulls;
        self
    }

    /// Produce the ordered row sequence for a view
    pub fn normalize(&self, view: &DataView) -> Result<Vec<Row>, FunnelError> {
        let mut coercions = Coercions::default();
        let rows = match view {
            DataView::Categorical(data) if data.categories.is_empty() => {
                self.from_measures(data, &mut coercions)?
            }
            DataView::Categorical(data) => self.from_categories(data, &mut coercions)?,
            DataView::Table(table) => self.from_table(table, &mut coercions)?,
        };

        if coercions.unreadable > 0 || coercions.negative > 0 {
            warn!(
                "Coerced {} unreadable and {} negative values to 0",
                coercions.unreadable, coercions.negative
            );
        }
        debug!("Normalized {} rows", rows.len());
        Ok(rows)
    }

    fn coerce(&self, cell: Option<&CellValue>, coercions: &mut Coercions) -> f64 {
        match cell.and_then(|c| self.nulls.numeric_value(c)) {
            Some(v) if v < 0.0 => {
                coercions.negative += 1;
                0.0
            }
            Some(v) => v,
            None => {
                coercions.unreadable += 1;
                0.0
            }
        }
    }

    fn label(&self, cell: Option<&CellValue>) -> String {
        cell.and_then(|c| self.nulls.label(c))
            .unwrap_or_else(|| BLANK_LABEL.to_string())
    }

    /// Each measure column becomes a stage of its own
    fn from_measures(&self, data: &CategoricalData, coercions: &mut Coercions) -> Result<Vec<Row>, FunnelError> {
        if data.values.is_empty() {
            return Err(FunnelError::missing("no category or value columns"));
        }
        if data.values.iter().all(|column| column.values.is_empty()) {
            return Err(FunnelError::missing("value columns have no rows"));
        }

        Ok(data
            .values
            .iter()
            .enumerate()
            .map(|(index, column)| Row {
                stage: column.name.clone(),
                legend: None,
                value: column
                    .values
                    .iter()
                    .map(|cell| self.coerce(Some(cell), coercions))
                    .sum(),
                source_index: index,
                identity: self.provider.identity_for(Coordinate::Measure(index)),
            })
            .collect())
    }

    fn from_categories(&self, data: &CategoricalData, coercions: &mut Coercions) -> Result<Vec<Row>, FunnelError> {
        let value_column = data
            .values
            .first()
            .ok_or_else(|| FunnelError::missing("no value column"))?;
        if value_column.values.is_empty() {
            return Err(FunnelError::missing(format!("value column '{}' has no rows", value_column.name)));
        }

        let record_count = data.categories[0].values.len();
        if record_count == 0 {
            return Err(FunnelError::missing("category column has no rows"));
        }

        let has_legend = data.categories.len() > 1;
        let mut rows = Vec::with_capacity(record_count);

        for index in 0..record_count {
            // Every category column except the legend one contributes to the stage label
            let stage = data
                .categories
                .iter()
                .enumerate()
                .filter(|(column, _)| *column != 1)
                .map(|(_, category)| self.label(category.values.get(index)))
                .collect::<Vec<_>>()
                .join(STAGE_LABEL_SEPARATOR);

            let legend = has_legend.then(|| self.label(data.categories[1].values.get(index)));
            let identity = self.provider.identity_for(Coordinate::Category {
                stage: &stage,
                legend: legend.as_deref(),
            });

            rows.push(Row {
                value: self.coerce(value_column.values.get(index), coercions),
                stage,
                legend,
                source_index: index,
                identity,
            });
        }

        Ok(rows)
    }

    /// Each table row becomes a stage labeled by its index
    fn from_table(&self, table: &TableData, coercions: &mut Coercions) -> Result<Vec<Row>, FunnelError> {
        if table.rows.is_empty() {
            return Err(FunnelError::missing("table has no rows"));
        }

        let width = table.rows.iter().map(|row| row.len()).max().unwrap_or(0);
        let value_index = (0..width)
            .find(|&column| {
                table
                    .rows
                    .iter()
                    .any(|row| row.get(column).and_then(|c| self.nulls.numeric_value(c)).is_some())
            })
            .ok_or_else(|| FunnelError::missing("table has no numeric column"))?;

        let legend = table
            .columns
            .get(value_index)
            .cloned()
            .unwrap_or_else(|| "Value".to_string());

        Ok(table
            .rows
            .iter()
            .enumerate()
            .map(|(index, row)| Row {
                stage: index.to_string(),
                legend: Some(legend.clone()),
                value: self.coerce(row.get(value_index), coercions),
                source_index: index,
                identity: self.provider.identity_for(Coordinate::TableRow(index)),
            })
            .collect())
    }
}
