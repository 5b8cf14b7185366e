use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use csv::ReaderBuilder;
use funnel_core::{CategoricalData, CategoryColumn, CellValue, DataView, FunnelSource, ValueColumn};
use tracing::info;

use crate::config::NullConfig;
use crate::schema::{SchemaDetector, SchemaInfo};
use crate::sources::ColumnRoles;
use crate::DataError;

/// CSV file read fully into memory, with detected column roles
pub struct CsvSource {
    /// Path (or name) of the CSV data
    path: PathBuf,
    headers: Vec<String>,
    records: Vec<Vec<String>>,
    /// Detected schema
    pub schema: SchemaInfo,
    roles: ColumnRoles,
    nulls: NullConfig,
}

impl CsvSource {
    /// Load a CSV file. The read happens on a blocking task.
    pub async fn new(path: PathBuf) -> Result<Self, DataError> {
        tokio::task::spawn_blocking(move || {
            let file = File::open(&path)?;
            Self::from_reader(path, BufReader::new(file))
        })
        .await?
    }

    /// Parse CSV data from any reader
    pub fn from_reader(path: impl AsRef<Path>, reader: impl Read) -> Result<Self, DataError> {
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader.headers()?.iter().map(|h| h.trim().to_string()).collect();
        let mut records = Vec::new();
        for result in csv_reader.records() {
            let record = result?;
            records.push(record.iter().map(|s| s.to_string()).collect::<Vec<_>>());
        }

        let nulls = NullConfig::default();
        let schema = SchemaDetector::new()
            .with_nulls(nulls.clone())
            .detect_from_samples(&headers, &records);
        let roles = schema.suggested_roles();

        info!(
            "Loaded {} rows from {} (categories {:?}, values {:?})",
            records.len(),
            path.as_ref().display(),
            roles.categories,
            roles.values
        );

        Ok(Self {
            path: path.as_ref().to_path_buf(),
            headers,
            records,
            schema,
            roles,
            nulls,
        })
    }

    /// Override the detected roles. Every named column must exist.
    pub fn with_roles(mut self, roles: ColumnRoles) -> Result<Self, DataError> {
        for name in roles.categories.iter().chain(roles.values.iter()) {
            if !self.headers.contains(name) {
                return Err(DataError::ColumnNotFound(name.clone()));
            }
        }
        self.roles = roles;
        Ok(self)
    }

    pub fn roles(&self) -> &ColumnRoles {
        &self.roles
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    fn cells(&self, name: &str, parse_numbers: bool) -> Vec<CellValue> {
        let Some(index) = self.column_index(name) else {
            return Vec::new();
        };

        self.records
            .iter()
            .map(|record| match record.get(index) {
                Some(raw) if self.nulls.is_null(raw) => CellValue::Null,
                Some(raw) => match raw.trim().parse::<f64>() {
                    Ok(number) if parse_numbers => CellValue::Number(number),
                    _ => CellValue::Text(raw.clone()),
                },
                None => CellValue::Null,
            })
            .collect()
    }

    /// Build the categorical view described by the current roles
    pub fn to_view(&self) -> DataView {
        let categories = self
            .roles
            .categories
            .iter()
            .map(|name| CategoryColumn {
                name: name.clone(),
                values: self.cells(name, false),
            })
            .collect();
        let values = self
            .roles
            .values
            .iter()
            .map(|name| ValueColumn {
                name: name.clone(),
                values: self.cells(name, true),
            })
            .collect();

        DataView::Categorical(CategoricalData { categories, values })
    }
}

#[async_trait]
impl FunnelSource for CsvSource {
    async fn data_view(&self) -> anyhow::Result<DataView> {
        Ok(self.to_view())
    }

    async fn row_count(&self) -> anyhow::Result<usize> {
        Ok(self.records.len())
    }

    fn source_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown.csv")
    }
}

// Tests
#[cfg(test)]
mod tests {
    use super::*;

    const FUNNEL_CSV: &str = "Phase,City,Users\n\
        Signup,US,300\n\
        Signup,EU,200\n\
        Trial,US,120\n\
        Trial,EU,n/a\n";

    #[test]
    fn test_detected_roles() {
        let source = CsvSource::from_reader("funnel.csv", FUNNEL_CSV.as_bytes()).unwrap();
        assert_eq!(source.roles().categories, vec!["Phase", "City"]);
        assert_eq!(source.roles().values, vec!["Users"]);
        assert_eq!(source.source_name(), "funnel.csv");

        match source.to_view() {
            DataView::Categorical(data) => {
                assert_eq!(data.categories.len(), 2);
                assert_eq!(data.values[0].values[0], CellValue::Number(300.0));
                assert_eq!(data.values[0].values[3], CellValue::Null);
            }
            DataView::Table(_) => panic!("expected categorical view"),
        }
    }

    #[test]
    fn test_role_override() {
        let source = CsvSource::from_reader("funnel.csv", FUNNEL_CSV.as_bytes()).unwrap();
        let source = source
            .with_roles(ColumnRoles::new(vec!["City".to_string()], vec!["Users".to_string()]))
            .unwrap();
        assert_eq!(source.roles().categories, vec!["City"]);

        let missing = CsvSource::from_reader("funnel.csv", FUNNEL_CSV.as_bytes())
            .unwrap()
            .with_roles(ColumnRoles::new(vec!["Country".to_string()], vec![]));
        assert!(matches!(missing, Err(DataError::ColumnNotFound(name)) if name == "Country"));
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("funnel_csv_source_{}.csv", std::process::id()));
        std::fs::write(&path, FUNNEL_CSV).unwrap();

        let source = CsvSource::new(path.clone()).await.unwrap();
        assert_eq!(source.row_count().await.unwrap(), 4);
        let view = source.data_view().await.unwrap();
        assert_eq!(view.row_count(), 4);

        std::fs::remove_file(path).ok();
    }

    #[tokio::test]
    async fn test_missing_file() {
        let result = CsvSource::new(PathBuf::from("/definitely/not/here.csv")).await;
        assert!(matches!(result, Err(DataError::Io(_))));
    }
}
