use std::collections::HashSet;

use crate::config::NullConfig;
use crate::sources::ColumnRoles;

/// Schema detector for deciding which columns can feed a funnel
pub struct SchemaDetector {
    sample_size: usize,
    nulls: NullConfig,
}

/// Broad kind of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Every non-null sample parses as a number
    Numeric,
    Text,
}

/// Statistics about a column
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStats {
    pub null_count: usize,
    pub distinct_count: usize,
}

/// Detected column
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub name: String,
    pub kind: ColumnKind,
    pub stats: ColumnStats,
}

/// Information about a detected schema
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaInfo {
    pub columns: Vec<ColumnInfo>,
}

impl SchemaInfo {
    /// Text columns become category columns in order; the first numeric
    /// column becomes the value column
    pub fn suggested_roles(&self) -> ColumnRoles {
        let categories = self
            .columns
            .iter()
            .filter(|c| c.kind == ColumnKind::Text)
            .map(|c| c.name.clone())
            .collect();
        let values = self
            .columns
            .iter()
            .find(|c| c.kind == ColumnKind::Numeric)
            .map(|c| vec![c.name.clone()])
            .unwrap_or_default();
        ColumnRoles::new(categories, values)
    }

    pub fn column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.name == name)
    }
}

impl SchemaDetector {
    /// Create a new schema detector
    pub fn new() -> Self {
        Self {
            sample_size: 1000,
            nulls: NullConfig::default(),
        }
    }

    /// Set the sample size for detection
    pub fn with_sample_size(mut self, size: usize) -> Self {
        self.sample_size = size;
        self
    }

    pub fn with_nulls(mut self, nulls: NullConfig) -> Self {
        self.nulls = nulls;
        self
    }

    /// Detect schema from sample data
    pub fn detect_from_samples(&self, headers: &[String], samples: &[Vec<String>]) -> SchemaInfo {
        let samples = &samples[..samples.len().min(self.sample_size)];
        let columns = headers
            .iter()
            .enumerate()
            .map(|(col_idx, header)| {
                let (kind, stats) = self.analyze_column(samples, col_idx);
                ColumnInfo {
                    name: header.clone(),
                    kind,
                    stats,
                }
            })
            .collect();

        SchemaInfo { columns }
    }

    /// Analyze a single column
    fn analyze_column(&self, samples: &[Vec<String>], col_idx: usize) -> (ColumnKind, ColumnStats) {
        let mut null_count = 0;
        let mut distinct = HashSet::new();
        let mut is_numeric = true;

        for row in samples {
            match row.get(col_idx) {
                Some(value) if !self.nulls.is_null(value) => {
                    if is_numeric && value.trim().parse::<f64>().is_err() {
                        is_numeric = false;
                    }
                    distinct.insert(value.as_str());
                }
                _ => null_count += 1,
            }
        }

        // An all-null column carries no numbers
        let kind = if is_numeric && !distinct.is_empty() {
            ColumnKind::Numeric
        } else {
            ColumnKind::Text
        };

        (
            kind,
            ColumnStats {
                null_count,
                distinct_count: distinct.len(),
            },
        )
    }
}

impl Default for SchemaDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_detect_kinds() {
        let headers = strings(&["Phase", "City", "Users", "Empty"]);
        let samples = vec![
            strings(&["Signup", "US", "300", ""]),
            strings(&["Signup", "EU", "N/A", ""]),
            strings(&["Trial", "US", "120.5", ""]),
        ];
        let info = SchemaDetector::new().detect_from_samples(&headers, &samples);

        assert_eq!(info.column("Phase").unwrap().kind, ColumnKind::Text);
        assert_eq!(info.column("Users").unwrap().kind, ColumnKind::Numeric);
        assert_eq!(info.column("Users").unwrap().stats.null_count, 1);
        assert_eq!(info.column("City").unwrap().stats.distinct_count, 2);
        assert_eq!(info.column("Empty").unwrap().kind, ColumnKind::Text);
    }

    #[test]
    fn test_suggested_roles() {
        let headers = strings(&["Phase", "Users", "City", "Revenue"]);
        let samples = vec![strings(&["Signup", "3", "US", "9.5"])];
        let roles = SchemaDetector::new().detect_from_samples(&headers, &samples).suggested_roles();

        assert_eq!(roles.categories, strings(&["Phase", "City"]));
        assert_eq!(roles.values, strings(&["Users"]));
    }

    #[test]
    fn test_sample_size_limits_rows() {
        let headers = strings(&["Code"]);
        let samples = vec![strings(&["1"]), strings(&["2"]), strings(&["x"])];
        let info = SchemaDetector::new()
            .with_sample_size(2)
            .detect_from_samples(&headers, &samples);
        assert_eq!(info.columns[0].kind, ColumnKind::Numeric);
    }
}
