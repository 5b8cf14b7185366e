//! Null value handling and numeric coercion for value cells

use funnel_core::CellValue;
use serde::{Deserialize, Serialize};

/// Null value configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NullConfig {
    /// Patterns to treat as null
    pub patterns: Vec<String>,

    /// Whether to trim whitespace before checking
    pub trim_whitespace: bool,

    /// Case sensitive matching
    pub case_sensitive: bool,
}

impl Default for NullConfig {
    fn default() -> Self {
        Self {
            patterns: vec![
                String::new(), // Empty string
                "-".to_string(),
                "N/A".to_string(),
                "null".to_string(),
                "None".to_string(),
            ],
            trim_whitespace: true,
            case_sensitive: false,
        }
    }
}

impl NullConfig {
    /// Check if a value should be treated as null
    pub fn is_null(&self, value: &str) -> bool {
        let test_value = if self.trim_whitespace { value.trim() } else { value };

        self.patterns.iter().any(|pattern| {
            if self.case_sensitive {
                test_value == pattern
            } else {
                test_value.eq_ignore_ascii_case(pattern)
            }
        })
    }

    /// Add a null pattern
    pub fn add_pattern(&mut self, pattern: String) {
        if !self.patterns.contains(&pattern) {
            self.patterns.push(pattern);
        }
    }

    /// Numeric reading of a value cell. `None` for nulls, unparseable text
    /// and non-finite numbers.
    pub fn numeric_value(&self, cell: &CellValue) -> Option<f64> {
        let value = match cell {
            CellValue::Null => return None,
            CellValue::Number(n) => *n,
            CellValue::Text(s) => {
                if self.is_null(s) {
                    return None;
                }
                s.trim().parse::<f64>().ok()?
            }
        };
        value.is_finite().then_some(value)
    }

    /// Label reading of a category cell. Null-like text yields `None`.
    pub fn label(&self, cell: &CellValue) -> Option<String> {
        match cell {
            CellValue::Text(s) if self.is_null(s) => None,
            other => other.as_label(),
        }
    }
}
