//! Grouping of normalized rows into funnel stages

use std::cmp::Ordering;

use funnel_core::{FunnelError, Identity};
use indexmap::{IndexMap, IndexSet};
use tracing::{debug, info};

use crate::config::SegmentOrder;
use crate::normalize::Row;

/// Portion of a stage attributable to one legend category
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub legend: String,
    pub value: f64,
    pub identity: Option<Identity>,
    /// First source record that contributed to the segment
    pub source_index: usize,
}

/// One step of the funnel
#[derive(Debug, Clone, PartialEq)]
pub struct Stage {
    pub label: String,
    pub segments: Vec<Segment>,
    total: f64,
}

impl Stage {
    /// Sum of segment values
    pub fn total(&self) -> f64 {
        self.total
    }
}

/// Aggregated funnel ready for rate computation and layout
#[derive(Debug, Clone, PartialEq)]
pub struct FunnelDataset {
    stages: Vec<Stage>,
    legend_categories: Vec<String>,
    max_total: f64,
}

impl FunnelDataset {
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Distinct legend keys in first-seen order
    pub fn legend_categories(&self) -> &[String] {
        &self.legend_categories
    }

    pub fn max_total(&self) -> f64 {
        self.max_total
    }

    pub fn totals(&self) -> Vec<f64> {
        self.stages.iter().map(Stage::total).collect()
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    pub fn segment(&self, stage: usize, segment: usize) -> Option<&Segment> {
        self.stages.get(stage)?.segments.get(segment)
    }

    /// Identities of every segment carrying the given legend key
    pub fn legend_identities(&self, legend: &str) -> Vec<Identity> {
        self.stages
            .iter()
            .flat_map(|stage| stage.segments.iter())
            .filter(|segment| segment.legend == legend)
            .filter_map(|segment| segment.identity.clone())
            .collect()
    }
}

#[derive(Debug)]
struct SegmentBuilder {
    value: f64,
    identity: Option<Identity>,
    source_index: usize,
}

/// Group rows by stage (first-seen order), then by legend key, summing values
pub fn aggregate(rows: &[Row], order: SegmentOrder) -> Result<FunnelDataset, FunnelError> {
    if rows.is_empty() {
        return Err(FunnelError::missing("no rows to aggregate"));
    }

    let mut grouped: IndexMap<&str, IndexMap<&str, SegmentBuilder>> = IndexMap::new();
    let mut legend_categories: IndexSet<&str> = IndexSet::new();

    for row in rows {
        let legend = row.legend_key();
        legend_categories.insert(legend);

        let segment = grouped
            .entry(row.stage.as_str())
            .or_default()
            .entry(legend)
            .or_insert_with(|| SegmentBuilder {
                value: 0.0,
                identity: row.identity.clone(),
                source_index: row.source_index,
            });
        segment.value += row.value;
    }

    let stages: Vec<Stage> = grouped
        .into_iter()
        .map(|(label, segments)| {
            let mut segments: Vec<Segment> = segments
                .into_iter()
                .map(|(legend, builder)| Segment {
                    legend: legend.to_string(),
                    value: builder.value,
                    identity: builder.identity,
                    source_index: builder.source_index,
                })
                .collect();

            if order == SegmentOrder::Descending {
                segments.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(Ordering::Equal));
            }

            let total = segments.iter().map(|s| s.value).sum();
            debug!("Stage '{}': {} segments, total {}", label, segments.len(), total);
            Stage {
                label: label.to_string(),
                segments,
                total,
            }
        })
        .collect();

    let max_total = stages.iter().map(Stage::total).fold(0.0, f64::max);

    info!(
        "Aggregated {} rows into {} stages and {} legend categories",
        rows.len(),
        stages.len(),
        legend_categories.len()
    );

    Ok(FunnelDataset {
        stages,
        legend_categories: legend_categories.into_iter().map(str::to_string).collect(),
        max_total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(stage: &str, legend: Option<&str>, value: f64, index: usize) -> Row {
        Row {
            stage: stage.to_string(),
            legend: legend.map(str::to_string),
            value,
            source_index: index,
            identity: Some(Identity::new(format!("{}|{}", stage, legend.unwrap_or("")))),
        }
    }

    #[test]
    fn test_scenario_single_legend() {
        let rows = vec![
            row("Awareness", None, 1000.0, 0),
            row("Consideration", None, 400.0, 1),
            row("Purchase", None, 100.0, 2),
        ];
        let dataset = aggregate(&rows, SegmentOrder::Insertion).unwrap();

        let labels: Vec<&str> = dataset.stages().iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["Awareness", "Consideration", "Purchase"]);
        assert_eq!(dataset.totals(), vec![1000.0, 400.0, 100.0]);
        assert_eq!(dataset.max_total(), 1000.0);
    }

    #[test]
    fn test_scenario_two_legends_one_stage() {
        let rows = vec![row("Signup", Some("US"), 300.0, 0), row("Signup", Some("EU"), 200.0, 1)];
        let dataset = aggregate(&rows, SegmentOrder::Insertion).unwrap();

        assert_eq!(dataset.stage_count(), 1);
        let stage = &dataset.stages()[0];
        assert_eq!(stage.segments.len(), 2);
        assert_eq!(stage.total(), 500.0);
        assert_eq!(dataset.legend_categories(), &["US".to_string(), "EU".to_string()]);
    }

    #[test]
    fn test_non_contiguous_stage_merges_at_first_position() {
        let rows = vec![
            row("A", Some("x"), 1.0, 0),
            row("B", Some("x"), 2.0, 1),
            row("A", Some("y"), 3.0, 2),
            row("A", Some("x"), 4.0, 3),
        ];
        let dataset = aggregate(&rows, SegmentOrder::Insertion).unwrap();

        assert_eq!(dataset.stage_count(), 2);
        let a = &dataset.stages()[0];
        assert_eq!(a.label, "A");
        assert_eq!(a.segments[0].legend, "x");
        assert_eq!(a.segments[0].value, 5.0);
        assert_eq!(a.segments[0].source_index, 0);
        assert_eq!(a.segments[1].value, 3.0);
    }

    #[test]
    fn test_conservation_and_max_total() {
        let rows: Vec<Row> = (0..40)
            .map(|i| {
                let stage = format!("S{}", i % 7);
                let legend = format!("L{}", i % 3);
                row(&stage, Some(&legend), (i as f64) * 0.25, i)
            })
            .collect();
        let dataset = aggregate(&rows, SegmentOrder::Insertion).unwrap();

        let row_sum: f64 = rows.iter().map(|r| r.value).sum();
        let stage_sum: f64 = dataset.totals().iter().sum();
        assert!((row_sum - stage_sum).abs() < 1e-9);

        for stage in dataset.stages() {
            assert!(dataset.max_total() >= stage.total());
            let segment_sum: f64 = stage.segments.iter().map(|s| s.value).sum();
            assert_eq!(segment_sum, stage.total());
        }
    }

    #[test]
    fn test_descending_order() {
        let rows = vec![
            row("A", Some("small"), 1.0, 0),
            row("A", Some("big"), 9.0, 1),
            row("A", Some("tie"), 1.0, 2),
        ];
        let dataset = aggregate(&rows, SegmentOrder::Descending).unwrap();
        let legends: Vec<&str> = dataset.stages()[0].segments.iter().map(|s| s.legend.as_str()).collect();
        assert_eq!(legends, vec!["big", "small", "tie"]);
        // Legend categories keep first-seen order regardless of segment order
        assert_eq!(dataset.legend_categories()[0], "small");
    }

    #[test]
    fn test_legend_identities() {
        let rows = vec![
            row("A", Some("x"), 1.0, 0),
            row("B", Some("x"), 1.0, 1),
            row("B", Some("y"), 1.0, 2),
        ];
        let dataset = aggregate(&rows, SegmentOrder::Insertion).unwrap();
        assert_eq!(dataset.legend_identities("x").len(), 2);
        assert_eq!(dataset.legend_identities("z").len(), 0);
    }

    #[test]
    fn test_empty_rows() {
        assert!(matches!(
            aggregate(&[], SegmentOrder::Insertion),
            Err(FunnelError::MissingData(_))
        ));
    }
}
