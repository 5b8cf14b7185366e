//! Responsive funnel layout
//!
//! All geometry is expressed in content coordinates with the origin at the
//! top-left of the visual. When the content outgrows the viewport the layout
//! reports which axes need scrolling together with the exact content size.

use egui::{pos2, vec2, Pos2, Rect, Vec2};
use funnel_core::FunnelError;
use funnel_data::config::{FunnelSettings, LegendPosition};
use funnel_data::FunnelDataset;
use tracing::debug;

/// Minimum width of the stage label column
pub const MIN_LABEL_WIDTH: f32 = 80.0;
/// Share of the viewport width given to the stage label column
pub const LABEL_WIDTH_RATIO: f32 = 0.15;
/// Gap between a stage label and the funnel column
pub const LABEL_PADDING: f32 = 10.0;
pub const TOP_MARGIN: f32 = 10.0;
pub const BOTTOM_MARGIN: f32 = 10.0;
/// Space between a horizontal legend and the bars
pub const LEGEND_SPACING: f32 = 20.0;
pub const MIN_FUNNEL_WIDTH: f32 = 100.0;
/// Segments at most this wide get no value label
pub const VALUE_LABEL_MIN_WIDTH: f32 = 30.0;
pub const LEGEND_ITEM_WIDTH: f32 = 120.0;
pub const LEGEND_ITEM_SPACING: f32 = 10.0;
pub const LEGEND_SWATCH_SIZE: f32 = 20.0;
pub const LEGEND_SWATCH_RADIUS: f32 = 3.0;
pub const LEGEND_TEXT_OFFSET: f32 = 5.0;

/// Bar height and gap chosen for the available height
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarSizing {
    pub bar_height: f32,
    pub gap: f32,
}

impl BarSizing {
    /// Height of `count` bars with their gaps
    pub fn total_height(&self, count: usize) -> f32 {
        if count == 0 {
            return 0.0;
        }
        count as f32 * self.bar_height + (count - 1) as f32 * self.gap
    }
}

/// Fit `count` bars into `available` height.
///
/// Bars take an even share of the height after the configured gaps. If that
/// share is below `min_bar_height`, bars are pinned to the minimum and the gap
/// shrinks instead, never below `min_gap`. What still does not fit overflows
/// and is left to scrolling.
pub fn size_bars(available: f32, count: usize, gap: f32, min_bar_height: f32, min_gap: f32) -> BarSizing {
    if count == 0 {
        return BarSizing {
            bar_height: min_bar_height,
            gap,
        };
    }

    let n = count as f32;
    let share = ((available - (n - 1.0) * gap) / n).floor();
    if share >= min_bar_height {
        return BarSizing { bar_height: share, gap };
    }

    let gap = if count > 1 {
        ((available - n * min_bar_height) / (n - 1.0)).floor().max(min_gap)
    } else {
        gap
    };
    BarSizing {
        bar_height: min_bar_height,
        gap,
    }
}

/// Placement of one segment
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentGeometry {
    pub rect: Rect,
    /// Whether the segment is wide enough for a value label
    pub show_value_label: bool,
}

/// Placement of one stage
#[derive(Debug, Clone, PartialEq)]
pub struct StageGeometry {
    /// Right-aligned anchor of the stage label
    pub label_anchor: Pos2,
    pub bar: Rect,
    pub segments: Vec<SegmentGeometry>,
}

/// Placement of one legend entry
#[derive(Debug, Clone, PartialEq)]
pub struct LegendItemGeometry {
    pub swatch: Rect,
    /// Left-aligned anchor of the legend text
    pub text_anchor: Pos2,
    /// Whole clickable area of the entry
    pub hit_area: Rect,
}

/// Geometry of a whole funnel
#[derive(Debug, Clone, PartialEq)]
pub struct FunnelLayout {
    pub label_width: f32,
    pub funnel_width: f32,
    pub sizing: BarSizing,
    pub stages: Vec<StageGeometry>,
    pub legend: Vec<LegendItemGeometry>,
    pub content_size: Vec2,
    pub needs_horizontal_scroll: bool,
    pub needs_vertical_scroll: bool,
}

/// Lay out `dataset` in a `viewport` sized area
pub fn compute_layout(viewport: Vec2, settings: &FunnelSettings, dataset: &FunnelDataset) -> Result<FunnelLayout, FunnelError> {
    let (width, height) = (viewport.x, viewport.y);
    if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
        return Err(FunnelError::InvalidViewport { width, height });
    }
    let count = dataset.stage_count();
    if count == 0 {
        return Err(FunnelError::missing("dataset has no stages"));
    }

    let legend = &settings.legend;
    let legend_count = if legend.show { dataset.legend_categories().len() } else { 0 };
    let horizontal_legend = legend_count > 0 && legend.position.is_horizontal();
    let side_legend = legend_count > 0 && !legend.position.is_horizontal();

    let legend_band = if horizontal_legend { legend.height + LEGEND_SPACING } else { 0.0 };
    let side_width = if side_legend { LEGEND_ITEM_WIDTH + LEGEND_ITEM_SPACING } else { 0.0 };

    let label_width = MIN_LABEL_WIDTH.max(width * LABEL_WIDTH_RATIO);
    let funnel_width = (width - label_width - side_width).max(MIN_FUNNEL_WIDTH);

    let available_height = height - legend_band - TOP_MARGIN - BOTTOM_MARGIN;
    let layout = &settings.layout;
    let sizing = size_bars(
        available_height,
        count,
        layout.bar_gap,
        layout.min_bar_height,
        layout.min_gap,
    );
    let funnel_height = sizing.total_height(count);

    let chart_width = label_width + funnel_width + side_width;
    let left = ((width - chart_width) / 2.0).max(0.0);
    let chart_left = if legend.position == LegendPosition::Left { left + side_width } else { left };
    let chart_top = TOP_MARGIN + if horizontal_legend && legend.position == LegendPosition::Top { legend_band } else { 0.0 };
    let funnel_left = chart_left + label_width;

    let max_total = dataset.max_total();
    let stages = dataset
        .stages()
        .iter()
        .enumerate()
        .map(|(i, stage)| {
            let y = chart_top + i as f32 * (sizing.bar_height + sizing.gap);
            let total = stage.total();
            let stage_width = if max_total > 0.0 {
                (total / max_total) as f32 * funnel_width
            } else {
                0.0
            };
            let bar_left = funnel_left + (funnel_width - stage_width) / 2.0;
            let bar = Rect::from_min_size(pos2(bar_left, y), vec2(stage_width, sizing.bar_height));

            let mut x = bar_left;
            let segments = stage
                .segments
                .iter()
                .map(|segment| {
                    let segment_width = if total > 0.0 {
                        (segment.value / total) as f32 * stage_width
                    } else {
                        0.0
                    };
                    let rect = Rect::from_min_size(pos2(x, y), vec2(segment_width, sizing.bar_height));
                    x += segment_width;
                    SegmentGeometry {
                        rect,
                        show_value_label: segment_width > VALUE_LABEL_MIN_WIDTH,
                    }
                })
                .collect();

            StageGeometry {
                label_anchor: pos2(funnel_left - LABEL_PADDING, y + sizing.bar_height / 2.0),
                bar,
                segments,
            }
        })
        .collect();

    let step = LEGEND_ITEM_WIDTH + LEGEND_ITEM_SPACING;
    let mut content_width = left + chart_width;
    let mut content_height = chart_top + funnel_height + BOTTOM_MARGIN;

    let legend_origins: Vec<Pos2> = if horizontal_legend {
        let row_width = legend_count as f32 * step - LEGEND_ITEM_SPACING;
        let row_left = ((width - row_width) / 2.0).max(0.0);
        let row_top = match legend.position {
            LegendPosition::Bottom => chart_top + funnel_height + LEGEND_SPACING,
            _ => TOP_MARGIN,
        };
        if legend.position == LegendPosition::Bottom {
            content_height += legend_band;
        }
        content_width = content_width.max(row_left + row_width);
        (0..legend_count).map(|i| pos2(row_left + i as f32 * step, row_top)).collect()
    } else if side_legend {
        let column_left = match legend.position {
            LegendPosition::Left => left,
            _ => funnel_left + funnel_width + LEGEND_ITEM_SPACING,
        };
        let column_height = legend_count as f32 * (LEGEND_SWATCH_SIZE + LEGEND_ITEM_SPACING) - LEGEND_ITEM_SPACING;
        content_height = content_height.max(chart_top + column_height + BOTTOM_MARGIN);
        (0..legend_count)
            .map(|i| pos2(column_left, chart_top + i as f32 * (LEGEND_SWATCH_SIZE + LEGEND_ITEM_SPACING)))
            .collect()
    } else {
        Vec::new()
    };

    let legend = legend_origins
        .into_iter()
        .map(|origin| LegendItemGeometry {
            swatch: Rect::from_min_size(origin, Vec2::splat(LEGEND_SWATCH_SIZE)),
            text_anchor: pos2(
                origin.x + LEGEND_SWATCH_SIZE + LEGEND_TEXT_OFFSET,
                origin.y + LEGEND_SWATCH_SIZE / 2.0,
            ),
            hit_area: Rect::from_min_size(origin, vec2(LEGEND_ITEM_WIDTH, LEGEND_SWATCH_SIZE)),
        })
        .collect();

    let needs_horizontal_scroll = content_width > width;
    let needs_vertical_scroll = content_height > height;
    debug!(
        "Layout {}x{}: bar height {}, gap {}, content {}x{}",
        width, height, sizing.bar_height, sizing.gap, content_width, content_height
    );

    Ok(FunnelLayout {
        label_width,
        funnel_width,
        sizing,
        stages,
        legend,
        content_size: vec2(content_width, content_height),
        needs_horizontal_scroll,
        needs_vertical_scroll,
    })
}
