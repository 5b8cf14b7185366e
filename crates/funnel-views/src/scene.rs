//! Declarative render payload
//!
//! A scene is everything a surface needs to draw one funnel: filled rects,
//! text runs and legend entries with their final colors and opacities. It is
//! rebuilt on every data update and re-emphasized on selection changes.

use egui::{Color32, Pos2, Rect, Vec2};
use funnel_core::{format_number, ElementId};
use funnel_data::{FunnelDataset, FunnelSettings};

use crate::colors::ColorMap;
use crate::interaction::Emphasis;
use crate::layout::{FunnelLayout, LEGEND_SWATCH_RADIUS};
use crate::rates::{format_percent, RateEntry};

/// Horizontal alignment of a text run relative to its position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextItem {
    /// Anchor point, vertically centered
    pub pos: Pos2,
    pub text: String,
    pub anchor: TextAnchor,
    pub color: Color32,
    pub font_size: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SegmentItem {
    pub id: ElementId,
    pub rect: Rect,
    pub fill: Color32,
    pub opacity: f32,
    pub corner_radius: f32,
    pub tooltip: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendItem {
    pub id: ElementId,
    pub swatch: Rect,
    pub hit_area: Rect,
    pub fill: Color32,
    pub opacity: f32,
    pub label: TextItem,
}

/// Drawing backend for a scene
pub trait RenderSurface {
    fn fill_rect(&mut self, rect: Rect, corner_radius: f32, color: Color32);

    fn stroke_rect(&mut self, rect: Rect, corner_radius: f32, width: f32, color: Color32);

    fn text(&mut self, item: &TextItem);
}

/// Everything needed to draw and hit-test one funnel
#[derive(Debug, Clone, PartialEq)]
pub struct FunnelScene {
    pub segments: Vec<SegmentItem>,
    pub stage_labels: Vec<TextItem>,
    pub value_labels: Vec<TextItem>,
    pub legend: Vec<LegendItem>,
    pub content_size: Vec2,
    pub needs_horizontal_scroll: bool,
    pub needs_vertical_scroll: bool,
}

impl FunnelScene {
    pub fn build(
        dataset: &FunnelDataset,
        layout: &FunnelLayout,
        rates: &[RateEntry],
        colors: &ColorMap,
        settings: &FunnelSettings,
        emphasis: &Emphasis,
    ) -> Self {
        let labels = &settings.labels;
        let stage_color = settings.stage_label_color();
        let value_color = settings.value_label_color();
        let fallback = settings.fill_color();

        let mut segments = Vec::new();
        let mut stage_labels = Vec::new();
        let mut value_labels = Vec::new();

        for (stage_index, (stage, geometry)) in dataset.stages().iter().zip(&layout.stages).enumerate() {
            stage_labels.push(TextItem {
                pos: geometry.label_anchor,
                text: stage.label.clone(),
                anchor: TextAnchor::End,
                color: stage_color,
                font_size: labels.stage_font_size,
            });

            for (segment_index, (segment, placed)) in stage.segments.iter().zip(&geometry.segments).enumerate() {
                let id = ElementId::Segment {
                    stage: stage_index,
                    segment: segment_index,
                };
                let value_text = format_number(segment.value);

                if labels.show && placed.show_value_label {
                    value_labels.push(TextItem {
                        pos: placed.rect.center(),
                        text: value_text.clone(),
                        anchor: TextAnchor::Middle,
                        color: value_color,
                        font_size: labels.font_size,
                    });
                }

                let mut tooltip = format!("{}\n{}: {}", stage.label, segment.legend, value_text);
                if let Some(rate) = rates.get(stage_index) {
                    tooltip.push_str(&format!("\nConversion: {}", format_percent(rate.conversion)));
                    if let Some(drop_off) = rate.drop_off {
                        tooltip.push_str(&format!("\nDrop-off: {}", format_percent(drop_off)));
                    }
                }

                segments.push(SegmentItem {
                    id,
                    rect: placed.rect,
                    fill: colors.get(&segment.legend).copied().unwrap_or(fallback),
                    opacity: emphasis.opacity(id),
                    corner_radius: settings.layout.corner_radius,
                    tooltip,
                });
            }
        }

        let legend = dataset
            .legend_categories()
            .iter()
            .zip(&layout.legend)
            .enumerate()
            .map(|(i, (key, placed))| {
                let id = ElementId::Legend(i);
                LegendItem {
                    id,
                    swatch: placed.swatch,
                    hit_area: placed.hit_area,
                    fill: colors.get(key).copied().unwrap_or(fallback),
                    opacity: emphasis.opacity(id),
                    label: TextItem {
                        pos: placed.text_anchor,
                        text: key.clone(),
                        anchor: TextAnchor::Start,
                        color: stage_color,
                        font_size: settings.legend.font_size,
                    },
                }
            })
            .collect();

        Self {
            segments,
            stage_labels,
            value_labels,
            legend,
            content_size: layout.content_size,
            needs_horizontal_scroll: layout.needs_horizontal_scroll,
            needs_vertical_scroll: layout.needs_vertical_scroll,
        }
    }

    /// Refresh opacities without touching geometry
    pub fn apply_emphasis(&mut self, emphasis: &Emphasis) {
        for segment in &mut self.segments {
            segment.opacity = emphasis.opacity(segment.id);
        }
        for item in &mut self.legend {
            item.opacity = emphasis.opacity(item.id);
        }
    }

    /// Topmost element under `pos`; legend entries win over segments
    pub fn hit_test(&self, pos: Pos2) -> Option<ElementId> {
        self.legend
            .iter()
            .find(|item| item.hit_area.contains(pos))
            .map(|item| item.id)
            .or_else(|| {
                self.segments
                    .iter()
                    .find(|segment| segment.rect.width() > 0.0 && segment.rect.contains(pos))
                    .map(|segment| segment.id)
            })
    }

    /// Hover text of a segment; legend entries have none
    pub fn tooltip(&self, id: ElementId) -> Option<&str> {
        self.segments
            .iter()
            .find(|segment| segment.id == id)
            .map(|segment| segment.tooltip.as_str())
    }

    pub fn legend_item(&self, id: ElementId) -> Option<&LegendItem> {
        self.legend.iter().find(|item| item.id == id)
    }

    pub fn paint(&self, surface: &mut dyn RenderSurface) {
        for segment in &self.segments {
            if segment.rect.width() > 0.0 {
                surface.fill_rect(segment.rect, segment.corner_radius, segment.fill.gamma_multiply(segment.opacity));
            }
        }
        for label in self.stage_labels.iter().chain(&self.value_labels) {
            surface.text(label);
        }
        for item in &self.legend {
            surface.fill_rect(item.swatch, LEGEND_SWATCH_RADIUS, item.fill.gamma_multiply(item.opacity));
            surface.text(&item.label);
        }
    }
}
