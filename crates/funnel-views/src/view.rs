//! egui host for a funnel chart

use egui::{Align2, Color32, FontId, Painter, Rect, Rounding, ScrollArea, Sense, Stroke, Ui, Vec2};
use funnel_core::{DataView, SelectionHost, SharedSelection};
use funnel_data::FunnelSettings;
use tracing::debug;

use crate::chart::{FunnelChart, UpdateOutcome};
use crate::layout::LEGEND_SWATCH_RADIUS;
use crate::scene::{RenderSurface, TextAnchor, TextItem};

/// Paints scene items with an egui painter, shifted by `offset`
pub struct EguiSurface<'a> {
    painter: &'a Painter,
    offset: Vec2,
}

impl<'a> EguiSurface<'a> {
    pub fn new(painter: &'a Painter, offset: Vec2) -> Self {
        Self { painter, offset }
    }
}

impl RenderSurface for EguiSurface<'_> {
    fn fill_rect(&mut self, rect: Rect, corner_radius: f32, color: Color32) {
        self.painter
            .rect_filled(rect.translate(self.offset), Rounding::same(corner_radius), color);
    }

    fn stroke_rect(&mut self, rect: Rect, corner_radius: f32, width: f32, color: Color32) {
        self.painter.rect_stroke(
            rect.translate(self.offset),
            Rounding::same(corner_radius),
            Stroke::new(width, color),
        );
    }

    fn text(&mut self, item: &TextItem) {
        let align = match item.anchor {
            TextAnchor::Start => Align2::LEFT_CENTER,
            TextAnchor::Middle => Align2::CENTER_CENTER,
            TextAnchor::End => Align2::RIGHT_CENTER,
        };
        self.painter.text(
            item.pos + self.offset,
            align,
            &item.text,
            FontId::proportional(item.font_size),
            item.color,
        );
    }
}

/// A funnel chart panel wired to a shared selection
pub struct FunnelView {
    title: String,
    chart: FunnelChart,
    data: Option<DataView>,
    host: SharedSelection,
    outcome: Option<UpdateOutcome>,
    last_size: Option<Vec2>,
    last_generation: u64,
    dirty: bool,
}

impl FunnelView {
    pub fn new(title: impl Into<String>, settings: FunnelSettings, host: SharedSelection) -> Self {
        Self {
            title: title.into(),
            chart: FunnelChart::new(settings),
            data: None,
            host,
            outcome: None,
            last_size: None,
            last_generation: 0,
            dirty: true,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn chart(&self) -> &FunnelChart {
        &self.chart
    }

    /// Result of the latest data update, if one ran
    pub fn outcome(&self) -> Option<&UpdateOutcome> {
        self.outcome.as_ref()
    }

    /// Hand over new data; it is laid out on the next frame
    pub fn set_data(&mut self, data: DataView) {
        self.data = Some(data);
        self.dirty = true;
    }

    pub fn set_settings(&mut self, settings: FunnelSettings) {
        self.chart.set_settings(settings);
        self.dirty = true;
    }

    fn sync(&mut self, viewport: Vec2) {
        let generation = self.host.generation();
        if self.dirty || self.last_size != Some(viewport) {
            if let Some(data) = &self.data {
                self.outcome = Some(self.chart.update(data, viewport, &self.host.selected()));
            }
            self.dirty = false;
            self.last_size = Some(viewport);
        } else if generation != self.last_generation {
            debug!("Selection changed for '{}'", self.title);
            self.chart.on_selection_changed(&self.host.selected());
        }
        self.last_generation = generation;
    }

    pub fn ui(&mut self, ui: &mut Ui) {
        self.sync(ui.available_size());

        let Some(scene) = self.chart.scene() else {
            if let Some(UpdateOutcome::NoRender(err)) = &self.outcome {
                ui.centered_and_justified(|ui| {
                    ui.weak(err.to_string());
                });
            }
            return;
        };

        let mut clicked = None;
        let hover_stroke = ui.visuals().strong_text_color();
        ScrollArea::both()
            .id_source(&self.title)
            .auto_shrink([false, false])
            .show(ui, |ui| {
                let (response, painter) = ui.allocate_painter(scene.content_size, Sense::click());
                let origin = response.rect.min.to_vec2();
                let mut surface = EguiSurface::new(&painter, origin);
                scene.paint(&mut surface);

                let Some(pos) = response.hover_pos() else {
                    return;
                };
                let Some(id) = scene.hit_test(pos - origin) else {
                    return;
                };
                if let Some(item) = scene.legend_item(id) {
                    surface.stroke_rect(item.swatch, LEGEND_SWATCH_RADIUS, 1.0, hover_stroke);
                }
                if response.clicked() {
                    clicked = Some(id);
                }
                if let Some(text) = scene.tooltip(id) {
                    response.clone().on_hover_text(text);
                }
            });

        if let Some(id) = clicked {
            let mut host = self.host.clone();
            self.chart.click(id, &mut host);
            self.last_generation = host.generation();
        }
    }
}
