//! The funnel visual: data update, selection notification and click handling

use egui::Vec2;
use funnel_core::{DataView, ElementId, FunnelError, Identity, SelectionHost};
use funnel_data::{aggregate, FunnelDataset, FunnelSettings, Normalizer};
use tracing::{info, warn};

use crate::colors::{ColorAssigner, ColorMap};
use crate::interaction::{Emphasis, SelectionSynchronizer};
use crate::layout::{compute_layout, FunnelLayout};
use crate::rates::{compute_rates, RateEntry};
use crate::scene::FunnelScene;

/// Result of a data update
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    Rendered,
    /// Nothing is drawn; the previous state has been discarded
    NoRender(FunnelError),
}

impl UpdateOutcome {
    pub fn is_rendered(&self) -> bool {
        matches!(self, UpdateOutcome::Rendered)
    }
}

/// Derived state of one successful update
#[derive(Debug, Clone)]
struct ChartState {
    dataset: FunnelDataset,
    rates: Vec<RateEntry>,
    colors: ColorMap,
    layout: FunnelLayout,
    sync: SelectionSynchronizer,
    emphasis: Emphasis,
    scene: FunnelScene,
}

/// A funnel chart driven by host data updates and selection notifications
pub struct FunnelChart {
    settings: FunnelSettings,
    normalizer: Normalizer,
    state: Option<ChartState>,
}

impl FunnelChart {
    pub fn new(settings: FunnelSettings) -> Self {
        Self {
            settings,
            normalizer: Normalizer::default(),
            state: None,
        }
    }

    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn settings(&self) -> &FunnelSettings {
        &self.settings
    }

    /// Replace the settings; takes effect on the next update
    pub fn set_settings(&mut self, settings: FunnelSettings) {
        self.settings = settings;
    }

    /// Recompute everything from `view`, discarding any earlier state
    pub fn update(&mut self, view: &DataView, viewport: Vec2, selection: &[Identity]) -> UpdateOutcome {
        self.state = None;
        match self.build(view, viewport, selection) {
            Ok(state) => {
                info!(
                    "Funnel updated: {} stages, {} legend categories",
                    state.dataset.stage_count(),
                    state.dataset.legend_categories().len()
                );
                self.state = Some(state);
                UpdateOutcome::Rendered
            }
            Err(err) => {
                warn!("Funnel not rendered: {}", err);
                UpdateOutcome::NoRender(err)
            }
        }
    }

    fn build(&self, view: &DataView, viewport: Vec2, selection: &[Identity]) -> Result<ChartState, FunnelError> {
        let settings = &self.settings;
        let rows = self.normalizer.normalize(view)?;
        let dataset = aggregate(&rows, settings.data_point.segment_order)?;
        let rates = compute_rates(&dataset, settings.rates.decimals);
        let colors = ColorAssigner::new(settings.data_point.palette, settings.fill_color())
            .assign(dataset.legend_categories());
        let layout = compute_layout(viewport, settings, &dataset)?;
        let sync = SelectionSynchronizer::new(&dataset);
        let emphasis = sync.reconcile(selection);
        let scene = FunnelScene::build(&dataset, &layout, &rates, &colors, settings, &emphasis);

        Ok(ChartState {
            dataset,
            rates,
            colors,
            layout,
            sync,
            emphasis,
            scene,
        })
    }

    /// Host selection changed; only membership is re-evaluated
    pub fn on_selection_changed(&mut self, selection: &[Identity]) {
        if let Some(state) = &mut self.state {
            state.emphasis = state.sync.reconcile(selection);
            state.scene.apply_emphasis(&state.emphasis);
        }
    }

    /// Handle a click on an element. Clicks before a successful update are
    /// ignored.
    pub fn click(&mut self, id: ElementId, host: &mut dyn SelectionHost) {
        if let Some(state) = &mut self.state {
            state.emphasis = state.sync.click(id, host);
            state.scene.apply_emphasis(&state.emphasis);
        }
    }

    pub fn scene(&self) -> Option<&FunnelScene> {
        self.state.as_ref().map(|s| &s.scene)
    }

    pub fn dataset(&self) -> Option<&FunnelDataset> {
        self.state.as_ref().map(|s| &s.dataset)
    }

    pub fn rates(&self) -> Option<&[RateEntry]> {
        self.state.as_ref().map(|s| s.rates.as_slice())
    }

    pub fn colors(&self) -> Option<&ColorMap> {
        self.state.as_ref().map(|s| &s.colors)
    }

    pub fn layout(&self) -> Option<&FunnelLayout> {
        self.state.as_ref().map(|s| &s.layout)
    }

    pub fn emphasis(&self) -> Option<&Emphasis> {
        self.state.as_ref().map(|s| &s.emphasis)
    }
}

impl Default for FunnelChart {
    fn default() -> Self {
        Self::new(FunnelSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::vec2;
    use funnel_core::{CategoricalData, CategoryColumn, CellValue, ElementState, SharedSelection, ValueColumn};

    fn view(stages: &[&str], legends: &[&str], values: &[f64]) -> DataView {
        let mut categories = vec![CategoryColumn {
            name: "Stage".to_string(),
            values: stages.iter().map(|s| CellValue::from(*s)).collect(),
        }];
        if !legends.is_empty() {
            categories.push(CategoryColumn {
                name: "Region".to_string(),
                values: legends.iter().map(|s| CellValue::from(*s)).collect(),
            });
        }
        DataView::Categorical(CategoricalData {
            categories,
            values: vec![ValueColumn {
                name: "Users".to_string(),
                values: values.iter().map(|v| CellValue::Number(*v)).collect(),
            }],
        })
    }

    fn scenario_a() -> DataView {
        view(&["Awareness", "Consideration", "Purchase"], &[], &[1000.0, 400.0, 100.0])
    }

    #[test]
    fn test_scenario_a() {
        let mut chart = FunnelChart::default();
        let outcome = chart.update(&scenario_a(), vec2(800.0, 400.0), &[]);
        assert_eq!(outcome, UpdateOutcome::Rendered);

        let dataset = chart.dataset().unwrap();
        assert_eq!(dataset.totals(), vec![1000.0, 400.0, 100.0]);
        let rates = chart.rates().unwrap();
        assert_eq!(rates[1].conversion, 40.0);
        assert_eq!(rates[2].drop_off, Some(75.0));
        assert_eq!(chart.scene().unwrap().segments.len(), 3);
    }

    #[test]
    fn test_scenario_b() {
        let mut chart = FunnelChart::default();
        chart.update(&view(&["Signup", "Signup"], &["US", "EU"], &[300.0, 200.0]), vec2(800.0, 400.0), &[]);

        let dataset = chart.dataset().unwrap();
        assert_eq!(dataset.stage_count(), 1);
        assert_eq!(dataset.stages()[0].total(), 500.0);
        let segments = &chart.layout().unwrap().stages[0].segments;
        assert!((segments[0].rect.width() / segments[1].rect.width() - 1.5).abs() < 1e-4);
    }

    #[test]
    fn test_empty_input_discards_state() {
        let mut chart = FunnelChart::default();
        assert!(chart.update(&scenario_a(), vec2(800.0, 400.0), &[]).is_rendered());

        let empty = DataView::Categorical(CategoricalData::default());
        let outcome = chart.update(&empty, vec2(800.0, 400.0), &[]);
        assert!(matches!(outcome, UpdateOutcome::NoRender(FunnelError::MissingData(_))));
        assert!(chart.scene().is_none());
        assert!(chart.emphasis().is_none());
    }

    #[test]
    fn test_invalid_viewport_no_render() {
        let mut chart = FunnelChart::default();
        let outcome = chart.update(&scenario_a(), vec2(0.0, 400.0), &[]);
        assert!(matches!(outcome, UpdateOutcome::NoRender(FunnelError::InvalidViewport { .. })));
    }

    #[test]
    fn test_selection_roundtrip() {
        let mut chart = FunnelChart::default();
        let mut host = SharedSelection::new();
        chart.update(&scenario_a(), vec2(800.0, 400.0), &host.selected());

        let first = ElementId::Segment { stage: 0, segment: 0 };
        let second = ElementId::Segment { stage: 1, segment: 0 };
        chart.click(first, &mut host);
        assert_eq!(host.selected().len(), 1);
        assert_eq!(chart.emphasis().unwrap().state(second), ElementState::DimmedByOtherSelection);
        assert_eq!(chart.scene().unwrap().segments[1].opacity, 0.3);

        chart.click(first, &mut host);
        assert!(host.selected().is_empty());
        assert_eq!(chart.emphasis().unwrap().state(first), ElementState::Unselected);
        assert_eq!(chart.scene().unwrap().segments[1].opacity, 1.0);
    }

    #[test]
    fn test_host_notification_keeps_geometry() {
        let mut chart = FunnelChart::default();
        chart.update(&scenario_a(), vec2(800.0, 400.0), &[]);
        let layout = chart.layout().unwrap().clone();

        let selected = chart.dataset().unwrap().stages()[2].segments[0].identity.clone().unwrap();
        chart.on_selection_changed(&[selected]);
        assert_eq!(chart.layout().unwrap(), &layout);
        let emphasis = chart.emphasis().unwrap();
        assert_eq!(emphasis.state(ElementId::Segment { stage: 2, segment: 0 }), ElementState::Selected);
        assert_eq!(emphasis.state(ElementId::Segment { stage: 0, segment: 0 }), ElementState::DimmedByOtherSelection);
    }

    #[test]
    fn test_selection_applied_on_update() {
        let mut chart = FunnelChart::default();
        chart.update(&scenario_a(), vec2(800.0, 400.0), &[Identity::new("unrelated")]);
        assert!(chart.scene().unwrap().segments.iter().all(|s| s.opacity == 0.3));
    }
}
