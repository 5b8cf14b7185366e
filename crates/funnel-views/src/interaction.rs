//! Selection synchronization between funnel elements and the host
//!
//! The synchronizer only knows which identities each element stands for.
//! Element states are always derived from the host's identity set, so a host
//! notification and a local click go through the same reconciliation.

use funnel_core::{ClickAction, ElementId, ElementState, Identity, SelectionHost};
use funnel_data::FunnelDataset;
use tracing::debug;

/// Per-element states derived from one selection set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Emphasis {
    segments: Vec<Vec<ElementState>>,
    legend: Vec<ElementState>,
}

impl Emphasis {
    pub fn state(&self, id: ElementId) -> ElementState {
        match id {
            ElementId::Segment { stage, segment } => self
                .segments
                .get(stage)
                .and_then(|states| states.get(segment))
                .copied()
                .unwrap_or_default(),
            ElementId::Legend(index) => self.legend.get(index).copied().unwrap_or_default(),
        }
    }

    pub fn opacity(&self, id: ElementId) -> f32 {
        self.state(id).opacity()
    }

    /// Whether any element is selected
    pub fn has_selection(&self) -> bool {
        self.segments
            .iter()
            .flatten()
            .chain(self.legend.iter())
            .any(|state| *state == ElementState::Selected)
    }
}

/// Maps elements of one dataset to their identities
#[derive(Debug, Clone, Default)]
pub struct SelectionSynchronizer {
    segments: Vec<Vec<Option<Identity>>>,
    legend: Vec<Vec<Identity>>,
}

impl SelectionSynchronizer {
    pub fn new(dataset: &FunnelDataset) -> Self {
        let segments = dataset
            .stages()
            .iter()
            .map(|stage| stage.segments.iter().map(|s| s.identity.clone()).collect())
            .collect();
        let legend = dataset
            .legend_categories()
            .iter()
            .map(|key| dataset.legend_identities(key))
            .collect();
        Self { segments, legend }
    }

    /// Identities a click on `id` would select
    pub fn targets(&self, id: ElementId) -> Vec<Identity> {
        match id {
            ElementId::Segment { stage, segment } => self
                .segments
                .get(stage)
                .and_then(|ids| ids.get(segment))
                .cloned()
                .flatten()
                .into_iter()
                .collect(),
            ElementId::Legend(index) => self.legend.get(index).cloned().unwrap_or_default(),
        }
    }

    /// Derive every element's state from `selection`
    pub fn reconcile(&self, selection: &[Identity]) -> Emphasis {
        let segments = self
            .segments
            .iter()
            .map(|ids| ids.iter().map(|id| ElementState::of(selection, id.as_ref())).collect())
            .collect();
        let legend = self
            .legend
            .iter()
            .map(|ids| ElementState::of_group(selection, ids))
            .collect();
        Emphasis { segments, legend }
    }

    /// Handle a click on `id` and return the resulting emphasis
    pub fn click(&self, id: ElementId, host: &mut dyn SelectionHost) -> Emphasis {
        let action = ClickAction::resolve(&host.selected(), &self.targets(id));
        debug!("Click on {:?} resolved to {:?}", id, action);
        action.apply(host);
        self.reconcile(&host.selected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use funnel_core::SharedSelection;
    use funnel_data::{aggregate, Row, SegmentOrder};

    fn row(i: usize, stage: &str, legend: &str, value: f64, identity: bool) -> Row {
        Row {
            stage: stage.to_string(),
            legend: Some(legend.to_string()),
            value,
            source_index: i,
            identity: identity.then(|| Identity::new(format!("{}/{}", stage, legend))),
        }
    }

    fn dataset() -> FunnelDataset {
        let rows = vec![
            row(0, "Visit", "US", 600.0, true),
            row(1, "Visit", "EU", 400.0, true),
            row(2, "Signup", "US", 300.0, true),
            row(3, "Signup", "EU", 200.0, true),
            row(4, "Signup", "Other", 50.0, false),
        ];
        aggregate(&rows, SegmentOrder::Insertion).unwrap()
    }

    const VISIT_US: ElementId = ElementId::Segment { stage: 0, segment: 0 };
    const VISIT_EU: ElementId = ElementId::Segment { stage: 0, segment: 1 };
    const SIGNUP_US: ElementId = ElementId::Segment { stage: 1, segment: 0 };
    const SIGNUP_OTHER: ElementId = ElementId::Segment { stage: 1, segment: 2 };

    #[test]
    fn test_initially_unselected() {
        let sync = SelectionSynchronizer::new(&dataset());
        let emphasis = sync.reconcile(&[]);
        assert_eq!(emphasis.state(VISIT_US), ElementState::Unselected);
        assert_eq!(emphasis.state(ElementId::Legend(0)), ElementState::Unselected);
        assert!(!emphasis.has_selection());
    }

    #[test]
    fn test_click_selects_and_dims() {
        let sync = SelectionSynchronizer::new(&dataset());
        let mut host = SharedSelection::new();

        let emphasis = sync.click(VISIT_US, &mut host);
        assert_eq!(host.selected(), vec![Identity::new("Visit/US")]);
        assert_eq!(emphasis.state(VISIT_US), ElementState::Selected);
        assert_eq!(emphasis.state(VISIT_EU), ElementState::DimmedByOtherSelection);
        assert_eq!(emphasis.opacity(VISIT_EU), 0.3);
        // The US legend entry has a selected child
        assert_eq!(emphasis.state(ElementId::Legend(0)), ElementState::Selected);
        assert_eq!(emphasis.state(ElementId::Legend(1)), ElementState::DimmedByOtherSelection);
    }

    #[test]
    fn test_click_again_clears() {
        let sync = SelectionSynchronizer::new(&dataset());
        let mut host = SharedSelection::new();

        sync.click(VISIT_US, &mut host);
        let emphasis = sync.click(VISIT_US, &mut host);
        assert!(host.selected().is_empty());
        assert_eq!(emphasis, sync.reconcile(&[]));
        assert_eq!(emphasis.state(VISIT_EU), ElementState::Unselected);
    }

    #[test]
    fn test_click_other_replaces() {
        let sync = SelectionSynchronizer::new(&dataset());
        let mut host = SharedSelection::new();

        sync.click(VISIT_US, &mut host);
        let emphasis = sync.click(VISIT_EU, &mut host);
        assert_eq!(host.selected(), vec![Identity::new("Visit/EU")]);
        assert_eq!(emphasis.state(VISIT_US), ElementState::DimmedByOtherSelection);
    }

    #[test]
    fn test_legend_click_selects_all_segments() {
        let sync = SelectionSynchronizer::new(&dataset());
        let mut host = SharedSelection::new();

        let emphasis = sync.click(ElementId::Legend(0), &mut host);
        assert_eq!(
            host.selected(),
            vec![Identity::new("Visit/US"), Identity::new("Signup/US")]
        );
        assert_eq!(emphasis.state(VISIT_US), ElementState::Selected);
        assert_eq!(emphasis.state(SIGNUP_US), ElementState::Selected);
        assert_eq!(emphasis.state(VISIT_EU), ElementState::DimmedByOtherSelection);
    }

    #[test]
    fn test_legend_click_again_clears() {
        let sync = SelectionSynchronizer::new(&dataset());
        let mut host = SharedSelection::new();

        sync.click(ElementId::Legend(0), &mut host);
        let emphasis = sync.click(ElementId::Legend(0), &mut host);
        assert!(host.selected().is_empty());
        assert_eq!(emphasis, sync.reconcile(&[]));
        for id in [VISIT_US, VISIT_EU, SIGNUP_US, SIGNUP_OTHER, ElementId::Legend(0), ElementId::Legend(1)] {
            assert_eq!(emphasis.state(id), ElementState::Unselected);
        }
        assert!(!emphasis.has_selection());
    }

    #[test]
    fn test_legend_click_with_selected_segment_clears() {
        let sync = SelectionSynchronizer::new(&dataset());
        let mut host = SharedSelection::new();

        sync.click(VISIT_US, &mut host);
        let action = ClickAction::resolve(&host.selected(), &sync.targets(ElementId::Legend(0)));
        assert_eq!(action, ClickAction::Clear);

        let emphasis = sync.click(ElementId::Legend(0), &mut host);
        assert!(host.selected().is_empty());
        assert_eq!(emphasis.state(ElementId::Legend(0)), ElementState::Unselected);
        assert_eq!(emphasis.state(SIGNUP_US), ElementState::Unselected);
    }

    #[test]
    fn test_identityless_elements() {
        let sync = SelectionSynchronizer::new(&dataset());
        let mut host = SharedSelection::new();

        let emphasis = sync.click(SIGNUP_OTHER, &mut host);
        assert!(host.selected().is_empty());
        assert_eq!(emphasis.state(SIGNUP_OTHER), ElementState::Unselected);

        sync.click(VISIT_US, &mut host);
        let emphasis = sync.reconcile(&host.selected());
        assert_eq!(emphasis.opacity(SIGNUP_OTHER), 1.0);
        assert_eq!(emphasis.state(ElementId::Legend(2)), ElementState::Unselected);
    }

    #[test]
    fn test_reconcile_is_pure() {
        let sync = SelectionSynchronizer::new(&dataset());
        let set = vec![Identity::new("Signup/EU")];
        assert_eq!(sync.reconcile(&set), sync.reconcile(&set));
        // Identities from elsewhere in the host dim every local element
        let foreign = sync.reconcile(&[Identity::new("elsewhere")]);
        assert_eq!(foreign.state(VISIT_US), ElementState::DimmedByOtherSelection);
        assert!(!foreign.has_selection());
    }
}
