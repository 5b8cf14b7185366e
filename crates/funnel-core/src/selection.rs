//! Selection state machine shared by every interactive element
//!
//! Elements (segments and legend swatches) never own selection state. Their
//! state is recomputed from the host's current identity set each time it is
//! needed, which keeps reconciliation a pure function of that set.

use crate::identity::Identity;

/// Opacity applied to elements dimmed by someone else's selection
pub const DIMMED_OPACITY: f32 = 0.3;

/// Visual selection state of one element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ElementState {
    #[default]
    Unselected,
    Selected,
    DimmedByOtherSelection,
}

impl ElementState {
    /// State of an element carrying a single identity
    pub fn of(selection: &[Identity], identity: Option<&Identity>) -> Self {
        Self::of_group(selection, identity)
    }

    /// State of an element standing for several identities: selected when
    /// any of them is selected
    pub fn of_group<'a>(
        selection: &[Identity],
        identities: impl IntoIterator<Item = &'a Identity>,
    ) -> Self {
        let mut has_identity = false;
        for identity in identities {
            has_identity = true;
            if selection.contains(identity) {
                return ElementState::Selected;
            }
        }

        if !has_identity || selection.is_empty() {
            ElementState::Unselected
        } else {
            ElementState::DimmedByOtherSelection
        }
    }

    pub fn opacity(self) -> f32 {
        match self {
            ElementState::Unselected | ElementState::Selected => 1.0,
            ElementState::DimmedByOtherSelection => DIMMED_OPACITY,
        }
    }
}

/// Addressable interactive element of a funnel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementId {
    Segment { stage: usize, segment: usize },
    Legend(usize),
}

/// The host's cross-filtering selection model
pub trait SelectionHost {
    /// Identities the host currently considers selected
    fn selected(&self) -> Vec<Identity>;

    /// Replace the selection with exactly these identities
    fn select(&mut self, identities: Vec<Identity>);

    /// Clear the selection host-wide
    fn clear(&mut self);
}

/// Outcome of clicking an element
#[derive(Debug, Clone, PartialEq)]
pub enum ClickAction {
    /// The element has no identity and cannot be selected
    Ignore,
    /// The element was already selected
    Clear,
    /// Single-select the element's identities
    Replace(Vec<Identity>),
}

impl ClickAction {
    /// Decide what a click on an element with `targets` identities does
    pub fn resolve(selection: &[Identity], targets: &[Identity]) -> Self {
        if targets.is_empty() {
            ClickAction::Ignore
        } else if targets.iter().any(|t| selection.contains(t)) {
            ClickAction::Clear
        } else {
            ClickAction::Replace(targets.to_vec())
        }
    }

    /// Forward the action to the host
    pub fn apply(self, host: &mut dyn SelectionHost) {
        match self {
            ClickAction::Ignore => {}
            ClickAction::Clear => host.clear(),
            ClickAction::Replace(identities) => host.select(identities),
        }
    }
}
