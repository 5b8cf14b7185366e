use std::sync::Arc;
use parking_lot::RwLock;
use tracing::debug;

use crate::identity::Identity;
use crate::selection::SelectionHost;

/// In-process selection host shared between views.
///
/// Cloning yields another handle onto the same selection. Every change bumps
/// a generation counter so a view can notice host-pushed updates without
/// keeping a copy of the identity set.
#[derive(Clone, Default)]
pub struct SharedSelection {
    /// Shared selection state
    state: Arc<RwLock<SelectionState>>,
}

/// Selection state shared across views
#[derive(Debug, Clone, Default)]
struct SelectionState {
    /// Selected identities
    identities: Vec<Identity>,

    /// Incremented on every change
    generation: u64,
}

impl SharedSelection {
    /// Create an empty selection
    pub fn new() -> Self {
        Self::default()
    }

    /// Current generation; changes whenever the selection does
    pub fn generation(&self) -> u64 {
        self.state.read().generation
    }

    /// Whether nothing is selected
    pub fn is_empty(&self) -> bool {
        self.state.read().identities.is_empty()
    }

    fn replace(&self, identities: Vec<Identity>) {
        let mut state = self.state.write();
        state.identities = identities;
        state.generation += 1;
        debug!(
            "Selection now holds {} identities (generation {})",
            state.identities.len(),
            state.generation
        );
    }
}

impl SelectionHost for SharedSelection {
    fn selected(&self) -> Vec<Identity> {
        self.state.read().identities.clone()
    }

    fn select(&mut self, identities: Vec<Identity>) {
        self.replace(identities);
    }

    fn clear(&mut self) {
        self.replace(Vec::new());
    }
}
