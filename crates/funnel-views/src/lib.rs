//! Funnel chart views
//!
//! Rates, colors, layout and selection handling for an aggregated funnel,
//! plus the declarative scene and the egui view that paints it.

pub mod chart;
pub mod colors;
pub mod interaction;
pub mod layout;
pub mod rates;
pub mod scene;
pub mod view;

// Re-exports
pub use chart::{FunnelChart, UpdateOutcome};
pub use colors::{palette, ColorAssigner, ColorMap, FALLBACK_COLOR};
pub use interaction::{Emphasis, SelectionSynchronizer};
pub use layout::{compute_layout, size_bars, BarSizing, FunnelLayout, LegendItemGeometry, SegmentGeometry, StageGeometry};
pub use rates::{compute_rates, format_percent, percent, RateEntry};
pub use scene::{FunnelScene, LegendItem, RenderSurface, SegmentItem, TextAnchor, TextItem};
pub use view::{EguiSurface, FunnelView};
