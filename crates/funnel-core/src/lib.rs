//! Core abstractions for the funnel chart engine
//!
//! This crate holds the types every other funnel crate agrees on: the raw
//! input shapes handed over by a host, the opaque identities that link drawn
//! elements to the host's cross-filtering model, and the selection
//! synchronization rules.

pub mod data;
pub mod error;
pub mod identity;
pub mod selection;
pub mod sync;

// Re-export commonly used types
pub use data::{format_number, CategoricalData, CategoryColumn, CellValue, DataView, FunnelSource, TableData, ValueColumn};
pub use error::FunnelError;
pub use identity::{Coordinate, CoordinateIdentities, Identity, IdentityProvider, NoIdentities};
pub use selection::{ClickAction, ElementId, ElementState, SelectionHost, DIMMED_OPACITY};
pub use sync::SharedSelection;
