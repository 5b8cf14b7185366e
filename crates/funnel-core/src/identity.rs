//! Opaque identities linking rendered elements to the host selection model

use std::fmt;
use std::sync::Arc;

/// Token standing for "this data point" in the host's cross-filtering system.
///
/// Identities only support equality. Selection sets are plain lists searched
/// with `contains`.
#[derive(Clone, PartialEq, Eq)]
pub struct Identity(Arc<str>);

impl Identity {
    /// Wrap a host-supplied key
    pub fn new(key: impl AsRef<str>) -> Self {
        Self(Arc::from(key.as_ref()))
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({})", self.0)
    }
}

/// Location of a data point in whichever input shape the host provided
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coordinate<'a> {
    /// A (stage, legend) cell of a categorical view
    Category {
        stage: &'a str,
        legend: Option<&'a str>,
    },
    /// A row of a plain table
    TableRow(usize),
    /// A measure column of a values-only view
    Measure(usize),
}

/// Supplies identities for coordinates
pub trait IdentityProvider {
    /// Identity for a coordinate, or `None` when the point cannot take part
    /// in cross-filtering
    fn identity_for(&self, coordinate: Coordinate<'_>) -> Option<Identity>;
}

/// Provider deriving identities from the coordinate itself, so equal
/// coordinates always yield equal identities
#[derive(Debug, Clone, Copy, Default)]
pub struct CoordinateIdentities;

impl IdentityProvider for CoordinateIdentities {
    fn identity_for(&self, coordinate: Coordinate<'_>) -> Option<Identity> {
        let key = match coordinate {
            // Unit separator keeps ("a b", "c") apart from ("a", "b c")
            Coordinate::Category { stage, legend } => {
                format!("category:{}\u{1f}{}", stage, legend.unwrap_or(""))
            }
            Coordinate::TableRow(row) => format!("row:{}", row),
            Coordinate::Measure(index) => format!("measure:{}", index),
        };
        Some(Identity::new(key))
    }
}

/// Provider that never assigns identities. Everything it touches renders at
/// full opacity and ignores clicks.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIdentities;

impl IdentityProvider for NoIdentities {
    fn identity_for(&self, _coordinate: Coordinate<'_>) -> Option<Identity> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_coordinate_same_identity() {
        let provider = CoordinateIdentities;
        let a = provider.identity_for(Coordinate::Category { stage: "Signup", legend: Some("US") });
        let b = provider.identity_for(Coordinate::Category { stage: "Signup", legend: Some("US") });
        assert_eq!(a, b);
    }

    #[test]
    fn test_distinct_coordinates_differ() {
        let provider = CoordinateIdentities;
        let us = provider.identity_for(Coordinate::Category { stage: "Signup", legend: Some("US") });
        let eu = provider.identity_for(Coordinate::Category { stage: "Signup", legend: Some("EU") });
        let split = provider.identity_for(Coordinate::Category { stage: "Sign", legend: Some("upUS") });
        assert_ne!(us, eu);
        assert_ne!(us, split);
        assert_ne!(
            provider.identity_for(Coordinate::TableRow(0)),
            provider.identity_for(Coordinate::Measure(0))
        );
    }

    #[test]
    fn test_no_identities() {
        assert!(NoIdentities.identity_for(Coordinate::TableRow(3)).is_none());
    }
}
