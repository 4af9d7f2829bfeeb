//! Cost scheme module - pricing basis identifiers and their liquidation mapping

use serde::{Deserialize, Serialize};
use std::fmt;

/// Cost scheme identifier
///
/// Opaque string owned by the catalog. `LIQ_20M` and `LIQ_30M` are
/// liquidation schemes; every other value is a standard scheme.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CostScheme(String);

impl CostScheme {
    /// Smaller liquidation scheme, also the fallback for unmapped schemes
    pub const LIQ_SMALL: &'static str = "LIQ_20M";

    /// Larger liquidation scheme
    pub const LIQ_LARGE: &'static str = "LIQ_30M";

    /// Create a cost scheme from its identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The `LIQ_20M` scheme
    pub fn liq_small() -> Self {
        Self::new(Self::LIQ_SMALL)
    }

    /// The `LIQ_30M` scheme
    pub fn liq_large() -> Self {
        Self::new(Self::LIQ_LARGE)
    }

    /// Get the identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is one of the liquidation schemes
    pub fn is_liquidation(&self) -> bool {
        self.0 == Self::LIQ_SMALL || self.0 == Self::LIQ_LARGE
    }

    /// Get the liquidation scheme this scheme maps to
    ///
    /// Liquidation schemes map to themselves. Standard schemes missing from
    /// the table fall back to `LIQ_20M`.
    pub fn liquidation_equivalent(&self) -> CostScheme {
        if self.is_liquidation() {
            return self.clone();
        }
        Self::new(mapped_liquidation(&self.0).unwrap_or(Self::LIQ_SMALL))
    }
}

impl fmt::Display for CostScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CostScheme {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Static standard → liquidation table
fn mapped_liquidation(id: &str) -> Option<&'static str> {
    match id {
        "DA_35R_T0" | "DA_35R_T1" | "DA_35R_T2" | "NDA_15M_PRM" | "NDA_15M_T1"
        | "NDA_17_5M_T1" | "NDA_20M_PRM" | "NDA_20M_T1" | "NDA_25M_PRM" => {
            Some(CostScheme::LIQ_SMALL)
        }
        "NDA_25M_T1" | "NDA_30M_PRM" | "NDA_30M_T1" | "NDA_35M_PRM" | "NDA_35M_T1"
        | "NDA_40M_T1" => Some(CostScheme::LIQ_LARGE),
        _ => None,
    }
}

/// Decide the scheme a product moves to, if any
///
/// Only the import-age route may change a cost scheme, and a product already
/// on a liquidation scheme stays where it is.
///
/// # Examples
///
/// ```
/// use clearance_domain::{next_scheme, CostScheme};
///
/// let current = CostScheme::new("NDA_30M_T1");
/// assert_eq!(next_scheme(&current, true), Some(CostScheme::liq_large()));
/// assert_eq!(next_scheme(&current, false), None);
/// ```
pub fn next_scheme(current: &CostScheme, route1_eligible: bool) -> Option<CostScheme> {
    if !route1_eligible || current.is_liquidation() {
        return None;
    }
    Some(current.liquidation_equivalent())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_liquidation_detection() {
        assert!(CostScheme::liq_small().is_liquidation());
        assert!(CostScheme::liq_large().is_liquidation());
        assert!(!CostScheme::new("NDA_20M_T1").is_liquidation());
        assert!(!CostScheme::new("liq_20m").is_liquidation());
        assert!(!CostScheme::default().is_liquidation());
    }

    #[test]
    fn test_table_maps_to_small() {
        for id in ["DA_35R_T0", "NDA_15M_T1", "NDA_17_5M_T1", "NDA_20M_T1", "NDA_25M_PRM"] {
            assert_eq!(CostScheme::new(id).liquidation_equivalent(), CostScheme::liq_small());
        }
    }

    #[test]
    fn test_table_maps_to_large() {
        for id in ["NDA_25M_T1", "NDA_30M_PRM", "NDA_35M_T1", "NDA_40M_T1"] {
            assert_eq!(CostScheme::new(id).liquidation_equivalent(), CostScheme::liq_large());
        }
    }

    #[test]
    fn test_unmapped_defaults_to_small() {
        assert_eq!(
            CostScheme::new("CUSTOM_99").liquidation_equivalent(),
            CostScheme::liq_small()
        );
        assert_eq!(CostScheme::default().liquidation_equivalent(), CostScheme::liq_small());
    }

    #[test]
    fn test_next_scheme_requires_route1() {
        assert_eq!(next_scheme(&CostScheme::new("NDA_20M_T1"), false), None);
        assert_eq!(
            next_scheme(&CostScheme::new("NDA_20M_T1"), true),
            Some(CostScheme::liq_small())
        );
    }

    #[test]
    fn test_next_scheme_keeps_liquidation_schemes() {
        assert_eq!(next_scheme(&CostScheme::liq_large(), true), None);
        assert_eq!(next_scheme(&CostScheme::liq_small(), true), None);
    }
}
