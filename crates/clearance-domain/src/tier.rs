//! Tier module - discount levels a product moves through

use serde::{Deserialize, Serialize};
use std::fmt;

/// Discount tier assigned to a product
///
/// Products advance through the tiers in a fixed order:
/// - NoDiscount: Regular price
/// - Push1: First markdown
/// - Push2: Second markdown
/// - Liquidation: Clearance price
///
/// Advancing past Liquidation rotates back to Push1; NoDiscount is only
/// ever a starting point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiscountTier {
    /// No discount applied
    NoDiscount,

    /// First push markdown
    Push1,

    /// Second push markdown
    Push2,

    /// Liquidation (terminal tier)
    Liquidation,
}

impl DiscountTier {
    /// All tiers in ladder order
    pub const ALL: [DiscountTier; 4] = [
        DiscountTier::NoDiscount,
        DiscountTier::Push1,
        DiscountTier::Push2,
        DiscountTier::Liquidation,
    ];

    /// Get the catalog label for this tier
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountTier::NoDiscount => "Sin descuento",
            DiscountTier::Push1 => "PUSH1",
            DiscountTier::Push2 => "PUSH2",
            DiscountTier::Liquidation => "LIQUIDACION",
        }
    }

    /// Parse a tier from its catalog label
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Sin descuento" => Some(DiscountTier::NoDiscount),
            "PUSH1" => Some(DiscountTier::Push1),
            "PUSH2" => Some(DiscountTier::Push2),
            "LIQUIDACION" => Some(DiscountTier::Liquidation),
            _ => None,
        }
    }

    /// Get the tier that follows this one
    ///
    /// The terminal tier rotates back to `Push1` instead of saturating.
    pub fn next(&self) -> Self {
        match self {
            DiscountTier::NoDiscount => DiscountTier::Push1,
            DiscountTier::Push1 => DiscountTier::Push2,
            DiscountTier::Push2 => DiscountTier::Liquidation,
            DiscountTier::Liquidation => DiscountTier::Push1,
        }
    }

    /// Whether this tier carries a markdown (Push1, Push2 or Liquidation)
    pub fn is_discounted(&self) -> bool {
        !matches!(self, DiscountTier::NoDiscount)
    }
}

impl fmt::Display for DiscountTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DiscountTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid discount tier: {}", s))
    }
}

/// Tier label as reported by the catalog
///
/// The catalog may hold labels this engine does not know about. Those are
/// carried through untouched rather than treated as errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TierValue {
    /// One of the four known tiers
    Known(DiscountTier),

    /// A label outside the known ladder
    Unrecognized(String),
}

impl TierValue {
    /// Build a tier value from a catalog label
    pub fn from_label(label: &str) -> Self {
        match DiscountTier::parse(label) {
            Some(tier) => TierValue::Known(tier),
            None => TierValue::Unrecognized(label.to_string()),
        }
    }

    /// Get the catalog label
    pub fn as_str(&self) -> &str {
        match self {
            TierValue::Known(tier) => tier.as_str(),
            TierValue::Unrecognized(label) => label,
        }
    }

    /// Get the known tier, if any
    pub fn known(&self) -> Option<DiscountTier> {
        match self {
            TierValue::Known(tier) => Some(*tier),
            TierValue::Unrecognized(_) => None,
        }
    }

    /// Check whether this value is the given known tier
    pub fn is(&self, tier: DiscountTier) -> bool {
        self.known() == Some(tier)
    }

    /// Advance to the next tier; unrecognized labels are returned unchanged
    pub fn next(&self) -> Self {
        match self {
            TierValue::Known(tier) => TierValue::Known(tier.next()),
            TierValue::Unrecognized(_) => self.clone(),
        }
    }
}

impl Default for TierValue {
    fn default() -> Self {
        TierValue::Known(DiscountTier::NoDiscount)
    }
}

impl From<DiscountTier> for TierValue {
    fn from(tier: DiscountTier) -> Self {
        TierValue::Known(tier)
    }
}

impl From<String> for TierValue {
    fn from(label: String) -> Self {
        match DiscountTier::parse(&label) {
            Some(tier) => TierValue::Known(tier),
            None => TierValue::Unrecognized(label),
        }
    }
}

impl From<TierValue> for String {
    fn from(value: TierValue) -> Self {
        match value {
            TierValue::Known(tier) => tier.as_str().to_string(),
            TierValue::Unrecognized(label) => label,
        }
    }
}

impl fmt::Display for TierValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_tier_progression() {
        assert_eq!(DiscountTier::NoDiscount.next(), DiscountTier::Push1);
        assert_eq!(DiscountTier::Push1.next(), DiscountTier::Push2);
        assert_eq!(DiscountTier::Push2.next(), DiscountTier::Liquidation);
    }

    #[test]
    fn test_terminal_tier_rotates_to_push1() {
        assert_eq!(DiscountTier::Liquidation.next(), DiscountTier::Push1);
    }

    #[test]
    fn test_no_discount_reaches_liquidation_in_three_steps() {
        let tier = DiscountTier::NoDiscount.next().next().next();
        assert_eq!(tier, DiscountTier::Liquidation);
        // A fourth step re-enters the cycle at Push1, never NoDiscount
        assert_eq!(tier.next(), DiscountTier::Push1);
    }

    #[test]
    fn test_total_order() {
        assert!(DiscountTier::NoDiscount < DiscountTier::Push1);
        assert!(DiscountTier::Push1 < DiscountTier::Push2);
        assert!(DiscountTier::Push2 < DiscountTier::Liquidation);
    }

    #[test]
    fn test_label_round_trip() {
        for tier in DiscountTier::ALL {
            assert_eq!(DiscountTier::parse(tier.as_str()), Some(tier));
        }
        assert_eq!(DiscountTier::parse("push1"), None);
        assert!("LIQUIDACION".parse::<DiscountTier>().is_ok());
        assert!("MEGA".parse::<DiscountTier>().is_err());
    }

    #[test]
    fn test_unrecognized_label_passes_through() {
        let value = TierValue::from_label("OUTLET");
        assert_eq!(value.known(), None);
        assert_eq!(value.next(), TierValue::Unrecognized("OUTLET".to_string()));
        assert_eq!(value.as_str(), "OUTLET");
    }

    #[test]
    fn test_tier_value_serde_uses_labels() {
        let json = serde_json::to_string(&TierValue::Known(DiscountTier::Push2)).unwrap();
        assert_eq!(json, "\"PUSH2\"");

        let parsed: TierValue = serde_json::from_str("\"Sin descuento\"").unwrap();
        assert!(parsed.is(DiscountTier::NoDiscount));

        let odd: TierValue = serde_json::from_str("\"ESPECIAL\"").unwrap();
        assert_eq!(odd, TierValue::Unrecognized("ESPECIAL".to_string()));
    }

    fn any_tier() -> impl Strategy<Value = DiscountTier> {
        prop::sample::select(DiscountTier::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn prop_next_never_returns_no_discount(tier in any_tier()) {
            prop_assert_ne!(tier.next(), DiscountTier::NoDiscount);
        }

        #[test]
        fn prop_discounted_tiers_cycle_with_length_three(tier in any_tier()) {
            let entered = tier.next();
            prop_assert_eq!(entered.next().next().next(), entered);
        }

        #[test]
        fn prop_unrecognized_labels_are_fixed_points(label in "[A-Z_]{3,12}") {
            prop_assume!(DiscountTier::parse(&label).is_none());
            let value = TierValue::from_label(&label);
            prop_assert_eq!(value.next(), value);
        }
    }
}
