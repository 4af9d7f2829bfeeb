//! Decision validation logic

use clearance_domain::{CostScheme, DiscountTier, TierValue};
use serde::Serialize;
use thiserror::Error;

/// Result of validating a candidate decision
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    /// Whether the decision passed validation
    pub status: ValidationStatus,

    /// Rejection reasons (if any)
    pub reasons: Vec<RejectionReason>,
}

impl ValidationResult {
    /// Whether the decision was accepted
    pub fn is_accepted(&self) -> bool {
        self.status == ValidationStatus::Accepted
    }
}

/// Validation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    /// Decision accepted
    Accepted,

    /// Decision rejected
    Rejected,
}

/// Reasons for rejection
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum RejectionReason {
    /// A liquidation scheme would be left without a discount
    #[error("Liquidation scheme {scheme} cannot be paired with tier '{tier}'")]
    LiquidationWithoutDiscount {
        /// Final cost scheme
        scheme: String,
        /// Candidate tier
        tier: String,
    },
}

/// The Gatekeeper validates candidate decisions before they are applied
#[derive(Debug, Clone, Copy, Default)]
pub struct Gatekeeper;

impl Gatekeeper {
    /// Create a new Gatekeeper
    pub fn new() -> Self {
        Self
    }

    /// Validate a final scheme / next tier pair
    ///
    /// # Arguments
    ///
    /// * `final_scheme` - The new scheme, or the current scheme when it does not change
    /// * `next_tier` - The tier the product would move to
    pub fn validate(&self, final_scheme: &CostScheme, next_tier: &TierValue) -> ValidationResult {
        let mut reasons = Vec::new();

        if let Some(reason) = self.check_liquidation_exclusion(final_scheme, next_tier) {
            reasons.push(reason);
        }

        let status = if reasons.is_empty() {
            ValidationStatus::Accepted
        } else {
            ValidationStatus::Rejected
        };

        ValidationResult { status, reasons }
    }

    /// Liquidation schemes are mutually exclusive with the no-discount tier
    fn check_liquidation_exclusion(
        &self,
        scheme: &CostScheme,
        tier: &TierValue,
    ) -> Option<RejectionReason> {
        if scheme.is_liquidation() && tier.is(DiscountTier::NoDiscount) {
            return Some(RejectionReason::LiquidationWithoutDiscount {
                scheme: scheme.to_string(),
                tier: tier.to_string(),
            });
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_liquidation_with_push_is_accepted() {
        let gatekeeper = Gatekeeper::new();
        let result = gatekeeper.validate(&CostScheme::liq_large(), &DiscountTier::Push2.into());

        assert!(result.is_accepted());
        assert!(result.reasons.is_empty());
    }

    #[test]
    fn test_liquidation_without_discount_is_rejected() {
        let gatekeeper = Gatekeeper::new();
        let result =
            gatekeeper.validate(&CostScheme::liq_small(), &DiscountTier::NoDiscount.into());

        assert_eq!(result.status, ValidationStatus::Rejected);
        assert_eq!(result.reasons.len(), 1);
        match &result.reasons[0] {
            RejectionReason::LiquidationWithoutDiscount { scheme, tier } => {
                assert_eq!(scheme, "LIQ_20M");
                assert_eq!(tier, "Sin descuento");
            }
        }
    }

    #[test]
    fn test_standard_scheme_without_discount_is_accepted() {
        let gatekeeper = Gatekeeper::new();
        let result = gatekeeper.validate(
            &CostScheme::new("NDA_20M_T1"),
            &DiscountTier::NoDiscount.into(),
        );

        assert!(result.is_accepted());
    }

    #[test]
    fn test_unrecognized_tier_is_not_no_discount() {
        let gatekeeper = Gatekeeper::new();
        let result =
            gatekeeper.validate(&CostScheme::liq_small(), &TierValue::from_label("sin descuento"));

        assert!(result.is_accepted());
    }

    #[test]
    fn test_reason_message() {
        let reason = RejectionReason::LiquidationWithoutDiscount {
            scheme: "LIQ_30M".to_string(),
            tier: "Sin descuento".to_string(),
        };
        assert!(reason.to_string().contains("LIQ_30M"));
    }

    proptest! {
        #[test]
        fn prop_rejects_exactly_the_forbidden_pair(
            tier in prop::sample::select(DiscountTier::ALL.to_vec()),
            scheme in prop::sample::select(vec!["LIQ_20M", "LIQ_30M", "NDA_20M_T1", "DA_35R_T0", ""]),
        ) {
            let scheme = CostScheme::new(scheme);
            let result = Gatekeeper::new().validate(&scheme, &tier.into());
            let forbidden = scheme.is_liquidation() && tier == DiscountTier::NoDiscount;
            prop_assert_eq!(result.is_accepted(), !forbidden);
        }
    }
}
