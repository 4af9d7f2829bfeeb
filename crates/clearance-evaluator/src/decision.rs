//! Decision composition

use crate::eligibility::{EligibilityEvaluator, Route};
use chrono::NaiveDate;
use clearance_domain::{
    next_scheme, ActiveConfig, CostScheme, DiscountTier, ProductSignal, ProductState, TierValue,
    UpdatePlan,
};
use clearance_gatekeeper::{Gatekeeper, RejectionReason};
use serde::Serialize;
use tracing::debug;

/// Why a product was not advanced
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum RejectReason {
    /// Neither route fired
    NotEligible,

    /// The candidate decision broke the liquidation exclusion rule
    ViolatesInvariant(Vec<RejectionReason>),
}

/// Values the decision was computed from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostics {
    /// Tier before evaluation
    pub current_tier: TierValue,

    /// Scheme before evaluation
    pub current_scheme: CostScheme,

    /// Route 2 anchor date
    pub last_auto_discount_update: Option<NaiveDate>,

    /// Whole days since the anchor date
    pub days_since_modification: Option<i64>,

    /// Raw import age from the signal source
    pub days_since_last_import: Option<f64>,

    /// Raw days since sale from the signal source
    pub days_since_last_sale: Option<f64>,
}

/// Result of evaluating one product
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    /// Route that made the product eligible
    pub route: Route,

    /// Tier the product moves to
    pub next_tier: Option<TierValue>,

    /// Scheme the product moves to, when it changes
    pub next_scheme: Option<CostScheme>,

    /// Set when the product is not advanced
    pub reject_reason: Option<RejectReason>,

    /// Inputs of the decision
    pub diagnostics: Diagnostics,
}

impl Evaluation {
    /// Whether the decision may be applied
    pub fn is_eligible(&self) -> bool {
        self.reject_reason.is_none() && self.next_tier.is_some()
    }

    /// Whether the decision was refused by the gatekeeper
    pub fn violates_invariant(&self) -> bool {
        matches!(self.reject_reason, Some(RejectReason::ViolatesInvariant(_)))
    }

    /// Side effects of an eligible decision
    pub fn plan(&self, state: &ProductState, today: NaiveDate) -> Option<UpdatePlan> {
        if !self.is_eligible() {
            return None;
        }
        let next_tier = self.next_tier.clone()?;
        Some(UpdatePlan::build(
            state,
            next_tier,
            self.next_scheme.clone(),
            today,
        ))
    }
}

/// Combines eligibility, tier rotation, scheme mapping and validation
#[derive(Debug, Clone)]
pub struct DecisionComposer {
    active: ActiveConfig,
    eligibility: EligibilityEvaluator,
    gatekeeper: Gatekeeper,
}

impl DecisionComposer {
    /// Create a composer bound to one config snapshot
    pub fn new(active: ActiveConfig) -> Self {
        Self {
            active,
            eligibility: EligibilityEvaluator::new(active.thresholds),
            gatekeeper: Gatekeeper::new(),
        }
    }

    /// The snapshot this composer evaluates against
    pub fn active(&self) -> &ActiveConfig {
        &self.active
    }

    /// Evaluate one product
    ///
    /// Pure: nothing is written, the caller applies [`Evaluation::plan`].
    pub fn evaluate(
        &self,
        signal: &ProductSignal,
        state: &ProductState,
        today: NaiveDate,
    ) -> Evaluation {
        let checks = self
            .eligibility
            .check(signal, state.last_auto_discount_update, today);

        let diagnostics = Diagnostics {
            current_tier: state.current_tier.clone(),
            current_scheme: state.current_scheme.clone(),
            last_auto_discount_update: state.last_auto_discount_update,
            days_since_modification: checks.days_since_modification,
            days_since_last_import: signal.days_since_last_import,
            days_since_last_sale: signal.days_since_last_sale,
        };

        if !checks.any() {
            debug!(sku = %state.sku, "not eligible");
            return Evaluation {
                route: Route::None,
                next_tier: None,
                next_scheme: None,
                reject_reason: Some(RejectReason::NotEligible),
                diagnostics,
            };
        }

        let route = checks.route();
        let next_tier = self.next_tier(&state.current_tier);
        let next_scheme = next_scheme(&state.current_scheme, route.permits_scheme_change());
        let final_scheme = next_scheme.as_ref().unwrap_or(&state.current_scheme);

        let validation = self.gatekeeper.validate(final_scheme, &next_tier);
        let reject_reason = if validation.is_accepted() {
            None
        } else {
            Some(RejectReason::ViolatesInvariant(validation.reasons))
        };

        debug!(
            sku = %state.sku,
            route = ?route,
            from = %state.current_tier,
            to = %next_tier,
            scheme = %final_scheme,
            accepted = reject_reason.is_none(),
            "decision composed"
        );

        Evaluation {
            route,
            next_tier: Some(next_tier),
            next_scheme,
            reject_reason,
            diagnostics,
        }
    }

    /// Rotate the tier, then apply the regime floor to products without a discount
    fn next_tier(&self, current: &TierValue) -> TierValue {
        let floor = self.active.regime.tier_floor();
        if current.is(DiscountTier::NoDiscount) && floor.is_discounted() {
            return floor.into();
        }
        current.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clearance_domain::{GlobalConfig, Regime, ThresholdConfig};
    use proptest::prelude::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 15).unwrap()
    }

    fn composer(regime: Regime) -> DecisionComposer {
        DecisionComposer::new(GlobalConfig::default().resolve(Some(regime)))
    }

    fn state(tier: impl Into<TierValue>, scheme: &str) -> ProductState {
        ProductState {
            current_tier: tier.into(),
            current_scheme: CostScheme::new(scheme),
            ..ProductState::new("IF6463")
        }
    }

    #[test]
    fn test_route1_moves_to_push1_on_liquidation_scheme() {
        let signal = ProductSignal::new("IF6463", Some(600.0), None);
        let evaluation = composer(Regime::Regular).evaluate(
            &signal,
            &state(DiscountTier::NoDiscount, "NDA_20M_T1"),
            today(),
        );

        assert!(evaluation.is_eligible());
        assert_eq!(evaluation.route, Route::ImportAge);
        assert_eq!(evaluation.next_tier, Some(DiscountTier::Push1.into()));
        assert_eq!(evaluation.next_scheme, Some(CostScheme::liq_small()));
    }

    #[test]
    fn test_no_route_without_anchor_is_not_eligible() {
        let signal = ProductSignal::new("IF6463", Some(200.0), None);
        let evaluation = composer(Regime::Regular).evaluate(
            &signal,
            &state(DiscountTier::NoDiscount, "NDA_20M_T1"),
            today(),
        );

        assert!(!evaluation.is_eligible());
        assert_eq!(evaluation.route, Route::None);
        assert_eq!(evaluation.reject_reason, Some(RejectReason::NotEligible));
        assert_eq!(evaluation.next_tier, None);
        assert!(evaluation.plan(&ProductState::new("IF6463"), today()).is_none());
    }

    #[test]
    fn test_liquidate_all_stock_floor() {
        let signal = ProductSignal::new("IF6463", Some(600.0), None);
        let evaluation = composer(Regime::LiquidateAllStock).evaluate(
            &signal,
            &state(DiscountTier::NoDiscount, "NDA_30M_T1"),
            today(),
        );

        assert_eq!(evaluation.next_tier, Some(DiscountTier::Push1.into()));
        assert_eq!(evaluation.next_scheme, Some(CostScheme::liq_large()));
    }

    #[test]
    fn test_floor_does_not_apply_to_discounted_tiers() {
        let signal = ProductSignal::new("IF6463", Some(600.0), None);
        let evaluation = composer(Regime::LiquidateAllStock).evaluate(
            &signal,
            &state(DiscountTier::Push1, "LIQ_20M"),
            today(),
        );

        assert_eq!(evaluation.next_tier, Some(DiscountTier::Push2.into()));
        assert_eq!(evaluation.next_scheme, None);
    }

    #[test]
    fn test_route2_keeps_scheme() {
        let mut current = state(DiscountTier::Push1, "NDA_20M_T1");
        current.last_auto_discount_update = NaiveDate::from_ymd_opt(2026, 6, 1);
        let signal = ProductSignal::new("IF6463", Some(300.0), Some(150.0));

        let evaluation = composer(Regime::Regular).evaluate(&signal, &current, today());

        assert!(evaluation.is_eligible());
        assert_eq!(evaluation.route, Route::SalesStaleness);
        assert_eq!(evaluation.next_tier, Some(DiscountTier::Push2.into()));
        assert_eq!(evaluation.next_scheme, None);
        assert_eq!(evaluation.diagnostics.days_since_modification, Some(136));
    }

    #[test]
    fn test_both_routes_prefer_route1() {
        let mut current = state(DiscountTier::Push1, "NDA_30M_T1");
        current.last_auto_discount_update = NaiveDate::from_ymd_opt(2026, 1, 1);
        let signal = ProductSignal::new("IF6463", Some(700.0), Some(300.0));

        let evaluation = composer(Regime::Regular).evaluate(&signal, &current, today());

        assert_eq!(evaluation.route, Route::ImportAge);
        assert_eq!(evaluation.next_scheme, Some(CostScheme::liq_large()));
    }

    #[test]
    fn test_liquidation_rotates_to_push1() {
        let signal = ProductSignal::new("IF6463", Some(900.0), None);
        let evaluation = composer(Regime::Regular).evaluate(
            &signal,
            &state(DiscountTier::Liquidation, "LIQ_30M"),
            today(),
        );

        assert!(evaluation.is_eligible());
        assert_eq!(evaluation.next_tier, Some(DiscountTier::Push1.into()));
    }

    #[test]
    fn test_unrecognized_tier_passes_through() {
        let composer = DecisionComposer::new(ActiveConfig {
            regime: Regime::LiquidateAllStock,
            thresholds: ThresholdConfig::new(10, 10, 10),
        });
        let current = state(TierValue::from_label("OUTLET"), "LIQ_20M");
        let signal = ProductSignal::new("IF6463", Some(50.0), None);

        let evaluation = composer.evaluate(&signal, &current, today());

        assert!(evaluation.is_eligible());
        assert!(!evaluation.violates_invariant());
        assert_eq!(evaluation.next_tier, Some(TierValue::from_label("OUTLET")));
        assert_eq!(evaluation.next_scheme, None);
    }

    #[test]
    fn test_plan_for_eligible_decision() {
        let current = state(DiscountTier::NoDiscount, "NDA_20M_T1");
        let signal = ProductSignal::new("IF6463", Some(600.0), None);
        let evaluation = composer(Regime::Regular).evaluate(&signal, &current, today());

        let plan = evaluation.plan(&current, today()).unwrap();
        assert_eq!(plan.final_scheme, CostScheme::liq_small());
        assert!(plan.requires_price_recalculation());
        assert!(plan.liquidation_category_added);
        assert_eq!(plan.refresh_date, Some(today()));
    }

    #[test]
    fn test_diagnostics_carry_raw_signal() {
        let signal = ProductSignal::new("IF6463", Some(12.5), Some(0.0));
        let evaluation = composer(Regime::LiquidateSoft).evaluate(
            &signal,
            &state(DiscountTier::NoDiscount, ""),
            today(),
        );

        assert_eq!(evaluation.diagnostics.days_since_last_import, Some(12.5));
        assert_eq!(evaluation.diagnostics.days_since_last_sale, Some(0.0));
        assert_eq!(evaluation.diagnostics.current_scheme, CostScheme::default());
    }

    proptest! {
        #[test]
        fn prop_eligible_decisions_never_pair_liquidation_with_no_discount(
            tier in prop::sample::select(DiscountTier::ALL.to_vec()),
            scheme in prop::sample::select(vec!["LIQ_20M", "LIQ_30M", "NDA_20M_T1", "NDA_40M_T1", "X"]),
            regime in prop::sample::select(Regime::ALL.to_vec()),
            import_age in 0.0f64..1000.0,
            sale in prop::option::of(0.0f64..400.0),
            anchor_days in prop::option::of(0i64..400),
        ) {
            let mut current = state(tier, scheme);
            current.last_auto_discount_update =
                anchor_days.map(|days| today() - chrono::Duration::days(days));
            let signal = ProductSignal::new("IF6463", Some(import_age), sale);

            let evaluation = composer(regime).evaluate(&signal, &current, today());

            if let Some(plan) = evaluation.plan(&current, today()) {
                prop_assert!(
                    !(plan.final_scheme.is_liquidation()
                        && plan.next_tier.is(DiscountTier::NoDiscount))
                );
            }
        }
    }
}
