//! Update plan - the side effects of an accepted discount decision
//!
//! The engine never talks to the catalog directly. It computes an
//! [`UpdatePlan`] describing what the catalog must change, and the batch
//! orchestrator hands that plan to a [`CatalogSource`](crate::CatalogSource).

use crate::{CostScheme, DiscountTier, ProductState, TierValue};
use chrono::NaiveDate;
use serde::Serialize;

/// Category tag marking a product as being liquidated
pub const LIQUIDATION_CATEGORY: &str = "Liquidacion";

/// Changes to apply to one catalog record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdatePlan {
    /// Product identity
    pub sku: String,

    /// Tier before the update
    pub previous_tier: TierValue,

    /// Tier after the update
    pub next_tier: TierValue,

    /// Scheme before the update
    pub previous_scheme: CostScheme,

    /// Scheme after the update (the new scheme, or the current one when unchanged)
    pub final_scheme: CostScheme,

    /// New anchor date, when the anchor must be refreshed
    pub refresh_date: Option<NaiveDate>,

    /// Full category list after the update
    pub categories: Vec<String>,

    /// Whether this update adds the liquidation category
    pub liquidation_category_added: bool,
}

impl UpdatePlan {
    /// Build the plan for an accepted decision
    ///
    /// - The anchor date is refreshed to `today` when the scheme moves onto a
    ///   liquidation scheme, or the tier changes to Push1, Push2 or Liquidation.
    /// - The liquidation category is added when the final tier is Liquidation,
    ///   or the final scheme is a liquidation scheme on Push1/Push2. It is
    ///   never removed.
    pub fn build(
        state: &ProductState,
        next_tier: TierValue,
        next_scheme: Option<CostScheme>,
        today: NaiveDate,
    ) -> Self {
        let final_scheme = next_scheme.unwrap_or_else(|| state.current_scheme.clone());

        let refresh_date = refreshes_anchor(state, &next_tier, &final_scheme).then_some(today);

        let mut categories = state.categories.clone();
        let liquidation_category_added = needs_liquidation_category(&final_scheme, &next_tier)
            && !state.has_category(LIQUIDATION_CATEGORY);
        if liquidation_category_added {
            categories.push(LIQUIDATION_CATEGORY.to_string());
        }

        Self {
            sku: state.sku.clone(),
            previous_tier: state.current_tier.clone(),
            next_tier,
            previous_scheme: state.current_scheme.clone(),
            final_scheme,
            refresh_date,
            categories,
            liquidation_category_added,
        }
    }

    /// Whether the cost scheme actually changes
    pub fn scheme_changed(&self) -> bool {
        self.previous_scheme != self.final_scheme
    }

    /// Whether a price recalculation must follow the update
    pub fn requires_price_recalculation(&self) -> bool {
        self.scheme_changed()
    }

    /// Whether the category list must be sent to the catalog
    pub fn categories_changed(&self) -> bool {
        self.liquidation_category_added
    }
}

fn needs_liquidation_category(scheme: &CostScheme, tier: &TierValue) -> bool {
    match tier.known() {
        Some(DiscountTier::Liquidation) => true,
        Some(DiscountTier::Push1) | Some(DiscountTier::Push2) => scheme.is_liquidation(),
        _ => false,
    }
}

fn refreshes_anchor(state: &ProductState, next_tier: &TierValue, final_scheme: &CostScheme) -> bool {
    let moved_to_liquidation_scheme =
        state.current_scheme != *final_scheme && final_scheme.is_liquidation();
    let moved_to_discounted_tier = state.current_tier != *next_tier
        && next_tier.known().is_some_and(|tier| tier.is_discounted());

    moved_to_liquidation_scheme || moved_to_discounted_tier
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 15).unwrap()
    }

    fn state(tier: DiscountTier, scheme: &str) -> ProductState {
        ProductState {
            current_tier: tier.into(),
            current_scheme: CostScheme::new(scheme),
            categories: vec!["Zapatillas".to_string()],
            ..ProductState::new("IF6463")
        }
    }

    #[test]
    fn test_tier_change_refreshes_anchor() {
        let plan = UpdatePlan::build(
            &state(DiscountTier::NoDiscount, "NDA_20M_T1"),
            DiscountTier::Push1.into(),
            None,
            today(),
        );

        assert_eq!(plan.refresh_date, Some(today()));
        assert!(!plan.scheme_changed());
        assert!(!plan.requires_price_recalculation());
        assert!(!plan.categories_changed());
        assert_eq!(plan.categories, vec!["Zapatillas".to_string()]);
    }

    #[test]
    fn test_scheme_change_on_push_adds_category() {
        let plan = UpdatePlan::build(
            &state(DiscountTier::NoDiscount, "NDA_20M_T1"),
            DiscountTier::Push1.into(),
            Some(CostScheme::liq_small()),
            today(),
        );

        assert_eq!(plan.final_scheme, CostScheme::liq_small());
        assert!(plan.scheme_changed());
        assert!(plan.requires_price_recalculation());
        assert!(plan.liquidation_category_added);
        assert_eq!(
            plan.categories,
            vec!["Zapatillas".to_string(), LIQUIDATION_CATEGORY.to_string()]
        );
    }

    #[test]
    fn test_liquidation_tier_always_tagged() {
        let plan = UpdatePlan::build(
            &state(DiscountTier::Push2, "NDA_20M_T1"),
            DiscountTier::Liquidation.into(),
            None,
            today(),
        );

        assert!(plan.liquidation_category_added);
        assert!(!plan.scheme_changed());
    }

    #[test]
    fn test_existing_tag_is_kept_not_duplicated() {
        let mut current = state(DiscountTier::Push2, "LIQ_30M");
        current.categories.push(LIQUIDATION_CATEGORY.to_string());

        let plan = UpdatePlan::build(&current, DiscountTier::Liquidation.into(), None, today());

        assert!(!plan.liquidation_category_added);
        assert_eq!(
            plan.categories
                .iter()
                .filter(|c| *c == LIQUIDATION_CATEGORY)
                .count(),
            1
        );
    }

    #[test]
    fn test_standard_scheme_on_push_is_not_tagged() {
        let plan = UpdatePlan::build(
            &state(DiscountTier::Push1, "NDA_20M_T1"),
            DiscountTier::Push2.into(),
            None,
            today(),
        );

        assert!(!plan.liquidation_category_added);
    }

    #[test]
    fn test_unchanged_unrecognized_tier_keeps_anchor() {
        let mut current = state(DiscountTier::NoDiscount, "LIQ_20M");
        current.current_tier = TierValue::from_label("OUTLET");

        let plan = UpdatePlan::build(&current, current.current_tier.clone(), None, today());

        assert_eq!(plan.refresh_date, None);
        assert!(!plan.liquidation_category_added);
    }
}
