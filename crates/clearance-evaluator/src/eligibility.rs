//! Eligibility routes

use chrono::NaiveDate;
use clearance_domain::{ProductSignal, ThresholdConfig};
use serde::Serialize;

/// Route that made a product eligible
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Route {
    /// Route 1: stock imported too long ago
    #[serde(rename = "route1_import_age")]
    ImportAge,

    /// Route 2: no recent sales and no recent automatic change
    #[serde(rename = "route2_sales_staleness")]
    SalesStaleness,

    /// Neither route fired
    #[serde(rename = "none")]
    None,
}

impl Route {
    /// Whether this route may change the cost scheme
    pub fn permits_scheme_change(&self) -> bool {
        matches!(self, Route::ImportAge)
    }
}

/// Outcome of both route checks for one product
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteChecks {
    /// Route 1 fired
    pub import_age: bool,

    /// Route 2 fired
    pub sales_staleness: bool,

    /// Whole days since the last automatic discount update, if an anchor exists
    pub days_since_modification: Option<i64>,
}

impl RouteChecks {
    /// Route used, with route 1 taking precedence
    pub fn route(&self) -> Route {
        if self.import_age {
            Route::ImportAge
        } else if self.sales_staleness {
            Route::SalesStaleness
        } else {
            Route::None
        }
    }

    /// Whether any route fired
    pub fn any(&self) -> bool {
        self.import_age || self.sales_staleness
    }
}

/// Evaluates both eligibility routes against one threshold set
#[derive(Debug, Clone, Copy)]
pub struct EligibilityEvaluator {
    thresholds: ThresholdConfig,
}

impl EligibilityEvaluator {
    /// Create an evaluator for a threshold set
    pub fn new(thresholds: ThresholdConfig) -> Self {
        Self { thresholds }
    }

    /// Run both routes
    pub fn check(
        &self,
        signal: &ProductSignal,
        last_update: Option<NaiveDate>,
        today: NaiveDate,
    ) -> RouteChecks {
        let days_since_modification = last_update.map(|anchor| (today - anchor).num_days());

        RouteChecks {
            import_age: self.import_age_route(signal),
            sales_staleness: self.sales_staleness_route(signal, days_since_modification),
            days_since_modification,
        }
    }

    /// Route 1: days since last import exceed the maximum import age
    pub fn import_age_route(&self, signal: &ProductSignal) -> bool {
        signal.import_age() > f64::from(self.thresholds.max_import_age)
    }

    /// Route 2: stale sales AND a stale automatic update
    ///
    /// Without an anchor date staleness cannot be established, so the route
    /// does not fire.
    pub fn sales_staleness_route(
        &self,
        signal: &ProductSignal,
        days_since_modification: Option<i64>,
    ) -> bool {
        let Some(days_since_modification) = days_since_modification else {
            return false;
        };

        let stale_sales =
            signal.effective_days_since_sale() > f64::from(self.thresholds.min_days_since_sale);
        let stale_update = days_since_modification
            > i64::from(self.thresholds.min_days_since_last_discount_update);

        stale_sales && stale_update
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evaluator() -> EligibilityEvaluator {
        EligibilityEvaluator::new(ThresholdConfig::new(500, 80, 80))
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_import_age_is_strictly_greater() {
        let evaluator = evaluator();
        assert!(evaluator.import_age_route(&ProductSignal::new("A", Some(501.0), None)));
        assert!(!evaluator.import_age_route(&ProductSignal::new("A", Some(500.0), None)));
        assert!(!evaluator.import_age_route(&ProductSignal::new("A", None, None)));
    }

    #[test]
    fn test_sales_staleness_needs_anchor() {
        let evaluator = evaluator();
        let signal = ProductSignal::new("A", Some(300.0), Some(200.0));

        assert!(!evaluator.sales_staleness_route(&signal, None));
        assert!(evaluator.sales_staleness_route(&signal, Some(81)));
    }

    #[test]
    fn test_sales_staleness_requires_both_thresholds() {
        let evaluator = evaluator();

        let recent_sale = ProductSignal::new("A", Some(300.0), Some(30.0));
        assert!(!evaluator.sales_staleness_route(&recent_sale, Some(200)));

        let stale_sale = ProductSignal::new("A", Some(300.0), Some(90.0));
        assert!(!evaluator.sales_staleness_route(&stale_sale, Some(80)));
        assert!(evaluator.sales_staleness_route(&stale_sale, Some(81)));
    }

    #[test]
    fn test_sales_staleness_falls_back_to_import_age() {
        let evaluator = evaluator();

        let never_sold = ProductSignal::new("A", Some(100.0), None);
        assert!(evaluator.sales_staleness_route(&never_sold, Some(100)));

        let zero_sale = ProductSignal::new("A", Some(50.0), Some(0.0));
        assert!(!evaluator.sales_staleness_route(&zero_sale, Some(100)));
    }

    #[test]
    fn test_check_computes_days_since_modification() {
        let evaluator = evaluator();
        let signal = ProductSignal::new("A", Some(200.0), Some(120.0));

        let checks = evaluator.check(&signal, Some(date(2026, 2, 6)), date(2026, 5, 7));
        assert_eq!(checks.days_since_modification, Some(90));
        assert!(!checks.import_age);
        assert!(checks.sales_staleness);
        assert_eq!(checks.route(), Route::SalesStaleness);
    }

    #[test]
    fn test_route_one_takes_precedence() {
        let checks = RouteChecks {
            import_age: true,
            sales_staleness: true,
            days_since_modification: Some(100),
        };
        assert_eq!(checks.route(), Route::ImportAge);
        assert!(checks.route().permits_scheme_change());
        assert!(!Route::SalesStaleness.permits_scheme_change());
    }

    #[test]
    fn test_no_route() {
        let evaluator = evaluator();
        let checks = evaluator.check(
            &ProductSignal::new("A", Some(200.0), None),
            None,
            date(2026, 10, 15),
        );
        assert!(!checks.any());
        assert_eq!(checks.route(), Route::None);
    }
}
