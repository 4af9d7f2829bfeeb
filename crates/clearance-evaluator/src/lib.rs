//! Clearance Evaluator
//!
//! Decides, for one product, whether its discount tier should advance.
//!
//! # Overview
//!
//! Two independent eligibility routes are checked against the thresholds of
//! the active regime:
//!
//! | Route | Fires when | May change cost scheme |
//! |-------|------------|------------------------|
//! | **Import age** (route 1) | days since last import > `max_import_age` | yes |
//! | **Sales staleness** (route 2) | days since sale > `min_days_since_sale` AND days since last automatic update > `min_days_since_last_discount_update` | no |
//!
//! Route 1 always wins when both fire. An eligible product advances one tier
//! (rotating `LIQUIDACION` back to `PUSH1`), may move onto a liquidation
//! scheme, and the result is checked by the gatekeeper before it is
//! returned as eligible.
//!
//! # Usage
//!
//! ```
//! use chrono::NaiveDate;
//! use clearance_domain::{CostScheme, DiscountTier, GlobalConfig, ProductSignal, ProductState};
//! use clearance_evaluator::{DecisionComposer, Route};
//!
//! let composer = DecisionComposer::new(GlobalConfig::default().resolve(None));
//! let signal = ProductSignal::new("IF6463", Some(600.0), None);
//! let state = ProductState {
//!     current_scheme: CostScheme::new("NDA_20M_T1"),
//!     ..ProductState::new("IF6463")
//! };
//!
//! let today = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap();
//! let evaluation = composer.evaluate(&signal, &state, today);
//!
//! assert!(evaluation.is_eligible());
//! assert_eq!(evaluation.route, Route::ImportAge);
//! assert_eq!(evaluation.next_tier, Some(DiscountTier::Push1.into()));
//! assert_eq!(evaluation.next_scheme, Some(CostScheme::liq_small()));
//! ```

#![warn(missing_docs)]

mod decision;
mod eligibility;

pub use decision::{DecisionComposer, Diagnostics, Evaluation, RejectReason};
pub use eligibility::{EligibilityEvaluator, Route, RouteChecks};
