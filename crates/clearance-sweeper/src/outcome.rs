//! Per-product outcome records

use chrono::NaiveDate;
use clearance_domain::{ActiveConfig, CostScheme, Regime, ThresholdConfig, TierValue};
use clearance_evaluator::{Evaluation, Route};
use clearance_gatekeeper::RejectionReason;
use serde::Serialize;

/// Shown instead of a sale count when the product never sold
pub const NO_SALES: &str = "no sales";

/// Signal values as reported
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalData {
    /// Import age, missing read as zero
    pub days_since_last_import: f64,

    /// Days since sale, or [`NO_SALES`]
    pub days_since_last_sale: String,
}

/// Catalog values the decision was computed from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogData {
    /// Scheme before the run
    pub current_scheme: CostScheme,

    /// Route 2 anchor date
    pub last_auto_discount_update: Option<NaiveDate>,

    /// Whole days since the anchor
    pub days_since_modification: Option<i64>,

    /// Automatic discount flag
    pub auto_discount_enabled: bool,
}

/// Regime, thresholds and inputs shared by every evaluated outcome
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionContext {
    /// Regime used
    pub regime: Regime,

    /// Route evaluated
    pub route: Route,

    /// Thresholds used
    pub thresholds: ThresholdConfig,

    /// Churn values
    pub signal: SignalData,

    /// Catalog values
    pub catalog: CatalogData,
}

impl DecisionContext {
    /// Collect the context of one evaluation
    pub fn new(active: &ActiveConfig, evaluation: &Evaluation, auto_discount_enabled: bool) -> Self {
        let diagnostics = &evaluation.diagnostics;
        let days_since_last_sale = match diagnostics.days_since_last_sale {
            Some(days) if days != 0.0 => days.to_string(),
            _ => NO_SALES.to_string(),
        };

        Self {
            regime: active.regime,
            route: evaluation.route,
            thresholds: active.thresholds,
            signal: SignalData {
                days_since_last_import: diagnostics.days_since_last_import.unwrap_or(0.0),
                days_since_last_sale,
            },
            catalog: CatalogData {
                current_scheme: diagnostics.current_scheme.clone(),
                last_auto_discount_update: diagnostics.last_auto_discount_update,
                days_since_modification: diagnostics.days_since_modification,
                auto_discount_enabled,
            },
        }
    }
}

/// Terminal state of one product in a run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status")]
pub enum Outcome {
    /// The new tier was written
    #[serde(rename = "applied")]
    Applied {
        /// Product identity
        sku: String,
        /// Tier before the run
        previous_tier: TierValue,
        /// Tier written
        next_tier: TierValue,
        /// Scheme written, when it changed
        next_scheme: Option<CostScheme>,
        /// Whether this run added the liquidation category
        liquidation_category_added: bool,
        /// Decision inputs
        #[serde(flatten)]
        context: DecisionContext,
        /// Human-readable summary
        message: String,
    },

    /// Neither route fired
    #[serde(rename = "not_apto")]
    NotEligible {
        /// Product identity
        sku: String,
        /// Tier before the run
        current_tier: TierValue,
        /// Decision inputs
        #[serde(flatten)]
        context: DecisionContext,
        /// Human-readable summary
        message: String,
    },

    /// The candidate decision was refused by the gatekeeper
    #[serde(rename = "error_validacion")]
    InvariantViolation {
        /// Product identity
        sku: String,
        /// Tier before the run
        current_tier: TierValue,
        /// Rules broken
        reasons: Vec<RejectionReason>,
        /// Decision inputs
        #[serde(flatten)]
        context: DecisionContext,
        /// Human-readable summary
        message: String,
    },

    /// Automatic discounts are disabled for the product
    #[serde(rename = "excluded")]
    Excluded {
        /// Product identity
        sku: String,
        /// Always false
        auto_discount_enabled: bool,
        /// Human-readable summary
        message: String,
    },

    /// The product is absent from the churn report
    #[serde(rename = "not_found")]
    NotFound {
        /// Product identity
        sku: String,
        /// Human-readable summary
        message: String,
    },

    /// A collaborator failed while processing the product
    #[serde(rename = "error")]
    Error {
        /// Product identity
        sku: String,
        /// Failure description
        message: String,
    },
}

impl Outcome {
    /// Outcome for a product absent from the churn report
    pub fn not_found(sku: &str) -> Self {
        Outcome::NotFound {
            sku: sku.to_string(),
            message: "Product not present in the churn report".to_string(),
        }
    }

    /// Outcome for a product with automatic discounts disabled
    pub fn excluded(sku: &str) -> Self {
        Outcome::Excluded {
            sku: sku.to_string(),
            auto_discount_enabled: false,
            message: "Automatic discounts are disabled for this product".to_string(),
        }
    }

    /// Outcome for a failed product
    pub fn error(sku: &str, message: impl Into<String>) -> Self {
        Outcome::Error {
            sku: sku.to_string(),
            message: message.into(),
        }
    }

    /// Product identity
    pub fn sku(&self) -> &str {
        match self {
            Outcome::Applied { sku, .. }
            | Outcome::NotEligible { sku, .. }
            | Outcome::InvariantViolation { sku, .. }
            | Outcome::Excluded { sku, .. }
            | Outcome::NotFound { sku, .. }
            | Outcome::Error { sku, .. } => sku,
        }
    }

    /// Wire status label
    pub fn status(&self) -> &'static str {
        match self {
            Outcome::Applied { .. } => "applied",
            Outcome::NotEligible { .. } => "not_apto",
            Outcome::InvariantViolation { .. } => "error_validacion",
            Outcome::Excluded { .. } => "excluded",
            Outcome::NotFound { .. } => "not_found",
            Outcome::Error { .. } => "error",
        }
    }

    /// Whether the product was updated
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied { .. })
    }
}
