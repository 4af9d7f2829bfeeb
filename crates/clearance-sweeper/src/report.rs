//! Batch report: counters and ordered outcomes

use crate::Outcome;
use clearance_domain::{ActiveConfig, Regime, ThresholdConfig};
use serde::Serialize;

/// Result of one batch run
///
/// Invalid-invariant outcomes are counted with the not-eligible ones; the
/// report has no separate bucket for them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    /// Regime the batch ran under
    pub regime: Option<Regime>,

    /// Thresholds the batch ran with
    pub thresholds: Option<ThresholdConfig>,

    /// Products looked at
    pub evaluated: usize,

    /// Products updated
    pub modified: usize,

    /// Products not advanced (not eligible or refused by the gatekeeper)
    pub not_apto: usize,

    /// Products with automatic discounts disabled
    pub excluded: usize,

    /// Products absent from the churn report
    pub not_found: usize,

    /// Products that failed
    pub errors: usize,

    /// Set only when the candidate list could not be fetched
    pub error_general: Option<String>,

    /// Per-product outcomes in processing order
    pub results: Vec<Outcome>,
}

impl BatchReport {
    /// Create an empty report for a config snapshot
    pub fn new(active: &ActiveConfig) -> Self {
        Self {
            regime: Some(active.regime),
            thresholds: Some(active.thresholds),
            ..Self::default()
        }
    }

    /// Report for a batch that never started
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error_general: Some(message.into()),
            ..Self::default()
        }
    }

    /// Count and store one outcome
    pub fn record(&mut self, outcome: Outcome) {
        self.evaluated += 1;
        match &outcome {
            Outcome::Applied { .. } => self.modified += 1,
            Outcome::NotEligible { .. } | Outcome::InvariantViolation { .. } => self.not_apto += 1,
            Outcome::Excluded { .. } => self.excluded += 1,
            Outcome::NotFound { .. } => self.not_found += 1,
            Outcome::Error { .. } => self.errors += 1,
        }
        self.results.push(outcome);
    }

    /// Whether the batch could not run at all
    pub fn is_failed(&self) -> bool {
        self.error_general.is_some()
    }

    /// Generate a summary report
    pub fn summary(&self) -> String {
        let regime = self
            .regime
            .map(|regime| regime.as_str())
            .unwrap_or("unknown");

        let mut lines = vec![
            "Discount Batch Summary".to_string(),
            "======================".to_string(),
            format!("Regime: {}", regime),
        ];

        if let Some(thresholds) = &self.thresholds {
            lines.push(format!(
                "Thresholds: import > {}, sale > {}, last update > {}",
                thresholds.max_import_age,
                thresholds.min_days_since_sale,
                thresholds.min_days_since_last_discount_update
            ));
        }

        if let Some(error) = &self.error_general {
            lines.push(format!("Batch failed: {}", error));
            return lines.join("\n");
        }

        lines.push(format!("Evaluated: {}", self.evaluated));
        lines.push(format!("Modified: {}", self.modified));
        lines.push(format!("Not eligible: {}", self.not_apto));
        lines.push(format!("Excluded: {}", self.excluded));
        lines.push(format!("Not found: {}", self.not_found));
        lines.push(format!("Errors: {}", self.errors));

        lines.join("\n")
    }
}
