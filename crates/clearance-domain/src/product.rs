//! Product snapshots read from the churn and catalog collaborators

use crate::{CostScheme, TierValue};
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

/// Staleness metrics for one product, as reported by the churn source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSignal {
    /// Product identity
    pub sku: String,

    /// Days since stock was last imported
    pub days_since_last_import: Option<f64>,

    /// Days since the product last sold; `None` or zero when it never sold
    pub days_since_last_sale: Option<f64>,
}

impl ProductSignal {
    /// Create a signal
    pub fn new(
        sku: impl Into<String>,
        days_since_last_import: Option<f64>,
        days_since_last_sale: Option<f64>,
    ) -> Self {
        Self {
            sku: sku.into(),
            days_since_last_import,
            days_since_last_sale,
        }
    }

    /// Import age with a missing value read as zero
    pub fn import_age(&self) -> f64 {
        self.days_since_last_import.unwrap_or(0.0)
    }

    /// Whether a sale has ever been recorded
    pub fn has_recorded_sale(&self) -> bool {
        matches!(self.days_since_last_sale, Some(days) if days != 0.0)
    }

    /// Days since sale, falling back to import age when no sale is recorded
    pub fn effective_days_since_sale(&self) -> f64 {
        match self.days_since_last_sale {
            Some(days) if days != 0.0 => days,
            _ => self.import_age(),
        }
    }
}

/// Current discount state of a product, as held by the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductState {
    /// Product identity
    pub sku: String,

    /// Current tier label
    pub current_tier: TierValue,

    /// Current cost scheme
    pub current_scheme: CostScheme,

    /// Date of the last automatic discount change, the Route 2 anchor
    pub last_auto_discount_update: Option<NaiveDate>,

    /// Whether the product takes part in automatic discounting
    pub auto_discount_enabled: bool,

    /// Category identifiers
    pub categories: Vec<String>,

    /// Remaining catalog attributes, passed through untouched
    #[serde(default)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl ProductState {
    /// Create a state with no discount, an empty scheme and auto-discount enabled
    pub fn new(sku: impl Into<String>) -> Self {
        Self {
            sku: sku.into(),
            current_tier: TierValue::default(),
            current_scheme: CostScheme::default(),
            last_auto_discount_update: None,
            auto_discount_enabled: true,
            categories: Vec::new(),
            attributes: serde_json::Map::new(),
        }
    }

    /// Whole days between the anchor date and `today`
    pub fn days_since_update(&self, today: NaiveDate) -> Option<i64> {
        self.last_auto_discount_update
            .map(|anchor| (today - anchor).num_days())
    }

    /// Whether the product carries a category
    pub fn has_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }
}

/// Parse the catalog's anchor date
///
/// Accepts RFC 2822 timestamps (`Fri, 06 Feb 2026 00:00:00 GMT`) and anything
/// starting with an ISO `YYYY-MM-DD` date. Unparsable input yields `None`.
pub fn parse_anchor_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc2822(raw) {
        return Some(timestamp.date_naive());
    }

    raw.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}
