//! Churn report client
//!
//! Reads per-product staleness metrics from the analytics service's
//! aging-products report.

use crate::http::{ensure_success, read_json, transport_error};
use crate::{normalize_base_url, ClientError};
use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use clearance_domain::{CollaboratorError, ProductSignal, SignalSource};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Default timeout for churn requests (60 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

const REPORT_PATH: &str = "/kpi/product-churn";

/// HTTP client for the churn report
#[derive(Debug, Clone)]
pub struct ChurnClient {
    base_url: String,
    token: String,
    client: reqwest::Client,
}

/// Report body; only the aging list is read
#[derive(Deserialize)]
struct ChurnReport {
    #[serde(default)]
    aging_products: Vec<AgingProduct>,
}

#[derive(Deserialize)]
struct AgingProduct {
    #[serde(default)]
    cod_prod: Option<String>,
    #[serde(default)]
    sku: Option<String>,
    #[serde(default)]
    last_import_age_max: Option<f64>,
    #[serde(default)]
    days_since_last_sale_min: Option<f64>,
}

impl AgingProduct {
    /// `sku` keys every lookup; `cod_prod` only fills in when it is absent
    fn into_signal(self) -> Option<ProductSignal> {
        let sku = self
            .sku
            .filter(|id| !id.trim().is_empty())
            .or(self.cod_prod.filter(|id| !id.trim().is_empty()))?;

        Some(ProductSignal::new(
            sku.trim(),
            self.last_import_age_max,
            self.days_since_last_sale_min,
        ))
    }
}

impl ChurnClient {
    /// Create a client with the default timeout
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, token, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a client with a custom timeout
    pub fn with_timeout(
        base_url: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: normalize_base_url(base_url.into())?,
            token: token.into(),
            client,
        })
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Query parameters for a report ending `today`
    fn report_query(today: NaiveDate) -> Vec<(&'static str, String)> {
        let yesterday = today.pred_opt().unwrap_or(today);
        vec![
            ("start_date", yesterday.format("%Y-%m-%d").to_string()),
            ("end_date", today.format("%Y-%m-%d").to_string()),
            ("granularity", "1".to_string()),
            ("group_by", "sku".to_string()),
            ("include_avax_licenses", "false".to_string()),
            ("include_initial_stock", "true".to_string()),
            ("include_credit", "true".to_string()),
        ]
    }
}

/// Parse a churn report body into signals
///
/// Entries without a product code are skipped. A missing `aging_products`
/// array is read as an empty report.
pub fn parse_report(body: serde_json::Value) -> Result<Vec<ProductSignal>, CollaboratorError> {
    let report: ChurnReport = serde_json::from_value(body)
        .map_err(|e| CollaboratorError::InvalidResponse(format!("Malformed churn report: {}", e)))?;

    Ok(report
        .aging_products
        .into_iter()
        .filter_map(AgingProduct::into_signal)
        .collect())
}

#[async_trait]
impl SignalSource for ChurnClient {
    async fn fetch_candidates(&self) -> Result<Vec<ProductSignal>, CollaboratorError> {
        let url = format!("{}{}", self.base_url, REPORT_PATH);
        let query = Self::report_query(Local::now().date_naive());

        let response = self
            .client
            .get(&url)
            .query(&query)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(transport_error)?;

        let response = ensure_success(response, REPORT_PATH, false).await?;
        let signals = parse_report(read_json(response).await?)?;

        debug!(count = signals.len(), "churn report fetched");
        Ok(signals)
    }
}
