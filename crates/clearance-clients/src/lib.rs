//! Clearance Collaborator Clients
//!
//! HTTP implementations of the [`SignalSource`](clearance_domain::SignalSource)
//! and [`CatalogSource`](clearance_domain::CatalogSource) traits, plus
//! in-memory mocks for tests.
//!
//! # Clients
//!
//! - [`ChurnClient`]: reads the aging-products report (`/kpi/product-churn`)
//! - [`CatalogClient`]: reads and updates product records (`/empleados/...`)
//! - [`MockSignalSource`], [`MockCatalog`]: deterministic in-memory doubles
//!
//! # Status mapping
//!
//! | Response | Error |
//! |----------|-------|
//! | connection failure / timeout | `Transport` |
//! | 404 | `NotFound` |
//! | 400 / 422 on a write | `RemoteValidation` |
//! | any other non-2xx | `Transport` |
//! | malformed body | `InvalidResponse` |
//!
//! # Examples
//!
//! ```
//! use clearance_clients::MockSignalSource;
//! use clearance_domain::{ProductSignal, SignalSource};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let source = MockSignalSource::new(vec![ProductSignal::new("IF6463", Some(600.0), None)]);
//! let candidates = source.fetch_candidates().await.unwrap();
//! assert_eq!(candidates.len(), 1);
//! assert_eq!(source.call_count(), 1);
//! # }
//! ```

#![warn(missing_docs)]

pub mod catalog;
pub mod churn;
mod http;
pub mod mock;

use thiserror::Error;

pub use catalog::CatalogClient;
pub use churn::ChurnClient;
pub use mock::{CatalogCall, MockCatalog, MockSignalSource};

/// Errors raised while constructing a client
#[derive(Error, Debug)]
pub enum ClientError {
    /// The underlying HTTP client could not be built
    #[error("Failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),

    /// Base URL is empty
    #[error("Base URL must not be empty")]
    EmptyBaseUrl,
}

fn normalize_base_url(base_url: String) -> Result<String, ClientError> {
    let trimmed = base_url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ClientError::EmptyBaseUrl);
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(
            normalize_base_url("http://avax.local/api/".to_string()).unwrap(),
            "http://avax.local/api"
        );
        assert!(matches!(
            normalize_base_url("  ".to_string()),
            Err(ClientError::EmptyBaseUrl)
        ));
    }
}
