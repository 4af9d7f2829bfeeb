//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the engine and the two
//! collaborators it depends on. HTTP implementations live in
//! `clearance-clients`.

use crate::{ProductSignal, ProductState, UpdatePlan};
use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by a collaborator
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CollaboratorError {
    /// Network or HTTP failure talking to the collaborator
    #[error("Transport error: {0}")]
    Transport(String),

    /// The requested record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The collaborator rejected the update payload
    #[error("Update rejected (HTTP {status}): {message}")]
    RemoteValidation {
        /// HTTP status returned
        status: u16,
        /// Response body or description
        message: String,
    },

    /// The collaborator answered with an unexpected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Source of per-product staleness metrics (the churn collaborator)
#[async_trait]
pub trait SignalSource: Send + Sync {
    /// Fetch the current candidate list
    async fn fetch_candidates(&self) -> Result<Vec<ProductSignal>, CollaboratorError>;
}

/// Authoritative product record store (the catalog collaborator)
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch the current discount state of a product
    async fn fetch_product(&self, sku: &str) -> Result<ProductState, CollaboratorError>;

    /// Write the new tier, scheme and anchor date
    ///
    /// `state` is the record the plan was computed from; its pass-through
    /// attributes are needed to rebuild a full payload.
    async fn apply_update(
        &self,
        state: &ProductState,
        plan: &UpdatePlan,
    ) -> Result<(), CollaboratorError>;

    /// Replace the category list of a product
    async fn update_categories(
        &self,
        sku: &str,
        categories: &[String],
    ) -> Result<(), CollaboratorError>;

    /// Ask the catalog to recompute prices after a scheme change
    async fn trigger_price_recalculation(&self, sku: &str) -> Result<(), CollaboratorError>;
}
