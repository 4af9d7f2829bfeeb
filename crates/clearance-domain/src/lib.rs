//! Clearance Domain Layer
//!
//! This crate contains the core business vocabulary of the automated discount
//! engine: the tier ladder, cost schemes and their liquidation mapping, the
//! regime/threshold configuration, the product snapshots read from the churn
//! and catalog collaborators, and the update plan handed back to the catalog.
//!
//! ## Key Concepts
//!
//! - **Tier**: Discount level (`Sin descuento` → `PUSH1` → `PUSH2` → `LIQUIDACION`)
//! - **Cost scheme**: Pricing basis; `LIQ_20M` and `LIQ_30M` are liquidation schemes
//! - **Regime**: Named threshold profile selecting how aggressive the engine is
//! - **Update plan**: Side effects of an accepted decision (tier, scheme, categories, anchor date)
//!
//! ## Architecture
//!
//! - Pure business logic only, no I/O
//! - Collaborator seams are expressed as traits in [`traits`]
//! - HTTP implementations live in `clearance-clients`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cost_scheme;
pub mod product;
pub mod regime;
pub mod tier;
pub mod traits;
pub mod update;

// Re-exports for convenience
pub use cost_scheme::{next_scheme, CostScheme};
pub use product::{parse_anchor_date, ProductSignal, ProductState};
pub use regime::{ActiveConfig, ConfigPatch, GlobalConfig, Regime, ThresholdConfig};
pub use tier::{DiscountTier, TierValue};
pub use traits::{CatalogSource, CollaboratorError, SignalSource};
pub use update::{UpdatePlan, LIQUIDATION_CATEGORY};
