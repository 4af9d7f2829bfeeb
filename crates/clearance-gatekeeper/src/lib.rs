//! Clearance Gatekeeper
//!
//! Guards the one hard invariant of the discount engine: a liquidation cost
//! scheme (`LIQ_20M`, `LIQ_30M`) must never be paired with the
//! `Sin descuento` tier.
//!
//! Every candidate decision passes through the gatekeeper before any
//! mutation is attempted. A rejected decision is reported, never retried.
//!
//! # Examples
//!
//! ```
//! use clearance_domain::{CostScheme, DiscountTier};
//! use clearance_gatekeeper::{Gatekeeper, ValidationStatus};
//!
//! let gatekeeper = Gatekeeper::new();
//!
//! let result = gatekeeper.validate(&CostScheme::liq_small(), &DiscountTier::Push1.into());
//! assert_eq!(result.status, ValidationStatus::Accepted);
//!
//! let result = gatekeeper.validate(&CostScheme::liq_small(), &DiscountTier::NoDiscount.into());
//! assert_eq!(result.status, ValidationStatus::Rejected);
//! ```

#![warn(missing_docs)]

mod validator;

pub use validator::{Gatekeeper, RejectionReason, ValidationResult, ValidationStatus};
