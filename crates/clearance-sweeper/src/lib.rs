//! Clearance Sweeper
//!
//! Batch orchestrator for automated discount decisions.
//!
//! # Overview
//!
//! The sweeper is responsible for:
//! - **Candidate intake**: pulling the churn report once per batch
//! - **Evaluation**: fetching each product's catalog state and running the
//!   decision composer against one config snapshot
//! - **Mutation**: writing accepted decisions (record, categories, prices)
//! - **Classification**: one outcome per product, counted in a [`BatchReport`]
//!
//! # Outcomes
//!
//! | Status | When | Counter |
//! |--------|------|---------|
//! | `applied` | decision accepted and written | `modified` |
//! | `not_apto` | neither route fired | `not_apto` |
//! | `error_validacion` | gatekeeper refused the decision | `not_apto` |
//! | `excluded` | automatic discounts disabled | `excluded` |
//! | `not_found` | absent from the churn report (catalog never called) | `not_found` |
//! | `error` | a collaborator failed for this product | `errors` |
//!
//! # Usage
//!
//! ## One-time Batch
//!
//! ```
//! use clearance_clients::{MockCatalog, MockSignalSource};
//! use clearance_domain::ProductSignal;
//! use clearance_sweeper::{ConfigStore, Sweeper, SweeperConfig};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let signals = MockSignalSource::new(vec![ProductSignal::new("IF6463", Some(10.0), None)]);
//! let sweeper = Sweeper::new(signals, MockCatalog::new(), ConfigStore::default(), SweeperConfig::immediate());
//!
//! let report = sweeper.run_all(None).await;
//! assert_eq!(report.errors, 1); // the catalog does not know IF6463
//! # }
//! ```
//!
//! ## Configuration
//!
//! The sweeper reads its settings from the server's TOML file:
//!
//! ```toml
//! [sweeper]
//! request_delay_secs = 3
//! schedule_hour = 5
//! schedule_minute = 0
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod outcome;
mod report;
mod store;
mod sweeper;
mod worker;

pub use config::SweeperConfig;
pub use error::SweeperError;
pub use outcome::{CatalogData, DecisionContext, Outcome, SignalData, NO_SALES};
pub use report::BatchReport;
pub use store::ConfigStore;
pub use sweeper::Sweeper;
pub use worker::{next_run_after, SweeperWorker};
