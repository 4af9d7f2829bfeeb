//! Batch orchestration over the churn and catalog collaborators

use crate::outcome::DecisionContext;
use crate::{BatchReport, ConfigStore, Outcome, SweeperConfig, SweeperError};
use chrono::{Local, NaiveDate};
use clearance_domain::{
    CatalogSource, CollaboratorError, ProductSignal, ProductState, Regime, SignalSource,
    UpdatePlan,
};
use clearance_evaluator::{DecisionComposer, Evaluation, RejectReason};
use std::collections::HashMap;

const APPLIED_MESSAGE: &str = "Discount applied";
const NOT_ELIGIBLE_MESSAGE: &str = "Does not meet the conditions to raise the discount";
const INVARIANT_MESSAGE: &str = "Liquidation schemes LIQ_20M/LIQ_30M cannot carry 'Sin descuento'";

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Drives discount evaluation across a set of products
///
/// Products are processed one at a time. A failure on one product is
/// recorded as an [`Outcome::Error`] and the batch moves on; each product
/// gets at most one update attempt per run.
///
/// # Examples
///
/// ```
/// use clearance_clients::{MockCatalog, MockSignalSource};
/// use clearance_domain::{CostScheme, ProductSignal, ProductState};
/// use clearance_sweeper::{ConfigStore, Sweeper, SweeperConfig};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let signals = MockSignalSource::new(vec![ProductSignal::new("IF6463", Some(600.0), None)]);
/// let catalog = MockCatalog::new().with_product(ProductState {
///     current_scheme: CostScheme::new("NDA_20M_T1"),
///     ..ProductState::new("IF6463")
/// });
///
/// let sweeper = Sweeper::new(signals, catalog, ConfigStore::default(), SweeperConfig::immediate());
/// let report = sweeper.run_all(None).await;
///
/// assert_eq!(report.evaluated, 1);
/// assert_eq!(report.modified, 1);
/// println!("{}", report.summary());
/// # }
/// ```
pub struct Sweeper<S, C> {
    signals: S,
    catalog: C,
    store: ConfigStore,
    config: SweeperConfig,
}

impl<S, C> Sweeper<S, C>
where
    S: SignalSource,
    C: CatalogSource,
{
    /// Create a new sweeper
    pub fn new(signals: S, catalog: C, store: ConfigStore, config: SweeperConfig) -> Self {
        Self {
            signals,
            catalog,
            store,
            config,
        }
    }

    /// Engine config store
    pub fn config_store(&self) -> &ConfigStore {
        &self.store
    }

    /// Sweeper settings
    pub fn config(&self) -> &SweeperConfig {
        &self.config
    }

    /// Run every product in the churn report
    ///
    /// A failed candidate fetch is reported through
    /// [`BatchReport::error_general`] with nothing evaluated.
    pub async fn run_all(&self, regime_override: Option<Regime>) -> BatchReport {
        let candidates = match self.signals.fetch_candidates().await {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::error!("Candidate fetch failed: {}", e);
                return BatchReport::failed(e.to_string());
            }
        };

        let composer = DecisionComposer::new(self.store.snapshot(regime_override));
        let today = today();
        let mut report = BatchReport::new(composer.active());

        tracing::info!(
            "Batch started: {} candidates, regime {}",
            candidates.len(),
            composer.active().regime
        );

        for signal in &candidates {
            let outcome = self.settle(&signal.sku, Some(signal), &composer, today).await;
            report.record(outcome);
        }

        tracing::info!(
            "Batch completed: {} evaluated, {} modified, {} errors",
            report.evaluated,
            report.modified,
            report.errors
        );
        report
    }

    /// Run an explicit list of products
    ///
    /// Blank entries are dropped; products absent from the churn report end
    /// as [`Outcome::NotFound`] without touching the catalog.
    pub async fn run_products(
        &self,
        skus: &[String],
        regime_override: Option<Regime>,
    ) -> Result<BatchReport, SweeperError> {
        let requested: Vec<&str> = skus
            .iter()
            .map(|sku| sku.trim())
            .filter(|sku| !sku.is_empty())
            .collect();
        if requested.is_empty() {
            return Err(SweeperError::InvalidRequest(
                "at least one product code is required".to_string(),
            ));
        }

        let candidates = self.signals.fetch_candidates().await?;
        let by_sku: HashMap<&str, &ProductSignal> = candidates
            .iter()
            .map(|signal| (signal.sku.as_str(), signal))
            .collect();

        let composer = DecisionComposer::new(self.store.snapshot(regime_override));
        let today = today();
        let mut report = BatchReport::new(composer.active());

        tracing::info!(
            "Batch started: {} requested products, regime {}",
            requested.len(),
            composer.active().regime
        );

        for sku in requested {
            let outcome = self
                .settle(sku, by_sku.get(sku).copied(), &composer, today)
                .await;
            report.record(outcome);
        }

        tracing::info!(
            "Batch completed: {} evaluated, {} modified, {} errors",
            report.evaluated,
            report.modified,
            report.errors
        );
        Ok(report)
    }

    /// Evaluate and apply a single product
    pub async fn evaluate_one(
        &self,
        sku: &str,
        regime_override: Option<Regime>,
    ) -> Result<Outcome, SweeperError> {
        let sku = sku.trim();
        if sku.is_empty() {
            return Err(SweeperError::InvalidRequest(
                "product code must not be empty".to_string(),
            ));
        }

        let candidates = self.signals.fetch_candidates().await?;
        let signal = candidates.iter().find(|signal| signal.sku == sku);

        let composer = DecisionComposer::new(self.store.snapshot(regime_override));
        Ok(self.settle(sku, signal, &composer, today()).await)
    }

    /// Process one product, folding collaborator failures into an outcome
    async fn settle(
        &self,
        sku: &str,
        signal: Option<&ProductSignal>,
        composer: &DecisionComposer,
        today: NaiveDate,
    ) -> Outcome {
        match self.process(sku, signal, composer, today).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!("Product {} failed: {}", sku, e);
                Outcome::error(sku, e.to_string())
            }
        }
    }

    async fn process(
        &self,
        sku: &str,
        signal: Option<&ProductSignal>,
        composer: &DecisionComposer,
        today: NaiveDate,
    ) -> Result<Outcome, CollaboratorError> {
        let Some(signal) = signal else {
            return Ok(Outcome::not_found(sku));
        };

        let state = self.catalog.fetch_product(sku).await?;
        if !state.auto_discount_enabled {
            return Ok(Outcome::excluded(sku));
        }

        let evaluation = composer.evaluate(signal, &state, today);
        let context = DecisionContext::new(composer.active(), &evaluation, true);

        let Some(plan) = evaluation.plan(&state, today) else {
            return Ok(rejected(sku, &state, evaluation, context));
        };

        self.apply(&state, &plan).await?;

        tracing::info!(
            "Product {}: {} -> {}{}",
            sku,
            plan.previous_tier,
            plan.next_tier,
            if plan.scheme_changed() {
                format!(" + scheme {}", plan.final_scheme)
            } else {
                String::new()
            }
        );

        Ok(Outcome::Applied {
            sku: sku.to_string(),
            previous_tier: plan.previous_tier,
            next_tier: plan.next_tier,
            next_scheme: evaluation.next_scheme,
            liquidation_category_added: plan.liquidation_category_added,
            context,
            message: APPLIED_MESSAGE.to_string(),
        })
    }

    /// Write an accepted plan: record, then categories, then prices
    async fn apply(&self, state: &ProductState, plan: &UpdatePlan) -> Result<(), CollaboratorError> {
        self.catalog.apply_update(state, plan).await?;

        if plan.categories_changed() {
            self.catalog
                .update_categories(&plan.sku, &plan.categories)
                .await?;
        }

        if plan.requires_price_recalculation() {
            let delay = self.config.request_delay();
            if !delay.is_zero() {
                tracing::debug!("Waiting {:?} before price recalculation of {}", delay, plan.sku);
                tokio::time::sleep(delay).await;
            }
            self.catalog.trigger_price_recalculation(&plan.sku).await?;
        }

        Ok(())
    }
}

fn rejected(
    sku: &str,
    state: &ProductState,
    evaluation: Evaluation,
    context: DecisionContext,
) -> Outcome {
    let current_tier = state.current_tier.clone();
    match evaluation.reject_reason {
        Some(RejectReason::ViolatesInvariant(reasons)) => {
            tracing::warn!("Product {} refused by gatekeeper", sku);
            Outcome::InvariantViolation {
                sku: sku.to_string(),
                current_tier,
                reasons,
                context,
                message: INVARIANT_MESSAGE.to_string(),
            }
        }
        _ => Outcome::NotEligible {
            sku: sku.to_string(),
            current_tier,
            context,
            message: NOT_ELIGIBLE_MESSAGE.to_string(),
        },
    }
}
