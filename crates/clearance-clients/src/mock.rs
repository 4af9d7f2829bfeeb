//! In-memory collaborators for testing
//!
//! Both mocks are cheap to clone and share their state, so a test can hand
//! one clone to the sweeper and inspect the other afterwards.

use async_trait::async_trait;
use clearance_domain::{
    CatalogSource, CollaboratorError, ProductSignal, ProductState, SignalSource, UpdatePlan,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Mock churn source returning a fixed candidate list
///
/// # Examples
///
/// ```
/// use clearance_clients::MockSignalSource;
/// use clearance_domain::{CollaboratorError, ProductSignal};
///
/// let source = MockSignalSource::new(vec![ProductSignal::new("IF6463", Some(10.0), None)]);
/// source.fail_with(CollaboratorError::Transport("down".to_string()));
/// assert_eq!(source.call_count(), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockSignalSource {
    signals: Arc<Mutex<Vec<ProductSignal>>>,
    failure: Arc<Mutex<Option<CollaboratorError>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockSignalSource {
    /// Create a source returning `signals`
    pub fn new(signals: Vec<ProductSignal>) -> Self {
        Self {
            signals: Arc::new(Mutex::new(signals)),
            ..Self::default()
        }
    }

    /// Replace the candidate list
    pub fn set_signals(&self, signals: Vec<ProductSignal>) {
        *lock(&self.signals) = signals;
    }

    /// Make every subsequent fetch fail
    pub fn fail_with(&self, error: CollaboratorError) {
        *lock(&self.failure) = Some(error);
    }

    /// Number of fetches so far
    pub fn call_count(&self) -> usize {
        *lock(&self.call_count)
    }
}

#[async_trait]
impl SignalSource for MockSignalSource {
    async fn fetch_candidates(&self) -> Result<Vec<ProductSignal>, CollaboratorError> {
        *lock(&self.call_count) += 1;

        if let Some(error) = lock(&self.failure).clone() {
            return Err(error);
        }
        Ok(lock(&self.signals).clone())
    }
}

/// One recorded catalog interaction
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogCall {
    /// `fetch_product`
    FetchProduct(String),

    /// `apply_update`
    ApplyUpdate(UpdatePlan),

    /// `update_categories`
    UpdateCategories {
        /// Product identity
        sku: String,
        /// Categories sent
        categories: Vec<String>,
    },

    /// `trigger_price_recalculation`
    TriggerPriceRecalculation(String),
}

impl CatalogCall {
    /// Product the call was made for
    pub fn sku(&self) -> &str {
        match self {
            CatalogCall::FetchProduct(sku) | CatalogCall::TriggerPriceRecalculation(sku) => sku,
            CatalogCall::ApplyUpdate(plan) => &plan.sku,
            CatalogCall::UpdateCategories { sku, .. } => sku,
        }
    }
}

/// Mock catalog holding product records in memory
///
/// Unknown SKUs answer `NotFound`. Accepted updates are written back to the
/// stored record, so consecutive runs see the advanced state.
#[derive(Debug, Clone, Default)]
pub struct MockCatalog {
    products: Arc<Mutex<HashMap<String, ProductState>>>,
    fetch_failures: Arc<Mutex<HashMap<String, CollaboratorError>>>,
    update_failures: Arc<Mutex<HashMap<String, CollaboratorError>>>,
    calls: Arc<Mutex<Vec<CatalogCall>>>,
}

impl MockCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a product record
    pub fn with_product(self, state: ProductState) -> Self {
        self.insert_product(state);
        self
    }

    /// Add or replace a product record
    pub fn insert_product(&self, state: ProductState) {
        lock(&self.products).insert(state.sku.clone(), state);
    }

    /// Current stored record
    pub fn product(&self, sku: &str) -> Option<ProductState> {
        lock(&self.products).get(sku).cloned()
    }

    /// Make `fetch_product` fail for one SKU
    pub fn fail_fetch(&self, sku: impl Into<String>, error: CollaboratorError) {
        lock(&self.fetch_failures).insert(sku.into(), error);
    }

    /// Make `apply_update` fail for one SKU
    pub fn fail_update(&self, sku: impl Into<String>, error: CollaboratorError) {
        lock(&self.update_failures).insert(sku.into(), error);
    }

    /// All calls in order
    pub fn calls(&self) -> Vec<CatalogCall> {
        lock(&self.calls).clone()
    }

    /// Number of `fetch_product` calls
    pub fn fetch_count(&self) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|call| matches!(call, CatalogCall::FetchProduct(_)))
            .count()
    }

    /// Plans passed to `apply_update`
    pub fn updates(&self) -> Vec<UpdatePlan> {
        lock(&self.calls)
            .iter()
            .filter_map(|call| match call {
                CatalogCall::ApplyUpdate(plan) => Some(plan.clone()),
                _ => None,
            })
            .collect()
    }

    /// Calls made for one SKU
    pub fn calls_for(&self, sku: &str) -> Vec<CatalogCall> {
        lock(&self.calls)
            .iter()
            .filter(|call| call.sku() == sku)
            .cloned()
            .collect()
    }

    fn record(&self, call: CatalogCall) {
        lock(&self.calls).push(call);
    }
}

#[async_trait]
impl CatalogSource for MockCatalog {
    async fn fetch_product(&self, sku: &str) -> Result<ProductState, CollaboratorError> {
        self.record(CatalogCall::FetchProduct(sku.to_string()));

        if let Some(error) = lock(&self.fetch_failures).get(sku).cloned() {
            return Err(error);
        }
        self.product(sku)
            .ok_or_else(|| CollaboratorError::NotFound(sku.to_string()))
    }

    async fn apply_update(
        &self,
        _state: &ProductState,
        plan: &UpdatePlan,
    ) -> Result<(), CollaboratorError> {
        self.record(CatalogCall::ApplyUpdate(plan.clone()));

        if let Some(error) = lock(&self.update_failures).get(&plan.sku).cloned() {
            return Err(error);
        }

        let mut products = lock(&self.products);
        let stored = products
            .get_mut(&plan.sku)
            .ok_or_else(|| CollaboratorError::NotFound(plan.sku.clone()))?;
        stored.current_tier = plan.next_tier.clone();
        stored.current_scheme = plan.final_scheme.clone();
        if let Some(date) = plan.refresh_date {
            stored.last_auto_discount_update = Some(date);
        }
        Ok(())
    }

    async fn update_categories(
        &self,
        sku: &str,
        categories: &[String],
    ) -> Result<(), CollaboratorError> {
        self.record(CatalogCall::UpdateCategories {
            sku: sku.to_string(),
            categories: categories.to_vec(),
        });

        let mut products = lock(&self.products);
        let stored = products
            .get_mut(sku)
            .ok_or_else(|| CollaboratorError::NotFound(sku.to_string()))?;
        stored.categories = categories.to_vec();
        Ok(())
    }

    async fn trigger_price_recalculation(&self, sku: &str) -> Result<(), CollaboratorError> {
        self.record(CatalogCall::TriggerPriceRecalculation(sku.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use clearance_domain::{CostScheme, DiscountTier};

    #[tokio::test]
    async fn test_signal_source_failure() {
        let source = MockSignalSource::new(vec![ProductSignal::new("A", None, None)]);
        assert_eq!(source.fetch_candidates().await.unwrap().len(), 1);

        source.fail_with(CollaboratorError::Transport("down".to_string()));
        assert!(source.fetch_candidates().await.is_err());
        assert_eq!(source.call_count(), 2);
    }

    #[tokio::test]
    async fn test_unknown_product_is_not_found() {
        let catalog = MockCatalog::new();
        let result = catalog.fetch_product("missing").await;

        assert_eq!(result, Err(CollaboratorError::NotFound("missing".to_string())));
        assert_eq!(catalog.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_update_is_written_back() {
        let catalog = MockCatalog::new().with_product(ProductState {
            current_scheme: CostScheme::new("NDA_20M_T1"),
            ..ProductState::new("IF6463")
        });
        let state = catalog.fetch_product("IF6463").await.unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap();
        let plan = UpdatePlan::build(
            &state,
            DiscountTier::Push1.into(),
            Some(CostScheme::liq_small()),
            today,
        );

        catalog.apply_update(&state, &plan).await.unwrap();
        catalog
            .update_categories("IF6463", &plan.categories)
            .await
            .unwrap();

        let stored = catalog.product("IF6463").unwrap();
        assert_eq!(stored.current_tier, DiscountTier::Push1.into());
        assert_eq!(stored.current_scheme, CostScheme::liq_small());
        assert_eq!(stored.last_auto_discount_update, Some(today));
        assert_eq!(stored.categories, plan.categories);
        assert_eq!(catalog.updates(), vec![plan]);
        assert_eq!(catalog.calls_for("IF6463").len(), 3);
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let catalog = MockCatalog::new().with_product(ProductState::new("IF6463"));
        catalog.fail_fetch("IF6463", CollaboratorError::Transport("timeout".to_string()));

        assert!(matches!(
            catalog.fetch_product("IF6463").await,
            Err(CollaboratorError::Transport(_))
        ));
    }

    #[test]
    fn test_clones_share_state() {
        let catalog = MockCatalog::new();
        let other = catalog.clone();
        other.insert_product(ProductState::new("A"));

        assert!(catalog.product("A").is_some());
    }
}
