//! Process-wide engine configuration

use clearance_domain::{ActiveConfig, ConfigPatch, GlobalConfig, Regime};
use std::sync::{Arc, PoisonError, RwLock};

/// Shared, in-memory holder of the [`GlobalConfig`]
///
/// Clones share the same config. Readers get a copy, so a batch keeps
/// the snapshot it started with even if the config is patched mid-run.
///
/// # Examples
///
/// ```
/// use clearance_domain::{ConfigPatch, Regime};
/// use clearance_sweeper::ConfigStore;
///
/// let store = ConfigStore::default();
/// store.patch_config(ConfigPatch {
///     active_regime: Some(Regime::LiquidateSoft),
///     ..ConfigPatch::default()
/// });
/// assert_eq!(store.get_active_config().active_regime, Regime::LiquidateSoft);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    inner: Arc<RwLock<GlobalConfig>>,
}

impl ConfigStore {
    /// Create a store holding `config`
    pub fn new(config: GlobalConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Copy of the current config
    pub fn get_active_config(&self) -> GlobalConfig {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Regime and thresholds for one run
    pub fn snapshot(&self, regime_override: Option<Regime>) -> ActiveConfig {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .resolve(regime_override)
    }

    /// Merge a partial update and return the new config
    pub fn patch_config(&self, patch: ConfigPatch) -> GlobalConfig {
        let mut config = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        config.apply(patch);
        config.clone()
    }
}
