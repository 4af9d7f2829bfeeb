//! Regime module - threshold profiles and the global engine configuration

use crate::DiscountTier;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Named configuration profile selecting the active threshold set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Regime {
    /// Normal operation
    #[default]
    Regular,

    /// Clear all stock; every eligible product gets at least Push1
    LiquidateAllStock,

    /// Aggressive liquidation
    LiquidateAggressive,

    /// Soft liquidation (longer staleness windows)
    LiquidateSoft,
}

impl Regime {
    /// All regimes
    pub const ALL: [Regime; 4] = [
        Regime::Regular,
        Regime::LiquidateAllStock,
        Regime::LiquidateAggressive,
        Regime::LiquidateSoft,
    ];

    /// Get the regime name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Regime::Regular => "regular",
            Regime::LiquidateAllStock => "liquidate_all_stock",
            Regime::LiquidateAggressive => "liquidate_aggressive",
            Regime::LiquidateSoft => "liquidate_soft",
        }
    }

    /// Parse a regime from its name
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "regular" => Some(Regime::Regular),
            "liquidate_all_stock" => Some(Regime::LiquidateAllStock),
            "liquidate_aggressive" => Some(Regime::LiquidateAggressive),
            "liquidate_soft" => Some(Regime::LiquidateSoft),
            _ => None,
        }
    }

    /// Lowest tier an eligible product starting at NoDiscount may land on
    pub fn tier_floor(&self) -> DiscountTier {
        match self {
            Regime::LiquidateAllStock => DiscountTier::Push1,
            _ => DiscountTier::NoDiscount,
        }
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Regime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid regime: {}", s))
    }
}

/// Thresholds applied by the eligibility routes, in days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Route 1 fires when days since last import exceed this
    pub max_import_age: u32,

    /// Route 2 requires days since last sale to exceed this
    pub min_days_since_sale: u32,

    /// Route 2 requires days since the last automatic discount update to exceed this
    pub min_days_since_last_discount_update: u32,
}

impl ThresholdConfig {
    /// Create a threshold set
    pub const fn new(
        max_import_age: u32,
        min_days_since_sale: u32,
        min_days_since_last_discount_update: u32,
    ) -> Self {
        Self {
            max_import_age,
            min_days_since_sale,
            min_days_since_last_discount_update,
        }
    }
}

/// Process-wide engine configuration: the active regime and all threshold sets
///
/// # Examples
///
/// ```
/// use clearance_domain::{ConfigPatch, GlobalConfig, Regime};
///
/// let mut config = GlobalConfig::default();
/// assert_eq!(config.active_regime, Regime::Regular);
/// assert_eq!(config.active_thresholds().max_import_age, 500);
///
/// config.apply(ConfigPatch {
///     active_regime: Some(Regime::LiquidateSoft),
///     ..Default::default()
/// });
/// assert_eq!(config.active_thresholds().min_days_since_sale, 120);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Regime used when a run does not override it
    pub active_regime: Regime,

    /// Thresholds for [`Regime::Regular`]
    pub regular: ThresholdConfig,

    /// Thresholds for [`Regime::LiquidateAllStock`]
    pub liquidate_all_stock: ThresholdConfig,

    /// Thresholds for [`Regime::LiquidateAggressive`]
    pub liquidate_aggressive: ThresholdConfig,

    /// Thresholds for [`Regime::LiquidateSoft`]
    pub liquidate_soft: ThresholdConfig,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            active_regime: Regime::Regular,
            regular: ThresholdConfig::new(500, 80, 80),
            liquidate_all_stock: ThresholdConfig::new(500, 80, 80),
            liquidate_aggressive: ThresholdConfig::new(500, 80, 80),
            liquidate_soft: ThresholdConfig::new(500, 120, 120),
        }
    }
}

impl GlobalConfig {
    /// Get the threshold set for a regime
    pub fn thresholds(&self, regime: Regime) -> &ThresholdConfig {
        match regime {
            Regime::Regular => &self.regular,
            Regime::LiquidateAllStock => &self.liquidate_all_stock,
            Regime::LiquidateAggressive => &self.liquidate_aggressive,
            Regime::LiquidateSoft => &self.liquidate_soft,
        }
    }

    /// Get the threshold set for the active regime
    pub fn active_thresholds(&self) -> &ThresholdConfig {
        self.thresholds(self.active_regime)
    }

    /// Resolve the regime and thresholds for one run
    ///
    /// An override replaces the active regime for this run only.
    pub fn resolve(&self, regime_override: Option<Regime>) -> ActiveConfig {
        let regime = regime_override.unwrap_or(self.active_regime);
        ActiveConfig {
            regime,
            thresholds: *self.thresholds(regime),
        }
    }

    /// Merge a partial update; only supplied fields are replaced
    pub fn apply(&mut self, patch: ConfigPatch) {
        if let Some(regime) = patch.active_regime {
            self.active_regime = regime;
        }
        if let Some(thresholds) = patch.regular {
            self.regular = thresholds;
        }
        if let Some(thresholds) = patch.liquidate_all_stock {
            self.liquidate_all_stock = thresholds;
        }
        if let Some(thresholds) = patch.liquidate_aggressive {
            self.liquidate_aggressive = thresholds;
        }
        if let Some(thresholds) = patch.liquidate_soft {
            self.liquidate_soft = thresholds;
        }
    }
}

/// Partial configuration update
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigPatch {
    /// New active regime
    #[serde(default)]
    pub active_regime: Option<Regime>,

    /// New thresholds for [`Regime::Regular`]
    #[serde(default)]
    pub regular: Option<ThresholdConfig>,

    /// New thresholds for [`Regime::LiquidateAllStock`]
    #[serde(default)]
    pub liquidate_all_stock: Option<ThresholdConfig>,

    /// New thresholds for [`Regime::LiquidateAggressive`]
    #[serde(default)]
    pub liquidate_aggressive: Option<ThresholdConfig>,

    /// New thresholds for [`Regime::LiquidateSoft`]
    #[serde(default)]
    pub liquidate_soft: Option<ThresholdConfig>,
}

impl ConfigPatch {
    /// Whether the patch changes nothing
    pub fn is_empty(&self) -> bool {
        self.active_regime.is_none()
            && self.regular.is_none()
            && self.liquidate_all_stock.is_none()
            && self.liquidate_aggressive.is_none()
            && self.liquidate_soft.is_none()
    }
}

/// Regime and thresholds resolved once for a batch or a single evaluation
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ActiveConfig {
    /// Regime in effect
    pub regime: Regime,

    /// Thresholds of that regime
    pub thresholds: ThresholdConfig,
}
