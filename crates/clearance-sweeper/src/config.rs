//! Configuration for sweeper runs
//!
//! Controls the pause before price recalculation and the daily schedule.

use crate::SweeperError;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the sweeper and its daily worker
///
/// # Examples
///
/// ```
/// use clearance_sweeper::SweeperConfig;
///
/// let config = SweeperConfig::default();
/// assert_eq!(config.request_delay_secs, 3);
/// assert_eq!(config.schedule_hour, 5);
///
/// // No pause between writes, for tests and dry environments
/// let config = SweeperConfig::immediate();
/// assert!(config.request_delay().is_zero());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweeperConfig {
    /// Seconds to wait between a scheme-changing update and the price
    /// recalculation request
    /// Default: 3
    #[serde(default = "default_request_delay_secs")]
    pub request_delay_secs: u64,

    /// Local hour of the daily run (0-23)
    /// Default: 5
    #[serde(default = "default_schedule_hour")]
    pub schedule_hour: u32,

    /// Minute of the daily run (0-59)
    /// Default: 0
    #[serde(default)]
    pub schedule_minute: u32,
}

fn default_request_delay_secs() -> u64 {
    3
}

fn default_schedule_hour() -> u32 {
    5
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            request_delay_secs: default_request_delay_secs(),
            schedule_hour: default_schedule_hour(),
            schedule_minute: 0,
        }
    }
}

impl SweeperConfig {
    /// Default schedule without any pause between writes
    pub fn immediate() -> Self {
        Self {
            request_delay_secs: 0,
            ..Self::default()
        }
    }

    /// Pause before price recalculation as a Duration
    pub fn request_delay(&self) -> Duration {
        Duration::from_secs(self.request_delay_secs)
    }

    /// Time of day of the scheduled run
    pub fn schedule_time(&self) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(self.schedule_hour, self.schedule_minute, 0)
    }

    /// Check the schedule is a valid time of day
    pub fn validate(&self) -> Result<(), SweeperError> {
        if self.schedule_hour > 23 {
            return Err(SweeperError::Config(format!(
                "schedule_hour must be 0-23, got {}",
                self.schedule_hour
            )));
        }
        if self.schedule_minute > 59 {
            return Err(SweeperError::Config(format!(
                "schedule_minute must be 0-59, got {}",
                self.schedule_minute
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SweeperConfig::default();
        assert_eq!(config.request_delay_secs, 3);
        assert_eq!(config.schedule_hour, 5);
        assert_eq!(config.schedule_minute, 0);
        assert_eq!(config.request_delay(), Duration::from_secs(3));
        assert_eq!(config.schedule_time(), NaiveTime::from_hms_opt(5, 0, 0));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_schedule() {
        let config = SweeperConfig {
            schedule_hour: 24,
            ..SweeperConfig::default()
        };
        assert!(matches!(config.validate(), Err(SweeperError::Config(_))));
        assert_eq!(config.schedule_time(), None);

        let config = SweeperConfig {
            schedule_minute: 60,
            ..SweeperConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: SweeperConfig = serde_json::from_str(r#"{"schedule_minute": 30}"#).unwrap();
        assert_eq!(config.request_delay_secs, 3);
        assert_eq!(config.schedule_hour, 5);
        assert_eq!(config.schedule_minute, 30);
    }
}
