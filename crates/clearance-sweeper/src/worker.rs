//! Daily scheduled runs

use crate::{BatchReport, Sweeper, SweeperConfig, SweeperError};
use chrono::{Duration as ChronoDuration, Local, NaiveDateTime, NaiveTime};
use clearance_domain::{CatalogSource, SignalSource};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;

/// First instant strictly after `now` at `time` of day
pub fn next_run_after(now: NaiveDateTime, time: NaiveTime) -> NaiveDateTime {
    let today = now.date().and_time(time);
    if today > now {
        today
    } else {
        today + ChronoDuration::days(1)
    }
}

/// Background worker that runs the full batch once a day
///
/// The sweeper sits behind a shared async mutex; manual triggers that lock
/// the same mutex never overlap with a scheduled run.
///
/// # Examples
///
/// ```no_run
/// use clearance_clients::{CatalogClient, ChurnClient};
/// use clearance_sweeper::{ConfigStore, Sweeper, SweeperConfig, SweeperWorker};
/// use std::sync::Arc;
/// use tokio::sync::Mutex;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let churn = ChurnClient::new("http://zap.local", "token")?;
///     let catalog = CatalogClient::new("http://avax.local", "token")?;
///     let config = SweeperConfig::default();
///     let sweeper = Sweeper::new(churn, catalog, ConfigStore::default(), config.clone());
///
///     let mut worker = SweeperWorker::new(Arc::new(Mutex::new(sweeper)), config);
///
///     // Run daily until Ctrl+C
///     worker
///         .run(async {
///             let _ = tokio::signal::ctrl_c().await;
///         })
///         .await?;
///     Ok(())
/// }
/// ```
pub struct SweeperWorker<S, C> {
    sweeper: Arc<Mutex<Sweeper<S, C>>>,
    config: SweeperConfig,
    runs: usize,
}

impl<S, C> SweeperWorker<S, C>
where
    S: SignalSource,
    C: CatalogSource,
{
    /// Create a worker around a shared sweeper
    pub fn new(sweeper: Arc<Mutex<Sweeper<S, C>>>, config: SweeperConfig) -> Self {
        Self {
            sweeper,
            config,
            runs: 0,
        }
    }

    /// Number of scheduled or manual runs completed
    pub fn runs(&self) -> usize {
        self.runs
    }

    /// Run one full batch now
    pub async fn run_once(&mut self) -> BatchReport {
        let report = {
            let sweeper = self.sweeper.lock().await;
            sweeper.run_all(None).await
        };
        self.runs += 1;

        if report.is_failed() {
            tracing::error!("Scheduled batch failed:\n{}", report.summary());
        } else {
            tracing::info!("Scheduled batch finished:\n{}", report.summary());
        }
        report
    }

    /// Run daily at the configured time until `shutdown` resolves
    ///
    /// A batch already in progress is finished before the worker stops.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured schedule is not a valid time of day.
    pub async fn run<F>(&mut self, shutdown: F) -> Result<(), SweeperError>
    where
        F: Future<Output = ()>,
    {
        self.config.validate()?;
        let time = self
            .config
            .schedule_time()
            .ok_or_else(|| SweeperError::Worker("invalid schedule time".to_string()))?;

        tracing::info!(
            "Sweeper worker started (daily at {:02}:{:02})",
            self.config.schedule_hour,
            self.config.schedule_minute
        );

        tokio::pin!(shutdown);
        loop {
            let now = Local::now().naive_local();
            let next = next_run_after(now, time);
            let wait = (next - now).to_std().unwrap_or_default();
            tracing::debug!("Next batch at {} (in {:?})", next, wait);

            tokio::select! {
                _ = tokio::time::sleep(wait) => {
                    self.run_once().await;
                }
                _ = &mut shutdown => {
                    tracing::info!("Shutdown requested, stopping sweeper worker");
                    break;
                }
            }
        }

        tracing::info!("Sweeper worker stopped after {} runs", self.runs);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConfigStore;
    use chrono::NaiveDate;
    use clearance_clients::{MockCatalog, MockSignalSource};

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn worker(config: SweeperConfig) -> SweeperWorker<MockSignalSource, MockCatalog> {
        let sweeper = Sweeper::new(
            MockSignalSource::default(),
            MockCatalog::new(),
            ConfigStore::default(),
            config.clone(),
        );
        SweeperWorker::new(Arc::new(Mutex::new(sweeper)), config)
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let mut worker = worker(SweeperConfig::immediate());
        let (stop, stopped) = tokio::sync::oneshot::channel::<()>();

        stop.send(()).unwrap();
        let result = tokio::time::timeout(std::time::Duration::from_secs(5), async {
            worker
                .run(async {
                    let _ = stopped.await;
                })
                .await
        })
        .await
        .expect("worker did not stop");

        assert!(result.is_ok());
        assert_eq!(worker.runs(), 0);
    }

    #[tokio::test]
    async fn test_run_rejects_invalid_schedule() {
        let config = SweeperConfig {
            schedule_hour: 24,
            ..SweeperConfig::immediate()
        };
        let mut worker = worker(config);

        let result = worker.run(std::future::pending::<()>()).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_next_run_later_today() {
        let time = NaiveTime::from_hms_opt(5, 0, 0).unwrap();
        assert_eq!(next_run_after(at(15, 3, 30), time), at(15, 5, 0));
    }

    #[test]
    fn test_next_run_tomorrow() {
        let time = NaiveTime::from_hms_opt(5, 0, 0).unwrap();
        assert_eq!(next_run_after(at(15, 5, 0), time), at(16, 5, 0));
        assert_eq!(next_run_after(at(15, 22, 10), time), at(16, 5, 0));
    }

    #[test]
    fn test_next_run_crosses_month() {
        let time = NaiveTime::from_hms_opt(5, 30, 0).unwrap();
        let now = NaiveDate::from_ymd_opt(2026, 10, 31)
            .unwrap()
            .and_hms_opt(6, 0, 0)
            .unwrap();
        let expected = NaiveDate::from_ymd_opt(2026, 11, 1)
            .unwrap()
            .and_hms_opt(5, 30, 0)
            .unwrap();
        assert_eq!(next_run_after(now, time), expected);
    }
}
