use tracing::{debug, warn};

use crate::core::config::{ConfigError, ConfigStore, RoiConfig};
use crate::core::github::fetch::LoaderError;
use crate::core::loader::SnapshotSource;
use crate::core::models::report::RoiReport;
use crate::core::models::usage::MetricsSnapshot;
use crate::core::roi::compute_for_snapshot;

/// Holds the ROI assumptions, the last loaded snapshot and the report derived
/// from both. The report is recomputed only when one of the inputs changes.
#[derive(Debug, Clone)]
pub struct DashboardState {
    config: RoiConfig,
    snapshot: Option<MetricsSnapshot>,
    report: Option<RoiReport>,
    revision: u64,
}

impl DashboardState {
    pub fn new(config: RoiConfig) -> Self {
        Self {
            config,
            snapshot: None,
            report: None,
            revision: 0,
        }
    }

    pub fn config(&self) -> &RoiConfig {
        &self.config
    }

    pub fn snapshot(&self) -> Option<&MetricsSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn report(&self) -> Option<&RoiReport> {
        self.report.as_ref()
    }

    /// Number of times the report has been recomputed.
    #[cfg(test)]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn recompute(&mut self) {
        self.report = self
            .snapshot
            .as_ref()
            .and_then(|snapshot| compute_for_snapshot(snapshot, &self.config));
        self.revision += 1;
        debug!(revision = self.revision, has_report = self.report.is_some(), "recomputed ROI");
    }

    pub fn set_snapshot(&mut self, snapshot: MetricsSnapshot) {
        if self.snapshot.as_ref() == Some(&snapshot) {
            debug!("snapshot unchanged, keeping report");
            return;
        }
        self.snapshot = Some(snapshot);
        self.recompute();
    }

    /// Use `config` for this session without persisting it.
    pub fn apply_config(&mut self, config: RoiConfig) {
        if self.config == config {
            return;
        }
        self.config = config;
        self.recompute();
    }

    /// Persist `config` through `store`, then adopt it. A failed write leaves
    /// the state untouched.
    pub fn save_config<S: ConfigStore>(
        &mut self,
        config: RoiConfig,
        store: &mut S,
    ) -> Result<(), ConfigError> {
        store.save_roi(&config)?;
        self.apply_config(config);
        Ok(())
    }

    /// Load a fresh snapshot. On failure the previous snapshot and report are kept.
    pub async fn refresh<S: SnapshotSource>(&mut self, source: &S) -> Result<(), LoaderError> {
        match source.fetch_snapshot().await {
            Ok(snapshot) => {
                self.set_snapshot(snapshot);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "refresh failed, keeping previous snapshot");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::billing::{BillingSnapshot, SeatBreakdown};
    use crate::core::models::roster::Roster;
    use crate::core::models::usage::{GlobalMetrics, UsageSnapshot};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;

    fn snapshot(lines_accepted: u64) -> MetricsSnapshot {
        MetricsSnapshot {
            usage: Some(UsageSnapshot {
                global_metrics: GlobalMetrics {
                    total_lines_accepted: lines_accepted,
                    active_days: 20,
                    total_users: 5,
                    average_acceptance_rate: 40.0,
                    ..Default::default()
                },
                ..Default::default()
            }),
            billing: Some(BillingSnapshot {
                seat_breakdown: SeatBreakdown {
                    total: 5,
                    active_this_cycle: 5,
                    ..Default::default()
                },
                ..Default::default()
            }),
        }
    }

    struct StubSource {
        result: RefCell<Option<Result<MetricsSnapshot, LoaderError>>>,
    }

    impl StubSource {
        fn ok(snapshot: MetricsSnapshot) -> Self {
            Self {
                result: RefCell::new(Some(Ok(snapshot))),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                result: RefCell::new(Some(Err(LoaderError::Upstream(message.to_string())))),
            }
        }
    }

    impl SnapshotSource for StubSource {
        async fn fetch_snapshot(&self) -> Result<MetricsSnapshot, LoaderError> {
            self.result
                .borrow_mut()
                .take()
                .unwrap_or(Err(LoaderError::Upstream("exhausted".to_string())))
        }

        async fn fetch_roster(&self) -> Result<Roster, LoaderError> {
            Ok(Roster::default())
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        saved: Vec<RoiConfig>,
        fail: bool,
    }

    impl ConfigStore for MemoryStore {
        fn save_roi(&mut self, roi: &RoiConfig) -> Result<(), ConfigError> {
            if self.fail {
                return Err(ConfigError::ReadError(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "read-only",
                )));
            }
            self.saved.push(*roi);
            Ok(())
        }
    }

    #[test]
    fn new_state_has_no_report() {
        let state = DashboardState::new(RoiConfig::default());
        assert!(state.snapshot().is_none());
        assert!(state.report().is_none());
        assert_eq!(state.revision(), 0);
    }

    #[test]
    fn set_snapshot_computes_report() {
        let mut state = DashboardState::new(RoiConfig::default());
        state.set_snapshot(snapshot(1000));
        let report = state.report().unwrap();
        assert_eq!(report.time_saved.total, 250.0);
        assert_eq!(report.assistant_costs.monthly, 95.0);
    }

    #[test]
    fn unchanged_inputs_skip_recompute() {
        let mut state = DashboardState::new(RoiConfig::default());
        state.set_snapshot(snapshot(1000));
        state.set_snapshot(snapshot(1000));
        state.apply_config(RoiConfig::default());
        assert_eq!(state.revision(), 1);

        state.set_snapshot(snapshot(2000));
        assert_eq!(state.revision(), 2);
        assert_eq!(state.report().unwrap().time_saved.total, 500.0);
    }

    #[test]
    fn snapshot_without_usage_yields_no_report() {
        let mut state = DashboardState::new(RoiConfig::default());
        state.set_snapshot(MetricsSnapshot::default());
        assert!(state.report().is_none());
    }

    #[test]
    fn save_config_persists_and_recomputes() {
        let mut state = DashboardState::new(RoiConfig::default());
        state.set_snapshot(snapshot(1000));
        let mut store = MemoryStore::default();

        let cheaper = RoiConfig {
            average_daily_rate: 400.0,
            ..RoiConfig::default()
        };
        state.save_config(cheaper, &mut store).unwrap();

        assert_eq!(store.saved, vec![cheaper]);
        assert_eq!(state.config(), &cheaper);
        assert_eq!(state.report().unwrap().cost_savings.cost_per_hour, 50.0);
        assert_eq!(state.revision(), 2);
    }

    #[test]
    fn failed_save_leaves_state_untouched() {
        let mut state = DashboardState::new(RoiConfig::default());
        state.set_snapshot(snapshot(1000));
        let before = state.report().cloned();
        let mut store = MemoryStore {
            fail: true,
            ..Default::default()
        };

        let changed = RoiConfig {
            daily_working_hours: 7.0,
            ..RoiConfig::default()
        };
        assert!(state.save_config(changed, &mut store).is_err());
        assert_eq!(state.config(), &RoiConfig::default());
        assert_eq!(state.report().cloned(), before);
    }

    #[tokio::test]
    async fn refresh_stores_snapshot() {
        let mut state = DashboardState::new(RoiConfig::default());
        state.refresh(&StubSource::ok(snapshot(1000))).await.unwrap();
        assert_eq!(state.snapshot(), Some(&snapshot(1000)));
        assert!(state.report().is_some());
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_data() {
        let mut state = DashboardState::new(RoiConfig::default());
        state.set_snapshot(snapshot(1000));
        let before = state.report().cloned();

        let err = state
            .refresh(&StubSource::failing("Token manquant"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Upstream error: Token manquant");
        assert_eq!(state.snapshot(), Some(&snapshot(1000)));
        assert_eq!(state.report().cloned(), before);
        assert_eq!(state.revision(), 1);
    }
}
