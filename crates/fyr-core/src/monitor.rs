//! Monitor registry: the capacity-capped gateway to the OS geofencing
//! primitive.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::Result;
use crate::platform::{RegionMonitor, GEOFENCING_TASK_NAME};
use crate::region::Region;

/// Hard platform ceiling on simultaneously monitored regions (iOS limit).
pub const MAX_MONITORED_REGIONS: usize = 20;

/// Issues register/unregister calls for the named monitoring task, enforcing
/// the region-count cap.
#[derive(Clone)]
pub struct MonitorRegistry {
    monitor: Arc<dyn RegionMonitor>,
    task_name: String,
}

impl MonitorRegistry {
    /// Creates a registry over the OS monitoring primitive, using the
    /// default task name.
    #[must_use]
    pub fn new(monitor: Arc<dyn RegionMonitor>) -> Self {
        Self::with_task_name(monitor, GEOFENCING_TASK_NAME)
    }

    /// Creates a registry under an explicit task name.
    #[must_use]
    pub fn with_task_name(monitor: Arc<dyn RegionMonitor>, task_name: &str) -> Self {
        Self {
            monitor,
            task_name: task_name.to_string(),
        }
    }

    /// Replaces the entire monitor set with `regions`.
    ///
    /// If the candidate set exceeds [`MAX_MONITORED_REGIONS`] it is
    /// truncated in list order and a warning is emitted. Truncation is a
    /// known limitation, not a "nearest 20" guarantee.
    ///
    /// The single start call fully supersedes any prior registration under
    /// the same task name.
    ///
    /// # Errors
    ///
    /// Returns [`crate::FyrError::Registration`] if the OS rejects the call.
    pub async fn replace_all(&self, regions: &[Region]) -> Result<()> {
        let capped = if regions.len() > MAX_MONITORED_REGIONS {
            warn!(
                candidates = regions.len(),
                cap = MAX_MONITORED_REGIONS,
                "too many regions; truncating monitor set in list order"
            );
            &regions[..MAX_MONITORED_REGIONS]
        } else {
            regions
        };

        debug!(task = %self.task_name, regions = capped.len(), "replacing monitor set");
        self.monitor
            .start_monitoring(&self.task_name, capped)
            .await
    }

    /// Stops monitoring if the task is currently registered; a no-op
    /// otherwise. Never calls stop on an unregistered task.
    ///
    /// # Errors
    ///
    /// Returns an error only if the OS rejects the registered-check or the
    /// stop call itself.
    pub async fn clear(&self) -> Result<()> {
        if self.monitor.is_task_registered(&self.task_name).await? {
            debug!(task = %self.task_name, "stopping region monitoring");
            self.monitor.stop_monitoring(&self.task_name).await?;
        }
        Ok(())
    }

    /// The task name this registry owns.
    #[must_use]
    pub fn task_name(&self) -> &str {
        &self.task_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    use crate::beacon::Beacon;
    use crate::error::FyrError;

    #[derive(Debug, PartialEq)]
    enum Call {
        Start(usize),
        Stop,
    }

    #[derive(Default)]
    struct RecordingMonitor {
        registered: Mutex<bool>,
        calls: Mutex<Vec<Call>>,
        reject_start: bool,
    }

    #[async_trait]
    impl RegionMonitor for RecordingMonitor {
        async fn start_monitoring(&self, _task: &str, regions: &[Region]) -> Result<()> {
            if self.reject_start {
                return Err(FyrError::Registration("rejected".into()));
            }
            self.calls.lock().unwrap().push(Call::Start(regions.len()));
            *self.registered.lock().unwrap() = true;
            Ok(())
        }

        async fn stop_monitoring(&self, _task: &str) -> Result<()> {
            self.calls.lock().unwrap().push(Call::Stop);
            *self.registered.lock().unwrap() = false;
            Ok(())
        }

        async fn is_task_registered(&self, _task: &str) -> Result<bool> {
            Ok(*self.registered.lock().unwrap())
        }

        async fn registered_tasks(&self) -> Result<Vec<String>> {
            Ok(if *self.registered.lock().unwrap() {
                vec![GEOFENCING_TASK_NAME.to_string()]
            } else {
                Vec::new()
            })
        }
    }

    fn regions(count: usize) -> Vec<Region> {
        (0..count)
            .map(|i| {
                let beacon = Beacon {
                    id: i as i64,
                    account_id: 1,
                    node_id: format!("node{i}"),
                    query: "q".to_string(),
                    latitude: 0.0,
                    longitude: 0.0,
                };
                Region::from_beacon(&beacon, 100.0)
            })
            .collect()
    }

    #[tokio::test]
    async fn test_replace_all_under_cap() {
        let monitor = Arc::new(RecordingMonitor::default());
        let registry = MonitorRegistry::new(monitor.clone());

        registry.replace_all(&regions(5)).await.unwrap();
        assert_eq!(*monitor.calls.lock().unwrap(), vec![Call::Start(5)]);
    }

    #[tokio::test]
    async fn test_replace_all_truncates_to_cap() {
        let monitor = Arc::new(RecordingMonitor::default());
        let registry = MonitorRegistry::new(monitor.clone());

        registry.replace_all(&regions(25)).await.unwrap();
        assert_eq!(
            *monitor.calls.lock().unwrap(),
            vec![Call::Start(MAX_MONITORED_REGIONS)]
        );
    }

    #[tokio::test]
    async fn test_clear_is_noop_when_not_registered() {
        let monitor = Arc::new(RecordingMonitor::default());
        let registry = MonitorRegistry::new(monitor.clone());

        registry.clear().await.unwrap();
        assert!(monitor.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clear_stops_when_registered() {
        let monitor = Arc::new(RecordingMonitor::default());
        let registry = MonitorRegistry::new(monitor.clone());

        registry.replace_all(&regions(1)).await.unwrap();
        registry.clear().await.unwrap();
        assert_eq!(
            *monitor.calls.lock().unwrap(),
            vec![Call::Start(1), Call::Stop]
        );
    }

    #[tokio::test]
    async fn test_os_rejection_surfaces_as_registration_error() {
        let monitor = Arc::new(RecordingMonitor {
            reject_start: true,
            ..RecordingMonitor::default()
        });
        let registry = MonitorRegistry::new(monitor);

        let err = registry.replace_all(&regions(1)).await.unwrap_err();
        assert!(matches!(err, FyrError::Registration(_)));
    }
}
