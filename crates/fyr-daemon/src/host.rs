//! Host adapters for the OS-primitive contracts.
//!
//! A standalone Linux host has no geofencing hardware, so the monitor
//! adapter records the registered region set to a state file where it can
//! be inspected, and the notifier emits alerts through the log. The
//! periodic runner drives background ticks on a tokio interval, playing the
//! role a mobile OS background-fetch scheduler would.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use fyr_core::error::{FyrError, Result};
use fyr_core::platform::{
    NotificationRequest, NotificationScheduler, PermissionGate, PermissionStatus,
    PeriodicScheduler, RegionMonitor,
};
use fyr_core::region::Region;
use fyr_core::scheduler::SyncScheduler;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// [`RegionMonitor`] that persists the monitor set to a JSON state file.
///
/// Registration under a task name fully replaces that task's region list,
/// matching the replace-only contract of the real OS primitive.
#[derive(Debug, Clone)]
pub struct StateFileMonitor {
    path: PathBuf,
}

impl StateFileMonitor {
    /// Creates a monitor recording to `data_dir/monitors.json`.
    #[must_use]
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join("monitors.json"),
        }
    }

    fn load(&self) -> Result<HashMap<String, Vec<Region>>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        serde_json::from_str(&content).map_err(|err| FyrError::Registration(err.to_string()))
    }

    fn save(&self, tasks: &HashMap<String, Vec<Region>>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(tasks)
            .map_err(|err| FyrError::Registration(err.to_string()))?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

#[async_trait]
impl RegionMonitor for StateFileMonitor {
    async fn start_monitoring(&self, task_name: &str, regions: &[Region]) -> Result<()> {
        let mut tasks = self.load()?;
        tasks.insert(task_name.to_string(), regions.to_vec());
        self.save(&tasks)?;
        info!(task = %task_name, regions = regions.len(), "monitor set replaced");
        Ok(())
    }

    async fn stop_monitoring(&self, task_name: &str) -> Result<()> {
        let mut tasks = self.load()?;
        tasks.remove(task_name);
        self.save(&tasks)?;
        info!(task = %task_name, "monitoring stopped");
        Ok(())
    }

    async fn is_task_registered(&self, task_name: &str) -> Result<bool> {
        Ok(self.load()?.contains_key(task_name))
    }

    async fn registered_tasks(&self) -> Result<Vec<String>> {
        Ok(self.load()?.into_keys().collect())
    }
}

/// [`NotificationScheduler`] that delivers alerts through the log.
#[derive(Debug, Clone, Default)]
pub struct TracingNotifier;

#[async_trait]
impl NotificationScheduler for TracingNotifier {
    async fn schedule(&self, request: &NotificationRequest) -> Result<()> {
        info!(
            title = %request.title,
            body = %request.body,
            channel = %request.channel,
            data = %request.data,
            "notification scheduled"
        );
        Ok(())
    }
}

/// [`PermissionGate`] for a host with no permission prompt: always granted.
#[derive(Debug, Clone, Default)]
pub struct GrantedPermissions;

#[async_trait]
impl PermissionGate for GrantedPermissions {
    async fn location_permission(&self) -> PermissionStatus {
        PermissionStatus::Granted
    }
}

/// [`PeriodicScheduler`] driving background ticks on a tokio interval.
///
/// The engine and the runner reference each other (the engine registers the
/// task through the runner, the runner invokes ticks on the engine), so the
/// engine is bound after construction via [`TokioPeriodicRunner::bind`].
#[derive(Default)]
pub struct TokioPeriodicRunner {
    engine: OnceLock<Arc<SyncScheduler>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl TokioPeriodicRunner {
    /// Creates an unbound runner.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds the engine whose `on_background_tick` the runner will drive.
    /// Must be called exactly once before any registration.
    pub fn bind(&self, engine: Arc<SyncScheduler>) {
        let _ = self.engine.set(engine);
    }

    fn abort_current(&self) {
        if let Some(handle) = self.handle.lock().expect("runner lock poisoned").take() {
            handle.abort();
        }
    }
}

impl Drop for TokioPeriodicRunner {
    fn drop(&mut self) {
        self.abort_current();
    }
}

#[async_trait]
impl PeriodicScheduler for TokioPeriodicRunner {
    async fn register(&self, task_name: &str, minimum_interval: Duration) -> Result<()> {
        let engine = self
            .engine
            .get()
            .cloned()
            .ok_or_else(|| FyrError::Registration("periodic runner not bound".to_string()))?;

        // Re-registering supersedes the previous schedule.
        self.abort_current();

        info!(task = %task_name, interval_secs = minimum_interval.as_secs(), "periodic sync task registered");

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(minimum_interval);
            // The first interval tick completes immediately; skip it so the
            // initial sync stays with the foreground path.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let result = engine.on_background_tick().await;
                debug!(?result, "background tick finished");
            }
        });

        *self.handle.lock().expect("runner lock poisoned") = Some(handle);
        Ok(())
    }

    async fn unregister(&self, task_name: &str) -> Result<()> {
        debug!(task = %task_name, "periodic sync task unregistered");
        self.abort_current();
        Ok(())
    }
}
