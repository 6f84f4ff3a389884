//! Collaborator contracts for the host platform.
//!
//! The engine never talks to OS primitives or durable stores directly; every
//! ambient capability comes in through one of these traits. Hosts provide
//! real adapters (see `fyr-daemon`), tests provide recording fakes.
//!
//! The named monitoring task and the named periodic task are singleton,
//! OS-owned resources. The OS may deliver region callbacks from an execution
//! context that shares no memory with the cycle that registered them, so
//! nothing behind these traits may rely on engine-internal state.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;
use crate::region::Region;

/// Task name under which the region monitor set is registered.
pub const GEOFENCING_TASK_NAME: &str = "fyr-geofencing";

/// Task name for the periodic background sync trigger.
pub const BACKGROUND_SYNC_TASK_NAME: &str = "fyr-background-sync";

/// Secret-store key holding the API key.
pub const SECRET_KEY_API_KEY: &str = "apiKey";

/// Flag-store key holding the geofencing toggle.
pub const FLAG_KEY_GEOFENCING_ENABLED: &str = "isGeofencingEnabled";

/// Outcome of a permission probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    /// The user has not been asked yet.
    Undetermined,
    /// Granted; cycles may run.
    Granted,
    /// Refused; terminal for the session, but the persisted toggle is kept.
    Denied,
}

/// A local notification to be delivered on the pre-configured alert channel.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationRequest {
    /// Alert title.
    pub title: String,

    /// Alert body.
    pub body: String,

    /// Opaque payload handed back when the user taps the alert.
    pub data: serde_json::Value,

    /// Notification channel id.
    pub channel: String,

    /// Delivery delay. The channel trigger requires a nonzero delay, so
    /// "near-immediate" is one second.
    pub delay_seconds: u32,
}

/// Opaque secret storage (API key).
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Reads a secret, `None` if absent.
    async fn get_secret(&self, key: &str) -> Result<Option<String>>;

    /// Writes a secret.
    async fn set_secret(&self, key: &str, value: &str) -> Result<()>;

    /// Removes a secret. Not an error if absent.
    async fn clear_secret(&self, key: &str) -> Result<()>;
}

/// Boolean feature-flag storage (geofencing toggle).
#[async_trait]
pub trait FlagStore: Send + Sync {
    /// Reads a flag; an absent flag reads as `false`.
    async fn get_flag(&self, key: &str) -> Result<bool>;

    /// Writes a flag.
    async fn set_flag(&self, key: &str, value: bool) -> Result<()>;

    /// Removes a flag. Not an error if absent.
    async fn clear_flag(&self, key: &str) -> Result<()>;
}

/// The OS geofencing primitive.
#[async_trait]
pub trait RegionMonitor: Send + Sync {
    /// Registers `regions` under `task_name`, fully replacing any prior set
    /// registered under the same name. There is no incremental add/remove.
    async fn start_monitoring(&self, task_name: &str, regions: &[Region]) -> Result<()>;

    /// Stops monitoring under `task_name`.
    async fn stop_monitoring(&self, task_name: &str) -> Result<()>;

    /// Whether a task is currently registered under `task_name`.
    async fn is_task_registered(&self, task_name: &str) -> Result<bool>;

    /// Names of all currently registered monitoring tasks.
    async fn registered_tasks(&self) -> Result<Vec<String>>;
}

/// The OS local-notification primitive.
#[async_trait]
pub trait NotificationScheduler: Send + Sync {
    /// Schedules a local notification for delivery.
    async fn schedule(&self, request: &NotificationRequest) -> Result<()>;
}

/// The OS periodic wake-up primitive.
#[async_trait]
pub trait PeriodicScheduler: Send + Sync {
    /// Registers the periodic task at the given minimum interval. The OS
    /// decides actual timing; the engine only reacts to ticks.
    async fn register(&self, task_name: &str, minimum_interval: Duration) -> Result<()>;

    /// Unregisters the periodic task. Not an error if absent.
    async fn unregister(&self, task_name: &str) -> Result<()>;
}

/// Location permission probe.
#[async_trait]
pub trait PermissionGate: Send + Sync {
    /// Current background-location permission state.
    async fn location_permission(&self) -> PermissionStatus;
}
