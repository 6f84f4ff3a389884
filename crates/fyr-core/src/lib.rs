//! # fyr-core
//!
//! Core beacon-region synchronization engine for fyr.
//!
//! Fyr keeps a bounded set of device-side geofences ("regions") in sync
//! with a remote authority's list of points of interest ("beacons") and
//! turns region-entry events into user-visible alerts. This crate provides:
//! - Authenticated fetch and validation of the remote beacon list
//! - A reversible codec between beacons and region identifiers
//! - A staleness diff deciding when the monitor set must be replaced
//! - A capacity-capped registry over the OS geofencing primitive
//! - An entry-event handler that emits proximity notifications
//! - A scheduler driving the cycle on demand and on a background timer
//!
//! ## Architecture
//!
//! The crate is organized into the following modules:
//!
//! - [`beacon`] - Beacon wire model, validation, and deep links
//! - [`fetch`] - Authenticated beacon list retrieval over HTTP
//! - [`region`] - Region identifier encode/decode
//! - [`diff`] - Staleness check between fetched and last-known lists
//! - [`monitor`] - Region-count cap and OS monitor registration
//! - [`events`] - Region entry/exit event handling and alerts
//! - [`scheduler`] - Cycle orchestration, background ticks, the toggle
//! - [`platform`] - Collaborator traits the host must implement
//! - [`config`] - Engine configuration loading, saving, and validation
//! - [`error`] - Unified error types for the crate

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![warn(missing_docs)]

pub mod beacon;
pub mod config;
pub mod diff;
pub mod error;
pub mod events;
pub mod fetch;
pub mod monitor;
pub mod platform;
pub mod region;
pub mod scheduler;

// Re-export primary types for convenience
pub use beacon::{is_valid_node_id, parse_beacon_list, to_tana_url, Beacon, NotificationEvent};
pub use config::FyrConfig;
pub use diff::needs_reregistration;
pub use error::{FyrError, Result};
pub use events::{EntryEventHandler, RegionEventKind, NEARBY_BEACON_ALERTS_CHANNEL};
pub use fetch::{BeaconClient, HttpResponse, HttpTransport};
#[cfg(feature = "http")]
pub use fetch::ReqwestTransport;
pub use monitor::{MonitorRegistry, MAX_MONITORED_REGIONS};
pub use platform::{
    FlagStore, NotificationRequest, NotificationScheduler, PermissionGate, PermissionStatus,
    PeriodicScheduler, RegionMonitor, SecretStore, BACKGROUND_SYNC_TASK_NAME,
    FLAG_KEY_GEOFENCING_ENABLED, GEOFENCING_TASK_NAME, SECRET_KEY_API_KEY,
};
pub use region::{
    decode_region_identifier, region_identifier, DecodedRegion, Region,
    REGION_IDENTIFIER_PREFIX,
};
pub use scheduler::{toggle_transition, BackgroundTickResult, SyncScheduler, ToggleEffect};
