//! Sync cycle orchestration.
//!
//! Two independent triggers converge on one cycle body: user-driven refresh
//! in the foreground (pull-to-refresh, focus regain, enabling the toggle)
//! and the OS periodic wake-up in the background. The engine controls the
//! timing of neither; it only reacts.
//!
//! The last-known beacon list is threaded through each call as an explicit
//! parameter rather than held as ambient state. A background invocation has
//! no prior in-memory session, so it deliberately seeds the list as empty,
//! which forces re-registration once a non-empty list is fetched.
//!
//! Concurrent cycles are serialized by an in-flight guard: a second trigger
//! waits for the running cycle rather than racing it for the monitor set.
//! The original system left this unguarded (last writer wins); serializing
//! is a strengthening, not a change to any single cycle's result.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::beacon::Beacon;
use crate::config::FyrConfig;
use crate::diff::needs_reregistration;
use crate::error::{FyrError, Result};
use crate::fetch::BeaconClient;
use crate::monitor::MonitorRegistry;
use crate::platform::{
    FlagStore, PermissionGate, PermissionStatus, PeriodicScheduler, SecretStore,
    BACKGROUND_SYNC_TASK_NAME, FLAG_KEY_GEOFENCING_ENABLED, SECRET_KEY_API_KEY,
};
use crate::region::Region;

/// Coarse result the host periodic-task runner expects from a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundTickResult {
    /// The cycle fetched a non-empty beacon list.
    NewData,
    /// Nothing fetched: guard failed, the list was empty, or the cycle
    /// failed (failures never crash the periodic runner).
    NoData,
}

/// Side effect demanded by a toggle transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleEffect {
    /// Register the seed beacons as the monitor set immediately.
    RegisterMonitors,
    /// Run an on-demand sync cycle seeded with the in-memory beacon list.
    RunSyncCycle,
    /// Register the periodic background task.
    RegisterPeriodicTask,
    /// Clear the monitor set without fetching.
    ClearMonitors,
    /// Unregister the periodic background task.
    UnregisterPeriodicTask,
}

/// Pure decision half of the toggle: which effects a transition demands.
///
/// Enabling registers the in-memory beacons right away, arms the background
/// task, then refreshes the list with a seeded cycle; arming before the
/// cycle means a failed fetch still leaves the periodic task to retry.
/// Disabling tears both down without a fetch. A non-transition demands
/// nothing.
#[must_use]
pub fn toggle_transition(prev_enabled: bool, enabled: bool) -> Vec<ToggleEffect> {
    match (prev_enabled, enabled) {
        (false, true) => vec![
            ToggleEffect::RegisterMonitors,
            ToggleEffect::RegisterPeriodicTask,
            ToggleEffect::RunSyncCycle,
        ],
        (true, false) => vec![
            ToggleEffect::ClearMonitors,
            ToggleEffect::UnregisterPeriodicTask,
        ],
        _ => Vec::new(),
    }
}

/// Drives the fetch → diff → register cycle.
pub struct SyncScheduler {
    client: BeaconClient,
    registry: MonitorRegistry,
    periodic: Arc<dyn PeriodicScheduler>,
    secrets: Arc<dyn SecretStore>,
    flags: Arc<dyn FlagStore>,
    permissions: Arc<dyn PermissionGate>,
    region_radius_m: f64,
    background_interval: Duration,
    /// Serializes foreground and background cycles.
    cycle_guard: Mutex<()>,
}

impl SyncScheduler {
    /// Creates a scheduler over the given collaborators.
    #[must_use]
    pub fn new(
        client: BeaconClient,
        registry: MonitorRegistry,
        periodic: Arc<dyn PeriodicScheduler>,
        secrets: Arc<dyn SecretStore>,
        flags: Arc<dyn FlagStore>,
        permissions: Arc<dyn PermissionGate>,
        config: &FyrConfig,
    ) -> Self {
        Self {
            client,
            registry,
            periodic,
            secrets,
            flags,
            permissions,
            region_radius_m: config.region_radius_m,
            background_interval: Duration::from_secs(config.background_interval_minutes * 60),
            cycle_guard: Mutex::new(()),
        }
    }

    /// Runs one sync cycle and returns the fetched beacon list, which
    /// becomes the caller's next `prev`.
    ///
    /// Guard: with an empty API key, geofencing disabled, or permission not
    /// yet determined, the cycle is a no-op returning `prev` unchanged. An
    /// empty fetched list tears the monitor set down. Otherwise the diff
    /// decides whether the monitor set is replaced; a registration
    /// rejection is reported but the fetched list is still returned.
    ///
    /// # Errors
    ///
    /// [`FyrError::PermissionDenied`] when location permission was refused;
    /// fetch errors ([`FyrError::Transport`], [`FyrError::Network`],
    /// [`FyrError::DataShape`]) abort the cycle without touching the
    /// monitor set, so the caller keeps its last-known list.
    pub async fn run_cycle(
        &self,
        api_key: &str,
        enabled: bool,
        prev: &[Beacon],
    ) -> Result<Vec<Beacon>> {
        if api_key.is_empty() || !enabled {
            debug!(enabled, "sync cycle skipped by guard");
            return Ok(prev.to_vec());
        }

        match self.permissions.location_permission().await {
            PermissionStatus::Granted => {}
            PermissionStatus::Denied => return Err(FyrError::PermissionDenied),
            PermissionStatus::Undetermined => {
                debug!("sync cycle skipped: location permission undetermined");
                return Ok(prev.to_vec());
            }
        }

        let _in_flight = self.cycle_guard.lock().await;

        let beacons = self.client.fetch_beacons(api_key).await?;

        if beacons.is_empty() {
            info!("beacon list is empty; stopping region monitoring");
            if let Err(err) = self.registry.clear().await {
                warn!(%err, "failed to stop region monitoring");
            }
            return Ok(Vec::new());
        }

        if needs_reregistration(&beacons, prev, enabled) {
            // The toggle may have flipped while the fetch was in flight; a
            // completed fetch is then discarded, never acted upon.
            if !self.flags.get_flag(FLAG_KEY_GEOFENCING_ENABLED).await? {
                info!("geofencing disabled mid-cycle; discarding fetched beacon list");
                return Ok(prev.to_vec());
            }

            let regions = self.to_regions(&beacons);
            if let Err(err) = self.registry.replace_all(&regions).await {
                warn!(%err, "monitor registration failed; continuing with fetched list");
            }
        }

        Ok(beacons)
    }

    /// Entry point for the OS periodic wake-up.
    ///
    /// Runs in a cold context: the API key and toggle are read from the
    /// durable stores and the previous beacon list is seeded as empty, so a
    /// background cycle always re-registers once it has a non-empty list.
    /// Failures are reported to the host scheduler as [`NoData`], never as
    /// a crash.
    ///
    /// [`NoData`]: BackgroundTickResult::NoData
    pub async fn on_background_tick(&self) -> BackgroundTickResult {
        debug!("starting background sync tick");

        let api_key = match self.secrets.get_secret(SECRET_KEY_API_KEY).await {
            Ok(Some(key)) => key,
            Ok(None) => {
                debug!("background tick skipped: no API key stored");
                return BackgroundTickResult::NoData;
            }
            Err(err) => {
                warn!(%err, "background tick failed to read API key");
                return BackgroundTickResult::NoData;
            }
        };

        let enabled = match self.flags.get_flag(FLAG_KEY_GEOFENCING_ENABLED).await {
            Ok(enabled) => enabled,
            Err(err) => {
                warn!(%err, "background tick failed to read geofencing flag");
                return BackgroundTickResult::NoData;
            }
        };

        if !enabled {
            debug!("background tick skipped: geofencing disabled");
            return BackgroundTickResult::NoData;
        }

        match self.run_cycle(&api_key, enabled, &[]).await {
            Ok(beacons) if beacons.is_empty() => BackgroundTickResult::NoData,
            Ok(_) => BackgroundTickResult::NewData,
            Err(err) => {
                warn!(%err, "background sync cycle failed");
                BackgroundTickResult::NoData
            }
        }
    }

    /// Persists the toggle and executes the transition's effects.
    ///
    /// Enabling runs an immediate cycle seeded with `seed` (the in-memory
    /// beacon list) and arms the periodic task; disabling clears the
    /// monitor set and disarms the periodic task without a fetch. Returns
    /// the beacon list the caller should keep as its new last-known list.
    ///
    /// # Errors
    ///
    /// Store failures propagate; OS registration failures are reported and
    /// execution continues.
    pub async fn apply_toggle(
        &self,
        prev_enabled: bool,
        enabled: bool,
        seed: &[Beacon],
    ) -> Result<Vec<Beacon>> {
        self.flags
            .set_flag(FLAG_KEY_GEOFENCING_ENABLED, enabled)
            .await?;

        let mut beacons = seed.to_vec();

        for effect in toggle_transition(prev_enabled, enabled) {
            match effect {
                ToggleEffect::RegisterMonitors => {
                    if !seed.is_empty() {
                        let regions = self.to_regions(seed);
                        if let Err(err) = self.registry.replace_all(&regions).await {
                            warn!(%err, "monitor registration on enable failed");
                        }
                    }
                }
                ToggleEffect::RunSyncCycle => {
                    let api_key = self
                        .secrets
                        .get_secret(SECRET_KEY_API_KEY)
                        .await?
                        .unwrap_or_default();
                    beacons = self.run_cycle(&api_key, enabled, seed).await?;
                }
                ToggleEffect::RegisterPeriodicTask => {
                    if let Err(err) = self
                        .periodic
                        .register(BACKGROUND_SYNC_TASK_NAME, self.background_interval)
                        .await
                    {
                        warn!(%err, "failed to register periodic sync task");
                    }
                }
                ToggleEffect::ClearMonitors => {
                    if let Err(err) = self.registry.clear().await {
                        warn!(%err, "failed to clear monitor set");
                    }
                }
                ToggleEffect::UnregisterPeriodicTask => {
                    if let Err(err) = self.periodic.unregister(BACKGROUND_SYNC_TASK_NAME).await {
                        warn!(%err, "failed to unregister periodic sync task");
                    }
                }
            }
        }

        Ok(beacons)
    }

    /// Signs the account out: clears the stored API key, resets the toggle,
    /// clears the monitor set, and disarms the periodic task.
    ///
    /// # Errors
    ///
    /// Store failures propagate; OS failures are reported and the sign-out
    /// completes anyway.
    pub async fn sign_out(&self) -> Result<()> {
        info!("signing out; tearing down monitoring");

        self.secrets.clear_secret(SECRET_KEY_API_KEY).await?;
        self.flags
            .set_flag(FLAG_KEY_GEOFENCING_ENABLED, false)
            .await?;

        if let Err(err) = self.registry.clear().await {
            warn!(%err, "failed to clear monitor set during sign-out");
        }
        if let Err(err) = self.periodic.unregister(BACKGROUND_SYNC_TASK_NAME).await {
            warn!(%err, "failed to unregister periodic sync task during sign-out");
        }

        Ok(())
    }

    /// Minimum interval between background ticks.
    #[must_use]
    pub const fn background_interval(&self) -> Duration {
        self.background_interval
    }

    fn to_regions(&self, beacons: &[Beacon]) -> Vec<Region> {
        beacons
            .iter()
            .map(|b| Region::from_beacon(b, self.region_radius_m))
            .collect()
    }
}
