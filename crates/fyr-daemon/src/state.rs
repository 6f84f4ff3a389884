//! Application state shared across the daemon.

use std::path::Path;
use std::sync::Arc;

use fyr_core::beacon::Beacon;
use fyr_core::config::FyrConfig;
use fyr_core::error::Result;
use fyr_core::events::EntryEventHandler;
use fyr_core::fetch::{BeaconClient, ReqwestTransport};
use fyr_core::monitor::MonitorRegistry;
use fyr_core::platform::{FlagStore, SecretStore, FLAG_KEY_GEOFENCING_ENABLED, SECRET_KEY_API_KEY};
use fyr_core::scheduler::SyncScheduler;
use tokio::sync::RwLock;
use tracing::info;

use crate::host::{GrantedPermissions, StateFileMonitor, TokioPeriodicRunner, TracingNotifier};
use crate::stores::{FileFlagStore, FileSecretStore};

/// Shared daemon state: the engine, the event handler, and the in-memory
/// last-known beacon list that seeds foreground cycles.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    scheduler: Arc<SyncScheduler>,
    handler: EntryEventHandler,
    secrets: Arc<FileSecretStore>,
    flags: Arc<FileFlagStore>,
    beacons: RwLock<Vec<Beacon>>,
}

impl AppState {
    /// Wires the engine to the host adapters under `data_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: &FyrConfig, data_dir: &Path) -> Result<Self> {
        config.validate()?;

        let secrets = Arc::new(FileSecretStore::new(data_dir));
        let flags = Arc::new(FileFlagStore::new(data_dir));
        let monitor = Arc::new(StateFileMonitor::new(data_dir));
        let periodic = Arc::new(TokioPeriodicRunner::new());

        let client = BeaconClient::new(Arc::new(ReqwestTransport::new()), &config.api_base_url);
        let registry = MonitorRegistry::new(monitor);

        let scheduler = Arc::new(SyncScheduler::new(
            client,
            registry,
            periodic.clone(),
            secrets.clone(),
            flags.clone(),
            Arc::new(GrantedPermissions),
            config,
        ));
        periodic.bind(scheduler.clone());

        let handler = EntryEventHandler::with_channel(
            Arc::new(TracingNotifier),
            &config.notification_channel,
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                scheduler,
                handler,
                secrets,
                flags,
                beacons: RwLock::new(Vec::new()),
            }),
        })
    }

    /// Restores monitoring after a cold start: if the persisted toggle is
    /// on, runs a seeded enable transition (cycle + periodic task).
    ///
    /// # Errors
    ///
    /// Propagates store failures and on-demand cycle failures.
    pub async fn bootstrap(&self) -> Result<()> {
        if self.inner.flags.get_flag(FLAG_KEY_GEOFENCING_ENABLED).await? {
            info!("geofencing enabled; restoring monitoring");
            let beacons = self.inner.scheduler.apply_toggle(false, true, &[]).await?;
            *self.inner.beacons.write().await = beacons;
        } else {
            info!("geofencing disabled; monitoring stays down");
        }
        Ok(())
    }

    /// Runs an on-demand sync cycle seeded with the in-memory list and
    /// updates it on success.
    ///
    /// # Errors
    ///
    /// Propagates cycle failures; the in-memory list is left untouched.
    pub async fn refresh(&self) -> Result<Vec<Beacon>> {
        let api_key = self
            .inner
            .secrets
            .get_secret(SECRET_KEY_API_KEY)
            .await?
            .unwrap_or_default();
        let enabled = self.inner.flags.get_flag(FLAG_KEY_GEOFENCING_ENABLED).await?;

        let prev = self.inner.beacons.read().await.clone();
        let beacons = self.inner.scheduler.run_cycle(&api_key, enabled, &prev).await?;

        *self.inner.beacons.write().await = beacons.clone();
        Ok(beacons)
    }

    /// Flips the geofencing toggle and executes the transition's effects.
    ///
    /// # Errors
    ///
    /// Propagates store and cycle failures.
    pub async fn set_geofencing_enabled(&self, enabled: bool) -> Result<()> {
        let prev_enabled = self.inner.flags.get_flag(FLAG_KEY_GEOFENCING_ENABLED).await?;
        let seed = self.inner.beacons.read().await.clone();

        let beacons = self
            .inner
            .scheduler
            .apply_toggle(prev_enabled, enabled, &seed)
            .await?;

        *self.inner.beacons.write().await = beacons;
        Ok(())
    }

    /// Clears credentials and tears down all monitoring.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn sign_out(&self) -> Result<()> {
        self.inner.scheduler.sign_out().await?;
        self.inner.beacons.write().await.clear();
        Ok(())
    }

    /// The in-memory last-known beacon list.
    pub async fn last_known_beacons(&self) -> Vec<Beacon> {
        self.inner.beacons.read().await.clone()
    }

    /// The region event handler for OS callbacks.
    #[must_use]
    pub fn event_handler(&self) -> &EntryEventHandler {
        &self.inner.handler
    }

    /// The sync scheduler.
    #[must_use]
    pub fn scheduler(&self) -> &Arc<SyncScheduler> {
        &self.inner.scheduler
    }
}
