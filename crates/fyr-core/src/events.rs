//! Region entry/exit event handling.
//!
//! The OS delivers boundary-crossing callbacks on its own schedule, possibly
//! from an isolated lifecycle with none of the registering cycle's in-memory
//! state. The handler therefore owns nothing but its notifier and channel
//! id: decode the identifier, synthesize an alert, done.
//!
//! Enter events may be redelivered for the same region (oscillation near a
//! boundary); no de-duplication is performed here. Callers needing exactly
//! one alert per physical entry must add their own refinement.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, trace, warn};

use crate::beacon::{is_valid_node_id, to_tana_url, NotificationEvent};
use crate::error::Result;
use crate::platform::{NotificationRequest, NotificationScheduler};
use crate::region::decode_region_identifier;

/// Notification channel for beacon proximity alerts. The host environment
/// pre-configures this channel; the engine only posts to it.
pub const NEARBY_BEACON_ALERTS_CHANNEL: &str = "nearby-beacon-alerts";

/// Kind of boundary crossing reported by the OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionEventKind {
    /// The device entered a monitored region.
    Enter,
    /// The device left a monitored region. Logged only.
    Exit,
}

/// Turns region entry callbacks into user-visible alerts.
#[derive(Clone)]
pub struct EntryEventHandler {
    notifier: Arc<dyn NotificationScheduler>,
    channel: String,
}

impl EntryEventHandler {
    /// Creates a handler posting to the default alert channel.
    #[must_use]
    pub fn new(notifier: Arc<dyn NotificationScheduler>) -> Self {
        Self::with_channel(notifier, NEARBY_BEACON_ALERTS_CHANNEL)
    }

    /// Creates a handler posting to an explicit channel.
    #[must_use]
    pub fn with_channel(notifier: Arc<dyn NotificationScheduler>, channel: &str) -> Self {
        Self {
            notifier,
            channel: channel.to_string(),
        }
    }

    /// Handles one OS region callback.
    ///
    /// On `Enter`, decodes the region identifier and schedules an alert;
    /// malformed or foreign identifiers are discarded silently. On `Exit`,
    /// logs and does nothing. Returns the emitted payload, `None` when the
    /// event was discarded.
    ///
    /// A notifier rejection is warned and swallowed; there is no caller in
    /// the callback context that could act on it.
    pub async fn handle_event(
        &self,
        kind: RegionEventKind,
        region_identifier: &str,
    ) -> Option<NotificationEvent> {
        match kind {
            RegionEventKind::Enter => self.handle_enter(region_identifier).await,
            RegionEventKind::Exit => {
                debug!(identifier = %region_identifier, "left region");
                None
            }
        }
    }

    /// Handles a monitoring fault reported by the OS instead of a clean
    /// event. Reported and discarded; never fed into retry logic.
    pub fn handle_error(&self, message: &str) {
        warn!(%message, "region monitoring fault reported by the host");
    }

    /// Posts a test notification to the alert channel.
    ///
    /// # Errors
    ///
    /// Returns [`crate::FyrError::Notification`] if the OS rejects the call.
    pub async fn send_test_notification(&self) -> Result<()> {
        self.notifier
            .schedule(&NotificationRequest {
                title: "Test Notification!".to_string(),
                body: "Testing 123...".to_string(),
                data: serde_json::Value::Null,
                channel: self.channel.clone(),
                delay_seconds: 1,
            })
            .await
    }

    async fn handle_enter(&self, region_identifier: &str) -> Option<NotificationEvent> {
        let Some(decoded) = decode_region_identifier(region_identifier) else {
            trace!(identifier = %region_identifier, "ignoring foreign region identifier");
            return None;
        };

        if !is_valid_node_id(&decoded.node_id) {
            trace!(identifier = %region_identifier, "ignoring region identifier with malformed node id");
            return None;
        }

        debug!(node_id = %decoded.node_id, "entered region");

        let event = NotificationEvent {
            tana_url: to_tana_url(&decoded.node_id),
            node_id: decoded.node_id,
        };

        let request = NotificationRequest {
            title: "Nearby Beacon!".to_string(),
            body: format!("Node {}'s beacon is nearby", event.node_id),
            data: json!({ "url": event.tana_url }),
            channel: self.channel.clone(),
            delay_seconds: 1,
        };

        if let Err(err) = self.notifier.schedule(&request).await {
            warn!(%err, "failed to schedule proximity alert");
        }

        Some(event)
    }
}
