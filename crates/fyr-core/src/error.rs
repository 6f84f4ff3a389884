//! Unified error types for the fyr core library.
//!
//! This module provides a unified error type [`FyrError`] covering all
//! failure modes of the synchronization engine: transport, wire validation,
//! OS registration, notification delivery, permissions, and the durable
//! secret/flag stores.
//!
//! A missing API key is deliberately *not* an error: the scheduler treats it
//! as a guard and turns the cycle into a no-op. Likewise a region identifier
//! that fails to decode is a silent discard, never an error.

use thiserror::Error;

/// The unified error type for all fyr operations.
#[derive(Debug, Error)]
pub enum FyrError {
    // =========================================================================
    // FETCH ERRORS
    // =========================================================================
    /// The beacon endpoint answered with a non-success HTTP status.
    #[error("beacon fetch failed with HTTP status {status}")]
    Transport {
        /// The HTTP status code returned by the server.
        status: u16,
    },

    /// The request never produced an HTTP response (DNS, TLS, timeout, ...).
    #[error("beacon fetch failed before an HTTP response: {0}")]
    Network(String),

    /// The response body did not match the beacon wire schema.
    #[error("beacon response did not match the expected schema: {0}")]
    DataShape(String),

    // =========================================================================
    // OS PRIMITIVE ERRORS
    // =========================================================================
    /// The OS rejected a monitor or periodic-task registration call.
    #[error("registration rejected by the host platform: {0}")]
    Registration(String),

    /// The OS rejected a notification scheduling call.
    #[error("notification scheduling rejected by the host platform: {0}")]
    Notification(String),

    /// Location permission is not granted; the cycle cannot run.
    #[error("location permission denied")]
    PermissionDenied,

    // =========================================================================
    // STORE, CONFIG & I/O ERRORS
    // =========================================================================
    /// A secret or flag store operation failed.
    #[error("store error: {0}")]
    Store(String),

    /// Configuration could not be parsed or serialized.
    #[error("configuration error: {0}")]
    Config(String),

    /// A low-level I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized [`Result`] type for fyr operations.
pub type Result<T> = std::result::Result<T, FyrError>;

impl FyrError {
    /// Returns `true` if this error came from the fetch path (HTTP status,
    /// connection failure, or schema mismatch).
    #[inline]
    #[must_use]
    pub const fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::Network(_) | Self::DataShape(_)
        )
    }

    /// Returns `true` if this error must abort the running sync cycle
    /// without touching the monitor set or the last-known beacon list.
    ///
    /// Registration and notification failures are reported but the engine
    /// continues; fetch failures are fail-safe aborts.
    #[inline]
    #[must_use]
    pub const fn aborts_cycle(&self) -> bool {
        self.is_fetch_error() || matches!(self, Self::PermissionDenied)
    }

    /// Returns `true` if this error is likely transient and a later cycle
    /// may succeed without intervention.
    #[inline]
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. }
                | Self::Network(_)
                | Self::Registration(_)
                | Self::Notification(_)
        )
    }
}

impl From<toml::de::Error> for FyrError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for FyrError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Config(err.to_string())
    }
}
