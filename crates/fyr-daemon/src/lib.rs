//! # fyr-daemon
//!
//! Standalone host for the fyr synchronization engine.
//!
//! This library wires `fyr-core` to concrete collaborators for a Linux
//! host: file-backed secret/flag stores, a reqwest transport, a state-file
//! region monitor, a tracing notifier, and a tokio-interval periodic
//! runner.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

pub mod host;
pub mod logging;
pub mod state;
pub mod stores;
