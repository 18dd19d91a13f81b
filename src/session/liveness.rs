//! Liveness monitor: Heartbeat and staleness policy as pure data.
//!
//! The monitor is nothing but two timestamps and the arithmetic over
//! them. It owns no timer and performs no I/O; the session records
//! inbound traffic and outbound heartbeats on it, and polls it with a
//! caller-supplied "now" so every policy decision is testable with
//! synthesized instants.

use std::time::{Duration, Instant};

/// Minimum gap between outbound heartbeats.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(20);

/// Inbound silence after which the connection is considered dead.
pub const STALE_AFTER: Duration = Duration::from_secs(60);

/// Tracks time since the last inbound frame and the last outbound
/// heartbeat for one session.
///
/// A monitor is armed when its session starts streaming and discarded
/// with the session; nothing carries over between connections.
#[derive(Debug, Clone, Copy)]
pub struct LivenessMonitor {
    /// When the last inbound data frame arrived.
    last_inbound: Instant,
    /// When the last heartbeat went out, if any has this session.
    last_heartbeat: Option<Instant>,
}

impl LivenessMonitor {
    /// Arm a fresh monitor at the given instant.
    pub const fn armed(now: Instant) -> Self {
        Self {
            last_inbound: now,
            last_heartbeat: None,
        }
    }

    /// Record an inbound data frame.
    pub const fn record_inbound(&mut self, now: Instant) {
        self.last_inbound = now;
    }

    /// Record an outbound heartbeat.
    pub const fn record_heartbeat(&mut self, now: Instant) {
        self.last_heartbeat = Some(now);
    }

    /// Check whether a heartbeat is due.
    ///
    /// True when none has been sent this session, or the last one is at
    /// least [`HEARTBEAT_INTERVAL`] old. The session consults this only
    /// while streaming, and only in response to inbound traffic.
    pub fn should_heartbeat(&self, now: Instant) -> bool {
        self.last_heartbeat
            .map_or(true, |sent| now.duration_since(sent) >= HEARTBEAT_INTERVAL)
    }

    /// Check whether the connection has gone silent for too long.
    ///
    /// True when more than [`STALE_AFTER`] has passed since the last
    /// inbound frame.
    pub fn is_stale(&self, now: Instant) -> bool {
        now.duration_since(self.last_inbound) > STALE_AFTER
    }
}
