//! Adaptive inter-batch delay control.

use std::time::Duration;

use crate::config::DelayConfig;
use crate::types::DispatchOutcome;

/// Seconds added after a network failure. Gentler than a full step so
/// sporadic timeouts do not over-inflate the pacing.
const NETWORK_NUDGE_S: u64 = 1;

/// Owns the pause applied between successive batch dispatches.
///
/// The current value stays within [floor, ceiling]: one step down on a
/// successful send, one step up on a rate limit, a smaller nudge up on a
/// network failure, unchanged on a protocol rejection (not a capacity
/// signal). This is a local heuristic: it does not coordinate with other
/// senders on the same channel and cannot guarantee the channel never
/// rate-limits again.
#[derive(Debug, Clone)]
pub struct DelayController {
    floor: u64,
    ceiling: u64,
    step: u64,
    current: u64,
}

impl DelayController {
    /// Create a controller starting at the floor.
    pub fn new(config: &DelayConfig) -> Self {
        Self {
            floor: config.floor_s,
            ceiling: config.ceiling_s,
            step: config.step_s,
            current: config.floor_s,
        }
    }

    /// Current inter-batch delay.
    pub fn current(&self) -> Duration {
        Duration::from_secs(self.current)
    }

    /// Fold one dispatch outcome into the delay and return the new value.
    pub fn record(&mut self, outcome: &DispatchOutcome) -> Duration {
        self.current = match outcome {
            DispatchOutcome::Sent => self.current.saturating_sub(self.step).max(self.floor),
            DispatchOutcome::RateLimited { .. } => (self.current + self.step).min(self.ceiling),
            DispatchOutcome::NetworkFailure => (self.current + NETWORK_NUDGE_S).min(self.ceiling),
            DispatchOutcome::ProtocolFailure => self.current,
        };
        self.current()
    }
}
