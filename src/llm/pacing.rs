// Pacing policy for calls to the text-generation service.
//
// Two knobs: a minimum interval between consecutive calls, and an extra
// pause after every M calls. Both are courtesy delays toward the provider's
// rate limits. The engine awaits the pacer between batches; nothing about
// consolidation correctness depends on how long it sleeps.

use tokio::time::{Duration, Instant};
use tracing::info;

/// Static pacing settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PacingPolicy {
    /// Minimum time between the start of consecutive calls
    pub min_interval: Duration,
    /// Pause after every this many calls (0 disables the pause)
    pub pause_every: u32,
    /// Length of that pause
    pub pause: Duration,
}

impl PacingPolicy {
    /// No delays at all.
    pub fn none() -> Self {
        Self::default()
    }
}

/// Tracks calls made under a [`PacingPolicy`].
///
/// Owned by a single run; no locking needed since calls are sequential.
/// Call [`Pacer::pace`] before each call and [`Pacer::finish`] once it
/// returns: the interval is measured start to start, the pause from the
/// end of the M-th call.
#[derive(Debug)]
pub struct Pacer {
    policy: PacingPolicy,
    calls: u32,
    last_start: Option<Instant>,
    last_finish: Option<Instant>,
}

impl Pacer {
    pub fn new(policy: PacingPolicy) -> Self {
        Self {
            policy,
            calls: 0,
            last_start: None,
            last_finish: None,
        }
    }

    /// Number of calls paced so far.
    pub fn calls(&self) -> u32 {
        self.calls
    }

    /// Wait until the next call is allowed, then record its start.
    ///
    /// The first call always goes through immediately.
    pub async fn pace(&mut self) {
        if let Some(wait) = self.wait_before_next(Instant::now()) {
            info!(delay_ms = wait.as_millis() as u64, calls = self.calls, "Pacing: waiting before next call");
            tokio::time::sleep(wait).await;
        }
        self.calls += 1;
        self.last_start = Some(Instant::now());
    }

    /// Record that the call started by the last `pace` has returned.
    pub fn finish(&mut self) {
        self.last_finish = Some(Instant::now());
    }

    /// How long the next call must wait, measured from `now`.
    fn wait_before_next(&self, now: Instant) -> Option<Duration> {
        let start = self.last_start?;

        let mut wait = self.policy.min_interval.saturating_sub(now.duration_since(start));
        if self.policy.pause_every > 0 && self.calls % self.policy.pause_every == 0 {
            // Without a recorded finish the call is treated as having just returned.
            let since_finish = self
                .last_finish
                .filter(|finish| *finish >= start)
                .map_or(Duration::ZERO, |finish| now.duration_since(finish));
            wait = wait.max(self.policy.pause.saturating_sub(since_finish));
        }

        (!wait.is_zero()).then_some(wait)
    }
}
