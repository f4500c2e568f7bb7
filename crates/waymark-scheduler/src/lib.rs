//! Waymark — Auto-Advance Scheduler.
//!
//! A single cooperative timer. Each `arm` starts a new cycle that delivers at
//! most one [`AdvanceFired`] signal after the dwell interval. `disarm` and a
//! later `arm` both cancel the pending cycle, and the owner confirms a
//! delivered signal with [`AutoAdvanceScheduler::take_fired`], which rejects
//! signals from cycles that are no longer current.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::trace;

/// Default dwell before auto-advance fires.
pub const DEFAULT_DWELL: Duration = Duration::from_secs(8);

/// Delivered when an armed cycle's dwell interval elapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvanceFired {
    /// Cycle that produced the signal.
    pub cycle: u64,
}

/// Single-timer scheduler. Must be used from within a tokio runtime.
#[derive(Debug)]
pub struct AutoAdvanceScheduler {
    signals: mpsc::UnboundedSender<AdvanceFired>,
    pending: Option<JoinHandle<()>>,
    cycle: u64,
    armed: bool,
}

impl AutoAdvanceScheduler {
    /// Creates a scheduler delivering signals to `signals`.
    #[must_use]
    pub fn new(signals: mpsc::UnboundedSender<AdvanceFired>) -> Self {
        Self {
            signals,
            pending: None,
            cycle: 0,
            armed: false,
        }
    }

    /// Creates a scheduler together with the receiving end of its signals.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<AdvanceFired>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    /// Starts a new cycle that fires once after `dwell`. Any pending cycle is
    /// cancelled first. Returns the new cycle number.
    pub fn arm(&mut self, dwell: Duration) -> u64 {
        self.disarm();

        self.cycle += 1;
        self.armed = true;
        let cycle = self.cycle;
        let signals = self.signals.clone();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(dwell).await;
            // The receiver is gone only when the owner has shut down.
            let _ = signals.send(AdvanceFired { cycle });
        }));

        trace!(cycle, dwell_ms = dwell.as_millis(), "auto-advance armed");
        cycle
    }

    /// Cancels the pending cycle. A no-op when nothing is armed.
    pub fn disarm(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
        if self.armed {
            trace!(cycle = self.cycle, "auto-advance disarmed");
        }
        self.armed = false;
    }

    /// Accepts `signal` if it belongs to the currently armed cycle, consuming
    /// the arm so the same cycle can never advance twice.
    pub fn take_fired(&mut self, signal: AdvanceFired) -> bool {
        if !self.armed || signal.cycle != self.cycle {
            trace!(
                signal_cycle = signal.cycle,
                current_cycle = self.cycle,
                "stale auto-advance signal dropped"
            );
            return false;
        }
        self.armed = false;
        self.pending = None;
        true
    }

    /// Returns `true` while a cycle is pending.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// The most recently started cycle number, `0` before the first arm.
    #[must_use]
    pub fn cycle(&self) -> u64 {
        self.cycle
    }
}

impl Drop for AutoAdvanceScheduler {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}
