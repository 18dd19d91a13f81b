//! Stale ticker: Dedicated thread for the periodic staleness poll.
//!
//! The connection can die without an error or a close frame; nothing
//! would ever wake the event loop again. This actor ticks on a fixed
//! interval, independent of message arrival, so the session gets a
//! chance to notice the silence. One ticker belongs to one session and
//! is cancelled on every exit path.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, Sender};

/// How often the staleness check runs.
pub const STALE_POLL_INTERVAL: Duration = Duration::from_secs(6);

/// Ticker actor that fires the periodic staleness poll.
pub struct StaleTicker {
    /// Handle to the ticker thread.
    handle: Option<JoinHandle<()>>,
    /// Flag to signal cancellation.
    cancelled: Arc<AtomicBool>,
    /// Receiver for tick instants.
    tick_rx: Receiver<Instant>,
    /// Keeps the tick channel connected after the thread exits, so an
    /// owner selecting on the receiver blocks quietly instead of seeing
    /// a disconnect on every iteration.
    _keepalive: Sender<Instant>,
}

impl StaleTicker {
    /// Spawn a ticker with the default poll interval.
    pub fn spawn() -> Self {
        Self::with_interval(STALE_POLL_INTERVAL)
    }

    /// Spawn a ticker with a custom interval.
    ///
    /// # Panics
    ///
    /// Panics if the OS fails to spawn the ticker thread.
    pub fn with_interval(interval: Duration) -> Self {
        let cancelled = Arc::new(AtomicBool::new(false));
        let cancelled_clone = cancelled.clone();

        // Small buffer; a tick that cannot be delivered promptly is
        // worthless, so late ones are dropped rather than queued.
        let (tick_tx, tick_rx) = bounded(2);

        let keepalive = tick_tx.clone();
        let handle = thread::Builder::new()
            .name("taillight-ticker".to_string())
            .spawn(move || {
                Self::run_loop(&tick_tx, &cancelled_clone, interval);
            })
            .expect("Failed to spawn ticker thread");

        Self {
            handle: Some(handle),
            cancelled,
            tick_rx,
            _keepalive: keepalive,
        }
    }

    /// Get a reference to the tick receiver for use with `select!`.
    #[inline]
    pub const fn receiver(&self) -> &Receiver<Instant> {
        &self.tick_rx
    }

    /// Cancel the ticker. Safe to call more than once.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Cancel and wait for the ticker thread to finish.
    pub fn join(mut self) {
        self.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    /// Main ticker loop.
    fn run_loop(tick_tx: &Sender<Instant>, cancelled: &Arc<AtomicBool>, interval: Duration) {
        let mut next_tick = Instant::now() + interval;

        loop {
            if cancelled.load(Ordering::Relaxed) {
                break;
            }

            let now = Instant::now();
            if now >= next_tick {
                // Non-blocking send; if the loop is busy, skip the tick.
                let _ = tick_tx.try_send(now);

                next_tick += interval;
                if next_tick < now {
                    // Fell behind; catch up without queueing extra ticks.
                    next_tick = now + interval;
                }
            } else {
                // Sleep in short slices so cancellation stays responsive.
                let until_tick = next_tick - now;
                thread::sleep(until_tick.min(Duration::from_millis(50)));
            }
        }
    }
}

impl Drop for StaleTicker {
    fn drop(&mut self) {
        self.cancel();
    }
}
