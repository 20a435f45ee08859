use std::time::Duration;

use genflow_core::Epoch;
use genflow_logging::genflow_debug;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

struct ActiveTimer {
    epoch: Epoch,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// A repeating timer tagged with the epoch it was started for.
///
/// At most one timer runs per instance: `start` stops the previous one
/// before spawning the next, and `stop` tears it down synchronously.
pub struct PollTimer {
    label: &'static str,
    active: Option<ActiveTimer>,
}

impl PollTimer {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            active: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    pub fn epoch(&self) -> Option<Epoch> {
        self.active.as_ref().map(|timer| timer.epoch)
    }

    /// Calls `on_tick` every `interval`, first after one full interval.
    /// The timer ends on its own once `on_tick` returns `false`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start<F>(&mut self, epoch: Epoch, interval: Duration, on_tick: F)
    where
        F: Fn() -> bool + Send + 'static,
    {
        self.stop();
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = tokio::time::sleep(interval) => {
                        if !on_tick() {
                            break;
                        }
                    }
                }
            }
        });
        genflow_debug!("{} timer started (epoch {}, every {:?})", self.label, epoch, interval);
        self.active = Some(ActiveTimer {
            epoch,
            cancel,
            handle,
        });
    }

    /// Stops the running timer, if any. Returns the epoch it was started for.
    pub fn stop(&mut self) -> Option<Epoch> {
        let timer = self.active.take()?;
        timer.cancel.cancel();
        timer.handle.abort();
        genflow_debug!("{} timer stopped (epoch {})", self.label, timer.epoch);
        Some(timer.epoch)
    }

    /// Stops the timer only if it belongs to `epoch`; a newer timer survives.
    pub fn stop_epoch(&mut self, epoch: Epoch) -> bool {
        if self.epoch() == Some(epoch) {
            self.stop();
            return true;
        }
        false
    }
}

impl Drop for PollTimer {
    fn drop(&mut self) {
        self.stop();
    }
}
