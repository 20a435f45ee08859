use std::time::Duration;

pub const DEFAULT_WATCH_INTERVAL: Duration = Duration::from_secs(12);
pub const DEFAULT_WATCH_MAX_ATTEMPTS: u32 = 75;
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_millis(800);
pub const DEFAULT_HUMANIZE_DELAY: Duration = Duration::from_millis(500);

/// Tunables the state machines read on every transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Language tag forwarded to detection, humanization and video rendering.
    pub language: String,
    /// Pause between a detection verdict and the automatic humanize request.
    pub humanize_delay: Duration,
    pub humanize_passes: u8,
    pub watch_interval: Duration,
    /// Ticks beyond this count fail the watched job.
    pub watch_max_attempts: u32,
    pub sample_interval: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            humanize_delay: DEFAULT_HUMANIZE_DELAY,
            humanize_passes: 1,
            watch_interval: DEFAULT_WATCH_INTERVAL,
            watch_max_attempts: DEFAULT_WATCH_MAX_ATTEMPTS,
            sample_interval: DEFAULT_SAMPLE_INTERVAL,
        }
    }
}
