//! Reconnect and progress policies.

use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;

/// Baseline delay before reopening a dropped stream.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(5000);

/// Reconnect attempts allowed before the view gives up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Backoff ceiling when a multiplier is configured without an explicit cap.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(60);

/// When and how often a dropped status stream is reopened.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconnectPolicy {
    /// Delay before the first reconnect
    pub initial_delay: Duration,
    /// Growth factor between attempts; `1.0` keeps the delay fixed
    pub multiplier: f64,
    /// Upper bound for any single delay
    pub max_delay: Duration,
    /// Consecutive attempts allowed without a delivered event
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::fixed(DEFAULT_RECONNECT_DELAY)
    }
}

impl ReconnectPolicy {
    /// Same delay before every attempt.
    pub fn fixed(delay: Duration) -> Self {
        Self {
            initial_delay: delay,
            multiplier: 1.0,
            max_delay: delay,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Delay grows by `multiplier` per attempt, capped at `max_delay`.
    pub fn exponential(initial_delay: Duration, multiplier: f64, max_delay: Duration) -> Self {
        Self {
            initial_delay,
            multiplier: multiplier.max(1.0),
            max_delay: max_delay.max(initial_delay),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Delay before reconnect number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(32) as i32;
        let millis = self.initial_delay.as_millis() as f64 * self.multiplier.powi(exponent);
        let capped = millis.min(self.max_delay.as_millis() as f64);
        Duration::from_millis(capped as u64)
    }

    /// Whether reconnect number `attempt` (1-based) may run.
    pub fn allows(&self, attempt: u32) -> bool {
        attempt <= self.max_attempts
    }

    /// Load from environment variables, falling back to the fixed 5 s baseline.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let initial_delay = env_parse("ENKLIPSE_RECONNECT_DELAY_MS")
            .map(Duration::from_millis)
            .unwrap_or(defaults.initial_delay);
        let multiplier = env_parse("ENKLIPSE_RECONNECT_MULTIPLIER").unwrap_or(defaults.multiplier);
        let max_delay = env_parse("ENKLIPSE_RECONNECT_MAX_DELAY_MS")
            .map(Duration::from_millis)
            .unwrap_or(if multiplier > 1.0 { DEFAULT_MAX_DELAY } else { initial_delay });
        let max_attempts = env_parse("ENKLIPSE_RECONNECT_MAX_ATTEMPTS").unwrap_or(defaults.max_attempts);

        Self::exponential(initial_delay, multiplier, max_delay).with_max_attempts(max_attempts)
    }
}

/// How progress percentages from the stream are merged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressPolicy {
    /// Every event overwrites the percentage, even if it went backwards.
    LatestWins,
    /// Percentage never decreases; the message always follows the latest event.
    #[default]
    Monotonic,
}

impl ProgressPolicy {
    /// Merge an incoming percentage with the last shown one.
    pub fn merge(&self, current: Option<u8>, incoming: u8) -> u8 {
        match (self, current) {
            (Self::Monotonic, Some(current)) => current.max(incoming),
            _ => incoming,
        }
    }
}

impl FromStr for ProgressPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "latest" | "latest_wins" => Ok(Self::LatestWins),
            "monotonic" => Ok(Self::Monotonic),
            other => Err(format!("Unknown progress policy '{}'", other)),
        }
    }
}

/// Status controller configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ControllerConfig {
    pub reconnect: ReconnectPolicy,
    pub progress: ProgressPolicy,
}

impl ControllerConfig {
    pub fn from_env() -> Self {
        Self {
            reconnect: ReconnectPolicy::from_env(),
            progress: env_parse("ENKLIPSE_PROGRESS_POLICY").unwrap_or_default(),
        }
    }

    pub fn with_reconnect(mut self, reconnect: ReconnectPolicy) -> Self {
        self.reconnect = reconnect;
        self
    }

    pub fn with_progress(mut self, progress: ProgressPolicy) -> Self {
        self.progress = progress;
        self
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}
