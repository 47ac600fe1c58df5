use std::env;
use std::time::Duration;

use tracing::warn;

pub const DEFAULT_SUBMIT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LOW_TIME_SECS: u32 = 300;

/// Tunables for an exam session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExamConfig {
    /// Upper bound on one submission round-trip.
    pub submit_timeout: Duration,
    /// `ExamNotice::LowTime` fires once the remaining time drops below this.
    pub low_time_threshold_secs: u32,
}

impl Default for ExamConfig {
    fn default() -> Self {
        Self {
            submit_timeout: Duration::from_secs(DEFAULT_SUBMIT_TIMEOUT_SECS),
            low_time_threshold_secs: DEFAULT_LOW_TIME_SECS,
        }
    }
}

impl ExamConfig {
    /// Reads `NIHONGO_SUBMIT_TIMEOUT_SECS` and `NIHONGO_LOW_TIME_SECS`.
    /// Missing or unparsable values keep their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let submit_timeout = env_number("NIHONGO_SUBMIT_TIMEOUT_SECS")
            .filter(|secs| *secs > 0)
            .map_or(defaults.submit_timeout, Duration::from_secs);
        let low_time_threshold_secs =
            env_number("NIHONGO_LOW_TIME_SECS").unwrap_or(defaults.low_time_threshold_secs);
        Self {
            submit_timeout,
            low_time_threshold_secs,
        }
    }
}

fn env_number<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "ignoring invalid numeric setting");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_exam_rules() {
        let config = ExamConfig::default();
        assert_eq!(config.submit_timeout, Duration::from_secs(30));
        assert_eq!(config.low_time_threshold_secs, 300);
    }

    #[test]
    fn missing_variable_reads_as_none() {
        assert_eq!(env_number::<u32>("NIHONGO_TEST_SURELY_UNSET_VARIABLE"), None);
    }
}
