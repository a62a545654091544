//! Polling cadence and retry budget
//!
//! The defaults reproduce the historical behaviour: a fixed two second
//! cadence, no backoff and an unbounded number of failed ticks. Bounding the
//! retry loop or adding exponential backoff is a matter of configuration.

use std::time::Duration;

/// Default delay between status checks
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// Default pause between a completed status and navigation to the results
pub const DEFAULT_COMPLETION_GRACE: Duration = Duration::from_millis(1000);

/// Polling policy configuration
#[derive(Debug, Clone, PartialEq)]
pub struct PollPolicy {
    /// Delay between the end of one tick and the start of the next
    pub interval: Duration,

    /// Pause after a completed status before navigating to the results
    pub completion_grace: Duration,

    /// Run the first tick right away instead of after one interval
    pub fire_immediately: bool,

    /// Give up after this many failed ticks in a row (`None` = never)
    pub max_consecutive_failures: Option<u32>,

    /// Give up once polling has run this long (`None` = never)
    pub max_elapsed: Option<Duration>,

    /// Backoff multiplier applied per consecutive failure (1.0 = none)
    pub backoff_multiplier: f64,

    /// Upper bound for the delay after a failed tick
    pub max_backoff: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            completion_grace: DEFAULT_COMPLETION_GRACE,
            fire_immediately: false,
            max_consecutive_failures: None,
            max_elapsed: None,
            backoff_multiplier: 1.0,
            max_backoff: Duration::from_secs(30),
        }
    }
}

impl PollPolicy {
    /// Bounded policy with exponential backoff
    pub fn bounded(max_consecutive_failures: u32, backoff_multiplier: f64) -> Self {
        Self {
            max_consecutive_failures: Some(max_consecutive_failures),
            backoff_multiplier,
            ..Self::default()
        }
    }

    /// Create a policy with fast ticks (for testing)
    pub fn fast() -> Self {
        Self {
            interval: Duration::from_millis(10),
            completion_grace: Duration::from_millis(5),
            max_backoff: Duration::from_millis(100),
            ..Self::default()
        }
    }

    /// Set whether the first tick fires without waiting
    pub fn with_fire_immediately(mut self, fire_immediately: bool) -> Self {
        self.fire_immediately = fire_immediately;
        self
    }

    /// Cap the total polling time
    pub fn with_max_elapsed(mut self, max_elapsed: Duration) -> Self {
        self.max_elapsed = Some(max_elapsed);
        self
    }

    /// Delay to wait after a tick, given the current failure streak
    pub fn next_delay(&self, consecutive_failures: u32) -> Duration {
        if consecutive_failures == 0 {
            return self.interval;
        }

        let exponent = i32::try_from(consecutive_failures - 1).unwrap_or(i32::MAX);
        let delay_ms =
            self.interval.as_millis() as f64 * self.backoff_multiplier.max(1.0).powi(exponent);
        let delay = Duration::from_millis(delay_ms.min(u64::MAX as f64) as u64);

        // Backoff never shortens the cadence, and never exceeds the cap
        delay.clamp(self.interval, self.max_backoff.max(self.interval))
    }

    /// Whether the retry budget is spent
    pub fn is_exhausted(&self, consecutive_failures: u32, elapsed: Duration) -> bool {
        let too_many = self
            .max_consecutive_failures
            .is_some_and(|max| consecutive_failures >= max);
        too_many || self.is_expired(elapsed)
    }

    /// Whether polling has run past `max_elapsed`, whatever the server says
    pub fn is_expired(&self, elapsed: Duration) -> bool {
        self.max_elapsed.is_some_and(|max| elapsed >= max)
    }

    /// Whether any bound is configured
    pub fn is_bounded(&self) -> bool {
        self.max_consecutive_failures.is_some() || self.max_elapsed.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = PollPolicy::default();
        assert_eq!(policy.interval, Duration::from_millis(2000));
        assert_eq!(policy.completion_grace, Duration::from_millis(1000));
        assert!(!policy.fire_immediately);
        assert!(!policy.is_bounded());
    }

    #[test]
    fn test_default_never_backs_off_or_exhausts() {
        let policy = PollPolicy::default();

        assert_eq!(policy.next_delay(0), Duration::from_millis(2000));
        assert_eq!(policy.next_delay(7), Duration::from_millis(2000));
        assert!(!policy.is_exhausted(10_000, Duration::from_secs(86_400)));
    }

    #[test]
    fn test_backoff_calculation() {
        let policy = PollPolicy::bounded(5, 2.0);

        assert_eq!(policy.next_delay(0), Duration::from_millis(2000));
        assert_eq!(policy.next_delay(1), Duration::from_millis(2000));
        assert_eq!(policy.next_delay(2), Duration::from_millis(4000));
        assert_eq!(policy.next_delay(3), Duration::from_millis(8000));
    }

    #[test]
    fn test_backoff_capped_at_max() {
        let policy = PollPolicy::bounded(50, 2.0);
        assert_eq!(policy.next_delay(40), Duration::from_secs(30));
    }

    #[test]
    fn test_exhaustion() {
        let policy = PollPolicy::bounded(3, 1.0).with_max_elapsed(Duration::from_secs(60));

        assert!(!policy.is_exhausted(2, Duration::from_secs(1)));
        assert!(policy.is_exhausted(3, Duration::from_secs(1)));
        assert!(policy.is_exhausted(0, Duration::from_secs(60)));
    }

    #[test]
    fn test_expiry_ignores_failure_count() {
        let policy = PollPolicy::default().with_max_elapsed(Duration::from_secs(10));

        assert!(policy.is_bounded());
        assert!(!policy.is_expired(Duration::from_secs(9)));
        assert!(policy.is_expired(Duration::from_secs(10)));
        assert!(!PollPolicy::bounded(3, 1.0).is_expired(Duration::from_secs(86_400)));
    }
}
