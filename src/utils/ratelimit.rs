/// Request pacing for the market-data provider
use std::time::{Duration, Instant};

/// Enforces a minimum gap between consecutive provider requests.
///
/// A zero interval never waits, which is the default for short symbol lists.
pub struct Pacer {
    min_interval: Duration,
    last_request: Option<Instant>,
}

impl Pacer {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: None,
        }
    }

    /// How long to wait before the next request, recording it as sent
    fn check_and_record(&mut self, now: Instant) -> Duration {
        let wait = match self.last_request {
            Some(last) => self.min_interval.saturating_sub(now.duration_since(last)),
            None => Duration::ZERO,
        };
        self.last_request = Some(now + wait);
        wait
    }

    /// Sleep if the previous request was too recent
    pub async fn wait(&mut self) {
        let wait_duration = self.check_and_record(Instant::now());

        if !wait_duration.is_zero() {
            tracing::debug!("Pacing provider requests: waiting {}ms", wait_duration.as_millis());
            tokio::time::sleep(wait_duration).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_request_never_waits() {
        let mut pacer = Pacer::new(Duration::from_millis(500));
        assert_eq!(pacer.check_and_record(Instant::now()), Duration::ZERO);
    }

    #[test]
    fn test_back_to_back_requests_wait_remaining_interval() {
        let mut pacer = Pacer::new(Duration::from_millis(500));
        let start = Instant::now();
        pacer.check_and_record(start);

        let wait = pacer.check_and_record(start + Duration::from_millis(200));
        assert_eq!(wait, Duration::from_millis(300));
    }

    #[test]
    fn test_zero_interval_is_disabled() {
        let mut pacer = Pacer::new(Duration::ZERO);
        let now = Instant::now();
        for _ in 0..5 {
            assert_eq!(pacer.check_and_record(now), Duration::ZERO);
        }
    }
}
