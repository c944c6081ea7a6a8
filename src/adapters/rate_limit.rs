use crate::domain::ports::RateLimiter;
use std::time::Duration;

/// The intranet allows two requests per second per application.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(501);

#[derive(Debug, Clone, Copy)]
pub struct FixedDelay {
    delay: Duration,
}

impl FixedDelay {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for FixedDelay {
    fn default() -> Self {
        Self::new(DEFAULT_DELAY)
    }
}

#[async_trait::async_trait]
impl RateLimiter for FixedDelay {
    async fn pause(&self) {
        tokio::time::sleep(self.delay).await;
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

#[async_trait::async_trait]
impl RateLimiter for NoDelay {
    async fn pause(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_fixed_delay_waits() {
        let limiter = FixedDelay::new(Duration::from_millis(20));
        let started = Instant::now();
        limiter.pause().await;
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_default_delay() {
        assert_eq!(FixedDelay::default().delay(), Duration::from_millis(501));
    }
}
