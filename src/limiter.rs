//! Fixed-window rate limiter keyed by user id.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::state::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub max_events: u32,
    pub window: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed { remaining: u32 },
    Denied { retry_after: Duration },
}

#[derive(Debug)]
struct Window {
    count: u32,
    started: Instant,
}

#[derive(Debug)]
pub struct RateLimiter {
    limit: RateLimit,
    windows: Mutex<HashMap<UserId, Window>>,
}

impl RateLimiter {
    pub fn new(limit: RateLimit) -> Self {
        Self {
            limit,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Counts one event for `user`, unless the window is already full.
    pub async fn check(&self, user: UserId) -> Decision {
        let now = Instant::now();
        let mut windows = self.windows.lock().await;
        windows.retain(|_, window| now.duration_since(window.started) < self.limit.window);
        let window = windows.entry(user).or_insert(Window {
            count: 0,
            started: now,
        });

        if window.count >= self.limit.max_events {
            let retry_after = (window.started + self.limit.window).saturating_duration_since(now);
            return Decision::Denied { retry_after };
        }

        window.count += 1;
        Decision::Allowed {
            remaining: self.limit.max_events - window.count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter() -> RateLimiter {
        RateLimiter::new(RateLimit {
            max_events: 2,
            window: Duration::from_secs(10),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn denies_past_the_limit_until_window_ends() {
        let limiter = limiter();
        assert_eq!(limiter.check(1).await, Decision::Allowed { remaining: 1 });
        assert_eq!(limiter.check(1).await, Decision::Allowed { remaining: 0 });

        tokio::time::advance(Duration::from_secs(4)).await;
        assert_eq!(
            limiter.check(1).await,
            Decision::Denied {
                retry_after: Duration::from_secs(6)
            }
        );

        tokio::time::advance(Duration::from_secs(6)).await;
        assert_eq!(limiter.check(1).await, Decision::Allowed { remaining: 1 });
    }

    #[tokio::test(start_paused = true)]
    async fn expired_windows_are_dropped() {
        let limiter = limiter();
        for user in 1..=3 {
            limiter.check(user).await;
        }
        assert_eq!(limiter.windows.lock().await.len(), 3);

        tokio::time::advance(Duration::from_secs(10)).await;
        assert_eq!(limiter.check(4).await, Decision::Allowed { remaining: 1 });
        let windows = limiter.windows.lock().await;
        assert_eq!(windows.len(), 1);
        assert!(windows.contains_key(&4));
    }

    #[tokio::test(start_paused = true)]
    async fn users_are_limited_independently() {
        let limiter = limiter();
        limiter.check(1).await;
        limiter.check(1).await;
        assert!(matches!(limiter.check(1).await, Decision::Denied { .. }));
        assert_eq!(limiter.check(2).await, Decision::Allowed { remaining: 1 });
    }
}
