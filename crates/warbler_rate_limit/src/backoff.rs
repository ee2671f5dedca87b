//! Wait-time arithmetic shared by the queue and auth recovery.

use std::time::Duration;

/// Capped exponential backoff: `min(2^attempt * base, ceiling)`.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use warbler_rate_limit::exponential_backoff;
///
/// let base = Duration::from_secs(1);
/// let ceiling = Duration::from_secs(60);
/// assert_eq!(exponential_backoff(0, base, ceiling), Duration::from_secs(1));
/// assert_eq!(exponential_backoff(3, base, ceiling), Duration::from_secs(8));
/// assert_eq!(exponential_backoff(10, base, ceiling), ceiling);
/// ```
pub fn exponential_backoff(attempt: u32, base: Duration, ceiling: Duration) -> Duration {
    let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
    base.checked_mul(factor).unwrap_or(ceiling).min(ceiling)
}

/// Time to wait for a rate-limit window: `max(0, reset - now) + buffer`.
///
/// Both instants are epoch seconds.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use warbler_rate_limit::reset_wait;
///
/// let buffer = Duration::from_secs(1);
/// assert_eq!(reset_wait(110, 100, buffer), Duration::from_secs(11));
/// // A reset time already in the past only waits for the buffer
/// assert_eq!(reset_wait(90, 100, buffer), buffer);
/// ```
pub fn reset_wait(reset_epoch: i64, now_epoch: i64, buffer: Duration) -> Duration {
    let remaining = reset_epoch.saturating_sub(now_epoch).max(0) as u64;
    Duration::from_secs(remaining) + buffer
}
