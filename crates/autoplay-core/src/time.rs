//! Time primitives for the autoplay engine
//!
//! The engine never reads a clock itself. Every entry point receives a
//! [`Timestamp`] from its host, which keeps the engine deterministic and
//! lets tests drive it on virtual time.

use std::ops::{Add, Sub};
use std::time::Duration;

/// Monotonic host time, in microseconds since an arbitrary host epoch
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(pub u64);

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp(0);
    pub const MAX: Timestamp = Timestamp(u64::MAX);

    #[inline]
    pub fn from_micros(micros: u64) -> Self {
        Timestamp(micros)
    }

    #[inline]
    pub fn from_millis(millis: u64) -> Self {
        Timestamp(millis.saturating_mul(1000))
    }

    #[inline]
    pub fn from_secs_f64(secs: f64) -> Self {
        if secs.is_finite() && secs > 0.0 {
            Timestamp((secs * 1_000_000.0) as u64)
        } else {
            Timestamp::ZERO
        }
    }

    #[inline]
    pub fn as_micros(self) -> u64 {
        self.0
    }

    #[inline]
    pub fn as_millis(self) -> u64 {
        self.0 / 1000
    }

    #[inline]
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / 1_000_000.0
    }

    #[inline]
    pub fn saturating_add(self, duration: Duration) -> Self {
        Timestamp(self.0.saturating_add(duration_micros(duration)))
    }

    #[inline]
    pub fn saturating_sub(self, duration: Duration) -> Self {
        Timestamp(self.0.saturating_sub(duration_micros(duration)))
    }

    /// Time elapsed since `earlier`, zero if `earlier` lies in the future
    #[inline]
    pub fn since(self, earlier: Timestamp) -> Duration {
        Duration::from_micros(self.0.saturating_sub(earlier.0))
    }
}

#[inline]
fn duration_micros(duration: Duration) -> u64 {
    u64::try_from(duration.as_micros()).unwrap_or(u64::MAX)
}

impl Add<Duration> for Timestamp {
    type Output = Timestamp;

    #[inline]
    fn add(self, rhs: Duration) -> Self::Output {
        self.saturating_add(rhs)
    }
}

impl Sub<Duration> for Timestamp {
    type Output = Timestamp;

    #[inline]
    fn sub(self, rhs: Duration) -> Self::Output {
        self.saturating_sub(rhs)
    }
}

impl Sub<Timestamp> for Timestamp {
    type Output = Duration;

    #[inline]
    fn sub(self, rhs: Timestamp) -> Self::Output {
        self.since(rhs)
    }
}

impl std::fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t({:.3}ms)", self.0 as f64 / 1000.0)
    }
}

/// Fraction of `total` covered by `elapsed`, clamped to `[0, 1]`
///
/// A zero `total` counts as complete.
#[inline]
pub fn fraction_of(elapsed: Duration, total: Duration) -> f64 {
    if total.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f64() / total.as_secs_f64()).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_arithmetic() {
        let t = Timestamp::from_millis(1000);
        let later = t + Duration::from_millis(250);

        assert_eq!(later.as_millis(), 1250);
        assert_eq!(later - t, Duration::from_millis(250));
        assert_eq!(later - Duration::from_millis(250), t);
    }

    #[test]
    fn test_timestamp_never_goes_negative() {
        let t = Timestamp::from_millis(10);

        assert_eq!(t - Duration::from_secs(5), Timestamp::ZERO);
        assert_eq!(t - Timestamp::from_millis(20), Duration::ZERO);
    }

    #[test]
    fn test_from_secs_rejects_nan() {
        assert_eq!(Timestamp::from_secs_f64(f64::NAN), Timestamp::ZERO);
        assert_eq!(Timestamp::from_secs_f64(-1.0), Timestamp::ZERO);
        assert_eq!(Timestamp::from_secs_f64(1.5).as_millis(), 1500);
    }

    #[test]
    fn test_fraction_clamped() {
        let total = Duration::from_secs(3);

        assert_eq!(fraction_of(Duration::ZERO, total), 0.0);
        assert!((fraction_of(Duration::from_millis(1500), total) - 0.5).abs() < 1e-9);
        assert_eq!(fraction_of(Duration::from_secs(10), total), 1.0);
        assert_eq!(fraction_of(Duration::from_secs(1), Duration::ZERO), 1.0);
    }
}
