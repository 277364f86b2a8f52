#![forbid(unsafe_code)]

//! Content-arrival rate model.
//!
//! [`RateEstimator`] keeps an exponential moving average of output lines per
//! second. Each arrival of `n` lines adds an impulse of `n / τ` to an
//! estimate that otherwise decays as `e^(-Δt/τ)`, so a steady stream of `r`
//! lines per second converges to `r` regardless of how it is chunked, and
//! several arrivals at the same instant simply add up.
//!
//! The smoothed rate selects an [`AnimationPolicy`]:
//!
//! | Arrival | Policy |
//! |---------|--------|
//! | `lines >= burst_lines` | [`AnimationPolicy::SpringDrop`] |
//! | rate `<= low_rate` | ease-out glide of `nominal_duration` |
//! | rate between | duration interpolated toward `min_duration` |
//! | rate `>= high_rate` | `min_duration`, [`AnimationPolicy::Instant`] at zero |

use web_time::Instant;

use crate::animation::easing::{EasingFn, ease_out_cubic};
use crate::config::RateConfig;

/// How an arrival of new content should be animated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimationPolicy {
    /// Jump straight to the new position.
    Instant,
    /// Timed glide with an easing curve.
    Glide { duration: f32, easing: EasingFn },
    /// Under-damped spring with visible overshoot.
    SpringDrop { animation_length: f32, bounce: f32 },
}

/// Smoothed lines-per-second estimate.
#[derive(Debug, Clone)]
pub struct RateEstimator {
    config: RateConfig,
    rate: f32,
    last: Option<Instant>,
}

impl RateEstimator {
    /// Create an estimator with no history.
    #[must_use]
    pub fn new(config: RateConfig) -> Self {
        Self {
            config,
            rate: 0.0,
            last: None,
        }
    }

    fn decayed(&self, now: Instant) -> f32 {
        match self.last {
            Some(last) => {
                let dt = now.saturating_duration_since(last).as_secs_f32();
                self.rate * (-dt / self.config.time_constant.max(f32::EPSILON)).exp()
            }
            None => 0.0,
        }
    }

    /// Smoothed rate at `now`, in lines per second.
    #[must_use]
    pub fn rate_at(&self, now: Instant) -> f32 {
        self.decayed(now)
    }

    /// Record `lines` arriving at `now` and pick the policy for them.
    pub fn record(&mut self, lines: u32, now: Instant) -> AnimationPolicy {
        let tau = self.config.time_constant.max(f32::EPSILON);
        self.rate = self.decayed(now) + lines as f32 / tau;
        self.last = Some(now);

        let policy = self.policy_for(lines);
        tracing::trace!(lines, rate = self.rate, ?policy, "content arrival");
        policy
    }

    /// Policy for an arrival of `lines` at the current smoothed rate.
    #[must_use]
    pub fn policy_for(&self, lines: u32) -> AnimationPolicy {
        let config = &self.config;
        if lines >= config.burst_lines {
            return AnimationPolicy::SpringDrop {
                animation_length: config.spring_drop_duration,
                bounce: config.bounce,
            };
        }

        let span = (config.high_rate - config.low_rate).max(f32::EPSILON);
        let t = ((self.rate - config.low_rate) / span).clamp(0.0, 1.0);
        let duration =
            config.nominal_duration + (config.min_duration - config.nominal_duration) * t;
        if duration <= 0.0 {
            AnimationPolicy::Instant
        } else {
            AnimationPolicy::Glide {
                duration,
                easing: ease_out_cubic,
            }
        }
    }

    /// Forget all history.
    pub fn reset(&mut self) {
        self.rate = 0.0;
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn estimator() -> RateEstimator {
        RateEstimator::new(RateConfig::default())
    }

    fn glide_duration(policy: AnimationPolicy) -> f32 {
        match policy {
            AnimationPolicy::Glide { duration, .. } => duration,
            AnimationPolicy::Instant => 0.0,
            other => panic!("expected glide, got {other:?}"),
        }
    }

    #[test]
    fn sparse_lines_get_nominal_glide() {
        let mut est = estimator();
        let t0 = Instant::now();
        let policy = est.record(1, t0);
        assert!((glide_duration(policy) - 0.15).abs() < 1e-6);

        // One line every two seconds stays well under the low rate.
        let policy = est.record(1, t0 + Duration::from_secs(2));
        assert!((glide_duration(policy) - 0.15).abs() < 1e-6);
    }

    #[test]
    fn streaming_converges_to_instant() {
        let mut est = estimator();
        let t0 = Instant::now();
        let mut last = AnimationPolicy::Instant;
        // 200 lines/s in 5-line chunks.
        for i in 0..200 {
            last = est.record(5, t0 + Duration::from_millis(25 * i));
        }
        assert_eq!(last, AnimationPolicy::Instant);
        let rate = est.rate_at(t0 + Duration::from_millis(25 * 199));
        assert!((rate - 200.0).abs() < 25.0, "rate {rate}");
    }

    #[test]
    fn moderate_rate_interpolates() {
        let mut est = estimator();
        let t0 = Instant::now();
        let mut policy = AnimationPolicy::Instant;
        // ~50 lines/s.
        for i in 0..100 {
            policy = est.record(1, t0 + Duration::from_millis(20 * i));
        }
        let d = glide_duration(policy);
        assert!(d > 0.0 && d < 0.15, "duration {d}");
    }

    #[test]
    fn burst_selects_spring_drop() {
        let mut est = estimator();
        let policy = est.record(40, Instant::now());
        assert_eq!(
            policy,
            AnimationPolicy::SpringDrop {
                animation_length: 0.35,
                bounce: 0.35,
            }
        );
    }

    #[test]
    fn estimate_decays_when_output_stops() {
        let mut est = estimator();
        let t0 = Instant::now();
        est.record(30, t0);
        let early = est.rate_at(t0);
        let late = est.rate_at(t0 + Duration::from_secs(2));
        assert!(late < early * 0.01);
    }

    #[test]
    fn same_instant_arrivals_accumulate() {
        let mut est = estimator();
        let t0 = Instant::now();
        est.record(3, t0);
        est.record(3, t0);
        assert!((est.rate_at(t0) - 6.0 / 0.25).abs() < 1e-3);
    }

    #[test]
    fn reset_forgets_history() {
        let mut est = estimator();
        let t0 = Instant::now();
        est.record(30, t0);
        est.reset();
        assert_eq!(est.rate_at(t0), 0.0);
    }
}
