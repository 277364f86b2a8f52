//! Property-based invariant tests for `SpringAxis`.
//!
//! 1. Critically damped: from rest velocity, `|position|` never grows and
//!    never changes sign.
//! 2. `animation_length <= dt` always snaps to exact rest.
//! 3. Stepping is frame-rate independent.
//! 4. Non-finite inputs never leak NaN into the state.

use glide_core::animation::spring::{SETTLE_EPSILON, SpringAxis};
use proptest::prelude::*;

// ── Strategies ──────────────────────────────────────────────────────────

fn offset_strategy() -> impl Strategy<Value = f32> {
    prop_oneof![-500.0f32..-0.05, 0.05f32..500.0]
}

// ═══════════════════════════════════════════════════════════════════════
// 1. Monotone approach without crossing zero
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn approaches_rest_monotonically(
        start in offset_strategy(),
        dt in 0.001f32..0.05,
        extra in 0.001f32..2.0,
    ) {
        let length = dt + extra;
        let mut spring = SpringAxis::displaced(start);
        let sign = start.signum();
        let mut prev = start.abs();
        for step in 0..20_000 {
            let moving = spring.advance(dt, length);
            let pos = spring.position();
            prop_assert!(pos.is_finite());
            prop_assert!(
                pos == 0.0 || pos.signum() == sign,
                "sign flipped at step {} (start {}, pos {})", step, start, pos
            );
            prop_assert!(
                pos.abs() <= prev * (1.0 + 1e-5) + 1e-6,
                "|position| grew at step {}: {} -> {}", step, prev, pos.abs()
            );
            prev = pos.abs();
            if !moving {
                break;
            }
        }
        prop_assert!(spring.is_settled());
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 2. Snap when the animation is shorter than a frame
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn short_animation_snaps(
        start in offset_strategy(),
        dt in 0.001f32..1.0,
        ratio in 0.0f32..=1.0,
    ) {
        let mut spring = SpringAxis::displaced(start);
        prop_assert!(!spring.advance(dt, dt * ratio));
        prop_assert_eq!(spring.position(), 0.0);
        prop_assert_eq!(spring.velocity(), 0.0);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 3. Frame-rate independence
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn split_steps_match_single_step(
        start in offset_strategy(),
        dt in 0.002f32..0.05,
        splits in 2usize..8,
    ) {
        let length = 0.5;
        let mut whole = SpringAxis::displaced(start);
        let mut split = SpringAxis::displaced(start);
        whole.advance(dt, length);
        for _ in 0..splits {
            split.advance(dt / splits as f32, length);
        }
        let tolerance = start.abs() * 1e-4 + SETTLE_EPSILON * 0.1;
        prop_assert!(
            (whole.position() - split.position()).abs() <= tolerance,
            "whole {} split {}", whole.position(), split.position()
        );
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 4. Non-finite inputs
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn non_finite_dt_resets(start in offset_strategy(), pick in 0usize..3) {
        let dt = [f32::NAN, f32::INFINITY, f32::NEG_INFINITY][pick];
        let mut spring = SpringAxis::displaced(start);
        prop_assert!(!spring.advance(dt, 0.3));
        prop_assert_eq!(spring, SpringAxis::new());
    }

    #[test]
    fn bouncy_spring_stays_finite(
        start in offset_strategy(),
        dt in 0.001f32..0.05,
        bounce in 0.0f32..0.95,
    ) {
        let mut spring = SpringAxis::displaced(start);
        for _ in 0..500 {
            spring.advance_bouncy(dt, 0.35, bounce);
            prop_assert!(spring.position().is_finite());
            prop_assert!(spring.velocity().is_finite());
        }
    }
}
