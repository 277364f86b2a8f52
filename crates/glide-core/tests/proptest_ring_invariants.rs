//! Property-based invariant tests for `RingIndex`.
//!
//! 1. Resolved slots are always within `[0, capacity)`
//! 2. Translation: `resolve(i)` after `rotate(k)` equals `resolve(i - k)`
//!    before
//! 3. Rotations compose additively
//! 4. Rotation never moves data between slots

use glide_core::ring::RingIndex;
use proptest::prelude::*;

fn capacity_strategy() -> impl Strategy<Value = usize> {
    1usize..300
}

proptest! {
    #[test]
    fn resolve_in_bounds(
        cap in capacity_strategy(),
        rotations in prop::collection::vec(-10_000isize..10_000, 0..20),
        i in -100_000isize..100_000,
    ) {
        let mut ring = RingIndex::filled(cap, ());
        for k in rotations {
            ring.rotate(k);
        }
        let slot = ring.resolve(i);
        prop_assert!(matches!(slot, Some(s) if s < cap));
    }

    #[test]
    fn rotation_is_translation(
        cap in capacity_strategy(),
        k in -10_000isize..10_000,
        i in -10_000isize..10_000,
    ) {
        let mut ring = RingIndex::from_fn(cap, |s| s);
        let before = ring.resolve(i - k);
        ring.rotate(k);
        prop_assert_eq!(ring.resolve(i), before);
    }

    #[test]
    fn rotations_compose(
        cap in capacity_strategy(),
        a in -1_000isize..1_000,
        b in -1_000isize..1_000,
    ) {
        let mut twice = RingIndex::filled(cap, 0u8);
        twice.rotate(a);
        twice.rotate(b);
        let mut once = RingIndex::filled(cap, 0u8);
        once.rotate(a + b);
        prop_assert_eq!(twice.base(), once.base());
    }

    #[test]
    fn rotation_preserves_slots(
        cap in capacity_strategy(),
        k in any::<isize>(),
    ) {
        let mut ring = RingIndex::from_fn(cap, |s| s as u32);
        ring.rotate(k);
        let mut seen: Vec<u32> = ring.iter().copied().collect();
        seen.sort_unstable();
        let expected: Vec<u32> = (0..cap as u32).collect();
        prop_assert_eq!(seen, expected);
        prop_assert_eq!(ring.slots_mut().to_vec(), (0..cap as u32).collect::<Vec<_>>());
    }
}
