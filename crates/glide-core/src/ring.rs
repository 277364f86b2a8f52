#![forbid(unsafe_code)]

//! Fixed-capacity circular addressing.
//!
//! A [`RingIndex`] owns a boxed slice of slots and one logical cursor,
//! `base`. Logical index `i` lives in slot `(base + i) mod capacity`, using
//! Euclidean remainder so negative logical indices address the content
//! just above logical zero. Rotation only moves `base`; no slot is copied.
//!
//! # Invariants
//!
//! 1. `resolve(i)` is always in `[0, capacity)`.
//! 2. After `rotate(k)`, `resolve(i)` equals `resolve(i - k)` from before
//!    the rotation: content moves `k` logical positions forward.
//! 3. Capacity never changes after construction. Slots are recycled by
//!    index, never reallocated.
//!
//! # Failure Modes
//!
//! - Capacity zero: every lookup returns `None` and rotation is a no-op.

use std::collections::TryReserveError;

/// Circular store addressed by a movable logical zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RingIndex<T> {
    slots: Box<[T]>,
    base: usize,
}

impl<T> RingIndex<T> {
    /// Build a ring whose slot `i` holds `fill(i)`.
    #[must_use]
    pub fn from_fn(capacity: usize, fill: impl FnMut(usize) -> T) -> Self {
        Self {
            slots: (0..capacity).map(fill).collect(),
            base: 0,
        }
    }

    /// Like [`from_fn`](Self::from_fn) but reports allocation failure
    /// instead of aborting. `fill` may fail too, for slots that allocate.
    pub fn try_from_fn<E: From<TryReserveError>>(
        capacity: usize,
        mut fill: impl FnMut(usize) -> Result<T, E>,
    ) -> Result<Self, E> {
        let mut slots = Vec::new();
        slots.try_reserve_exact(capacity)?;
        for i in 0..capacity {
            slots.push(fill(i)?);
        }
        Ok(Self {
            slots: slots.into_boxed_slice(),
            base: 0,
        })
    }

    /// Number of slots.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Slot currently addressed by logical zero.
    #[inline]
    #[must_use]
    pub fn base(&self) -> usize {
        self.base
    }

    /// Shift content `k` logical positions forward (negative: backward).
    pub fn rotate(&mut self, k: isize) {
        let cap = self.capacity();
        if cap == 0 {
            return;
        }
        let step = k.unsigned_abs() % cap;
        self.base = if k >= 0 {
            (self.base + cap - step) % cap
        } else {
            (self.base + step) % cap
        };
    }

    /// Slot index for logical index `i`.
    #[inline]
    #[must_use]
    pub fn resolve(&self, i: isize) -> Option<usize> {
        let cap = self.capacity();
        if cap == 0 {
            return None;
        }
        let offset = if i >= 0 {
            i.unsigned_abs() % cap
        } else {
            (cap - i.unsigned_abs() % cap) % cap
        };
        Some((self.base + offset) % cap)
    }

    /// Value at logical index `i`.
    #[must_use]
    pub fn get(&self, i: isize) -> Option<&T> {
        self.resolve(i).map(|slot| &self.slots[slot])
    }

    /// Mutable value at logical index `i`.
    pub fn get_mut(&mut self, i: isize) -> Option<&mut T> {
        self.resolve(i).map(|slot| &mut self.slots[slot])
    }

    /// Values in logical order starting at logical zero.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        let (tail, head) = self.slots.split_at(self.base);
        head.iter().chain(tail.iter())
    }

    /// Every slot in storage order, for bulk resets.
    pub fn slots_mut(&mut self) -> &mut [T] {
        &mut self.slots
    }
}

impl<T: Clone> RingIndex<T> {
    /// Ring with every slot set to `value`.
    #[must_use]
    pub fn filled(capacity: usize, value: T) -> Self {
        Self::from_fn(capacity, |_| value.clone())
    }
}
