#![forbid(unsafe_code)]

//! Idle-aware animation tick driver.
//!
//! [`AnimationScheduler`] is polled by the render loop with the current
//! time. While any registered [`Animatable`] reports motion it is `Active`
//! and ticks once per refresh interval, handing every entry the elapsed
//! wall time. When the last entry settles it goes `Idle` and stops ticking
//! until something is scheduled again.
//!
//! # State machine
//!
//! ```text
//!            schedule / wake / deadline
//!   ┌──────┐ ─────────────────────────▶ ┌────────┐
//!   │ Idle │                            │ Active │ ──┐ tick every 1/refresh
//!   └──────┘ ◀───────────────────────── └────────┘ ◀─┘
//!              all entries settled
//! ```
//!
//! # Invariants
//!
//! 1. No tick runs while `Idle`; an idle scheduler costs one atomic load
//!    per poll.
//! 2. Entries are held weakly. An entry leaves the registry by reporting
//!    settled or by being dropped, never by force.
//! 3. A settled entry that asks for a later wake (cursor blink) sleeps
//!    until its deadline instead of keeping the scheduler active. On waking
//!    it receives one `animate` call covering the whole time slept.
//! 4. `dt` handed to ticking entries is clamped to `max_frame_dt`.
//!
//! # Threading
//!
//! The scheduler and its entries live on the render thread. Other threads
//! only hold a [`WakeHandle`], which flips a shared flag.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use web_time::Instant;

use crate::animation::cursor_quad::CursorQuadAnimator;
use crate::config::SchedulerConfig;

/// Something the scheduler can advance.
pub trait Animatable {
    /// Advance by `dt` seconds. Returns whether another tick is needed.
    fn animate(&mut self, dt: f32) -> bool;

    /// Seconds until this entry needs a tick again after settling.
    ///
    /// When the deadline passes, the entry is advanced once by the full
    /// wall time since it settled, then rejoins the tick cadence if it
    /// reports motion or sleeps again until its next wake.
    fn next_wake(&self) -> Option<f32> {
        None
    }
}

impl Animatable for CursorQuadAnimator {
    fn animate(&mut self, dt: f32) -> bool {
        CursorQuadAnimator::animate(self, dt)
    }

    fn next_wake(&self) -> Option<f32> {
        self.next_blink_transition()
    }
}

/// Scheduler activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulerState {
    /// Not ticking.
    #[default]
    Idle,
    /// Ticking at the refresh cadence.
    Active,
}

/// Result of [`AnimationScheduler::poll`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PollOutcome {
    /// Stopped or idle with nothing pending.
    Idle,
    /// Nothing due yet; poll again at the given instant.
    Wait(Instant),
    /// A tick ran with the given `dt`.
    Ticked {
        dt: f32,
        /// Entries still moving after this tick.
        active: usize,
    },
}

/// Cross-thread handle that activates the scheduler on its next poll.
#[derive(Debug, Clone, Default)]
pub struct WakeHandle {
    flag: Arc<AtomicBool>,
}

impl WakeHandle {
    /// Request a tick.
    pub fn wake(&self) {
        self.flag.store(true, Ordering::Release);
    }

    fn take(&self) -> bool {
        self.flag.swap(false, Ordering::AcqRel)
    }
}

type Entry = Weak<RefCell<dyn Animatable>>;

/// Deadlines land this far past the requested wake so float rounding never
/// wakes an entry just short of its transition.
const WAKE_SLACK: Duration = Duration::from_micros(100);

fn wake_delay(secs: f32) -> Duration {
    Duration::from_secs_f64(f64::from(secs.max(0.0))) + WAKE_SLACK
}

struct Sleeper {
    wake_at: Instant,
    since: Instant,
    entry: Entry,
}

/// Poll-driven tick scheduler.
pub struct AnimationScheduler {
    entries: Vec<Entry>,
    sleepers: Vec<Sleeper>,
    resumed: Vec<Entry>,
    state: SchedulerState,
    running: bool,
    wake: WakeHandle,
    pending_activation: bool,
    wake_deadline: Option<Instant>,
    refresh: Duration,
    max_frame_dt: f32,
    last_tick: Option<Instant>,
    next_tick: Option<Instant>,
    tick_count: u64,
}

impl std::fmt::Debug for AnimationScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationScheduler")
            .field("state", &self.state)
            .field("running", &self.running)
            .field("entries", &self.entries.len())
            .field("sleepers", &self.sleepers.len())
            .field("tick_count", &self.tick_count)
            .finish()
    }
}

impl AnimationScheduler {
    /// Create a stopped scheduler.
    #[must_use]
    pub fn new(config: &SchedulerConfig) -> Self {
        let hz = if config.refresh_rate_hz.is_finite() && config.refresh_rate_hz > 0.0 {
            config.refresh_rate_hz
        } else {
            60.0
        };
        Self {
            entries: Vec::new(),
            sleepers: Vec::new(),
            resumed: Vec::new(),
            state: SchedulerState::Idle,
            running: false,
            wake: WakeHandle::default(),
            pending_activation: false,
            wake_deadline: None,
            refresh: Duration::from_secs_f32(1.0 / hz),
            max_frame_dt: config.max_frame_dt.max(0.0),
            last_tick: None,
            next_tick: None,
            tick_count: 0,
        }
    }

    /// Begin accepting polls.
    pub fn start(&mut self) {
        self.running = true;
        tracing::debug!(refresh_ms = self.refresh.as_secs_f64() * 1e3, "scheduler started");
    }

    /// Stop ticking. Registered entries are kept for the next start.
    pub fn stop(&mut self) {
        self.running = false;
        self.go_idle();
        tracing::debug!("scheduler stopped");
    }

    /// Whether [`start`](Self::start) has been called without a matching stop.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Total ticks executed.
    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Refresh interval.
    #[must_use]
    pub fn refresh_interval(&self) -> Duration {
        self.refresh
    }

    /// Handle for other threads to request a tick.
    #[must_use]
    pub fn wake_handle(&self) -> WakeHandle {
        self.wake.clone()
    }

    /// Register `entry` after it was retargeted away from rest.
    ///
    /// Re-registering an already scheduled entry is a no-op apart from
    /// activating the scheduler.
    pub fn schedule<A: Animatable + 'static>(&mut self, entry: &Rc<RefCell<A>>) {
        let entry: Rc<RefCell<dyn Animatable>> = entry.clone();
        let weak = Rc::downgrade(&entry);
        self.sleepers.retain(|s| !Weak::ptr_eq(&s.entry, &weak));
        if !self.entries.iter().any(|e| Weak::ptr_eq(e, &weak)) {
            self.entries.push(weak);
        }
        self.activate();
    }

    /// Activate no later than `deadline`, with or without entries.
    pub fn wake_at(&mut self, deadline: Instant) {
        self.wake_deadline = Some(match self.wake_deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
    }

    /// Earliest instant the caller should poll again, or `None` if only an
    /// external wake can produce work.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        if !self.running {
            return None;
        }
        if self.state == SchedulerState::Active {
            return self.next_tick;
        }
        self.sleepers
            .iter()
            .map(|s| s.wake_at)
            .chain(self.wake_deadline)
            .min()
    }

    fn activate(&mut self) {
        if self.state == SchedulerState::Idle {
            self.pending_activation = true;
        }
        self.state = SchedulerState::Active;
    }

    fn go_idle(&mut self) {
        if self.state == SchedulerState::Active {
            tracing::debug!(ticks = self.tick_count, "scheduler idle");
        }
        self.state = SchedulerState::Idle;
        self.pending_activation = false;
        self.last_tick = None;
        self.next_tick = None;
    }

    /// Catch up every sleeper whose deadline has passed. Those still in
    /// motion afterwards wait in `resumed` until this poll's tick is done.
    fn wake_due_sleepers(&mut self, now: Instant) {
        let mut i = 0;
        while i < self.sleepers.len() {
            if self.sleepers[i].wake_at > now {
                i += 1;
                continue;
            }
            let Some(entry) = self.sleepers[i].entry.upgrade() else {
                self.sleepers.swap_remove(i);
                continue;
            };
            let Ok(mut animatable) = entry.try_borrow_mut() else {
                i += 1;
                continue;
            };
            let slept = now
                .saturating_duration_since(self.sleepers[i].since)
                .as_secs_f32();
            if animatable.animate(slept) {
                let sleeper = self.sleepers.swap_remove(i);
                self.resumed.push(sleeper.entry);
                continue;
            }
            match animatable.next_wake().filter(|s| s.is_finite()) {
                Some(secs) => {
                    let sleeper = &mut self.sleepers[i];
                    sleeper.wake_at = now + wake_delay(secs);
                    sleeper.since = now;
                    i += 1;
                }
                None => {
                    self.sleepers.swap_remove(i);
                }
            }
        }
        if !self.resumed.is_empty() {
            tracing::trace!(resumed = self.resumed.len(), "sleepers resumed");
            self.activate();
        }
    }

    /// Drive the scheduler at `now`.
    pub fn poll(&mut self, now: Instant) -> PollOutcome {
        if !self.running {
            return PollOutcome::Idle;
        }
        if self.wake.take() {
            self.activate();
        }
        if self.wake_deadline.is_some_and(|d| d <= now) {
            self.wake_deadline = None;
            self.activate();
        }
        self.wake_due_sleepers(now);

        if self.state == SchedulerState::Idle {
            return match self.next_deadline() {
                Some(at) => PollOutcome::Wait(at),
                None => PollOutcome::Idle,
            };
        }

        if self.pending_activation {
            // First tick of an episode runs immediately as one frame.
            self.pending_activation = false;
            self.last_tick = Some(now.checked_sub(self.refresh).unwrap_or(now));
            self.next_tick = Some(now);
        }
        if let Some(next) = self.next_tick.filter(|&next| now < next) {
            self.entries.append(&mut self.resumed);
            return PollOutcome::Wait(next);
        }

        let dt = match self.last_tick {
            Some(last) => now.saturating_duration_since(last).as_secs_f32(),
            None => self.refresh.as_secs_f32(),
        }
        .min(self.max_frame_dt);

        let active = self.tick(dt, now) + self.resumed.len();
        self.entries.append(&mut self.resumed);
        self.tick_count += 1;
        self.last_tick = Some(now);
        self.next_tick = Some(now + self.refresh);
        tracing::trace!(dt, active, tick = self.tick_count, "scheduler tick");

        if active == 0 {
            self.go_idle();
        }
        PollOutcome::Ticked { dt, active }
    }

    fn tick(&mut self, dt: f32, now: Instant) -> usize {
        let mut sleepers = Vec::new();
        self.entries.retain(|weak| {
            let Some(entry) = weak.upgrade() else {
                return false;
            };
            // Entry borrowed elsewhere this frame: try again next tick.
            let Ok(mut entry) = entry.try_borrow_mut() else {
                return true;
            };
            if entry.animate(dt) {
                return true;
            }
            if let Some(secs) = entry.next_wake().filter(|s| s.is_finite()) {
                sleepers.push(Sleeper {
                    wake_at: now + wake_delay(secs),
                    since: now,
                    entry: weak.clone(),
                });
            }
            false
        });
        self.sleepers.append(&mut sleepers);
        self.entries.len()
    }
}
