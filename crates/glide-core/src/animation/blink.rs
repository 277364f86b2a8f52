#![forbid(unsafe_code)]

//! Cursor blink: a three-phase timer with smoothed opacity.
//!
//! Phases run `WaitingBeforeBlink → Hidden → Visible → Hidden → …`, with
//! durations taken from the editor's `blinkwait` / `blinkoff` / `blinkon`
//! settings. Any timing of zero disables blinking entirely (the cursor
//! stays solid). Opacity eases toward the phase target with an exponential
//! filter instead of hard-toggling.

/// Opacity distance below which the filter snaps to its target.
const OPACITY_SNAP: f32 = 0.001;

/// Blink phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlinkPhase {
    /// Solid, waiting `blinkwait` before the first toggle.
    #[default]
    WaitingBeforeBlink,
    /// Solid for `blinkon`.
    Visible,
    /// Hidden for `blinkoff`.
    Hidden,
}

/// Millisecond timings for the blink cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlinkTimings {
    pub wait_ms: u64,
    pub on_ms: u64,
    pub off_ms: u64,
}

impl BlinkTimings {
    /// Create blink timings.
    #[must_use]
    pub const fn new(wait_ms: u64, on_ms: u64, off_ms: u64) -> Self {
        Self {
            wait_ms,
            on_ms,
            off_ms,
        }
    }

    /// Blinking happens only when every timing is non-zero.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.wait_ms > 0 && self.on_ms > 0 && self.off_ms > 0
    }

    fn phase_secs(&self, phase: BlinkPhase) -> f32 {
        let ms = match phase {
            BlinkPhase::WaitingBeforeBlink => self.wait_ms,
            BlinkPhase::Visible => self.on_ms,
            BlinkPhase::Hidden => self.off_ms,
        };
        ms as f32 / 1000.0
    }
}

/// Blink state machine plus the opacity filter.
#[derive(Debug, Clone, PartialEq)]
pub struct CursorBlink {
    timings: BlinkTimings,
    phase: BlinkPhase,
    elapsed: f32,
    opacity: f32,
    smoothing: f32,
}

impl CursorBlink {
    /// Create a blink timer. `smoothing` is the opacity filter's time
    /// constant in seconds; zero hard-toggles.
    #[must_use]
    pub fn new(timings: BlinkTimings, smoothing: f32) -> Self {
        Self {
            timings,
            phase: BlinkPhase::WaitingBeforeBlink,
            elapsed: 0.0,
            opacity: 1.0,
            smoothing: smoothing.max(0.0),
        }
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> BlinkPhase {
        self.phase
    }

    /// Current (smoothed) opacity in `[0, 1]`.
    #[must_use]
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Replace the timings (mode change) and restart the cycle. Unchanged
    /// timings leave the cycle running.
    pub fn set_timings(&mut self, timings: BlinkTimings) {
        if timings == self.timings {
            return;
        }
        self.timings = timings;
        self.reset();
    }

    /// Restart at the initial wait phase. Called on every cursor move.
    pub fn reset(&mut self) {
        self.phase = BlinkPhase::WaitingBeforeBlink;
        self.elapsed = 0.0;
    }

    /// Seconds until the next phase change, or `None` when not blinking.
    #[must_use]
    pub fn next_transition_in(&self) -> Option<f32> {
        if !self.timings.is_enabled() {
            return None;
        }
        Some((self.timings.phase_secs(self.phase) - self.elapsed).max(0.0))
    }

    fn target_opacity(&self) -> f32 {
        match self.phase {
            BlinkPhase::WaitingBeforeBlink | BlinkPhase::Visible => 1.0,
            BlinkPhase::Hidden => 0.0,
        }
    }

    /// Advance by `dt` seconds. Returns whether opacity is still fading.
    pub fn tick(&mut self, dt: f32) -> bool {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        if self.timings.is_enabled() {
            self.elapsed += dt;
            loop {
                let len = self.timings.phase_secs(self.phase);
                if self.elapsed < len {
                    break;
                }
                self.elapsed -= len;
                self.phase = match self.phase {
                    BlinkPhase::WaitingBeforeBlink | BlinkPhase::Visible => BlinkPhase::Hidden,
                    BlinkPhase::Hidden => BlinkPhase::Visible,
                };
            }
        } else {
            self.phase = BlinkPhase::WaitingBeforeBlink;
            self.elapsed = 0.0;
        }

        let target = self.target_opacity();
        if self.smoothing <= 0.0 {
            self.opacity = target;
        } else {
            let alpha = 1.0 - (-dt / self.smoothing).exp();
            self.opacity += (target - self.opacity) * alpha;
        }
        if (target - self.opacity).abs() < OPACITY_SNAP {
            self.opacity = target;
            return false;
        }
        true
    }
}
