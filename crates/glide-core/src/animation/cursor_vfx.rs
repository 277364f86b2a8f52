#![forbid(unsafe_code)]

//! Cursor visual effects played when the cursor jumps.
//!
//! The effect is a closed set: [`CursorVfx`] is chosen once from a
//! [`VfxMode`] and each variant has exactly one update function. Ring
//! effects animate a single expanding shape; particle trails emit into a
//! pool that is allocated up front, so [`CursorVfx::update`] never
//! allocates.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::easing::ease_out_cubic;
use crate::config::CursorConfig;
use crate::geometry::{Point, Size};

/// Upper bound on live particles per trail.
pub const MAX_PARTICLES: usize = 256;

/// Fixed seed so trails replay identically in tests and traces.
const PARTICLE_SEED: u64 = 0x6c69_6465;

/// Ring radius at the end of a sonicboom/ripple, in cell heights.
const RING_MAX_RADIUS_CELLS: f32 = 2.5;

/// Angular speed of railgun particles (radians per second).
const RAILGUN_ROTATION: f32 = 12.0;

/// Effect selected by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VfxMode {
    #[default]
    Disabled,
    Highlight,
    Sonicboom,
    Ripple,
    Wireframe,
    Railgun,
    Torpedo,
    PixieDust,
}

/// Shape family of a ring effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingKind {
    /// Filled disc that shrinks and fades.
    Highlight,
    /// Filled disc that expands and fades.
    Sonicboom,
    /// Outline that expands and fades.
    Ripple,
    /// Cursor-sized outline that grows and fades.
    Wireframe,
}

/// Motion family of a particle trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrailKind {
    /// Particles spin around the travel path.
    Railgun,
    /// Particles shoot backward along the travel path.
    Torpedo,
    /// Particles drift down with random sideways jitter.
    PixieDust,
}

/// What the renderer should draw for a ring this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingFrame {
    pub center: Point,
    pub radius: f32,
    pub opacity: f32,
    /// Stroke only (ripple/wireframe) rather than a filled disc.
    pub outline: bool,
}

/// A single particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Point,
    pub velocity: Point,
    /// Remaining life in seconds.
    pub lifetime: f32,
}

/// Expanding ring effect.
#[derive(Debug, Clone, PartialEq)]
pub struct RingEffect {
    kind: RingKind,
    center: Point,
    cell: Size,
    progress: f32,
    lifetime: f32,
    opacity: f32,
}

impl RingEffect {
    fn new(kind: RingKind, config: &CursorConfig) -> Self {
        Self {
            kind,
            center: Point::ZERO,
            cell: Size::default(),
            progress: 1.0,
            lifetime: config.vfx_particle_lifetime,
            opacity: config.vfx_opacity,
        }
    }

    /// Ring family.
    #[must_use]
    pub fn kind(&self) -> RingKind {
        self.kind
    }

    fn restart(&mut self, at: Point, cell: Size) {
        self.center = at;
        self.cell = cell;
        self.progress = 0.0;
    }

    fn cancel(&mut self) {
        self.progress = 1.0;
    }

    fn update(&mut self, dt: f32) -> bool {
        if self.progress >= 1.0 {
            return false;
        }
        self.progress = (self.progress + dt / self.lifetime.max(f32::EPSILON)).min(1.0);
        self.progress < 1.0
    }

    /// Geometry for the current frame, `None` once finished.
    #[must_use]
    pub fn frame(&self) -> Option<RingFrame> {
        if self.progress >= 1.0 {
            return None;
        }
        let eased = ease_out_cubic(self.progress);
        let fade = (1.0 - self.progress) * self.opacity;
        let max_radius = self.cell.height * RING_MAX_RADIUS_CELLS;
        let (radius, outline) = match self.kind {
            RingKind::Highlight => (self.cell.height * (1.0 - eased), false),
            RingKind::Sonicboom => (max_radius * eased, false),
            RingKind::Ripple => (max_radius * eased, true),
            RingKind::Wireframe => (self.cell.height * (0.5 + eased), true),
        };
        Some(RingFrame {
            center: self.center,
            radius,
            opacity: fade,
            outline,
        })
    }
}

/// Particle trail effect backed by a fixed-capacity pool.
#[derive(Debug, Clone)]
pub struct ParticleTrail {
    kind: TrailKind,
    particles: Vec<Particle>,
    rng: SmallRng,
    /// Last emitted-to position while following a jump; `None` otherwise.
    previous: Option<Point>,
    cell: Size,
    elapsed: f32,
    lifetime: f32,
    density: f32,
    speed: f32,
}

impl ParticleTrail {
    fn new(kind: TrailKind, config: &CursorConfig) -> Self {
        Self {
            kind,
            particles: Vec::with_capacity(MAX_PARTICLES),
            rng: SmallRng::seed_from_u64(PARTICLE_SEED),
            previous: None,
            cell: Size::default(),
            elapsed: 0.0,
            lifetime: config.vfx_particle_lifetime,
            density: config.vfx_particle_density,
            speed: config.vfx_particle_speed,
        }
    }

    /// Trail family.
    #[must_use]
    pub fn kind(&self) -> TrailKind {
        self.kind
    }

    /// Live particles.
    #[must_use]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Opacity of a particle given its remaining life.
    #[must_use]
    pub fn particle_opacity(&self, particle: &Particle) -> f32 {
        (particle.lifetime / self.lifetime.max(f32::EPSILON)).clamp(0.0, 1.0)
    }

    fn emit(&mut self, from: Point, to: Point, cell: Size) {
        self.cell = cell;
        let travel = to - from;
        let cells_travelled = travel.length() / cell.width.max(1.0);
        let wanted = (cells_travelled * self.density).round() as usize;
        let free = MAX_PARTICLES - self.particles.len();
        let count = wanted.min(free);
        let direction = travel.normalize_or_zero();
        let speed = self.speed * cell.width.max(1.0);

        for i in 0..count {
            let t = (i as f32 + 0.5) / count as f32;
            let position = from + travel * t;
            let velocity = match self.kind {
                TrailKind::Railgun => {
                    let phase = t * std::f32::consts::TAU;
                    let (sin, cos) = phase.sin_cos();
                    (direction * cos + direction.perpendicular() * sin) * (speed * 0.25)
                }
                TrailKind::Torpedo => {
                    let jitter = self.rng.random::<f32>() - 0.5;
                    (direction * -1.0 + direction.perpendicular() * jitter) * speed
                }
                TrailKind::PixieDust => {
                    let sideways = (self.rng.random::<f32>() - 0.5) * speed;
                    let down = self.rng.random::<f32>() * speed * 0.5;
                    Point::new(sideways, down)
                }
            };
            // Stagger so the trail fades from tail to head.
            let lifetime = self.lifetime * (0.5 + 0.5 * t);
            self.particles.push(Particle {
                position,
                velocity,
                lifetime,
            });
        }
    }

    fn update(&mut self, dt: f32, cursor: Point) -> bool {
        self.elapsed += dt;
        if let Some(previous) = self.previous {
            if previous != cursor {
                self.emit(previous, cursor, self.cell);
            }
            self.previous = Some(cursor);
        }

        let kind = self.kind;
        let mut i = 0;
        while i < self.particles.len() {
            let particle = &mut self.particles[i];
            particle.lifetime -= dt;
            if particle.lifetime <= 0.0 {
                self.particles.swap_remove(i);
                continue;
            }
            particle.velocity = match kind {
                TrailKind::Railgun => {
                    let (sin, cos) = (RAILGUN_ROTATION * dt).sin_cos();
                    let v = particle.velocity;
                    Point::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
                }
                TrailKind::Torpedo => particle.velocity * (1.0 - dt * 2.0).max(0.0),
                TrailKind::PixieDust => particle.velocity,
            };
            particle.position += particle.velocity * dt;
            i += 1;
        }
        !self.particles.is_empty()
    }
}

/// The active cursor effect.
#[derive(Debug, Clone)]
pub enum CursorVfx {
    Disabled,
    Ring(RingEffect),
    Trail(ParticleTrail),
}

impl CursorVfx {
    /// Build the effect for `config.vfx`.
    #[must_use]
    pub fn from_config(config: &CursorConfig) -> Self {
        match config.vfx {
            VfxMode::Disabled => Self::Disabled,
            VfxMode::Highlight => Self::Ring(RingEffect::new(RingKind::Highlight, config)),
            VfxMode::Sonicboom => Self::Ring(RingEffect::new(RingKind::Sonicboom, config)),
            VfxMode::Ripple => Self::Ring(RingEffect::new(RingKind::Ripple, config)),
            VfxMode::Wireframe => Self::Ring(RingEffect::new(RingKind::Wireframe, config)),
            VfxMode::Railgun => Self::Trail(ParticleTrail::new(TrailKind::Railgun, config)),
            VfxMode::Torpedo => Self::Trail(ParticleTrail::new(TrailKind::Torpedo, config)),
            VfxMode::PixieDust => Self::Trail(ParticleTrail::new(TrailKind::PixieDust, config)),
        }
    }

    /// Start the effect for a cursor jump from `from` to `to`.
    pub fn on_jump(&mut self, from: Point, to: Point, cell: Size) {
        match self {
            Self::Disabled => {}
            Self::Ring(ring) => ring.restart(to, cell),
            Self::Trail(trail) => {
                trail.cell = cell;
                trail.previous = Some(from);
            }
        }
    }

    /// The cursor teleported. Nothing in flight may bridge the old and new
    /// positions, so the effect ends here.
    pub fn on_snap(&mut self) {
        match self {
            Self::Disabled => {}
            Self::Ring(ring) => ring.cancel(),
            Self::Trail(trail) => {
                trail.previous = None;
                trail.particles.clear();
            }
        }
    }

    /// The cursor came to rest. Trails stop emitting; live particles fade
    /// out on their own.
    pub fn on_settle(&mut self) {
        if let Self::Trail(trail) = self {
            trail.previous = None;
        }
    }

    /// Advance by `dt` with the cursor's rendered center at `cursor`.
    /// Returns whether anything is still visible.
    pub fn update(&mut self, dt: f32, cursor: Point) -> bool {
        match self {
            Self::Disabled => false,
            Self::Ring(ring) => ring.update(dt),
            Self::Trail(trail) => trail.update(dt, cursor),
        }
    }
}
