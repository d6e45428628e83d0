//! Celebratory particle bursts for completed tasks.
//!
//! # Responsibility
//! - Spawn a fixed-size burst of randomized particles at a pointer position.
//! - Track live particles and drop them once their animation has finished.
//!
//! # Invariants
//! - Effects are cosmetic: nothing in the task store reads this state, and a
//!   disabled layer changes no task outcome.
//! - Every particle starts at the origin with full opacity and scale and ends
//!   at its displaced position with zero opacity and scale.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Particles spawned per completion.
pub const BURST_SIZE: usize = 30;

/// Particle colors, picked uniformly.
pub const PALETTE: &[&str] = &["#ff6b6b", "#feca57", "#48dbfb", "#ff9ff3", "#1dd1a1"];

const DX_RANGE: std::ops::Range<f64> = -80.0..80.0;
// Negative is up; the range leans upward.
const DY_RANGE: std::ops::Range<f64> = -120.0..20.0;
const DURATION_MS_RANGE: std::ops::Range<u64> = 600..1000;

/// Pointer position in host coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One short-lived particle.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub origin: Point,
    pub color: &'static str,
    pub dx: f64,
    pub dy: f64,
    pub duration_ms: u64,
    pub started_at_ms: u64,
}

/// Interpolated particle state at one instant. Easing is left to the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleFrame {
    pub x: f64,
    pub y: f64,
    pub opacity: f64,
    pub scale: f64,
}

impl Particle {
    pub fn is_finished(&self, now_ms: u64) -> bool {
        now_ms >= self.started_at_ms.saturating_add(self.duration_ms)
    }

    /// Linear frame at `now_ms`, clamped to the animation window.
    pub fn frame_at(&self, now_ms: u64) -> ParticleFrame {
        let elapsed = now_ms.saturating_sub(self.started_at_ms) as f64;
        let progress = if self.duration_ms == 0 {
            1.0
        } else {
            (elapsed / self.duration_ms as f64).clamp(0.0, 1.0)
        };
        ParticleFrame {
            x: self.origin.x + self.dx * progress,
            y: self.origin.y + self.dy * progress,
            opacity: 1.0 - progress,
            scale: 1.0 - progress,
        }
    }
}

/// Builds one burst of `BURST_SIZE` particles.
pub fn spawn_burst(origin: Point, now_ms: u64, rng: &mut impl Rng) -> Vec<Particle> {
    (0..BURST_SIZE)
        .map(|_| Particle {
            origin,
            color: PALETTE[rng.random_range(0..PALETTE.len())],
            dx: rng.random_range(DX_RANGE),
            dy: rng.random_range(DY_RANGE),
            duration_ms: rng.random_range(DURATION_MS_RANGE),
            started_at_ms: now_ms,
        })
        .collect()
}

/// Live particles owned by the board.
pub struct EffectLayer {
    rng: StdRng,
    enabled: bool,
    particles: Vec<Particle>,
}

impl EffectLayer {
    /// Layer seeded from OS entropy.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Layer with a fixed seed, for reproducible bursts.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    /// Layer that never spawns anything.
    pub fn disabled() -> Self {
        let mut layer = Self::seeded(0);
        layer.enabled = false;
        layer
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            rng,
            enabled: true,
            particles: Vec::new(),
        }
    }

    /// Starts a burst at `origin`. Returns how many particles were spawned.
    pub fn celebrate(&mut self, origin: Point, now_ms: u64) -> usize {
        if !self.enabled {
            return 0;
        }
        let burst = spawn_burst(origin, now_ms, &mut self.rng);
        let spawned = burst.len();
        self.particles.extend(burst);
        spawned
    }

    /// Removes finished particles. Returns how many were removed.
    pub fn prune(&mut self, now_ms: u64) -> usize {
        let before = self.particles.len();
        self.particles.retain(|particle| !particle.is_finished(now_ms));
        before - self.particles.len()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }
}

impl Default for EffectLayer {
    fn default() -> Self {
        Self::new()
    }
}
