//! # Particle Module - Test Particles and Their Sources
//!
//! This module defines the `Particle` struct tracked by the trajectory
//! engine: a heavy test molecule with 3-D Cartesian position and velocity.
//! The axial coordinate is `z`; everything about the background is
//! axisymmetric around that axis.
//!
//! ## Submodules
//!
//! - [`physics`]: ballistic and harmonic propagation between collisions,
//!   axial trap gating, and the free-path law
//! - [`tests`]: unit tests for propagation invariants
//!
//! ## Particle sources
//!
//! Trajectory starting points come from a [`ParticleSource`] — a capability
//! object producing `(position, velocity)` samples from a worker's RNG. The
//! default [`ThermalPointSource`] launches every particle from a fixed
//! point with an isotropic Maxwell–Boltzmann spread around a drift
//! velocity; a source temperature of zero collapses the spread so all
//! particles start identically.

use crate::KB;
use crate::vector::Vec3;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use std::fmt::Display;

// Propagation between collisions and the free-path law
pub mod physics;

/// A heavy test molecule drifting through the buffer gas.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct Particle {
    /// Cartesian position (m)
    pub position: Vec3,
    /// Cartesian velocity (m/s)
    pub velocity: Vec3,
}

impl Particle {
    /// Creates a particle from Cartesian position and velocity.
    pub fn new(position: Vec3, velocity: Vec3) -> Self {
        Particle { position, velocity }
    }

    /// Particle speed, |v|.
    pub fn speed(&self) -> f64 {
        self.velocity.norm()
    }
}

impl Display for Particle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Particle {{ pos: ({:.4e}, {:.4e}, {:.4e}), vel: ({:.3}, {:.3}, {:.3}), |v|: {:.3}, r: {:.4e} }}",
            self.position.x,
            self.position.y,
            self.position.z,
            self.velocity.x,
            self.velocity.y,
            self.velocity.z,
            self.speed(),
            self.position.radius_xy()
        )
    }
}

impl Default for Particle {
    /// A particle at the origin, at rest.
    fn default() -> Self {
        Particle {
            position: Vec3::zero(),
            velocity: Vec3::zero(),
        }
    }
}

/// Capability producing trajectory starting points.
///
/// Workers hold a shared reference and draw from their own RNG stream, so
/// implementations must not carry mutable state.
pub trait ParticleSource: Sync {
    /// Draws one `(position, velocity)` starting point.
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Particle;
}

/// Point source with an isotropic thermal velocity spread.
///
/// Particles start at `(r, 0, z)` with velocity
/// `(vr + G, G, vz + G)` where each `G` is an independent draw from
/// `N(0, √(kB·T/M))`. `T = 0` gives every particle exactly the drift
/// velocity.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct ThermalPointSource {
    position: Vec3,
    drift: Vec3,
    spread: f64,
}

impl ThermalPointSource {
    /// Builds a source at axial position `z`, radial offset `r`, drifting
    /// at `(vr, 0, vz)` with thermal spread for a particle of mass
    /// `particle_mass` at temperature `temperature`.
    pub fn new(z: f64, r: f64, vz: f64, vr: f64, temperature: f64, particle_mass: f64) -> Self {
        ThermalPointSource {
            position: Vec3::new(r, 0.0, z),
            drift: Vec3::new(vr, 0.0, vz),
            spread: (KB * temperature / particle_mass).sqrt(),
        }
    }

    /// Standard deviation of each velocity component.
    pub fn spread(&self) -> f64 {
        self.spread
    }
}

impl ParticleSource for ThermalPointSource {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Particle {
        let velocity = if self.spread > 0.0 {
            let normal = Normal::new(0.0, self.spread).unwrap();
            Vec3::new(
                self.drift.x + normal.sample(rng),
                self.drift.y + normal.sample(rng),
                self.drift.z + normal.sample(rng),
            )
        } else {
            self.drift
        };
        Particle::new(self.position, velocity)
    }
}
