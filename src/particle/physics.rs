//! # Physics Module for Particle Propagation
//!
//! Motion between collisions: free flight along the axis, an optional
//! harmonic (or inverted-harmonic) radial potential of signed frequency ω,
//! and the piecewise gating that switches the trap off outside an axial
//! interval. Also home to the free-path law that decides how far a particle
//! flies before its next collision.
//!
//! The radial potential is `U(r) = ω²·r²` per unit mass, so the effective
//! angular frequency of the transverse motion is `Ω = √2·ω` and the
//! conserved quantity per transverse axis is `v² + 2ω²x²` (confining) or
//! `v² − 2ω²x²` (inverted). The two branches are genuinely different
//! closed forms, not limits of one another.

use crate::KB;
use crate::particle::Particle;
use rand::Rng;
use std::f64::consts::{PI, SQRT_2};

/// Speeds below this leave the propagator a no-op.
pub const MIN_SPEED: f64 = 1e-6;

/// Cap on sampled free paths (m); bounds excursions through near-vacuum.
pub const MAX_FREE_PATH: f64 = 1000.0;

impl Particle {
    /// Propagates for time `time` under a fixed trap frequency `omega`.
    ///
    /// Axial motion is always free flight. The transverse components follow
    /// the harmonic closed form for `omega > 0`, its hyperbolic analogue
    /// for `omega < 0`, and a straight line for `omega = 0`.
    pub fn advance(&mut self, time: f64, omega: f64) {
        self.position.z += self.velocity.z * time;

        if omega == 0.0 {
            self.position.x += self.velocity.x * time;
            self.position.y += self.velocity.y * time;
            return;
        }

        let rate = SQRT_2 * omega.abs();
        let phase = rate * time;
        if omega > 0.0 {
            let (sin, cos) = phase.sin_cos();
            let x = self.position.x;
            let y = self.position.y;
            self.position.x = x * cos + self.velocity.x * sin / rate;
            self.position.y = y * cos + self.velocity.y * sin / rate;
            self.velocity.x = self.velocity.x * cos - rate * x * sin;
            self.velocity.y = self.velocity.y * cos - rate * y * sin;
        } else {
            let sinh = phase.sinh();
            let cosh = phase.cosh();
            let x = self.position.x;
            let y = self.position.y;
            self.position.x = x * cosh + self.velocity.x * sinh / rate;
            self.position.y = y * cosh + self.velocity.y * sinh / rate;
            self.velocity.x = self.velocity.x * cosh + rate * x * sinh;
            self.velocity.y = self.velocity.y * cosh + rate * y * sinh;
        }
    }

    /// Propagates a free-path distance `distance` with the trap gated to
    /// the axial interval `[trap_zmin, trap_zmax]`.
    ///
    /// The distance is converted to a flight time with the current speed
    /// and integrated piecewise so the trap is active exactly while
    /// `trap_zmin ≤ z ≤ trap_zmax`. At each axial threshold crossing the
    /// step is split: the segment up to the threshold runs with that
    /// segment's trap state, `z` is snapped exactly onto the threshold, the
    /// consumed Euclidean distance is subtracted, and the remainder
    /// continues with the new state. Exactly on a threshold the direction
    /// of travel decides the segment state, so a particle leaving the
    /// interval is not re-trapped by the snap.
    ///
    /// Speeds below [`MIN_SPEED`] leave the particle untouched.
    pub fn propagate(&mut self, distance: f64, omega: f64, trap_zmin: f64, trap_zmax: f64) {
        let mut remaining = distance;
        loop {
            let speed = self.speed();
            if speed < MIN_SPEED || remaining <= 0.0 {
                return;
            }
            let time = remaining / speed;

            let z = self.position.z;
            let vz = self.velocity.z;
            let (inside, threshold) = if vz > 0.0 {
                if z < trap_zmin {
                    (false, Some(trap_zmin))
                } else if z < trap_zmax {
                    (true, Some(trap_zmax))
                } else {
                    (false, None)
                }
            } else if vz < 0.0 {
                if z > trap_zmax {
                    (false, Some(trap_zmax))
                } else if z > trap_zmin {
                    (true, Some(trap_zmin))
                } else {
                    (false, None)
                }
            } else {
                (z >= trap_zmin && z <= trap_zmax, None)
            };
            let segment_omega = if inside { omega } else { 0.0 };

            match threshold {
                Some(edge) => {
                    let crossing_time = (edge - z) / vz;
                    if crossing_time < time {
                        self.advance(crossing_time, segment_omega);
                        // Snap exactly onto the threshold so the next
                        // segment classifies unambiguously.
                        self.position.z = edge;
                        remaining -= speed * crossing_time;
                        continue;
                    }
                    self.advance(time, segment_omega);
                    return;
                }
                None => {
                    self.advance(time, segment_omega);
                    return;
                }
            }
        }
    }

    /// Local mean free path for this particle.
    ///
    /// `λ = |v| / (ρ·σ·√(8·kB·T/(π·m) + v_rel²))` with `ρ` the gas number
    /// density, `σ` the collision cross section, `m` the gas-atom mass and
    /// `v_rel` the particle speed relative to the bulk flow. Infinite in
    /// vacuum; the sampled path is capped separately.
    pub fn mean_free_path(
        &self,
        temperature: f64,
        density: f64,
        v_rel: f64,
        gas_mass: f64,
        cross_section: f64,
    ) -> f64 {
        let thermal_squared = 8.0 * KB * temperature / (PI * gas_mass);
        self.speed() / (density * cross_section * (thermal_squared + v_rel * v_rel).sqrt())
    }
}

/// Samples an exponentially distributed free path with mean `lambda`,
/// capped at [`MAX_FREE_PATH`].
pub fn sample_free_path<R: Rng + ?Sized>(rng: &mut R, lambda: f64) -> f64 {
    (-rng.random::<f64>().ln() * lambda).min(MAX_FREE_PATH)
}
