//! # Collision Module - Buffer-Gas Scattering
//!
//! Samples the velocity of the buffer-gas atom a test particle collides
//! with, conditional on the particle's velocity and the local gas state,
//! and applies the elastic hard-sphere post-collision update.
//!
//! ## Sampling scheme
//!
//! The gas-atom speed relative to the particle follows the non-Gaussian
//! density
//!
//! ```text
//! f(v) = (m / kB·T) · exp(−m(u² + v²)/(2·kB·T)) · v · I₀(m·u·v/(kB·T))
//! ```
//!
//! with `u` the particle speed relative to the bulk flow and `I₀` the
//! modified Bessel function of the first kind (argument clamped at 10 for
//! numerical safety). The approach angle between the sampled atom velocity
//! and the drift direction then follows `exp(b·cosθ)/(π·I₀(b))`. Both are
//! drawn by rejection against Gaussian proposals whose parameters come from
//! the precomputed [`proposal::ProposalTable`]; the widened scales
//! (1.5·σ_v, 3·σ_θ) are part of the contract with the table. A rejection
//! loop that fails to accept within `50·M` attempts logs a warning and
//! falls back to the proposal mean, trading a bounded bias for guaranteed
//! forward progress.
//!
//! Below [`COLD_TEMPERATURE`] the thermal spread is negligible and the
//! sampler short-circuits to the deterministic cold limit `(u, 0)`.

use crate::KB;
use crate::vector::Vec3;
use log::warn;
use rand::Rng;
use rand_distr::{Distribution, Normal, UnitSphere};
use std::f64::consts::{PI, TAU};

pub mod proposal;

use proposal::ProposalTable;

/// Temperatures below this are treated as the deterministic cold limit.
pub const COLD_TEMPERATURE: f64 = 1e-2;

/// Clamp for the Bessel-function argument.
const BESSEL_ARG_MAX: f64 = 10.0;

/// Rejection bound M used when sampling through the proposal table.
const RUNTIME_BOUND: f64 = 2.0;

/// Widening factor applied to the tabulated speed proposal scale.
const SPEED_WIDEN: f64 = 1.5;

/// Widening factor applied to the tabulated angle proposal scale.
const ANGLE_WIDEN: f64 = 3.0;

/// Relative speeds below this get a random scattering frame instead of the
/// drift-aligned one.
const DRIFT_FLOOR: f64 = 1e-3;

/// Modified Bessel function of the first kind, order zero.
///
/// Power series `Σ (x²/4)ᵏ / (k!)²`; callers clamp the argument at
/// `BESSEL_ARG_MAX`, where the series converges in a few dozen terms.
pub fn bessel_i0(x: f64) -> f64 {
    let quarter_square = 0.25 * x * x;
    let mut term = 1.0;
    let mut sum = 1.0;
    for k in 1..=40 {
        term *= quarter_square / ((k * k) as f64);
        sum += term;
        if term < sum * 1e-16 {
            break;
        }
    }
    sum
}

/// Gaussian probability density at `x`.
fn normal_pdf(x: f64, mean: f64, sigma: f64) -> f64 {
    let standardized = (x - mean) / sigma;
    (-0.5 * standardized * standardized).exp() / (sigma * (TAU).sqrt())
}

/// Rejection-samples the gas-atom speed for relative speed `u` at
/// temperature `t`.
///
/// Proposal is `|N(mean, sigma)|`; `bound` is the rejection constant M and
/// also fixes the attempt budget `50·M`. On exhaustion the proposal mean is
/// returned and a diagnostic is logged.
pub(crate) fn sample_gas_speed<R: Rng + ?Sized>(
    u: f64,
    t: f64,
    gas_mass: f64,
    mean: f64,
    sigma: f64,
    bound: f64,
    rng: &mut R,
) -> f64 {
    if sigma <= 0.0 {
        return mean;
    }
    let proposal = Normal::new(mean, sigma).unwrap();
    let scale = gas_mass / (KB * t);
    let attempts = (50.0 * bound) as usize;

    for _ in 0..attempts {
        let candidate = proposal.sample(rng).abs();
        let bessel_arg = (scale * u * candidate).min(BESSEL_ARG_MAX);
        let target = scale
            * (-0.5 * scale * (u * u + candidate * candidate)).exp()
            * candidate
            * bessel_i0(bessel_arg);
        let envelope = bound * normal_pdf(candidate, mean, sigma);
        if rng.random::<f64>() < target / envelope {
            return candidate;
        }
    }

    warn!("speed rejection exhausted after {attempts} attempts (u = {u:.3e}, T = {t:.3e}); falling back to proposal mean");
    mean
}

/// Rejection-samples the approach angle given the already-sampled speed.
///
/// `exponent` is `m·u·v_g/(kB·T)` and `bessel` the Bessel value already
/// computed for the accepted speed. Proposal is `|N(0, sigma)|`, accepted
/// only below π; the factor 2 in the envelope folds the proposal onto the
/// half line. Fallback is the proposal mean, 0.
pub(crate) fn sample_angle<R: Rng + ?Sized>(
    exponent: f64,
    bessel: f64,
    sigma: f64,
    bound: f64,
    rng: &mut R,
) -> f64 {
    if sigma <= 0.0 {
        return 0.0;
    }
    let proposal = Normal::new(0.0, sigma).unwrap();
    let attempts = (50.0 * bound) as usize;

    for _ in 0..attempts {
        let candidate = proposal.sample(rng).abs();
        if candidate >= PI {
            continue;
        }
        let target = (exponent * candidate.cos()).exp() / (PI * bessel);
        let envelope = 2.0 * bound * normal_pdf(candidate, 0.0, sigma);
        if rng.random::<f64>() < target / envelope {
            return candidate;
        }
    }

    warn!("angle rejection exhausted after {attempts} attempts; falling back to proposal mean");
    0.0
}

/// Samples collision partners and applies the hard-sphere kernel.
///
/// Holds the two masses and a reference to the shared proposal table;
/// cheap to copy into each worker.
#[derive(Debug, Clone, Copy)]
pub struct CollisionSampler<'a> {
    particle_mass: f64,
    gas_mass: f64,
    table: &'a ProposalTable,
}

impl<'a> CollisionSampler<'a> {
    /// Creates a sampler for the given masses backed by `table`.
    pub fn new(particle_mass: f64, gas_mass: f64, table: &'a ProposalTable) -> Self {
        CollisionSampler {
            particle_mass,
            gas_mass,
            table,
        }
    }

    /// Draws `(gas speed, approach angle)` for relative speed `u` at
    /// temperature `t`.
    ///
    /// Below the cold limit returns `(u, 0)` without touching the RNG.
    pub fn sample<R: Rng + ?Sized>(&self, u: f64, t: f64, rng: &mut R) -> (f64, f64) {
        if t < COLD_TEMPERATURE {
            return (u, 0.0);
        }

        let cell = self.table.lookup(t, u);
        let speed = sample_gas_speed(
            u,
            t,
            self.gas_mass,
            cell.speed_mean,
            SPEED_WIDEN * cell.speed_sigma,
            RUNTIME_BOUND,
            rng,
        );

        let exponent = self.gas_mass * u * speed / (KB * t);
        let bessel = bessel_i0(exponent.min(BESSEL_ARG_MAX));
        let angle = sample_angle(
            exponent,
            bessel,
            ANGLE_WIDEN * cell.angle_sigma,
            RUNTIME_BOUND,
            rng,
        );

        (speed, angle)
    }

    /// Elastic hard-sphere update of the particle velocity.
    ///
    /// Reconstructs the colliding atom's velocity from the sampled
    /// `(speed, angle)` pair around the bulk-drift direction, then applies
    /// the elastic update against it.
    pub fn scatter<R: Rng + ?Sized>(
        &self,
        velocity: &Vec3,
        gas_bulk: &Vec3,
        speed: f64,
        angle: f64,
        rng: &mut R,
    ) -> Vec3 {
        let gas_atom = self.atom_velocity(velocity, gas_bulk, speed, angle, rng);
        self.elastic_update(velocity, &gas_atom, rng)
    }

    /// Reconstructs the colliding atom's lab-frame velocity.
    ///
    /// The scattering frame is `d̂` along `v_bulk − v` (random when the
    /// drift is below `DRIFT_FLOOR`) and `p̂` a random unit vector
    /// orthonormalized against `d̂`; the atom moves at
    /// `v + speed·(cosθ·d̂ + sinθ·p̂)`.
    pub fn atom_velocity<R: Rng + ?Sized>(
        &self,
        velocity: &Vec3,
        gas_bulk: &Vec3,
        speed: f64,
        angle: f64,
        rng: &mut R,
    ) -> Vec3 {
        let drift = gas_bulk - velocity;
        let direction = if drift.norm() < DRIFT_FLOOR {
            random_unit_vector(rng)
        } else {
            drift.normalize()
        };
        let perpendicular = random_perpendicular(&direction, rng);

        velocity + &(speed * (angle.cos() * direction + angle.sin() * perpendicular))
    }

    /// Elastic hard-sphere collision against a gas atom at `gas_atom`.
    ///
    /// Draws an isotropic relative direction
    /// `(cos χ, sin χ cos ε, sin χ sin ε)` with `cos χ ~ U(−1, 1)`,
    /// `ε ~ U(0, 2π)` and mixes the momenta: the relative speed and the
    /// total momentum are preserved exactly, so total kinetic energy is
    /// conserved.
    pub fn elastic_update<R: Rng + ?Sized>(
        &self,
        velocity: &Vec3,
        gas_atom: &Vec3,
        rng: &mut R,
    ) -> Vec3 {
        let relative_speed = (velocity - gas_atom).norm();
        let cos_chi: f64 = rng.random_range(-1.0..1.0);
        let sin_chi = (1.0 - cos_chi * cos_chi).sqrt();
        let azimuth = rng.random_range(0.0..TAU);
        let scattered = Vec3::new(cos_chi, sin_chi * azimuth.cos(), sin_chi * azimuth.sin());

        (self.particle_mass * velocity
            + self.gas_mass * (gas_atom + &(relative_speed * scattered)))
            / (self.particle_mass + self.gas_mass)
    }
}

/// Uniformly random unit vector.
fn random_unit_vector<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    let components: [f64; 3] = UnitSphere.sample(rng);
    Vec3::new(components[0], components[1], components[2])
}

/// Random unit vector orthogonal to `direction`.
///
/// Draws from the sphere and strips the parallel component; redraws in the
/// (measure-zero) case of near-parallel candidates.
fn random_perpendicular<R: Rng + ?Sized>(direction: &Vec3, rng: &mut R) -> Vec3 {
    loop {
        let candidate = random_unit_vector(rng);
        let perpendicular = candidate - candidate.project_onto(direction);
        if perpendicular.norm() > 1e-6 {
            return perpendicular.normalize();
        }
    }
}
