//! Precomputed Gaussian-proposal parameters for the rejection samplers.
//!
//! Rejection sampling needs a proposal that hugs the target density; a poor
//! proposal wastes most draws. The target depends on the local temperature
//! and on the particle's speed relative to the bulk flow, so a small 2-D
//! table over (T, U) is generated once per run: each cell starts from an
//! analytic first guess, draws a pilot batch through the same rejection
//! samplers with a generous bound, and stores the pilot moments as the
//! proposal parameters used during tracing.

use crate::KB;
use crate::field::FlowField;
use crate::stats::ScalarMoments;
use rand::Rng;
use std::f64::consts::PI;

/// Samples per table axis.
const AXIS_SAMPLES: usize = 21;

/// Pilot draws per cell during generation.
const GENERATION_SAMPLES: usize = 100;

/// Rejection bound M used with the analytic first-guess proposals.
const GENERATION_BOUND: f64 = 20.0;

/// Gaussian proposal parameters for one (T, U) cell.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct ProposalCell {
    /// Mean of the speed proposal (m/s).
    pub speed_mean: f64,
    /// Scale of the speed proposal before runtime widening (m/s).
    pub speed_sigma: f64,
    /// Scale of the angle proposal before runtime widening (rad).
    pub angle_sigma: f64,
}

/// 2-D lookup table of proposal parameters over (T, U).
///
/// Lookups round to the nearest cell and clamp at the table extents, so
/// out-of-range temperatures or relative speeds silently reuse the edge
/// cells.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ProposalTable {
    t_min: f64,
    t_step: f64,
    u_min: f64,
    u_step: f64,
    cells: Vec<ProposalCell>,
}

impl ProposalTable {
    /// Generates a table covering the given temperature range and relative
    /// speeds up to `u_max`.
    ///
    /// For each cell the analytic first guess is
    /// `σ_v = 1.5·√(8·kB·(T + 0.2)/(π·m))`, `σ_θ = 1.5·π·σ_v/(σ_v + U)`,
    /// `μ_v = U + σ_v`; a pilot batch of `GENERATION_SAMPLES` draws runs
    /// through the rejection samplers with bound `GENERATION_BOUND`, and
    /// the cell stores the batch's speed mean, speed deviation and angle
    /// deviation.
    pub fn build<R: Rng + ?Sized>(
        temperature_range: (f64, f64),
        u_max: f64,
        gas_mass: f64,
        rng: &mut R,
    ) -> Self {
        let (t_min, t_max) = temperature_range;
        let t_step = (t_max - t_min) / (AXIS_SAMPLES - 1) as f64;
        let u_min = 0.0;
        let u_step = (u_max - u_min) / (AXIS_SAMPLES - 1) as f64;

        let mut cells = Vec::with_capacity(AXIS_SAMPLES * AXIS_SAMPLES);
        for t_index in 0..AXIS_SAMPLES {
            let t = t_min + t_step * t_index as f64;
            for u_index in 0..AXIS_SAMPLES {
                let u = u_min + u_step * u_index as f64;
                cells.push(generate_cell(t, u, gas_mass, rng));
            }
        }

        ProposalTable {
            t_min,
            t_step,
            u_min,
            u_step,
            cells,
        }
    }

    /// Convenience constructor taking the axes from a flow field.
    ///
    /// The temperature axis spans the observed sample temperatures; the
    /// relative-speed axis reaches 1.5× the largest bulk-flow speed,
    /// floored by the gas mean thermal speed at the hottest sample so a
    /// flow at rest still produces a usable axis.
    pub fn for_field<R: Rng + ?Sized>(field: &FlowField, gas_mass: f64, rng: &mut R) -> Self {
        let (t_min, t_max) = field.temperature_range();
        let thermal_floor = (8.0 * KB * t_max / (PI * gas_mass)).sqrt();
        let u_max = (1.5 * field.max_bulk_speed()).max(thermal_floor);
        Self::build((t_min, t_max), u_max, gas_mass, rng)
    }

    /// Nearest cell for `(t, u)`, clamped at the extents.
    pub fn lookup(&self, t: f64, u: f64) -> ProposalCell {
        let t_index = nearest_index(t, self.t_min, self.t_step);
        let u_index = nearest_index(u, self.u_min, self.u_step);
        self.cells[t_index * AXIS_SAMPLES + u_index]
    }
}

/// Rounded, clamped axis index; degenerate axes (zero step) collapse to 0.
fn nearest_index(value: f64, min: f64, step: f64) -> usize {
    if step <= 0.0 {
        return 0;
    }
    ((value - min) / step)
        .round()
        .clamp(0.0, (AXIS_SAMPLES - 1) as f64) as usize
}

/// Pilot-samples one (T, U) cell.
fn generate_cell<R: Rng + ?Sized>(t: f64, u: f64, gas_mass: f64, rng: &mut R) -> ProposalCell {
    let sigma_speed = 1.5 * (8.0 * KB * (t + 0.2) / (PI * gas_mass)).sqrt();
    let sigma_angle = 1.5 * PI * sigma_speed / (sigma_speed + u);
    let mean_speed = u + sigma_speed;

    let mut speed_moments = ScalarMoments::new();
    let mut angle_moments = ScalarMoments::new();
    for _ in 0..GENERATION_SAMPLES {
        let speed = super::sample_gas_speed(
            u,
            t,
            gas_mass,
            mean_speed,
            sigma_speed,
            GENERATION_BOUND,
            rng,
        );
        let exponent = gas_mass * u * speed / (KB * t);
        let bessel = super::bessel_i0(exponent.min(10.0));
        let angle = super::sample_angle(exponent, bessel, sigma_angle, GENERATION_BOUND, rng);
        speed_moments.observe(speed);
        angle_moments.observe(angle);
    }

    ProposalCell {
        speed_mean: speed_moments.mean(),
        speed_sigma: speed_moments.variance().sqrt(),
        angle_sigma: angle_moments.variance().sqrt(),
    }
}
