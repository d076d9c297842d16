//! Core per-particle trajectory loop.
//!

use super::{Engine, TrajectoryRecord};
use crate::field::InterpState;
use crate::particle::Particle;
use crate::particle::physics::{self, MIN_SPEED};
use rand::Rng;
use rand::rngs::StdRng;

impl Engine<'_> {
    /// Traces one particle from its starting point to a wall hit or exit.
    ///
    /// The loop per iteration: refresh the gas-state cache, sample a free
    /// path from the local state, propagate it under the gated trap, test
    /// the step against the geometry; on survival advance the clock,
    /// record the collision into the bin statistics, move, scatter off a
    /// sampled gas atom, and roll the spin-flip channel.
    ///
    /// Starting particles slower than [`MIN_SPEED`] get one collision
    /// injected immediately so a free path is well-defined; that bootstrap
    /// neither counts as a collision nor rolls the spin flip. The initial
    /// trap orientation is randomized with probability 1/2.
    pub fn trace(
        &self,
        start: Particle,
        mut grid: Option<&mut crate::stats::grid::BinGrid>,
        rng: &mut StdRng,
    ) -> TrajectoryRecord {
        let params = &self.params;
        let mut particle = start;
        let mut interp = InterpState::new();
        let mut refreshes = u64::from(self.field.refresh(&mut interp, &particle.position));

        // A particle starting at rest has no free path; thermalize it with
        // one bootstrap collision against the local gas.
        if particle.speed() < MIN_SPEED {
            let u = (particle.velocity - interp.gas_velocity).norm();
            let (speed, angle) = self.sampler.sample(u, interp.temperature, rng);
            particle.velocity =
                self.sampler
                    .scatter(&particle.velocity, &interp.gas_velocity, speed, angle, rng);
        }

        // Randomize the initial spin state.
        let mut omega = params.omega;
        if rng.random::<f64>() < 0.5 {
            omega = -omega;
        }

        let mut collisions: u32 = 0;
        let mut time = 0.0;

        loop {
            refreshes += u64::from(self.field.refresh(&mut interp, &particle.position));

            let v_rel = (particle.velocity - interp.gas_velocity).norm();
            let lambda = particle.mean_free_path(
                interp.temperature,
                interp.density,
                v_rel,
                params.gas_mass,
                params.cross_section,
            );
            let free_path = physics::sample_free_path(rng, lambda);

            let mut next = particle;
            next.propagate(free_path, omega, params.trap_zmin, params.trap_zmax);

            let boundary = self.geometry.test(&particle.position, &next.position);
            if boundary.terminates() {
                return TrajectoryRecord {
                    position: particle.position,
                    next_position: next.position,
                    velocity: next.velocity,
                    collisions,
                    time,
                    outcome: boundary,
                    refreshes,
                };
            }

            let speed = particle.speed();
            if speed > MIN_SPEED {
                time += free_path / speed;
            }
            collisions += 1;
            if let Some(grid) = grid.as_deref_mut() {
                grid.update(
                    &particle.position,
                    &particle.velocity,
                    time,
                    collisions,
                    free_path,
                );
            }

            particle = next;
            let u = (particle.velocity - interp.gas_velocity).norm();
            let (gas_speed, angle) = self.sampler.sample(u, interp.temperature, rng);
            particle.velocity =
                self.sampler
                    .scatter(&particle.velocity, &interp.gas_velocity, gas_speed, angle, rng);

            if rng.random::<f64>() < params.p_flip {
                omega = -omega;
            }
        }
    }
}
