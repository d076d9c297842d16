//! # Engine Module - Trajectory Tracing and the Parallel Driver
//!
//! The engine owns the per-particle Monte Carlo loop (interpolate the gas
//! state → sample a free path → propagate → test the walls → collide) and
//! the driver that fans N independent trajectories across worker threads.
//!
//! ## Concurrency Architecture
//!
//! Trajectories are embarrassingly parallel: every shared component
//! (flow field, geometry, proposal table, configuration) is read-only after
//! construction, and all per-trajectory state (particle, interpolation
//! cache, RNG, scratch statistics grid) is owned by exactly one worker.
//! The record array is preallocated and split into per-worker chunks with
//! `par_chunks_mut`, so output slots are written race-free and land in
//! index order without coordination.
//!
//! ## Reproducibility
//!
//! Worker `i` processes the `i`-th chunk with its own `StdRng` seeded from
//! `master seed + i`. The chunk→worker→seed mapping is positional, not
//! scheduling dependent, so a fixed seed, particle count and worker count
//! reproduce the output bitwise no matter how rayon schedules the chunks.
//!
//! ## Statistics merging
//!
//! Each worker keeps one scratch [`BinGrid`] that is reset per trajectory,
//! merged into the worker's private "all"/"exit" grids, and folded into the
//! shared mutex-guarded accumulators once per chunk. The moment merge is
//! associative and commutative (to floating-point tolerance), which makes
//! this equivalent to merging per trajectory while touching the mutex only
//! W times.
//!
//! ## Submodules
//!
//! - [`logic`]: the per-particle trajectory loop
//! - [`tests`]: unit tests for the driver and the loop

pub mod logic;
pub mod tests;

use crate::collision::CollisionSampler;
use crate::collision::proposal::ProposalTable;
use crate::field::FlowField;
use crate::geometry::{Boundary, Geometry};
use crate::particle::ParticleSource;
use crate::stats::grid::{BinGrid, GridSpec};
use crate::vector::Vec3;
use log::{debug, info};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use std::sync::Mutex;
use std::time::Instant;

/// Immutable physics and execution parameters of one run.
///
/// Built once from the resolved configuration and shared read-only across
/// workers; the global mutable state of older tracing codes (masses, cross
/// section, output handles) lives here instead.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct SimulationParams {
    /// Number of trajectories to trace.
    pub n_particles: usize,

    /// Test-particle mass M (AMU).
    pub particle_mass: f64,

    /// Buffer-gas atom mass m (AMU).
    pub gas_mass: f64,

    /// Collision cross section σ (m²).
    pub cross_section: f64,

    /// Signed trap frequency ω (s⁻¹): positive confines, negative inverts,
    /// zero disables the radial potential.
    pub omega: f64,

    /// Lower axial bound of the trap interval (m); the trap is forced off
    /// below it.
    pub trap_zmin: f64,

    /// Upper axial bound of the trap interval (m).
    pub trap_zmax: f64,

    /// Per-collision probability of flipping the sign of ω (spin-flip
    /// channel).
    pub p_flip: f64,

    /// Emit every trajectory record, not only the exits.
    pub save_all: bool,

    /// Master RNG seed; worker `i` consumes stream `seed + i`.
    pub seed: u64,

    /// Worker threads; 0 picks the machine's available parallelism.
    pub threads: usize,
}

impl SimulationParams {
    /// Reduced mass M·m/(M + m) of the collision pair (AMU).
    pub fn reduced_mass(&self) -> f64 {
        self.particle_mass * self.gas_mass / (self.particle_mass + self.gas_mass)
    }

    /// Worker count after resolving `threads = 0` to the machine.
    pub fn worker_count(&self) -> usize {
        if self.threads > 0 {
            self.threads
        } else {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        }
    }
}

/// Terminal state of one trajectory, laid out for the row writer.
///
/// Eleven scalars: the last pre-step position, the attempted end point of
/// the terminal step (the one that crossed a wall or left the box), the
/// propagated velocity at termination, the collision count and the
/// accumulated flight time. The termination kind drives row emission but
/// is not itself a column.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TrajectoryRecord {
    /// Position at the start of the terminal step (m).
    pub position: Vec3,
    /// Attempted end point of the terminal step (m).
    pub next_position: Vec3,
    /// Velocity at the end of the terminal step (m/s).
    pub velocity: Vec3,
    /// Collisions survived before termination.
    pub collisions: u32,
    /// Accumulated flight time over completed steps (s).
    pub time: f64,
    /// How the trajectory ended.
    pub outcome: Boundary,
    /// Interpolation-cache misses paid by this trajectory.
    pub refreshes: u64,
}

/// Everything a finished run hands back to the caller.
#[derive(Debug)]
pub struct RunOutput {
    /// Per-trajectory records in launch order.
    pub records: Vec<TrajectoryRecord>,
    /// Statistics over all trajectories, when a grid was requested.
    pub all_stats: Option<BinGrid>,
    /// Statistics over exiting trajectories only.
    pub exit_stats: Option<BinGrid>,
    /// Wall-clock duration of the tracing phase.
    pub duration_seconds: f64,
}

impl RunOutput {
    /// Number of trajectories that left the bounding box.
    pub fn exits(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.outcome == Boundary::Exit)
            .count()
    }

    /// Number of trajectories that struck a wall segment.
    pub fn wall_hits(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.outcome == Boundary::Wall)
            .count()
    }

    /// Total interpolation-cache misses across all trajectories.
    pub fn total_refreshes(&self) -> u64 {
        self.records.iter().map(|r| r.refreshes).sum()
    }
}

/// Monte Carlo trajectory engine.
///
/// Borrows the shared read-only components and exposes [`Engine::trace`]
/// for a single particle and [`Engine::run`] for the parallel sweep.
pub struct Engine<'a> {
    params: SimulationParams,
    field: &'a FlowField,
    geometry: &'a Geometry,
    sampler: CollisionSampler<'a>,
    grid_spec: Option<GridSpec>,
}

impl<'a> Engine<'a> {
    /// Creates an engine over the shared components.
    ///
    /// `grid_spec` enables the per-cell statistics accumulators; without it
    /// the run produces records only.
    ///
    /// # Panics
    ///
    /// Panics if the configuration asks for zero trajectories.
    pub fn new(
        params: SimulationParams,
        field: &'a FlowField,
        geometry: &'a Geometry,
        table: &'a ProposalTable,
        grid_spec: Option<GridSpec>,
    ) -> Self {
        if params.n_particles < 1 {
            panic!("Engine requires at least one trajectory")
        }
        let sampler = CollisionSampler::new(params.particle_mass, params.gas_mass, table);
        Engine {
            params,
            field,
            geometry,
            sampler,
            grid_spec,
        }
    }

    /// Run parameters.
    pub fn parameters(&self) -> &SimulationParams {
        &self.params
    }

    /// Traces all trajectories across the worker pool and merges the
    /// per-worker statistics.
    pub fn run<S: ParticleSource>(&self, source: &S) -> RunOutput {
        let start_time = Instant::now();
        let n = self.params.n_particles;
        let workers = self.params.worker_count().min(n).max(1);
        let chunk_size = n.div_ceil(workers);

        info!(
            "tracing {} trajectories on {} workers (seed {})",
            n, workers, self.params.seed
        );

        let mut records = vec![TrajectoryRecord::default(); n];
        let shared_all = self.grid_spec.map(|spec| Mutex::new(BinGrid::new(spec)));
        let shared_exit = self.grid_spec.map(|spec| Mutex::new(BinGrid::new(spec)));

        records
            .par_chunks_mut(chunk_size)
            .enumerate()
            .for_each(|(worker, slots)| {
                let mut rng = StdRng::seed_from_u64(self.params.seed.wrapping_add(worker as u64));
                let mut scratch = self.grid_spec.map(BinGrid::new);
                let mut local_all = self.grid_spec.map(BinGrid::new);
                let mut local_exit = self.grid_spec.map(BinGrid::new);

                for slot in slots.iter_mut() {
                    let start = source.sample(&mut rng);
                    if let Some(grid) = scratch.as_mut() {
                        grid.reset();
                    }
                    let record = self.trace(start, scratch.as_mut(), &mut rng);

                    if let (Some(local), Some(grid)) = (local_all.as_mut(), scratch.as_ref()) {
                        local.merge(grid);
                    }
                    if record.outcome == Boundary::Exit {
                        if let (Some(local), Some(grid)) = (local_exit.as_mut(), scratch.as_ref()) {
                            local.merge(grid);
                        }
                    }
                    *slot = record;
                }

                if let (Some(shared), Some(local)) = (shared_all.as_ref(), local_all.as_ref()) {
                    shared.lock().unwrap().merge(local);
                }
                if let (Some(shared), Some(local)) = (shared_exit.as_ref(), local_exit.as_ref()) {
                    shared.lock().unwrap().merge(local);
                }
                debug!("worker {worker} finished {} trajectories", slots.len());
            });

        let output = RunOutput {
            records,
            all_stats: shared_all.map(|mutex| mutex.into_inner().unwrap()),
            exit_stats: shared_exit.map(|mutex| mutex.into_inner().unwrap()),
            duration_seconds: start_time.elapsed().as_secs_f64(),
        };
        info!(
            "traced {} trajectories in {:.2} s: {} exits, {} wall hits, {} field refreshes",
            n,
            output.duration_seconds,
            output.exits(),
            output.wall_hits(),
            output.total_refreshes()
        );
        output
    }
}
