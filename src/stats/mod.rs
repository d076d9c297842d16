//! # Online Statistics Module
//!
//! Mergeable single-pass moment estimators for the spatially-binned
//! trajectory statistics. Workers accumulate into private copies and merge
//! them into shared accumulators when a trajectory terminates, so every
//! estimator here supports a `merge` that commutes and reproduces a
//! one-pass accumulation over the union of the sample streams to numerical
//! tolerance (the Chan parallel update of the Welford recurrence).
//!
//! ## Submodules
//!
//! - [`grid`]: the Cartesian (r, z) binning grid that owns one [`BinStats`]
//!   per cell
//! - [`tests`]: unit tests for the merge algebra

pub mod grid;

/// Running mean and variance of a scalar stream.
///
/// Welford update for `observe`, Chan parallel formula for `merge`. The
/// reported variance is the sample variance (n − 1 denominator); cells with
/// fewer than two observations report `NaN`, which the CSV writer renders
/// as an empty field.
#[derive(Debug, Default, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct ScalarMoments {
    count: u64,
    mean: f64,
    m2: f64,
}

impl ScalarMoments {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of observed samples.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Mean of the observed samples, `NaN` when empty.
    pub fn mean(&self) -> f64 {
        if self.count == 0 { f64::NAN } else { self.mean }
    }

    /// Sample variance of the observed samples, `NaN` below two samples.
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            f64::NAN
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// Folds one sample into the accumulator.
    pub fn observe(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    /// Merges another accumulator into this one.
    ///
    /// Equivalent, to floating-point tolerance, to observing the other
    /// stream's samples one by one.
    pub fn merge(&mut self, other: &Self) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = *other;
            return;
        }
        let n_self = self.count as f64;
        let n_other = other.count as f64;
        let n = n_self + n_other;
        let delta = other.mean - self.mean;

        self.m2 += other.m2 + delta * delta * n_self * n_other / n;
        self.mean += delta * n_other / n;
        self.count += other.count;
    }
}

/// Running 2-D mean and 2×2 covariance of paired samples.
///
/// Tracks the tangential and axial velocity components observed at
/// collision events inside one grid cell. The co-moment update mirrors the
/// scalar Welford recurrence; `merge` uses the pairwise form so partial
/// accumulators from different workers combine exactly like one pass.
#[derive(Debug, Default, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct PairMoments {
    count: u64,
    mean_a: f64,
    mean_b: f64,
    m2_a: f64,
    m2_b: f64,
    m_ab: f64,
}

impl PairMoments {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of observed sample pairs.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Mean of the first component, `NaN` when empty.
    pub fn mean_a(&self) -> f64 {
        if self.count == 0 { f64::NAN } else { self.mean_a }
    }

    /// Mean of the second component, `NaN` when empty.
    pub fn mean_b(&self) -> f64 {
        if self.count == 0 { f64::NAN } else { self.mean_b }
    }

    /// Sample variance of the first component.
    pub fn variance_a(&self) -> f64 {
        if self.count < 2 {
            f64::NAN
        } else {
            self.m2_a / (self.count - 1) as f64
        }
    }

    /// Sample variance of the second component.
    pub fn variance_b(&self) -> f64 {
        if self.count < 2 {
            f64::NAN
        } else {
            self.m2_b / (self.count - 1) as f64
        }
    }

    /// Sample covariance of the two components.
    pub fn covariance(&self) -> f64 {
        if self.count < 2 {
            f64::NAN
        } else {
            self.m_ab / (self.count - 1) as f64
        }
    }

    /// Folds one sample pair into the accumulator.
    pub fn observe(&mut self, a: f64, b: f64) {
        self.count += 1;
        let n = self.count as f64;
        let delta_a = a - self.mean_a;
        let delta_b = b - self.mean_b;
        self.mean_a += delta_a / n;
        self.mean_b += delta_b / n;
        self.m2_a += delta_a * (a - self.mean_a);
        self.m2_b += delta_b * (b - self.mean_b);
        self.m_ab += delta_a * (b - self.mean_b);
    }

    /// Merges another accumulator into this one.
    pub fn merge(&mut self, other: &Self) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = *other;
            return;
        }
        let n_self = self.count as f64;
        let n_other = other.count as f64;
        let n = n_self + n_other;
        let delta_a = other.mean_a - self.mean_a;
        let delta_b = other.mean_b - self.mean_b;
        let weight = n_self * n_other / n;

        self.m2_a += other.m2_a + delta_a * delta_a * weight;
        self.m2_b += other.m2_b + delta_b * delta_b * weight;
        self.m_ab += other.m_ab + delta_a * delta_b * weight;
        self.mean_a += delta_a * n_other / n;
        self.mean_b += delta_b * n_other / n;
        self.count += other.count;
    }
}

/// Per-cell trajectory statistics.
///
/// One instance per grid cell, holding:
/// - `velocity`: 2-D moments over (tangential, axial) velocity,
/// - `time`: moments of the time of flight at the sample,
/// - `collisions`: moments of the cumulative collision count,
/// - `free_path`: moments of the free-path length sampled at the cell.
#[derive(Debug, Default, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct BinStats {
    pub velocity: PairMoments,
    pub time: ScalarMoments,
    pub collisions: ScalarMoments,
    pub free_path: ScalarMoments,
}

impl BinStats {
    /// Creates a cell with all accumulators empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of collision events observed in this cell.
    pub fn count(&self) -> u64 {
        self.time.count()
    }

    /// Folds one collision event into the cell.
    ///
    /// `velocity` is the (tangential, axial) pair, `time` the accumulated
    /// time of flight, `collisions` the cumulative collision count and
    /// `free_path` the path length that was just sampled.
    pub fn observe(&mut self, velocity: (f64, f64), time: f64, collisions: u32, free_path: f64) {
        self.velocity.observe(velocity.0, velocity.1);
        self.time.observe(time);
        self.collisions.observe(f64::from(collisions));
        self.free_path.observe(free_path);
    }

    /// Merges another cell into this one, component by component.
    pub fn merge(&mut self, other: &Self) {
        self.velocity.merge(&other.velocity);
        self.time.merge(&other.time);
        self.collisions.merge(&other.collisions);
        self.free_path.merge(&other.free_path);
    }
}
