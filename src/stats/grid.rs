//! Cartesian (r, z) binning grid over the flow bounding box.
//!
//! Each cell owns a [`BinStats`] accumulator. Updates bin the particle's
//! cylindrical position with `floor` and clamp the indices into range, so
//! adversarial positions (outside the box, NaN-free by construction) never
//! index out of bounds. Grids with identical geometry merge cell by cell.

use super::BinStats;
use crate::vector::Vec3;

/// Radius below which the tangential velocity is treated as zero.
///
/// v_t = (−y·vx + x·vy)/r is singular on the axis; collisions sampled
/// exactly there carry no azimuthal information.
const AXIS_RADIUS: f64 = 1e-12;

/// Geometry of a binning grid: extents and cell counts on both axes.
///
/// `r_step` and `z_step` are inverse cell widths (cells per meter), the
/// form used both for binning and for reporting cell centers.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GridSpec {
    pub r_min: f64,
    pub r_max: f64,
    pub z_min: f64,
    pub z_max: f64,
    pub r_bins: usize,
    pub z_bins: usize,
}

impl GridSpec {
    /// Inverse radial cell width (cells per meter).
    pub fn r_step(&self) -> f64 {
        self.r_bins as f64 / (self.r_max - self.r_min)
    }

    /// Inverse axial cell width (cells per meter).
    pub fn z_step(&self) -> f64 {
        self.z_bins as f64 / (self.z_max - self.z_min)
    }

    /// Center of the radial bin `i` (0-based).
    pub fn r_center(&self, i: usize) -> f64 {
        self.r_min + (i as f64 + 0.5) / self.r_step()
    }

    /// Center of the axial bin `j` (0-based).
    pub fn z_center(&self, j: usize) -> f64 {
        self.z_min + (j as f64 + 0.5) / self.z_step()
    }
}

/// Binning grid accumulating per-cell trajectory statistics.
///
/// Row-major over (r, z): cell `(i, j)` lives at index `i * z_bins + j`.
#[derive(Debug, Clone)]
pub struct BinGrid {
    spec: GridSpec,
    cells: Vec<BinStats>,
}

impl BinGrid {
    /// Creates an empty grid with the given geometry.
    ///
    /// # Panics
    ///
    /// Panics if either bin count is zero or either extent is empty; a grid
    /// without cells cannot accumulate anything.
    pub fn new(spec: GridSpec) -> Self {
        if spec.r_bins == 0 || spec.z_bins == 0 {
            panic!("BinGrid requires at least one cell per axis")
        }
        if spec.r_max <= spec.r_min || spec.z_max <= spec.z_min {
            panic!("BinGrid requires non-empty extents")
        }
        BinGrid {
            spec,
            cells: vec![BinStats::new(); spec.r_bins * spec.z_bins],
        }
    }

    /// Grid geometry.
    pub fn spec(&self) -> &GridSpec {
        &self.spec
    }

    /// Borrow the cell at radial bin `i`, axial bin `j`.
    pub fn cell(&self, i: usize, j: usize) -> &BinStats {
        &self.cells[i * self.spec.z_bins + j]
    }

    /// Clamped bin indices for a cylindrical point.
    ///
    /// `floor` binning; the result is always inside `[0, bins − 1]` on each
    /// axis so lookups never trap, whatever the position.
    pub fn bin(&self, r: f64, z: f64) -> (usize, usize) {
        let i = ((r - self.spec.r_min) * self.spec.r_step()).floor();
        let j = ((z - self.spec.z_min) * self.spec.z_step()).floor();
        (
            (i.max(0.0) as usize).min(self.spec.r_bins - 1),
            (j.max(0.0) as usize).min(self.spec.z_bins - 1),
        )
    }

    /// Folds one collision event into the cell containing `position`.
    ///
    /// Derives the cylindrical radius and the tangential velocity
    /// `v_t = (−y·vx + x·vy)/r` (zero on the axis) and observes the pair
    /// `(v_t, v_z)` together with the time of flight, cumulative collision
    /// count and sampled free path.
    pub fn update(
        &mut self,
        position: &Vec3,
        velocity: &Vec3,
        time: f64,
        collisions: u32,
        free_path: f64,
    ) {
        let r = position.radius_xy();
        let v_tangential = if r < AXIS_RADIUS {
            0.0
        } else {
            (-position.y * velocity.x + position.x * velocity.y) / r
        };

        let (i, j) = self.bin(r, position.z);
        self.cells[i * self.spec.z_bins + j].observe(
            (v_tangential, velocity.z),
            time,
            collisions,
            free_path,
        );
    }

    /// Merges another grid into this one, cell by cell.
    ///
    /// # Panics
    ///
    /// Panics if the grid geometries differ; merging incompatible grids is
    /// a programming error, not a recoverable condition.
    pub fn merge(&mut self, other: &Self) {
        if self.spec != other.spec {
            panic!("BinGrid merge requires identical grid geometry")
        }
        for (cell, other_cell) in self.cells.iter_mut().zip(other.cells.iter()) {
            cell.merge(other_cell);
        }
    }

    /// Clears every cell, keeping the geometry and the allocation.
    ///
    /// Lets one scratch grid per worker serve successive trajectories
    /// without reallocating.
    pub fn reset(&mut self) {
        for cell in &mut self.cells {
            *cell = BinStats::new();
        }
    }

    /// Iterates cells as `(i, j, &BinStats)` in output order.
    pub fn iter_cells(&self) -> impl Iterator<Item = (usize, usize, &BinStats)> {
        self.cells.iter().enumerate().map(|(flat, cell)| {
            let i = flat / self.spec.z_bins;
            let j = flat % self.spec.z_bins;
            (i, j, cell)
        })
    }
}
