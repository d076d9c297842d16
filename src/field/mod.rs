//! # Flow Field Module - Background Gas Lookup
//!
//! The buffer-gas state (bulk velocity, temperature, density) is supplied
//! on an axisymmetric 2-D (z, r) point cloud. This module wraps that cloud
//! in a k-d tree and answers "what does the gas look like here?" for 3-D
//! Cartesian query points, cheaply enough to sit inside the collision loop.
//!
//! ## Validity radius
//!
//! Nearest-neighbor queries dominate the lookup cost, so each sample point
//! carries a precomputed validity radius `d_min`: the distance within which
//! every tracked gas property stays inside a fixed tolerance band of the
//! sample's own values, probed over its nearest neighbors at construction
//! time. A per-worker [`InterpState`] caches the last reference sample and
//! skips the tree entirely while the particle stays within `d_min` of it,
//! which in smooth flow regions removes almost all queries.
//!
//! ## Axisymmetry
//!
//! Samples store cylindrical bulk components (axial, radial). On a cache
//! refresh the radial component is rotated to Cartesian using the query
//! point's azimuth; between refreshes the cached Cartesian vector is reused
//! as-is, which is exactly the staleness the tolerance band already admits.

use crate::vector::Vec3;
use kiddo::float::kdtree::KdTree;
use kiddo::distance::squared_euclidean;


/// Number of nearest neighbors probed when computing a validity radius.
const NEIGHBOR_PROBE: usize = 100;

/// Fractional tolerance band for the validity radius.
const FIELD_TOLERANCE: f64 = 0.2;

/// One sample of the background flow in the meridional plane.
///
/// `swirl` (the azimuthal bulk component of the input table) is parsed and
/// retained but unused by the axisymmetric model.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct FlowPoint {
    /// Axial sample coordinate (m).
    pub z: f64,
    /// Radial sample coordinate (m).
    pub r: f64,
    /// Axial bulk velocity (m/s).
    pub v_axial: f64,
    /// Radial bulk velocity (m/s).
    pub v_radial: f64,
    /// Azimuthal bulk velocity (m/s); retained, unused.
    pub swirl: f64,
    /// Gas temperature (K).
    pub temperature: f64,
    /// Gas number density (m⁻³).
    pub density: f64,
    /// Validity radius (m); 0 is legal and means "always refresh".
    pub d_min: f64,
}

/// Bounding box of the usable flow samples in the meridional plane.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FlowBounds {
    pub z_min: f64,
    pub z_max: f64,
    pub r_min: f64,
    pub r_max: f64,
}

/// Per-worker interpolation cache.
///
/// Holds the last reference sample's coordinates, its gas state with the
/// bulk velocity already rotated into the Cartesian frame, and its validity
/// radius. The initial sentinel radius is negative so the first query
/// always refreshes.
#[derive(Debug, Clone)]
pub struct InterpState {
    pub z_ref: f64,
    pub r_ref: f64,
    pub gas_velocity: Vec3,
    pub temperature: f64,
    pub density: f64,
    pub d_min: f64,
}

impl Default for InterpState {
    fn default() -> Self {
        InterpState {
            z_ref: 0.0,
            r_ref: 0.0,
            gas_velocity: Vec3::zero(),
            temperature: 0.0,
            density: 0.0,
            d_min: -1.0,
        }
    }
}

impl InterpState {
    /// Creates a cache that refreshes on first use.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Nearest-neighbor view of the background flow with cached reuse.
///
/// Built once from the usable flow samples and shared read-only across
/// workers.
pub struct FlowField {
    points: Vec<FlowPoint>,
    tree: KdTree<f64, usize, 2, 64, u32>,
    bounds: FlowBounds,
    temperature_range: (f64, f64),
    max_bulk_speed: f64,
}

impl FlowField {
    /// Builds the field from flow samples.
    ///
    /// Callers are expected to have dropped unusable rows already (the flow
    /// loader removes `T ≤ 0` samples). Construction builds the k-d tree,
    /// then computes every sample's validity radius by probing its
    /// `NEIGHBOR_PROBE` nearest neighbors (itself included) in order of
    /// distance: `d_min` is the distance to the nearest neighbor with any
    /// tracked property (axial/radial bulk, temperature, density) outside
    /// the tolerance band of the sample's own value, or the farthest probed
    /// distance when every neighbor agrees.
    ///
    /// # Panics
    ///
    /// Panics if `points` is empty; a flow field without samples cannot
    /// answer queries.
    pub fn new(mut points: Vec<FlowPoint>) -> Self {
        if points.is_empty() {
            panic!("FlowField requires at least one usable sample")
        }

        let mut tree: KdTree<f64, usize, 2, 64, u32> = KdTree::new();
        for (index, point) in points.iter().enumerate() {
            tree.add(&[point.z, point.r], index);
        }

        let probe = NEIGHBOR_PROBE.min(points.len());
        let radii: Vec<f64> = points
            .iter()
            .map(|point| {
                let neighbours = tree.nearest_n(&[point.z, point.r], probe, &squared_euclidean);
                let mut farthest = 0.0f64;
                let mut nearest_violation = f64::INFINITY;
                for neighbour in &neighbours {
                    let distance = neighbour.distance.sqrt();
                    farthest = farthest.max(distance);
                    let other = &points[neighbour.item as usize];
                    let agrees = within_band(other.v_axial, point.v_axial)
                        && within_band(other.v_radial, point.v_radial)
                        && within_band(other.temperature, point.temperature)
                        && within_band(other.density, point.density);
                    if !agrees {
                        nearest_violation = nearest_violation.min(distance);
                    }
                }
                if nearest_violation.is_finite() {
                    nearest_violation
                } else {
                    farthest
                }
            })
            .collect();
        for (point, radius) in points.iter_mut().zip(radii) {
            point.d_min = radius;
        }

        let bounds = FlowBounds {
            z_min: points.iter().map(|p| p.z).fold(f64::INFINITY, f64::min),
            z_max: points.iter().map(|p| p.z).fold(f64::NEG_INFINITY, f64::max),
            r_min: points.iter().map(|p| p.r).fold(f64::INFINITY, f64::min),
            r_max: points.iter().map(|p| p.r).fold(f64::NEG_INFINITY, f64::max),
        };
        let temperature_range = (
            points
                .iter()
                .map(|p| p.temperature)
                .fold(f64::INFINITY, f64::min),
            points
                .iter()
                .map(|p| p.temperature)
                .fold(f64::NEG_INFINITY, f64::max),
        );
        let max_bulk_speed = points
            .iter()
            .map(|p| (p.v_axial * p.v_axial + p.v_radial * p.v_radial).sqrt())
            .fold(0.0, f64::max);

        FlowField {
            points,
            tree,
            bounds,
            temperature_range,
            max_bulk_speed,
        }
    }

    /// The flow samples, with validity radii filled in.
    pub fn points(&self) -> &[FlowPoint] {
        &self.points
    }

    /// Bounding box of the samples in the meridional plane.
    pub fn bounds(&self) -> &FlowBounds {
        &self.bounds
    }

    /// Observed (min, max) sample temperature.
    pub fn temperature_range(&self) -> (f64, f64) {
        self.temperature_range
    }

    /// Largest bulk-flow speed over the samples.
    pub fn max_bulk_speed(&self) -> f64 {
        self.max_bulk_speed
    }

    /// Refreshes the cache for a 3-D query point if needed.
    ///
    /// Computes the query's meridional coordinates and its distance to the
    /// cached reference; within the reference's validity radius the cache
    /// is reused untouched. Otherwise the nearest sample is fetched from
    /// the tree, its cylindrical bulk velocity is rotated to Cartesian with
    /// the query's azimuth, and the cache is reseated on it.
    ///
    /// Returns `true` when the cache was refreshed (a tree query was paid),
    /// `false` on a cache hit; the engine accumulates this into its
    /// per-trajectory refresh counter.
    pub fn refresh(&self, state: &mut InterpState, position: &Vec3) -> bool {
        let r = position.radius_xy();
        let dz = position.z - state.z_ref;
        let dr = r - state.r_ref;
        if (dz * dz + dr * dr).sqrt() <= state.d_min {
            return false;
        }

        let (_, item) = self.tree.nearest_one(&[position.z, r], &squared_euclidean);
        let point = &self.points[item as usize];
        let phi = position.azimuth();

        state.z_ref = point.z;
        state.r_ref = point.r;
        state.gas_velocity = Vec3::new(
            point.v_radial * phi.cos(),
            point.v_radial * phi.sin(),
            point.v_axial,
        );
        state.temperature = point.temperature;
        state.density = point.density;
        state.d_min = point.d_min;
        true
    }
}

/// Tolerance-band membership for one tracked property.
///
/// The band is `[ε·p, (1+ε)·p]` around the reference value `p`, with the
/// bounds order-normalized so negative references keep a well-formed
/// interval.
fn within_band(value: f64, reference: f64) -> bool {
    let a = FIELD_TOLERANCE * reference;
    let b = (1.0 + FIELD_TOLERANCE) * reference;
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    value >= lo && value <= hi
}
