//! # Geometry Module - Axisymmetric Wall Description
//!
//! The chamber geometry is a collection of 2-D wall segments in the
//! meridional (z, ρ) plane plus an outer bounding box. A particle step from
//! one 3-D point to the next is collapsed to its (z, ρ) trace and tested
//! against every wall segment; a step that crosses no wall but leaves the
//! bounding box terminates the trajectory as an exit.
//!
//! Segment intersection uses the sign-of-denominator branch of Kirk's
//! "Faster Line Segment Intersection" (Graphics Gems III). Acceptance is
//! strictly open: a trace that merely touches a segment endpoint
//! (`num = 0` or `num = denom`) does not count as a hit, matching the
//! algorithm's parity.

use crate::vector::Vec3;


/// How a propagation step interacted with the chamber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Boundary {
    /// The step stayed inside the chamber.
    #[default]
    None,
    /// The step crossed a wall segment.
    Wall,
    /// The step left the bounding box without crossing a wall.
    Exit,
}

impl Boundary {
    /// Numeric code used in diagnostics: 0 none, 1 wall, 2 exit.
    pub fn code(&self) -> u8 {
        match self {
            Boundary::None => 0,
            Boundary::Wall => 1,
            Boundary::Exit => 2,
        }
    }

    /// True for either terminating variant.
    pub fn terminates(&self) -> bool {
        !matches!(self, Boundary::None)
    }
}

/// One wall segment in the meridional plane, from (z1, rho1) to (z2, rho2).
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Segment {
    pub z1: f64,
    pub rho1: f64,
    pub z2: f64,
    pub rho2: f64,
}

/// Axisymmetric chamber: wall segments plus the outer bounding box.
///
/// Shared read-only across workers; `test` is the collision oracle of the
/// trajectory engine.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Geometry {
    segments: Vec<Segment>,
    z_bound_min: f64,
    z_bound_max: f64,
    rho_bound_max: f64,
}

impl Geometry {
    /// Creates a geometry from wall segments and bounding extents.
    ///
    /// An empty segment list is legal: the chamber is then just the
    /// bounding box and every trajectory terminates by exit.
    pub fn new(segments: Vec<Segment>, z_bound_min: f64, z_bound_max: f64, rho_bound_max: f64) -> Self {
        Geometry {
            segments,
            z_bound_min,
            z_bound_max,
            rho_bound_max,
        }
    }

    /// Wall segments in the meridional plane.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Axial extent of the bounding box.
    pub fn z_bounds(&self) -> (f64, f64) {
        (self.z_bound_min, self.z_bound_max)
    }

    /// Radial extent of the bounding box.
    pub fn rho_bound(&self) -> f64 {
        self.rho_bound_max
    }

    /// Classifies the step from `from` to `to`.
    ///
    /// The 3-D step is collapsed to its (z, ρ) trace. Wall segments are
    /// checked first and win over the exit test; the first intersecting
    /// segment returns [`Boundary::Wall`]. Otherwise, if the end point lies
    /// outside the axial interval or beyond the radial bound the step is an
    /// [`Boundary::Exit`].
    pub fn test(&self, from: &Vec3, to: &Vec3) -> Boundary {
        let trace = Segment {
            z1: from.z,
            rho1: from.radius_xy(),
            z2: to.z,
            rho2: to.radius_xy(),
        };

        for segment in &self.segments {
            if segments_intersect(&trace, segment) {
                return Boundary::Wall;
            }
        }

        if to.z < self.z_bound_min || to.z > self.z_bound_max || trace.rho2 > self.rho_bound_max {
            return Boundary::Exit;
        }

        Boundary::None
    }
}

/// Kirk's sign-of-denominator segment intersection test.
///
/// Both intersection parameters must fall strictly inside (0, denom) with
/// the denominator's sign; touching an endpoint exactly is treated as
/// non-intersecting, and collinear segments (denom = 0) never intersect.
pub fn segments_intersect(a: &Segment, b: &Segment) -> bool {
    let ax = a.z2 - a.z1;
    let ay = a.rho2 - a.rho1;
    let bx = b.z1 - b.z2;
    let by = b.rho1 - b.rho2;
    let cx = a.z1 - b.z1;
    let cy = a.rho1 - b.rho1;

    let denom = ay * bx - ax * by;
    let num_alpha = by * cx - bx * cy;
    let num_beta = ax * cy - ay * cx;

    if denom > 0.0 {
        if num_alpha <= 0.0 || num_alpha >= denom {
            return false;
        }
        if num_beta <= 0.0 || num_beta >= denom {
            return false;
        }
    } else if denom < 0.0 {
        if num_alpha >= 0.0 || num_alpha <= denom {
            return false;
        }
        if num_beta >= 0.0 || num_beta <= denom {
            return false;
        }
    } else {
        // Collinear or parallel
        return false;
    }

    true
}
