//! # 3D Vector Mathematics Module
//!
//! This module provides the 3D vector implementation used throughout the
//! trajectory tracer. The `Vec3` struct offers vector operations with both
//! value and reference semantics to minimize allocations in the collision
//! loop, plus the cylindrical helpers (`radius_xy`, `azimuth`) the
//! axisymmetric flow lookup relies on.
//!
//! ## Example Usage
//! ```
//! use kinetic_lib::vector::Vec3;
//!
//! // Create vectors
//! let position = Vec3::new(0.001, 0.0, 0.035);
//! let velocity = Vec3::new(12.0, -3.0, 140.0);
//!
//! // Vector operations
//! let next = position + velocity * 1e-6;
//! let displacement = (next - position).norm();
//!
//! // Cylindrical view of a Cartesian point
//! let r = position.radius_xy();
//! let phi = position.azimuth();
//! # let _ = (displacement, r, phi);
//! ```
// Numerical Operations Definition
pub mod ops;
// Helper Functions for Vec3 struct
pub mod math;

/// A 3D Cartesian vector used for particle positions and velocities.
///
/// `Vec3` stores double-precision components and implements `Copy` so that
/// the per-trajectory working set stays allocation free. The axial
/// coordinate of the simulation is `z`; the radial coordinate is derived
/// from `x` and `y` via [`Vec3::radius_xy`].
///
/// # Examples
/// ```
/// # use kinetic_lib::vector::Vec3;
/// let position = Vec3::new(0.01, 0.0, -0.002);
///
/// assert_eq!(position.x, 0.01);
/// assert_eq!(position.y, 0.0);
/// assert_eq!(position.z, -0.002);
///
/// // Unit vectors for the coordinate axes
/// let radial = Vec3::x_hat();
/// let axial = Vec3::z_hat();
/// # let _ = (radial, axial);
/// ```
#[derive(Default, Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Vec3 {
    /// X-component of the vector
    pub x: f64,
    /// Y-component of the vector
    pub y: f64,
    /// Z-component (the axial coordinate)
    pub z: f64,
}

impl Vec3 {
    /// Creates a new 3D vector with the given components.
    ///
    /// # Examples
    /// ```
    /// # use kinetic_lib::vector::Vec3;
    /// let velocity = Vec3::new(1.5, -2.3, 140.0);
    /// # let _ = velocity;
    /// ```
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Vec3 { x, y, z }
    }

    /// Creates a zero vector (0, 0, 0).
    ///
    /// The zero vector is the additive identity and the default starting
    /// point for accumulative operations.
    ///
    /// # Examples
    /// ```
    /// # use kinetic_lib::vector::Vec3;
    /// let v = Vec3::new(1.0, 2.0, 3.0);
    /// assert_eq!(v + Vec3::zero(), v);
    /// ```
    pub fn zero() -> Self {
        Vec3 {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    /// Returns the unit vector along the positive X-axis (1, 0, 0).
    pub fn x_hat() -> Self {
        Vec3::new(1.0, 0.0, 0.0)
    }

    /// Returns the unit vector along the positive Y-axis (0, 1, 0).
    pub fn y_hat() -> Self {
        Vec3::new(0.0, 1.0, 0.0)
    }

    /// Returns the unit vector along the positive Z-axis (0, 0, 1).
    ///
    /// This is the beam axis of the simulation.
    pub fn z_hat() -> Self {
        Vec3::new(0.0, 0.0, 1.0)
    }
}
