//! Vector math operations for Vec3
//! Provides methods for norms, normalization, dot and cross products,
//! projections, and the cylindrical coordinates used by the axisymmetric
//! flow-field lookup.

use super::Vec3;

impl Vec3 {
    /// Calculates the squared magnitude of the vector.
    ///
    /// More efficient than `norm()` as it avoids the square root; use it
    /// when only magnitude comparisons are needed.
    ///
    /// # Examples
    /// ```
    /// # use kinetic_lib::vector::Vec3;
    /// let v = Vec3::new(3.0, 4.0, 0.0);
    /// assert_eq!(v.norm_squared(), 25.0);
    /// ```
    #[inline]
    pub fn norm_squared(&self) -> f64 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// Calculates the magnitude (length) of the vector.
    ///
    /// Returns the Euclidean norm: √(x² + y² + z²). Applied to a velocity
    /// this is the particle speed that converts free-path distances into
    /// flight times.
    ///
    /// # Examples
    /// ```
    /// # use kinetic_lib::vector::Vec3;
    /// let v = Vec3::new(3.0, 4.0, 0.0);
    /// assert_eq!(v.norm(), 5.0);
    /// ```
    #[inline]
    pub fn norm(&self) -> f64 {
        self.norm_squared().sqrt()
    }

    /// Returns a unit vector in the same direction as this vector.
    ///
    /// If the vector has zero or near-zero magnitude (within floating-point
    /// epsilon), returns the zero vector to avoid division by zero.
    ///
    /// # Examples
    /// ```
    /// # use kinetic_lib::vector::Vec3;
    /// let v = Vec3::new(3.0, 4.0, 0.0);
    /// assert!((v.normalize().norm() - 1.0).abs() < f64::EPSILON);
    /// assert_eq!(Vec3::zero().normalize(), Vec3::zero());
    /// ```
    pub fn normalize(&self) -> Self {
        let norm_sq = self.norm_squared();
        if norm_sq > f64::EPSILON * f64::EPSILON {
            let inv_norm = norm_sq.sqrt().recip();
            Vec3 {
                x: self.x * inv_norm,
                y: self.y * inv_norm,
                z: self.z * inv_norm,
            }
        } else {
            Vec3::zero()
        }
    }

    /// Calculates the dot product with another vector.
    ///
    /// a·b = ax·bx + ay·by + az·bz; zero for perpendicular vectors.
    ///
    /// # Examples
    /// ```
    /// # use kinetic_lib::vector::Vec3;
    /// let a = Vec3::new(1.0, 2.0, 3.0);
    /// let b = Vec3::new(4.0, 5.0, 6.0);
    /// assert_eq!(a.dot(&b), 32.0);
    /// assert_eq!(Vec3::x_hat().dot(&Vec3::y_hat()), 0.0);
    /// ```
    #[inline]
    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Calculates the cross product with another vector.
    ///
    /// The result is perpendicular to both inputs and follows the
    /// right-hand rule; zero when the inputs are parallel.
    ///
    /// # Examples
    /// ```
    /// # use kinetic_lib::vector::Vec3;
    /// assert_eq!(Vec3::x_hat().cross(&Vec3::y_hat()), Vec3::z_hat());
    /// assert_eq!(Vec3::y_hat().cross(&Vec3::x_hat()), -Vec3::z_hat());
    /// ```
    #[inline]
    pub fn cross(&self, other: &Self) -> Self {
        Vec3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    /// Projects this vector onto another vector.
    ///
    /// proj_b(a) = ((a·b)/(b·b))·b. Projection onto the zero vector returns
    /// zero. The collision kernel uses this to strip the parallel component
    /// when building an orthonormal scattering frame.
    ///
    /// # Examples
    /// ```
    /// # use kinetic_lib::vector::Vec3;
    /// let v = Vec3::new(3.0, 4.0, 0.0);
    /// assert_eq!(v.project_onto(&Vec3::x_hat()), Vec3::new(3.0, 0.0, 0.0));
    /// ```
    pub fn project_onto(&self, other: &Self) -> Self {
        let norm_sq = other.norm_squared();
        if norm_sq > f64::EPSILON * f64::EPSILON {
            let scalar_projection = self.dot(other) / norm_sq;
            Vec3 {
                x: other.x * scalar_projection,
                y: other.y * scalar_projection,
                z: other.z * scalar_projection,
            }
        } else {
            Vec3::zero()
        }
    }

    /// Distance from the beam axis: √(x² + y²).
    ///
    /// Together with `z` this gives the (z, r) pair the axisymmetric flow
    /// field and the binning grid operate on.
    ///
    /// # Examples
    /// ```
    /// # use kinetic_lib::vector::Vec3;
    /// let p = Vec3::new(3.0, 4.0, -7.0);
    /// assert_eq!(p.radius_xy(), 5.0);
    /// ```
    #[inline]
    pub fn radius_xy(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Azimuthal angle φ = atan2(y, x) in radians.
    ///
    /// Used to rotate cylindrical bulk-flow components into the Cartesian
    /// frame at the particle's position.
    #[inline]
    pub fn azimuth(&self) -> f64 {
        self.y.atan2(self.x)
    }

    /// Checks approximate equality within a per-component tolerance.
    ///
    /// # Examples
    /// ```
    /// # use kinetic_lib::vector::Vec3;
    /// let a = Vec3::new(1.0, 2.0, 3.0);
    /// let b = Vec3::new(1.0000001, 2.0000001, 3.0000001);
    /// assert!(a.approx_eq(&b, 1e-6));
    /// assert!(!a.approx_eq(&b, 1e-8));
    /// ```
    #[inline]
    pub fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
        let epsilon = epsilon.max(f64::EPSILON); // Ensure non-zero epsilon
        (self.x - other.x).abs() < epsilon
            && (self.y - other.y).abs() < epsilon
            && (self.z - other.z).abs() < epsilon
    }
}
