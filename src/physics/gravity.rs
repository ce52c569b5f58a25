use crate::constants::{GM_EARTH, J2, R_EARTH_EQ};
use crate::physics::errors::PropagationError;
use nalgebra as na;

/// Gravitational force model: central two-body attraction, optionally with
/// the J2 oblateness perturbation superposed. Pure and autonomous; the field
/// does not depend on time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GravityModel {
    j2_enabled: bool,
}

impl GravityModel {
    /// Two-body + J2, the model used for LEO validation runs.
    pub fn with_j2() -> Self {
        GravityModel { j2_enabled: true }
    }

    /// Pure Keplerian attraction. Useful for conservation checks and for
    /// quantifying how much of the reference error J2 accounts for.
    pub fn two_body() -> Self {
        GravityModel { j2_enabled: false }
    }

    /// Total acceleration (km/s²) at a geocentric position (km).
    ///
    /// Fails on a zero-magnitude position (the potential is singular at the
    /// origin) and on non-finite input, which the integrator treats as
    /// numerical divergence.
    pub fn acceleration(
        &self,
        position: &na::Vector3<f64>,
    ) -> Result<na::Vector3<f64>, PropagationError> {
        let r_norm = position.magnitude();
        if !r_norm.is_finite() {
            return Err(PropagationError::NonFiniteState);
        }
        if r_norm == 0.0 {
            return Err(PropagationError::SingularPosition);
        }

        // Central attraction, always pointing at the coordinate origin.
        let a_kepler = position * (-GM_EARTH / r_norm.powi(3));
        if !self.j2_enabled {
            return Ok(a_kepler);
        }

        // Zonal-harmonic gradient of the J2 potential term. This is the
        // dominant deviation from sphericity and drives orbital precession.
        let k_j2 = 1.5 * J2 * GM_EARTH * R_EARTH_EQ.powi(2) / r_norm.powi(5);
        let z2 = position.z * position.z;
        let r2 = r_norm * r_norm;

        let a_j2 = na::Vector3::new(
            k_j2 * position.x * (5.0 * z2 / r2 - 1.0),
            k_j2 * position.y * (5.0 * z2 / r2 - 1.0),
            k_j2 * position.z * (5.0 * z2 / r2 - 3.0),
        );

        Ok(a_kepler + a_j2)
    }
}

impl Default for GravityModel {
    fn default() -> Self {
        GravityModel::with_j2()
    }
}
