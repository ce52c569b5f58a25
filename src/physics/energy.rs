use crate::constants::GM_EARTH;
use crate::models::State;
use nalgebra as na;

/// Specific orbital energy (km²/s²): kinetic plus two-body potential, per
/// unit mass. Conserved by pure Keplerian motion, so its drift is a direct
/// measure of integrator quality.
pub fn specific_energy(state: &State) -> f64 {
    let r = state.position.magnitude();
    let v = state.velocity.magnitude();

    0.5 * v * v - GM_EARTH / r
}

/// Specific angular momentum vector (km²/s), r × v.
pub fn specific_angular_momentum(state: &State) -> na::Vector3<f64> {
    state.position.cross(&state.velocity)
}
