use crate::models::State;
use crate::physics::errors::PropagationError;
use crate::physics::gravity::GravityModel;

/// First-order ODE system in the form expected by the integrators.
///
/// The time argument exists for interface symmetry with general-purpose ODE
/// solvers; the orbital force field is autonomous and ignores it.
pub trait EquationsOfMotion {
    type State;

    fn compute_derivative(&self, t: f64, state: &Self::State)
        -> Result<Self::State, PropagationError>;
}

/// Point-mass orbital dynamics: d(r)/dt = v, d(v)/dt = a(r).
#[derive(Debug, Clone, Copy)]
pub struct OrbitalDynamics {
    gravity: GravityModel,
}

impl OrbitalDynamics {
    pub fn new(gravity: GravityModel) -> Self {
        OrbitalDynamics { gravity }
    }
}

impl EquationsOfMotion for OrbitalDynamics {
    type State = State;

    fn compute_derivative(&self, _t: f64, state: &State) -> Result<State, PropagationError> {
        Ok(State {
            // Position derivative is velocity
            position: state.velocity,
            // Velocity derivative is the gravitational acceleration
            velocity: self.gravity.acceleration(&state.position)?,
        })
    }
}
