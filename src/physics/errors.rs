use std::{error::Error, fmt};

/// Failures raised while evaluating the force model or stepping the
/// integrator. These are per-object faults; the batch orchestrator isolates
/// them rather than aborting the run.
#[derive(Debug, Clone, PartialEq)]
pub enum PropagationError {
    /// Force model evaluated at zero position magnitude. Indicates a corrupt
    /// or invalid state; fatal for the affected object.
    SingularPosition,
    /// A state component became NaN or infinite during integration.
    NonFiniteState,
    /// The trajectory left the configured radial bound, signalling a
    /// step-size or model misconfiguration.
    Diverged { radius_km: f64 },
    /// Step size must be strictly positive.
    NonPositiveStep { dt: f64 },
}

impl fmt::Display for PropagationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropagationError::SingularPosition => {
                write!(f, "force model evaluated at zero position magnitude")
            }
            PropagationError::NonFiniteState => {
                write!(f, "state vector contains non-finite components")
            }
            PropagationError::Diverged { radius_km } => {
                write!(f, "trajectory diverged: |r| = {} km", radius_km)
            }
            PropagationError::NonPositiveStep { dt } => {
                write!(f, "step size must be positive, got {} s", dt)
            }
        }
    }
}

impl Error for PropagationError {}
