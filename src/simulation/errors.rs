use crate::physics::errors::PropagationError;
use std::{error::Error, fmt};

/// Per-object failures surfaced by the validation orchestrator. None of
/// these abort the batch; they are recorded on the affected object's result.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Force model or integrator fault.
    Propagation(PropagationError),
    /// The translator collaborator could not produce an initial state.
    InitialStateUnavailable(String),
    /// The reference propagator failed for the queried timestamp.
    ReferenceUnavailable(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Propagation(e) => write!(f, "propagation error: {}", e),
            ValidationError::InitialStateUnavailable(reason) => {
                write!(f, "initial state unavailable: {}", reason)
            }
            ValidationError::ReferenceUnavailable(reason) => {
                write!(f, "reference propagator unavailable: {}", reason)
            }
        }
    }
}

impl Error for ValidationError {}

impl From<PropagationError> for ValidationError {
    fn from(err: PropagationError) -> Self {
        ValidationError::Propagation(err)
    }
}
