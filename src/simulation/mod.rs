pub mod batch;
pub mod errors;
pub mod live;

pub use batch::{run_batch, ErrorReport, ObjectRecord, ResultRow, SimulationResult};
pub use errors::ValidationError;
pub use live::{LiveConfig, LiveSimulation, ObjectSnapshot, TickSnapshot};

use crate::models::{ObjectIdentity, State};
use crate::physics::GravityModel;
use hifitime::Epoch;
use nalgebra as na;

/// Translates an object's native orbital elements into the Cartesian state
/// at its epoch. The integrator consumes only the (epoch, state) pair and
/// never sees the element representation.
pub trait InitialStateProvider {
    fn initial_state(&self) -> Result<(Epoch, State), ValidationError>;
}

/// Independent trajectory source used only for validation, never for
/// stepping the integrator itself.
pub trait ReferencePropagator {
    /// Geocentric position (km) at an absolute timestamp.
    fn position_at(&self, timestamp: Epoch) -> Result<na::Vector3<f64>, ValidationError>;
}

/// An object the orchestrator can propagate and cross-check: it supplies its
/// own initial condition and reference trajectory, tagged with identity.
pub trait ValidatedObject: InitialStateProvider + ReferencePropagator {
    fn identity(&self) -> &ObjectIdentity;
}

/// Where along the trajectory the reference comparison is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorMode {
    /// Compare only the last sample (batch default).
    FinalSample,
    /// Compare every sample (live/telemetry mode).
    PerSample,
}

/// Health classification of one object's validation outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationStatus {
    /// Error against the reference is below the configured threshold.
    Nominal,
    /// Propagation succeeded but the error exceeds the threshold.
    Drifting,
    /// Propagation succeeded; the reference lookup failed, so no error
    /// magnitude is available.
    ReferenceUnavailable,
    /// The trajectory became non-finite or left the radial bound.
    Diverged,
    /// The object's run was aborted before producing a trajectory.
    Aborted,
}

impl ValidationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationStatus::Nominal => "NOMINAL",
            ValidationStatus::Drifting => "DRIFTING",
            ValidationStatus::ReferenceUnavailable => "REF_UNAVAILABLE",
            ValidationStatus::Diverged => "DIVERGED",
            ValidationStatus::Aborted => "ABORTED",
        }
    }
}

impl std::fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Batch run parameters. Step size, horizon, comparison mode and the status
/// threshold are presentation/run choices rather than physics constants, so
/// all of them are configurable; the defaults mirror the 1-hour-at-60-s
/// validation profile.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Integrator step size in seconds.
    pub step_seconds: f64,
    /// Number of integration steps; the trajectory has `num_steps + 1`
    /// samples.
    pub num_steps: usize,
    pub error_mode: ErrorMode,
    /// Below this error (km) an object is classified NOMINAL. Not a
    /// validated accuracy target, purely a status indicator.
    pub nominal_threshold_km: f64,
    /// Position magnitudes beyond this bound (km) flag the trajectory as
    /// diverged.
    pub divergence_limit_km: f64,
    pub gravity: GravityModel,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            step_seconds: 60.0,
            num_steps: 60,
            error_mode: ErrorMode::FinalSample,
            nominal_threshold_km: 5.0,
            divergence_limit_km: 1.0e6,
            gravity: GravityModel::with_j2(),
        }
    }
}
