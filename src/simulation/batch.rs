use crate::integrators::Rk4;
use crate::models::{ObjectIdentity, Trajectory, TrajectorySample};
use crate::physics::dynamics::OrbitalDynamics;
use crate::physics::errors::PropagationError;
use crate::simulation::errors::ValidationError;
use crate::simulation::{ErrorMode, ReferencePropagator, RunConfig, ValidatedObject, ValidationStatus};
use hifitime::{Duration, Epoch};
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::Serialize;

/// Positional error magnitudes versus the reference propagator. `None`
/// entries mark samples whose reference lookup failed; they are reported as
/// unavailable, never defaulted to zero.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorReport {
    /// Single comparison at the last trajectory sample.
    Final(Option<f64>),
    /// One comparison per trajectory sample.
    PerSample(Vec<Option<f64>>),
}

impl ErrorReport {
    /// Error magnitude attached to sample `index` when the result is viewed
    /// as a flat table. A final-only report repeats its scalar on every row.
    pub fn at_sample(&self, index: usize) -> Option<f64> {
        match self {
            ErrorReport::Final(error) => *error,
            ErrorReport::PerSample(errors) => errors.get(index).copied().flatten(),
        }
    }

    /// The error at the last compared sample, if it was available.
    pub fn final_error(&self) -> Option<f64> {
        match self {
            ErrorReport::Final(error) => *error,
            ErrorReport::PerSample(errors) => errors.last().copied().flatten(),
        }
    }
}

/// One object's annotated outcome: its propagated trajectory, the error(s)
/// against the reference, and the resulting status classification.
/// Immutable once the run completes.
#[derive(Debug, Clone)]
pub struct ObjectRecord {
    pub identity: ObjectIdentity,
    /// Absolute time of the trajectory's elapsed-time zero. Absent when the
    /// initial state could not be obtained.
    pub epoch: Option<Epoch>,
    pub trajectory: Trajectory,
    pub errors: ErrorReport,
    pub status: ValidationStatus,
    /// The isolating failure, when the object did not complete cleanly.
    pub failure: Option<ValidationError>,
}

impl ObjectRecord {
    fn aborted(identity: ObjectIdentity, failure: ValidationError) -> Self {
        ObjectRecord {
            identity,
            epoch: None,
            trajectory: Trajectory::empty(),
            errors: ErrorReport::Final(None),
            status: ValidationStatus::Aborted,
            failure: Some(failure),
        }
    }

    fn diverged(
        identity: ObjectIdentity,
        epoch: Epoch,
        trajectory: Trajectory,
        failure: PropagationError,
    ) -> Self {
        ObjectRecord {
            identity,
            epoch: Some(epoch),
            trajectory,
            errors: ErrorReport::Final(None),
            status: ValidationStatus::Diverged,
            failure: Some(ValidationError::Propagation(failure)),
        }
    }

    pub fn final_error_km(&self) -> Option<f64> {
        self.errors.final_error()
    }
}

/// Flat result row: (identity, elapsed time, full state, error, status).
#[derive(Debug, Clone, Serialize)]
pub struct ResultRow<'a> {
    pub name: &'a str,
    pub catalog_number: u64,
    pub elapsed_seconds: f64,
    pub rx_km: f64,
    pub ry_km: f64,
    pub rz_km: f64,
    pub vx_km_s: f64,
    pub vy_km_s: f64,
    pub vz_km_s: f64,
    pub error_km: Option<f64>,
    pub status: &'static str,
}

/// Consolidated outcome of one batch run.
#[derive(Debug, Clone, Default)]
pub struct SimulationResult {
    pub records: Vec<ObjectRecord>,
}

impl SimulationResult {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn count_with_status(&self, status: ValidationStatus) -> usize {
        self.records.iter().filter(|r| r.status == status).count()
    }

    /// Flattens every record into per-sample rows. A fully propagated object
    /// over N steps contributes N + 1 rows; aborted objects contribute none.
    pub fn rows(&self) -> Vec<ResultRow<'_>> {
        let mut rows = Vec::new();
        for record in &self.records {
            for (index, sample) in record.trajectory.iter().enumerate() {
                rows.push(ResultRow {
                    name: &record.identity.name,
                    catalog_number: record.identity.catalog_number,
                    elapsed_seconds: sample.elapsed_seconds,
                    rx_km: sample.state.position.x,
                    ry_km: sample.state.position.y,
                    rz_km: sample.state.position.z,
                    vx_km_s: sample.state.velocity.x,
                    vy_km_s: sample.state.velocity.y,
                    vz_km_s: sample.state.velocity.z,
                    error_km: record.errors.at_sample(index),
                    status: record.status.as_str(),
                });
            }
        }
        rows
    }

    pub fn write_csv<W: std::io::Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for row in self.rows() {
            csv_writer.serialize(row)?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

/// Propagates and validates every object of the batch, consolidating the
/// annotated trajectories into a single result set.
///
/// Objects are independent, so the batch is dispatched across the rayon
/// worker pool; the only synchronization point is the final merge. A failure
/// in one object is isolated to its record and never aborts the run.
pub fn run_batch<T>(objects: &[T], config: &RunConfig) -> SimulationResult
where
    T: ValidatedObject + Sync,
{
    info!(
        "validating {} objects: {} steps of {} s, {:?} comparison",
        objects.len(),
        config.num_steps,
        config.step_seconds,
        config.error_mode
    );

    let records = objects
        .par_iter()
        .map(|object| propagate_and_validate(object, config))
        .collect();

    SimulationResult { records }
}

fn propagate_and_validate<T: ValidatedObject>(object: &T, config: &RunConfig) -> ObjectRecord {
    let identity = object.identity().clone();
    debug!("propagating {}", identity);

    let (epoch, initial) = match object.initial_state() {
        Ok(pair) => pair,
        Err(e) => {
            warn!("{}: initial state unavailable: {}", identity, e);
            return ObjectRecord::aborted(identity, e);
        }
    };

    if !initial.is_finite() {
        warn!("{}: non-finite initial state", identity);
        return ObjectRecord::aborted(identity, PropagationError::NonFiniteState.into());
    }
    if initial.position.magnitude() == 0.0 {
        warn!("{}: initial position at the origin", identity);
        return ObjectRecord::aborted(identity, PropagationError::SingularPosition.into());
    }

    let rk4 = Rk4::new(OrbitalDynamics::new(config.gravity));
    let states = match rk4.propagate(&initial, config.step_seconds, config.num_steps) {
        Ok(states) => states,
        Err(e @ PropagationError::NonFiniteState) => {
            warn!("{}: trajectory became non-finite", identity);
            return ObjectRecord::diverged(identity, epoch, Trajectory::empty(), e);
        }
        Err(e) => {
            warn!("{}: propagation failed: {}", identity, e);
            return ObjectRecord::aborted(identity, e.into());
        }
    };
    let trajectory = Trajectory::from_states(states, config.step_seconds);

    if let Some(sample) = trajectory
        .iter()
        .find(|s| !s.state.is_finite() || s.state.position.magnitude() > config.divergence_limit_km)
    {
        let radius_km = sample.state.position.magnitude();
        warn!(
            "{}: diverged at t+{} s (|r| = {} km)",
            identity, sample.elapsed_seconds, radius_km
        );
        return ObjectRecord::diverged(
            identity,
            epoch,
            trajectory,
            PropagationError::Diverged { radius_km },
        );
    }

    let errors = match config.error_mode {
        ErrorMode::FinalSample => {
            // The trajectory always has at least the initial sample.
            let last = trajectory.last().map(|s| *s).unwrap_or(TrajectorySample {
                elapsed_seconds: 0.0,
                state: initial,
            });
            ErrorReport::Final(reference_error(object, &identity, epoch, &last))
        }
        ErrorMode::PerSample => ErrorReport::PerSample(
            trajectory
                .iter()
                .map(|sample| reference_error(object, &identity, epoch, sample))
                .collect(),
        ),
    };

    let status = match errors.final_error() {
        Some(error_km) if error_km < config.nominal_threshold_km => ValidationStatus::Nominal,
        Some(_) => ValidationStatus::Drifting,
        None => ValidationStatus::ReferenceUnavailable,
    };

    ObjectRecord {
        identity,
        epoch: Some(epoch),
        trajectory,
        errors,
        status,
        failure: None,
    }
}

/// Euclidean distance (km) between a propagated sample and the reference
/// position at the matching absolute timestamp, or `None` when the reference
/// lookup fails.
fn reference_error<T: ReferencePropagator>(
    object: &T,
    identity: &ObjectIdentity,
    epoch: Epoch,
    sample: &TrajectorySample,
) -> Option<f64> {
    let timestamp = epoch + Duration::from_seconds(sample.elapsed_seconds);
    match object.position_at(timestamp) {
        Ok(reference) => Some((sample.state.position - reference).magnitude()),
        Err(e) => {
            warn!(
                "{}: reference lookup failed at t+{} s: {}",
                identity, sample.elapsed_seconds, e
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::GM_EARTH;
    use crate::models::State;
    use crate::physics::GravityModel;
    use crate::simulation::InitialStateProvider;
    use approx::assert_abs_diff_eq;
    use nalgebra as na;

    /// Analytic equatorial circular orbit, doubling as its own reference.
    struct CircularOrbit {
        identity: ObjectIdentity,
        epoch: Epoch,
        radius_km: f64,
    }

    impl CircularOrbit {
        fn new(name: &str, catalog_number: u64) -> Self {
            CircularOrbit {
                identity: ObjectIdentity::new(name, catalog_number),
                epoch: Epoch::from_gregorian_utc(2024, 3, 15, 0, 0, 0, 0),
                radius_km: 7000.0,
            }
        }

        fn mean_motion(&self) -> f64 {
            (GM_EARTH / self.radius_km.powi(3)).sqrt()
        }
    }

    impl InitialStateProvider for CircularOrbit {
        fn initial_state(&self) -> Result<(Epoch, State), ValidationError> {
            let speed = self.mean_motion() * self.radius_km;
            Ok((
                self.epoch,
                State::new(
                    na::Vector3::new(self.radius_km, 0.0, 0.0),
                    na::Vector3::new(0.0, speed, 0.0),
                ),
            ))
        }
    }

    impl ReferencePropagator for CircularOrbit {
        fn position_at(&self, timestamp: Epoch) -> Result<na::Vector3<f64>, ValidationError> {
            let elapsed = timestamp.to_unix_seconds() - self.epoch.to_unix_seconds();
            let theta = self.mean_motion() * elapsed;
            Ok(na::Vector3::new(
                self.radius_km * theta.cos(),
                self.radius_km * theta.sin(),
                0.0,
            ))
        }
    }

    impl ValidatedObject for CircularOrbit {
        fn identity(&self) -> &ObjectIdentity {
            &self.identity
        }
    }

    /// Wrapper that breaks one collaborator call while keeping the rest.
    enum Fault {
        None,
        InitialState,
        Reference,
    }

    struct FaultyOrbit {
        inner: CircularOrbit,
        fault: Fault,
    }

    impl InitialStateProvider for FaultyOrbit {
        fn initial_state(&self) -> Result<(Epoch, State), ValidationError> {
            match self.fault {
                Fault::InitialState => Err(ValidationError::InitialStateUnavailable(
                    "element set expired".into(),
                )),
                _ => self.inner.initial_state(),
            }
        }
    }

    impl ReferencePropagator for FaultyOrbit {
        fn position_at(&self, timestamp: Epoch) -> Result<na::Vector3<f64>, ValidationError> {
            match self.fault {
                Fault::Reference => Err(ValidationError::ReferenceUnavailable(
                    "ephemeris service timed out".into(),
                )),
                _ => self.inner.position_at(timestamp),
            }
        }
    }

    impl ValidatedObject for FaultyOrbit {
        fn identity(&self) -> &ObjectIdentity {
            &self.inner.identity
        }
    }

    /// Reference displaced out of plane, so the propagated trajectory reads
    /// as off-track by at least the bias.
    struct BiasedOrbit {
        inner: CircularOrbit,
        bias_km: f64,
    }

    impl InitialStateProvider for BiasedOrbit {
        fn initial_state(&self) -> Result<(Epoch, State), ValidationError> {
            self.inner.initial_state()
        }
    }

    impl ReferencePropagator for BiasedOrbit {
        fn position_at(&self, timestamp: Epoch) -> Result<na::Vector3<f64>, ValidationError> {
            self.inner
                .position_at(timestamp)
                .map(|r| r + na::Vector3::new(0.0, 0.0, self.bias_km))
        }
    }

    impl ValidatedObject for BiasedOrbit {
        fn identity(&self) -> &ObjectIdentity {
            &self.inner.identity
        }
    }

    /// Hyperbolic departure well above escape speed. Every state stays
    /// finite, so only the radial bound can flag it.
    struct EscapeOrbit {
        identity: ObjectIdentity,
        epoch: Epoch,
    }

    impl EscapeOrbit {
        fn new(name: &str, catalog_number: u64) -> Self {
            EscapeOrbit {
                identity: ObjectIdentity::new(name, catalog_number),
                epoch: Epoch::from_gregorian_utc(2024, 3, 15, 0, 0, 0, 0),
            }
        }
    }

    impl InitialStateProvider for EscapeOrbit {
        fn initial_state(&self) -> Result<(Epoch, State), ValidationError> {
            // ~12 km/s at 7000 km, well past the ~10.7 km/s escape speed.
            Ok((
                self.epoch,
                State::new(
                    na::Vector3::new(7000.0, 0.0, 0.0),
                    na::Vector3::new(0.0, 12.0, 0.0),
                ),
            ))
        }
    }

    impl ReferencePropagator for EscapeOrbit {
        fn position_at(&self, _timestamp: Epoch) -> Result<na::Vector3<f64>, ValidationError> {
            // Never consulted; divergence preempts the comparison.
            Ok(na::Vector3::new(7000.0, 0.0, 0.0))
        }
    }

    impl ValidatedObject for EscapeOrbit {
        fn identity(&self) -> &ObjectIdentity {
            &self.identity
        }
    }

    fn two_body_config() -> RunConfig {
        RunConfig {
            gravity: GravityModel::two_body(),
            ..RunConfig::default()
        }
    }

    #[test]
    fn test_row_count_is_objects_times_samples() {
        let objects = vec![CircularOrbit::new("ALPHA", 1), CircularOrbit::new("BETA", 2)];
        let config = two_body_config();
        let result = run_batch(&objects, &config);
        assert_eq!(result.len(), 2);
        assert_eq!(result.rows().len(), 2 * (config.num_steps + 1));
    }

    #[test]
    fn test_circular_orbit_is_nominal() {
        let objects = vec![CircularOrbit::new("ALPHA", 1)];
        let result = run_batch(&objects, &two_body_config());
        let record = &result.records[0];
        assert_eq!(record.status, ValidationStatus::Nominal);
        // RK4 at 60 s steps tracks the analytic circle to well under a km.
        assert!(record.final_error_km().unwrap() < 1.0);
        assert!(record.failure.is_none());
    }

    #[test]
    fn test_per_sample_mode_compares_every_sample() {
        let objects = vec![CircularOrbit::new("ALPHA", 1)];
        let config = RunConfig {
            error_mode: ErrorMode::PerSample,
            ..two_body_config()
        };
        let result = run_batch(&objects, &config);
        match &result.records[0].errors {
            ErrorReport::PerSample(errors) => {
                assert_eq!(errors.len(), config.num_steps + 1);
                assert!(errors.iter().all(|e| e.is_some()));
                // The initial sample coincides with the reference by
                // construction.
                assert_abs_diff_eq!(errors[0].unwrap(), 0.0, epsilon = 1e-9);
            }
            other => panic!("expected per-sample errors, got {:?}", other),
        }
    }

    #[test]
    fn test_error_beyond_threshold_classifies_drifting() {
        let objects = vec![BiasedOrbit {
            inner: CircularOrbit::new("OFFTRACK", 1),
            bias_km: 25.0,
        }];
        let config = two_body_config();
        let result = run_batch(&objects, &config);
        let record = &result.records[0];
        assert_eq!(record.status, ValidationStatus::Drifting);
        assert!(record.final_error_km().unwrap() >= config.nominal_threshold_km);
        // Drifting is a classification, not a failure.
        assert!(record.failure.is_none());
        assert_eq!(record.trajectory.len(), config.num_steps + 1);
    }

    #[test]
    fn test_escape_trajectory_trips_the_radial_bound() {
        let objects = vec![EscapeOrbit::new("RUNAWAY", 1)];
        let config = RunConfig {
            divergence_limit_km: 10_000.0,
            ..two_body_config()
        };
        let result = run_batch(&objects, &config);
        let record = &result.records[0];
        assert_eq!(record.status, ValidationStatus::Diverged);
        assert_eq!(record.final_error_km(), None);
        match record.failure {
            Some(ValidationError::Propagation(PropagationError::Diverged { radius_km })) => {
                assert!(radius_km > config.divergence_limit_km);
            }
            ref other => panic!("expected a radial-bound failure, got {:?}", other),
        }
    }

    #[test]
    fn test_reference_failure_is_isolated() {
        let objects = vec![
            FaultyOrbit {
                inner: CircularOrbit::new("BROKEN", 1),
                fault: Fault::Reference,
            },
            FaultyOrbit {
                inner: CircularOrbit::new("HEALTHY", 2),
                fault: Fault::None,
            },
        ];
        let result = run_batch(&objects, &two_body_config());

        let broken = &result.records[0];
        assert_eq!(broken.status, ValidationStatus::ReferenceUnavailable);
        assert_eq!(broken.final_error_km(), None);
        // Its own propagation still completed.
        assert_eq!(broken.trajectory.len(), 61);

        assert_eq!(result.records[1].status, ValidationStatus::Nominal);
    }

    #[test]
    fn test_initial_state_failure_aborts_only_that_object() {
        let objects = vec![
            FaultyOrbit {
                inner: CircularOrbit::new("EXPIRED", 1),
                fault: Fault::InitialState,
            },
            FaultyOrbit {
                inner: CircularOrbit::new("HEALTHY", 2),
                fault: Fault::None,
            },
        ];
        let config = two_body_config();
        let result = run_batch(&objects, &config);

        let aborted = &result.records[0];
        assert_eq!(aborted.status, ValidationStatus::Aborted);
        assert!(aborted.trajectory.is_empty());
        assert!(aborted.failure.is_some());

        assert_eq!(result.records[1].status, ValidationStatus::Nominal);
        // Aborted objects contribute no rows.
        assert_eq!(result.rows().len(), config.num_steps + 1);
    }

    #[test]
    fn test_final_error_is_repeated_on_every_row() {
        let objects = vec![CircularOrbit::new("ALPHA", 1)];
        let result = run_batch(&objects, &two_body_config());
        let expected = result.records[0].final_error_km();
        assert!(result.rows().iter().all(|row| row.error_km == expected));
    }

    #[test]
    fn test_csv_export_has_one_line_per_row_plus_header() {
        let objects = vec![CircularOrbit::new("ALPHA", 1)];
        let result = run_batch(&objects, &two_body_config());

        let mut buffer = Vec::new();
        result.write_csv(&mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), result.rows().len() + 1);
        assert!(lines[0].starts_with("name,catalog_number,elapsed_seconds"));
    }

    #[test]
    fn test_status_counts() {
        let objects = vec![
            FaultyOrbit {
                inner: CircularOrbit::new("BROKEN", 1),
                fault: Fault::Reference,
            },
            FaultyOrbit {
                inner: CircularOrbit::new("HEALTHY", 2),
                fault: Fault::None,
            },
        ];
        let result = run_batch(&objects, &two_body_config());
        assert_eq!(result.count_with_status(ValidationStatus::Nominal), 1);
        assert_eq!(
            result.count_with_status(ValidationStatus::ReferenceUnavailable),
            1
        );
        assert_eq!(result.count_with_status(ValidationStatus::Diverged), 0);
    }
}
