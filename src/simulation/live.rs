use crate::integrators::Rk4;
use crate::models::{ObjectIdentity, State};
use crate::physics::dynamics::OrbitalDynamics;
use crate::physics::errors::PropagationError;
use crate::physics::GravityModel;
use crate::simulation::{ValidatedObject, ValidationStatus};
use hifitime::{Duration, Epoch};
use log::warn;

/// Interactive loop parameters. The smaller step keeps per-tick compute
/// bounded; `steps_per_tick` is the visual speed factor (each tick advances
/// `steps_per_tick * step_seconds` simulated seconds).
#[derive(Debug, Clone)]
pub struct LiveConfig {
    pub step_seconds: f64,
    pub steps_per_tick: usize,
    pub nominal_threshold_km: f64,
    /// Geocentric radius (km) beyond which an object is halted as diverged,
    /// matching the batch orchestrator's runaway detection.
    pub divergence_limit_km: f64,
    pub gravity: GravityModel,
}

impl Default for LiveConfig {
    fn default() -> Self {
        LiveConfig {
            step_seconds: 30.0,
            steps_per_tick: 5,
            nominal_threshold_km: 5.0,
            divergence_limit_km: 1.0e6,
            gravity: GravityModel::with_j2(),
        }
    }
}

struct LiveObject<T> {
    target: T,
    epoch: Epoch,
    state: State,
    halted: Option<PropagationError>,
}

/// Per-object view of one tick.
#[derive(Debug, Clone)]
pub struct ObjectSnapshot {
    pub identity: ObjectIdentity,
    pub state: State,
    /// Current error versus the reference, absent when the lookup failed or
    /// the object halted.
    pub error_km: Option<f64>,
    pub status: ValidationStatus,
}

/// Everything a presentation layer needs to render one frame.
#[derive(Debug, Clone)]
pub struct TickSnapshot {
    pub elapsed_seconds: f64,
    pub objects: Vec<ObjectSnapshot>,
}

/// Explicit simulation context for the interactive mode: owns every
/// per-object state and the simulation clock, advanced only through
/// `tick()`. There is no hidden loop; the caller drives the cadence and
/// stops by simply dropping the context.
pub struct LiveSimulation<T> {
    objects: Vec<LiveObject<T>>,
    rk4: Rk4<OrbitalDynamics>,
    config: LiveConfig,
    elapsed_seconds: f64,
}

impl<T: ValidatedObject> LiveSimulation<T> {
    /// Initializes every target at its own epoch. Targets whose initial
    /// state cannot be obtained are dropped with a warning; the rest of the
    /// fleet is unaffected.
    pub fn new(targets: Vec<T>, config: LiveConfig) -> Self {
        let rk4 = Rk4::new(OrbitalDynamics::new(config.gravity));
        let mut objects = Vec::with_capacity(targets.len());
        for target in targets {
            match target.initial_state() {
                Ok((epoch, state)) => objects.push(LiveObject {
                    target,
                    epoch,
                    state,
                    halted: None,
                }),
                Err(e) => warn!("{}: skipped from live run: {}", target.identity(), e),
            }
        }

        LiveSimulation {
            objects,
            rk4,
            config,
            elapsed_seconds: 0.0,
        }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Simulated seconds since the objects' epochs.
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed_seconds
    }

    /// Simulated seconds one tick advances.
    pub fn seconds_per_tick(&self) -> f64 {
        self.config.step_seconds * self.config.steps_per_tick as f64
    }

    /// Advances every active object by `steps_per_tick` integrator steps and
    /// returns the updated fleet snapshot with per-object error and status.
    /// A diverging object is halted and flagged; the others keep running.
    pub fn tick(&mut self) -> TickSnapshot {
        let dt = self.config.step_seconds;

        for object in &mut self.objects {
            if object.halted.is_some() {
                continue;
            }
            for step in 0..self.config.steps_per_tick {
                let t = self.elapsed_seconds + step as f64 * dt;
                match self.rk4.step(t, &object.state, dt) {
                    Ok(next) if next.is_finite() => {
                        let radius_km = next.position.magnitude();
                        if radius_km > self.config.divergence_limit_km {
                            warn!(
                                "{}: halted, |r| = {} km past the radial bound",
                                object.target.identity(),
                                radius_km
                            );
                            object.halted = Some(PropagationError::Diverged { radius_km });
                            break;
                        }
                        object.state = next;
                    }
                    Ok(_) | Err(PropagationError::NonFiniteState) => {
                        warn!("{}: halted, state non-finite", object.target.identity());
                        object.halted = Some(PropagationError::NonFiniteState);
                        break;
                    }
                    Err(e) => {
                        warn!("{}: halted: {}", object.target.identity(), e);
                        object.halted = Some(e);
                        break;
                    }
                }
            }
        }

        self.elapsed_seconds += self.seconds_per_tick();
        self.snapshot()
    }

    fn snapshot(&self) -> TickSnapshot {
        let objects = self
            .objects
            .iter()
            .map(|object| {
                if object.halted.is_some() {
                    return ObjectSnapshot {
                        identity: object.target.identity().clone(),
                        state: object.state,
                        error_km: None,
                        status: ValidationStatus::Diverged,
                    };
                }

                let timestamp = object.epoch + Duration::from_seconds(self.elapsed_seconds);
                let (error_km, status) = match object.target.position_at(timestamp) {
                    Ok(reference) => {
                        let error = (object.state.position - reference).magnitude();
                        let status = if error < self.config.nominal_threshold_km {
                            ValidationStatus::Nominal
                        } else {
                            ValidationStatus::Drifting
                        };
                        (Some(error), status)
                    }
                    Err(e) => {
                        warn!("{}: reference lookup failed: {}", object.target.identity(), e);
                        (None, ValidationStatus::ReferenceUnavailable)
                    }
                };

                ObjectSnapshot {
                    identity: object.target.identity().clone(),
                    state: object.state,
                    error_km,
                    status,
                }
            })
            .collect();

        TickSnapshot {
            elapsed_seconds: self.elapsed_seconds,
            objects,
        }
    }
}
