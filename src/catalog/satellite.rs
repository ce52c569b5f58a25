use crate::constants::SECONDS_PER_MINUTE;
use crate::models::{ObjectIdentity, State};
use crate::simulation::{
    InitialStateProvider, ReferencePropagator, ValidatedObject, ValidationError,
};
use chrono::{Datelike, Timelike};
use hifitime::Epoch;
use nalgebra as na;

/// One cataloged object: identity, TLE epoch, and the parsed mean elements.
///
/// The entry doubles as the core's translator and reference collaborators:
/// SGP4 evaluated at the epoch supplies the integrator's initial condition,
/// and SGP4 evaluated at later timestamps supplies the independent
/// validation trajectory.
#[derive(Debug)]
pub struct SatelliteEntry {
    identity: ObjectIdentity,
    epoch: Epoch,
    elements: sgp4::Elements,
}

impl SatelliteEntry {
    pub fn from_elements(elements: sgp4::Elements) -> Self {
        let name = elements
            .object_name
            .clone()
            .unwrap_or_else(|| format!("OBJECT {}", elements.norad_id));
        let identity = ObjectIdentity::new(name, elements.norad_id);
        let epoch = epoch_from_datetime(&elements.datetime);
        SatelliteEntry {
            identity,
            epoch,
            elements,
        }
    }

    pub fn identity(&self) -> &ObjectIdentity {
        &self.identity
    }

    /// Absolute time of the element set's reference instant.
    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    fn prediction_at(&self, minutes: f64) -> Result<sgp4::Prediction, ValidationError> {
        let constants = sgp4::Constants::from_elements(&self.elements)
            .map_err(|e| ValidationError::ReferenceUnavailable(e.to_string()))?;
        constants
            .propagate(sgp4::MinutesSinceEpoch(minutes))
            .map_err(|e| ValidationError::ReferenceUnavailable(e.to_string()))
    }
}

impl InitialStateProvider for SatelliteEntry {
    /// Cartesian state at the TLE epoch (km, km/s), via SGP4 at t = 0.
    fn initial_state(&self) -> Result<(Epoch, State), ValidationError> {
        let prediction = self
            .prediction_at(0.0)
            .map_err(|e| ValidationError::InitialStateUnavailable(e.to_string()))?;
        Ok((
            self.epoch,
            State::new(
                na::Vector3::from(prediction.position),
                na::Vector3::from(prediction.velocity),
            ),
        ))
    }
}

impl ReferencePropagator for SatelliteEntry {
    fn position_at(&self, timestamp: Epoch) -> Result<na::Vector3<f64>, ValidationError> {
        let elapsed_seconds = timestamp.to_unix_seconds() - self.epoch.to_unix_seconds();
        let prediction = self.prediction_at(elapsed_seconds / SECONDS_PER_MINUTE)?;
        Ok(na::Vector3::from(prediction.position))
    }
}

impl ValidatedObject for SatelliteEntry {
    fn identity(&self) -> &ObjectIdentity {
        &self.identity
    }
}

fn epoch_from_datetime(datetime: &chrono::NaiveDateTime) -> Epoch {
    Epoch::from_gregorian_utc(
        datetime.year(),
        datetime.month() as u8,
        datetime.day() as u8,
        datetime.hour() as u8,
        datetime.minute() as u8,
        datetime.second() as u8,
        datetime.nanosecond(),
    )
}

/// Case-insensitive substring match on the object name, the common way to
/// pick a constellation out of the full catalog.
pub fn name_matches(entry: &SatelliteEntry, pattern: &str) -> bool {
    entry
        .identity
        .name
        .to_ascii_lowercase()
        .contains(&pattern.to_ascii_lowercase())
}

/// Retains the entries satisfying a plain predicate. No tabular abstraction;
/// the catalog is just an in-memory collection.
pub fn filter_catalog<F>(entries: Vec<SatelliteEntry>, predicate: F) -> Vec<SatelliteEntry>
where
    F: Fn(&SatelliteEntry) -> bool,
{
    entries.into_iter().filter(|entry| predicate(entry)).collect()
}
