use crate::models::State;

/// One propagated sample: seconds since the object's epoch plus the full
/// Cartesian state at that instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectorySample {
    pub elapsed_seconds: f64,
    pub state: State,
}

/// Time-indexed propagation history. Samples start at elapsed time zero with
/// the initial state and are strictly increasing in time.
#[derive(Debug, Clone, Default)]
pub struct Trajectory {
    samples: Vec<TrajectorySample>,
}

impl Trajectory {
    pub fn empty() -> Self {
        Trajectory { samples: Vec::new() }
    }

    /// Builds a trajectory from integrator output, stamping each state with
    /// `i * dt`. Timestamps are recomputed per index rather than accumulated
    /// so the time axis carries no floating-point drift.
    pub fn from_states(states: Vec<State>, dt: f64) -> Self {
        let samples = states
            .into_iter()
            .enumerate()
            .map(|(i, state)| TrajectorySample {
                elapsed_seconds: i as f64 * dt,
                state,
            })
            .collect();
        Trajectory { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[TrajectorySample] {
        &self.samples
    }

    pub fn first(&self) -> Option<&TrajectorySample> {
        self.samples.first()
    }

    pub fn last(&self) -> Option<&TrajectorySample> {
        self.samples.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TrajectorySample> {
        self.samples.iter()
    }
}

impl<'a> IntoIterator for &'a Trajectory {
    type Item = &'a TrajectorySample;
    type IntoIter = std::slice::Iter<'a, TrajectorySample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamps_are_exact_multiples() {
        let states = vec![State::zero(); 61];
        let trajectory = Trajectory::from_states(states, 60.0);
        assert_eq!(trajectory.len(), 61);
        for (i, sample) in trajectory.iter().enumerate() {
            assert_eq!(sample.elapsed_seconds, i as f64 * 60.0);
        }
        assert_eq!(trajectory.last().unwrap().elapsed_seconds, 3600.0);
    }

    #[test]
    fn test_starts_at_zero() {
        let trajectory = Trajectory::from_states(vec![State::zero(); 3], 0.1);
        assert_eq!(trajectory.first().unwrap().elapsed_seconds, 0.0);
    }

    #[test]
    fn test_empty() {
        assert!(Trajectory::empty().is_empty());
        assert!(Trajectory::empty().last().is_none());
    }
}
