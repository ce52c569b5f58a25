use crate::physics::dynamics::EquationsOfMotion;
use crate::physics::errors::PropagationError;

/// Classic fixed-step fourth-order Runge-Kutta integrator over any
/// `EquationsOfMotion` system.
///
/// No adaptive step control: accuracy rests on the caller choosing `dt`
/// small relative to the orbital period. Local truncation error is O(dt⁵),
/// global error O(dt⁴).
pub struct Rk4<T: EquationsOfMotion> {
    eom: T,
}

impl<T: EquationsOfMotion> Rk4<T>
where
    T::State: Clone + std::ops::Add<Output = T::State> + std::ops::Mul<f64, Output = T::State>,
{
    pub fn new(eom: T) -> Self {
        Rk4 { eom }
    }

    /// Advances the state by a single step of size `dt` starting at time `t`.
    pub fn step(&self, t: f64, state: &T::State, dt: f64) -> Result<T::State, PropagationError> {
        let k1 = self.eom.compute_derivative(t, state)?;

        let state2 = state.clone() + k1.clone() * (dt / 2.0);
        let k2 = self.eom.compute_derivative(t + dt / 2.0, &state2)?;

        let state3 = state.clone() + k2.clone() * (dt / 2.0);
        let k3 = self.eom.compute_derivative(t + dt / 2.0, &state3)?;

        let state4 = state.clone() + k3.clone() * dt;
        let k4 = self.eom.compute_derivative(t + dt, &state4)?;

        // Midpoint slopes carry double weight.
        Ok(state.clone() + (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (dt / 6.0))
    }

    /// Propagates `num_steps` fixed steps from `initial`, returning exactly
    /// `num_steps + 1` states (the initial state included). The input is not
    /// mutated, and the step start time is recomputed as `i * dt` each
    /// iteration rather than accumulated.
    pub fn propagate(
        &self,
        initial: &T::State,
        dt: f64,
        num_steps: usize,
    ) -> Result<Vec<T::State>, PropagationError> {
        if dt <= 0.0 || !dt.is_finite() {
            return Err(PropagationError::NonPositiveStep { dt });
        }

        let mut history = Vec::with_capacity(num_steps + 1);
        history.push(initial.clone());

        let mut current = initial.clone();
        for i in 0..num_steps {
            let t = i as f64 * dt;
            current = self.step(t, &current, dt)?;
            history.push(current.clone());
        }

        Ok(history)
    }
}
