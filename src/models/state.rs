use nalgebra as na;

/// Cartesian orbital state: position (km) and velocity (km/s) in the
/// Earth-centered inertial frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct State {
    pub position: na::Vector3<f64>,
    pub velocity: na::Vector3<f64>,
}

impl State {
    pub fn new(position: na::Vector3<f64>, velocity: na::Vector3<f64>) -> Self {
        State { position, velocity }
    }

    pub fn zero() -> Self {
        State {
            position: na::Vector3::zeros(),
            velocity: na::Vector3::zeros(),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.position.iter().all(|c| c.is_finite()) && self.velocity.iter().all(|c| c.is_finite())
    }
}

impl std::ops::Add for State {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        State {
            position: self.position + other.position,
            velocity: self.velocity + other.velocity,
        }
    }
}

impl std::ops::Mul<f64> for State {
    type Output = Self;

    fn mul(self, scalar: f64) -> Self {
        State {
            position: self.position * scalar,
            velocity: self.velocity * scalar,
        }
    }
}
