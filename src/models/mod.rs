pub mod identity;
pub mod state;
pub mod trajectory;

pub use identity::ObjectIdentity;
pub use state::State;
pub use trajectory::{Trajectory, TrajectorySample};
