pub mod dynamics;
pub mod energy;
pub mod errors;
pub mod gravity;

pub use errors::PropagationError;
pub use gravity::GravityModel;
