pub mod rk4;

pub use rk4::Rk4;
