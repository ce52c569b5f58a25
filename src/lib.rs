pub mod catalog;
pub mod constants;
pub mod integrators;
pub mod models;
pub mod physics;
pub mod simulation;
