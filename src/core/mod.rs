//! Engine facade and the stateless services it drives.

pub mod engine;
pub mod services;

pub use engine::{Engine, MaintenanceReport};
