/// Database configuration and connection management
pub mod database;

/// Scheduling policy loading from scheduling.toml
pub mod scheduling;

pub use scheduling::{CustomHoliday, SchedulingConfig};
