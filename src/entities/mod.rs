//! Entity module - SeaORM entity definitions backing the database booking store.
//! Each entity has a Model struct for data and an Entity struct for operations.

/// `bookings` table
pub mod booking;

pub use booking::{Column as BookingColumn, Entity as Booking, Model as BookingModel};
