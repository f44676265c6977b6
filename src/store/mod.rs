//! Store and notification seams consumed by the scheduling engine.
//!
//! The engine never talks to a database or a UI directly. It is handed a
//! [`BookingStore`] and a [`NotificationSink`] and treats every call on them as an
//! asynchronous boundary.

/// SeaORM-backed booking store
pub mod database;
/// Process-local booking store
pub mod memory;
/// Notification sinks
pub mod notify;

pub use database::DatabaseBookingStore;
pub use memory::MemoryBookingStore;
pub use notify::TracingNotifier;

use crate::{
    errors::Result,
    models::{Booking, BookingDraft, BookingId, BookingPatch, Severity},
};
use async_trait::async_trait;
use chrono::NaiveDate;

/// Persistence of booking records.
///
/// Adapters report persistence failures as [`crate::errors::Error::Store`] and missing
/// records as [`crate::errors::Error::NotFound`]; they never panic on either.
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Bookings with `start <= date <= end`, ordered by date then start time.
    async fn list(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Booking>>;

    /// The stored booking with `id`.
    async fn get(&self, id: BookingId) -> Result<Booking>;

    /// Persists a new booking and returns it with its assigned id.
    async fn create(&self, draft: BookingDraft) -> Result<Booking>;

    /// Applies a partial update and returns the updated booking.
    async fn update(&self, id: BookingId, patch: BookingPatch) -> Result<Booking>;

    /// Removes a booking permanently.
    async fn delete(&self, id: BookingId) -> Result<()>;
}

/// Receiver of user-facing messages. Fire-and-forget.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Shows `message` to the user.
    async fn notify(&self, message: &str, severity: Severity);
}
