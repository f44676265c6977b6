//! In-memory [`BookingStore`] for offline sessions and tests.

use crate::{
    errors::{Error, Result},
    models::{Booking, BookingDraft, BookingId, BookingPatch},
    store::BookingStore,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::{debug, trace};

#[derive(Debug, Default)]
struct Inner {
    bookings: BTreeMap<BookingId, Booking>,
    last_id: BookingId,
}

/// Booking store kept in process memory, for offline sessions and tests.
#[derive(Debug, Default)]
pub struct MemoryBookingStore {
    inner: RwLock<Inner>,
}

impl MemoryBookingStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with existing bookings, keeping their ids.
    #[must_use]
    pub fn with_bookings(bookings: Vec<Booking>) -> Self {
        let last_id = bookings.iter().map(|b| b.id).max().unwrap_or(0);
        Self {
            inner: RwLock::new(Inner {
                bookings: bookings.into_iter().map(|b| (b.id, b)).collect(),
                last_id,
            }),
        }
    }

    /// Snapshot of every stored booking ordered by id.
    pub async fn all(&self) -> Vec<Booking> {
        self.inner.read().await.bookings.values().cloned().collect()
    }
}

#[async_trait]
impl BookingStore for MemoryBookingStore {
    async fn list(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Booking>> {
        let inner = self.inner.read().await;
        let mut found: Vec<Booking> = inner
            .bookings
            .values()
            .filter(|b| b.date >= start && b.date <= end)
            .cloned()
            .collect();
        found.sort_by_key(|b| (b.date, b.start_time, b.id));
        trace!(%start, %end, count = found.len(), "Listed bookings");
        Ok(found)
    }

    async fn get(&self, id: BookingId) -> Result<Booking> {
        self.inner
            .read()
            .await
            .bookings
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::not_found("booking", id))
    }

    async fn create(&self, draft: BookingDraft) -> Result<Booking> {
        let mut inner = self.inner.write().await;
        inner.last_id += 1;
        let booking = Booking {
            id: inner.last_id,
            patient_id: draft.patient_id,
            therapy_id: draft.therapy_id,
            date: draft.date,
            start_time: draft.start_time,
            status: draft.status,
            notes: draft.notes,
        };
        inner.bookings.insert(booking.id, booking.clone());
        debug!(booking_id = booking.id, "Stored booking in memory");
        Ok(booking)
    }

    async fn update(&self, id: BookingId, patch: BookingPatch) -> Result<Booking> {
        let mut inner = self.inner.write().await;
        let booking = inner
            .bookings
            .get_mut(&id)
            .ok_or_else(|| Error::not_found("booking", id))?;
        patch.apply_to(booking);
        Ok(booking.clone())
    }

    async fn delete(&self, id: BookingId) -> Result<()> {
        self.inner
            .write()
            .await
            .bookings
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| Error::not_found("booking", id))
    }
}
