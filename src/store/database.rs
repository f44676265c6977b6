//! SeaORM implementation of [`BookingStore`].
//!
//! Every `DbErr` is reported as [`Error::Store`] so the engine can treat it as a
//! retryable adapter failure; missing rows are reported as [`Error::NotFound`].

use crate::{
    entities::{Booking as BookingEntity, BookingColumn, booking},
    errors::{Error, Result},
    models::{Booking, BookingDraft, BookingId, BookingPatch},
    store::BookingStore,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::{DatabaseConnection, DbErr, QueryOrder, Set, prelude::*};
use tracing::{debug, error, instrument};

fn store_error(e: DbErr) -> Error {
    error!("Booking store failure: {e}");
    Error::Store {
        message: e.to_string(),
    }
}

/// Booking store over a SeaORM connection.
#[derive(Debug, Clone)]
pub struct DatabaseBookingStore {
    db: DatabaseConnection,
}

impl DatabaseBookingStore {
    /// Wraps an open connection. Tables must already exist, see
    /// [`crate::config::database::create_tables`].
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Underlying SeaORM connection.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl BookingStore for DatabaseBookingStore {
    #[instrument(skip(self))]
    async fn list(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Booking>> {
        let rows = BookingEntity::find()
            .filter(BookingColumn::Date.gte(start))
            .filter(BookingColumn::Date.lte(end))
            .order_by_asc(BookingColumn::Date)
            .order_by_asc(BookingColumn::StartTime)
            .order_by_asc(BookingColumn::Id)
            .all(&self.db)
            .await
            .map_err(store_error)?;

        debug!(count = rows.len(), "Loaded bookings");
        rows.into_iter().map(booking::Model::into_booking).collect()
    }

    #[instrument(skip(self))]
    async fn get(&self, id: BookingId) -> Result<Booking> {
        BookingEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(store_error)?
            .ok_or_else(|| Error::not_found("booking", id))?
            .into_booking()
    }

    #[instrument(skip(self, draft), fields(patient_id = draft.patient_id, date = %draft.date))]
    async fn create(&self, draft: BookingDraft) -> Result<Booking> {
        let active: booking::ActiveModel = draft.into();
        let row = active.insert(&self.db).await.map_err(store_error)?;
        debug!(booking_id = row.id, "Inserted booking");
        row.into_booking()
    }

    #[instrument(skip(self, patch))]
    async fn update(&self, id: BookingId, patch: BookingPatch) -> Result<Booking> {
        let row = BookingEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(store_error)?
            .ok_or_else(|| Error::not_found("booking", id))?;

        let mut active: booking::ActiveModel = row.into();
        if let Some(date) = patch.date {
            active.date = Set(date);
        }
        if let Some(start_time) = patch.start_time {
            active.start_time = Set(start_time);
        }
        if let Some(status) = patch.status {
            active.status = Set(status.as_str().to_string());
        }
        if let Some(notes) = patch.notes {
            active.notes = Set(Some(notes));
        }

        active
            .update(&self.db)
            .await
            .map_err(store_error)?
            .into_booking()
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: BookingId) -> Result<()> {
        let result = BookingEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(store_error)?;

        if result.rows_affected == 0 {
            return Err(Error::not_found("booking", id));
        }
        Ok(())
    }
}
