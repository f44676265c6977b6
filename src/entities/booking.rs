//! Booking entity - One row per scheduled therapy session.
//!
//! Patients and therapies are referenced by id only; their records are owned by other
//! parts of the application. `status` is stored as its `snake_case` name.

use crate::models::{self, BookingDraft};
use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Booking database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bookings")]
pub struct Model {
    /// Unique identifier for the booking
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Patient attending the session
    pub patient_id: i64,
    /// Therapy being delivered
    pub therapy_id: i64,
    /// Local calendar date of the session
    pub date: Date,
    /// Local wall-clock start time
    pub start_time: Time,
    /// One of `scheduled`, `confirmed`, `completed`, `cancelled`, `no_show`
    pub status: String,
    /// Optional free-text notes
    pub notes: Option<String>,
}

/// Bookings have no relations inside this crate
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Converts the row into the domain type, validating the stored status.
    pub fn into_booking(self) -> crate::errors::Result<models::Booking> {
        Ok(models::Booking {
            id: self.id,
            patient_id: self.patient_id,
            therapy_id: self.therapy_id,
            date: self.date,
            start_time: self.start_time,
            status: self.status.parse()?,
            notes: self.notes,
        })
    }
}

impl From<BookingDraft> for ActiveModel {
    fn from(draft: BookingDraft) -> Self {
        Self {
            patient_id: Set(draft.patient_id),
            therapy_id: Set(draft.therapy_id),
            date: Set(draft.date),
            start_time: Set(draft.start_time),
            status: Set(draft.status.as_str().to_string()),
            notes: Set(draft.notes),
            ..Default::default()
        }
    }
}
