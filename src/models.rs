//! Domain types shared by the scheduling core, the store adapters and callers.
//!
//! Bookings reference patients and therapies by id only; the records themselves live
//! in [`crate::core::catalog::Catalog`].

use crate::errors::{Error, Result};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Identifier of a [`Booking`], assigned by the store.
pub type BookingId = i64;
/// Identifier of a [`Patient`].
pub type PatientId = i64;
/// Identifier of a [`Therapy`].
pub type TherapyId = i64;
/// Identifier of a [`PendingTreatment`] bundle.
pub type TreatmentId = i64;

/// Minutes assumed for a therapy whose duration text carries no number.
pub const DEFAULT_DURATION_MINUTES: u32 = 60;

/// Lifecycle state of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Newly created, awaiting confirmation
    #[default]
    Scheduled,
    /// Confirmed by the patient or staff
    Confirmed,
    /// Session took place
    Completed,
    /// Session was called off
    Cancelled,
    /// Patient did not attend
    NoShow,
}

impl BookingStatus {
    /// Stable string form used in storage and serialization.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::NoShow => "no_show",
        }
    }

    /// Terminal states admit no further transition.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::NoShow)
    }

    /// Whether a booking in this state may move to `next`.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        match self {
            Self::Scheduled => next != Self::Scheduled,
            Self::Confirmed => next.is_terminal(),
            Self::Completed | Self::Cancelled | Self::NoShow => false,
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "scheduled" => Ok(Self::Scheduled),
            "confirmed" => Ok(Self::Confirmed),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            "no_show" => Ok(Self::NoShow),
            other => Err(Error::validation(format!("unknown booking status '{other}'"))),
        }
    }
}

/// A scheduled therapy session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    /// Store-assigned identifier
    pub id: BookingId,
    /// Patient attending the session
    pub patient_id: PatientId,
    /// Therapy being delivered
    pub therapy_id: TherapyId,
    /// Local calendar date
    pub date: NaiveDate,
    /// Local wall-clock start time
    pub start_time: NaiveTime,
    /// Current lifecycle state
    pub status: BookingStatus,
    /// Free-text notes
    pub notes: Option<String>,
}

impl Booking {
    /// Start time rendered as zero-padded `HH:MM`.
    #[must_use]
    pub fn start_label(&self) -> String {
        self.start_time.format("%H:%M").to_string()
    }
}

/// A booking that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingDraft {
    /// Patient attending the session
    pub patient_id: PatientId,
    /// Therapy being delivered
    pub therapy_id: TherapyId,
    /// Local calendar date
    pub date: NaiveDate,
    /// Local wall-clock start time
    pub start_time: NaiveTime,
    /// Initial state, normally [`BookingStatus::Scheduled`]
    pub status: BookingStatus,
    /// Free-text notes
    pub notes: Option<String>,
}

/// Partial update applied by [`crate::store::BookingStore::update`]. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingPatch {
    /// New date
    pub date: Option<NaiveDate>,
    /// New start time
    pub start_time: Option<NaiveTime>,
    /// New status
    pub status: Option<BookingStatus>,
    /// Replacement notes
    pub notes: Option<String>,
}

impl BookingPatch {
    /// Patch that reschedules to a new date and start time.
    #[must_use]
    pub fn reschedule(date: NaiveDate, start_time: NaiveTime) -> Self {
        Self {
            date: Some(date),
            start_time: Some(start_time),
            ..Self::default()
        }
    }

    /// Patch that only changes the status.
    #[must_use]
    pub fn status(status: BookingStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Applies the patch to a booking in place.
    pub fn apply_to(&self, booking: &mut Booking) {
        if let Some(date) = self.date {
            booking.date = date;
        }
        if let Some(start_time) = self.start_time {
            booking.start_time = start_time;
        }
        if let Some(status) = self.status {
            booking.status = status;
        }
        if let Some(notes) = &self.notes {
            booking.notes = Some(notes.clone());
        }
    }
}

/// A contracted-but-unscheduled bundle of sessions for one (patient, therapy) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTreatment {
    /// Ledger-assigned identifier
    pub id: TreatmentId,
    /// Owning patient
    pub patient_id: PatientId,
    /// Contracted therapy
    pub therapy_id: TherapyId,
    /// Sessions still to be scheduled; never zero while stored
    pub sessions_pending: u32,
    /// Date the bundle was first contracted
    pub contracted_date: NaiveDate,
}

/// Therapy catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Therapy {
    /// Catalog identifier
    pub id: TherapyId,
    /// Display name
    pub name: String,
    /// Display color (e.g. `"#4f46e5"`)
    pub color: String,
    /// Free-text duration as entered in the catalog, e.g. `"60 min"`
    pub duration: String,
    /// Session price
    pub price: f64,
    /// Whether the therapy can still be booked
    pub active: bool,
}

impl Therapy {
    /// Session length in minutes, parsed from the free-text duration.
    #[must_use]
    pub fn duration_minutes(&self) -> u32 {
        crate::core::slot::parse_duration_minutes(&self.duration)
    }
}

/// Patient record as needed by the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    /// Identifier
    pub id: PatientId,
    /// Full name
    pub name: String,
    /// Contact phone
    pub phone: Option<String>,
    /// Contact email
    pub email: Option<String>,
    /// Date of birth
    pub birth_date: Option<NaiveDate>,
    /// Whether the patient is still under care
    pub active: bool,
}

/// Severity attached to a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Neutral information
    Info,
    /// Operation succeeded
    Success,
    /// Operation partially succeeded or needs attention
    Warning,
    /// Operation failed
    Error,
}
