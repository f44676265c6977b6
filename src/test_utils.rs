//! Shared test utilities for the therapy scheduler.
//!
//! Fixtures for dates, a small catalog, scripted stores and a recording notifier, so
//! engine tests can observe both the store and the user-facing messages.

#![allow(clippy::unwrap_used)]

use crate::{
    config::SchedulingConfig,
    core::{
        catalog::Catalog,
        engine::{SchedulingEngine, SharedLedger},
    },
    errors::{Error, Result},
    models::{
        Booking, BookingDraft, BookingId, BookingPatch, BookingStatus, Patient, PatientId,
        Severity, Therapy, TherapyId,
    },
    store::{BookingStore, MemoryBookingStore, NotificationSink},
};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use sea_orm::DatabaseConnection;
use std::{collections::HashSet, sync::Arc};
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub const PATIENT_ANA: PatientId = 1;
pub const PATIENT_BRUNO: PatientId = 2;
/// 60 minute therapy
pub const THERAPY_PSICO: TherapyId = 10;
/// 40 minute therapy
pub const THERAPY_FONO: TherapyId = 11;
/// No longer offered
pub const THERAPY_INACTIVE: TherapyId = 12;

pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trace")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with the bookings table.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn therapy(id: TherapyId, name: &str, duration: &str, active: bool) -> Therapy {
    Therapy {
        id,
        name: name.to_string(),
        color: "#4f8a8b".to_string(),
        duration: duration.to_string(),
        price: 150.0,
        active,
    }
}

fn patient(id: PatientId, name: &str) -> Patient {
    Patient {
        id,
        name: name.to_string(),
        phone: None,
        email: None,
        birth_date: None,
        active: true,
    }
}

/// Two patients and three therapies.
pub fn sample_catalog() -> Catalog {
    Catalog::new(
        vec![
            therapy(THERAPY_PSICO, "Psicologia", "60 min", true),
            therapy(THERAPY_FONO, "Fonoaudiologia", "40 min", true),
            therapy(THERAPY_INACTIVE, "Musicoterapia", "50 min", false),
        ],
        vec![patient(PATIENT_ANA, "Ana"), patient(PATIENT_BRUNO, "Bruno")],
    )
}

/// A stored booking for [`PATIENT_ANA`].
pub fn booking_at(id: BookingId, therapy_id: TherapyId, date: NaiveDate, start: NaiveTime) -> Booking {
    Booking {
        id,
        patient_id: PATIENT_ANA,
        therapy_id,
        date,
        start_time: start,
        status: BookingStatus::Scheduled,
        notes: None,
    }
}

pub fn draft(
    patient_id: PatientId,
    therapy_id: TherapyId,
    date: NaiveDate,
    start: NaiveTime,
) -> BookingDraft {
    BookingDraft {
        patient_id,
        therapy_id,
        date,
        start_time: start,
        status: BookingStatus::Scheduled,
        notes: None,
    }
}

/// Notification sink that keeps every message for later assertions.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<(String, Severity)>>,
}

impl RecordingNotifier {
    pub async fn count(&self, severity: Severity) -> usize {
        self.messages
            .lock()
            .await
            .iter()
            .filter(|(_, s)| *s == severity)
            .count()
    }

    pub async fn last(&self) -> Option<(String, Severity)> {
        self.messages.lock().await.last().cloned()
    }
}

#[async_trait]
impl NotificationSink for RecordingNotifier {
    async fn notify(&self, message: &str, severity: Severity) {
        self.messages
            .lock()
            .await
            .push((message.to_string(), severity));
    }
}

fn injected_failure(what: &str) -> Error {
    Error::Store {
        message: format!("injected {what} failure"),
    }
}

/// Memory store that fails creates or selected ids on demand.
#[derive(Debug, Default)]
pub struct FailingStore {
    inner: MemoryBookingStore,
    fail_creates: bool,
    failing_ids: Mutex<HashSet<BookingId>>,
}

impl FailingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_creates(mut self) -> Self {
        self.fail_creates = true;
        self
    }

    pub async fn fail_id(&self, id: BookingId) {
        self.failing_ids.lock().await.insert(id);
    }

    pub const fn inner(&self) -> &MemoryBookingStore {
        &self.inner
    }

    async fn check(&self, id: BookingId, what: &str) -> Result<()> {
        if self.failing_ids.lock().await.contains(&id) {
            return Err(injected_failure(what));
        }
        Ok(())
    }
}

#[async_trait]
impl BookingStore for FailingStore {
    async fn list(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Booking>> {
        self.inner.list(start, end).await
    }

    async fn get(&self, id: BookingId) -> Result<Booking> {
        self.inner.get(id).await
    }

    async fn create(&self, draft: BookingDraft) -> Result<Booking> {
        if self.fail_creates {
            return Err(injected_failure("create"));
        }
        self.inner.create(draft).await
    }

    async fn update(&self, id: BookingId, patch: BookingPatch) -> Result<Booking> {
        self.check(id, "update").await?;
        self.inner.update(id, patch).await
    }

    async fn delete(&self, id: BookingId) -> Result<()> {
        self.check(id, "delete").await?;
        self.inner.delete(id).await
    }
}

/// Memory store that empties the patient's pending bundles while a booking is being
/// created, like a manual "-" on the patient panel racing a drop.
#[derive(Debug, Default)]
pub struct VanishingLedgerStore {
    inner: MemoryBookingStore,
    ledger: Mutex<Option<SharedLedger>>,
    fail_deletes: bool,
}

impl VanishingLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also refuses every delete, so the booking cannot be rolled back.
    pub fn fail_deletes(mut self) -> Self {
        self.fail_deletes = true;
        self
    }

    pub async fn watch(&self, ledger: SharedLedger) {
        *self.ledger.lock().await = Some(ledger);
    }

    pub const fn inner(&self) -> &MemoryBookingStore {
        &self.inner
    }
}

#[async_trait]
impl BookingStore for VanishingLedgerStore {
    async fn list(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Booking>> {
        self.inner.list(start, end).await
    }

    async fn get(&self, id: BookingId) -> Result<Booking> {
        self.inner.get(id).await
    }

    async fn create(&self, draft: BookingDraft) -> Result<Booking> {
        let patient_id = draft.patient_id;
        let booking = self.inner.create(draft).await?;
        if let Some(ledger) = self.ledger.lock().await.as_ref() {
            let mut ledger = ledger.lock().await;
            let ids: Vec<_> = ledger.for_patient(patient_id).iter().map(|b| b.id).collect();
            for id in ids {
                ledger.remove(patient_id, id);
            }
        }
        Ok(booking)
    }

    async fn update(&self, id: BookingId, patch: BookingPatch) -> Result<Booking> {
        self.inner.update(id, patch).await
    }

    async fn delete(&self, id: BookingId) -> Result<()> {
        if self.fail_deletes {
            return Err(injected_failure("delete"));
        }
        self.inner.delete(id).await
    }
}

/// Engine over `store` with [`sample_catalog`], default hours and a recording notifier.
pub fn setup_engine<S: BookingStore + 'static>(
    store: S,
) -> (SchedulingEngine, Arc<S>, Arc<RecordingNotifier>) {
    let store = Arc::new(store);
    let notifier = Arc::new(RecordingNotifier::default());
    let engine = SchedulingEngine::new(
        Arc::clone(&store) as Arc<dyn BookingStore>,
        Arc::clone(&notifier) as Arc<dyn NotificationSink>,
        &SchedulingConfig::default(),
    )
    .with_catalog(sample_catalog());
    (engine, store, notifier)
}
