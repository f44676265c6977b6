//! Scheduling engine - Turns calendar drag-and-drop actions into bookings.
//!
//! The engine owns the week currently on screen (an optimistic local copy of the
//! store's bookings), its undo/redo history and a handle to the pending ledger. Each
//! mutating operation calls the [`BookingStore`], updates the local list, records a
//! snapshot and notifies the user. Every failure is reported to the
//! [`NotificationSink`] before it is returned.

use crate::{
    config::SchedulingConfig,
    core::{
        catalog::Catalog,
        history::UndoRedoController,
        holiday::HolidayCalendar,
        ledger::PendingTreatmentLedger,
        slot::{SlotAllocator, find_overlaps},
    },
    errors::{Error, Result},
    models::{
        Booking, BookingDraft, BookingId, BookingPatch, BookingStatus, PatientId,
        PendingTreatment, Severity, Therapy, TherapyId, TreatmentId,
    },
    store::{BookingStore, NotificationSink},
};
use chrono::{Days, NaiveDate, NaiveTime};
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

/// Ledger handle shared between the engine and the patient panel's +/- controls.
pub type SharedLedger = Arc<Mutex<PendingTreatmentLedger>>;

/// A pending bundle dragged onto a calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingDrop {
    /// Patient owning the bundle
    pub patient_id: PatientId,
    /// Bundle being scheduled
    pub treatment_id: TreatmentId,
    /// Day the bundle was dropped on
    pub date: NaiveDate,
}

/// A therapy chip dragged onto a patient, contracting one more session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatientDrop {
    /// Patient receiving the session
    pub patient_id: PatientId,
    /// Therapy contracted
    pub therapy_id: TherapyId,
}

/// A therapy chip dragged straight onto a calendar day for a patient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarDrop {
    /// Patient attending
    pub patient_id: PatientId,
    /// Therapy booked
    pub therapy_id: TherapyId,
    /// Day the chip was dropped on
    pub date: NaiveDate,
}

/// Status change applied to a selection of bookings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkAction {
    /// Mark every selected booking as completed
    Confirm,
    /// Delete every selected booking
    Cancel,
}

impl BulkAction {
    const fn past_tense(self) -> &'static str {
        match self {
            Self::Confirm => "confirmed",
            Self::Cancel => "cancelled",
        }
    }
}

/// One booking the bulk operation could not process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkFailure {
    /// Booking that failed
    pub booking_id: BookingId,
    /// Why it failed
    pub message: String,
}

/// Per-item result of a bulk transition. Partial success is expected, not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkOutcome {
    /// Number of distinct bookings attempted
    pub total: usize,
    /// Bookings processed successfully
    pub succeeded: Vec<BookingId>,
    /// Bookings that failed, with reasons
    pub failed: Vec<BulkFailure>,
}

impl BulkOutcome {
    /// True when every selected booking was processed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Human-readable `"2 of 3 sessions confirmed"` summary.
    #[must_use]
    pub fn summary(&self, action: BulkAction) -> String {
        if self.is_complete() {
            format!("{} sessions {}", self.total, action.past_tense())
        } else {
            format!(
                "{} of {} sessions {}; {} failed",
                self.succeeded.len(),
                self.total,
                action.past_tense(),
                self.failed.len()
            )
        }
    }
}

/// Orchestrates drag-and-drop scheduling over an injected store and notifier.
pub struct SchedulingEngine {
    store: Arc<dyn BookingStore>,
    notifier: Arc<dyn NotificationSink>,
    calendar: HolidayCalendar,
    catalog: Catalog,
    ledger: SharedLedger,
    bookings: Vec<Booking>,
    history: UndoRedoController<Vec<Booking>>,
    week_start: Option<NaiveDate>,
}

impl SchedulingEngine {
    /// Creates an engine with an empty catalog, ledger and booking list.
    #[must_use]
    pub fn new(
        store: Arc<dyn BookingStore>,
        notifier: Arc<dyn NotificationSink>,
        config: &SchedulingConfig,
    ) -> Self {
        Self {
            store,
            notifier,
            calendar: HolidayCalendar::from_config(config),
            catalog: Catalog::default(),
            ledger: Arc::new(Mutex::new(PendingTreatmentLedger::new())),
            bookings: Vec::new(),
            history: UndoRedoController::new(Vec::new(), config.history_capacity),
            week_start: None,
        }
    }

    /// Replaces the therapy and patient lookups.
    #[must_use]
    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Uses an existing ledger, e.g. one restored from saved bundles.
    #[must_use]
    pub fn with_ledger(mut self, ledger: PendingTreatmentLedger) -> Self {
        self.ledger = Arc::new(Mutex::new(ledger));
        self
    }

    /// Therapy and patient lookups used for validation and durations.
    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Mutable lookups, for the host application to refresh.
    pub const fn catalog_mut(&mut self) -> &mut Catalog {
        &mut self.catalog
    }

    /// Holiday calendar deciding opening times.
    #[must_use]
    pub const fn calendar(&self) -> &HolidayCalendar {
        &self.calendar
    }

    /// Mutable calendar, for adding or removing custom holidays.
    pub const fn calendar_mut(&mut self) -> &mut HolidayCalendar {
        &mut self.calendar
    }

    /// Handle to the pending ledger shared with other panels.
    #[must_use]
    pub fn ledger(&self) -> SharedLedger {
        Arc::clone(&self.ledger)
    }

    /// Bookings of the loaded week, ordered by date and start time.
    #[must_use]
    pub fn bookings(&self) -> &[Booking] {
        &self.bookings
    }

    /// Loaded bookings falling on `date`.
    #[must_use]
    pub fn bookings_on(&self, date: NaiveDate) -> Vec<&Booking> {
        self.bookings.iter().filter(|b| b.date == date).collect()
    }

    /// Monday of the loaded week, if any.
    #[must_use]
    pub const fn week_start(&self) -> Option<NaiveDate> {
        self.week_start
    }

    /// Whether [`Self::undo`] has an earlier snapshot to restore.
    #[must_use]
    pub const fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Whether [`Self::redo`] has an undone snapshot to re-apply.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Fetches the seven days starting at `week_start` and starts a fresh history.
    #[instrument(skip(self))]
    pub async fn load_week(&mut self, week_start: NaiveDate) -> Result<&[Booking]> {
        let week_end = week_start
            .checked_add_days(Days::new(6))
            .ok_or_else(|| Error::validation(format!("week starting {week_start} is out of range")));

        let loaded = match week_end {
            Ok(end) => self.store.list(week_start, end).await,
            Err(e) => Err(e),
        };

        match loaded {
            Ok(bookings) => {
                info!(count = bookings.len(), "Loaded week");
                self.bookings = bookings;
                self.sort_local();
                self.history.reset(self.bookings.clone());
                self.week_start = Some(week_start);
                Ok(&self.bookings)
            }
            Err(e) => self.report("Loading the week", e).await,
        }
    }

    /// Re-fetches the currently loaded week.
    pub async fn refresh(&mut self) -> Result<&[Booking]> {
        match self.week_start {
            Some(start) => self.load_week(start).await,
            None => self.report("Refreshing", Error::validation("no week loaded")).await,
        }
    }

    /// Contracts one more session of a therapy for a patient (therapy dropped on patient).
    #[instrument(skip(self))]
    pub async fn add_pending_from_therapy_drop(
        &mut self,
        payload: PatientDrop,
    ) -> Result<PendingTreatment> {
        let therapy = match self.resolve(payload.patient_id, payload.therapy_id) {
            Ok(therapy) => therapy.clone(),
            Err(e) => return self.report("Adding the session", e).await,
        };

        let today = chrono::Local::now().date_naive();
        let bundle = self
            .ledger
            .lock()
            .await
            .add_session(payload.patient_id, payload.therapy_id, today);

        self.notify(
            &format!(
                "{} now has {} pending session(s)",
                therapy.name, bundle.sessions_pending
            ),
            Severity::Success,
        )
        .await;
        Ok(bundle)
    }

    /// Manual +/- on a bundle. Returns `None` when the bundle was removed.
    #[instrument(skip(self))]
    pub async fn adjust_pending(
        &mut self,
        patient_id: PatientId,
        treatment_id: TreatmentId,
        delta: i64,
    ) -> Result<Option<PendingTreatment>> {
        let adjusted = self
            .ledger
            .lock()
            .await
            .adjust_sessions(patient_id, treatment_id, delta);

        match adjusted {
            Ok(Some(bundle)) => {
                self.notify(
                    &format!("{} pending session(s) left", bundle.sessions_pending),
                    Severity::Info,
                )
                .await;
                Ok(Some(bundle))
            }
            Ok(None) => {
                self.notify("Package removed: no sessions left", Severity::Info)
                    .await;
                Ok(None)
            }
            Err(e) => self.report("Updating the package", e).await,
        }
    }

    /// Schedules one session of a pending bundle on the dropped day.
    ///
    /// The session is appended after the day's latest booking and the bundle loses one
    /// session. If the bundle disappeared while the booking was being created, the
    /// booking is deleted again so the calendar and the ledger stay consistent.
    #[instrument(skip(self), fields(patient_id = payload.patient_id, treatment_id = payload.treatment_id, date = %payload.date))]
    pub async fn create_from_pending_drop(&mut self, payload: PendingDrop) -> Result<Booking> {
        match self.schedule_pending(payload).await {
            Ok(booking) => {
                self.after_insert(&booking).await;
                let remaining = self
                    .ledger
                    .lock()
                    .await
                    .get(payload.patient_id, payload.treatment_id)
                    .map_or(0, |b| b.sessions_pending);
                self.notify(
                    &format!(
                        "Session scheduled on {} at {} ({remaining} left in package)",
                        booking.date,
                        booking.start_label()
                    ),
                    Severity::Success,
                )
                .await;
                Ok(booking)
            }
            Err(e) => self.report("Scheduling the session", e).await,
        }
    }

    async fn schedule_pending(&self, payload: PendingDrop) -> Result<Booking> {
        let bundle = self
            .ledger
            .lock()
            .await
            .get(payload.patient_id, payload.treatment_id)
            .filter(|b| b.sessions_pending > 0)
            .cloned()
            .ok_or_else(|| Error::not_found("pending treatment", payload.treatment_id))?;

        let therapy = self.resolve(bundle.patient_id, bundle.therapy_id)?;
        let start_time = self.allocate(payload.date, therapy).await?;

        let booking = self
            .store
            .create(BookingDraft {
                patient_id: bundle.patient_id,
                therapy_id: bundle.therapy_id,
                date: payload.date,
                start_time,
                status: BookingStatus::Scheduled,
                notes: Some(format!("Scheduled from pending package #{}", bundle.id)),
            })
            .await?;

        let consumed = self
            .ledger
            .lock()
            .await
            .consume_one_session(bundle.patient_id, bundle.id);

        if let Err(e) = consumed {
            warn!(
                booking_id = booking.id,
                "Pending bundle vanished after booking was created, rolling back"
            );
            if let Err(rollback) = self.store.delete(booking.id).await {
                error!(booking_id = booking.id, "Rollback failed: {rollback}");
                return Err(Error::Store {
                    message: format!(
                        "booking #{} was created but its package is gone and it could not be removed: {rollback}",
                        booking.id
                    ),
                });
            }
            return Err(e);
        }

        Ok(booking)
    }

    /// Books a therapy for a patient directly from the therapy palette.
    #[instrument(skip(self))]
    pub async fn create_from_therapy_drop(&mut self, payload: CalendarDrop) -> Result<Booking> {
        let created = async {
            let therapy = self.resolve(payload.patient_id, payload.therapy_id)?;
            let start_time = self.allocate(payload.date, therapy).await?;
            self.store
                .create(BookingDraft {
                    patient_id: payload.patient_id,
                    therapy_id: payload.therapy_id,
                    date: payload.date,
                    start_time,
                    status: BookingStatus::Scheduled,
                    notes: None,
                })
                .await
        }
        .await;

        match created {
            Ok(booking) => {
                self.after_insert(&booking).await;
                self.notify(
                    &format!(
                        "Session scheduled on {} at {}",
                        booking.date,
                        booking.start_label()
                    ),
                    Severity::Success,
                )
                .await;
                Ok(booking)
            }
            Err(e) => self.report("Scheduling the session", e).await,
        }
    }

    /// Moves a booking to another day and time. Overlaps are warned about, not rejected.
    #[instrument(skip(self))]
    pub async fn move_booking(
        &mut self,
        booking_id: BookingId,
        new_date: NaiveDate,
        new_start_time: NaiveTime,
    ) -> Result<Booking> {
        let moved = self
            .store
            .update(booking_id, BookingPatch::reschedule(new_date, new_start_time))
            .await;

        match moved {
            Ok(booking) => {
                self.after_insert(&booking).await;
                self.notify(
                    &format!(
                        "Session moved to {} at {}",
                        booking.date,
                        booking.start_label()
                    ),
                    Severity::Success,
                )
                .await;
                Ok(booking)
            }
            Err(e) => self.report("Moving the session", e).await,
        }
    }

    /// Changes the status of one booking, refusing transitions out of terminal states.
    ///
    /// The current status is read from the store, not from the local list, since an
    /// undo may have rewound the local copy past a terminal change.
    #[instrument(skip(self))]
    pub async fn set_status(
        &mut self,
        booking_id: BookingId,
        status: BookingStatus,
    ) -> Result<Booking> {
        if let Err(e) = check_transition(self.store.as_ref(), booking_id, status).await {
            return self.report("Updating the status", e).await;
        }

        match self
            .store
            .update(booking_id, BookingPatch::status(status))
            .await
        {
            Ok(booking) => {
                self.upsert_local(booking.clone());
                self.commit();
                self.notify(&format!("Session marked as {status}"), Severity::Success)
                    .await;
                Ok(booking)
            }
            Err(e) => self.report("Updating the status", e).await,
        }
    }

    /// Deletes one booking.
    #[instrument(skip(self))]
    pub async fn delete_booking(&mut self, booking_id: BookingId) -> Result<()> {
        match self.store.delete(booking_id).await {
            Ok(()) => {
                self.remove_local(booking_id);
                self.commit();
                self.notify("Session removed", Severity::Success).await;
                Ok(())
            }
            Err(e) => self.report("Removing the session", e).await,
        }
    }

    /// Applies `action` to every selected booking in parallel.
    ///
    /// Each booking succeeds or fails on its own; all calls run to completion. The
    /// returned outcome lists both sides. Only an empty selection is an error.
    #[instrument(skip(self, booking_ids), fields(count = booking_ids.len()))]
    pub async fn bulk_transition(
        &mut self,
        booking_ids: &[BookingId],
        action: BulkAction,
    ) -> Result<BulkOutcome> {
        let mut ids: Vec<BookingId> = Vec::with_capacity(booking_ids.len());
        for id in booking_ids {
            if !ids.contains(id) {
                ids.push(*id);
            }
        }
        if ids.is_empty() {
            return self
                .report("Bulk update", Error::validation("no sessions selected"))
                .await;
        }

        let store = self.store.as_ref();
        let calls = ids.iter().map(|&id| async move {
            let result = match action {
                BulkAction::Confirm => {
                    match check_transition(store, id, BookingStatus::Completed).await {
                        Ok(()) => store
                            .update(id, BookingPatch::status(BookingStatus::Completed))
                            .await
                            .map(Some),
                        Err(e) => Err(e),
                    }
                }
                BulkAction::Cancel => store.delete(id).await.map(|()| None),
            };
            (id, result)
        });
        let results = join_all(calls).await;

        let mut outcome = BulkOutcome {
            total: ids.len(),
            ..BulkOutcome::default()
        };
        for (id, result) in results {
            match result {
                Ok(Some(updated)) => {
                    self.upsert_local(updated);
                    outcome.succeeded.push(id);
                }
                Ok(None) => {
                    self.remove_local(id);
                    outcome.succeeded.push(id);
                }
                Err(e) => {
                    warn!(booking_id = id, "Bulk item failed: {e}");
                    outcome.failed.push(BulkFailure {
                        booking_id: id,
                        message: e.to_string(),
                    });
                }
            }
        }

        if !outcome.succeeded.is_empty() {
            self.commit();
        }

        let severity = if outcome.is_complete() {
            Severity::Success
        } else if outcome.succeeded.is_empty() {
            Severity::Error
        } else {
            Severity::Warning
        };
        info!(
            succeeded = outcome.succeeded.len(),
            total = outcome.total,
            "Bulk transition finished"
        );
        self.notify(&outcome.summary(action), severity).await;
        Ok(outcome)
    }

    /// Restores the previous booking list. The pending ledger is not rolled back.
    pub async fn undo(&mut self) -> bool {
        let Some(previous) = self.history.undo().cloned() else {
            return false;
        };
        self.bookings = previous;
        self.notify("Change undone", Severity::Info).await;
        true
    }

    /// Re-applies the change last undone.
    pub async fn redo(&mut self) -> bool {
        let Some(next) = self.history.redo().cloned() else {
            return false;
        };
        self.bookings = next;
        self.notify("Change redone", Severity::Info).await;
        true
    }

    fn resolve(&self, patient_id: PatientId, therapy_id: TherapyId) -> Result<&Therapy> {
        self.catalog
            .patient(patient_id)
            .ok_or_else(|| Error::not_found("patient", patient_id))?;
        let therapy = self
            .catalog
            .therapy(therapy_id)
            .ok_or_else(|| Error::not_found("therapy", therapy_id))?;
        if !therapy.active {
            return Err(Error::validation(format!(
                "therapy '{}' is no longer offered",
                therapy.name
            )));
        }
        Ok(therapy)
    }

    async fn allocate(&self, date: NaiveDate, therapy: &Therapy) -> Result<NaiveTime> {
        let day = self.store.list(date, date).await?;
        SlotAllocator::new(&self.calendar, &self.catalog).next_slot(
            &day,
            therapy.duration_minutes(),
            date,
        )
    }

    async fn after_insert(&mut self, booking: &Booking) {
        self.upsert_local(booking.clone());
        self.commit();

        let same_day: Vec<Booking> = self
            .bookings
            .iter()
            .filter(|b| b.date == booking.date)
            .cloned()
            .collect();
        let clashes = find_overlaps(&same_day, &self.catalog)
            .into_iter()
            .filter(|(a, b)| *a == booking.id || *b == booking.id)
            .count();
        if clashes > 0 {
            self.notify(
                &format!(
                    "Session at {} on {} overlaps {clashes} other session(s)",
                    booking.start_label(),
                    booking.date
                ),
                Severity::Warning,
            )
            .await;
        }
    }

    fn in_loaded_week(&self, date: NaiveDate) -> bool {
        self.week_start.is_none_or(|start| {
            date >= start
                && start
                    .checked_add_days(Days::new(6))
                    .is_none_or(|end| date <= end)
        })
    }

    /// Replaces or inserts `booking` locally; a booking outside the loaded week leaves
    /// the view instead.
    fn upsert_local(&mut self, booking: Booking) {
        if !self.in_loaded_week(booking.date) {
            self.remove_local(booking.id);
            return;
        }
        match self.bookings.iter_mut().find(|b| b.id == booking.id) {
            Some(existing) => *existing = booking,
            None => self.bookings.push(booking),
        }
        self.sort_local();
    }

    fn remove_local(&mut self, booking_id: BookingId) {
        self.bookings.retain(|b| b.id != booking_id);
    }

    fn sort_local(&mut self) {
        self.bookings.sort_by_key(|b| (b.date, b.start_time, b.id));
    }

    fn commit(&mut self) {
        self.history.push(self.bookings.clone());
        debug!(snapshots = self.history.len(), "Recorded snapshot");
    }

    async fn notify(&self, message: &str, severity: Severity) {
        self.notifier.notify(message, severity).await;
    }

    async fn report<T>(&self, action: &str, e: Error) -> Result<T> {
        warn!("{action} failed: {e}");
        self.notifier
            .notify(&format!("{action} failed: {e}"), Severity::Error)
            .await;
        Err(e)
    }
}

async fn check_transition(
    store: &dyn BookingStore,
    booking_id: BookingId,
    next: BookingStatus,
) -> Result<()> {
    let current = store.get(booking_id).await?;
    if current.status.can_transition_to(next) {
        Ok(())
    } else {
        Err(Error::validation(format!(
            "session #{booking_id} is {} and cannot become {next}",
            current.status
        )))
    }
}
