//! Pending treatment ledger - Contracted sessions not yet on the calendar.
//!
//! Each patient owns at most one bundle per therapy. Dropping a therapy on a patient
//! adds a session (merging into an existing bundle), scheduling consumes one, and a
//! bundle that reaches zero is removed rather than kept at zero.

use crate::{
    errors::{Error, Result},
    models::{PatientId, PendingTreatment, TherapyId, TreatmentId},
};
use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::{debug, info};

/// Per-patient map of therapy bundles with their remaining session counts.
#[derive(Debug, Clone, Default)]
pub struct PendingTreatmentLedger {
    bundles: HashMap<PatientId, Vec<PendingTreatment>>,
    last_id: TreatmentId,
}

impl PendingTreatmentLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a ledger from previously saved bundles, dropping any with zero sessions.
    #[must_use]
    pub fn from_bundles(bundles: Vec<PendingTreatment>) -> Self {
        let mut ledger = Self::default();
        for bundle in bundles.into_iter().filter(|b| b.sessions_pending > 0) {
            ledger.last_id = ledger.last_id.max(bundle.id);
            ledger.bundles.entry(bundle.patient_id).or_default().push(bundle);
        }
        ledger
    }

    /// Adds one session of `therapy_id` for `patient_id`.
    ///
    /// Increments the existing bundle for the pair, or creates a new one with a single
    /// session contracted on `today`.
    pub fn add_session(
        &mut self,
        patient_id: PatientId,
        therapy_id: TherapyId,
        today: NaiveDate,
    ) -> PendingTreatment {
        let bundles = self.bundles.entry(patient_id).or_default();

        if let Some(existing) = bundles.iter_mut().find(|b| b.therapy_id == therapy_id) {
            existing.sessions_pending += 1;
            debug!(
                patient_id,
                therapy_id,
                sessions_pending = existing.sessions_pending,
                "Merged session into existing bundle"
            );
            return existing.clone();
        }

        self.last_id += 1;
        let bundle = PendingTreatment {
            id: self.last_id,
            patient_id,
            therapy_id,
            sessions_pending: 1,
            contracted_date: today,
        };
        info!(patient_id, therapy_id, treatment_id = bundle.id, "Created pending bundle");
        bundles.push(bundle.clone());
        bundle
    }

    /// Adds `delta` sessions to a bundle.
    ///
    /// Returns the updated bundle, or `None` when the count fell to zero or below and the
    /// bundle was removed.
    ///
    /// # Errors
    /// [`Error::NotFound`] if the patient has no bundle with `treatment_id`.
    pub fn adjust_sessions(
        &mut self,
        patient_id: PatientId,
        treatment_id: TreatmentId,
        delta: i64,
    ) -> Result<Option<PendingTreatment>> {
        let bundles = self
            .bundles
            .get_mut(&patient_id)
            .ok_or_else(|| Error::not_found("pending treatment", treatment_id))?;
        let index = bundles
            .iter()
            .position(|b| b.id == treatment_id)
            .ok_or_else(|| Error::not_found("pending treatment", treatment_id))?;

        let remaining = i64::from(bundles[index].sessions_pending)
            .checked_add(delta)
            .ok_or_else(|| Error::validation(format!("cannot add {delta} sessions")))?;
        if remaining <= 0 {
            bundles.remove(index);
            if bundles.is_empty() {
                self.bundles.remove(&patient_id);
            }
            info!(patient_id, treatment_id, "Pending bundle exhausted and removed");
            return Ok(None);
        }

        let bundle = &mut bundles[index];
        bundle.sessions_pending = u32::try_from(remaining).map_err(|_| {
            Error::validation(format!("session count {remaining} is out of range"))
        })?;
        debug!(
            patient_id,
            treatment_id,
            sessions_pending = bundle.sessions_pending,
            "Adjusted pending bundle"
        );
        Ok(Some(bundle.clone()))
    }

    /// Takes one session out of a bundle, removing it when it was the last one.
    ///
    /// # Errors
    /// [`Error::NotFound`] if the bundle no longer exists.
    pub fn consume_one_session(
        &mut self,
        patient_id: PatientId,
        treatment_id: TreatmentId,
    ) -> Result<Option<PendingTreatment>> {
        self.adjust_sessions(patient_id, treatment_id, -1)
    }

    /// Removes a bundle regardless of its count.
    pub fn remove(
        &mut self,
        patient_id: PatientId,
        treatment_id: TreatmentId,
    ) -> Option<PendingTreatment> {
        let bundles = self.bundles.get_mut(&patient_id)?;
        let index = bundles.iter().position(|b| b.id == treatment_id)?;
        let removed = bundles.remove(index);
        if bundles.is_empty() {
            self.bundles.remove(&patient_id);
        }
        Some(removed)
    }

    /// Bundle `treatment_id` of `patient_id`, if it still exists.
    #[must_use]
    pub fn get(&self, patient_id: PatientId, treatment_id: TreatmentId) -> Option<&PendingTreatment> {
        self.bundles
            .get(&patient_id)?
            .iter()
            .find(|b| b.id == treatment_id)
    }

    /// Bundles owned by a patient, in creation order.
    #[must_use]
    pub fn for_patient(&self, patient_id: PatientId) -> &[PendingTreatment] {
        self.bundles.get(&patient_id).map_or(&[], Vec::as_slice)
    }

    /// Sum of pending sessions across a patient's bundles.
    #[must_use]
    pub fn total_pending(&self, patient_id: PatientId) -> u32 {
        self.for_patient(patient_id)
            .iter()
            .map(|b| b.sessions_pending)
            .sum()
    }

    /// Every bundle in the ledger, for persistence by the caller.
    #[must_use]
    pub fn all_bundles(&self) -> Vec<PendingTreatment> {
        let mut all: Vec<PendingTreatment> = self.bundles.values().flatten().cloned().collect();
        all.sort_by_key(|b| b.id);
        all
    }

    /// Number of bundles across all patients.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bundles.values().map(Vec::len).sum()
    }

    /// True when no patient has pending sessions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }
}
