//! Therapy and patient lookups.
//!
//! The surrounding application owns therapies and patients and refreshes these maps
//! whenever its own lists change. Bookings and bundles only ever hold ids, so a therapy
//! whose color or duration is edited is picked up on the next lookup.

use crate::models::{Patient, PatientId, Therapy, TherapyId};
use std::collections::HashMap;

/// Id-keyed, read-mostly lookup of therapies and patients.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    therapies: HashMap<TherapyId, Therapy>,
    patients: HashMap<PatientId, Patient>,
}

impl Catalog {
    /// Creates a catalog from full therapy and patient lists.
    #[must_use]
    pub fn new(therapies: Vec<Therapy>, patients: Vec<Patient>) -> Self {
        let mut catalog = Self::default();
        catalog.replace_therapies(therapies);
        catalog.replace_patients(patients);
        catalog
    }

    /// Replaces every therapy with a freshly loaded list.
    pub fn replace_therapies(&mut self, therapies: Vec<Therapy>) {
        self.therapies = therapies.into_iter().map(|t| (t.id, t)).collect();
    }

    /// Replaces every patient with a freshly loaded list.
    pub fn replace_patients(&mut self, patients: Vec<Patient>) {
        self.patients = patients.into_iter().map(|p| (p.id, p)).collect();
    }

    /// Inserts or replaces one therapy.
    pub fn upsert_therapy(&mut self, therapy: Therapy) {
        self.therapies.insert(therapy.id, therapy);
    }

    /// Inserts or replaces one patient.
    pub fn upsert_patient(&mut self, patient: Patient) {
        self.patients.insert(patient.id, patient);
    }

    /// Therapy by id.
    #[must_use]
    pub fn therapy(&self, id: TherapyId) -> Option<&Therapy> {
        self.therapies.get(&id)
    }

    /// Patient by id.
    #[must_use]
    pub fn patient(&self, id: PatientId) -> Option<&Patient> {
        self.patients.get(&id)
    }

    /// Active therapies ordered by name, as shown in the drag palette.
    #[must_use]
    pub fn active_therapies(&self) -> Vec<&Therapy> {
        let mut therapies: Vec<&Therapy> = self.therapies.values().filter(|t| t.active).collect();
        therapies.sort_by(|a, b| a.name.cmp(&b.name));
        therapies
    }
}
