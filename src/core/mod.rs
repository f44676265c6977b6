//! Core scheduling logic, independent of any UI or storage backend.

/// Therapy and patient lookups
pub mod catalog;
/// Drag-and-drop orchestration over the store and notifier seams
pub mod engine;
/// Bounded undo/redo of booking snapshots
pub mod history;
/// National and custom holidays, opening times
pub mod holiday;
/// Pending treatment bundles per patient
pub mod ledger;
/// Append-only slot allocation and overlap detection
pub mod slot;

pub use catalog::Catalog;
pub use engine::{
    BulkAction, BulkFailure, BulkOutcome, CalendarDrop, PatientDrop, PendingDrop,
    SchedulingEngine, SharedLedger,
};
pub use history::UndoRedoController;
pub use holiday::{HolidayCalendar, HolidayEntry};
pub use ledger::PendingTreatmentLedger;
pub use slot::{SlotAllocator, find_overlaps};
