//! Slot allocation for new bookings.
//!
//! Allocation is append-only: a new session starts where the latest-starting booking
//! of the day ends. Gaps between earlier bookings are never filled, and an empty day
//! starts at the calendar's opening time.

use crate::{
    core::{catalog::Catalog, holiday::HolidayCalendar},
    errors::{Error, Result},
    models::{Booking, BookingId, DEFAULT_DURATION_MINUTES},
};
use chrono::{NaiveDate, NaiveTime, Timelike};
use tracing::{debug, warn};

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Reads the leading integer of a free-text duration such as `"60 min"` or `"45"`.
///
/// Text without a leading number, or a zero, yields [`DEFAULT_DURATION_MINUTES`].
#[must_use]
pub fn parse_duration_minutes(text: &str) -> u32 {
    let digits: String = text
        .trim_start()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();

    match digits.parse::<u32>() {
        Ok(minutes) if minutes > 0 => minutes,
        _ => DEFAULT_DURATION_MINUTES,
    }
}

/// Duration of a booking's therapy, or the default when the therapy is unknown.
#[must_use]
pub fn booking_duration(booking: &Booking, catalog: &Catalog) -> u32 {
    catalog.therapy(booking.therapy_id).map_or_else(
        || {
            warn!(
                booking_id = booking.id,
                therapy_id = booking.therapy_id,
                "Therapy missing from catalog, assuming {DEFAULT_DURATION_MINUTES} minutes"
            );
            DEFAULT_DURATION_MINUTES
        },
        crate::models::Therapy::duration_minutes,
    )
}

fn minutes_since_midnight(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

/// Computes start times for new bookings on a single day.
#[derive(Debug, Clone, Copy)]
pub struct SlotAllocator<'a> {
    calendar: &'a HolidayCalendar,
    catalog: &'a Catalog,
}

impl<'a> SlotAllocator<'a> {
    /// Allocator over a calendar and the catalog used for durations.
    #[must_use]
    pub const fn new(calendar: &'a HolidayCalendar, catalog: &'a Catalog) -> Self {
        Self { calendar, catalog }
    }

    /// Returns the start time for a new session of `new_duration_minutes` on `date`.
    ///
    /// `existing_for_day` must hold the bookings already on `date`; their order does
    /// not matter.
    ///
    /// # Errors
    /// - [`Error::Validation`] if `new_duration_minutes` is zero
    /// - [`Error::Validation`] if appending would start at or after midnight
    pub fn next_slot(
        &self,
        existing_for_day: &[Booking],
        new_duration_minutes: u32,
        date: NaiveDate,
    ) -> Result<NaiveTime> {
        if new_duration_minutes == 0 {
            return Err(Error::validation("therapy duration must be positive"));
        }

        let Some(last) = existing_for_day.iter().max_by_key(|b| b.start_time) else {
            let opening = self.calendar.default_opening_time(date);
            debug!(%date, %opening, "Empty day, using opening time");
            return Ok(opening);
        };

        let start = minutes_since_midnight(last.start_time) + booking_duration(last, self.catalog);
        if start >= MINUTES_PER_DAY {
            return Err(Error::validation(format!(
                "no room left on {date}: the last session ends after midnight"
            )));
        }

        debug!(%date, after_booking = last.id, start, "Appending after latest booking");
        NaiveTime::from_hms_opt(start / 60, start % 60, 0)
            .ok_or_else(|| Error::validation(format!("invalid start minute {start}")))
    }
}

/// Pairs of bookings on the same date whose `[start, start + duration)` windows intersect.
///
/// Overlaps are reported, never rejected: staff may double-book on purpose.
#[must_use]
pub fn find_overlaps(bookings: &[Booking], catalog: &Catalog) -> Vec<(BookingId, BookingId)> {
    let mut sorted: Vec<&Booking> = bookings.iter().collect();
    sorted.sort_by_key(|b| (b.date, b.start_time));

    let mut overlaps = Vec::new();
    for (i, first) in sorted.iter().enumerate() {
        let first_end = minutes_since_midnight(first.start_time) + booking_duration(first, catalog);
        for second in sorted[i + 1..].iter().take_while(|b| b.date == first.date) {
            if minutes_since_midnight(second.start_time) < first_end {
                overlaps.push((first.id, second.id));
            }
        }
    }
    overlaps
}
