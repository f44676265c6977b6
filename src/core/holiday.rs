//! Holiday calendar - Decides which opening-time policy applies to a date.
//!
//! The clinic opens early (09:00) on weekends and holidays and runs evening-only hours
//! (17:00) on ordinary weekdays. Holidays come from a fixed national table per year
//! plus clinic-specific entries that may recur annually.

use crate::config::{CustomHoliday, SchedulingConfig};
use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};

/// National holidays as `(year, month, day, name)`.
const NATIONAL_HOLIDAYS: &[(i32, u32, u32, &str)] = &[
    (2025, 1, 1, "Confraternização Universal"),
    (2025, 3, 3, "Carnaval"),
    (2025, 3, 4, "Carnaval"),
    (2025, 4, 18, "Sexta-feira Santa"),
    (2025, 4, 21, "Tiradentes"),
    (2025, 5, 1, "Dia do Trabalho"),
    (2025, 6, 19, "Corpus Christi"),
    (2025, 7, 11, "Feriado Municipal"),
    (2025, 9, 7, "Independência do Brasil"),
    (2025, 10, 12, "Nossa Senhora Aparecida"),
    (2025, 11, 2, "Finados"),
    (2025, 11, 15, "Proclamação da República"),
    (2025, 11, 20, "Dia da Consciência Negra"),
    (2025, 12, 25, "Natal"),
    (2026, 1, 1, "Confraternização Universal"),
    (2026, 2, 16, "Carnaval"),
    (2026, 2, 17, "Carnaval"),
    (2026, 4, 3, "Sexta-feira Santa"),
    (2026, 4, 21, "Tiradentes"),
    (2026, 5, 1, "Dia do Trabalho"),
    (2026, 6, 4, "Corpus Christi"),
    (2026, 7, 11, "Feriado Municipal"),
    (2026, 9, 7, "Independência do Brasil"),
    (2026, 10, 12, "Nossa Senhora Aparecida"),
    (2026, 11, 2, "Finados"),
    (2026, 11, 15, "Proclamação da República"),
    (2026, 11, 20, "Dia da Consciência Negra"),
    (2026, 12, 25, "Natal"),
];

/// A holiday occurrence on a concrete date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HolidayEntry {
    /// Date the holiday falls on
    pub date: NaiveDate,
    /// Display name
    pub name: String,
}

/// Holiday and opening-time lookup. Every date has an answer; no lookup fails.
#[derive(Debug, Clone)]
pub struct HolidayCalendar {
    weekday_opening: NaiveTime,
    holiday_opening: NaiveTime,
    custom: Vec<CustomHoliday>,
}

impl Default for HolidayCalendar {
    fn default() -> Self {
        Self::from_config(&SchedulingConfig::default())
    }
}

impl HolidayCalendar {
    /// Builds a calendar from the opening times and custom holidays in `config`.
    #[must_use]
    pub fn from_config(config: &SchedulingConfig) -> Self {
        Self {
            weekday_opening: config.weekday_opening,
            holiday_opening: config.holiday_opening,
            custom: config.holidays.clone(),
        }
    }

    /// True for national-table dates and clinic holidays.
    #[must_use]
    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holiday_name(date).is_some()
    }

    /// True on Saturdays and Sundays.
    #[must_use]
    pub fn is_weekend(&self, date: NaiveDate) -> bool {
        matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
    }

    /// First bookable time on `date`.
    #[must_use]
    pub fn default_opening_time(&self, date: NaiveDate) -> NaiveTime {
        if self.is_holiday(date) || self.is_weekend(date) {
            self.holiday_opening
        } else {
            self.weekday_opening
        }
    }

    /// Name of the holiday on `date`, national entries taking precedence.
    #[must_use]
    pub fn holiday_name(&self, date: NaiveDate) -> Option<&str> {
        NATIONAL_HOLIDAYS
            .iter()
            .find(|(y, m, d, _)| *y == date.year() && *m == date.month() && *d == date.day())
            .map(|(_, _, _, name)| *name)
            .or_else(|| {
                self.custom
                    .iter()
                    .find(|h| custom_matches(h, date))
                    .map(|h| h.name.as_str())
            })
    }

    /// Adds a clinic holiday. Re-adding the same date replaces the previous entry.
    pub fn add_custom_holiday(&mut self, holiday: CustomHoliday) {
        self.custom
            .retain(|h| !(h.date == holiday.date && h.recurring == holiday.recurring));
        self.custom.push(holiday);
    }

    /// Removes every clinic holiday that falls on `date`. Returns whether any was removed.
    pub fn remove_custom_holiday(&mut self, date: NaiveDate) -> bool {
        let before = self.custom.len();
        self.custom.retain(|h| !custom_matches(h, date));
        self.custom.len() != before
    }

    /// Clinic holidays currently configured.
    #[must_use]
    pub fn custom_holidays(&self) -> &[CustomHoliday] {
        &self.custom
    }

    /// All holidays falling in the given month, ordered by date.
    #[must_use]
    pub fn holidays_in_month(&self, year: i32, month: u32) -> Vec<HolidayEntry> {
        let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
            return Vec::new();
        };

        first
            .iter_days()
            .take_while(|d| d.month() == month)
            .filter_map(|date| {
                self.holiday_name(date).map(|name| HolidayEntry {
                    date,
                    name: name.to_string(),
                })
            })
            .collect()
    }
}

fn custom_matches(holiday: &CustomHoliday, date: NaiveDate) -> bool {
    if holiday.recurring {
        holiday.date.month() == date.month() && holiday.date.day() == date.day()
    } else {
        holiday.date == date
    }
}
