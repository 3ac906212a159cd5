// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Detects whether a date falls inside the most recent period.

use chrono::NaiveDate;

use crate::models::period::DEFAULT_PERIOD_LENGTH;
use crate::models::{CurrentPeriod, PeriodRecord};
use crate::time_utils::days_between;

/// Check `today` against a single period record.
///
/// An explicit end date is authoritative: once it has passed the period is
/// over, whatever the duration says. Without one, the stored duration (or
/// [`DEFAULT_PERIOD_LENGTH`]) bounds the flow window.
pub fn detect_current_period(record: &PeriodRecord, today: NaiveDate) -> CurrentPeriod {
    let day_offset = days_between(today, record.start_date) + 1;
    let duration = record.effective_duration();

    let is_on_period = match record.end_date {
        Some(end) => today <= end && day_offset >= 1,
        None => day_offset >= 1 && day_offset <= i64::from(duration),
    };

    CurrentPeriod {
        is_on_period,
        period_day: is_on_period.then_some(day_offset as u32),
        duration,
    }
}

/// [`detect_current_period`] on the newest record of a newest-first history.
pub fn detect_current_period_in(periods: &[PeriodRecord], today: NaiveDate) -> CurrentPeriod {
    match periods.first() {
        Some(latest) => detect_current_period(latest, today),
        None => CurrentPeriod {
            is_on_period: false,
            period_day: None,
            duration: DEFAULT_PERIOD_LENGTH,
        },
    }
}
