// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Calendar month annotation.

use chrono::{Datelike, NaiveDate};

use crate::models::{CalendarDay, CycleEstimate, PeriodRecord, Phase};
use crate::services::cycle::phase::PhaseBoundaries;
use crate::time_utils::days_between;

/// Annotate every day of `year`-`month` (1-based month).
///
/// Logged periods are painted wherever they fall. Predicted periods are
/// painted only on dates after `today` that lie beyond the last known cycle,
/// so history is never overwritten by a guess. Returns an empty list for an
/// invalid month.
pub fn annotate_calendar_month(
    year: i32,
    month: u32,
    periods: &[PeriodRecord],
    estimate: &CycleEstimate,
    today: NaiveDate,
) -> Vec<CalendarDay> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        tracing::debug!(year, month, "Invalid calendar month");
        return Vec::new();
    };

    let bounds = PhaseBoundaries::for_estimate(estimate);

    first
        .iter_days()
        .take_while(|d| d.month() == month)
        .map(|date| annotate_day(date, periods, estimate, &bounds, today))
        .collect()
}

fn annotate_day(
    date: NaiveDate,
    periods: &[PeriodRecord],
    estimate: &CycleEstimate,
    bounds: &PhaseBoundaries,
    today: NaiveDate,
) -> CalendarDay {
    let is_logged_period = periods.iter().any(|p| p.contains(date));

    let Some(last_start) = estimate.last_period_start else {
        return CalendarDay {
            date,
            is_logged_period,
            is_predicted_period: false,
            is_fertile: false,
            is_ovulation: false,
            cycle_day: None,
            phase: if is_logged_period {
                Phase::Period
            } else {
                Phase::Unknown
            },
        };
    };

    let days_since = days_between(date, last_start);
    let cycle_day = days_since.rem_euclid(bounds.cycle_length) + 1;

    let is_predicted_period = !is_logged_period
        && date > today
        && days_since >= bounds.cycle_length
        && cycle_day <= i64::from(estimate.period_duration);

    let phase = if is_logged_period || is_predicted_period {
        Phase::Period
    } else {
        bounds.phase_on_day(cycle_day)
    };

    CalendarDay {
        date,
        is_logged_period,
        is_predicted_period,
        is_fertile: bounds.is_fertile(cycle_day),
        is_ovulation: bounds.is_ovulation(cycle_day),
        cycle_day: Some(cycle_day),
        phase,
    }
}
