// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cycle length estimation from period history.

use crate::models::PeriodRecord;
use crate::time_utils::days_between;

/// Shortest gap between period starts treated as a real cycle.
pub const MIN_PLAUSIBLE_CYCLE: i64 = 18;
/// Longest gap between period starts treated as a real cycle.
pub const MAX_PLAUSIBLE_CYCLE: i64 = 45;

/// Day gaps between consecutive period starts that fall in the plausible range.
///
/// `periods` must be ordered newest first. Gaps outside
/// [`MIN_PLAUSIBLE_CYCLE`]..=[`MAX_PLAUSIBLE_CYCLE`] are data-entry noise
/// (missed logs, duplicates) and are dropped.
pub fn cycle_deltas(periods: &[PeriodRecord]) -> Vec<u32> {
    periods
        .windows(2)
        .filter_map(|pair| {
            let days = days_between(pair[0].start_date, pair[1].start_date);
            (MIN_PLAUSIBLE_CYCLE..=MAX_PLAUSIBLE_CYCLE)
                .contains(&days)
                .then_some(days as u32)
        })
        .collect()
}

/// Average cycle length in whole days, or `None` without enough history.
///
/// Needs at least two records and at least one plausible gap. Does not
/// deduplicate; see [`super::history::dedupe_periods`].
pub fn estimate_cycle_length(periods: &[PeriodRecord]) -> Option<u32> {
    if periods.len() < 2 {
        return None;
    }

    let deltas = cycle_deltas(periods);
    let average = rounded_mean(&deltas)?;

    tracing::debug!(
        average,
        cycles = deltas.len(),
        "Calculated cycle length"
    );

    Some(average)
}

/// Integer mean rounded half up, `None` for an empty slice.
pub(crate) fn rounded_mean(values: &[u32]) -> Option<u32> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as u64;
    let sum: u64 = values.iter().map(|&v| u64::from(v)).sum();
    Some(((2 * sum + n) / (2 * n)) as u32)
}
