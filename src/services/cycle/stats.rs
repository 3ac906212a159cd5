// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cycle statistics and prediction confidence.

use chrono::NaiveDate;

use crate::models::cycle::DEFAULT_CYCLE_LENGTH;
use crate::models::period::DEFAULT_PERIOD_LENGTH;
use crate::models::{ConfidenceLevel, CycleStatistics, PeriodRecord, PredictionConfidence};
use crate::services::cycle::estimator::{cycle_deltas, rounded_mean};
use crate::time_utils::days_between;

/// Cycles whose lengths vary by less than this many days count as regular.
const REGULAR_STD_DEV_DAYS: f64 = 3.0;
/// History older than this no longer counts as recent.
const RECENT_DATA_DAYS: i64 = 60;

/// Compute statistics over a newest-first, deduplicated history.
///
/// Averages and extremes only use completed periods (those with an end date).
/// The confidence score looks at every record.
pub fn cycle_statistics(periods: &[PeriodRecord], today: NaiveDate) -> CycleStatistics {
    let completed: Vec<PeriodRecord> = periods
        .iter()
        .filter(|p| p.end_date.is_some())
        .cloned()
        .collect();

    let cycle_lengths = cycle_deltas(&completed);
    let durations: Vec<u32> = completed
        .iter()
        .filter_map(PeriodRecord::logged_duration)
        .collect();

    let std_dev = population_std_dev(&cycle_lengths);

    CycleStatistics {
        average_cycle_length: rounded_mean(&cycle_lengths).unwrap_or(DEFAULT_CYCLE_LENGTH),
        average_period_length: rounded_mean(&durations).unwrap_or(DEFAULT_PERIOD_LENGTH),
        shortest_cycle: cycle_lengths.iter().copied().min(),
        longest_cycle: cycle_lengths.iter().copied().max(),
        shortest_period: durations.iter().copied().min(),
        longest_period: durations.iter().copied().max(),
        total_completed_periods: completed.len() as u32,
        is_regular: cycle_lengths.len() >= 2 && std_dev < REGULAR_STD_DEV_DAYS,
        cycle_length_std_dev: std_dev,
        cycle_lengths,
        confidence: prediction_confidence(periods, today),
    }
}

/// Score how far predictions can be trusted, 0 to 100.
pub fn prediction_confidence(periods: &[PeriodRecord], today: NaiveDate) -> PredictionConfidence {
    let periods_logged = periods.len() as u32;
    let mut score = 0;

    let has_recent_data = periods
        .first()
        .is_some_and(|latest| days_between(today, latest.start_date) < RECENT_DATA_DAYS);
    if has_recent_data {
        score += 30;
    }

    score += match periods_logged {
        6.. => 40,
        3..=5 => 25,
        1..=2 => 10,
        0 => 0,
    };

    let cycle_lengths = cycle_deltas(periods);
    if cycle_lengths.len() >= 3 {
        let variability = population_std_dev(&cycle_lengths);
        score += if variability < 3.0 {
            30
        } else if variability < 7.0 {
            20
        } else {
            10
        };
    }

    let overall = match score {
        80.. => ConfidenceLevel::High,
        50..=79 => ConfidenceLevel::Medium,
        _ => ConfidenceLevel::Low,
    };

    tracing::debug!(score, periods_logged, has_recent_data, "Prediction confidence");

    PredictionConfidence {
        overall,
        data_quality: score,
        periods_logged,
    }
}

/// Population standard deviation; 0 for fewer than two values.
fn population_std_dev(values: &[u32]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().map(|&v| f64::from(v)).sum::<f64>() / n;
    let variance = values
        .iter()
        .map(|&v| (f64::from(v) - mean).powi(2))
        .sum::<f64>()
        / n;
    variance.sqrt()
}
