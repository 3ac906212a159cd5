// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Period history preparation: conversion from storage, duplicate
//! suppression, and merging logs with onboarding answers into an estimate.

use chrono::{Duration, NaiveDate};

use crate::models::cycle::DEFAULT_CYCLE_LENGTH;
use crate::models::{
    CycleEstimate, FlowLevel, PeriodLog, PeriodRecord, PeriodSource, PeriodType, UserProfile,
};
use crate::services::cycle::detector::detect_current_period;
use crate::services::cycle::estimator::estimate_cycle_length;
use crate::time_utils::{days_between, format_date, parse_date};

/// Two records starting this close together describe the same period.
pub const DUPLICATE_WINDOW_DAYS: i64 = 7;

/// Self-reported cycle lengths accepted from the profile.
const PROFILE_CYCLE_RANGE: std::ops::RangeInclusive<u32> = 15..=60;

/// Convert stored logs into engine records, newest first.
///
/// Logs with an unparsable start date are skipped rather than failing the
/// whole history.
pub fn records_from_logs(logs: &[PeriodLog]) -> Vec<PeriodRecord> {
    let mut records: Vec<PeriodRecord> = logs
        .iter()
        .filter_map(|log| {
            let record = log.to_record();
            if record.is_none() {
                tracing::warn!(
                    id = %log.id,
                    start_date = %log.start_date,
                    "Skipping period log with invalid start date"
                );
            }
            record
        })
        .collect();

    records.sort_by(|a, b| b.start_date.cmp(&a.start_date));
    records
}

/// Whether two records are the same period entered twice (typically the
/// onboarding answer and a later manual log).
///
/// This is a heuristic: any two starts within [`DUPLICATE_WINDOW_DAYS`] match.
pub fn is_duplicate_period(a: &PeriodRecord, b: &PeriodRecord) -> bool {
    days_between(a.start_date, b.start_date).abs() <= DUPLICATE_WINDOW_DAYS
}

/// Drop duplicate records from a newest-first history.
///
/// The first record of each duplicate cluster is kept, except that a manual
/// log replaces an onboarding record it duplicates.
pub fn dedupe_periods(records: Vec<PeriodRecord>) -> Vec<PeriodRecord> {
    let mut kept: Vec<PeriodRecord> = Vec::with_capacity(records.len());

    for record in records {
        match kept.iter_mut().find(|k| is_duplicate_period(k, &record)) {
            Some(existing) => {
                tracing::debug!(
                    kept = %existing.id,
                    duplicate = %record.id,
                    "Suppressing duplicate period"
                );
                if existing.source == PeriodSource::Onboarding
                    && record.source == PeriodSource::Manual
                {
                    *existing = record;
                }
            }
            None => kept.push(record),
        }
    }

    kept
}

/// Resolved inputs for building a [`CycleEstimate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleInputs {
    pub latest: Option<PeriodRecord>,
    pub cycle_length: u32,
    pub calculated_cycle_length: Option<u32>,
}

/// Merge logged history with profile answers.
///
/// Precedence, highest first: logged period records, then the profile's
/// onboarding fields, then the defaults.
pub fn merge_cycle_inputs(periods: &[PeriodRecord], profile: Option<&UserProfile>) -> CycleInputs {
    let latest = periods
        .first()
        .cloned()
        .or_else(|| profile.and_then(profile_period));

    let calculated_cycle_length = estimate_cycle_length(periods);
    let cycle_length = calculated_cycle_length
        .or_else(|| {
            profile
                .and_then(|p| p.cycle_length)
                .filter(|l| PROFILE_CYCLE_RANGE.contains(l))
        })
        .unwrap_or(DEFAULT_CYCLE_LENGTH);

    CycleInputs {
        latest,
        cycle_length,
        calculated_cycle_length,
    }
}

/// Build the cycle snapshot for `today`.
///
/// `periods` should already be deduplicated and newest first.
pub fn build_cycle_estimate(
    periods: &[PeriodRecord],
    profile: Option<&UserProfile>,
    today: NaiveDate,
) -> CycleEstimate {
    let inputs = merge_cycle_inputs(periods, profile);

    let Some(latest) = inputs.latest else {
        return CycleEstimate {
            cycle_length: inputs.cycle_length,
            ..CycleEstimate::default()
        };
    };

    let current = detect_current_period(&latest, today);

    CycleEstimate {
        last_period_start: Some(latest.start_date),
        last_period_end: latest.end_date,
        cycle_length: inputs.cycle_length,
        calculated_cycle_length: inputs.calculated_cycle_length,
        period_duration: current.duration,
        is_currently_on_period: current.is_on_period,
        current_period_day: current.period_day,
    }
}

/// Predicted start of the next period.
pub fn next_period_date(estimate: &CycleEstimate) -> Option<NaiveDate> {
    estimate
        .last_period_start?
        .checked_add_signed(Duration::days(i64::from(estimate.cycle_length)))
}

/// Days from `today` to the predicted next period (negative when overdue).
pub fn days_until_next_period(estimate: &CycleEstimate, today: NaiveDate) -> Option<i64> {
    next_period_date(estimate).map(|next| days_between(next, today))
}

/// The period log to create from a profile's onboarding answers.
///
/// Returns `None` unless the profile has both a start and a valid end date,
/// or when a logged period already starts on the same day.
pub fn onboarding_period(
    profile: &UserProfile,
    existing: &[PeriodRecord],
    logged_at: &str,
) -> Option<PeriodLog> {
    let record = profile_period(profile).filter(|r| r.end_date.is_some())?;

    if existing.iter().any(|p| p.start_date == record.start_date) {
        tracing::debug!(
            start_date = %record.start_date,
            "Onboarding period already logged"
        );
        return None;
    }

    Some(PeriodLog {
        id: String::new(),
        start_date: format_date(record.start_date),
        end_date: record.end_date.map(format_date),
        duration: record.logged_duration(),
        flow: Some(FlowLevel::Medium),
        notes: Some("Migrated from onboarding".to_string()),
        logged_at: Some(logged_at.to_string()),
        kind: Some(PeriodType::Past),
        source: Some(PeriodSource::Onboarding),
        is_ongoing: record.end_date.is_none(),
    })
}

fn profile_period(profile: &UserProfile) -> Option<PeriodRecord> {
    let start = parse_date(profile.last_period_start.as_deref()?)?;
    let end = profile
        .last_period_end
        .as_deref()
        .and_then(parse_date)
        .filter(|end| *end >= start);

    let mut record = PeriodRecord::new("onboarding", start).with_source(PeriodSource::Onboarding);
    record.end_date = end;
    Some(record)
}
