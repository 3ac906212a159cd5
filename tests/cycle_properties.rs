// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Property tests for the cycle engine.

use chrono::{Duration, NaiveDate};
use luna_tracker::models::{CycleEstimate, PeriodRecord, Phase};
use luna_tracker::services::cycle::{
    build_cycle_estimate, classify_phase, cycle_deltas, dedupe_periods, detect_current_period,
    estimate_cycle_length,
};
use proptest::prelude::*;
use proptest::test_runner::Config;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Newest-first history: each gap steps further into the past.
fn history(first: NaiveDate, gaps: &[i64]) -> Vec<PeriodRecord> {
    let mut start = first;
    let mut records = vec![PeriodRecord::new("p0", start).with_duration(5)];
    for (i, gap) in gaps.iter().enumerate() {
        start -= Duration::days(*gap);
        records.push(PeriodRecord::new(format!("p{}", i + 1), start).with_duration(5));
    }
    records
}

fn estimate(last_start: NaiveDate, cycle_length: u32, on_period_day: Option<u32>) -> CycleEstimate {
    CycleEstimate {
        last_period_start: Some(last_start),
        cycle_length,
        is_currently_on_period: on_period_day.is_some(),
        current_period_day: on_period_day,
        ..CycleEstimate::default()
    }
}

proptest! {
    #![proptest_config(Config::with_cases(256))]

    #[test]
    fn estimate_is_rounded_mean_of_plausible_gaps(gaps in prop::collection::vec(1_i64..90, 1..12)) {
        let records = history(date(2024, 6, 1), &gaps);
        let plausible: Vec<i64> = gaps.iter().copied().filter(|g| (18..=45).contains(g)).collect();

        let estimate = estimate_cycle_length(&records);
        if plausible.is_empty() {
            prop_assert_eq!(estimate, None);
        } else {
            let n = plausible.len() as f64;
            let mean = plausible.iter().sum::<i64>() as f64 / n;
            prop_assert_eq!(estimate, Some((mean + 0.5).floor() as u32));
        }
        prop_assert_eq!(cycle_deltas(&records).len(), plausible.len());
    }

    #[test]
    fn estimate_stays_in_plausible_range(gaps in prop::collection::vec(18_i64..=45, 1..12)) {
        let records = history(date(2024, 6, 1), &gaps);
        let estimate = estimate_cycle_length(&records).unwrap();
        prop_assert!((18..=45).contains(&estimate));
    }

    #[test]
    fn phase_classification_is_deterministic(
        cycle_length in 15_u32..60,
        offset in 0_i64..120,
    ) {
        let start = date(2024, 1, 1);
        let today = start + Duration::days(offset);
        let estimate = estimate(start, cycle_length, None);

        let first = classify_phase(&estimate, today);
        let second = classify_phase(&estimate, today);
        prop_assert_eq!(&first, &second);
        prop_assert_ne!(first.phase, Phase::Unknown);
        prop_assert_ne!(first.phase, Phase::Period);
        prop_assert!(first.days_until_next_period.unwrap() >= 1);
    }

    #[test]
    fn ongoing_period_always_wins(
        cycle_length in 15_u32..60,
        period_day in 1_u32..10,
        offset in 0_i64..120,
    ) {
        let start = date(2024, 1, 1);
        let estimate = estimate(start, cycle_length, Some(period_day));
        let phase = classify_phase(&estimate, start + Duration::days(offset));

        prop_assert_eq!(phase.phase, Phase::Period);
        prop_assert_eq!(phase.cycle_day, Some(i64::from(period_day)));
        prop_assert_eq!(phase.message, format!("Day {}", period_day));
    }

    #[test]
    fn past_end_date_overrides_duration(
        flow_days in 1_i64..10,
        duration in 1_u32..15,
        after in 1_i64..20,
    ) {
        let start = date(2024, 3, 1);
        let end = start + Duration::days(flow_days - 1);
        let record = PeriodRecord::new("p", start).with_end(end).with_duration(duration);

        let current = detect_current_period(&record, end + Duration::days(after));
        prop_assert!(!current.is_on_period);
        prop_assert_eq!(current.period_day, None);
    }

    #[test]
    fn storage_round_trip_preserves_engine_results(gaps in prop::collection::vec(18_i64..=45, 1..8)) {
        let records = history(date(2024, 6, 1), &gaps);
        let restored: Vec<PeriodRecord> = records
            .iter()
            .map(|r| r.to_log().to_record().unwrap())
            .collect();

        prop_assert_eq!(estimate_cycle_length(&records), estimate_cycle_length(&restored));

        let today = date(2024, 6, 20);
        let before = build_cycle_estimate(&records, None, today);
        let after = build_cycle_estimate(&restored, None, today);
        prop_assert_eq!(classify_phase(&before, today), classify_phase(&after, today));
    }

    #[test]
    fn dedupe_leaves_no_near_duplicates(gaps in prop::collection::vec(0_i64..40, 1..12)) {
        let deduped = dedupe_periods(history(date(2024, 6, 1), &gaps));
        for (i, a) in deduped.iter().enumerate() {
            for b in &deduped[i + 1..] {
                prop_assert!((a.start_date - b.start_date).num_days().abs() > 7);
            }
        }
    }
}

#[test]
fn scenario_two_periods_luteal() {
    let records = vec![
        PeriodRecord::new("jan", date(2024, 1, 1)).with_end(date(2024, 1, 5)),
        PeriodRecord::new("dec", date(2023, 12, 3)).with_end(date(2023, 12, 7)),
    ];
    let today = date(2024, 1, 20);

    assert_eq!(estimate_cycle_length(&records), Some(29));

    let estimate = build_cycle_estimate(&records, None, today);
    let phase = classify_phase(&estimate, today);
    assert_eq!(phase.phase, Phase::Luteal);
    assert_eq!(phase.cycle_day, Some(20));
}

#[test]
fn scenario_no_history_is_unknown() {
    let today = date(2024, 1, 20);
    let estimate = build_cycle_estimate(&[], None, today);
    let phase = classify_phase(&estimate, today);

    assert_eq!(phase.phase, Phase::Unknown);
    assert_eq!(phase.subtext, "Track your periods for accurate predictions");
}

#[test]
fn scenario_second_day_of_open_period() {
    let record = PeriodRecord::new("p", date(2024, 1, 1)).with_duration(5);
    let current = detect_current_period(&record, date(2024, 1, 2));

    assert!(current.is_on_period);
    assert_eq!(current.period_day, Some(2));
}

#[test]
fn scenario_implausible_gap_is_discarded() {
    // 40 days is plausible, 50 is not
    let records = history(date(2024, 6, 1), &[40, 50]);
    assert_eq!(cycle_deltas(&records), vec![40]);
    assert_eq!(estimate_cycle_length(&records), Some(40));
}
