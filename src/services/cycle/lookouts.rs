// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! "What to look out for" cards, personalized from symptom history.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use crate::models::{Lookout, LookoutConfidence, Phase, PregnancyChance, SymptomLog};
use crate::services::cycle::phase::PhaseBoundaries;

/// Logs needed in a phase before its most frequent symptom is shown.
const BASIC_MIN_LOGS: u32 = 3;
/// Logs needed before the card counts as fully personalized.
const PERSONALIZED_MIN_LOGS: u32 = 10;

/// Default pregnancy chance and expected symptom for a phase.
pub fn default_lookout(phase: Phase) -> (PregnancyChance, &'static str) {
    match phase {
        Phase::Period => (PregnancyChance::Low, "Cramps"),
        Phase::Follicular | Phase::Unknown => (PregnancyChance::Low, "High Energy"),
        Phase::Fertile => (PregnancyChance::High, "Fertile Signs"),
        Phase::Ovulation => (PregnancyChance::High, "Ovulation Pain"),
        Phase::Luteal => (PregnancyChance::Low, "Breast Tenderness"),
        Phase::Pms => (PregnancyChance::Low, "Mood Swings"),
        Phase::Countdown => (PregnancyChance::Low, "PMS Symptoms"),
    }
}

/// Cycle days covered by `phase`, or `None` if the phase never occurs.
///
/// `Unknown` maps to the follicular range.
pub fn phase_day_range(bounds: &PhaseBoundaries, phase: Phase) -> Option<RangeInclusive<i64>> {
    let in_phase = |day: i64| match phase {
        Phase::Period => day <= bounds.period_length,
        Phase::Ovulation => bounds.is_ovulation(day),
        Phase::Follicular | Phase::Unknown => {
            day > bounds.period_length && bounds.phase_on_day(day) == Phase::Follicular
        }
        other => day > bounds.period_length && bounds.phase_on_day(day) == other,
    };

    let mut days = (1..=bounds.cycle_length).filter(|d| in_phase(*d));
    let first = days.next()?;
    let last = days.last().unwrap_or(first);
    Some(first..=last)
}

/// Build the lookout card for `phase` from the user's symptom logs.
///
/// Logs count toward a phase when their recorded cycle day falls in the
/// phase's range. Logs without a cycle day are ignored.
pub fn build_lookout(phase: Phase, bounds: &PhaseBoundaries, logs: &[SymptomLog]) -> Lookout {
    let (pregnancy_chance, default_symptom) = default_lookout(phase);
    let phase = if phase == Phase::Unknown {
        Phase::Follicular
    } else {
        phase
    };

    let Some(range) = phase_day_range(bounds, phase) else {
        return Lookout {
            phase,
            pregnancy_chance,
            expected_symptoms: default_symptom.to_string(),
            confidence: LookoutConfidence::Default,
            data_points: 0,
        };
    };

    let matching: Vec<&SymptomLog> = logs
        .iter()
        .filter(|log| log.cycle_day.is_some_and(|d| range.contains(&d)))
        .collect();
    let data_points = matching.len() as u32;

    let confidence = if data_points >= PERSONALIZED_MIN_LOGS {
        LookoutConfidence::Personalized
    } else if data_points >= BASIC_MIN_LOGS {
        LookoutConfidence::Basic
    } else {
        LookoutConfidence::Default
    };

    let expected_symptoms = match confidence {
        LookoutConfidence::Default => None,
        _ => most_frequent_symptom(&matching),
    }
    .unwrap_or_else(|| default_symptom.to_string());

    tracing::debug!(
        phase = %phase,
        data_points,
        confidence = ?confidence,
        "Built lookout"
    );

    Lookout {
        phase,
        pregnancy_chance,
        expected_symptoms,
        confidence,
        data_points,
    }
}

/// Most common symptom; ties go to the alphabetically first name.
fn most_frequent_symptom(logs: &[&SymptomLog]) -> Option<String> {
    let mut counts: BTreeMap<&str, u32> = BTreeMap::new();
    for symptom in logs.iter().flat_map(|log| log.symptoms.iter()) {
        *counts.entry(symptom.as_str()).or_default() += 1;
    }

    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
        .map(|(name, _)| name.to_string())
}
