// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cycle phase classification.
//!
//! Phase boundaries are fixed offsets from the cycle length:
//!
//! ```text
//! day 1 ........ period+7 | fertile_start .. fertile_end | .. pms_start .. | L-2 .. L | > L
//!     follicular          |   fertile (ovulation inside) |  luteal  | pms  | countdown| overdue
//! ```
//!
//! Classification is first-match-wins, so the branches never overlap.

use chrono::NaiveDate;

use crate::models::{CycleEstimate, CyclePhase, Phase};
use crate::time_utils::days_between;

/// Stale history: cycle days past `cycle_length + WRAP_GRACE_DAYS` are wrapped.
const WRAP_GRACE_DAYS: i64 = 14;
/// Days after the period still reported as follicular.
const FOLLICULAR_TAIL_DAYS: i64 = 7;
/// Countdown banner takes over from PMS this many days before the next period.
const COUNTDOWN_DAYS: i64 = 3;

/// Day numbers (1-based cycle days) of each phase boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseBoundaries {
    pub cycle_length: i64,
    pub period_length: i64,
    pub ovulation_day: i64,
    pub fertile_start: i64,
    pub fertile_end: i64,
    pub pms_start: i64,
}

impl PhaseBoundaries {
    pub fn new(cycle_length: u32, period_length: u32) -> Self {
        let cycle_length = i64::from(cycle_length.max(1));
        let ovulation_day = (cycle_length - 14).max(14);

        Self {
            cycle_length,
            period_length: i64::from(period_length),
            ovulation_day,
            fertile_start: ovulation_day - 2,
            fertile_end: ovulation_day + 1,
            pms_start: cycle_length - 5,
        }
    }

    pub fn for_estimate(estimate: &CycleEstimate) -> Self {
        Self::new(estimate.cycle_length, estimate.period_duration)
    }

    /// Days until the next period starts; zero or negative when overdue.
    pub fn days_until_next_period(&self, cycle_day: i64) -> i64 {
        self.cycle_length - cycle_day + 1
    }

    pub fn is_fertile(&self, cycle_day: i64) -> bool {
        (self.fertile_start..=self.fertile_end).contains(&cycle_day)
    }

    pub fn is_ovulation(&self, cycle_day: i64) -> bool {
        cycle_day == self.ovulation_day
    }

    /// Day-based phase for a cycle day, ignoring any logged period.
    pub fn phase_on_day(&self, cycle_day: i64) -> Phase {
        let days_until = self.days_until_next_period(cycle_day);

        if cycle_day <= self.period_length + FOLLICULAR_TAIL_DAYS {
            Phase::Follicular
        } else if self.is_fertile(cycle_day) {
            Phase::Fertile
        } else if self.is_ovulation(cycle_day) {
            Phase::Ovulation
        } else if cycle_day < self.pms_start {
            Phase::Luteal
        } else if days_until > COUNTDOWN_DAYS {
            Phase::Pms
        } else {
            Phase::Countdown
        }
    }
}

/// 1-based cycle day of `today`, wrapping very overdue values back into range.
pub fn current_cycle_day(last_period_start: NaiveDate, cycle_length: u32, today: NaiveDate) -> i64 {
    let cycle_length = i64::from(cycle_length.max(1));
    let cycle_day = days_between(today, last_period_start) + 1;

    if cycle_day > cycle_length + WRAP_GRACE_DAYS {
        tracing::warn!(
            cycle_day,
            cycle_length,
            "Cycle day much longer than expected, wrapping"
        );
        (cycle_day - 1).rem_euclid(cycle_length) + 1
    } else {
        cycle_day
    }
}

/// Classify `today` into exactly one phase.
///
/// A logged, ongoing period always wins over the day-based prediction.
pub fn classify_phase(estimate: &CycleEstimate, today: NaiveDate) -> CyclePhase {
    let Some(last_start) = estimate.last_period_start else {
        return CyclePhase {
            phase: Phase::Unknown,
            message: "Period in".to_string(),
            subtext: "Track your periods for accurate predictions".to_string(),
            days_left: Some("Unknown".to_string()),
            cycle_day: None,
            days_until_next_period: None,
        };
    };

    if estimate.is_currently_on_period {
        let day = i64::from(estimate.current_period_day.unwrap_or(1));
        return CyclePhase {
            phase: Phase::Period,
            message: format!("Day {}", day),
            subtext: "Don't forget to log your flow".to_string(),
            days_left: None,
            cycle_day: Some(day),
            days_until_next_period: None,
        };
    }

    let bounds = PhaseBoundaries::for_estimate(estimate);
    let cycle_day = current_cycle_day(last_start, estimate.cycle_length, today);
    let days_until = bounds.days_until_next_period(cycle_day);
    let phase = bounds.phase_on_day(cycle_day);

    tracing::debug!(
        cycle_day,
        cycle_length = bounds.cycle_length,
        period_length = bounds.period_length,
        ovulation_day = bounds.ovulation_day,
        phase = %phase,
        "Classified cycle phase"
    );

    let (message, subtext, days_left) = match phase {
        Phase::Follicular => (
            "Follicular Phase".to_string(),
            "You might feel more energetic",
            None,
        ),
        Phase::Fertile => (
            format!("Fertile Day {}", cycle_day - bounds.fertile_start + 1),
            "High chance to get pregnant",
            None,
        ),
        Phase::Ovulation => ("Ovulation Day".to_string(), "Peak fertility", None),
        Phase::Luteal => (
            "Luteal Phase".to_string(),
            "Your body is preparing for the next cycle",
            None,
        ),
        Phase::Pms => (
            period_in_message(days_until),
            "You may experience PMS symptoms",
            Some(days_left_label(days_until)),
        ),
        Phase::Countdown if days_until > 0 => (
            period_in_message(days_until),
            "Your period is almost here",
            Some(days_left_label(days_until)),
        ),
        _ => (
            "Period Expected".to_string(),
            "Your period should start any day now",
            Some("Today".to_string()),
        ),
    };

    CyclePhase {
        phase,
        message,
        subtext: subtext.to_string(),
        days_left,
        cycle_day: Some(cycle_day),
        days_until_next_period: Some(days_until.max(1)),
    }
}

fn plural(n: i64) -> &'static str {
    if n > 1 {
        "s"
    } else {
        ""
    }
}

fn period_in_message(days: i64) -> String {
    format!("Period in {} day{}", days, plural(days))
}

fn days_left_label(days: i64) -> String {
    format!("{} Day{}", days, plural(days))
}
