// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Derived cycle views. None of these are persisted.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::period::DEFAULT_PERIOD_LENGTH;

/// Cycle length assumed when history is insufficient.
pub const DEFAULT_CYCLE_LENGTH: u32 = 28;

/// Snapshot of a user's cycle, recomputed on every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CycleEstimate {
    pub last_period_start: Option<NaiveDate>,
    pub last_period_end: Option<NaiveDate>,
    pub cycle_length: u32,
    /// Raw estimator output; `None` when `cycle_length` is a fallback
    pub calculated_cycle_length: Option<u32>,
    pub period_duration: u32,
    pub is_currently_on_period: bool,
    /// 1-based day of the current period, only while on period
    pub current_period_day: Option<u32>,
}

impl Default for CycleEstimate {
    fn default() -> Self {
        Self {
            last_period_start: None,
            last_period_end: None,
            cycle_length: DEFAULT_CYCLE_LENGTH,
            calculated_cycle_length: None,
            period_duration: DEFAULT_PERIOD_LENGTH,
            is_currently_on_period: false,
            current_period_day: None,
        }
    }
}

/// Named sub-range of the cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Period,
    Follicular,
    Fertile,
    Ovulation,
    Luteal,
    Pms,
    /// Days-until-next-period banner (also used when overdue)
    Countdown,
    /// No history to work from
    Unknown,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Period => "period",
            Phase::Follicular => "follicular",
            Phase::Fertile => "fertile",
            Phase::Ovulation => "ovulation",
            Phase::Luteal => "luteal",
            Phase::Pms => "pms",
            Phase::Countdown => "countdown",
            Phase::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Phase classification for a single day, with display copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CyclePhase {
    pub phase: Phase,
    pub message: String,
    pub subtext: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_left: Option<String>,
    /// Cycle day (or period day while on period); `None` for `unknown`
    pub cycle_day: Option<i64>,
    /// Clamped to at least 1; `None` while on period or without history
    pub days_until_next_period: Option<i64>,
}

/// Result of checking whether a date falls inside the latest period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentPeriod {
    pub is_on_period: bool,
    pub period_day: Option<u32>,
    pub duration: u32,
}

/// Annotation for one calendar cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub is_logged_period: bool,
    pub is_predicted_period: bool,
    pub is_fertile: bool,
    pub is_ovulation: bool,
    pub cycle_day: Option<i64>,
    pub phase: Phase,
}
