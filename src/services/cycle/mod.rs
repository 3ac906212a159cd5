// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cycle engine: pure, synchronous computations over a user's period history.
//!
//! Nothing here touches storage or the clock; callers pass `today` in.

pub mod calendar;
pub mod detector;
pub mod estimator;
pub mod history;
pub mod lookouts;
pub mod phase;
pub mod stats;

pub use calendar::annotate_calendar_month;
pub use detector::{detect_current_period, detect_current_period_in};
pub use estimator::{cycle_deltas, estimate_cycle_length};
pub use history::{
    build_cycle_estimate, days_until_next_period, dedupe_periods, is_duplicate_period,
    merge_cycle_inputs, next_period_date, onboarding_period, records_from_logs, CycleInputs,
};
pub use lookouts::{build_lookout, default_lookout, phase_day_range};
pub use phase::{classify_phase, current_cycle_day, PhaseBoundaries};
pub use stats::{cycle_statistics, prediction_confidence};
