// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod cycle;
pub mod logs;
pub mod lookout;
pub mod period;
pub mod profile;
pub mod stats;

pub use cycle::{CalendarDay, CurrentPeriod, CycleEstimate, CyclePhase, Phase};
pub use logs::{MoodLog, SymptomLog};
pub use lookout::{Lookout, LookoutConfidence, PregnancyChance};
pub use period::{FlowLevel, PeriodLog, PeriodRecord, PeriodSource, PeriodType};
pub use profile::UserProfile;
pub use stats::{ConfidenceLevel, CycleStatistics, PredictionConfidence};
