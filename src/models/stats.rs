// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cycle statistics and prediction confidence for the reports screens.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Aggregates over a user's completed periods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CycleStatistics {
    pub average_cycle_length: u32,
    pub average_period_length: u32,
    pub shortest_cycle: Option<u32>,
    pub longest_cycle: Option<u32>,
    pub shortest_period: Option<u32>,
    pub longest_period: Option<u32>,
    pub total_completed_periods: u32,
    /// Plausible cycle lengths between consecutive completed periods, newest first
    pub cycle_lengths: Vec<u32>,
    /// Population standard deviation of `cycle_lengths`
    pub cycle_length_std_dev: f64,
    pub is_regular: bool,
    pub confidence: PredictionConfidence,
}

/// How much the predictions can be trusted given the logged history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PredictionConfidence {
    pub overall: ConfidenceLevel,
    /// 0..=100
    pub data_quality: u32,
    pub periods_logged: u32,
}
