// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Daily symptom and mood logs, one document per user per date.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::cycle::Phase;

/// Symptoms logged for a day, at `users/{uid}/symptomLogs/{YYYY-MM-DD}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct SymptomLog {
    /// Calendar date (also the document ID)
    #[serde(default, alias = "_firestore_id", skip_serializing_if = "String::is_empty")]
    pub date: String,
    #[serde(default)]
    pub symptoms: Vec<String>,
    /// Cycle day at the time of logging
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle_day: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle_phase: Option<Phase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// When the entry was written (RFC3339)
    #[serde(default)]
    pub timestamp: String,
}

/// Moods logged for a day, at `users/{uid}/moodLogs/{YYYY-MM-DD}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct MoodLog {
    #[serde(default, alias = "_firestore_id", skip_serializing_if = "String::is_empty")]
    pub date: String,
    #[serde(default)]
    pub moods: Vec<String>,
    #[serde(default)]
    pub timestamp: String,
}
