// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Period records: the stored log document and the engine's date-only view.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::time_utils::{days_between, format_date, parse_date};

/// Period duration assumed when a record carries neither an end date nor a duration.
pub const DEFAULT_PERIOD_LENGTH: u32 = 5;

/// Longest stored duration the engine will trust; anything above is ignored.
pub const MAX_PERIOD_LENGTH: u32 = 15;

/// Where a period record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum PeriodSource {
    #[default]
    Manual,
    Onboarding,
}

/// Reported flow intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum FlowLevel {
    Light,
    Medium,
    Heavy,
}

/// Whether the log was entered for the current period or back-filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum PeriodType {
    Current,
    Past,
}

/// Period log document as stored at `users/{uid}/periodLogs/{id}`.
///
/// Field names are camelCase because the mobile client writes these documents
/// directly. Everything except `startDate` may be missing on older documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct PeriodLog {
    /// Document ID
    #[serde(default, alias = "_firestore_id", skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// First day of flow (`YYYY-MM-DD` or RFC3339)
    pub start_date: String,
    /// Last day of flow, absent while ongoing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    /// Length of flow in days
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow: Option<FlowLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// When the entry was written (RFC3339)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logged_at: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<PeriodType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PeriodSource>,
    #[serde(default)]
    pub is_ongoing: bool,
}

impl PeriodLog {
    /// Convert the stored document into the engine's view.
    ///
    /// Returns `None` when the start date cannot be parsed. An end date that
    /// is unparsable or earlier than the start is dropped, leaving the record
    /// open-ended.
    pub fn to_record(&self) -> Option<PeriodRecord> {
        let start_date = parse_date(&self.start_date)?;

        let end_date = self
            .end_date
            .as_deref()
            .and_then(parse_date)
            .filter(|end| *end >= start_date);

        if self.end_date.is_some() && end_date.is_none() {
            tracing::debug!(
                id = %self.id,
                end_date = ?self.end_date,
                "Ignoring invalid period end date"
            );
        }

        Some(PeriodRecord {
            id: self.id.clone(),
            start_date,
            end_date,
            duration: self
                .duration
                .filter(|d| (1..=MAX_PERIOD_LENGTH).contains(d)),
            source: self.source.unwrap_or_default(),
        })
    }
}

/// A period as the cycle engine sees it: calendar dates only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodRecord {
    pub id: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    /// Caller-supplied estimate, used only when `end_date` is absent
    pub duration: Option<u32>,
    pub source: PeriodSource,
}

impl PeriodRecord {
    /// An open-ended manual record starting on `start_date`.
    pub fn new(id: impl Into<String>, start_date: NaiveDate) -> Self {
        Self {
            id: id.into(),
            start_date,
            end_date: None,
            duration: None,
            source: PeriodSource::Manual,
        }
    }

    pub fn with_end(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    pub fn with_duration(mut self, duration: u32) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn with_source(mut self, source: PeriodSource) -> Self {
        self.source = source;
        self
    }

    /// `end - start + 1` when the end date is known, else the stored estimate.
    pub fn logged_duration(&self) -> Option<u32> {
        match self.end_date {
            Some(end) => u32::try_from(days_between(end, self.start_date) + 1).ok(),
            None => self.duration,
        }
    }

    /// Flow duration, falling back to [`DEFAULT_PERIOD_LENGTH`].
    pub fn effective_duration(&self) -> u32 {
        self.logged_duration().unwrap_or(DEFAULT_PERIOD_LENGTH)
    }

    /// Last day of flow: the explicit end date, or start + duration - 1.
    ///
    /// Saturates at the end of chrono's calendar.
    pub fn last_day(&self) -> NaiveDate {
        self.end_date.unwrap_or_else(|| {
            let span = Duration::days(i64::from(self.effective_duration().max(1)) - 1);
            self.start_date
                .checked_add_signed(span)
                .unwrap_or(NaiveDate::MAX)
        })
    }

    /// Whether `date` lies inside `[start_date, last_day]`.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.last_day()
    }

    /// Storage representation of this record.
    pub fn to_log(&self) -> PeriodLog {
        PeriodLog {
            id: self.id.clone(),
            start_date: format_date(self.start_date),
            end_date: self.end_date.map(format_date),
            duration: self.logged_duration(),
            flow: None,
            notes: None,
            logged_at: None,
            kind: None,
            source: Some(self.source),
            is_ongoing: self.end_date.is_none(),
        }
    }
}
