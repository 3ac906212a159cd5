// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Tracker service: loads a user's history from the store and runs the
//! cycle engine over it.
//!
//! The engine itself never fails; everything that can go wrong here is a
//! store error or a rejected write.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::db::PeriodStore;
use crate::error::{AppError, Result};
use crate::models::{
    CalendarDay, CycleEstimate, CyclePhase, CycleStatistics, Lookout, MoodLog, PeriodLog,
    PeriodRecord, PeriodSource, Phase, SymptomLog, UserProfile,
};
use crate::services::cycle::{self, PhaseBoundaries};
use crate::time_utils::{format_date, format_utc_rfc3339, parse_date};

/// Everything the home screen needs for one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CycleOverview {
    pub date: NaiveDate,
    pub estimate: CycleEstimate,
    pub phase: CyclePhase,
    pub next_period_date: Option<NaiveDate>,
}

/// A user's deduplicated history plus their onboarding profile.
struct History {
    records: Vec<PeriodRecord>,
    profile: Option<UserProfile>,
}

pub struct TrackerService {
    store: Arc<dyn PeriodStore>,
    /// Most recent periods considered when estimating cycle length
    history_limit: u32,
}

impl TrackerService {
    pub fn new(store: Arc<dyn PeriodStore>, history_limit: u32) -> Self {
        Self {
            store,
            history_limit: history_limit.max(2),
        }
    }

    async fn load_history(&self, user_id: &str) -> Result<History> {
        let (logs, profile) = tokio::try_join!(
            self.store.list_periods(user_id, None),
            self.store.get_profile(user_id),
        )?;

        let records = cycle::dedupe_periods(cycle::records_from_logs(&logs));

        tracing::debug!(
            user_id,
            stored = logs.len(),
            usable = records.len(),
            "Loaded period history"
        );

        Ok(History { records, profile })
    }

    fn estimate(&self, history: &History, today: NaiveDate) -> CycleEstimate {
        let recent = &history.records[..history.records.len().min(self.history_limit as usize)];
        cycle::build_cycle_estimate(recent, history.profile.as_ref(), today)
    }

    // ─── Derived Views ───────────────────────────────────────────

    /// Estimate, phase, and next period date as of `today`.
    pub async fn overview(&self, user_id: &str, today: NaiveDate) -> Result<CycleOverview> {
        let history = self.load_history(user_id).await?;
        let estimate = self.estimate(&history, today);
        let phase = cycle::classify_phase(&estimate, today);

        tracing::info!(
            user_id,
            phase = %phase.phase,
            cycle_length = estimate.cycle_length,
            "Computed cycle overview"
        );

        Ok(CycleOverview {
            date: today,
            next_period_date: cycle::next_period_date(&estimate),
            estimate,
            phase,
        })
    }

    /// Annotated days for one calendar month.
    pub async fn calendar(
        &self,
        user_id: &str,
        year: i32,
        month: u32,
        today: NaiveDate,
    ) -> Result<Vec<CalendarDay>> {
        if !(1..=12).contains(&month) {
            return Err(AppError::BadRequest(format!("Invalid month: {}", month)));
        }

        let history = self.load_history(user_id).await?;
        let estimate = self.estimate(&history, today);

        Ok(cycle::annotate_calendar_month(
            year,
            month,
            &history.records,
            &estimate,
            today,
        ))
    }

    /// Statistics over the full history.
    pub async fn statistics(&self, user_id: &str, today: NaiveDate) -> Result<CycleStatistics> {
        let history = self.load_history(user_id).await?;
        Ok(cycle::cycle_statistics(&history.records, today))
    }

    /// Lookout card for the phase `date` falls in.
    pub async fn lookout(&self, user_id: &str, date: NaiveDate) -> Result<Lookout> {
        let (history, symptom_logs) = tokio::try_join!(
            self.load_history(user_id),
            self.store.list_symptom_logs(user_id),
        )?;

        let estimate = self.estimate(&history, date);
        let phase = cycle::classify_phase(&estimate, date);
        let bounds = PhaseBoundaries::for_estimate(&estimate);

        Ok(cycle::build_lookout(phase.phase, &bounds, &symptom_logs))
    }

    // ─── Period Logs ─────────────────────────────────────────────

    pub async fn list_periods(&self, user_id: &str, limit: Option<u32>) -> Result<Vec<PeriodLog>> {
        self.store.list_periods(user_id, limit).await
    }

    /// Validate and store a new period log.
    pub async fn add_period(
        &self,
        user_id: &str,
        log: PeriodLog,
        today: NaiveDate,
    ) -> Result<PeriodLog> {
        let mut log = normalize_period(log, today)?;
        log.logged_at = Some(format_utc_rfc3339(chrono::Utc::now()));

        let id = self.store.add_period(user_id, &log).await?;
        tracing::info!(user_id, period_id = %id, start_date = %log.start_date, "Period logged");

        log.id = id;
        Ok(log)
    }

    /// Validate and replace an existing period log.
    pub async fn update_period(
        &self,
        user_id: &str,
        id: &str,
        log: PeriodLog,
        today: NaiveDate,
    ) -> Result<PeriodLog> {
        let existing = self
            .store
            .get_period(user_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Period {} not found", id)))?;

        let mut log = normalize_period(log, today)?;
        log.id = id.to_string();
        log.logged_at = existing.logged_at;
        log.source = existing.source;

        self.store.update_period(user_id, &log).await?;
        tracing::info!(user_id, period_id = id, "Period updated");

        Ok(log)
    }

    pub async fn delete_period(&self, user_id: &str, id: &str) -> Result<()> {
        if self.store.get_period(user_id, id).await?.is_none() {
            return Err(AppError::NotFound(format!("Period {} not found", id)));
        }

        self.store.delete_period(user_id, id).await?;
        tracing::info!(user_id, period_id = id, "Period deleted");
        Ok(())
    }

    /// Move the profile's onboarding period into the period logs.
    ///
    /// Needs both onboarding dates. On success the dates are cleared from the
    /// profile. Returns `None` when there is nothing to migrate or the period
    /// is already logged.
    pub async fn migrate_onboarding(&self, user_id: &str) -> Result<Option<PeriodLog>> {
        let (logs, profile) = tokio::try_join!(
            self.store.list_periods(user_id, None),
            self.store.get_profile(user_id),
        )?;

        let Some(mut profile) = profile.filter(UserProfile::has_onboarding_period) else {
            tracing::debug!(user_id, "No onboarding period to migrate");
            return Ok(None);
        };

        let records = cycle::records_from_logs(&logs);
        let now = format_utc_rfc3339(chrono::Utc::now());
        let Some(mut log) = cycle::onboarding_period(&profile, &records, &now) else {
            return Ok(None);
        };

        log.id = self.store.add_period(user_id, &log).await?;

        // The period lives in the logs from here on
        profile.clear_onboarding_period();
        profile.updated_at = Some(now);
        self.store.upsert_profile(user_id, &profile).await?;

        tracing::info!(
            user_id,
            period_id = %log.id,
            start_date = %log.start_date,
            "Migrated onboarding period"
        );

        Ok(Some(log))
    }

    // ─── Daily Logs ──────────────────────────────────────────────

    /// Store the symptoms for `date`, stamped with the cycle day and phase
    /// the engine assigns to that date.
    pub async fn record_symptoms(
        &self,
        user_id: &str,
        date: NaiveDate,
        symptoms: Vec<String>,
        notes: Option<String>,
    ) -> Result<SymptomLog> {
        let history = self.load_history(user_id).await?;
        let estimate = self.estimate(&history, date);
        let phase = cycle::classify_phase(&estimate, date);

        let log = SymptomLog {
            date: format_date(date),
            symptoms,
            cycle_day: phase.cycle_day,
            cycle_phase: (phase.phase != Phase::Unknown).then_some(phase.phase),
            notes,
            timestamp: format_utc_rfc3339(chrono::Utc::now()),
        };

        self.store.set_symptom_log(user_id, &log).await?;
        tracing::info!(user_id, date = %log.date, count = log.symptoms.len(), "Symptoms logged");

        Ok(log)
    }

    pub async fn record_moods(
        &self,
        user_id: &str,
        date: NaiveDate,
        moods: Vec<String>,
    ) -> Result<MoodLog> {
        let log = MoodLog {
            date: format_date(date),
            moods,
            timestamp: format_utc_rfc3339(chrono::Utc::now()),
        };

        self.store.set_mood_log(user_id, &log).await?;
        tracing::info!(user_id, date = %log.date, count = log.moods.len(), "Moods logged");

        Ok(log)
    }
}

/// Check a client-supplied period log and bring it into canonical form.
///
/// Dates are rewritten as `YYYY-MM-DD`, the duration is derived from the
/// end date when there is one, and `isOngoing` follows the end date.
fn normalize_period(log: PeriodLog, today: NaiveDate) -> Result<PeriodLog> {
    let start = parse_date(&log.start_date)
        .ok_or_else(|| AppError::BadRequest(format!("Invalid startDate: {}", log.start_date)))?;

    if start > today {
        return Err(AppError::BadRequest(
            "startDate cannot be in the future".to_string(),
        ));
    }

    let end = log
        .end_date
        .as_deref()
        .map(|raw| {
            parse_date(raw).ok_or_else(|| AppError::BadRequest(format!("Invalid endDate: {}", raw)))
        })
        .transpose()?;

    if let Some(end) = end {
        if end < start {
            return Err(AppError::BadRequest(
                "endDate must not be before startDate".to_string(),
            ));
        }
    }

    let mut record = PeriodRecord::new(log.id.clone(), start)
        .with_source(log.source.unwrap_or(PeriodSource::Manual));
    record.end_date = end;
    record.duration = log.duration.filter(|d| *d > 0);

    Ok(PeriodLog {
        flow: log.flow,
        notes: log.notes,
        kind: log.kind,
        ..record.to_log()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::InMemoryStore;
    use crate::models::{ConfidenceLevel, FlowLevel};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn period(start: &str, end: Option<&str>) -> PeriodLog {
        PeriodLog {
            id: String::new(),
            start_date: start.to_string(),
            end_date: end.map(String::from),
            duration: None,
            flow: Some(FlowLevel::Medium),
            notes: None,
            logged_at: None,
            kind: None,
            source: None,
            is_ongoing: end.is_none(),
        }
    }

    fn service() -> (TrackerService, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        (TrackerService::new(store.clone(), 10), store)
    }

    #[tokio::test]
    async fn test_overview_two_logged_periods() {
        let (svc, _) = service();
        let today = date(2024, 1, 20);
        svc.add_period("u1", period("2024-01-01", Some("2024-01-05")), today)
            .await
            .unwrap();
        svc.add_period("u1", period("2023-12-03", Some("2023-12-07")), today)
            .await
            .unwrap();

        let overview = svc.overview("u1", today).await.unwrap();
        assert_eq!(overview.estimate.cycle_length, 29);
        assert_eq!(overview.estimate.calculated_cycle_length, Some(29));
        assert_eq!(overview.phase.phase, Phase::Luteal);
        assert_eq!(overview.phase.cycle_day, Some(20));
        assert_eq!(overview.next_period_date, Some(date(2024, 1, 30)));
    }

    #[tokio::test]
    async fn test_overview_without_history() {
        let (svc, _) = service();
        let overview = svc.overview("nobody", date(2024, 1, 20)).await.unwrap();
        assert_eq!(overview.phase.phase, Phase::Unknown);
        assert_eq!(overview.estimate.cycle_length, 28);
        assert_eq!(overview.next_period_date, None);
    }

    #[tokio::test]
    async fn test_add_period_normalizes_dates() {
        let (svc, store) = service();
        let stored = svc
            .add_period(
                "u1",
                period("2024-01-01T08:00:00.000Z", Some("2024-01-04")),
                date(2024, 1, 20),
            )
            .await
            .unwrap();

        assert_eq!(stored.start_date, "2024-01-01");
        assert_eq!(stored.duration, Some(4));
        assert!(!stored.is_ongoing);
        assert!(stored.logged_at.is_some());
        assert!(store.get_period("u1", &stored.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_add_period_rejects_end_before_start() {
        let (svc, _) = service();
        let err = svc
            .add_period(
                "u1",
                period("2024-01-05", Some("2024-01-01")),
                date(2024, 1, 20),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_add_period_rejects_future_start() {
        let (svc, _) = service();
        let err = svc
            .add_period("u1", period("2024-02-01", None), date(2024, 1, 20))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_update_and_delete_unknown_period() {
        let (svc, _) = service();
        let today = date(2024, 1, 20);
        assert!(matches!(
            svc.update_period("u1", "missing", period("2024-01-01", None), today)
                .await
                .unwrap_err(),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            svc.delete_period("u1", "missing").await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_ending_an_ongoing_period() {
        let (svc, _) = service();
        let today = date(2024, 1, 3);
        let open = svc
            .add_period("u1", period("2024-01-01", None), today)
            .await
            .unwrap();
        assert!(open.is_ongoing);

        let closed = svc
            .update_period("u1", &open.id, period("2024-01-01", Some("2024-01-03")), today)
            .await
            .unwrap();
        assert!(!closed.is_ongoing);
        assert_eq!(closed.duration, Some(3));
        assert_eq!(closed.logged_at, open.logged_at);
    }

    #[tokio::test]
    async fn test_migrate_onboarding_is_idempotent() {
        let (svc, store) = service();
        let profile = UserProfile {
            last_period_start: Some("2024-01-10".to_string()),
            last_period_end: Some("2024-01-14".to_string()),
            cycle_length: Some(30),
            ..UserProfile::default()
        };
        store.upsert_profile("u1", &profile).await.unwrap();

        let migrated = svc.migrate_onboarding("u1").await.unwrap().unwrap();
        assert_eq!(migrated.source, Some(PeriodSource::Onboarding));
        assert!(svc.migrate_onboarding("u1").await.unwrap().is_none());
        assert_eq!(store.list_periods("u1", None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_deleted_migrated_period_does_not_come_back() {
        let (svc, store) = service();
        let profile = UserProfile {
            name: Some("Ada".to_string()),
            last_period_start: Some("2024-01-10".to_string()),
            last_period_end: Some("2024-01-14".to_string()),
            cycle_length: Some(30),
            ..UserProfile::default()
        };
        store.upsert_profile("u1", &profile).await.unwrap();

        let migrated = svc.migrate_onboarding("u1").await.unwrap().unwrap();

        let stored = store.get_profile("u1").await.unwrap().unwrap();
        assert_eq!(stored.last_period_start, None);
        assert_eq!(stored.last_period_end, None);
        assert_eq!(stored.name.as_deref(), Some("Ada"));
        assert_eq!(stored.cycle_length, Some(30));
        assert!(stored.updated_at.is_some());

        svc.delete_period("u1", &migrated.id).await.unwrap();

        let overview = svc.overview("u1", date(2024, 1, 20)).await.unwrap();
        assert_eq!(overview.phase.phase, Phase::Unknown);
        assert_eq!(overview.estimate.last_period_start, None);
        assert!(svc.migrate_onboarding("u1").await.unwrap().is_none());
        assert!(store.list_periods("u1", None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_migrate_onboarding_needs_end_date() {
        let (svc, store) = service();
        let profile = UserProfile {
            last_period_start: Some("2024-01-10".to_string()),
            ..UserProfile::default()
        };
        store.upsert_profile("u1", &profile).await.unwrap();

        assert!(svc.migrate_onboarding("u1").await.unwrap().is_none());
        assert!(store.list_periods("u1", None).await.unwrap().is_empty());
        assert_eq!(store.get_profile("u1").await.unwrap().unwrap(), profile);
    }

    #[tokio::test]
    async fn test_overview_ignores_implausible_stored_values() {
        let (svc, store) = service();
        let profile = UserProfile {
            cycle_length: Some(u32::MAX),
            ..UserProfile::default()
        };
        store.upsert_profile("u1", &profile).await.unwrap();
        let mut log = period("2024-01-01", None);
        log.duration = Some(4_000_000_000);
        store.add_period("u1", &log).await.unwrap();

        let overview = svc.overview("u1", date(2024, 1, 20)).await.unwrap();
        assert_eq!(overview.estimate.cycle_length, 28);
        assert_eq!(overview.estimate.period_duration, 5);
        assert_eq!(overview.next_period_date, Some(date(2024, 1, 29)));

        let calendar = svc.calendar("u1", 2024, 1, date(2024, 1, 20)).await.unwrap();
        assert!(!calendar.is_empty());
    }

    #[tokio::test]
    async fn test_manual_log_supersedes_onboarding_duplicate() {
        let (svc, store) = service();
        let profile = UserProfile {
            last_period_start: Some("2024-01-10".to_string()),
            last_period_end: Some("2024-01-14".to_string()),
            ..UserProfile::default()
        };
        store.upsert_profile("u1", &profile).await.unwrap();
        svc.migrate_onboarding("u1").await.unwrap().unwrap();

        // Same period, logged by hand two days off
        svc.add_period("u1", period("2024-01-12", Some("2024-01-16")), date(2024, 1, 20))
            .await
            .unwrap();

        let overview = svc.overview("u1", date(2024, 1, 20)).await.unwrap();
        assert_eq!(overview.estimate.last_period_start, Some(date(2024, 1, 12)));
        assert_eq!(overview.estimate.period_duration, 5);
    }

    #[tokio::test]
    async fn test_calendar_rejects_invalid_month() {
        let (svc, _) = service();
        assert!(matches!(
            svc.calendar("u1", 2024, 13, date(2024, 1, 1)).await.unwrap_err(),
            AppError::BadRequest(_)
        ));
    }

    #[tokio::test]
    async fn test_symptoms_are_stamped_with_cycle_day() {
        let (svc, _) = service();
        let today = date(2024, 1, 20);
        svc.add_period("u1", period("2024-01-01", Some("2024-01-05")), today)
            .await
            .unwrap();

        let log = svc
            .record_symptoms("u1", today, vec!["Bloating".to_string()], None)
            .await
            .unwrap();
        assert_eq!(log.date, "2024-01-20");
        assert_eq!(log.cycle_day, Some(20));
        assert_eq!(log.cycle_phase, Some(Phase::Luteal));
    }

    #[tokio::test]
    async fn test_statistics_from_store() {
        let (svc, _) = service();
        let today = date(2024, 3, 10);
        for (start, end) in [
            ("2024-03-01", "2024-03-05"),
            ("2024-02-02", "2024-02-06"),
            ("2024-01-04", "2024-01-08"),
        ] {
            svc.add_period("u1", period(start, Some(end)), today)
                .await
                .unwrap();
        }

        let stats = svc.statistics("u1", today).await.unwrap();
        assert_eq!(stats.total_completed_periods, 3);
        assert_eq!(stats.cycle_lengths, vec![28, 29]);
        assert_eq!(stats.average_period_length, 5);
        // 30 recent + 25 for three periods
        assert_eq!(stats.confidence.data_quality, 55);
        assert_eq!(stats.confidence.overall, ConfidenceLevel::Medium);
    }
}
