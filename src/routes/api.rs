// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users: cycle views, period logs, profile,
//! and account deletion.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{
    CalendarDay, CycleStatistics, FlowLevel, Lookout, PeriodLog, PeriodType, UserProfile,
};
use crate::services::CycleOverview;
use crate::time_utils::{format_utc_rfc3339, parse_date, today_utc};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

const MAX_PERIODS_PER_PAGE: u32 = 100;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/cycle", get(get_cycle))
        .route("/api/calendar", get(get_calendar))
        .route("/api/stats", get(get_stats))
        .route("/api/lookouts", get(get_lookout))
        .route("/api/periods", get(list_periods).post(create_period))
        .route("/api/periods/migrate", post(migrate_onboarding))
        .route("/api/periods/{id}", put(update_period).delete(delete_period))
        .route("/api/profile", get(get_profile).put(update_profile))
        .route("/api/account", delete(delete_account))
}

/// Parse an optional `date` parameter, defaulting to today (UTC).
pub(crate) fn date_or_today(raw: Option<&str>) -> Result<NaiveDate> {
    match raw {
        Some(raw) => parse_date(raw)
            .ok_or_else(|| AppError::BadRequest(format!("Invalid date: {}", raw))),
        None => Ok(today_utc()),
    }
}

#[derive(Deserialize)]
struct DateQuery {
    /// Day to evaluate (`YYYY-MM-DD`); defaults to today
    date: Option<String>,
}

// ─── Cycle Views ─────────────────────────────────────────────

/// Cycle estimate and phase for a day.
async fn get_cycle(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<DateQuery>,
) -> Result<Json<CycleOverview>> {
    let date = date_or_today(params.date.as_deref())?;
    let overview = state.tracker.overview(&user.user_id, date).await?;
    Ok(Json(overview))
}

#[derive(Deserialize)]
struct CalendarQuery {
    year: Option<i32>,
    month: Option<u32>,
}

/// Calendar month response.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CalendarResponse {
    pub year: i32,
    pub month: u32,
    pub days: Vec<CalendarDay>,
}

/// Annotated calendar month; defaults to the current month.
async fn get_calendar(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<CalendarQuery>,
) -> Result<Json<CalendarResponse>> {
    let today = today_utc();
    let year = params.year.unwrap_or_else(|| today.year());
    let month = params.month.unwrap_or_else(|| today.month());

    tracing::debug!(user_id = %user.user_id, year, month, "Fetching calendar");

    let days = state
        .tracker
        .calendar(&user.user_id, year, month, today)
        .await?;

    Ok(Json(CalendarResponse { year, month, days }))
}

/// Cycle statistics and prediction confidence.
async fn get_stats(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<CycleStatistics>> {
    let stats = state.tracker.statistics(&user.user_id, today_utc()).await?;
    Ok(Json(stats))
}

/// Lookout card for the phase of a day.
async fn get_lookout(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<DateQuery>,
) -> Result<Json<Lookout>> {
    let date = date_or_today(params.date.as_deref())?;
    let lookout = state.tracker.lookout(&user.user_id, date).await?;
    Ok(Json(lookout))
}

// ─── Period Logs ─────────────────────────────────────────────

#[derive(Deserialize)]
struct PeriodsQuery {
    limit: Option<u32>,
}

/// List period logs, newest first.
async fn list_periods(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<PeriodsQuery>,
) -> Result<Json<Vec<PeriodLog>>> {
    let limit = params.limit.map(|l| l.clamp(1, MAX_PERIODS_PER_PAGE));
    let periods = state.tracker.list_periods(&user.user_id, limit).await?;
    Ok(Json(periods))
}

/// Body for creating or replacing a period log.
#[derive(Debug, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct PeriodRequest {
    #[validate(length(min = 10, max = 40))]
    pub start_date: String,
    #[validate(length(min = 10, max = 40))]
    pub end_date: Option<String>,
    /// Estimated length while the period is ongoing
    #[validate(range(min = 1, max = 15))]
    pub duration: Option<u32>,
    pub flow: Option<FlowLevel>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<PeriodType>,
}

impl PeriodRequest {
    fn into_log(self) -> PeriodLog {
        PeriodLog {
            id: String::new(),
            is_ongoing: self.end_date.is_none(),
            start_date: self.start_date,
            end_date: self.end_date,
            duration: self.duration,
            flow: self.flow,
            notes: self.notes,
            logged_at: None,
            kind: self.kind,
            source: None,
        }
    }
}

async fn create_period(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<PeriodRequest>,
) -> Result<(StatusCode, Json<PeriodLog>)> {
    body.validate()?;
    let log = state
        .tracker
        .add_period(&user.user_id, body.into_log(), today_utc())
        .await?;
    Ok((StatusCode::CREATED, Json(log)))
}

async fn update_period(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(body): Json<PeriodRequest>,
) -> Result<Json<PeriodLog>> {
    body.validate()?;
    let log = state
        .tracker
        .update_period(&user.user_id, &id, body.into_log(), today_utc())
        .await?;
    Ok(Json(log))
}

async fn delete_period(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.tracker.delete_period(&user.user_id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Result of migrating the onboarding period.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MigrateResponse {
    pub migrated: bool,
    pub period: Option<PeriodLog>,
}

/// Copy onboarding period dates from the profile into the period logs.
async fn migrate_onboarding(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<MigrateResponse>> {
    let period = state.tracker.migrate_onboarding(&user.user_id).await?;
    Ok(Json(MigrateResponse {
        migrated: period.is_some(),
        period,
    }))
}

// ─── Profile ─────────────────────────────────────────────────

async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserProfile>> {
    let profile = state
        .store
        .get_profile(&user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile for {} not found", user.user_id)))?;
    Ok(Json(profile))
}

/// Profile fields the client may change. Absent fields are left as they are.
#[derive(Debug, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    #[validate(length(max = 100))]
    pub name: Option<String>,
    #[validate(length(min = 10, max = 40))]
    pub date_of_birth: Option<String>,
    #[validate(length(min = 10, max = 40))]
    pub last_period_start: Option<String>,
    #[validate(length(min = 10, max = 40))]
    pub last_period_end: Option<String>,
    #[validate(range(min = 15, max = 60))]
    pub cycle_length: Option<u32>,
    pub has_completed_onboarding: Option<bool>,
}

async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<ProfileRequest>,
) -> Result<Json<UserProfile>> {
    body.validate()?;

    for raw in [&body.date_of_birth, &body.last_period_start, &body.last_period_end]
        .into_iter()
        .flatten()
    {
        if parse_date(raw).is_none() {
            return Err(AppError::BadRequest(format!("Invalid date: {}", raw)));
        }
    }

    // Fetch-modify-write to preserve fields the client did not send
    let mut profile = state
        .store
        .get_profile(&user.user_id)
        .await?
        .unwrap_or_default();

    if body.name.is_some() {
        profile.name = body.name;
    }
    if body.date_of_birth.is_some() {
        profile.date_of_birth = body.date_of_birth;
    }
    if body.last_period_start.is_some() {
        profile.last_period_start = body.last_period_start;
    }
    if body.last_period_end.is_some() {
        profile.last_period_end = body.last_period_end;
    }
    if body.cycle_length.is_some() {
        profile.cycle_length = body.cycle_length;
    }
    if let Some(done) = body.has_completed_onboarding {
        profile.has_completed_onboarding = done;
    }
    profile.updated_at = Some(format_utc_rfc3339(chrono::Utc::now()));

    state.store.upsert_profile(&user.user_id, &profile).await?;
    tracing::info!(user_id = %user.user_id, "Profile updated");

    Ok(Json(profile))
}

// ─── Account Deletion ────────────────────────────────────────

/// Response for account deletion.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DeleteAccountResponse {
    pub success: bool,
    pub deleted_documents: usize,
}

/// Delete the user's profile and every log (GDPR compliance).
async fn delete_account(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<DeleteAccountResponse>> {
    tracing::info!(user_id = %user.user_id, "User-initiated account deletion");

    let deleted_documents = state.store.delete_user_data(&user.user_id).await?;

    Ok(Json(DeleteAccountResponse {
        success: true,
        deleted_documents,
    }))
}
