// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Daily symptom and mood log routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{MoodLog, SymptomLog};
use crate::time_utils::{format_date, parse_date};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::get,
    Extension, Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Log routes (require authentication via JWT).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/symptoms", get(list_symptoms))
        .route("/api/symptoms/{date}", get(get_symptoms).put(put_symptoms))
        .route("/api/moods", get(list_moods))
        .route("/api/moods/{date}", get(get_moods).put(put_moods))
}

/// Log documents are keyed by plain calendar date.
fn path_date(raw: &str) -> Result<NaiveDate> {
    parse_date(raw).ok_or_else(|| AppError::BadRequest(format!("Invalid date: {}", raw)))
}

// ─── Symptoms ────────────────────────────────────────────────

async fn list_symptoms(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<SymptomLog>>> {
    Ok(Json(state.store.list_symptom_logs(&user.user_id).await?))
}

async fn get_symptoms(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(date): Path<String>,
) -> Result<Json<SymptomLog>> {
    let date = format_date(path_date(&date)?);
    let log = state
        .store
        .get_symptom_log(&user.user_id, &date)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No symptoms logged for {}", date)))?;
    Ok(Json(log))
}

#[derive(Debug, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SymptomsRequest {
    #[validate(length(max = 50))]
    pub symptoms: Vec<String>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

async fn put_symptoms(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(date): Path<String>,
    Json(body): Json<SymptomsRequest>,
) -> Result<Json<SymptomLog>> {
    body.validate()?;
    let date = path_date(&date)?;

    let log = state
        .tracker
        .record_symptoms(&user.user_id, date, clean_labels(body.symptoms), body.notes)
        .await?;
    Ok(Json(log))
}

// ─── Moods ───────────────────────────────────────────────────

async fn list_moods(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<MoodLog>>> {
    Ok(Json(state.store.list_mood_logs(&user.user_id).await?))
}

async fn get_moods(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(date): Path<String>,
) -> Result<Json<MoodLog>> {
    let date = format_date(path_date(&date)?);
    let log = state
        .store
        .get_mood_log(&user.user_id, &date)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No moods logged for {}", date)))?;
    Ok(Json(log))
}

#[derive(Debug, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MoodsRequest {
    #[validate(length(max = 20))]
    pub moods: Vec<String>,
}

async fn put_moods(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(date): Path<String>,
    Json(body): Json<MoodsRequest>,
) -> Result<Json<MoodLog>> {
    body.validate()?;
    let date = path_date(&date)?;

    let log = state
        .tracker
        .record_moods(&user.user_id, date, clean_labels(body.moods))
        .await?;
    Ok(Json(log))
}

/// Trim labels, drop empty ones, and remove repeats while keeping order.
fn clean_labels(labels: Vec<String>) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::with_capacity(labels.len());
    for label in labels {
        let label = label.trim();
        if !label.is_empty() && !cleaned.iter().any(|l| l == label) {
            cleaned.push(label.to_string());
        }
    }
    cleaned
}
