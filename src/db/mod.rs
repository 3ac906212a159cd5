// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Storage layer: the `PeriodStore` seam and its Firestore and in-memory backends.

pub mod firestore;
pub mod memory;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{MoodLog, PeriodLog, SymptomLog, UserProfile};

pub use firestore::FirestoreDb;
pub use memory::InMemoryStore;

/// Collection names as constants.
///
/// Everything but the profile lives in a subcollection of `users/{uid}`.
pub mod collections {
    pub const USERS: &str = "users";
    pub const PERIOD_LOGS: &str = "periodLogs";
    pub const SYMPTOM_LOGS: &str = "symptomLogs";
    pub const MOOD_LOGS: &str = "moodLogs";
}

/// Per-user persistence for period history, profile, and daily logs.
///
/// Every operation is scoped to one user; implementations must never return
/// another user's documents. Writes are last-write-wins.
#[async_trait]
pub trait PeriodStore: Send + Sync + 'static {
    /// Period logs ordered by start date, newest first.
    async fn list_periods(
        &self,
        user_id: &str,
        limit: Option<u32>,
    ) -> Result<Vec<PeriodLog>, AppError>;

    async fn get_period(&self, user_id: &str, id: &str) -> Result<Option<PeriodLog>, AppError>;

    /// Store a new period log and return its generated ID.
    async fn add_period(&self, user_id: &str, log: &PeriodLog) -> Result<String, AppError>;

    /// Replace the period log with `log.id`.
    async fn update_period(&self, user_id: &str, log: &PeriodLog) -> Result<(), AppError>;

    async fn delete_period(&self, user_id: &str, id: &str) -> Result<(), AppError>;

    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, AppError>;

    async fn upsert_profile(&self, user_id: &str, profile: &UserProfile) -> Result<(), AppError>;

    /// Symptom logs ordered by date, newest first.
    async fn list_symptom_logs(&self, user_id: &str) -> Result<Vec<SymptomLog>, AppError>;

    async fn get_symptom_log(
        &self,
        user_id: &str,
        date: &str,
    ) -> Result<Option<SymptomLog>, AppError>;

    /// Create or replace the symptom log for `log.date`.
    async fn set_symptom_log(&self, user_id: &str, log: &SymptomLog) -> Result<(), AppError>;

    /// Mood logs ordered by date, newest first.
    async fn list_mood_logs(&self, user_id: &str) -> Result<Vec<MoodLog>, AppError>;

    async fn get_mood_log(&self, user_id: &str, date: &str) -> Result<Option<MoodLog>, AppError>;

    /// Create or replace the mood log for `log.date`.
    async fn set_mood_log(&self, user_id: &str, log: &MoodLog) -> Result<(), AppError>;

    /// Delete every document belonging to the user and return how many were removed.
    async fn delete_user_data(&self, user_id: &str) -> Result<usize, AppError>;
}
