// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process [`PeriodStore`] for tests and local runs without Firestore.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::db::PeriodStore;
use crate::error::AppError;
use crate::models::{MoodLog, PeriodLog, SymptomLog, UserProfile};
use crate::time_utils::parse_date;

#[derive(Debug, Default)]
struct UserData {
    profile: Option<UserProfile>,
    periods: HashMap<String, PeriodLog>,
    symptoms: BTreeMap<String, SymptomLog>,
    moods: BTreeMap<String, MoodLog>,
}

impl UserData {
    fn document_count(&self) -> usize {
        usize::from(self.profile.is_some())
            + self.periods.len()
            + self.symptoms.len()
            + self.moods.len()
    }
}

/// Store backed by a concurrent map keyed by user ID.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    users: DashMap<String, UserData>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PeriodStore for InMemoryStore {
    async fn list_periods(
        &self,
        user_id: &str,
        limit: Option<u32>,
    ) -> Result<Vec<PeriodLog>, AppError> {
        let Some(data) = self.users.get(user_id) else {
            return Ok(Vec::new());
        };

        let mut logs: Vec<PeriodLog> = data.periods.values().cloned().collect();
        // Match Firestore's string ordering, but keep calendar order for mixed formats
        logs.sort_by(|a, b| {
            parse_date(&b.start_date)
                .cmp(&parse_date(&a.start_date))
                .then_with(|| b.start_date.cmp(&a.start_date))
        });

        if let Some(limit) = limit {
            logs.truncate(limit as usize);
        }
        Ok(logs)
    }

    async fn get_period(&self, user_id: &str, id: &str) -> Result<Option<PeriodLog>, AppError> {
        Ok(self
            .users
            .get(user_id)
            .and_then(|data| data.periods.get(id).cloned()))
    }

    async fn add_period(&self, user_id: &str, log: &PeriodLog) -> Result<String, AppError> {
        let id = uuid::Uuid::new_v4().simple().to_string();
        let log = PeriodLog {
            id: id.clone(),
            ..log.clone()
        };
        self.users
            .entry(user_id.to_string())
            .or_default()
            .periods
            .insert(id.clone(), log);
        Ok(id)
    }

    async fn update_period(&self, user_id: &str, log: &PeriodLog) -> Result<(), AppError> {
        self.users
            .entry(user_id.to_string())
            .or_default()
            .periods
            .insert(log.id.clone(), log.clone());
        Ok(())
    }

    async fn delete_period(&self, user_id: &str, id: &str) -> Result<(), AppError> {
        if let Some(mut data) = self.users.get_mut(user_id) {
            data.periods.remove(id);
        }
        Ok(())
    }

    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, AppError> {
        Ok(self
            .users
            .get(user_id)
            .and_then(|data| data.profile.clone()))
    }

    async fn upsert_profile(&self, user_id: &str, profile: &UserProfile) -> Result<(), AppError> {
        self.users.entry(user_id.to_string()).or_default().profile = Some(profile.clone());
        Ok(())
    }

    async fn list_symptom_logs(&self, user_id: &str) -> Result<Vec<SymptomLog>, AppError> {
        Ok(self
            .users
            .get(user_id)
            .map(|data| data.symptoms.values().rev().cloned().collect())
            .unwrap_or_default())
    }

    async fn get_symptom_log(
        &self,
        user_id: &str,
        date: &str,
    ) -> Result<Option<SymptomLog>, AppError> {
        Ok(self
            .users
            .get(user_id)
            .and_then(|data| data.symptoms.get(date).cloned()))
    }

    async fn set_symptom_log(&self, user_id: &str, log: &SymptomLog) -> Result<(), AppError> {
        self.users
            .entry(user_id.to_string())
            .or_default()
            .symptoms
            .insert(log.date.clone(), log.clone());
        Ok(())
    }

    async fn list_mood_logs(&self, user_id: &str) -> Result<Vec<MoodLog>, AppError> {
        Ok(self
            .users
            .get(user_id)
            .map(|data| data.moods.values().rev().cloned().collect())
            .unwrap_or_default())
    }

    async fn get_mood_log(&self, user_id: &str, date: &str) -> Result<Option<MoodLog>, AppError> {
        Ok(self
            .users
            .get(user_id)
            .and_then(|data| data.moods.get(date).cloned()))
    }

    async fn set_mood_log(&self, user_id: &str, log: &MoodLog) -> Result<(), AppError> {
        self.users
            .entry(user_id.to_string())
            .or_default()
            .moods
            .insert(log.date.clone(), log.clone());
        Ok(())
    }

    async fn delete_user_data(&self, user_id: &str) -> Result<usize, AppError> {
        let deleted_count = self
            .users
            .remove(user_id)
            .map(|(_, data)| data.document_count())
            .unwrap_or(0);

        tracing::info!(user_id, deleted_count, "User data deletion complete");
        Ok(deleted_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn period(start: &str) -> PeriodLog {
        PeriodLog {
            id: String::new(),
            start_date: start.to_string(),
            end_date: None,
            duration: None,
            flow: None,
            notes: None,
            logged_at: None,
            kind: None,
            source: None,
            is_ongoing: true,
        }
    }

    #[tokio::test]
    async fn test_periods_newest_first_with_limit() {
        let store = InMemoryStore::new();
        for start in ["2024-01-01", "2024-03-01", "2024-02-01T10:00:00Z"] {
            store.add_period("u1", &period(start)).await.unwrap();
        }

        let all = store.list_periods("u1", None).await.unwrap();
        let starts: Vec<&str> = all.iter().map(|p| p.start_date.as_str()).collect();
        assert_eq!(starts, vec!["2024-03-01", "2024-02-01T10:00:00Z", "2024-01-01"]);

        let limited = store.list_periods("u1", Some(2)).await.unwrap();
        assert_eq!(limited.len(), 2);
    }

    #[tokio::test]
    async fn test_users_are_isolated() {
        let store = InMemoryStore::new();
        let id = store.add_period("u1", &period("2024-01-01")).await.unwrap();

        assert!(store.get_period("u2", &id).await.unwrap().is_none());
        assert!(store.list_periods("u2", None).await.unwrap().is_empty());

        // Deleting through another user is a no-op
        store.delete_period("u2", &id).await.unwrap();
        assert!(store.get_period("u1", &id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_update_and_delete_period() {
        let store = InMemoryStore::new();
        let id = store.add_period("u1", &period("2024-01-01")).await.unwrap();

        let mut log = store.get_period("u1", &id).await.unwrap().unwrap();
        log.end_date = Some("2024-01-05".to_string());
        log.is_ongoing = false;
        store.update_period("u1", &log).await.unwrap();

        let stored = store.get_period("u1", &id).await.unwrap().unwrap();
        assert_eq!(stored.end_date.as_deref(), Some("2024-01-05"));

        store.delete_period("u1", &id).await.unwrap();
        assert!(store.get_period("u1", &id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_user_data_counts_documents() {
        let store = InMemoryStore::new();
        store.add_period("u1", &period("2024-01-01")).await.unwrap();
        store
            .upsert_profile("u1", &UserProfile::default())
            .await
            .unwrap();
        store
            .set_mood_log(
                "u1",
                &MoodLog {
                    date: "2024-01-02".to_string(),
                    moods: vec!["Calm".to_string()],
                    timestamp: String::new(),
                },
            )
            .await
            .unwrap();

        assert_eq!(store.delete_user_data("u1").await.unwrap(), 3);
        assert!(store.get_profile("u1").await.unwrap().is_none());
        assert_eq!(store.delete_user_data("u1").await.unwrap(), 0);
    }
}
