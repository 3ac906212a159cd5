// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore-backed [`PeriodStore`].
//!
//! Layout mirrors what the mobile client writes:
//! - `users/{uid}` holds the profile
//! - `users/{uid}/periodLogs/{id}`
//! - `users/{uid}/symptomLogs/{YYYY-MM-DD}`
//! - `users/{uid}/moodLogs/{YYYY-MM-DD}`
//!
//! Document IDs are never written as fields; they come back through the
//! `_firestore_id` alias on read.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::db::{collections, PeriodStore};
use crate::error::AppError;
use crate::models::{MoodLog, PeriodLog, SymptomLog, UserProfile};

// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
const BATCH_SIZE: usize = 400;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: firestore::FirestoreDb,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // The emulator rejects real credentials, so skip the auth lookup entirely.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self { client })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self { client })
    }

    // ─── Subcollection Helpers ───────────────────────────────────

    /// All documents of a user subcollection.
    async fn list_user_docs<T>(&self, user_id: &str, collection: &str) -> Result<Vec<T>, AppError>
    where
        T: DeserializeOwned + Send,
    {
        let client = &self.client;
        let parent = client
            .parent_path(collections::USERS, user_id)
            .map_err(|e| AppError::Database(e.to_string()))?;

        client
            .fluent()
            .select()
            .from(collection)
            .parent(&parent)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// One document of a user subcollection.
    async fn get_user_doc<T>(
        &self,
        user_id: &str,
        collection: &str,
        doc_id: &str,
    ) -> Result<Option<T>, AppError>
    where
        T: DeserializeOwned + Send,
    {
        let client = &self.client;
        let parent = client
            .parent_path(collections::USERS, user_id)
            .map_err(|e| AppError::Database(e.to_string()))?;

        client
            .fluent()
            .select()
            .by_id_in(collection)
            .parent(&parent)
            .obj()
            .one(doc_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or replace one document of a user subcollection.
    async fn set_user_doc<T>(
        &self,
        user_id: &str,
        collection: &str,
        doc_id: &str,
        doc: &T,
    ) -> Result<(), AppError>
    where
        T: Serialize + DeserializeOwned + Sync + Send,
    {
        let client = &self.client;
        let parent = client
            .parent_path(collections::USERS, user_id)
            .map_err(|e| AppError::Database(e.to_string()))?;

        let _: () = client
            .fluent()
            .update()
            .in_col(collection)
            .document_id(doc_id)
            .parent(&parent)
            .object(doc)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete documents from a user subcollection in transaction-sized chunks.
    async fn batch_delete(
        &self,
        user_id: &str,
        collection: &str,
        doc_ids: &[String],
    ) -> Result<(), AppError> {
        let client = &self.client;
        let parent = client
            .parent_path(collections::USERS, user_id)
            .map_err(|e| AppError::Database(e.to_string()))?;

        for chunk in doc_ids.chunks(BATCH_SIZE) {
            let mut transaction = client
                .begin_transaction()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            for doc_id in chunk {
                client
                    .fluent()
                    .delete()
                    .from(collection)
                    .document_id(doc_id)
                    .parent(&parent)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!(
                            "Failed to add deletion to transaction for {}: {}",
                            collection, e
                        ))
                    })?;
            }

            transaction.commit().await.map_err(|e| {
                AppError::Database(format!("Failed to commit batch deletion: {}", e))
            })?;
        }

        Ok(())
    }
}

#[async_trait]
impl PeriodStore for FirestoreDb {
    // ─── Period Operations ───────────────────────────────────────

    async fn list_periods(
        &self,
        user_id: &str,
        limit: Option<u32>,
    ) -> Result<Vec<PeriodLog>, AppError> {
        let client = &self.client;
        let parent = client
            .parent_path(collections::USERS, user_id)
            .map_err(|e| AppError::Database(e.to_string()))?;

        let query = client
            .fluent()
            .select()
            .from(collections::PERIOD_LOGS)
            .parent(&parent)
            .order_by([("startDate", firestore::FirestoreQueryDirection::Descending)]);

        let query = match limit {
            Some(limit) => query.limit(limit),
            None => query,
        };

        query
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn get_period(&self, user_id: &str, id: &str) -> Result<Option<PeriodLog>, AppError> {
        self.get_user_doc(user_id, collections::PERIOD_LOGS, id)
            .await
    }

    async fn add_period(&self, user_id: &str, log: &PeriodLog) -> Result<String, AppError> {
        let id = uuid::Uuid::new_v4().simple().to_string();
        let doc = PeriodLog {
            id: String::new(),
            ..log.clone()
        };
        self.set_user_doc(user_id, collections::PERIOD_LOGS, &id, &doc)
            .await?;

        tracing::debug!(user_id, period_id = %id, "Stored period log");
        Ok(id)
    }

    async fn update_period(&self, user_id: &str, log: &PeriodLog) -> Result<(), AppError> {
        let doc = PeriodLog {
            id: String::new(),
            ..log.clone()
        };
        self.set_user_doc(user_id, collections::PERIOD_LOGS, &log.id, &doc)
            .await
    }

    async fn delete_period(&self, user_id: &str, id: &str) -> Result<(), AppError> {
        let client = &self.client;
        let parent = client
            .parent_path(collections::USERS, user_id)
            .map_err(|e| AppError::Database(e.to_string()))?;

        client
            .fluent()
            .delete()
            .from(collections::PERIOD_LOGS)
            .document_id(id)
            .parent(&parent)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Profile Operations ──────────────────────────────────────

    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, AppError> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn upsert_profile(&self, user_id: &str, profile: &UserProfile) -> Result<(), AppError> {
        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(user_id)
            .object(profile)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Daily Log Operations ────────────────────────────────────

    async fn list_symptom_logs(&self, user_id: &str) -> Result<Vec<SymptomLog>, AppError> {
        // The date only exists as the document ID, so sort after fetching
        let mut logs: Vec<SymptomLog> = self
            .list_user_docs(user_id, collections::SYMPTOM_LOGS)
            .await?;
        logs.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(logs)
    }

    async fn get_symptom_log(
        &self,
        user_id: &str,
        date: &str,
    ) -> Result<Option<SymptomLog>, AppError> {
        self.get_user_doc(user_id, collections::SYMPTOM_LOGS, date)
            .await
    }

    async fn set_symptom_log(&self, user_id: &str, log: &SymptomLog) -> Result<(), AppError> {
        let doc = SymptomLog {
            date: String::new(),
            ..log.clone()
        };
        self.set_user_doc(user_id, collections::SYMPTOM_LOGS, &log.date, &doc)
            .await
    }

    async fn list_mood_logs(&self, user_id: &str) -> Result<Vec<MoodLog>, AppError> {
        let mut logs: Vec<MoodLog> = self.list_user_docs(user_id, collections::MOOD_LOGS).await?;
        logs.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(logs)
    }

    async fn get_mood_log(&self, user_id: &str, date: &str) -> Result<Option<MoodLog>, AppError> {
        self.get_user_doc(user_id, collections::MOOD_LOGS, date)
            .await
    }

    async fn set_mood_log(&self, user_id: &str, log: &MoodLog) -> Result<(), AppError> {
        let doc = MoodLog {
            date: String::new(),
            ..log.clone()
        };
        self.set_user_doc(user_id, collections::MOOD_LOGS, &log.date, &doc)
            .await
    }

    // ─── User Data Deletion ──────────────────────────────────────

    /// Delete the profile and every subcollection document for a user.
    ///
    /// Firestore does not cascade deletes, so each subcollection is listed
    /// and cleared explicitly before the parent document goes.
    async fn delete_user_data(&self, user_id: &str) -> Result<usize, AppError> {
        let mut deleted_count = 0;

        let periods: Vec<PeriodLog> = self
            .list_user_docs(user_id, collections::PERIOD_LOGS)
            .await?;
        let ids: Vec<String> = periods.into_iter().map(|p| p.id).collect();
        self.batch_delete(user_id, collections::PERIOD_LOGS, &ids)
            .await?;
        deleted_count += ids.len();
        tracing::debug!(user_id, count = ids.len(), "Deleted period logs");

        let symptoms: Vec<SymptomLog> = self
            .list_user_docs(user_id, collections::SYMPTOM_LOGS)
            .await?;
        let ids: Vec<String> = symptoms.into_iter().map(|s| s.date).collect();
        self.batch_delete(user_id, collections::SYMPTOM_LOGS, &ids)
            .await?;
        deleted_count += ids.len();
        tracing::debug!(user_id, count = ids.len(), "Deleted symptom logs");

        let moods: Vec<MoodLog> = self.list_user_docs(user_id, collections::MOOD_LOGS).await?;
        let ids: Vec<String> = moods.into_iter().map(|m| m.date).collect();
        self.batch_delete(user_id, collections::MOOD_LOGS, &ids)
            .await?;
        deleted_count += ids.len();
        tracing::debug!(user_id, count = ids.len(), "Deleted mood logs");

        let has_profile = self.get_profile(user_id).await?.is_some();
        self.client
            .fluent()
            .delete()
            .from(collections::USERS)
            .document_id(user_id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        if has_profile {
            deleted_count += 1;
        }

        tracing::info!(user_id, deleted_count, "User data deletion complete");

        Ok(deleted_count)
    }
}
