// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User profile (onboarding answers) stored at `users/{uid}`.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Profile document written during onboarding.
///
/// The period fields are only a fallback: once the user has logged periods,
/// the logs take precedence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    /// Onboarding answer for the last period start (ISO date)
    #[serde(default)]
    pub last_period_start: Option<String>,
    #[serde(default)]
    pub last_period_end: Option<String>,
    /// Self-reported cycle length
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle_length: Option<u32>,
    #[serde(default)]
    pub has_completed_onboarding: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl UserProfile {
    /// Whether the profile still carries both onboarding period dates.
    pub fn has_onboarding_period(&self) -> bool {
        let present =
            |field: &Option<String>| field.as_deref().is_some_and(|s| !s.trim().is_empty());
        present(&self.last_period_start) && present(&self.last_period_end)
    }

    /// Drop the onboarding period dates once they have been migrated.
    pub fn clear_onboarding_period(&mut self) {
        self.last_period_start = None;
        self.last_period_end = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_onboarding_period_needs_start_and_end() {
        let mut profile = UserProfile {
            last_period_start: Some("2024-01-10".to_string()),
            ..UserProfile::default()
        };
        assert!(!profile.has_onboarding_period());

        profile.last_period_end = Some("2024-01-14".to_string());
        assert!(profile.has_onboarding_period());

        profile.clear_onboarding_period();
        assert!(!profile.has_onboarding_period());
        assert_eq!(profile.last_period_start, None);
        assert_eq!(profile.last_period_end, None);
    }
}
