// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Luna Tracker: cycle-phase engine and API for a period-tracking app
//!
//! This crate estimates cycle length from logged periods, classifies each
//! day into a cycle phase, annotates calendar months, and serves the
//! results over an authenticated JSON API.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use std::sync::Arc;

use config::Config;
use db::PeriodStore;
use services::TrackerService;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn PeriodStore>,
    pub tracker: TrackerService,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn PeriodStore>) -> Self {
        let tracker = TrackerService::new(store.clone(), config.period_history_limit);
        Self {
            config,
            store,
            tracker,
        }
    }
}
