// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod cycle;
pub mod tracker;

pub use tracker::{CycleOverview, TrackerService};
