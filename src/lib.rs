// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Spontinerary: spontaneous itineraries from nearby places
//!
//! This crate provides the backend API for creating itineraries around a
//! location and filling them with randomly chosen places per category.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::Database;
use services::ActivityGenerator;
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Arc<dyn Database>,
    pub generator: ActivityGenerator,
}
