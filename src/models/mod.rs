// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity;
pub mod itinerary;
pub mod user;

pub use activity::Activity;
pub use itinerary::Itinerary;
pub use user::User;
