// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Middleware and request guards (authentication, ownership).

pub mod auth;
pub mod ownership;

pub use auth::require_auth;
