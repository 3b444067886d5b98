// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod generator;
pub mod password;
pub mod places;

pub use generator::ActivityGenerator;
pub use places::{
    Coordinates, GooglePlacesClient, PlaceDetails, PlaceSummary, PlacesApi, PlacesError,
};
