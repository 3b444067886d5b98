// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity generator tests against a scripted places backend.
//!
//! These tests verify that:
//! 1. One activity is produced per category with candidates, in input order
//! 2. Categories without candidates are skipped, not errors
//! 3. Upstream failures abort the run with nothing persisted
//! 4. The location is geocoded once per run
//! 5. A fixed seed makes the pick reproducible

use spontinerary::db::{Database, MemoryDb};
use spontinerary::error::AppError;
use spontinerary::services::{ActivityGenerator, PlacesApi, PlacesError};
use std::sync::Arc;

mod common;

use common::{seed_itinerary, seed_user, FakePlaces, CHICAGO};

fn generator(places: &Arc<FakePlaces>, db: &Arc<MemoryDb>, seed: u64) -> ActivityGenerator {
    ActivityGenerator::with_seed(
        places.clone() as Arc<dyn PlacesApi>,
        db.clone() as Arc<dyn Database>,
        Some(seed),
    )
}

fn categories(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_one_activity_per_category_in_order() {
    let places = Arc::new(
        FakePlaces::new()
            .with_places("Food", &[("p-food", "Portillo's", "520 W Taylor St")])
            .with_places("Tours", &[("p-tour", "Architecture Boat Tour", "112 E Wacker Dr")])
            .with_details(
                "p-tour",
                "https://maps.google.com/?cid=2",
                Some("River cruise past landmark towers."),
            ),
    );
    let db = Arc::new(MemoryDb::new());
    let user = seed_user(db.as_ref(), "traveler").await;
    let itinerary = seed_itinerary(db.as_ref(), &user).await;

    let created = generator(&places, &db, 7)
        .generate(&itinerary, &categories(&["Food", "Tours"]))
        .await
        .unwrap();

    assert_eq!(created.len(), 2);
    assert_eq!(created[0].category, "Food");
    assert_eq!(created[0].title, "Portillo's");
    assert_eq!(created[0].address.as_deref(), Some("520 W Taylor St"));
    // No details record for the first place
    assert_eq!(created[0].activity_url, None);
    assert_eq!(created[0].summary, None);

    assert_eq!(created[1].category, "Tours");
    assert_eq!(
        created[1].activity_url.as_deref(),
        Some("https://maps.google.com/?cid=2")
    );
    assert_eq!(
        created[1].summary.as_deref(),
        Some("River cruise past landmark towers.")
    );

    for activity in &created {
        assert_eq!(activity.itinerary_id, itinerary.id);
        assert_eq!(activity.user_id, user.id);
    }

    let stored = db.list_activities_for_itinerary(itinerary.id).await.unwrap();
    let stored_categories: Vec<_> = stored.iter().map(|a| a.category.as_str()).collect();
    assert_eq!(stored_categories, vec!["Food", "Tours"]);
}

#[tokio::test]
async fn test_categories_without_results_are_skipped() {
    let places = Arc::new(
        FakePlaces::new()
            .with_places("Food", &[("p1", "Lou Malnati's", "439 N Wells St")])
            .with_places("Museums", &[("p2", "Field Museum", "1400 S Lake Shore Dr")]),
    );
    let db = Arc::new(MemoryDb::new());
    let user = seed_user(db.as_ref(), "skipper").await;
    let itinerary = seed_itinerary(db.as_ref(), &user).await;

    let created = generator(&places, &db, 7)
        .generate(&itinerary, &categories(&["Food", "Skydiving", "Museums"]))
        .await
        .unwrap();

    let got: Vec<_> = created.iter().map(|a| a.category.as_str()).collect();
    assert_eq!(got, vec!["Food", "Museums"]);
    assert_eq!(
        places.searched_keywords(),
        vec!["Food", "Skydiving", "Museums"]
    );
    assert_eq!(db.list_activities_for_user(user.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_no_candidates_at_all_commits_nothing() {
    let places = Arc::new(FakePlaces::new());
    let db = Arc::new(MemoryDb::new());
    let user = seed_user(db.as_ref(), "nobody").await;
    let itinerary = seed_itinerary(db.as_ref(), &user).await;

    let created = generator(&places, &db, 7)
        .generate(&itinerary, &categories(&["Igloos"]))
        .await
        .unwrap();

    assert!(created.is_empty());
    assert!(db.list_activities_for_user(user.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_geocode_zero_results_persists_nothing() {
    let places = Arc::new(
        FakePlaces::failing_geocode("ZERO_RESULTS")
            .with_places("Food", &[("p1", "Portillo's", "520 W Taylor St")]),
    );
    let db = Arc::new(MemoryDb::new());
    let user = seed_user(db.as_ref(), "lost").await;
    let itinerary = seed_itinerary(db.as_ref(), &user).await;

    let err = generator(&places, &db, 7)
        .generate(&itinerary, &categories(&["Food", "Tours"]))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Places(PlacesError::Geocode(_))));
    assert!(err.to_string().contains("ZERO_RESULTS"));
    assert!(places.searched_keywords().is_empty());
    assert!(db.list_activities_for_user(user.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_search_failure_after_staging_persists_nothing() {
    let places = Arc::new(
        FakePlaces::new()
            .with_places("Food", &[("p-food", "Portillo's", "520 W Taylor St")])
            .with_places("Tours", &[("p-tour", "Architecture Boat Tour", "112 E Wacker Dr")])
            .with_failing_search("Tours"),
    );
    let db = Arc::new(MemoryDb::new());
    let user = seed_user(db.as_ref(), "halfway").await;
    let itinerary = seed_itinerary(db.as_ref(), &user).await;

    let err = generator(&places, &db, 7)
        .generate(&itinerary, &categories(&["Food", "Tours"]))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::Places(PlacesError::Search { status: 500 })
    ));
    assert_eq!(places.searched_keywords(), vec!["Food", "Tours"]);
    assert!(db
        .list_activities_for_itinerary(itinerary.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_details_failure_after_staging_persists_nothing() {
    let places = Arc::new(
        FakePlaces::new()
            .with_places("Food", &[("p-food", "Portillo's", "520 W Taylor St")])
            .with_places("Tours", &[("p-tour", "Architecture Boat Tour", "112 E Wacker Dr")])
            .with_details("p-food", "https://maps.google.com/?cid=1", None)
            .with_failing_details("p-tour"),
    );
    let db = Arc::new(MemoryDb::new());
    let user = seed_user(db.as_ref(), "detailed").await;
    let itinerary = seed_itinerary(db.as_ref(), &user).await;

    let err = generator(&places, &db, 7)
        .generate(&itinerary, &categories(&["Food", "Tours"]))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::Places(PlacesError::Details { status: 500 })
    ));
    assert!(db
        .list_activities_for_itinerary(itinerary.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_location_geocoded_once_and_radius_in_meters() {
    let places = Arc::new(
        FakePlaces::new()
            .with_places("Food", &[("p1", "Portillo's", "520 W Taylor St")])
            .with_places("Parks", &[("p2", "Millennium Park", "201 E Randolph St")]),
    );
    let db = Arc::new(MemoryDb::new());
    let user = seed_user(db.as_ref(), "once").await;
    let itinerary = seed_itinerary(db.as_ref(), &user).await;

    generator(&places, &db, 7)
        .generate(&itinerary, &categories(&["Food", "Parks", "Food"]))
        .await
        .unwrap();

    assert_eq!(places.geocode_calls(), 1);

    let searches = places.searches.lock().unwrap();
    assert_eq!(searches.len(), 3);
    for (location, radius, _) in searches.iter() {
        assert_eq!(*location, CHICAGO);
        assert_eq!(*radius, 5000);
    }
}

#[tokio::test]
async fn test_fixed_seed_gives_reproducible_picks() {
    let candidates = [
        ("a", "Alinea", "1723 N Halsted St"),
        ("b", "Au Cheval", "800 W Randolph St"),
        ("c", "Girl & the Goat", "809 W Randolph St"),
        ("d", "Pequod's", "2207 N Clybourn Ave"),
        ("e", "Superdawg", "6363 N Milwaukee Ave"),
    ];
    let places = Arc::new(FakePlaces::new().with_places("Food", &candidates));

    let mut picks = Vec::new();
    for _ in 0..2 {
        let db = Arc::new(MemoryDb::new());
        let user = seed_user(db.as_ref(), "seeded").await;
        let itinerary = seed_itinerary(db.as_ref(), &user).await;

        let created = generator(&places, &db, 42)
            .generate(&itinerary, &categories(&["Food", "Food", "Food"]))
            .await
            .unwrap();
        picks.push(created.into_iter().map(|a| a.title).collect::<Vec<_>>());
    }

    assert_eq!(picks[0], picks[1]);
    let names: Vec<_> = candidates.iter().map(|(_, n, _)| n.to_string()).collect();
    assert!(picks[0].iter().all(|p| names.contains(p)));
}

#[tokio::test]
async fn test_commit_rejects_foreign_itinerary() {
    let places = Arc::new(
        FakePlaces::new().with_places("Food", &[("p1", "Portillo's", "520 W Taylor St")]),
    );
    let db = Arc::new(MemoryDb::new());
    let owner = seed_user(db.as_ref(), "owner").await;
    let other = seed_user(db.as_ref(), "other").await;
    let mut itinerary = seed_itinerary(db.as_ref(), &owner).await;

    // Staged activities copy the claimed owner; the store must refuse them.
    itinerary.user_id = other.id;
    let err = generator(&places, &db, 7)
        .generate(&itinerary, &categories(&["Food"]))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Forbidden(_)));
    assert!(db.list_activities_for_itinerary(itinerary.id).await.unwrap().is_empty());
}
