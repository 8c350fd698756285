use jupiter_api::auth::{PgSessionValidator, SessionValidator};
use jupiter_api::search::{FavoritesStore, PgFavoritesStore};
use jupiter_api::test_support::{TestDatabase, TestDatabaseError, TestFixtures};

async fn provision(test_name: &str) -> Option<TestDatabase> {
    match TestDatabase::new_from_env().await {
        Ok(db) => Some(db),
        Err(TestDatabaseError::MissingUrl) => {
            eprintln!("skipping {test_name}: TEST_DATABASE_URL not set");
            None
        }
        Err(err) => panic!("failed to provision test database: {err:?}"),
    }
}

#[tokio::test]
async fn migrations_create_search_tables() {
    let Some(test_db) = provision("migrations_create_search_tables").await else {
        return;
    };

    let tables: Vec<String> = sqlx::query_scalar(
        "SELECT table_name::text FROM information_schema.tables WHERE table_schema = 'public' ORDER BY table_name",
    )
    .fetch_all(test_db.pool())
    .await
    .expect("failed to list tables");

    assert!(tables.contains(&"favorites".to_string()));
    assert!(tables.contains(&"sessions".to_string()));

    test_db.close().await.expect("failed to drop test database");
}

#[tokio::test]
async fn favorites_are_scoped_to_the_user() {
    let Some(test_db) = provision("favorites_are_scoped_to_the_user").await else {
        return;
    };
    let fixtures = TestFixtures::new(test_db.pool());
    fixtures.insert_favorite("alice", "job-1").await.expect("insert favorite");
    fixtures.insert_favorite("alice", "job-7").await.expect("insert favorite");
    fixtures.insert_favorite("bob", "job-2").await.expect("insert favorite");

    let store = PgFavoritesStore::new(test_db.pool_clone());

    let alice = store.favorite_item_ids("alice").await.expect("query favorites");
    assert_eq!(alice.len(), 2);
    assert!(alice.contains("job-1"));
    assert!(alice.contains("job-7"));

    let nobody = store.favorite_item_ids("carol").await.expect("query favorites");
    assert!(nobody.is_empty());

    test_db.close().await.expect("failed to drop test database");
}

#[tokio::test]
async fn sessions_validate_until_they_expire() {
    let Some(test_db) = provision("sessions_validate_until_they_expire").await else {
        return;
    };
    let fixtures = TestFixtures::new(test_db.pool());
    let live = fixtures
        .insert_session("alice", chrono::Duration::hours(1))
        .await
        .expect("insert session");
    let expired = fixtures
        .insert_session("bob", chrono::Duration::hours(-1))
        .await
        .expect("insert session");

    let validator = PgSessionValidator::new(test_db.pool_clone());

    let session = validator
        .validate(&live)
        .await
        .expect("validate session")
        .expect("live session resolves");
    assert_eq!(session.user_id, "alice");

    assert!(validator.validate(&expired).await.expect("validate session").is_none());
    assert!(validator.validate("not-a-token").await.expect("validate session").is_none());

    test_db.close().await.expect("failed to drop test database");
}
