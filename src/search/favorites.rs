use super::error::FavoritesError;
use super::types::Item;
use rocket_db_pools::sqlx::{self, PgPool};
use std::collections::HashSet;

/// Read access to the items a user has saved.
#[rocket::async_trait]
pub trait FavoritesStore: Send + Sync {
    async fn favorite_item_ids(&self, user_id: &str) -> Result<HashSet<String>, FavoritesError>;
}

/// Favorites kept in the `favorites` table.
#[derive(Debug, Clone)]
pub struct PgFavoritesStore {
    pool: PgPool,
}

impl PgFavoritesStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[rocket::async_trait]
impl FavoritesStore for PgFavoritesStore {
    async fn favorite_item_ids(&self, user_id: &str) -> Result<HashSet<String>, FavoritesError> {
        let ids: Vec<String> = sqlx::query_scalar("SELECT item_id FROM favorites WHERE user_id = $1")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(ids.into_iter().collect())
    }
}

/// Load the favorite snapshot for one request. A blank user id has no
/// favorites and never reaches the store.
pub async fn load_favorites(
    store: &dyn FavoritesStore,
    user_id: &str,
) -> Result<HashSet<String>, FavoritesError> {
    let user_id = user_id.trim();
    if user_id.is_empty() {
        return Ok(HashSet::new());
    }
    store.favorite_item_ids(user_id).await
}

/// Flag every item whose id is in `favorites`.
pub fn enrich(mut items: Vec<Item>, favorites: &HashSet<String>) -> Vec<Item> {
    for item in &mut items {
        item.favorite = favorites.contains(&item.item_id);
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn item(id: &str) -> Item {
        Item {
            item_id: id.to_string(),
            name: String::new(),
            address: String::new(),
            url: String::new(),
            image_url: String::new(),
            keywords: Default::default(),
            favorite: false,
        }
    }

    #[derive(Default)]
    struct RecordingStore {
        lookups: Mutex<Vec<String>>,
    }

    #[rocket::async_trait]
    impl FavoritesStore for RecordingStore {
        async fn favorite_item_ids(
            &self,
            user_id: &str,
        ) -> Result<HashSet<String>, FavoritesError> {
            self.lookups.lock().unwrap().push(user_id.to_string());
            Ok(HashSet::from(["42".to_string()]))
        }
    }

    #[test]
    fn only_matching_items_are_flagged() {
        let favorites = HashSet::from(["42".to_string()]);
        let items = enrich(vec![item("41"), item("42"), item("43")], &favorites);

        let flags: Vec<bool> = items.iter().map(|item| item.favorite).collect();
        assert_eq!(flags, vec![false, true, false]);
    }

    #[test]
    fn empty_favorites_flag_nothing() {
        let items = enrich(vec![item("1"), item("2")], &HashSet::new());
        assert!(items.iter().all(|item| !item.favorite));
    }

    #[tokio::test]
    async fn blank_user_skips_the_store() {
        let store = RecordingStore::default();

        let favorites = load_favorites(&store, "  ").await.unwrap();

        assert!(favorites.is_empty());
        assert!(store.lookups.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn known_user_is_looked_up_once() {
        let store = RecordingStore::default();

        let favorites = load_favorites(&store, "alice").await.unwrap();

        assert!(favorites.contains("42"));
        assert_eq!(*store.lookups.lock().unwrap(), vec!["alice".to_string()]);
    }
}
