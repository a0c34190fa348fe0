use serde_json::Value;
use tracing::instrument;

use crate::{
    documents::{Cart, Game},
    store::{DocumentStore, Filter},
    Status,
};

#[instrument(name = "carts::read", level = "trace", skip(store))]
pub async fn read(store: &dyn DocumentStore, doc_id: &str) -> Result<Cart, Status> {
    let doc = store.find_one(CARTS, Filter::eq("id", doc_id)).await?;

    match doc {
        Some(doc) => Ok(serde_json::from_value(doc)?),
        None => Err(Status::not_found(format!(
            "Document '{CARTS}/{doc_id}' was not found"
        ))),
    }
}

#[instrument(name = "carts::list", level = "trace", skip(store))]
pub async fn list(store: &dyn DocumentStore) -> Result<Vec<Cart>, Status> {
    parse_all(store.find(CARTS, Filter::All).await?)
}

/// Returns the cart currently open for `user`, if any. At most one cart per
/// user is current at a time.
#[instrument(name = "carts::current", level = "trace", skip(store))]
pub async fn current(store: &dyn DocumentStore, user: &str) -> Result<Option<Cart>, Status> {
    let carts = parse_all(store.find(CARTS, Filter::eq("user", user)).await?)?;
    Ok(carts.into_iter().find(|cart| cart.is_current))
}

/// Appends `game` to the user's current cart, opening one if none exists.
#[instrument(name = "carts::insert_game", level = "trace", skip(store, game), fields(game = %game.slug))]
pub async fn insert_game(store: &dyn DocumentStore, user: &str, game: Game) -> Result<Cart, Status> {
    match current(store, user).await? {
        Some(mut cart) => {
            cart.games.push(game);
            let doc = store
                .replace_one(CARTS, &cart.id, serde_json::to_value(&cart)?)
                .await?;
            Ok(serde_json::from_value(doc)?)
        }
        None => {
            let cart = Cart {
                user: user.to_owned(),
                games: vec![game],
                is_current: true,
                ..Default::default()
            };
            let doc = store.insert_one(CARTS, serde_json::to_value(&cart)?).await?;
            Ok(serde_json::from_value(doc)?)
        }
    }
}

/// Drops the user's current cart. A user without one is a no-op.
#[instrument(name = "carts::remove", level = "trace", skip(store))]
pub async fn remove(store: &dyn DocumentStore, user: &str) -> Result<(), Status> {
    match current(store, user).await? {
        Some(cart) => store.delete_one(CARTS, &cart.id).await,
        None => Ok(()),
    }
}

fn parse_all(docs: Vec<Value>) -> Result<Vec<Cart>, Status> {
    docs.into_iter()
        .map(|doc| Ok(serde_json::from_value(doc)?))
        .collect()
}

const CARTS: &str = "carts";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn game(slug: &str) -> Game {
        Game {
            name: slug.to_owned(),
            slug: slug.to_owned(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn insert_game_opens_a_current_cart() {
        let store = MemoryStore::new();

        let cart = insert_game(&store, "ada", game("minecraft")).await.unwrap();

        assert!(cart.is_current);
        assert_eq!(cart.games.len(), 1);
        assert_eq!(current(&store, "ada").await.unwrap().unwrap().id, cart.id);
    }

    #[tokio::test]
    async fn insert_game_reuses_the_current_cart() {
        let store = MemoryStore::new();

        let first = insert_game(&store, "ada", game("minecraft")).await.unwrap();
        let second = insert_game(&store, "ada", game("fortnite")).await.unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.games.len(), 2);
        assert_eq!(list(&store).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn carts_are_tracked_per_user() {
        let store = MemoryStore::new();

        insert_game(&store, "ada", game("minecraft")).await.unwrap();
        insert_game(&store, "grace", game("fortnite")).await.unwrap();

        let cart = current(&store, "ada").await.unwrap().unwrap();
        assert_eq!(cart.games[0].slug, "minecraft");
    }

    #[tokio::test]
    async fn remove_drops_only_the_current_cart() {
        let store = MemoryStore::new();

        insert_game(&store, "ada", game("minecraft")).await.unwrap();

        remove(&store, "ada").await.unwrap();
        remove(&store, "ada").await.unwrap();
        assert!(current(&store, "ada").await.unwrap().is_none());
    }
}
