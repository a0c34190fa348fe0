use serde_json::Value;
use tracing::instrument;

use crate::{
    documents::{Game, GameDigest, Platform, PlatformInput},
    store::{DocumentStore, Filter},
    Status,
};

#[instrument(name = "platforms::list", level = "trace", skip(store))]
pub async fn list(store: &dyn DocumentStore) -> Result<Vec<Platform>, Status> {
    parse_all(store.find(PLATFORMS, Filter::All).await?)
}

#[instrument(name = "platforms::read", level = "trace", skip(store))]
pub async fn read(store: &dyn DocumentStore, doc_id: &str) -> Result<Platform, Status> {
    let doc = store.find_one(PLATFORMS, Filter::eq("id", doc_id)).await?;

    match doc {
        Some(doc) => Ok(serde_json::from_value(doc)?),
        None => Err(Status::not_found(format!(
            "Document '{PLATFORMS}/{doc_id}' was not found"
        ))),
    }
}

/// Returns None when no platform carries `slug`. A miss is policy for the
/// caller to decide on, not an error.
#[instrument(name = "platforms::find_by_slug", level = "trace", skip(store))]
pub async fn find_by_slug(
    store: &dyn DocumentStore,
    slug: &str,
) -> Result<Option<Platform>, Status> {
    let doc = store.find_one(PLATFORMS, Filter::eq("slug", slug)).await?;

    match doc {
        Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
        None => Ok(None),
    }
}

/// Inserts a new platform document. The slug must not be taken by an
/// existing document.
#[instrument(name = "platforms::insert", level = "trace", skip(store, input), fields(platform = %input.slug))]
pub async fn insert(store: &dyn DocumentStore, input: PlatformInput) -> Result<Platform, Status> {
    let slug = input.slug.clone();
    let taken = store
        .find_one(PLATFORMS, Filter::eq("slug", slug.as_str()))
        .await?;
    if taken.is_some() {
        return Err(Status::already_exists(format!(
            "Document '{PLATFORMS}/slug={slug}' already exists"
        )));
    }

    let platform = Platform::from(input);
    let doc = store
        .insert_one(PLATFORMS, serde_json::to_value(&platform)?)
        .await?;
    Ok(serde_json::from_value(doc)?)
}

/// Records `game` on `platform`'s embedded game list and writes the platform
/// back. Replace-or-insert keyed by game id: syncing the same game again
/// refreshes its digest instead of duplicating it.
#[instrument(
    name = "platforms::add_game",
    level = "trace",
    skip(store, platform, game),
    fields(platform = %platform.slug, game = %game.slug),
)]
pub async fn add_game(
    store: &dyn DocumentStore,
    platform: &Platform,
    game: &Game,
) -> Result<Platform, Status> {
    let mut platform = platform.clone();
    upsert_digest(&mut platform.games, GameDigest::from(game));

    let doc = store
        .replace_one(PLATFORMS, &platform.id, serde_json::to_value(&platform)?)
        .await?;
    Ok(serde_json::from_value(doc)?)
}

/// Replaces the digest carrying the same game id or appends a new one.
fn upsert_digest(digests: &mut Vec<GameDigest>, digest: GameDigest) {
    match digests.iter_mut().find(|existing| existing.id == digest.id) {
        Some(existing) => *existing = digest,
        None => digests.push(digest),
    }
}

fn parse_all(docs: Vec<Value>) -> Result<Vec<Platform>, Status> {
    docs.into_iter()
        .map(|doc| Ok(serde_json::from_value(doc)?))
        .collect()
}

const PLATFORMS: &str = "platforms";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{documents::PlatformLogo, store::MemoryStore};

    fn digest(id: &str, name: &str) -> GameDigest {
        GameDigest {
            id: id.to_owned(),
            name: name.to_owned(),
            ..Default::default()
        }
    }

    fn platform_input(name: &str, slug: &str) -> PlatformInput {
        PlatformInput {
            name: name.to_owned(),
            slug: slug.to_owned(),
            platform_logo: PlatformLogo {
                height: 128,
                width: 128,
                url: "https://images.example/logo.png".to_owned(),
            },
        }
    }

    #[test]
    fn upsert_appends_new_digests() {
        let mut digests = vec![];

        upsert_digest(&mut digests, digest("7", "Minecraft"));
        upsert_digest(&mut digests, digest("3", "Fortnite"));

        assert_eq!(digests.len(), 2);
    }

    #[test]
    fn upsert_replaces_digest_with_same_game_id() {
        let mut digests = vec![digest("7", "Minecraft")];

        upsert_digest(&mut digests, digest("7", "Minecraft: Java Edition"));

        assert_eq!(digests.len(), 1);
        assert_eq!(digests[0].name, "Minecraft: Java Edition");
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_slug() {
        let store = MemoryStore::new();

        insert(&store, platform_input("Nintendo Switch", "nintendo-switch"))
            .await
            .unwrap();
        let dup = insert(&store, platform_input("Switch", "nintendo-switch")).await;
        assert!(matches!(dup, Err(Status::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn add_game_twice_keeps_a_single_digest() {
        let store = MemoryStore::new();

        let platform = insert(&store, platform_input("Nintendo Switch", "nintendo-switch"))
            .await
            .unwrap();
        let game = Game {
            id: "42".to_owned(),
            name: "Minecraft".to_owned(),
            slug: "minecraft".to_owned(),
            ..Default::default()
        };

        let platform = add_game(&store, &platform, &game).await.unwrap();
        let platform = add_game(&store, &platform, &game).await.unwrap();

        assert_eq!(platform.games.len(), 1);
        let stored = find_by_slug(&store, "nintendo-switch").await.unwrap().unwrap();
        assert_eq!(stored.games.len(), 1);
        assert_eq!(stored.games[0].id, "42");
    }
}
