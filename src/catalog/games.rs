use serde_json::Value;
use tracing::instrument;

use crate::{
    documents::{Game, GameInput, Platform, PlatformDigest},
    store::{DocumentStore, Filter},
    Status,
};

#[instrument(name = "games::list", level = "trace", skip(store))]
pub async fn list(store: &dyn DocumentStore) -> Result<Vec<Game>, Status> {
    parse_all(store.find(GAMES, Filter::All).await?)
}

#[instrument(name = "games::find_by_slug", level = "trace", skip(store))]
pub async fn find_by_slug(store: &dyn DocumentStore, slug: &str) -> Result<Game, Status> {
    let doc = store.find_one(GAMES, Filter::eq("slug", slug)).await?;

    match doc {
        Some(doc) => Ok(serde_json::from_value(doc)?),
        None => Err(Status::not_found(format!(
            "Document '{GAMES}/slug={slug}' was not found"
        ))),
    }
}

/// Returns every game whose embedded platform list carries `platform_slug`.
#[instrument(name = "games::find_by_platform", level = "trace", skip(store))]
pub async fn find_by_platform(
    store: &dyn DocumentStore,
    platform_slug: &str,
) -> Result<Vec<Game>, Status> {
    parse_all(
        store
            .find(GAMES, Filter::eq("platforms.slug", platform_slug))
            .await?,
    )
}

/// Structural validation: every mandatory input field must be present.
/// Returns one message per missing field; an empty list means valid.
pub fn validate(input: &GameInput) -> Vec<String> {
    [
        ("cover_url", input.cover_url.is_empty()),
        ("name", input.name.is_empty()),
        ("platform_slugs", input.platform_slugs.is_empty()),
        ("slug", input.slug.is_empty()),
        ("summary", input.summary.is_empty()),
    ]
    .into_iter()
    .filter_map(|(field, missing)| match missing {
        true => Some(format!("Field '{field}' must be present.")),
        false => None,
    })
    .collect()
}

/// Inserts a new game document. When `platforms` is supplied the game's
/// embedded platform digests are built from it before the write. The game's
/// slug must not be taken by an existing document.
#[instrument(name = "games::insert", level = "trace", skip(store, input, platforms), fields(game = %input.slug))]
pub async fn insert(
    store: &dyn DocumentStore,
    input: GameInput,
    platforms: Option<&[Platform]>,
) -> Result<Game, Status> {
    let slug = input.slug.clone();
    let taken = store
        .find_one(GAMES, Filter::eq("slug", slug.as_str()))
        .await?;
    if taken.is_some() {
        return Err(Status::already_exists(format!(
            "Document '{GAMES}/slug={slug}' already exists"
        )));
    }

    let mut game = Game::from(input);
    if let Some(platforms) = platforms {
        embed_platforms(&mut game, platforms);
    }

    let doc = store.insert_one(GAMES, serde_json::to_value(&game)?).await?;
    Ok(serde_json::from_value(doc)?)
}

/// Fully replaces the game document with id `doc_id`. Fails with NotFound
/// when the id does not exist; the id itself is immutable.
#[instrument(name = "games::replace", level = "trace", skip(store, input, platforms), fields(game = %input.slug))]
pub async fn replace(
    store: &dyn DocumentStore,
    doc_id: &str,
    input: GameInput,
    platforms: Option<&[Platform]>,
) -> Result<Game, Status> {
    let mut game = Game::from(input);
    game.id = doc_id.to_owned();
    if let Some(platforms) = platforms {
        embed_platforms(&mut game, platforms);
    }

    let doc = store
        .replace_one(GAMES, doc_id, serde_json::to_value(&game)?)
        .await?;
    Ok(serde_json::from_value(doc)?)
}

/// Deletes the game with id `doc_id`. Deleting an absent game is a no-op.
/// Digests of the game left behind in platform documents are not cleaned up.
#[instrument(name = "games::delete", level = "trace", skip(store))]
pub async fn delete(store: &dyn DocumentStore, doc_id: &str) -> Result<(), Status> {
    store.delete_one(GAMES, doc_id).await
}

fn embed_platforms(game: &mut Game, platforms: &[Platform]) {
    game.platforms = platforms.iter().map(PlatformDigest::from).collect();
}

fn parse_all(docs: Vec<Value>) -> Result<Vec<Game>, Status> {
    docs.into_iter()
        .map(|doc| Ok(serde_json::from_value(doc)?))
        .collect()
}

const GAMES: &str = "games";
