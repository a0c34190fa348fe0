use std::time::Duration;

use futures::future::join_all;
use itertools::Itertools;
use serde::Serialize;
use tracing::{instrument, warn};

use crate::{
    documents::{Game, GameInput, Platform},
    log_event,
    logging::SyncEvent,
    store::DocumentStore,
    Status,
};

use super::{games, platforms};

/// Coordinates the dual write between a game and the platforms it references.
///
/// The game document is the owning side and is always persisted first.
/// Fanning the game's digest out into each resolved platform happens after
/// that commit point and is best-effort: a partial propagation failure leaves
/// the two sides in disagreement until the game is synced again, which is
/// accepted.
pub struct Associations;

impl Associations {
    /// Creates a game from `input`, embedding a snapshot of every platform
    /// its `platform_slugs` resolve to, and propagates the game into those
    /// platforms' embedded game lists.
    #[instrument(level = "trace", skip(store, input), fields(game = %input.slug))]
    pub async fn create_game(
        store: &dyn DocumentStore,
        input: GameInput,
    ) -> Result<(Game, SyncReport), Status> {
        let errors = games::validate(&input);
        if !errors.is_empty() {
            return Err(Status::invalid_argument(errors.into_iter().join(" ")));
        }

        let (resolved, dropped) =
            Self::resolve_platforms(store, &input.platform_slugs).await;
        log_event!(SyncEvent::resolve(
            &input.slug,
            input.platform_slugs.len(),
            dropped.clone()
        ));

        let game = games::insert(store, input, Some(&resolved)).await?;

        let failed = propagate(store, &resolved, &game).await;
        Ok((game, SyncReport { dropped, failed }))
    }

    /// Fully replaces the game with id `doc_id`, re-resolving and
    /// re-propagating its platform associations. Platforms the game no longer
    /// references keep their old digest of it.
    #[instrument(level = "trace", skip(store, input), fields(game = %input.slug))]
    pub async fn update_game(
        store: &dyn DocumentStore,
        doc_id: &str,
        input: GameInput,
    ) -> Result<(Game, SyncReport), Status> {
        let errors = games::validate(&input);
        if !errors.is_empty() {
            return Err(Status::invalid_argument(errors.into_iter().join(" ")));
        }

        let (resolved, dropped) =
            Self::resolve_platforms(store, &input.platform_slugs).await;
        log_event!(SyncEvent::resolve(
            &input.slug,
            input.platform_slugs.len(),
            dropped.clone()
        ));

        let game = games::replace(store, doc_id, input, Some(&resolved)).await?;

        let failed = propagate(store, &resolved, &game).await;
        Ok((game, SyncReport { dropped, failed }))
    }

    /// Resolves platform slugs concurrently. Duplicates collapse to their
    /// first occurrence. Slugs matching no platform are dropped rather than
    /// failing the sync, and a resolution error counts as a miss too; either
    /// way the slug lands in the dropped list.
    #[instrument(level = "trace", skip(store))]
    pub async fn resolve_platforms(
        store: &dyn DocumentStore,
        slugs: &[String],
    ) -> (Vec<Platform>, Vec<String>) {
        let slugs = slugs.iter().unique().collect::<Vec<_>>();
        let lookups = join_all(
            slugs
                .iter()
                .map(|slug| platforms::find_by_slug(store, slug)),
        )
        .await;

        let mut resolved = vec![];
        let mut dropped = vec![];
        for (slug, lookup) in slugs.into_iter().zip(lookups) {
            match lookup {
                Ok(Some(platform)) => resolved.push(platform),
                Ok(None) => {
                    warn!("Dropping '{slug}': no platform with that slug");
                    dropped.push(slug.clone());
                }
                Err(status) => {
                    warn!("Dropping '{slug}': {status}");
                    dropped.push(slug.clone());
                }
            }
        }

        (resolved, dropped)
    }
}

/// Per-sync outcome returned next to the persisted game: input slugs that
/// resolved to no platform and platforms that could not be updated.
#[derive(Serialize, Default, Clone, Debug)]
pub struct SyncReport {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dropped: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<String>,
}

/// Pushes the persisted game's digest into every resolved platform. Runs only
/// once the game write has committed; each failure is logged and reported,
/// never escalated. The whole fan-out is bounded by `PROPAGATION_DEADLINE`;
/// on expiry the remaining platforms count as failed.
async fn propagate(store: &dyn DocumentStore, resolved: &[Platform], game: &Game) -> Vec<String> {
    let updates = join_all(
        resolved
            .iter()
            .map(|platform| platforms::add_game(store, platform, game)),
    );

    let mut failed = vec![];
    match tokio::time::timeout(PROPAGATION_DEADLINE, updates).await {
        Ok(results) => {
            for (platform, result) in resolved.iter().zip(results) {
                if let Err(status) = result {
                    warn!(
                        "Failed to propagate '{}' into '{}': {status}",
                        game.slug, platform.slug
                    );
                    failed.push(platform.slug.clone());
                }
            }
        }
        Err(_) => {
            warn!(
                "Propagating '{}' timed out after {:?}",
                game.slug, PROPAGATION_DEADLINE
            );
            failed = resolved
                .iter()
                .map(|platform| platform.slug.clone())
                .collect();
        }
    }

    log_event!(SyncEvent::propagate(&game.slug, resolved.len(), failed.clone()));
    failed
}

const PROPAGATION_DEADLINE: Duration = Duration::from_secs(10);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        documents::{PlatformInput, PlatformLogo},
        store::{Filter, MemoryStore},
        util::slug::slugify,
    };
    use async_trait::async_trait;
    use serde_json::Value;

    fn game_input(name: &str, platform_slugs: Vec<&str>) -> GameInput {
        GameInput {
            name: name.to_owned(),
            slug: slugify(name),
            summary: "A game.".to_owned(),
            url: format!("https://games.example/{}", slugify(name)),
            cover_url: "https://images.example/cover.png".to_owned(),
            platform_slugs: platform_slugs.into_iter().map(String::from).collect(),
            ..Default::default()
        }
    }

    fn platform_input(name: &str) -> PlatformInput {
        PlatformInput {
            name: name.to_owned(),
            slug: slugify(name),
            platform_logo: PlatformLogo {
                height: 128,
                width: 128,
                url: "https://images.example/logo.png".to_owned(),
            },
        }
    }

    /// `MemoryStore` wrapper that injects failures for specific platform
    /// slugs: writes (propagation) or reads (resolution).
    struct FailingStore {
        inner: MemoryStore,
        fail_replace_of: Option<&'static str>,
        fail_lookup_of: Option<&'static str>,
    }

    impl FailingStore {
        fn failing_writes(fail_replace_of: &'static str) -> Self {
            FailingStore {
                inner: MemoryStore::new(),
                fail_replace_of: Some(fail_replace_of),
                fail_lookup_of: None,
            }
        }

        fn failing_lookups(fail_lookup_of: &'static str) -> Self {
            FailingStore {
                inner: MemoryStore::new(),
                fail_replace_of: None,
                fail_lookup_of: Some(fail_lookup_of),
            }
        }
    }

    #[async_trait]
    impl DocumentStore for FailingStore {
        async fn insert_one(&self, collection: &str, doc: Value) -> Result<Value, Status> {
            self.inner.insert_one(collection, doc).await
        }

        async fn find_one(
            &self,
            collection: &str,
            filter: Filter,
        ) -> Result<Option<Value>, Status> {
            if let Some(slug) = self.fail_lookup_of {
                if let Filter::Eq { field, value } = &filter {
                    if collection == "platforms" && field == "slug" && *value == slug {
                        return Err(Status::internal("injected read failure"));
                    }
                }
            }
            self.inner.find_one(collection, filter).await
        }

        async fn find(&self, collection: &str, filter: Filter) -> Result<Vec<Value>, Status> {
            self.inner.find(collection, filter).await
        }

        async fn replace_one(
            &self,
            collection: &str,
            doc_id: &str,
            doc: Value,
        ) -> Result<Value, Status> {
            if let Some(slug) = self.fail_replace_of {
                if doc["slug"] == slug {
                    return Err(Status::internal("injected write failure"));
                }
            }
            self.inner.replace_one(collection, doc_id, doc).await
        }

        async fn delete_one(&self, collection: &str, doc_id: &str) -> Result<(), Status> {
            self.inner.delete_one(collection, doc_id).await
        }
    }

    #[tokio::test]
    async fn create_game_embeds_only_resolved_platforms() {
        let store = MemoryStore::new();
        platforms::insert(&store, platform_input("Nintendo Switch"))
            .await
            .unwrap();
        platforms::insert(&store, platform_input("PlayStation 4"))
            .await
            .unwrap();

        let (game, report) = Associations::create_game(
            &store,
            game_input(
                "Minecraft",
                vec!["nintendo-switch", "playstation-4", "does-not-exist"],
            ),
        )
        .await
        .unwrap();

        assert_eq!(game.platforms.len(), 2);
        assert_eq!(game.platforms[0].slug, "nintendo-switch");
        assert_eq!(game.platforms[1].slug, "playstation-4");
        assert_eq!(report.dropped, vec!["does-not-exist".to_owned()]);
        assert!(report.failed.is_empty());

        for slug in ["nintendo-switch", "playstation-4"] {
            let platform = platforms::find_by_slug(&store, slug)
                .await
                .unwrap()
                .unwrap();
            assert_eq!(platform.games.len(), 1);
            assert_eq!(platform.games[0].id, game.id);
            assert_eq!(platform.games[0].name, "Minecraft");
        }
    }

    #[tokio::test]
    async fn duplicate_input_slugs_count_once() {
        let store = MemoryStore::new();
        platforms::insert(&store, platform_input("Nintendo Switch"))
            .await
            .unwrap();

        let (game, report) = Associations::create_game(
            &store,
            game_input("Minecraft", vec!["nintendo-switch", "nintendo-switch"]),
        )
        .await
        .unwrap();

        assert_eq!(game.platforms.len(), 1);
        assert!(report.dropped.is_empty());

        let platform = platforms::find_by_slug(&store, "nintendo-switch")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(platform.games.len(), 1);
    }

    #[tokio::test]
    async fn syncing_again_does_not_duplicate_digests() {
        let store = MemoryStore::new();
        platforms::insert(&store, platform_input("Nintendo Switch"))
            .await
            .unwrap();

        let (game, _) =
            Associations::create_game(&store, game_input("Minecraft", vec!["nintendo-switch"]))
                .await
                .unwrap();
        let mut input = game_input("Minecraft", vec!["nintendo-switch"]);
        input.summary = "Updated summary.".to_owned();
        Associations::update_game(&store, &game.id, input)
            .await
            .unwrap();

        let platform = platforms::find_by_slug(&store, "nintendo-switch")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(platform.games.len(), 1);
        assert_eq!(platform.games[0].id, game.id);
    }

    #[tokio::test]
    async fn update_game_replaces_embedded_platforms() {
        let store = MemoryStore::new();
        platforms::insert(&store, platform_input("Nintendo Switch"))
            .await
            .unwrap();
        platforms::insert(&store, platform_input("PlayStation 4"))
            .await
            .unwrap();

        let (game, _) =
            Associations::create_game(&store, game_input("Minecraft", vec!["nintendo-switch"]))
                .await
                .unwrap();
        let (game, _) = Associations::update_game(
            &store,
            &game.id,
            game_input("Minecraft", vec!["playstation-4"]),
        )
        .await
        .unwrap();

        assert_eq!(game.platforms.len(), 1);
        assert_eq!(game.platforms[0].slug, "playstation-4");

        let playstation = platforms::find_by_slug(&store, "playstation-4")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(playstation.games.len(), 1);
    }

    #[tokio::test]
    async fn invalid_input_is_rejected_before_any_write() {
        let store = MemoryStore::new();

        let result = Associations::create_game(
            &store,
            GameInput {
                name: "Minecraft".to_owned(),
                ..Default::default()
            },
        )
        .await;

        assert!(matches!(result, Err(Status::InvalidArgument(_))));
        assert!(games::list(&store).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn propagation_failure_leaves_the_persisted_game_intact() {
        let store = FailingStore::failing_writes("xbox-360");
        platforms::insert(&store, platform_input("Nintendo Switch"))
            .await
            .unwrap();
        platforms::insert(&store, platform_input("Xbox 360"))
            .await
            .unwrap();

        let (game, report) = Associations::create_game(
            &store,
            game_input("Minecraft", vec!["nintendo-switch", "xbox-360"]),
        )
        .await
        .unwrap();

        // Both platforms resolved; the game embeds both snapshots.
        assert_eq!(game.platforms.len(), 2);
        assert_eq!(report.failed, vec!["xbox-360".to_owned()]);

        let read = games::find_by_slug(&store, "minecraft").await.unwrap();
        assert_eq!(read, game);

        let switch = platforms::find_by_slug(&store, "nintendo-switch")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(switch.games.len(), 1);
        let xbox = platforms::find_by_slug(&store, "xbox-360")
            .await
            .unwrap()
            .unwrap();
        assert!(xbox.games.is_empty());
    }

    #[tokio::test]
    async fn resolution_errors_count_as_misses() {
        let store = FailingStore::failing_lookups("xbox-360");
        platforms::insert(&store, platform_input("Nintendo Switch"))
            .await
            .unwrap();

        let (game, report) = Associations::create_game(
            &store,
            game_input("Minecraft", vec!["nintendo-switch", "xbox-360"]),
        )
        .await
        .unwrap();

        assert_eq!(game.platforms.len(), 1);
        assert_eq!(report.dropped, vec!["xbox-360".to_owned()]);
    }
}
