use serde::{Deserialize, Serialize};

use super::Game;

/// Denormalized snapshot of a game embedded in each platform that lists it.
/// At most one digest per game id is kept on a platform.
#[derive(Serialize, Deserialize, Default, Clone, Debug, PartialEq)]
pub struct GameDigest {
    pub id: String,
    pub name: String,

    #[serde(default)]
    pub slug: String,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
}

impl From<&Game> for GameDigest {
    fn from(game: &Game) -> Self {
        GameDigest {
            id: game.id.clone(),
            name: game.name.clone(),
            slug: game.slug.clone(),

            cover: match &game.cover.thumbnail {
                Some(thumbnail) => Some(thumbnail.clone()),
                None => match game.cover.url.is_empty() {
                    false => Some(game.cover.url.clone()),
                    true => None,
                },
            },
        }
    }
}
