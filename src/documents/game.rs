use serde::{Deserialize, Serialize};

use super::{Platform, PlatformLogo};

/// Document type under the 'games' collection.
#[derive(Serialize, Deserialize, Default, Clone, Debug, PartialEq)]
pub struct Game {
    #[serde(default)]
    pub id: String,

    pub name: String,
    pub slug: String,

    #[serde(default)]
    pub summary: String,

    #[serde(default)]
    pub url: String,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_release_date: Option<i64>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating_count: Option<u64>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_rating: Option<f64>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_rating_count: Option<u64>,

    #[serde(default)]
    pub cover: Cover,

    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<GenreRef>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub platforms: Vec<PlatformDigest>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub screenshots: Vec<Screenshot>,
}

/// Typed input for creating or fully replacing a game. Callers derive `slug`
/// from `name` with `util::slug::slugify` before handing the input over.
#[derive(Serialize, Deserialize, Default, Clone, Debug)]
pub struct GameInput {
    pub name: String,

    #[serde(default)]
    pub slug: String,

    #[serde(default)]
    pub summary: String,

    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub cover_url: String,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_release_date: Option<i64>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating_count: Option<u64>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_rating: Option<f64>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_rating_count: Option<u64>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<GenreRef>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub platform_slugs: Vec<String>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub screenshots: Vec<Screenshot>,
}

impl From<GameInput> for Game {
    fn from(input: GameInput) -> Self {
        Game {
            id: String::default(),
            name: input.name,
            slug: input.slug,
            summary: input.summary,
            url: input.url,
            first_release_date: input.first_release_date,
            rating: input.rating,
            rating_count: input.rating_count,
            total_rating: input.total_rating,
            total_rating_count: input.total_rating_count,
            cover: Cover {
                thumbnail: input.thumbnail,
                url: input.cover_url,
            },
            genres: input.genres,
            platforms: vec![],
            screenshots: input.screenshots,
        }
    }
}

#[derive(Serialize, Deserialize, Default, Clone, Debug, PartialEq)]
pub struct Cover {
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,

    pub url: String,
}

#[derive(Serialize, Deserialize, Default, Clone, Debug, PartialEq)]
pub struct GenreRef {
    pub name: String,
    pub slug: String,
}

#[derive(Serialize, Deserialize, Default, Clone, Debug, PartialEq)]
pub struct Screenshot {
    pub url: String,
}

/// Denormalized snapshot of a platform embedded in each game that references
/// it. A copy taken at sync time, not a live reference.
#[derive(Serialize, Deserialize, Default, Clone, Debug, PartialEq)]
pub struct PlatformDigest {
    pub name: String,
    pub slug: String,

    #[serde(default)]
    pub platform_logo: PlatformLogo,
}

impl From<&Platform> for PlatformDigest {
    fn from(platform: &Platform) -> Self {
        PlatformDigest {
            name: platform.name.clone(),
            slug: platform.slug.clone(),
            platform_logo: platform.platform_logo.clone(),
        }
    }
}
