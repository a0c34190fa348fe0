use serde::{Deserialize, Serialize};

use super::GameDigest;

/// Document type under the 'platforms' collection.
#[derive(Serialize, Deserialize, Default, Clone, Debug, PartialEq)]
pub struct Platform {
    #[serde(default)]
    pub id: String,

    pub name: String,
    pub slug: String,

    #[serde(default)]
    pub platform_logo: PlatformLogo,

    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub games: Vec<GameDigest>,
}

/// Typed input for creating a platform.
#[derive(Serialize, Deserialize, Default, Clone, Debug)]
pub struct PlatformInput {
    pub name: String,

    #[serde(default)]
    pub slug: String,

    #[serde(default)]
    pub platform_logo: PlatformLogo,
}

impl From<PlatformInput> for Platform {
    fn from(input: PlatformInput) -> Self {
        Platform {
            id: String::default(),
            name: input.name,
            slug: input.slug,
            platform_logo: input.platform_logo,
            games: vec![],
        }
    }
}

#[derive(Serialize, Deserialize, Default, Clone, Debug, PartialEq)]
pub struct PlatformLogo {
    #[serde(default)]
    pub height: i32,

    #[serde(default)]
    pub width: i32,

    #[serde(default)]
    pub url: String,
}
