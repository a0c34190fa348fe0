use serde::{Deserialize, Serialize};

use super::Game;

/// Document type under the 'carts' collection. Holds a plain snapshot of
/// games; nothing propagates back to game or platform documents.
#[derive(Serialize, Deserialize, Default, Clone, Debug)]
pub struct Cart {
    #[serde(default)]
    pub id: String,

    pub user: String,

    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub games: Vec<Game>,

    #[serde(default)]
    #[serde(rename = "totalPrice")]
    pub total_price: f64,

    #[serde(default)]
    #[serde(rename = "isCurrent")]
    pub is_current: bool,
}
