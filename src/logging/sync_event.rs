use serde::{Deserialize, Serialize};
use tracing::warn;
use valuable::Valuable;

/// Structured record of one association-sync step for a game.
#[derive(Serialize, Deserialize, Valuable, Clone, Debug)]
pub struct SyncEvent {
    op: Op,
    game: String,

    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<String>,
}

impl SyncEvent {
    pub fn resolve(game: &str, requested: usize, dropped: Vec<String>) -> Self {
        SyncEvent {
            op: Op::Resolve(ResolveStats {
                requested,
                dropped: dropped.len(),
            }),
            game: game.to_owned(),
            errors: dropped,
        }
    }

    pub fn propagate(game: &str, platforms: usize, failed: Vec<String>) -> Self {
        SyncEvent {
            op: Op::Propagate(PropagateStats {
                platforms,
                failed: failed.len(),
            }),
            game: game.to_owned(),
            errors: failed,
        }
    }

    pub fn encode(&self) -> String {
        match serde_json::to_string(self) {
            Ok(json) => json,
            Err(e) => {
                warn!("{}", e);
                String::default()
            }
        }
    }
}

#[macro_export]
macro_rules! log_event {
    ($event:expr) => {
        ::tracing::debug!(event = $event.encode())
    };
}

#[derive(Serialize, Deserialize, Valuable, Clone, Debug)]
enum Op {
    Resolve(ResolveStats),
    Propagate(PropagateStats),
}

#[derive(Serialize, Deserialize, Valuable, Clone, Debug)]
struct ResolveStats {
    requested: usize,

    #[serde(skip_serializing_if = "is_zero")]
    dropped: usize,
}

#[derive(Serialize, Deserialize, Valuable, Clone, Debug)]
struct PropagateStats {
    platforms: usize,

    #[serde(skip_serializing_if = "is_zero")]
    failed: usize,
}

fn is_zero(num: &usize) -> bool {
    *num == 0
}
