mod cart;
mod game;
mod game_digest;
mod platform;

pub use cart::Cart;
pub use game::{Cover, Game, GameInput, GenreRef, PlatformDigest, Screenshot};
pub use game_digest::GameDigest;
pub use platform::{Platform, PlatformInput, PlatformLogo};
