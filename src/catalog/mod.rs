pub mod carts;
pub mod games;
pub mod platforms;

mod sync;
pub use sync::{Associations, SyncReport};
