mod sync_event;

pub use sync_event::*;
