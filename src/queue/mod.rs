pub mod model;
pub mod sync;

pub use model::{format_timestamp, QueueItem, QueueStatus};
pub use sync::{QueueDisplay, QueueSync, RefreshHandle, RefreshHook};
