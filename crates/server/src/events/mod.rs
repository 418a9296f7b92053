//! Best-effort worker events outside the caching engine: background sync,
//! connectivity, push and notification clicks.

pub mod click;
pub mod push;
pub mod sync;

pub use click::{ClickOutcome, notification_click};
pub use push::Notification;
pub use sync::{SyncOutcome, background_sync, online_status};
