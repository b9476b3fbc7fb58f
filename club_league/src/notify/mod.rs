//! Notification fan-out.
//!
//! Domain operations publish [`LeagueEvent`]s after releasing the store lock.
//! Delivery runs on spawned tasks with retries; failures end up in the
//! dispatcher's dead-letter list instead of failing the operation.

pub mod dispatcher;
pub mod events;

pub use dispatcher::{
    FailedDelivery, LogNotifier, MemoryNotifier, NotificationDispatcher, Notifier, NotifyError,
};
pub use events::LeagueEvent;
