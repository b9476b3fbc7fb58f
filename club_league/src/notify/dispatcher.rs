//! Fire-and-forget notification delivery.

use super::events::LeagueEvent;
use crate::config::EngineConfig;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

/// Notification delivery errors
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Transport could not be reached
    #[error("Notification transport unavailable: {0}")]
    Unavailable(String),

    /// Transport refused the message
    #[error("Notification rejected: {0}")]
    Rejected(String),
}

/// Delivery seam for league events (push, email, in-app inbox)
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one event to its recipients
    async fn deliver(&self, event: &LeagueEvent) -> Result<(), NotifyError>;
}

/// Notifier that writes events to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn deliver(&self, event: &LeagueEvent) -> Result<(), NotifyError> {
        log::info!("Notify {:?}: {}", event.recipients(), event);
        Ok(())
    }
}

/// Notifier that keeps delivered events in memory (in-app inbox)
#[derive(Debug, Default, Clone)]
pub struct MemoryNotifier {
    delivered: Arc<RwLock<Vec<LeagueEvent>>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events delivered so far, in delivery order
    pub async fn delivered(&self) -> Vec<LeagueEvent> {
        self.delivered.read().await.clone()
    }
}

#[async_trait]
impl Notifier for MemoryNotifier {
    async fn deliver(&self, event: &LeagueEvent) -> Result<(), NotifyError> {
        self.delivered.write().await.push(event.clone());
        Ok(())
    }
}

/// Event that could not be delivered within the retry budget
#[derive(Debug, Clone, Serialize)]
pub struct FailedDelivery {
    pub event: LeagueEvent,
    pub attempts: u32,
    pub error: String,
    pub failed_at: DateTime<Utc>,
}

/// Publishes events on background tasks
///
/// Delivery failures are retried, then dead-lettered. They never reach the
/// operation that produced the event.
#[derive(Clone)]
pub struct NotificationDispatcher {
    notifier: Arc<dyn Notifier>,
    max_attempts: u32,
    backoff: Duration,
    failed: Arc<RwLock<Vec<FailedDelivery>>>,
    pending: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl NotificationDispatcher {
    /// Create a dispatcher
    ///
    /// # Arguments
    ///
    /// * `notifier` - Delivery transport
    /// * `max_attempts` - Delivery attempts per event (at least 1)
    /// * `backoff` - Pause between attempts
    pub fn new(notifier: Arc<dyn Notifier>, max_attempts: u32, backoff: Duration) -> Self {
        Self {
            notifier,
            max_attempts: max_attempts.max(1),
            backoff,
            failed: Arc::new(RwLock::new(Vec::new())),
            pending: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a dispatcher with the engine's retry settings
    pub fn from_config(notifier: Arc<dyn Notifier>, config: &EngineConfig) -> Self {
        Self::new(notifier, config.notify_max_attempts, config.notify_backoff)
    }

    /// Publish an event without waiting for delivery
    pub fn publish(&self, event: LeagueEvent) {
        let notifier = Arc::clone(&self.notifier);
        let failed = Arc::clone(&self.failed);
        let max_attempts = self.max_attempts;
        let backoff = self.backoff;

        let handle = tokio::spawn(async move {
            let mut attempt = 0;
            loop {
                attempt += 1;
                match notifier.deliver(&event).await {
                    Ok(()) => return,
                    Err(e) if attempt < max_attempts => {
                        log::warn!(
                            "Delivery of '{}' failed (attempt {}/{}): {}",
                            event,
                            attempt,
                            max_attempts,
                            e
                        );
                        tokio::time::sleep(backoff).await;
                    }
                    Err(e) => {
                        log::error!(
                            "Giving up on '{}' after {} attempts: {}",
                            event,
                            attempt,
                            e
                        );
                        failed.write().await.push(FailedDelivery {
                            event,
                            attempts: attempt,
                            error: e.to_string(),
                            failed_at: Utc::now(),
                        });
                        return;
                    }
                }
            }
        });

        let mut pending = self.pending.lock().unwrap_or_else(|p| p.into_inner());
        pending.retain(|h| !h.is_finished());
        pending.push(handle);
    }

    /// Publish several events
    pub fn publish_all(&self, events: impl IntoIterator<Item = LeagueEvent>) {
        for event in events {
            self.publish(event);
        }
    }

    /// Wait until every event published so far has been delivered or dead-lettered
    pub async fn flush(&self) {
        let handles: Vec<JoinHandle<()>> = {
            let mut pending = self.pending.lock().unwrap_or_else(|p| p.into_inner());
            pending.drain(..).collect()
        };

        for handle in handles {
            if let Err(e) = handle.await {
                log::error!("Notification task failed: {e}");
            }
        }
    }

    /// Dead-lettered deliveries
    pub async fn failed_deliveries(&self) -> Vec<FailedDelivery> {
        self.failed.read().await.clone()
    }
}

impl Default for NotificationDispatcher {
    fn default() -> Self {
        Self::from_config(Arc::new(LogNotifier), &EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails a fixed number of times before succeeding
    struct FlakyNotifier {
        failures_left: AtomicU32,
        calls: AtomicU32,
    }

    #[async_trait]
    impl Notifier for FlakyNotifier {
        async fn deliver(&self, _event: &LeagueEvent) -> Result<(), NotifyError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let left = self.failures_left.load(Ordering::SeqCst);
            if left > 0 {
                self.failures_left.store(left - 1, Ordering::SeqCst);
                return Err(NotifyError::Unavailable("push gateway down".to_string()));
            }
            Ok(())
        }
    }

    fn event() -> LeagueEvent {
        LeagueEvent::JoinedGroup {
            player_id: 1,
            rating_tier_id: 2,
            group_id: 3,
            group_name: "Group A".to_string(),
        }
    }

    #[tokio::test]
    async fn test_memory_notifier_receives_events() {
        let notifier = MemoryNotifier::new();
        let dispatcher =
            NotificationDispatcher::new(Arc::new(notifier.clone()), 3, Duration::ZERO);

        dispatcher.publish_all(vec![event(), event()]);
        dispatcher.flush().await;

        assert_eq!(notifier.delivered().await.len(), 2);
        assert!(dispatcher.failed_deliveries().await.is_empty());
    }

    #[tokio::test]
    async fn test_retry_then_success() {
        let notifier = Arc::new(FlakyNotifier {
            failures_left: AtomicU32::new(2),
            calls: AtomicU32::new(0),
        });
        let dispatcher = NotificationDispatcher::new(notifier.clone(), 3, Duration::ZERO);

        dispatcher.publish(event());
        dispatcher.flush().await;

        assert_eq!(notifier.calls.load(Ordering::SeqCst), 3);
        assert!(dispatcher.failed_deliveries().await.is_empty());
    }

    #[tokio::test]
    async fn test_exhausted_delivery_is_dead_lettered() {
        let notifier = Arc::new(FlakyNotifier {
            failures_left: AtomicU32::new(10),
            calls: AtomicU32::new(0),
        });
        let dispatcher = NotificationDispatcher::new(notifier.clone(), 2, Duration::ZERO);

        dispatcher.publish(event());
        dispatcher.flush().await;

        let failed = dispatcher.failed_deliveries().await;
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].attempts, 2);
        assert_eq!(failed[0].event, event());
        assert_eq!(notifier.calls.load(Ordering::SeqCst), 2);
    }
}
