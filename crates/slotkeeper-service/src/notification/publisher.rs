//! In-process broadcast of domain events.

use tokio::sync::broadcast;
use tracing::debug;

use slotkeeper_core::events::DomainEvent;

/// Fans domain events out to any number of subscribers.
///
/// Push delivery to browsers lives outside this crate; it subscribes here.
#[derive(Debug, Clone)]
pub struct EventPublisher {
    /// Broadcast sender.
    tx: broadcast::Sender<DomainEvent>,
}

impl EventPublisher {
    /// Create a publisher buffering up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publish an event, returning how many subscribers received it.
    pub fn publish(&self, event: DomainEvent) -> usize {
        match self.tx.send(event) {
            Ok(receivers) => receivers,
            Err(_) => {
                debug!("No event subscribers");
                0
            }
        }
    }

    /// Subscribe to future events.
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.tx.subscribe()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotkeeper_core::events::ReservationEvent;
    use slotkeeper_core::types::ReservationId;

    fn event() -> DomainEvent {
        DomainEvent::reservation(
            None,
            ReservationEvent::StatusChanged {
                reservation_id: ReservationId::new(),
                name: "Ada".into(),
                from: "pending".into(),
                to: "approved".into(),
            },
        )
    }

    #[test]
    fn test_publish_without_subscribers() {
        let publisher = EventPublisher::new(4);
        assert_eq!(publisher.publish(event()), 0);
    }

    #[tokio::test]
    async fn test_subscriber_receives_event() {
        let publisher = EventPublisher::new(4);
        let mut rx = publisher.subscribe();
        assert_eq!(publisher.publish(event()), 1);
        let received = rx.recv().await.unwrap();
        assert!(received.actor.is_none());
    }
}
