use std::collections::HashMap;
use std::sync::RwLock;

use tokio::sync::broadcast;

use crate::features::realtime::events::{QueueEvent, Topic};

/// Fan-out seam between the lifecycle engines and whatever transport
/// carries events to observers. Engines publish fire-and-forget after the
/// state change is committed; publish failures never surface to the
/// mutating client.
pub trait Broadcaster: Send + Sync {
    fn publish(&self, topic: &Topic, event: &QueueEvent);
    fn subscribe(&self, topic: &Topic) -> broadcast::Receiver<QueueEvent>;
}

/// In-process implementation over one tokio broadcast channel per topic.
/// Channels are created lazily on first subscribe; publishing to a topic
/// nobody listens on is a no-op.
pub struct ChannelBroadcaster {
    capacity: usize,
    channels: RwLock<HashMap<String, broadcast::Sender<QueueEvent>>>,
}

impl ChannelBroadcaster {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            channels: RwLock::new(HashMap::new()),
        }
    }
}

impl Broadcaster for ChannelBroadcaster {
    fn publish(&self, topic: &Topic, event: &QueueEvent) {
        let channels = self.channels.read().unwrap();
        if let Some(sender) = channels.get(&topic.key()) {
            // SendError only means every receiver is gone; the next
            // subscriber refetches state anyway.
            if let Err(e) = sender.send(event.clone()) {
                tracing::debug!("No live subscribers on {}: {}", topic.key(), e);
            }
        }
    }

    fn subscribe(&self, topic: &Topic) -> broadcast::Receiver<QueueEvent> {
        let mut channels = self.channels.write().unwrap();
        channels
            .entry(topic.key())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn delivers_to_subscriber() {
        let bus = ChannelBroadcaster::new(8);
        let counter_id = Uuid::new_v4();
        let topic = Topic::Counter(counter_id);

        let mut rx = bus.subscribe(&topic);
        bus.publish(&topic, &QueueEvent::RingBell { counter_id });

        let event = rx.recv().await.unwrap();
        assert!(matches!(event, QueueEvent::RingBell { counter_id: c } if c == counter_id));
    }

    #[tokio::test]
    async fn topics_are_isolated() {
        let bus = ChannelBroadcaster::new(8);
        let a = Topic::Counter(Uuid::new_v4());
        let b = Topic::Counter(Uuid::new_v4());

        let mut rx_a = bus.subscribe(&a);
        let mut rx_b = bus.subscribe(&b);
        bus.publish(&a, &QueueEvent::RingBell { counter_id: Uuid::new_v4() });

        assert!(rx_a.recv().await.is_ok());
        assert!(rx_b.try_recv().is_err());
    }

    #[test]
    fn publish_without_subscribers_is_noop() {
        let bus = ChannelBroadcaster::new(8);
        // Must not panic or create a channel.
        bus.publish(
            &Topic::Global,
            &QueueEvent::RingBell { counter_id: Uuid::new_v4() },
        );
        assert!(bus.channels.read().unwrap().is_empty());
    }

    #[tokio::test]
    async fn all_subscribers_of_a_topic_receive() {
        let bus = ChannelBroadcaster::new(8);
        let mut rx1 = bus.subscribe(&Topic::Global);
        let mut rx2 = bus.subscribe(&Topic::Global);
        let counter_id = Uuid::new_v4();

        bus.publish(&Topic::Global, &QueueEvent::RingBell { counter_id });

        assert!(rx1.recv().await.is_ok());
        assert!(rx2.recv().await.is_ok());
    }
}
