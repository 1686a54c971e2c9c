//! Publish/subscribe fan-out for graph change events
//!
//! Subscribers attach either a callback, which runs inline while the event is
//! emitted, or a queued [`EventStream`] that is drained later by its owner.
//! Callbacks for one topic run in subscription order; each stream sees its
//! events in emission order. Nothing is buffered for late subscribers.

use std::collections::HashMap;
use tokio::sync::mpsc;

use crate::event::{Attribute, EntityKind, EntityState, Event, Operation, Topic};

/// Handle returned by subscribe calls, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

enum Delivery {
    Immediate(Box<dyn FnMut(&Event)>),
    Queued(mpsc::UnboundedSender<Event>),
}

struct Subscriber {
    id: SubscriptionId,
    delivery: Delivery,
}

/// Typed event registry keyed by [`Topic`]
#[derive(Default)]
pub struct EventHub {
    subscribers: HashMap<Topic, Vec<Subscriber>>,
    next_id: u64,
}

impl std::fmt::Debug for EventHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventHub")
            .field("topics", &self.subscribers.len())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `handler` inline for every event on `topic`
    ///
    /// Handlers must not panic; they are expected to catch and log their own
    /// failures.
    pub fn subscribe<F>(&mut self, topic: Topic, handler: F) -> SubscriptionId
    where
        F: FnMut(&Event) + 'static,
    {
        self.attach(topic, Delivery::Immediate(Box::new(handler)))
    }

    /// Queue every event on `topic` for later consumption
    pub fn stream(&mut self, topic: Topic) -> EventStream {
        let (sender, receiver) = mpsc::unbounded_channel();
        let id = self.attach(topic, Delivery::Queued(sender));
        EventStream { id, receiver }
    }

    pub fn observe(&mut self, kind: EntityKind, operation: Operation) -> EventStream {
        self.stream(Topic::new(kind, operation))
    }

    pub fn before_update(&mut self, kind: EntityKind, attribute: Attribute) -> EventStream {
        self.stream(Topic::before_update(kind, attribute))
    }

    pub fn after_update(&mut self, kind: EntityKind, attribute: Attribute) -> EventStream {
        self.stream(Topic::after_update(kind, attribute))
    }

    /// Returns false when the subscription was already gone
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let mut removed = false;
        for subscribers in self.subscribers.values_mut() {
            let before = subscribers.len();
            subscribers.retain(|s| s.id != id);
            removed |= subscribers.len() != before;
        }
        self.subscribers.retain(|_, subscribers| !subscribers.is_empty());
        removed
    }

    pub fn has_subscribers(&self, topic: &Topic) -> bool {
        self.subscribers
            .get(topic)
            .is_some_and(|subscribers| !subscribers.is_empty())
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.values().map(Vec::len).sum()
    }

    /// Notify subscribers of `(kind, operation)`; the kind defaults to the
    /// entity's own
    pub fn emit(
        &mut self,
        entity: EntityState,
        operation: Operation,
        kind_override: Option<EntityKind>,
    ) {
        self.publish(Event::new(entity, operation, kind_override));
    }

    pub fn publish(&mut self, event: Event) {
        let Some(subscribers) = self.subscribers.get_mut(&event.topic) else {
            return;
        };
        subscribers.retain_mut(|subscriber| match &mut subscriber.delivery {
            Delivery::Immediate(handler) => {
                handler(&event);
                true
            }
            // A dropped stream is pruned on the next delivery
            Delivery::Queued(sender) => sender.send(event.clone()).is_ok(),
        });
        if subscribers.is_empty() {
            self.subscribers.remove(&event.topic);
        }
    }

    fn attach(&mut self, topic: Topic, delivery: Delivery) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscribers
            .entry(topic)
            .or_default()
            .push(Subscriber { id, delivery });
        id
    }
}

/// Receiving end of a queued subscription
#[derive(Debug)]
pub struct EventStream {
    id: SubscriptionId,
    receiver: mpsc::UnboundedReceiver<Event>,
}

impl EventStream {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Wait for the next event; `None` once the hub is dropped
    pub async fn recv(&mut self) -> Option<Event> {
        self.receiver.recv().await
    }

    pub fn try_recv(&mut self) -> Option<Event> {
        self.receiver.try_recv().ok()
    }

    /// Take every event queued so far
    pub fn drain(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        while let Ok(event) = self.receiver.try_recv() {
            events.push(event);
        }
        events
    }
}
