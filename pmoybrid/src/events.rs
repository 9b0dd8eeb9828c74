use std::sync::{Arc, Mutex};

use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::driver::Facet;

/// Fan-out bus for facet-change notifications.
///
/// Subscribers that dropped their receiver are pruned on the next broadcast.
#[derive(Clone, Default)]
pub(crate) struct FacetEventBus {
    subscribers: Arc<Mutex<Vec<Sender<Facet>>>>,
}

impl FacetEventBus {
    pub(crate) fn new() -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn subscribe(&self) -> Receiver<Facet> {
        let (tx, rx) = unbounded::<Facet>();
        {
            let mut subscribers = self.subscribers.lock().unwrap();
            subscribers.push(tx);
        }
        rx
    }

    pub(crate) fn broadcast(&self, facet: Facet) {
        let mut subscribers = self.subscribers.lock().unwrap();
        subscribers.retain(|tx| tx.send(facet).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcast_reaches_every_subscriber() {
        let bus = FacetEventBus::new();
        let first = bus.subscribe();
        let second = bus.subscribe();

        bus.broadcast(Facet::Bouquet);

        assert_eq!(first.try_recv(), Ok(Facet::Bouquet));
        assert_eq!(second.try_recv(), Ok(Facet::Bouquet));
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let bus = FacetEventBus::new();
        drop(bus.subscribe());
        let alive = bus.subscribe();

        bus.broadcast(Facet::Metadata);
        assert_eq!(alive.try_recv(), Ok(Facet::Metadata));
        assert_eq!(bus.subscribers.lock().unwrap().len(), 1);
    }
}
