//! Metadata snapshots: what a session is currently playing

use crate::item::Item;
use crate::service::Service;

/// Point-in-time metadata for one service.
///
/// `valid` is false when the snapshot is a synthesized placeholder rather
/// than server-confirmed data, as reported by the plain and icy drivers.
#[derive(Clone, Debug)]
pub struct Metadata {
    service: Service,
    current_item: Item,
    next_item: Option<Item>,
    valid: bool,
}

impl Metadata {
    /// Server-confirmed metadata.
    pub fn new(service: Service, current_item: Item, next_item: Option<Item>) -> Self {
        Self {
            service,
            current_item,
            next_item,
            valid: true,
        }
    }

    /// Placeholder metadata anchored on a service, marked invalid.
    pub fn placeholder(service: Service) -> Self {
        Self {
            service,
            current_item: Item::unknown(),
            next_item: None,
            valid: false,
        }
    }

    pub fn service(&self) -> &Service {
        &self.service
    }

    pub fn current_item(&self) -> &Item {
        &self.current_item
    }

    pub fn next_item(&self) -> Option<&Item> {
        self.next_item.as_ref()
    }

    /// False for placeholder snapshots.
    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::ServiceId;

    #[test]
    fn placeholder_is_invalid() {
        let metadata = Metadata::placeholder(Service::new(ServiceId::from("default")));
        assert!(!metadata.is_valid());
        assert!(metadata.next_item().is_none());
    }

    #[test]
    fn confirmed_metadata_is_valid() {
        let metadata = Metadata::new(
            Service::new(ServiceId::from("fip")),
            Item::unknown(),
            Some(Item::unknown()),
        );
        assert!(metadata.is_valid());
        assert!(metadata.next_item().is_some());
    }
}
