//! Protocol-agnostic driver contract and the shared driver state block
//!
//! A [`Driver`] executes requests for exactly one session and owns the live
//! [`CapabilitySet`] plus the latest bouquet/metadata/playout snapshots.
//! Concrete drivers share behavior through an embedded [`DriverCommon`]
//! value rather than through inheritance: the common block carries the base
//! URI, the single internal lock serializing all state mutation, and the
//! facet-change bookkeeping the owning session republishes from.

use std::sync::Mutex;

use crossbeam_channel::Receiver;
use url::Url;

use pmobouquet::{Bouquet, Metadata, PlayoutInfo};

use crate::capabilities::CapabilitySet;
use crate::command::{Command, Request};
use crate::errors::ControlError;
use crate::events::FacetEventBus;

/// One observable facet of driver state.
///
/// Mutations mark the facet so a session can republish only what actually
/// changed instead of the whole state on every request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Facet {
    Capabilities,
    Bouquet,
    Playout,
    Metadata,
}

impl Facet {
    pub const ALL: [Facet; 4] = [
        Facet::Capabilities,
        Facet::Bouquet,
        Facet::Playout,
        Facet::Metadata,
    ];
}

/// Protocol-specific executor bound to one session.
pub trait Driver: Send + Sync {
    /// Short protocol name used in errors and logs.
    fn name(&self) -> &'static str;

    /// Execute one request. Failures are returned, not panicked; the calling
    /// transaction captures them as its control outcome.
    fn execute_request(&self, request: &Request) -> Result<(), ControlError>;

    /// Derive the concrete playback URI from the session base URI.
    fn stream_uri(&self) -> Result<Url, ControlError>;

    fn bouquet(&self) -> Bouquet;

    fn playout_info(&self) -> PlayoutInfo;

    fn metadata(&self) -> Metadata;

    fn capabilities(&self) -> CapabilitySet;

    fn connected(&self) -> bool;

    /// Drain the set of facets that changed since the last call.
    fn take_changed(&self) -> Vec<Facet>;

    /// Subscribe to facet-change events.
    fn subscribe(&self) -> Receiver<Facet>;
}

/// Build a standardized error when a driver has no handler for a command.
pub(crate) fn unsupported_command(command: Command, driver: &'static str) -> ControlError {
    ControlError::UnsupportedCommand(command.name(), driver)
}

/// State block guarded by the driver's single internal lock.
pub(crate) struct CommonState {
    pub connected: bool,
    pub capabilities: CapabilitySet,
    pub bouquet: Bouquet,
    pub metadata: Metadata,
    pub playout: PlayoutInfo,
    changed: Vec<Facet>,
    broadcast_queue: Vec<Facet>,
}

impl CommonState {
    /// Record that a facet changed; deduplicated for `take_changed`, always
    /// queued for the event bus.
    pub fn mark(&mut self, facet: Facet) {
        if !self.changed.contains(&facet) {
            self.changed.push(facet);
        }
        self.broadcast_queue.push(facet);
    }

    pub fn mark_all(&mut self) {
        for facet in Facet::ALL {
            self.mark(facet);
        }
    }
}

/// Shared driver plumbing, embedded by every concrete driver.
pub(crate) struct DriverCommon {
    base_uri: Url,
    state: Mutex<CommonState>,
    events: FacetEventBus,
}

impl DriverCommon {
    /// Initial construction marks all four facets changed.
    pub fn new(base_uri: Url, bouquet: Bouquet, metadata: Metadata) -> Self {
        Self {
            base_uri,
            state: Mutex::new(CommonState {
                connected: false,
                capabilities: CapabilitySet::new(),
                bouquet,
                metadata,
                playout: PlayoutInfo::default(),
                changed: Facet::ALL.to_vec(),
                broadcast_queue: Vec::new(),
            }),
            events: FacetEventBus::new(),
        }
    }

    pub fn base_uri(&self) -> &Url {
        &self.base_uri
    }

    /// Run a mutation under the state lock, then broadcast the facets it
    /// marked once the lock is released.
    pub fn mutate<R>(&self, f: impl FnOnce(&mut CommonState) -> R) -> R {
        let (result, to_broadcast) = {
            let mut state = self.state.lock().unwrap();
            let result = f(&mut state);
            (result, std::mem::take(&mut state.broadcast_queue))
        };
        for facet in to_broadcast {
            self.events.broadcast(facet);
        }
        result
    }

    /// Read a point-in-time view under the state lock.
    pub fn read<R>(&self, f: impl FnOnce(&CommonState) -> R) -> R {
        let state = self.state.lock().unwrap();
        f(&state)
    }

    pub fn connected(&self) -> bool {
        self.read(|state| state.connected)
    }

    pub fn capabilities(&self) -> CapabilitySet {
        self.read(|state| state.capabilities.clone())
    }

    pub fn bouquet(&self) -> Bouquet {
        self.read(|state| state.bouquet.clone())
    }

    pub fn metadata(&self) -> Metadata {
        self.read(|state| state.metadata.clone())
    }

    pub fn playout_info(&self) -> PlayoutInfo {
        self.read(|state| state.playout)
    }

    pub fn take_changed(&self) -> Vec<Facet> {
        let mut state = self.state.lock().unwrap();
        std::mem::take(&mut state.changed)
    }

    pub fn subscribe(&self) -> Receiver<Facet> {
        self.events.subscribe()
    }

    /// Swap the base URI scheme for a protocol-specific token.
    ///
    /// The replacement happens textually and the result is re-parsed, so a
    /// base URI that cannot carry the new scheme surfaces as a
    /// [`ControlError::StreamUri`].
    pub fn stream_uri_with_scheme(&self, scheme: &str) -> Result<Url, ControlError> {
        let raw = self.base_uri.as_str();
        let rest = raw
            .split_once("://")
            .map(|(_, rest)| rest)
            .ok_or_else(|| ControlError::stream_uri(raw, "base URI has no authority part"))?;
        Url::parse(&format!("{scheme}://{rest}"))
            .map_err(|e| ControlError::stream_uri(raw, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pmobouquet::{Service, ServiceId};

    fn common(base: &str) -> DriverCommon {
        let service = Service::new(ServiceId::from("default"));
        DriverCommon::new(
            Url::parse(base).unwrap(),
            Bouquet::single(service.clone()),
            Metadata::placeholder(service),
        )
    }

    #[test]
    fn construction_marks_all_facets() {
        let common = common("http://radio.example.com/stream");
        assert_eq!(common.take_changed(), Facet::ALL.to_vec());
        assert!(common.take_changed().is_empty());
    }

    #[test]
    fn marks_are_deduplicated_but_all_broadcast() {
        let common = common("http://radio.example.com/stream");
        common.take_changed();
        let events = common.subscribe();

        common.mutate(|state| {
            state.mark(Facet::Metadata);
            state.mark(Facet::Metadata);
        });

        assert_eq!(common.take_changed(), vec![Facet::Metadata]);
        assert_eq!(events.try_recv(), Ok(Facet::Metadata));
        assert_eq!(events.try_recv(), Ok(Facet::Metadata));
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn scheme_swap_preserves_the_rest_of_the_uri() {
        let common = common("http://radio.example.com:8000/stream?bitrate=320");
        let uri = common.stream_uri_with_scheme("icyx").unwrap();
        assert_eq!(uri.as_str(), "icyx://radio.example.com:8000/stream?bitrate=320");
    }
}
