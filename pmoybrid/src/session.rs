//! Sessions: the player-facing handle onto one driver
//!
//! A session owns exactly one driver for its lifetime and is the surface the
//! external player talks to: capability queries, transaction creation and
//! execution, and point-in-time snapshot accessors. The session never
//! retries or recovers driver failures; those stay inside the transaction
//! that captured them.

use std::sync::Arc;

use crossbeam_channel::Receiver;
use url::Url;

use pmobouquet::{Bouquet, Metadata, PlayoutInfo};

use crate::capabilities::{Capability, CapabilitySet};
use crate::command::Request;
use crate::driver::{Driver, Facet};
use crate::errors::ControlError;
use crate::icy_driver::IcyDriver;
use crate::plain_driver::PlainDriver;
use crate::transaction::Transaction;
use crate::ybrid_driver::YbridDriver;

pub struct Session {
    driver: Arc<dyn Driver>,
}

impl Session {
    /// Bind a session to the driver that will serve it for its lifetime.
    pub fn new(driver: Arc<dyn Driver>) -> Self {
        Self { driver }
    }

    /// Session over a bare HTTP/Icecast stream.
    pub fn plain(base_uri: Url) -> Self {
        Self::new(Arc::new(PlainDriver::new(base_uri)))
    }

    /// Session over an icy header-tagged stream.
    pub fn icy(base_uri: Url) -> Self {
        Self::new(Arc::new(IcyDriver::new(base_uri)))
    }

    /// Session over the hybrid ybrid protocol.
    pub fn ybrid(base_uri: Url) -> Self {
        Self::new(Arc::new(YbridDriver::new(base_uri)))
    }

    pub fn driver(&self) -> &Arc<dyn Driver> {
        &self.driver
    }

    /// Live capability set maintained by the driver.
    pub fn capabilities(&self) -> CapabilitySet {
        self.driver.capabilities()
    }

    /// Player-facing capability derivation.
    pub fn player_capabilities(&self) -> CapabilitySet {
        self.driver.capabilities().make_player_set()
    }

    pub fn has_capability(&self, capability: Capability) -> bool {
        self.driver.capabilities().contains(capability)
    }

    /// Bind a request to a fresh transaction targeting this session's driver.
    pub fn create_transaction(&self, request: Request) -> Transaction {
        Transaction::new(request, Arc::clone(&self.driver))
    }

    /// Create and run a transaction inline, returning it for inspection.
    pub fn execute(&self, request: Request) -> Result<Transaction, ControlError> {
        let transaction = self.create_transaction(request);
        transaction.run()?;
        Ok(transaction)
    }

    /// Create a transaction and run it on a background thread.
    pub fn execute_in_background(&self, request: Request) -> Result<Transaction, ControlError> {
        let transaction = self.create_transaction(request);
        transaction.run_in_background()?;
        Ok(transaction)
    }

    pub fn stream_uri(&self) -> Result<Url, ControlError> {
        self.driver.stream_uri()
    }

    pub fn bouquet(&self) -> Bouquet {
        self.driver.bouquet()
    }

    pub fn metadata(&self) -> Metadata {
        self.driver.metadata()
    }

    pub fn playout_info(&self) -> PlayoutInfo {
        self.driver.playout_info()
    }

    pub fn connected(&self) -> bool {
        self.driver.connected()
    }

    /// Facets that changed since the last call, for selective republishing.
    pub fn take_changed(&self) -> Vec<Facet> {
        self.driver.take_changed()
    }

    /// Subscribe to facet-change events.
    pub fn subscribe(&self) -> Receiver<Facet> {
        self.driver.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::plain(Url::parse("http://radio.example.com/stream").unwrap())
    }

    #[test]
    fn execute_runs_the_transaction_inline() {
        let session = session();
        let transaction = session.execute(Request::connect()).unwrap();

        assert!(transaction.control_complete());
        transaction.assert_success().unwrap();
        assert!(session.connected());
    }

    #[test]
    fn player_capabilities_are_derived() {
        let session = session();
        assert!(session.player_capabilities().is_empty());

        session.execute(Request::connect()).unwrap();

        assert!(session.has_capability(Capability::AudioTransport));
        let player = session.player_capabilities();
        assert!(player.contains(Capability::Playback));
        assert_eq!(player.len(), 2);
    }

    #[test]
    fn failures_surface_through_the_transaction() {
        let session = session();
        let transaction = session
            .execute(Request::swap_item(crate::command::SwapMode::End2End))
            .unwrap();

        assert!(transaction.assert_success().is_err());
        // The session itself performs no recovery.
        assert!(!session.connected());
    }

    #[test]
    fn background_execution_is_observable() {
        let session = session();
        let transaction = session.execute_in_background(Request::connect()).unwrap();

        transaction.wait_control_complete();
        transaction.assert_success().unwrap();
        assert!(session.connected());
    }

    #[test]
    fn changed_facets_drain_once() {
        let session = session();
        assert_eq!(session.take_changed().len(), 4);
        assert!(session.take_changed().is_empty());

        session.execute(Request::connect()).unwrap();
        assert!(!session.take_changed().is_empty());
    }
}
