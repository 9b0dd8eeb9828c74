//! Driver for plain HTTP/Icecast-style streams
//!
//! The plain protocol has no control channel: the stream URI is the whole
//! interface. The driver synthesizes a single default service, reports
//! placeholder metadata, and treats the command set as accepted no-ops —
//! except `connect`, which marks the session audio-capable.

use crossbeam_channel::Receiver;
use url::Url;

use pmobouquet::{Bouquet, Metadata, PlayoutInfo, Service, ServiceId};

use crate::capabilities::{Capability, CapabilitySet};
use crate::command::{Command, Request};
use crate::driver::{Driver, DriverCommon, Facet, unsupported_command};
use crate::errors::ControlError;

pub(crate) const PLAIN_SCHEME: &str = "http";

/// Identifier of the synthesized default service.
const DEFAULT_SERVICE_ID: &str = "default";

pub struct PlainDriver {
    common: DriverCommon,
}

impl PlainDriver {
    pub fn new(base_uri: Url) -> Self {
        let service = Service::new(ServiceId::from(DEFAULT_SERVICE_ID));
        let bouquet = Bouquet::single(service.clone());
        let metadata = Metadata::placeholder(service);
        Self {
            common: DriverCommon::new(base_uri, bouquet, metadata),
        }
    }

    pub(crate) fn common(&self) -> &DriverCommon {
        &self.common
    }

    fn handle_connect(&self) {
        self.common.mutate(|state| {
            state.connected = true;
            state.capabilities.add(Capability::AudioTransport);
            // Connecting (re)establishes every view of the session.
            state.mark_all();
        });
    }

    fn handle_disconnect(&self) {
        self.common.mutate(|state| {
            state.connected = false;
            if state.capabilities.remove(Capability::AudioTransport) {
                state.mark(Facet::Capabilities);
            }
        });
    }
}

impl Driver for PlainDriver {
    fn name(&self) -> &'static str {
        "plain"
    }

    fn execute_request(&self, request: &Request) -> Result<(), ControlError> {
        match request.command() {
            Command::Connect => {
                self.handle_connect();
                Ok(())
            }
            Command::Disconnect => {
                self.handle_disconnect();
                Ok(())
            }
            // Nothing to do on the wire; the player drives the stream itself.
            Command::Refresh | Command::Prepare | Command::Play | Command::Stop => Ok(()),
            other => Err(unsupported_command(other, self.name())),
        }
    }

    fn stream_uri(&self) -> Result<Url, ControlError> {
        self.common.stream_uri_with_scheme(PLAIN_SCHEME)
    }

    fn bouquet(&self) -> Bouquet {
        self.common.bouquet()
    }

    fn playout_info(&self) -> PlayoutInfo {
        self.common.playout_info()
    }

    fn metadata(&self) -> Metadata {
        self.common.metadata()
    }

    fn capabilities(&self) -> CapabilitySet {
        self.common.capabilities()
    }

    fn connected(&self) -> bool {
        self.common.connected()
    }

    fn take_changed(&self) -> Vec<Facet> {
        self.common.take_changed()
    }

    fn subscribe(&self) -> Receiver<Facet> {
        self.common.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn driver() -> PlainDriver {
        PlainDriver::new(Url::parse("https://radio.example.com/stream").unwrap())
    }

    #[test]
    fn connect_marks_audio_capable() {
        let driver = driver();
        driver.take_changed();
        assert!(!driver.connected());

        driver.execute_request(&Request::connect()).unwrap();

        assert!(driver.connected());
        assert!(driver.capabilities().contains(Capability::AudioTransport));
        assert_eq!(driver.take_changed(), Facet::ALL.to_vec());
    }

    #[test]
    fn player_commands_are_accepted_noops() {
        let driver = driver();
        driver.execute_request(&Request::connect()).unwrap();
        driver.take_changed();

        for request in [
            Request::refresh(),
            Request::prepare(),
            Request::play(),
            Request::stop(),
        ] {
            driver.execute_request(&request).unwrap();
        }
        assert!(driver.take_changed().is_empty());
    }

    #[test]
    fn swap_commands_are_unsupported() {
        let driver = driver();
        let err = driver
            .execute_request(&Request::swap_item(crate::command::SwapMode::End2End))
            .unwrap_err();
        assert_eq!(err, ControlError::UnsupportedCommand("swap-item", "plain"));
    }

    #[test]
    fn disconnect_withdraws_the_transport() {
        let driver = driver();
        driver.execute_request(&Request::connect()).unwrap();
        driver.take_changed();

        driver.execute_request(&Request::disconnect()).unwrap();
        assert!(!driver.connected());
        assert!(driver.capabilities().is_empty());
        assert_eq!(driver.take_changed(), vec![Facet::Capabilities]);
    }

    #[test]
    fn stream_uri_uses_the_http_scheme() {
        let uri = driver().stream_uri().unwrap();
        assert_eq!(uri.as_str(), "http://radio.example.com/stream");
    }

    #[test]
    fn reports_a_single_synthesized_service() {
        let driver = driver();
        let bouquet = driver.bouquet();
        assert_eq!(bouquet.services().len(), 1);
        assert_eq!(bouquet.default_service().id().as_str(), "default");
        assert!(!driver.metadata().is_valid());
        assert!(!driver.playout_info().swap_info().can_swap());
    }
}
