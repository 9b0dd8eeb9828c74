//! Driver for icy header-tagged Icecast streams
//!
//! Behaves like the plain driver — it embeds one — but derives its stream
//! URI with the `icyx` scheme token and can reshape its synthesized service
//! from the `ice-*`/`icy-*` response headers of the stream.

use crossbeam_channel::Receiver;
use url::Url;

use pmobouquet::{Bouquet, IcyHeaders, Metadata, PlayoutInfo};

use crate::capabilities::CapabilitySet;
use crate::command::Request;
use crate::driver::{Driver, Facet};
use crate::errors::ControlError;
use crate::plain_driver::PlainDriver;

pub(crate) const ICY_SCHEME: &str = "icyx";

pub struct IcyDriver {
    inner: PlainDriver,
}

impl IcyDriver {
    pub fn new(base_uri: Url) -> Self {
        Self {
            inner: PlainDriver::new(base_uri),
        }
    }

    /// Reshape the synthesized default service from stream response headers.
    ///
    /// Only `ice-*`/`icy-*` fields are considered; anything else in the
    /// mapping is ignored. Headers without any icy family field leave the
    /// state untouched.
    pub fn apply_headers<I, N, V>(&self, headers: I)
    where
        I: IntoIterator<Item = (N, V)>,
        N: AsRef<str>,
        V: AsRef<str>,
    {
        let fields = IcyHeaders::parse(headers);
        if fields.is_empty() {
            return;
        }

        self.inner.common().mutate(|state| {
            let id = state.bouquet.default_service().id().clone();
            let service = fields.to_service(id);
            state.bouquet = Bouquet::single(service.clone());
            // Still placeholder data, now anchored on the reshaped service.
            state.metadata = Metadata::placeholder(service);
            state.mark(Facet::Bouquet);
            state.mark(Facet::Metadata);
        });
    }
}

impl Driver for IcyDriver {
    fn name(&self) -> &'static str {
        "icy"
    }

    fn execute_request(&self, request: &Request) -> Result<(), ControlError> {
        self.inner.execute_request(request)
    }

    fn stream_uri(&self) -> Result<Url, ControlError> {
        self.inner.common().stream_uri_with_scheme(ICY_SCHEME)
    }

    fn bouquet(&self) -> Bouquet {
        self.inner.bouquet()
    }

    fn playout_info(&self) -> PlayoutInfo {
        self.inner.playout_info()
    }

    fn metadata(&self) -> Metadata {
        self.inner.metadata()
    }

    fn capabilities(&self) -> CapabilitySet {
        self.inner.capabilities()
    }

    fn connected(&self) -> bool {
        self.inner.connected()
    }

    fn take_changed(&self) -> Vec<Facet> {
        self.inner.take_changed()
    }

    fn subscribe(&self) -> Receiver<Facet> {
        self.inner.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::Capability;

    fn driver() -> IcyDriver {
        IcyDriver::new(Url::parse("http://radio.example.com/stream").unwrap())
    }

    #[test]
    fn stream_uri_uses_the_icyx_scheme() {
        let uri = driver().stream_uri().unwrap();
        assert_eq!(uri.as_str(), "icyx://radio.example.com/stream");
    }

    #[test]
    fn connect_behaves_like_plain() {
        let driver = driver();
        driver.execute_request(&Request::connect()).unwrap();
        assert!(driver.connected());
        assert!(driver.capabilities().contains(Capability::AudioTransport));
    }

    #[test]
    fn headers_reshape_the_default_service() {
        let driver = driver();
        driver.take_changed();

        driver.apply_headers([("icy-name", "Radio X"), ("ice-genre", "Jazz")]);

        let bouquet = driver.bouquet();
        let service = bouquet.default_service();
        assert_eq!(service.display_name(), "Radio X");
        assert_eq!(service.genre(), Some("Jazz"));
        assert_eq!(service.id().as_str(), "default");
        assert_eq!(
            driver.take_changed(),
            vec![Facet::Bouquet, Facet::Metadata]
        );

        // Metadata stays a placeholder, re-anchored on the reshaped service.
        let metadata = driver.metadata();
        assert!(!metadata.is_valid());
        assert_eq!(metadata.service().display_name(), "Radio X");
    }

    #[test]
    fn headers_without_icy_fields_change_nothing() {
        let driver = driver();
        driver.take_changed();

        driver.apply_headers([("content-type", "audio/mpeg")]);

        assert!(driver.take_changed().is_empty());
        assert_eq!(driver.bouquet().default_service().display_name(), "default");
    }
}
