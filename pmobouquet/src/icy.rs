//! Icy/ice header parsing for header-tagged Icecast streams
//!
//! Servers of the icy family describe their single service through HTTP
//! response headers (`icy-name`, `ice-genre`, ...). Header names are matched
//! case-insensitively; when both prefixes define the same suffix the `ice-`
//! value wins regardless of header order.

use std::collections::HashMap;

use url::Url;

use crate::service::{Service, ServiceId};

const ICE_PREFIX: &str = "ice-";
const ICY_PREFIX: &str = "icy-";

#[derive(Clone, Debug)]
struct HeaderField {
    value: String,
    from_ice: bool,
}

/// Typed view over the `ice-*`/`icy-*` headers of a stream response.
#[derive(Clone, Debug, Default)]
pub struct IcyHeaders {
    fields: HashMap<String, HeaderField>,
}

impl IcyHeaders {
    /// Extract the icy family fields from arbitrary response headers.
    ///
    /// Everything that does not carry one of the two prefixes is ignored.
    pub fn parse<I, N, V>(headers: I) -> Self
    where
        I: IntoIterator<Item = (N, V)>,
        N: AsRef<str>,
        V: AsRef<str>,
    {
        let mut fields: HashMap<String, HeaderField> = HashMap::new();

        for (name, value) in headers {
            let folded = name.as_ref().to_ascii_lowercase();
            let (suffix, from_ice) = if let Some(suffix) = folded.strip_prefix(ICE_PREFIX) {
                (suffix, true)
            } else if let Some(suffix) = folded.strip_prefix(ICY_PREFIX) {
                (suffix, false)
            } else {
                continue;
            };

            let field = HeaderField {
                value: value.as_ref().to_string(),
                from_ice,
            };

            match fields.get(suffix) {
                // An existing ice- value is never displaced by an icy- one.
                Some(existing) if existing.from_ice && !from_ice => {}
                _ => {
                    fields.insert(suffix.to_string(), field);
                }
            }
        }

        Self { fields }
    }

    /// Raw value for a prefix-stripped field name.
    pub fn get(&self, suffix: &str) -> Option<&str> {
        self.fields.get(suffix).map(|field| field.value.as_str())
    }

    pub fn name(&self) -> Option<&str> {
        self.get("name")
    }

    pub fn genre(&self) -> Option<&str> {
        self.get("genre")
    }

    pub fn description(&self) -> Option<&str> {
        self.get("description")
    }

    /// Station website advertised by the stream, when parseable.
    pub fn url(&self) -> Option<Url> {
        self.get("url").and_then(|raw| Url::parse(raw).ok())
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Shape a service from the header fields.
    ///
    /// The display name falls back to the service identifier when no `name`
    /// header of either prefix is present (via [`Service::display_name`]).
    pub fn to_service(&self, id: ServiceId) -> Service {
        let mut service = Service::new(id);
        if let Some(name) = self.name() {
            service = service.with_display_name(name);
        }
        if let Some(genre) = self.genre() {
            service = service.with_genre(genre);
        }
        if let Some(description) = self.description() {
            service = service.with_description(description);
        }
        if let Some(logo) = self.get("logo").and_then(|raw| Url::parse(raw).ok()) {
            service = service.with_icon_uri(logo);
        }
        service
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retains_only_prefixed_headers() {
        let headers = IcyHeaders::parse([
            ("icy-name", "Radio X"),
            ("ice-genre", "Jazz"),
            ("content-type", "audio/mpeg"),
        ]);

        assert_eq!(headers.name(), Some("Radio X"));
        assert_eq!(headers.genre(), Some("Jazz"));
        assert_eq!(headers.get("content-type"), None);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let headers = IcyHeaders::parse([("ICY-Name", "Radio X"), ("Ice-Genre", "Jazz")]);
        assert_eq!(headers.name(), Some("Radio X"));
        assert_eq!(headers.genre(), Some("Jazz"));
    }

    #[test]
    fn ice_wins_over_icy_in_either_order() {
        let ice_first = IcyHeaders::parse([("ice-name", "Ice"), ("icy-name", "Icy")]);
        assert_eq!(ice_first.name(), Some("Ice"));

        let icy_first = IcyHeaders::parse([("icy-name", "Icy"), ("ice-name", "Ice")]);
        assert_eq!(icy_first.name(), Some("Ice"));
    }

    #[test]
    fn service_shaped_from_headers() {
        let headers = IcyHeaders::parse([("icy-name", "Radio X"), ("ice-genre", "Jazz")]);
        let service = headers.to_service(ServiceId::from("stream"));

        assert_eq!(service.display_name(), "Radio X");
        assert_eq!(service.genre(), Some("Jazz"));
        assert_eq!(service.description(), None);
    }

    #[test]
    fn display_name_falls_back_to_identifier() {
        let headers = IcyHeaders::parse([("ice-genre", "Jazz")]);
        let service = headers.to_service(ServiceId::from("stream"));
        assert_eq!(service.display_name(), "stream");
    }
}
