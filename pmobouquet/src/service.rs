//! Services: the addressable programs a streaming session can offer
//!
//! A [`Service`] is identified by a stable [`ServiceId`]. Display name, icon,
//! genre and description are presentation attributes that may differ between
//! snapshots of the same service; equality and hashing therefore derive from
//! the identifier alone.

use std::hash::{Hash, Hasher};

use url::Url;

/// Stable identifier of a service within a bouquet.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServiceId(pub String);

impl ServiceId {
    /// Identifier as a plain string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ServiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ServiceId {
    fn from(raw: &str) -> Self {
        ServiceId(raw.to_string())
    }
}

/// One addressable program within a bouquet.
#[derive(Clone, Debug)]
pub struct Service {
    id: ServiceId,
    display_name: Option<String>,
    icon_uri: Option<Url>,
    genre: Option<String>,
    description: Option<String>,
}

impl Service {
    /// Create a service carrying nothing but its identifier.
    pub fn new(id: ServiceId) -> Self {
        Self {
            id,
            display_name: None,
            icon_uri: None,
            genre: None,
            description: None,
        }
    }

    /// Attach a display name.
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Attach an icon URI.
    pub fn with_icon_uri(mut self, icon: Url) -> Self {
        self.icon_uri = Some(icon);
        self
    }

    /// Attach a genre.
    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    /// Attach a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn id(&self) -> &ServiceId {
        &self.id
    }

    /// Display name, falling back to the identifier when none was provided.
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(self.id.as_str())
    }

    /// Raw display name without the identifier fallback.
    pub fn raw_display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn icon_uri(&self) -> Option<&Url> {
        self.icon_uri.as_ref()
    }

    pub fn genre(&self) -> Option<&str> {
        self.genre.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// Identity is the service id; presentation attributes do not participate.
impl PartialEq for Service {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Service {}

impl Hash for Service {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn equality_ignores_presentation_attributes() {
        let plain = Service::new(ServiceId::from("fip"));
        let dressed = Service::new(ServiceId::from("fip"))
            .with_display_name("FIP")
            .with_genre("Eclectic");

        assert_eq!(plain, dressed);

        let other = Service::new(ServiceId::from("fip_rock")).with_display_name("FIP");
        assert_ne!(plain, other);
    }

    #[test]
    fn hash_follows_identity() {
        let mut set = HashSet::new();
        set.insert(Service::new(ServiceId::from("fip")).with_display_name("FIP"));
        set.insert(Service::new(ServiceId::from("fip")).with_genre("Jazz"));
        set.insert(Service::new(ServiceId::from("franceculture")));

        assert_eq!(set.len(), 2);
    }

    #[test]
    fn display_name_falls_back_to_id() {
        let service = Service::new(ServiceId::from("fip"));
        assert_eq!(service.display_name(), "fip");
        assert_eq!(service.raw_display_name(), None);

        let named = service.with_display_name("FIP");
        assert_eq!(named.display_name(), "FIP");
    }
}
