//! Bouquets: the set of services a session currently offers

use crate::error::{Error, Result};
use crate::service::{Service, ServiceId};

/// Immutable set of services with a designated default.
///
/// Invariant: the default service is always a member of the service list,
/// enforced at construction.
#[derive(Clone, Debug)]
pub struct Bouquet {
    default: Service,
    services: Vec<Service>,
}

impl Bouquet {
    /// Build a bouquet from a default service and the full service list.
    ///
    /// Fails when the default (by identity) is not part of `services`.
    pub fn new(default: Service, services: Vec<Service>) -> Result<Self> {
        if !services.contains(&default) {
            return Err(Error::DefaultNotInBouquet(default.id().to_string()));
        }
        Ok(Self { default, services })
    }

    /// Single-service bouquet, used by drivers that synthesize their only
    /// service from the session base URI.
    pub fn single(service: Service) -> Self {
        Self {
            default: service.clone(),
            services: vec![service],
        }
    }

    pub fn default_service(&self) -> &Service {
        &self.default
    }

    pub fn services(&self) -> &[Service] {
        &self.services
    }

    /// Look up a service by identifier.
    pub fn find(&self, id: &ServiceId) -> Option<&Service> {
        self.services.iter().find(|service| service.id() == id)
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(id: &str) -> Service {
        Service::new(ServiceId::from(id))
    }

    #[test]
    fn default_must_be_a_member() {
        let result = Bouquet::new(service("fip"), vec![service("franceculture")]);
        assert!(matches!(result, Err(Error::DefaultNotInBouquet(id)) if id == "fip"));
    }

    #[test]
    fn accepts_default_in_services() {
        let bouquet = Bouquet::new(
            service("fip"),
            vec![service("fip"), service("franceculture")],
        )
        .unwrap();

        assert_eq!(bouquet.default_service().id().as_str(), "fip");
        assert_eq!(bouquet.len(), 2);
        assert!(bouquet.find(&ServiceId::from("franceculture")).is_some());
        assert!(bouquet.find(&ServiceId::from("mouv")).is_none());
    }

    #[test]
    fn membership_uses_identity_not_attributes() {
        // Same id with different presentation attributes is the same service.
        let default = service("fip").with_display_name("FIP");
        let bouquet = Bouquet::new(default, vec![service("fip")]).unwrap();
        assert_eq!(bouquet.len(), 1);
    }

    #[test]
    fn single_contains_its_default() {
        let bouquet = Bouquet::single(service("default"));
        assert_eq!(bouquet.services().len(), 1);
        assert_eq!(bouquet.default_service(), &bouquet.services()[0]);
    }
}
