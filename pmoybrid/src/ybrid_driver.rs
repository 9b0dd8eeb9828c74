//! Driver for the hybrid "ybrid" protocol
//!
//! The hybrid protocol layers a JSON-over-HTTP control channel on top of the
//! audio stream: session negotiation, multi-service bouquets, mid-stream
//! item swapping and timed companion metadata. Every command maps to one
//! `ctrl/…` endpoint carrying the negotiated session id; responses are
//! partial snapshots (bouquet, metadata, playout) that replace the driver's
//! corresponding views.

use std::sync::Mutex;
use std::time::Duration;

use crossbeam_channel::Receiver;
use serde::Deserialize;
use tracing::debug;
use ureq::Agent;
use url::Url;

use pmobouquet::{
    Bouquet, Item, Metadata, ParseLog, PlayoutInfo, Service, ServiceId, SwapInfo, TracingLog,
};

use crate::capabilities::{Capability, CapabilitySet};
use crate::command::{Command, Request, SwapMode};
use crate::driver::{CommonState, Driver, DriverCommon, Facet};
use crate::errors::ControlError;

pub(crate) const YBRID_SCHEME: &str = "http";

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

const SESSION_CREATE: &str = "ctrl/session/create";
const SESSION_INFO: &str = "ctrl/session/info";
const SESSION_CLOSE: &str = "ctrl/session/close";
const SWAP_ITEM: &str = "ctrl/swap/item";
const SWAP_SERVICE: &str = "ctrl/swap/service";

pub struct YbridDriver {
    common: DriverCommon,
    agent: Agent,
    /// Session id negotiated by `connect`; `None` while disconnected.
    session: Mutex<Option<String>>,
    parse_log: Box<dyn ParseLog>,
}

impl YbridDriver {
    pub fn new(base_uri: Url) -> Self {
        Self::with_parse_log(base_uri, Box::new(TracingLog))
    }

    /// Use a custom diagnostic sink for item parsing.
    pub fn with_parse_log(base_uri: Url, parse_log: Box<dyn ParseLog>) -> Self {
        let service = Service::new(ServiceId::from("default"));
        let bouquet = Bouquet::single(service.clone());
        let metadata = Metadata::placeholder(service);
        Self {
            common: DriverCommon::new(base_uri, bouquet, metadata),
            agent: build_agent(Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS)),
            session: Mutex::new(None),
            parse_log,
        }
    }

    fn session_id(&self) -> Result<String, ControlError> {
        self.session
            .lock()
            .unwrap()
            .clone()
            .ok_or(ControlError::NotConnected)
    }

    fn command_url(&self, path: &str, params: &[(&str, &str)]) -> String {
        let base = self.common.base_uri().as_str().trim_end_matches('/');
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in params {
            serializer.append_pair(key, value);
        }
        let query = serializer.finish();
        if query.is_empty() {
            format!("{base}/{path}")
        } else {
            format!("{base}/{path}?{query}")
        }
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, ControlError> {
        let mut response = self
            .agent
            .get(url)
            .call()
            .map_err(|e| ControlError::http(format!("GET {url}: {e}")))?;
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ControlError::http(format!("reading response of {url}: {e}")))?;
        serde_json::from_str(&body)
            .map_err(|e| ControlError::protocol(format!("malformed response from {url}: {e}")))
    }

    fn connect(&self) -> Result<(), ControlError> {
        let url = self.command_url(SESSION_CREATE, &[]);
        let created: SessionCreateResponse = self.get_json(&url)?;
        let snapshot = self.parse_snapshot(created.bouquet, created.metadata, created.playout)?;
        debug!(session = created.session_id.as_str(), "ybrid session negotiated");

        *self.session.lock().unwrap() = Some(created.session_id);
        self.common.mutate(|state| {
            state.connected = true;
            state.capabilities.add(Capability::AudioTransport);
            snapshot.apply(state);
            state.mark_all();
        });
        Ok(())
    }

    fn disconnect(&self) -> Result<(), ControlError> {
        let session = self.session.lock().unwrap().take();
        if let Some(session) = session {
            let url = self.command_url(SESSION_CLOSE, &[("sessionId", &session)]);
            if let Err(err) = self.agent.get(&url).call() {
                debug!("ybrid session close failed: {err}");
            }
        }
        self.common.mutate(|state| {
            if state.connected {
                state.connected = false;
                state.capabilities = CapabilitySet::new();
                state.mark(Facet::Capabilities);
            }
        });
        Ok(())
    }

    fn refresh(&self) -> Result<(), ControlError> {
        let session = self.session_id()?;
        let url = self.command_url(SESSION_INFO, &[("sessionId", &session)]);
        let info: SessionInfoResponse = self.get_json(&url)?;
        let snapshot = self.parse_snapshot(info.bouquet, info.metadata, info.playout)?;
        self.common.mutate(|state| snapshot.apply(state));
        Ok(())
    }

    fn swap_item(&self, mode: SwapMode) -> Result<(), ControlError> {
        let session = self.session_id()?;
        let url = self.command_url(
            SWAP_ITEM,
            &[("sessionId", &session), ("mode", mode.wire_token())],
        );
        let info: SessionInfoResponse = self.get_json(&url)?;
        let snapshot = self.parse_snapshot(info.bouquet, info.metadata, info.playout)?;
        self.common.mutate(|state| snapshot.apply(state));
        Ok(())
    }

    fn swap_service(&self, id: &ServiceId) -> Result<(), ControlError> {
        let session = self.session_id()?;
        let url = self.command_url(
            SWAP_SERVICE,
            &[("sessionId", &session), ("id", id.as_str())],
        );
        let info: SessionInfoResponse = self.get_json(&url)?;
        let snapshot = self.parse_snapshot(info.bouquet, info.metadata, info.playout)?;
        self.common.mutate(|state| snapshot.apply(state));
        Ok(())
    }

    /// Convert wire snapshots up front so a malformed response fails the
    /// operation before any driver state is touched.
    fn parse_snapshot(
        &self,
        bouquet: Option<BouquetWire>,
        metadata: Option<MetadataWire>,
        playout: Option<PlayoutWire>,
    ) -> Result<ParsedSnapshot, ControlError> {
        let bouquet = bouquet.map(bouquet_from_wire).transpose()?;
        let metadata = metadata
            .map(|wire| self.parse_metadata(wire))
            .transpose()?;
        let playout = playout.map(playout_from_wire);
        Ok(ParsedSnapshot {
            bouquet,
            metadata,
            playout,
        })
    }

    fn parse_metadata(&self, wire: MetadataWire) -> Result<ParsedMetadata, ControlError> {
        let current = Item::from_json(wire.current_item, &*self.parse_log)
            .map_err(|e| ControlError::protocol(format!("current item: {e}")))?;
        let next = wire
            .next_item
            .map(|value| Item::from_json(value, &*self.parse_log))
            .transpose()
            .map_err(|e| ControlError::protocol(format!("next item: {e}")))?;
        Ok(ParsedMetadata {
            service_id: wire.service_id.map(ServiceId),
            current,
            next,
        })
    }
}

impl Driver for YbridDriver {
    fn name(&self) -> &'static str {
        "ybrid"
    }

    fn execute_request(&self, request: &Request) -> Result<(), ControlError> {
        match request.command() {
            Command::Connect => self.connect(),
            Command::Disconnect => self.disconnect(),
            Command::Refresh => self.refresh(),
            // Player-side commands: the control channel only requires a live
            // session, the audible work happens in the player.
            Command::Prepare | Command::Play | Command::Stop => {
                self.session_id()?;
                Ok(())
            }
            Command::SwapItem => {
                let mode = request
                    .swap_mode()
                    .ok_or_else(|| ControlError::invalid_arguments("swap-item", "missing mode"))?;
                self.swap_item(mode)
            }
            Command::SwapService => {
                let id = request.service_id().cloned().ok_or_else(|| {
                    ControlError::invalid_arguments("swap-service", "missing service")
                })?;
                self.swap_service(&id)
            }
        }
    }

    fn stream_uri(&self) -> Result<Url, ControlError> {
        let mut uri = self.common.stream_uri_with_scheme(YBRID_SCHEME)?;
        if let Some(session) = self.session.lock().unwrap().as_ref() {
            uri.query_pairs_mut().append_pair("sessionId", session);
        }
        Ok(uri)
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

fn build_agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(timeout))
        .build()
        .into()
}

struct ParsedMetadata {
    service_id: Option<ServiceId>,
    current: Item,
    next: Option<Item>,
}

struct ParsedSnapshot {
    bouquet: Option<Bouquet>,
    metadata: Option<ParsedMetadata>,
    playout: Option<PlayoutInfo>,
}

impl ParsedSnapshot {
    /// Replace the views present in this snapshot and re-derive the swap
    /// capabilities from the resulting state.
    fn apply(self, state: &mut CommonState) {
        if let Some(bouquet) = self.bouquet {
            state.bouquet = bouquet;
            state.mark(Facet::Bouquet);
        }
        if let Some(parsed) = self.metadata {
            let service = parsed
                .service_id
                .as_ref()
                .and_then(|id| state.bouquet.find(id))
                .unwrap_or_else(|| state.bouquet.default_service())
                .clone();
            state.metadata = Metadata::new(service, parsed.current, parsed.next);
            state.mark(Facet::Metadata);
        }
        if let Some(playout) = self.playout {
            state.playout = playout;
            state.mark(Facet::Playout);
        }
        sync_swap_capabilities(state);
    }
}

fn sync_swap_capabilities(state: &mut CommonState) {
    let mut changed = false;
    changed |= set_capability(
        &mut state.capabilities,
        Capability::SwapItem,
        state.playout.swap_info().can_swap(),
    );
    changed |= set_capability(
        &mut state.capabilities,
        Capability::SwapService,
        state.bouquet.len() > 1,
    );
    if changed {
        state.mark(Facet::Capabilities);
    }
}

fn set_capability(set: &mut CapabilitySet, capability: Capability, wanted: bool) -> bool {
    if wanted {
        set.add(capability)
    } else {
        set.remove(capability)
    }
}

fn bouquet_from_wire(wire: BouquetWire) -> Result<Bouquet, ControlError> {
    let services = wire
        .services
        .into_iter()
        .map(service_from_wire)
        .collect::<Result<Vec<_>, _>>()?;
    let primary = ServiceId(wire.primary_service);
    let default = services
        .iter()
        .find(|service| service.id() == &primary)
        .cloned()
        .ok_or_else(|| {
            ControlError::protocol(format!("primary service '{primary}' missing from bouquet"))
        })?;
    Bouquet::new(default, services).map_err(|e| ControlError::protocol(e.to_string()))
}

fn service_from_wire(wire: ServiceWire) -> Result<Service, ControlError> {
    let mut service = Service::new(ServiceId(wire.id));
    if let Some(name) = wire.display_name.filter(|s| !s.is_empty()) {
        service = service.with_display_name(name);
    }
    if let Some(genre) = wire.genre.filter(|s| !s.is_empty()) {
        service = service.with_genre(genre);
    }
    if let Some(description) = wire.description.filter(|s| !s.is_empty()) {
        service = service.with_description(description);
    }
    if let Some(raw) = wire.icon_url.filter(|s| !s.is_empty()) {
        let icon = Url::parse(&raw)
            .map_err(|e| ControlError::protocol(format!("service icon URI '{raw}': {e}")))?;
        service = service.with_icon_uri(icon);
    }
    Ok(service)
}

fn playout_from_wire(wire: PlayoutWire) -> PlayoutInfo {
    let swap_info = SwapInfo::new(
        wire.swaps_left.unwrap_or(0),
        wire.next_swap_returns_to_main.unwrap_or(false),
    );
    PlayoutInfo::new(
        swap_info,
        wire.time_to_next_item_millis.map(Duration::from_millis),
    )
}

// ============================================================================
// Wire shapes
// ============================================================================

#[derive(Debug, Deserialize)]
struct SessionCreateResponse {
    #[serde(rename = "sessionId")]
    session_id: String,
    #[serde(default)]
    bouquet: Option<BouquetWire>,
    #[serde(default)]
    metadata: Option<MetadataWire>,
    #[serde(default)]
    playout: Option<PlayoutWire>,
}

#[derive(Debug, Deserialize)]
struct SessionInfoResponse {
    #[serde(default)]
    bouquet: Option<BouquetWire>,
    #[serde(default)]
    metadata: Option<MetadataWire>,
    #[serde(default)]
    playout: Option<PlayoutWire>,
}

#[derive(Debug, Deserialize)]
struct BouquetWire {
    #[serde(rename = "primaryService")]
    primary_service: String,
    services: Vec<ServiceWire>,
}

#[derive(Debug, Deserialize)]
struct ServiceWire {
    id: String,
    #[serde(default, rename = "displayName")]
    display_name: Option<String>,
    #[serde(default, rename = "iconURL")]
    icon_url: Option<String>,
    #[serde(default)]
    genre: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MetadataWire {
    #[serde(default, rename = "serviceId")]
    service_id: Option<String>,
    #[serde(rename = "currentItem")]
    current_item: serde_json::Value,
    #[serde(default, rename = "nextItem")]
    next_item: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct PlayoutWire {
    #[serde(default, rename = "swapsLeft")]
    swaps_left: Option<i32>,
    #[serde(default, rename = "nextSwapReturnsToMain")]
    next_swap_returns_to_main: Option<bool>,
    #[serde(default, rename = "timeToNextItemMillis")]
    time_to_next_item_millis: Option<u64>,
}
