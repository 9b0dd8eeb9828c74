//! Items and companions: the playable units reported by the hybrid protocol
//!
//! This module owns the JSON boundary for item metadata. The wire shapes are
//! plain serde structs; conversion into [`Item`]/[`Companion`] applies the
//! tolerant parsing rules of the protocol: generated identifiers, dropped
//! empty strings, and unknown item types that degrade to `None` instead of
//! failing the whole item.
//!
//! Parsing reports anomalies through an explicit [`ParseLog`] collaborator
//! rather than a process-wide logger; [`TracingLog`] is the stock sink.

use std::time::Duration;

use serde::Deserialize;
use tracing::{error, warn};
use url::Url;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Diagnostic sink for recoverable parsing anomalies.
pub trait ParseLog: Send + Sync {
    fn warning(&self, message: &str);
    fn error(&self, message: &str);
}

/// [`ParseLog`] sink forwarding to the `tracing` macros.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLog;

impl ParseLog for TracingLog {
    fn warning(&self, message: &str) {
        warn!("{message}");
    }

    fn error(&self, message: &str) {
        error!("{message}");
    }
}

/// Kind of a playable item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ItemType {
    Advertisement,
    Comedy,
    Jingle,
    Music,
    News,
    Traffic,
    Voice,
}

impl ItemType {
    /// Parse a wire token; `None` for unrecognized values.
    pub fn from_wire_name(raw: &str) -> Option<Self> {
        match raw {
            "ADVERTISEMENT" => Some(Self::Advertisement),
            "COMEDY" => Some(Self::Comedy),
            "JINGLE" => Some(Self::Jingle),
            "MUSIC" => Some(Self::Music),
            "NEWS" => Some(Self::News),
            "TRAFFIC" => Some(Self::Traffic),
            "VOICE" => Some(Self::Voice),
            _ => None,
        }
    }

    pub fn as_wire_name(&self) -> &'static str {
        match self {
            Self::Advertisement => "ADVERTISEMENT",
            Self::Comedy => "COMEDY",
            Self::Jingle => "JINGLE",
            Self::Music => "MUSIC",
            Self::News => "NEWS",
            Self::Traffic => "TRAFFIC",
            Self::Voice => "VOICE",
        }
    }
}

/// Timed companion creative attached to an item.
#[derive(Clone, Debug)]
pub struct Companion {
    alt_text: Option<String>,
    height: u32,
    width: u32,
    sequence_number: u32,
    static_resource: Option<Url>,
    click_through: Option<Url>,
    creative_view: Option<Url>,
}

impl Companion {
    pub fn alt_text(&self) -> Option<&str> {
        self.alt_text.as_deref()
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn sequence_number(&self) -> u32 {
        self.sequence_number
    }

    pub fn static_resource(&self) -> Option<&Url> {
        self.static_resource.as_ref()
    }

    pub fn click_through(&self) -> Option<&Url> {
        self.click_through.as_ref()
    }

    pub fn creative_view(&self) -> Option<&Url> {
        self.creative_view.as_ref()
    }
}

/// One playable unit of content.
#[derive(Clone, Debug)]
pub struct Item {
    id: String,
    artist: Option<String>,
    title: Option<String>,
    description: Option<String>,
    item_type: Option<ItemType>,
    duration: Option<Duration>,
    companions: Vec<Companion>,
}

impl Item {
    /// Placeholder item used before any server-confirmed metadata exists.
    pub fn unknown() -> Self {
        Self {
            id: generated_id(),
            artist: None,
            title: None,
            description: None,
            item_type: None,
            duration: None,
            companions: Vec::new(),
        }
    }

    /// Parse an item from its wire JSON value.
    pub fn from_json(value: serde_json::Value, log: &dyn ParseLog) -> Result<Self> {
        let wire: ItemWire = serde_json::from_value(value)?;
        Self::from_wire(wire, log)
    }

    fn from_wire(wire: ItemWire, log: &dyn ParseLog) -> Result<Self> {
        let id = wire
            .id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(generated_id);

        let item_type = match wire.item_type.as_deref() {
            None => None,
            Some(raw) => match ItemType::from_wire_name(raw) {
                Some(kind) => Some(kind),
                None => {
                    // Placeholder tokens from the playout system start with an
                    // underscore and are expected; anything else is a genuine
                    // unknown value.
                    if raw.starts_with('_') {
                        log.warning(&format!("item {id} carries placeholder type '{raw}'"));
                    } else {
                        log.error(&format!("item {id} carries unknown type '{raw}'"));
                    }
                    None
                }
            },
        };

        let companions = wire
            .companions
            .into_iter()
            .map(Companion::from_wire)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            id,
            artist: wire.artist.filter(|s| !s.is_empty()),
            title: wire.title.filter(|s| !s.is_empty()),
            description: wire.description.filter(|s| !s.is_empty()),
            item_type,
            duration: wire.duration_millis.map(Duration::from_millis),
            companions,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn artist(&self) -> Option<&str> {
        self.artist.as_deref()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn item_type(&self) -> Option<ItemType> {
        self.item_type
    }

    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    pub fn companions(&self) -> &[Companion] {
        &self.companions
    }
}

fn generated_id() -> String {
    Uuid::new_v4().to_string()
}

// ============================================================================
// Wire shapes
// ============================================================================

#[derive(Clone, Debug, Deserialize)]
struct ItemWire {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    artist: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, rename = "type")]
    item_type: Option<String>,
    #[serde(default, rename = "durationMillis")]
    duration_millis: Option<u64>,
    #[serde(default)]
    companions: Vec<CompanionWire>,
}

#[derive(Clone, Debug, Deserialize)]
struct CompanionWire {
    #[serde(default, rename = "altText")]
    alt_text: Option<String>,
    height: u32,
    width: u32,
    #[serde(rename = "sequenceNumber")]
    sequence_number: u32,
    #[serde(default, rename = "staticResourceURI")]
    static_resource_uri: Option<String>,
    #[serde(default, rename = "onClickThroughURI")]
    on_click_through_uri: Option<String>,
    #[serde(default, rename = "onCreativeViewURI")]
    on_creative_view_uri: Option<String>,
}

impl Companion {
    fn from_wire(wire: CompanionWire) -> Result<Self> {
        Ok(Self {
            alt_text: wire.alt_text.filter(|s| !s.is_empty()),
            height: wire.height,
            width: wire.width,
            sequence_number: wire.sequence_number,
            static_resource: parse_optional_url(wire.static_resource_uri)?,
            click_through: parse_optional_url(wire.on_click_through_uri)?,
            creative_view: parse_optional_url(wire.on_creative_view_uri)?,
        })
    }
}

fn parse_optional_url(raw: Option<String>) -> Result<Option<Url>> {
    match raw.filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(raw) => Url::parse(&raw)
            .map(Some)
            .map_err(|e| Error::invalid_url(raw, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    /// ParseLog capturing diagnostics for assertions.
    #[derive(Default)]
    struct RecordingLog {
        warnings: Mutex<Vec<String>>,
        errors: Mutex<Vec<String>>,
    }

    impl ParseLog for RecordingLog {
        fn warning(&self, message: &str) {
            self.warnings.lock().unwrap().push(message.to_string());
        }

        fn error(&self, message: &str) {
            self.errors.lock().unwrap().push(message.to_string());
        }
    }

    #[test]
    fn parses_full_item() {
        let log = RecordingLog::default();
        let item = Item::from_json(
            json!({
                "id": "item-1",
                "artist": "Miles Davis",
                "title": "So What",
                "description": "Kind of Blue",
                "type": "MUSIC",
                "durationMillis": 540000,
                "companions": [{
                    "altText": "Sponsor",
                    "height": 250,
                    "width": 300,
                    "sequenceNumber": 1,
                    "staticResourceURI": "https://ads.example.com/banner.png",
                    "onClickThroughURI": "https://ads.example.com/click"
                }]
            }),
            &log,
        )
        .unwrap();

        assert_eq!(item.id(), "item-1");
        assert_eq!(item.artist(), Some("Miles Davis"));
        assert_eq!(item.title(), Some("So What"));
        assert_eq!(item.item_type(), Some(ItemType::Music));
        assert_eq!(item.duration(), Some(Duration::from_millis(540000)));

        let companion = &item.companions()[0];
        assert_eq!(companion.alt_text(), Some("Sponsor"));
        assert_eq!(companion.height(), 250);
        assert_eq!(companion.width(), 300);
        assert_eq!(companion.sequence_number(), 1);
        assert!(companion.static_resource().is_some());
        assert!(companion.creative_view().is_none());
        assert!(log.warnings.lock().unwrap().is_empty());
        assert!(log.errors.lock().unwrap().is_empty());
    }

    #[test]
    fn missing_or_empty_id_is_generated() {
        let log = RecordingLog::default();
        let absent = Item::from_json(json!({"title": "x"}), &log).unwrap();
        assert!(!absent.id().is_empty());

        let empty = Item::from_json(json!({"id": "", "title": "x"}), &log).unwrap();
        assert!(!empty.id().is_empty());
        assert_ne!(absent.id(), empty.id());
    }

    #[test]
    fn empty_metadata_strings_are_dropped() {
        let log = RecordingLog::default();
        let item = Item::from_json(
            json!({"id": "i", "artist": "", "title": "Kept", "description": ""}),
            &log,
        )
        .unwrap();

        assert_eq!(item.artist(), None);
        assert_eq!(item.title(), Some("Kept"));
        assert_eq!(item.description(), None);
    }

    #[test]
    fn placeholder_type_warns_and_degrades() {
        let log = RecordingLog::default();
        let item = Item::from_json(json!({"id": "i", "type": "_FILLER"}), &log).unwrap();

        assert_eq!(item.item_type(), None);
        assert_eq!(log.warnings.lock().unwrap().len(), 1);
        assert!(log.errors.lock().unwrap().is_empty());
    }

    #[test]
    fn unknown_type_errors_and_degrades() {
        let log = RecordingLog::default();
        let item = Item::from_json(json!({"id": "i", "type": "POETRY"}), &log).unwrap();

        assert_eq!(item.item_type(), None);
        assert!(log.warnings.lock().unwrap().is_empty());
        assert_eq!(log.errors.lock().unwrap().len(), 1);
    }

    #[test]
    fn companion_requires_geometry() {
        let log = RecordingLog::default();
        let result = Item::from_json(
            json!({"id": "i", "companions": [{"height": 10, "width": 20}]}),
            &log,
        );

        assert!(matches!(result, Err(Error::Json(_))));
    }

    #[test]
    fn companion_rejects_malformed_uris() {
        let log = RecordingLog::default();
        let result = Item::from_json(
            json!({"id": "i", "companions": [{
                "height": 10,
                "width": 20,
                "sequenceNumber": 0,
                "staticResourceURI": "not a url"
            }]}),
            &log,
        );

        assert!(matches!(result, Err(Error::InvalidUrl(_, _))));
    }

    #[test]
    fn item_type_wire_names_round_trip() {
        for kind in [
            ItemType::Advertisement,
            ItemType::Comedy,
            ItemType::Jingle,
            ItemType::Music,
            ItemType::News,
            ItemType::Traffic,
            ItemType::Voice,
        ] {
            assert_eq!(ItemType::from_wire_name(kind.as_wire_name()), Some(kind));
        }
    }
}
