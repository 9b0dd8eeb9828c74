//! Protocol drivers and transaction engine for live-audio streaming control
//!
//! `pmoybrid` lets an audio player drive a live-streaming session without
//! knowing which wire protocol serves it. Three drivers share one contract:
//! plain HTTP/Icecast, the icy header-tagged variant, and the hybrid "ybrid"
//! JSON protocol with bouquets, item swapping and companion metadata.
//!
//! The player issues [`Request`]s through a [`Session`]; each request runs
//! inside a [`Transaction`] that tracks control-plane completion (the
//! command was processed) independently of audio-plane completion (the
//! audible consequence finished). Capabilities negotiated by the driver are
//! exposed live and in their player-facing derivation.

mod events;

pub mod capabilities;
pub mod command;
pub mod driver;
pub mod errors;
pub mod icy_driver;
pub mod plain_driver;
pub mod session;
pub mod transaction;
pub mod ybrid_driver;

pub use capabilities::{Capability, CapabilitySet};
pub use command::{Command, CommandArg, Request, SwapMode};
pub use driver::{Driver, Facet};
pub use errors::ControlError;
pub use icy_driver::IcyDriver;
pub use plain_driver::PlainDriver;
pub use session::Session;
pub use transaction::Transaction;
pub use ybrid_driver::YbridDriver;

// Re-export the data model so players depend on one crate.
pub use pmobouquet::{
    Bouquet, Companion, IcyHeaders, Item, ItemType, Metadata, ParseLog, PlayoutInfo, Service,
    ServiceId, SwapInfo, TracingLog,
};
