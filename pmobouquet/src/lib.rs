//! Data model for the PMOYbrid streaming control library
//!
//! This crate holds the value types shared by every protocol driver:
//! services and bouquets, item/companion metadata with its JSON boundary,
//! icy header parsing, and the descriptive playout snapshots. It contains no
//! HTTP plumbing and no threads; the control engine lives in `pmoybrid`.

pub mod bouquet;
pub mod error;
pub mod icy;
pub mod item;
pub mod metadata;
pub mod playout;
pub mod service;

pub use bouquet::Bouquet;
pub use error::{Error, Result};
pub use icy::IcyHeaders;
pub use item::{Companion, Item, ItemType, ParseLog, TracingLog};
pub use metadata::Metadata;
pub use playout::{PlayoutInfo, SwapInfo};
pub use service::{Service, ServiceId};
