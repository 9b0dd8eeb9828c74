//! Session capabilities and their player-facing derivation
//!
//! A driver maintains the set of abilities its session currently has;
//! [`CapabilitySet::make_player_set`] derives the subset meaningful to an
//! audio player through a fixed, total mapping table.

use std::collections::HashSet;

/// A named ability of the current session/protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    /// The session has a usable audio transport.
    AudioTransport,
    /// The player can render live playback.
    Playback,
    /// The current item can be swapped out mid-stream.
    SwapItem,
    /// The session can switch to another service of the bouquet.
    SwapService,
}

impl Capability {
    /// Player-facing image of this capability.
    ///
    /// The mapping is total: every capability has a defined image, and only
    /// `AudioTransport` expands (an audio transport implies live playback).
    fn player_image(&self) -> &'static [Capability] {
        match self {
            Capability::AudioTransport => &[Capability::AudioTransport, Capability::Playback],
            Capability::Playback => &[Capability::Playback],
            Capability::SwapItem => &[Capability::SwapItem],
            Capability::SwapService => &[Capability::SwapService],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::AudioTransport => "audio-transport",
            Capability::Playback => "playback",
            Capability::SwapItem => "swap-item",
            Capability::SwapService => "swap-service",
        }
    }
}

/// Set of capabilities, mutated only by the owning driver.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CapabilitySet {
    inner: HashSet<Capability>,
}

impl CapabilitySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a capability; returns false when it was already present.
    pub fn add(&mut self, capability: Capability) -> bool {
        self.inner.insert(capability)
    }

    /// Remove a capability; returns true when it was present.
    pub fn remove(&mut self, capability: Capability) -> bool {
        self.inner.remove(&capability)
    }

    pub fn contains(&self, capability: Capability) -> bool {
        self.inner.contains(&capability)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Capability> {
        self.inner.iter()
    }

    /// Derive the player-facing set.
    ///
    /// Applies [`Capability::player_image`] to each member and unions the
    /// results; duplicates collapse. The returned set is independent of the
    /// source set.
    pub fn make_player_set(&self) -> CapabilitySet {
        let mut derived = CapabilitySet::new();
        for capability in &self.inner {
            for mapped in capability.player_image() {
                derived.add(*mapped);
            }
        }
        derived
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}
