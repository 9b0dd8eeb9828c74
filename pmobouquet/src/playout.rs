//! Playout descriptors: swap budget and timing reported by the server

use std::time::Duration;

/// Item-swap situation of a session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SwapInfo {
    /// Remaining swaps; negative means unlimited.
    pub swaps_left: i32,
    /// True when the next swap will return to the main program.
    pub next_swap_returns_to_main: bool,
}

impl SwapInfo {
    pub fn new(swaps_left: i32, next_swap_returns_to_main: bool) -> Self {
        Self {
            swaps_left,
            next_swap_returns_to_main,
        }
    }

    /// Whether at least one more swap is possible.
    pub fn can_swap(&self) -> bool {
        self.swaps_left != 0
    }
}

/// Descriptive playout snapshot, refreshed by the driver.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlayoutInfo {
    swap_info: SwapInfo,
    time_to_next_item: Option<Duration>,
}

impl PlayoutInfo {
    pub fn new(swap_info: SwapInfo, time_to_next_item: Option<Duration>) -> Self {
        Self {
            swap_info,
            time_to_next_item,
        }
    }

    pub fn swap_info(&self) -> &SwapInfo {
        &self.swap_info
    }

    pub fn time_to_next_item(&self) -> Option<Duration> {
        self.time_to_next_item
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swap_budget() {
        assert!(!SwapInfo::new(0, false).can_swap());
        assert!(SwapInfo::new(2, true).can_swap());
        assert!(SwapInfo::new(-1, false).can_swap()); // unlimited
    }

    #[test]
    fn default_playout_is_inert() {
        let playout = PlayoutInfo::default();
        assert!(!playout.swap_info().can_swap());
        assert_eq!(playout.time_to_next_item(), None);
    }
}
