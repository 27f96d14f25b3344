//! Shared-bus arbiter.
//!
//! The SD card's SPI MISO and the DS18B20's 1-Wire data line share one
//! physical pin, so exactly one of the two peripherals may be electrically
//! active at any instant.  `BusArbiter` owns that exclusivity as a
//! two-state machine and pushes the actual line handover through a
//! [`BusControlPort`].
//!
//! Invariant: ownership rests with the probe (released state) at boot,
//! before every cycle's sensor reads, and after every cycle's last storage
//! operation — the probe must never be starved of the bus.

use crate::app::ports::BusControlPort;

/// Which peripheral currently has electrical control of the shared line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusOwner {
    /// SD SPI mode: CS under SPI control, shared pin muxed to MISO.
    Storage,
    /// Released: CS held high, shared pin open-drain for 1-Wire.
    Probe,
}

/// Mutual-exclusion state machine for the shared MISO/1-Wire line.
pub struct BusArbiter {
    owner: BusOwner,
}

impl BusArbiter {
    /// Starts released — the probe-safe state.
    pub fn new() -> Self {
        Self {
            owner: BusOwner::Probe,
        }
    }

    /// Transition to storage mode.  Must precede any storage open, write,
    /// or existence check.  Idempotent: re-acquiring while already in
    /// storage mode is a no-op, not an error.
    pub fn acquire_for_storage(&mut self, bus: &mut impl BusControlPort) {
        if self.owner == BusOwner::Storage {
            return;
        }
        bus.grant_storage();
        self.owner = BusOwner::Storage;
    }

    /// Transition away from storage mode, making the line safe for the
    /// probe.  Called unconditionally at the end of every cycle, on the
    /// failure path included.  Idempotent.
    pub fn release_for_probe(&mut self, bus: &mut impl BusControlPort) {
        if self.owner == BusOwner::Probe {
            return;
        }
        bus.grant_probe();
        self.owner = BusOwner::Probe;
    }

    pub fn owner(&self) -> BusOwner {
        self.owner
    }

    /// True when the line is in the probe-safe (released) state.
    pub fn is_released(&self) -> bool {
        self.owner == BusOwner::Probe
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct SpyBus {
        grants: Vec<BusOwner>,
    }

    impl BusControlPort for SpyBus {
        fn grant_storage(&mut self) {
            self.grants.push(BusOwner::Storage);
        }
        fn grant_probe(&mut self) {
            self.grants.push(BusOwner::Probe);
        }
    }

    #[test]
    fn starts_released() {
        let arb = BusArbiter::new();
        assert!(arb.is_released());
        assert_eq!(arb.owner(), BusOwner::Probe);
    }

    #[test]
    fn acquire_release_round_trip() {
        let mut arb = BusArbiter::new();
        let mut bus = SpyBus::default();

        arb.acquire_for_storage(&mut bus);
        assert_eq!(arb.owner(), BusOwner::Storage);
        arb.release_for_probe(&mut bus);
        assert!(arb.is_released());

        assert_eq!(bus.grants, vec![BusOwner::Storage, BusOwner::Probe]);
    }

    #[test]
    fn double_acquire_is_single_transition() {
        let mut arb = BusArbiter::new();
        let mut bus = SpyBus::default();

        arb.acquire_for_storage(&mut bus);
        arb.acquire_for_storage(&mut bus);
        assert_eq!(bus.grants.len(), 1, "re-acquisition must be a no-op");
    }

    #[test]
    fn release_without_acquire_is_noop() {
        let mut arb = BusArbiter::new();
        let mut bus = SpyBus::default();

        arb.release_for_probe(&mut bus);
        assert!(bus.grants.is_empty());
        assert!(arb.is_released());
    }
}
