//! Shared-line switch adapter.
//!
//! Implements [`BusControlPort`] over the hw_init pin-mux helpers.  The
//! transitions are unconditional register writes; the bus arbiter owns the
//! calling discipline.

use crate::app::ports::BusControlPort;
use crate::drivers::hw_init;

pub struct SharedBusSwitch;

impl SharedBusSwitch {
    /// Construct with the line released to the probe (the boot state).
    pub fn new() -> Self {
        hw_init::bus_route_shared_to_onewire();
        Self
    }
}

impl BusControlPort for SharedBusSwitch {
    fn grant_storage(&mut self) {
        hw_init::bus_route_shared_to_spi();
    }

    fn grant_probe(&mut self) {
        hw_init::bus_route_shared_to_onewire();
    }
}
