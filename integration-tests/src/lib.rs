//! Shared fixtures for the integration tests.

use cable_core::{CompartmentId, Context, IonBus, Mechanism};
use cable_mechanisms::calcium::{CalciumGlobals, CalciumPool, CalciumPoolConfig};

/// A typical resting membrane voltage (mV).
pub const RESTING_VOLTAGE: f64 = -65.0;

/// Attaches and initializes a default calcium pool on the given compartment.
pub fn resting_pool(bus: &mut IonBus, compartment: CompartmentId) -> CalciumPool {
    let mut pool = CalciumPool::attach(
        CalciumPoolConfig::default(),
        CalciumGlobals::default(),
        bus,
        compartment,
    )
    .expect("default pool should attach");
    pool.init(Context {
        voltage: RESTING_VOLTAGE,
        bus,
    });
    pool
}

/// Sets the calcium current seen by one compartment (mA/cm²).
pub fn inject_current(bus: &mut IonBus, compartment: CompartmentId, ica: f64) {
    let ca = bus.species("ca").expect("species registered at attach");
    bus.set_current(ca, compartment, ica);
}
