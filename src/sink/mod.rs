//! # Native Sink Module
//!
//! The emulation core's side of the bridge. The core owns the per-port
//! controller state; the bridge only registers controllers and forwards
//! events to it.

pub mod memory;

use crate::model::ButtonState;
use crate::param_package::ParamPackage;

pub use memory::InMemorySink;

/// Everything the core needs to know to register a controller on a port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerRegistration {
    pub guid: String,
    pub port: u32,
    pub vibration: bool,
    pub name: String,
}

/// Calls the bridge makes into the emulation core
///
/// Implementations synchronize internally; every call is fire-and-forget
/// from the bridge's point of view.
#[cfg_attr(test, mockall::automock)]
pub trait NativeSink: Send + Sync {
    /// Registers a controller. Registering an already-known controller
    /// updates its record instead of adding a second one.
    fn register_controller(&self, registration: &ControllerRegistration);

    /// Controllers the core currently considers active.
    fn registered_controllers(&self) -> Vec<ParamPackage>;

    fn on_button_event(&self, guid: &str, port: u32, key_code: i32, state: ButtonState);

    fn on_axis_event(&self, guid: &str, port: u32, axis: i32, value: f32);
}
