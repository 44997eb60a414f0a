//! In-process stand-in for the emulation core's controller state.

use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock};
use tracing::{debug, info, trace};

use super::{ControllerRegistration, NativeSink};
use crate::model::ButtonState;
use crate::param_package::ParamPackage;

/// Engine name reported in every registered controller's parameters
pub const ENGINE_NAME: &str = "host";

#[derive(Debug, Clone)]
struct PortRecord {
    registration: ControllerRegistration,
    buttons: HashMap<i32, ButtonState>,
    axes: HashMap<i32, f32>,
}

/// Thread-safe sink keeping one controller record per port
///
/// Registration upserts by port. Button and axis state is kept per port and
/// survives re-registration of the same controller.
#[derive(Debug, Default)]
pub struct InMemorySink {
    ports: RwLock<BTreeMap<u32, PortRecord>>,
}

impl InMemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Last known state of `key_code` on `port`.
    #[must_use]
    pub fn button_state(&self, port: u32, key_code: i32) -> Option<ButtonState> {
        let ports = self.ports.read().unwrap_or_else(PoisonError::into_inner);
        ports.get(&port)?.buttons.get(&key_code).copied()
    }

    /// Last known value of `axis` on `port`.
    #[must_use]
    pub fn axis_value(&self, port: u32, axis: i32) -> Option<f32> {
        let ports = self.ports.read().unwrap_or_else(PoisonError::into_inner);
        ports.get(&port)?.axes.get(&axis).copied()
    }

    /// Registration currently held for `port`.
    #[must_use]
    pub fn registration(&self, port: u32) -> Option<ControllerRegistration> {
        let ports = self.ports.read().unwrap_or_else(PoisonError::into_inner);
        ports.get(&port).map(|record| record.registration.clone())
    }

    /// Applies `update` to the record on `port` if it belongs to `guid`.
    fn with_port(&self, guid: &str, port: u32, update: impl FnOnce(&mut PortRecord)) {
        let mut ports = self.ports.write().unwrap_or_else(PoisonError::into_inner);
        match ports.get_mut(&port) {
            Some(record) if record.registration.guid == guid => update(record),
            _ => debug!("Dropping event for unregistered controller {} on port {}", guid, port),
        }
    }
}

impl NativeSink for InMemorySink {
    fn register_controller(&self, registration: &ControllerRegistration) {
        let mut ports = self.ports.write().unwrap_or_else(PoisonError::into_inner);
        match ports.get_mut(&registration.port) {
            Some(record) if record.registration.guid == registration.guid => {
                record.registration = registration.clone();
            }
            _ => {
                info!(
                    "Registered \"{}\" ({}) on port {} (vibration: {})",
                    registration.name, registration.guid, registration.port, registration.vibration
                );
                ports.insert(
                    registration.port,
                    PortRecord {
                        registration: registration.clone(),
                        buttons: HashMap::new(),
                        axes: HashMap::new(),
                    },
                );
            }
        }
    }

    fn registered_controllers(&self) -> Vec<ParamPackage> {
        let ports = self.ports.read().unwrap_or_else(PoisonError::into_inner);
        ports
            .values()
            .map(|record| {
                let registration = &record.registration;
                let mut params = ParamPackage::new();
                params.set("engine", ENGINE_NAME);
                params.set("guid", &registration.guid);
                params.set("port", registration.port);
                params.set("vibration", registration.vibration);
                params.set("display", &registration.name);
                params
            })
            .collect()
    }

    fn on_button_event(&self, guid: &str, port: u32, key_code: i32, state: ButtonState) {
        trace!("Button {} on port {}: {:?}", key_code, port, state);
        self.with_port(guid, port, |record| {
            record.buttons.insert(key_code, state);
        });
    }

    fn on_axis_event(&self, guid: &str, port: u32, axis: i32, value: f32) {
        trace!("Axis {} on port {}: {:.3}", axis, port, value);
        self.with_port(guid, port, |record| {
            record.axes.insert(axis, value);
        });
    }
}
