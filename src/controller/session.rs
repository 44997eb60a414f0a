//! # Controller Session
//!
//! Holds which host controller sits on which port and keeps the emulation
//! core's registrations in step with it.
//!
//! ## Refresh
//!
//! A refresh runs these steps in order:
//!
//! 1. Enumerate host controllers through the [`DeviceRegistry`]
//! 2. Replace the controller-number -> device mapping as a whole
//! 3. Register every physical device with the sink, in port order
//! 4. Register the touch overlay on its reserved port; it vibrates only when
//!    no physical controller was found
//! 5. Re-read the sink's registered controllers, sorted by port
//!
//! The mapping is swapped behind an `Arc`, so a concurrent [`resolve`]
//! either sees the previous mapping or the new one, never a partial rebuild.
//! Refreshes themselves are serialized.
//!
//! [`resolve`]: ControllerSession::resolve

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::{debug, info};

use super::device::{InputDevice, OverlayDevice, PhysicalDevice};
use super::registry::{DeviceRegistry, VibrationSettings};
use crate::host::HostInput;
use crate::param_package::ParamPackage;
use crate::sink::NativeSink;

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No refresh has run yet; every lookup misses
    Uninitialized,
    /// At least one refresh completed
    Synced,
}

/// Current port assignment and the sink's view of it
pub struct ControllerSession {
    host: Arc<dyn HostInput>,
    sink: Arc<dyn NativeSink>,
    vibration: Arc<dyn VibrationSettings>,
    registry: DeviceRegistry,
    overlay_port: u32,
    devices: RwLock<Arc<HashMap<i32, PhysicalDevice>>>,
    registered: RwLock<Vec<ParamPackage>>,
    refresh_lock: Mutex<()>,
    synced: AtomicBool,
}

impl std::fmt::Debug for ControllerSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerSession")
            .field("overlay_port", &self.overlay_port)
            .field("state", &self.state())
            .field("devices", &self.devices())
            .finish_non_exhaustive()
    }
}

impl ControllerSession {
    /// Creates an uninitialized session.
    ///
    /// # Arguments
    ///
    /// * `host` - Source of the host device list
    /// * `sink` - Emulation core receiving registrations and events
    /// * `vibration` - Per-port vibration settings, read on every refresh
    /// * `overlay_port` - Reserved port of the touch overlay; physical
    ///   controllers are assigned ports below it
    pub fn new(
        host: Arc<dyn HostInput>,
        sink: Arc<dyn NativeSink>,
        vibration: Arc<dyn VibrationSettings>,
        overlay_port: u32,
    ) -> Self {
        Self {
            host,
            sink,
            vibration,
            registry: DeviceRegistry::new(overlay_port),
            overlay_port,
            devices: RwLock::new(Arc::new(HashMap::new())),
            registered: RwLock::new(Vec::new()),
            refresh_lock: Mutex::new(()),
            synced: AtomicBool::new(false),
        }
    }

    /// Re-enumerates host controllers and re-registers everything with the sink.
    ///
    /// Returns the number of physical controllers found.
    pub fn refresh(&self) -> usize {
        let _guard = self.refresh_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let enumerated = self.registry.enumerate(self.host.as_ref(), self.vibration.as_ref());
        let count = enumerated.len();
        let mapping: HashMap<i32, PhysicalDevice> = enumerated
            .iter()
            .map(|device| (device.controller_number(), device.clone()))
            .collect();
        *self.devices.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(mapping);

        // Enumeration order is port order
        for device in &enumerated {
            self.sink.register_controller(&device.registration());
        }

        let overlay = OverlayDevice::new(enumerated.is_empty(), self.overlay_port);
        self.sink.register_controller(&overlay.registration());

        let mut registered = self.sink.registered_controllers();
        registered.sort_by_key(|params| params.get_int("port", 0));
        debug!(
            "Sink reports {} controllers: {:?}",
            registered.len(),
            registered.iter().map(ParamPackage::serialize).collect::<Vec<_>>()
        );
        *self.registered.write().unwrap_or_else(PoisonError::into_inner) = registered;

        self.synced.store(true, Ordering::Release);
        info!(
            "Controller refresh: {} physical controller(s), overlay on port {} (vibration: {})",
            count,
            self.overlay_port,
            overlay.supports_vibration()
        );

        count
    }

    /// Looks up the device for a host controller number.
    ///
    /// Never refreshes; a miss only means the current mapping does not know
    /// the controller.
    #[must_use]
    pub fn resolve(&self, controller_number: i32) -> Option<PhysicalDevice> {
        self.snapshot().get(&controller_number).cloned()
    }

    /// All physical devices of the current mapping, ordered by port.
    #[must_use]
    pub fn devices(&self) -> Vec<PhysicalDevice> {
        let mut devices: Vec<_> = self.snapshot().values().cloned().collect();
        devices.sort_by_key(|device| device.port());
        devices
    }

    /// Controllers the sink reported after the last refresh, sorted by port.
    #[must_use]
    pub fn registered_controllers(&self) -> Vec<ParamPackage> {
        self.registered
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        if self.synced.load(Ordering::Acquire) {
            SessionState::Synced
        } else {
            SessionState::Uninitialized
        }
    }

    #[must_use]
    pub fn overlay_port(&self) -> u32 {
        self.overlay_port
    }

    pub(crate) fn sink(&self) -> &dyn NativeSink {
        self.sink.as_ref()
    }

    fn snapshot(&self) -> Arc<HashMap<i32, PhysicalDevice>> {
        Arc::clone(&self.devices.read().unwrap_or_else(PoisonError::into_inner))
    }
}
