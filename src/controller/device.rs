//! # Controller Devices
//!
//! The controllers the bridge registers with the emulation core: physical
//! host controllers and the virtual on-screen overlay.

use crate::host::HostDevice;
use crate::sink::ControllerRegistration;

/// Default reserved port of the on-screen overlay
pub const DEFAULT_OVERLAY_PORT: u32 = 100;

/// Hardware identity reported for the on-screen overlay
pub const OVERLAY_GUID: &str = "00000000000000000000000000000000";

/// Display name of the on-screen overlay
pub const OVERLAY_NAME: &str = "Touch Overlay";

/// A controller that can be registered on a port
pub trait InputDevice {
    fn guid(&self) -> &str;
    fn port(&self) -> u32;
    fn supports_vibration(&self) -> bool;
    fn name(&self) -> &str;

    fn registration(&self) -> ControllerRegistration {
        ControllerRegistration {
            guid: self.guid().to_string(),
            port: self.port(),
            vibration: self.supports_vibration(),
            name: self.name().to_string(),
        }
    }
}

/// Hardware identity derived from product and vendor ids.
///
/// # Examples
///
/// ```
/// use controller_bridge::controller::device::hardware_guid;
///
/// assert_eq!(
///     hardware_guid(0x054c, 0x0ce6),
///     "0000000000000ce6000000000000054c"
/// );
/// ```
#[must_use]
pub fn hardware_guid(vendor_id: u16, product_id: u16) -> String {
    format!("{:016x}{:016x}", product_id, vendor_id)
}

/// One host controller bound to a port
///
/// Built by the device registry during enumeration and never modified
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhysicalDevice {
    guid: String,
    port: u32,
    vibration: bool,
    controller_number: i32,
    name: String,
}

impl PhysicalDevice {
    pub(crate) fn new(host: &HostDevice, port: u32, vibration: bool) -> Self {
        Self {
            guid: hardware_guid(host.vendor_id, host.product_id),
            port,
            vibration,
            controller_number: host.controller_number,
            name: host.name.clone(),
        }
    }

    /// Host controller number this device was built from.
    #[must_use]
    pub fn controller_number(&self) -> i32 {
        self.controller_number
    }
}

impl InputDevice for PhysicalDevice {
    fn guid(&self) -> &str {
        &self.guid
    }

    fn port(&self) -> u32 {
        self.port
    }

    fn supports_vibration(&self) -> bool {
        self.vibration
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// On-screen touch controls, registered on a reserved port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayDevice {
    port: u32,
    vibration: bool,
}

impl OverlayDevice {
    #[must_use]
    pub fn new(vibration: bool, port: u32) -> Self {
        Self { port, vibration }
    }
}

impl InputDevice for OverlayDevice {
    fn guid(&self) -> &str {
        OVERLAY_GUID
    }

    fn port(&self) -> u32 {
        self.port
    }

    fn supports_vibration(&self) -> bool {
        self.vibration
    }

    fn name(&self) -> &str {
        OVERLAY_NAME
    }
}
