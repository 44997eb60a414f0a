//! # Host Input Module
//!
//! The host side of the bridge: what the operating system reports about
//! attached input devices and the events they deliver.
//!
//! This module handles:
//! - Describing host devices (source capabilities, controller grouping, axes)
//! - The [`HostInput`] seam used for device enumeration
//! - Linux evdev enumeration ([`evdev`]) and raw event translation ([`translate`])

pub mod evdev;
pub mod translate;

use std::ops::BitOr;
use std::sync::{PoisonError, RwLock};

/// Capability bitmask of a host input device.
///
/// A device has a source when all of that source's bits are set, so
/// sources sharing a class bit (button-like sources) are still told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct InputSources(u32);

impl InputSources {
    pub const NONE: Self = Self(0);
    /// Keys and buttons of a keyboard.
    pub const KEYBOARD: Self = Self(0x0000_0101);
    /// Gamepad face/shoulder buttons.
    pub const GAMEPAD: Self = Self(0x0000_0401);
    /// Absolute stick axes.
    pub const JOYSTICK: Self = Self(0x0100_0010);

    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// True when the device has gamepad buttons, control sticks, or both.
    #[must_use]
    pub const fn is_game_controller(self) -> bool {
        self.contains(Self::GAMEPAD) || self.contains(Self::JOYSTICK)
    }
}

impl BitOr for InputSources {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Reported range of one absolute axis, with its reading at enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisRange {
    pub axis: i32,
    pub minimum: i32,
    pub maximum: i32,
    /// Raw reading when the device was described
    pub value: i32,
}

impl AxisRange {
    /// Creates a range whose reading sits at the middle of the range.
    #[must_use]
    pub fn new(axis: i32, minimum: i32, maximum: i32) -> Self {
        let middle = (i64::from(minimum) + i64::from(maximum)) / 2;
        Self {
            axis,
            minimum,
            maximum,
            value: middle as i32,
        }
    }

    /// Replaces the current raw reading.
    #[must_use]
    pub fn with_value(self, value: i32) -> Self {
        Self { value, ..self }
    }

    /// Maps a raw reading linearly from `[minimum, maximum]` to `[-1.0, 1.0]`.
    ///
    /// Out-of-range readings are clamped; a degenerate range yields `0.0`.
    ///
    /// # Examples
    ///
    /// ```
    /// use controller_bridge::host::AxisRange;
    ///
    /// let stick = AxisRange::new(0, 0, 255);
    /// assert_eq!(stick.normalize(0), -1.0);
    /// assert_eq!(stick.normalize(255), 1.0);
    ///
    /// let hat = AxisRange::new(16, -1, 1);
    /// assert_eq!(hat.normalize(-1), -1.0);
    /// assert_eq!(hat.normalize(0), 0.0);
    /// ```
    #[must_use]
    pub fn normalize(&self, raw: i32) -> f32 {
        if self.maximum <= self.minimum {
            return 0.0;
        }
        let span = (self.maximum as f64) - (self.minimum as f64);
        let offset = (raw.clamp(self.minimum, self.maximum) as f64) - (self.minimum as f64);
        (offset * 2.0 / span - 1.0) as f32
    }
}

/// One input device as reported by the host
#[derive(Debug, Clone, PartialEq)]
pub struct HostDevice {
    /// Host device identifier
    pub id: i32,
    pub name: String,
    pub sources: InputSources,
    /// Groups the sub-devices of one physical controller; 0 when the device
    /// is not a controller
    pub controller_number: i32,
    pub vendor_id: u16,
    pub product_id: u16,
    /// Motion axes in host order
    pub axes: Vec<AxisRange>,
}

/// Key action reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Down,
    Up,
    /// Autorepeat or any other non-edge action
    Repeat,
}

/// A button event delivered by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub controller_number: i32,
    pub key_code: i32,
    pub action: KeyAction,
}

/// Current value of one axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisSample {
    pub axis: i32,
    pub value: f32,
}

/// A motion event: the current value of every axis the device reports
#[derive(Debug, Clone, PartialEq)]
pub struct MotionEvent {
    pub controller_number: i32,
    pub axes: Vec<AxisSample>,
}

/// Any event delivered by the host
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    Key(KeyEvent),
    Motion(MotionEvent),
}

/// Host device enumeration
#[cfg_attr(test, mockall::automock)]
pub trait HostInput: Send + Sync {
    /// Lists attached devices in host order, as of the time of the call.
    fn devices(&self) -> Vec<HostDevice>;
}

/// Host backed by a device list held in memory
///
/// Useful for embedding the bridge where the platform pushes its device list
/// (and for tests). The list can be swapped at any time to simulate hot-plug.
#[derive(Debug, Default)]
pub struct StaticHost {
    devices: RwLock<Vec<HostDevice>>,
}

impl StaticHost {
    #[must_use]
    pub fn new(devices: Vec<HostDevice>) -> Self {
        Self {
            devices: RwLock::new(devices),
        }
    }

    /// Replaces the attached device list.
    pub fn set_devices(&self, devices: Vec<HostDevice>) {
        *self.devices.write().unwrap_or_else(PoisonError::into_inner) = devices;
    }
}

impl HostInput for StaticHost {
    fn devices(&self) -> Vec<HostDevice> {
        self.devices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sources_contains_requires_all_bits() {
        let keyboard = InputSources::KEYBOARD;
        assert!(keyboard.contains(InputSources::KEYBOARD));
        // Shares the button class bit with GAMEPAD but is not a gamepad
        assert!(!keyboard.contains(InputSources::GAMEPAD));
        assert!(!keyboard.is_game_controller());
    }

    #[test]
    fn test_sources_game_controller() {
        assert!(InputSources::GAMEPAD.is_game_controller());
        assert!(InputSources::JOYSTICK.is_game_controller());
        assert!((InputSources::KEYBOARD | InputSources::JOYSTICK).is_game_controller());
        assert!(!InputSources::NONE.is_game_controller());
        assert_eq!(InputSources::from_bits(0x401).bits(), 0x401);
    }

    #[test]
    fn test_axis_normalize_full_range() {
        let axis = AxisRange::new(0, 0, 255);
        assert_eq!(axis.normalize(0), -1.0);
        assert_eq!(axis.normalize(255), 1.0);
        assert!((axis.normalize(128)).abs() < 0.01);
    }

    #[test]
    fn test_axis_normalize_signed_range() {
        let axis = AxisRange::new(0, -32768, 32767);
        assert_eq!(axis.normalize(-32768), -1.0);
        assert_eq!(axis.normalize(32767), 1.0);
    }

    #[test]
    fn test_axis_normalize_clamps_and_degenerate() {
        let axis = AxisRange::new(0, 0, 100);
        assert_eq!(axis.normalize(500), 1.0);
        assert_eq!(axis.normalize(-20), -1.0);

        let flat = AxisRange::new(0, 5, 5);
        assert_eq!(flat.normalize(5), 0.0);
    }

    #[test]
    fn test_axis_middle_of_full_i32_range() {
        let axis = AxisRange::new(0, i32::MIN, i32::MAX);
        assert_eq!(axis.value, 0);
        assert!(axis.normalize(axis.value).abs() < 0.01);

        let trigger = AxisRange::new(2, 0, 255).with_value(0);
        assert_eq!(trigger.value, 0);
        assert_eq!(trigger.normalize(trigger.value), -1.0);
    }

    #[test]
    fn test_static_host_swaps_devices() {
        let host = StaticHost::new(vec![fixtures::gamepad(3, 1)]);
        assert_eq!(host.devices().len(), 1);

        host.set_devices(vec![fixtures::keyboard(1), fixtures::gamepad(4, 2)]);
        let devices = host.devices();
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[1].controller_number, 2);
    }
}
