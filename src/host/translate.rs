//! # Event Translation Module
//!
//! Turns the raw evdev stream of one device into [`HostEvent`]s.
//!
//! ## Event Types
//!
//! - **EV_KEY**: one [`KeyEvent`] per event. Value `0` is a release, `1` a
//!   press and `2` an autorepeat.
//! - **EV_ABS**: updates the device's axis frame. Nothing is emitted yet.
//! - **EV_SYN / SYN_REPORT**: closes the frame. When at least one axis
//!   changed since the previous report, a single [`MotionEvent`] carrying
//!   every axis of the device (in device order) is emitted.
//!
//! ## Usage
//!
//! ```no_run
//! use controller_bridge::host::evdev::EvdevHost;
//! use controller_bridge::host::translate::EventTranslator;
//! use controller_bridge::host::HostInput;
//!
//! let host = EvdevHost::new("/dev/input");
//! let device = host.devices().into_iter().next().expect("no device");
//! let mut translator = EventTranslator::new(&device);
//! # let raw: Vec<evdev::InputEvent> = Vec::new();
//! for event in &raw {
//!     if let Some(host_event) = translator.translate(event) {
//!         println!("{:?}", host_event);
//!     }
//! }
//! ```

use evdev::{EventType, InputEvent};

use super::{AxisRange, AxisSample, HostDevice, HostEvent, KeyAction, KeyEvent, MotionEvent};

/// evdev `SYN_REPORT` code
const SYN_REPORT: u16 = 0;

/// Translates raw events of a single device.
///
/// Not thread-safe; one translator per device reader.
#[derive(Debug)]
pub struct EventTranslator {
    controller_number: i32,
    axes: Vec<AxisRange>,
    values: Vec<i32>,
    dirty: bool,
}

impl EventTranslator {
    /// Creates a translator seeded with the device's last known axis readings.
    #[must_use]
    pub fn new(device: &HostDevice) -> Self {
        let values = device.axes.iter().map(|range| range.value).collect();

        Self {
            controller_number: device.controller_number,
            axes: device.axes.clone(),
            values,
            dirty: false,
        }
    }

    /// Processes one raw event, returning a host event when one is complete.
    pub fn translate(&mut self, event: &InputEvent) -> Option<HostEvent> {
        match event.event_type() {
            EventType::KEY => Some(HostEvent::Key(KeyEvent {
                controller_number: self.controller_number,
                key_code: i32::from(event.code()),
                action: key_action(event.value()),
            })),
            EventType::ABSOLUTE => {
                self.update_axis(i32::from(event.code()), event.value());
                None
            }
            EventType::SYNCHRONIZATION if event.code() == SYN_REPORT && self.dirty => {
                self.dirty = false;
                Some(HostEvent::Motion(self.motion_event()))
            }
            _ => {
                // Ignore misc, force-feedback and other event types
                None
            }
        }
    }

    fn update_axis(&mut self, axis: i32, value: i32) {
        if let Some(index) = self.axes.iter().position(|range| range.axis == axis) {
            if self.values[index] != value {
                self.values[index] = value;
                self.dirty = true;
            }
        }
    }

    fn motion_event(&self) -> MotionEvent {
        MotionEvent {
            controller_number: self.controller_number,
            axes: self
                .axes
                .iter()
                .zip(&self.values)
                .map(|(range, &raw)| AxisSample {
                    axis: range.axis,
                    value: range.normalize(raw),
                })
                .collect(),
        }
    }
}

fn key_action(value: i32) -> KeyAction {
    match value {
        0 => KeyAction::Up,
        1 => KeyAction::Down,
        _ => KeyAction::Repeat,
    }
}
