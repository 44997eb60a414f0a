//! # Event Dispatcher
//!
//! Routes host button and axis events to the emulation core.
//!
//! Button events are rare and a lost press is visible to the player, so an
//! event from an unknown controller triggers one session refresh before it
//! is given up. Motion events arrive at a high rate and a single lost frame
//! is not noticeable, so they are dropped straight away when the controller
//! is unknown.

use std::sync::Arc;
use tracing::{debug, trace};

use super::device::InputDevice;
use super::session::ControllerSession;
use crate::host::{HostEvent, KeyAction, KeyEvent, MotionEvent};
use crate::model::ButtonState;

/// Forwards host events through a [`ControllerSession`]
#[derive(Debug, Clone)]
pub struct EventDispatcher {
    session: Arc<ControllerSession>,
}

impl EventDispatcher {
    #[must_use]
    pub fn new(session: Arc<ControllerSession>) -> Self {
        Self { session }
    }

    #[must_use]
    pub fn session(&self) -> &Arc<ControllerSession> {
        &self.session
    }

    /// Forwards a button event.
    ///
    /// Returns `false` without calling the sink when the action is neither a
    /// press nor a release, or when the controller is still unknown after
    /// one refresh.
    pub fn on_button(&self, event: &KeyEvent) -> bool {
        let state = match event.action {
            KeyAction::Down => ButtonState::Pressed,
            KeyAction::Up => ButtonState::Released,
            KeyAction::Repeat => return false,
        };

        let device = match self.session.resolve(event.controller_number) {
            Some(device) => device,
            None => {
                debug!(
                    "Button from unknown controller {}, refreshing",
                    event.controller_number
                );
                self.session.refresh();
                match self.session.resolve(event.controller_number) {
                    Some(device) => device,
                    None => {
                        debug!(
                            "Dropping button {} from controller {}: not attached",
                            event.key_code, event.controller_number
                        );
                        return false;
                    }
                }
            }
        };

        self.session
            .sink()
            .on_button_event(device.guid(), device.port(), event.key_code, state);
        true
    }

    /// Forwards every axis of a motion event, in host order.
    ///
    /// Returns `false` when the controller is unknown; no refresh is tried.
    pub fn on_motion(&self, event: &MotionEvent) -> bool {
        let Some(device) = self.session.resolve(event.controller_number) else {
            trace!("Dropping motion from unknown controller {}", event.controller_number);
            return false;
        };

        let sink = self.session.sink();
        for sample in &event.axes {
            sink.on_axis_event(device.guid(), device.port(), sample.axis, sample.value);
        }
        true
    }

    /// Forwards any host event.
    pub fn dispatch(&self, event: &HostEvent) -> bool {
        match event {
            HostEvent::Key(key) => self.on_button(key),
            HostEvent::Motion(motion) => self.on_motion(motion),
        }
    }
}
