//! # Controller Module
//!
//! Port assignment and event routing for host game controllers.
//!
//! This module handles:
//! - Building ported physical devices from the host device list
//! - Keeping the emulation core's controller registrations in step with it
//! - Routing host button and axis events to the right port

pub mod device;
pub mod dispatcher;
pub mod registry;
pub mod session;

pub use device::{InputDevice, OverlayDevice, PhysicalDevice};
pub use dispatcher::EventDispatcher;
pub use registry::{DeviceRegistry, VibrationSettings};
pub use session::{ControllerSession, SessionState};
