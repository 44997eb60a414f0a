//! # Controller Bridge Library
//!
//! Routes host game controllers to an emulation core's controller ports.
//!
//! This library discovers physical controllers, assigns each a stable port,
//! registers them (plus the on-screen touch overlay) with the core and
//! forwards their button and axis events.

pub mod config;
pub mod error;
pub mod controller;
pub mod host;
pub mod model;
pub mod param_package;
pub mod sink;
