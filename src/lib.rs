//! Enderwalk: a small creature that wanders over a host page, hunts the
//! pointer, and carries page elements around.
//!
//! The core is host-agnostic. A host implements [`page::Page`], feeds the
//! [`Controller`] its clock through [`Controller::advance`] once per display
//! frame, and forwards pointer, resize and visibility events.

pub mod character;
pub mod claims;
pub mod config;
pub mod controller;
pub mod geometry;
pub mod page;
pub mod sim;
pub mod systems;
pub mod timers;

pub use config::Tuning;
pub use controller::Controller;
