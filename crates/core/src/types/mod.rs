//! Core types for order reminders.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod status;
pub mod window;

pub use id::*;
pub use status::*;
pub use window::ReminderWindow;
