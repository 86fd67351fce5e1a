//! Order Reminders Core - Shared types library.
//!
//! This crate provides common types used across all order reminder components:
//! - `notifier` - Window classification, order selection and push delivery engine
//! - `cli` - Command-line entry point for scheduled runs and migrations
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, statuses and reminder windows

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
