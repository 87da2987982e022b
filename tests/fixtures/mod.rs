//! Test fixtures for daytrip-planner.
//!
//! Provides realistic test data including:
//! - Real Marrakech locations (from OpenStreetMap)
//! - Helpers turning locations into planner places

pub mod marrakech_locations;

pub use marrakech_locations::*;
