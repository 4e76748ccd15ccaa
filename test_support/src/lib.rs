//! Test utilities shared by the integration tests.
//!
//! Provides manifest fixtures written into temporary project trees and
//! helpers for asserting on error chains.

pub mod error;
pub mod manifest;

pub use error::display_error_chain;
pub use manifest::{manifest_yaml, write_manifest};
