//! Mock filesystem implementations for testing.
//!
//! This module provides `MockFs` and pre-built scenarios for testing
//! bridge and namespace enumeration without a Linux host.

mod filesystem;
mod scenarios;

pub use filesystem::{HOST_NETNS, MockDevice, MockFs};
