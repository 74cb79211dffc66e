//! Integration test utilities for the leave server
//!
//! Boots the real HTTP application on the in-memory backend and drives it
//! over loopback with `reqwest`.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
