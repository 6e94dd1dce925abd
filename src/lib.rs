//! Workspace umbrella crate.
//!
//! Host applications can depend on `signin-bridge-workspace` and pick a
//! target with the `desktop-shims` or `wasm` feature instead of wiring
//! `core-service` and its bridges individually.

#[cfg(any(feature = "desktop-shims", feature = "wasm"))]
pub use core_service::*;
