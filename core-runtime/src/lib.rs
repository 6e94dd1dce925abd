//! # Core Runtime Module
//!
//! Provides the runtime infrastructure the sign-in bridge is built on:
//! - Logging and tracing infrastructure
//! - Provider descriptor and bridge configuration
//! - Host intent port and notification bus
//! - Detached task spawning for native and wasm hosts
//!
//! ## Overview
//!
//! Nothing in this crate knows how authentication works. It establishes the
//! message boundary between the host application and the bridge, the logging
//! conventions, and the fail-fast configuration checks that `core-auth` and
//! `core-service` rely on.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod task;

pub use error::{Error, Result};
