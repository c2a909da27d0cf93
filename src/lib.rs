//! # Rustible IOS - Declarative resource modules for Cisco IOS
//!
//! Rustible IOS manages Cisco IOS configuration through *resource modules*.
//! Each module owns one kind of configuration object (the hostname,
//! interfaces, VLANs, VRFs, BFD templates, access lists) and converges a
//! device to a declared state by emitting only the commands that differ.
//!
//! ## Core Concepts
//!
//! - **Facts** (`have`): structured data parsed from running-config text
//! - **Config** (`want`): structured data declared by the operator
//! - **State**: how `want` applies to `have` (`merged`, `replaced`,
//!   `overridden`, `deleted`, `purged`) or a read-only mode (`gathered`,
//!   `rendered`, `parsed`)
//! - **Templates**: per-resource catalogs of line regexes and command
//!   templates shared by parsing and rendering
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                           CLI Interface                              │
//! │              (clap: list / parse / render / gather / diff)           │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                    │
//!                                    ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Module Registry (ios_* modules)                   │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                    │
//!          ┌─────────────────────────┼─────────────────────────┐
//!          ▼                         ▼                         ▼
//! ┌─────────────────┐   ┌─────────────────────┐   ┌─────────────────────┐
//! │  Parser Engine  │   │     Reconciler      │   │   Renderer Engine   │
//! │  (regex +       │   │   (want vs have,    │   │   (minijinja        │
//! │   result tmpl)  │   │    per state)       │   │    command tmpl)    │
//! └─────────────────┘   └─────────────────────┘   └─────────────────────┘
//!                                    │
//!                                    ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      NetworkDevice (get/edit)                        │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use rustible_ios::prelude::*;
//! use std::sync::Arc;
//!
//! let device = Arc::new(StaticDevice::new("hostname old\n"));
//! let registry = ModuleRegistry::with_builtins();
//! let params: ModuleParams = serde_json::from_value(serde_json::json!({
//!     "config": {"hostname": "new"},
//!     "state": "merged"
//! }))?;
//!
//! let context = ModuleContext::new().with_device(device).with_check_mode(true);
//! let output = registry.execute("ios_hostname", &params, &context)?;
//! assert_eq!(output.data["commands"], serde_json::json!(["hostname new"]));
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

// Re-export commonly used items in prelude
pub mod prelude {
    //! Convenient re-exports of commonly used types and traits.

    // Error handling
    pub use crate::error::{Error, Result};

    // Configuration
    pub use crate::config::Config;

    // Module system
    pub use crate::modules::{
        Module, ModuleContext, ModuleError, ModuleOutput, ModuleParams, ModuleRegistry,
        ModuleResult,
    };

    // Devices
    pub use crate::modules::network::common::{NetworkDevice, NetworkPlatform, StaticDevice};

    // Resource engine
    pub use crate::modules::network::resource::{
        populate_facts, Layout, NetworkTemplate, ParserTemplate, Prefix, Reconciler, Resource,
        ResourceModule, ResourceState,
    };
}

// ============================================================================
// Core Modules
// ============================================================================

/// Error types and result aliases for the command-line layer.
pub mod error;

/// Layered configuration (files, environment).
pub mod config;

// ============================================================================
// Modules
// ============================================================================

/// Module system and the Cisco IOS resource modules.
///
/// Every resource is exposed as a [`Module`](modules::Module) and registered
/// in [`ModuleRegistry::with_builtins`](modules::ModuleRegistry::with_builtins).
pub mod modules;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
