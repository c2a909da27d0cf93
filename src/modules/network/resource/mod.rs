//! Resource module engine
//!
//! Resource modules manage one kind of device configuration object (the
//! hostname, interfaces, VLANs, ACLs, ...) declaratively. Every resource is
//! described by two pieces of static data:
//!
//! - a [`NetworkTemplate`]: an ordered catalog of [`ParserTemplate`]s, each
//!   pairing a line regex and a result template (CLI text to facts) with a
//!   command template (facts back to CLI text);
//! - a [`Layout`]: the strategy table telling the [`Reconciler`] how to walk
//!   the structured record (scalar fields, boolean toggles, nested groups and
//!   keyed lists) and which parser renders an object's header or removes it
//!   whole.
//!
//! The engine turns running-configuration text into validated facts, and a
//! declared `want` plus a [`ResourceState`] into the ordered command list
//! that moves the device from `have` to `want`.
//!
//! ```text
//!  running-config ──► NetworkTemplate::parse ──► facts (have)
//!                                                    │
//!  config (want) + state ──────────────────► Reconciler::reconcile
//!                                                    │
//!                          NetworkTemplate::render ◄─┘
//!                                                    │
//!                                                    ▼
//!                                             ordered commands
//! ```

pub mod compare;
pub mod facts;
pub mod module;
pub mod parser;
pub mod renderer;
pub mod state;
pub mod template;
pub mod utils;

pub use compare::{Entry, Field, Layout, Reconciler};
pub use facts::{populate_facts, to_keyed, to_listed, validate_config};
pub use module::{ResourceModule, ResourceParams};
pub use parser::{CommandTemplate, NetworkTemplate, ParserTemplate, RenderFn};
pub use renderer::{Prefix, Rendered};
pub use state::ResourceState;
pub use template::Template;

use serde::de::DeserializeOwned;
use thiserror::Error;
use validator::Validate;

/// Errors raised by the template engine.
///
/// Syntax, pattern and duplicate-name errors are authoring mistakes caught
/// when a catalog is compiled. [`TemplateError::UnknownParser`] is raised
/// when a caller asks to render a parser the catalog does not contain.
/// References to undefined variables are never errors.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Template syntax error in '{template}': {message}")]
    Syntax { template: String, message: String },

    #[error("Invalid pattern for parser '{parser}': {source}")]
    InvalidPattern {
        parser: String,
        #[source]
        source: regex::Error,
    },

    #[error("Duplicate parser name '{0}'")]
    DuplicateParser(String),

    #[error("Unknown parser '{0}'")]
    UnknownParser(String),
}

/// A device resource managed through the engine.
///
/// Implementations are zero-sized markers wiring a static catalog and
/// layout to a typed configuration schema.
pub trait Resource: Send + Sync + 'static {
    /// Module name as exposed to playbooks (e.g. `ios_vlans`)
    const MODULE: &'static str;

    /// One-line description of the module
    const DESCRIPTION: &'static str;

    /// Command used to fetch the relevant slice of the running configuration
    const GATHER_COMMAND: &'static str;

    /// Declared schema of one configuration object
    type Config: DeserializeOwned + Validate;

    /// Parser/renderer catalog for this resource
    fn template() -> &'static NetworkTemplate;

    /// Reconciliation strategy table for this resource
    fn layout() -> &'static Layout;
}
