//! Subcommands module for the rustible-ios CLI
//!
//! This module contains the shared command context and the subcommand
//! implementations.

pub mod resource;

use crate::cli::output::OutputFormatter;
use crate::cli::{Cli, OutputFormat};
use rustible_ios::config::Config;
use rustible_ios::error::{Error, Result};
use rustible_ios::modules::{Module, ModuleContext, ModuleOutput, ModuleParams, ModuleRegistry};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;

/// Common context shared between commands
pub struct CommandContext {
    /// Configuration
    pub config: Config,
    /// Output formatter
    pub output: OutputFormatter,
    /// Resource modules, rendering with the configured prefixes
    pub registry: ModuleRegistry,
}

impl CommandContext {
    /// Create a new command context from CLI arguments
    pub fn new(cli: &Cli, config: Config) -> Self {
        let format = cli
            .format
            .unwrap_or_else(|| OutputFormat::from_config(&config.output.format));
        let use_color = !cli.no_color && config.output.color;
        let output = OutputFormatter::new(use_color, format, cli.verbosity());
        let registry = ModuleRegistry::with_prefix(&config.network.prefix());

        Self {
            config,
            output,
            registry,
        }
    }

    /// Look up a resource module; `vlans` is accepted for `ios_vlans`
    pub fn module(&self, resource: &str) -> Result<Arc<dyn Module>> {
        let name = module_name(resource);
        self.registry
            .get(&name)
            .ok_or(Error::UnknownResource(name))
    }

    /// Execute a module and print its output
    pub fn run(
        &self,
        resource: &str,
        params: &ModuleParams,
        context: &ModuleContext,
    ) -> Result<ModuleOutput> {
        let module = self.module(resource)?;
        self.output
            .info(&format!("Running {} ({})", module.name(), module.description()));

        let output = self.registry.execute(module.name(), params, context)?;

        for warning in &output.warnings {
            self.output.warning(warning);
        }
        Ok(output)
    }
}

/// Canonical module name for a resource argument
pub fn module_name(resource: &str) -> String {
    if resource.starts_with("ios_") {
        resource.to_string()
    } else {
        format!("ios_{}", resource)
    }
}

/// Read a text file
pub fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| Error::input_file(path, e.to_string()))
}

/// Read structured data from a JSON or YAML file
pub fn read_data(path: &Path) -> Result<Value> {
    let content = read_text(path)?;
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    let parsed = match extension {
        "json" => serde_json::from_str(&content).map_err(|e| e.to_string()),
        _ => serde_yaml::from_str(&content).map_err(|e| e.to_string()),
    };
    parsed.map_err(|message| Error::input_file(path, message))
}

/// List the registered resource modules
pub fn list(ctx: &CommandContext) -> Result<i32> {
    let modules: Vec<Value> = ctx
        .registry
        .names()
        .into_iter()
        .filter_map(|name| ctx.registry.get(name))
        .map(|module| json!({"name": module.name(), "description": module.description()}))
        .collect();

    ctx.output.emit(&modules)?;
    Ok(0)
}
