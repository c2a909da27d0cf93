//! Resource controller: the `Module` wrapper around the engine.

use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::{json, Map, Value};
use tracing::{debug, info, info_span};

use super::compare::{Layout, Reconciler};
use super::facts::{populate_facts, to_keyed, validate_config};
use super::renderer::Prefix;
use super::state::ResourceState;
use super::utils::{is_empty, remove_empties};
use super::Resource;
use crate::modules::network::common::{generate_config_diff, NetworkDevice, NetworkPlatform};
use crate::modules::{
    Diff, Module, ModuleContext, ModuleError, ModuleOutput, ModuleParams, ModuleResult, ParamExt,
};

/// Parameters accepted by every resource module
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceParams {
    /// Declared configuration (list for keyed resources, mapping otherwise)
    pub config: Option<Value>,
    /// Declared state, `merged` when omitted
    pub state: ResourceState,
    /// Configuration text to parse with state `parsed`
    pub running_config: Option<String>,
}

impl ResourceParams {
    /// Extract and pre-check parameters.
    ///
    /// Conflicting or missing inputs are rejected here, before any parsing
    /// or comparison.
    pub fn from_params(params: &ModuleParams) -> ModuleResult<Self> {
        let state = match params.get_string("state")? {
            Some(s) => s.parse::<ResourceState>()?,
            None => ResourceState::default(),
        };
        let config = params.get("config").filter(|v| !v.is_null()).cloned();
        let running_config = params.get_string("running_config")?;

        let parsed = Self {
            config,
            state,
            running_config,
        };
        parsed.check()?;
        Ok(parsed)
    }

    fn check(&self) -> ModuleResult<()> {
        let has_config = self.config.as_ref().is_some_and(|c| !is_empty(c));

        if self.state.requires_config() && !has_config {
            return Err(ModuleError::MissingParameter(format!(
                "config (value must not be empty for state '{}')",
                self.state
            )));
        }

        match (self.state, &self.running_config) {
            (ResourceState::Parsed, None) => {
                return Err(ModuleError::MissingParameter(
                    "running_config (required for state 'parsed')".to_string(),
                ))
            }
            (ResourceState::Parsed, Some(_)) => {}
            (state, Some(_)) => {
                return Err(ModuleError::InvalidParameter(format!(
                    "running_config cannot be used with state '{}'",
                    state
                )))
            }
            _ => {}
        }

        if matches!(self.state, ResourceState::Gathered | ResourceState::Parsed) && has_config {
            return Err(ModuleError::InvalidParameter(format!(
                "config cannot be used with state '{}'",
                self.state
            )));
        }

        Ok(())
    }
}

/// Generic module driving one [`Resource`].
pub struct ResourceModule<R: Resource> {
    prefix: Prefix,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> Default for ResourceModule<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Resource> std::fmt::Debug for ResourceModule<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceModule")
            .field("module", &R::MODULE)
            .field("prefix", &self.prefix)
            .finish()
    }
}

impl<R: Resource> ResourceModule<R> {
    pub fn new() -> Self {
        Self {
            prefix: R::template().prefix().clone(),
            _resource: PhantomData,
        }
    }

    /// Override the command prefixes (e.g. from configuration)
    pub fn with_prefix(mut self, prefix: Prefix) -> Self {
        self.prefix = prefix;
        self
    }

    /// Read and parse the device's current facts.
    pub fn gather(&self, device: &dyn NetworkDevice) -> ModuleResult<Value> {
        let raw = device.get_config(R::GATHER_COMMAND)?;
        populate_facts::<R>(&raw)
    }

    /// Validate declared config and bring it to keyed form.
    pub fn prepare_want(&self, config: Option<&Value>) -> ModuleResult<(Value, Vec<String>)> {
        let config = config.cloned().unwrap_or_else(|| empty_config(R::layout()));
        validate_config::<R>(&config)?;
        Ok(to_keyed(R::layout(), &remove_empties(&config)))
    }

    /// Compute the commands moving `have` to `want` (both keyed).
    pub fn commands(&self, state: ResourceState, want: &Value, have: &Value) -> ModuleResult<Vec<String>> {
        Reconciler::new(R::template(), state)
            .with_prefix(self.prefix.clone())
            .reconcile(R::layout(), want, have)
            .map_err(ModuleError::from)
    }

    fn device<'c>(context: &'c ModuleContext, state: ResourceState) -> ModuleResult<&'c Arc<dyn NetworkDevice>> {
        let device = context.device.as_ref().ok_or_else(|| {
            ModuleError::ExecutionFailed(format!(
                "{}: state '{}' requires a device connection",
                R::MODULE,
                state
            ))
        })?;

        if device.platform() != NetworkPlatform::CiscoIos {
            return Err(ModuleError::Unsupported(format!(
                "{} supports cisco_ios devices, not {}",
                R::MODULE,
                device.platform()
            )));
        }
        Ok(device)
    }

    fn run_parsed(&self, running_config: &str) -> ModuleResult<ModuleOutput> {
        let parsed = populate_facts::<R>(running_config)?;
        Ok(ModuleOutput::ok(format!("Parsed {} configuration", R::MODULE)).with_data("parsed", parsed))
    }

    fn run_rendered(&self, params: &ResourceParams) -> ModuleResult<ModuleOutput> {
        let (want, warnings) = self.prepare_want(params.config.as_ref())?;
        let have = to_keyed(R::layout(), &empty_config(R::layout())).0;
        let commands = self.commands(ResourceState::Rendered, &want, &have)?;

        Ok(ModuleOutput::ok(format!("Rendered {} commands", commands.len()))
            .with_data("rendered", json!(commands))
            .with_warnings(warnings))
    }

    fn run_gathered(&self, device: &dyn NetworkDevice) -> ModuleResult<ModuleOutput> {
        let gathered = self.gather(device)?;
        Ok(ModuleOutput::ok(format!("Gathered {} facts", R::MODULE)).with_data("gathered", gathered))
    }

    fn run_reconcile(
        &self,
        params: &ResourceParams,
        device: &dyn NetworkDevice,
        context: &ModuleContext,
    ) -> ModuleResult<ModuleOutput> {
        let before = self.gather(device)?;
        let (want, warnings) = self.prepare_want(params.config.as_ref())?;
        let (have, _) = to_keyed(R::layout(), &before);

        let commands = self.commands(params.state, &want, &have)?;
        let changed = !commands.is_empty();
        info!(device = %device.hostname(), commands = commands.len(), changed, "reconciled");

        let mut output = if changed {
            ModuleOutput::changed(format!("{} command(s) generated", commands.len()))
        } else {
            ModuleOutput::ok("No changes needed")
        };
        output = output
            .with_data("before", before.clone())
            .with_data("commands", json!(commands))
            .with_warnings(warnings);

        if !changed {
            return Ok(output.with_data("after", before));
        }

        if context.check_mode {
            debug!("check mode, commands not sent");
            if context.diff_mode {
                output = output.with_diff(commands_diff(&commands));
            }
            return Ok(output);
        }

        device.edit_config(&commands)?;
        let after = self.gather(device)?;

        if context.diff_mode {
            output = output.with_diff(facts_diff(&before, &after)?);
        }
        Ok(output.with_data("after", after))
    }
}

impl<R: Resource> Module for ResourceModule<R> {
    fn name(&self) -> &'static str {
        R::MODULE
    }

    fn description(&self) -> &'static str {
        R::DESCRIPTION
    }

    fn execute(&self, params: &ModuleParams, context: &ModuleContext) -> ModuleResult<ModuleOutput> {
        let params = ResourceParams::from_params(params)?;
        let span = info_span!("resource", module = R::MODULE, state = %params.state);
        let _enter = span.enter();

        if params.state.is_offline() {
            debug!("offline state, device not contacted");
            return match params.state {
                ResourceState::Parsed => {
                    let running_config = params.running_config.as_deref().unwrap_or_default();
                    self.run_parsed(running_config)
                }
                _ => self.run_rendered(&params),
            };
        }

        let device = Self::device(context, params.state)?;
        if params.state.is_read_only() {
            self.run_gathered(device.as_ref())
        } else {
            self.run_reconcile(&params, device.as_ref(), context)
        }
    }

    fn validate_params(&self, params: &ModuleParams) -> ModuleResult<()> {
        ResourceParams::from_params(params).map(|_| ())
    }
}

/// Empty declared config for a layout
fn empty_config(layout: &Layout) -> Value {
    match layout {
        Layout::Single { .. } => Value::Object(Map::new()),
        Layout::Keyed { .. } => Value::Array(Vec::new()),
    }
}

fn facts_diff(before: &Value, after: &Value) -> ModuleResult<Diff> {
    let to_yaml = |v: &Value| {
        serde_yaml::to_string(v)
            .map_err(|e| ModuleError::ExecutionFailed(format!("Failed to serialize facts: {}", e)))
    };
    Ok(generate_config_diff(&to_yaml(before)?, &to_yaml(after)?))
}

fn commands_diff(commands: &[String]) -> Diff {
    let details: String = commands.iter().map(|c| format!("+{}\n", c)).collect();
    Diff::new("running configuration", format!("{} command(s) pending", commands.len()))
        .with_details(details)
}
