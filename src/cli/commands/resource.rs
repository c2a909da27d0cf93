//! Resource subcommands: parse, render, gather and diff.
//!
//! Device-backed states run against a [`StaticDevice`] loaded from a saved
//! running-config, always in check mode.

use super::{read_data, read_text, CommandContext};
use crate::cli::{DiffArgs, ParseArgs, RenderArgs};
use rustible_ios::error::Result;
use rustible_ios::modules::network::common::StaticDevice;
use rustible_ios::modules::{ModuleContext, ModuleParams};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;

fn params(pairs: Vec<(&str, Value)>) -> ModuleParams {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

fn device(ctx: &CommandContext, running_config: &Path) -> Result<Arc<StaticDevice>> {
    let text = read_text(running_config)?;
    let hostname = running_config
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("static")
        .to_string();

    Ok(Arc::new(
        StaticDevice::new(text)
            .with_hostname(hostname)
            .with_platform(ctx.config.network.platform),
    ))
}

/// `rustible-ios parse <resource> <file>`
pub fn parse(ctx: &CommandContext, args: &ParseArgs) -> Result<i32> {
    let running = read_text(&args.running_config)?;
    let params = params(vec![
        ("state", json!("parsed")),
        ("running_config", json!(running)),
    ]);

    let output = ctx.run(&args.resource, &params, &ModuleContext::new())?;
    ctx.output.emit(&output.data.get("parsed"))?;
    Ok(0)
}

/// `rustible-ios render <resource> <config>`
pub fn render(ctx: &CommandContext, args: &RenderArgs) -> Result<i32> {
    let config = read_data(&args.config)?;
    let params = params(vec![("state", json!("rendered")), ("config", config)]);

    let output = ctx.run(&args.resource, &params, &ModuleContext::new())?;
    ctx.output.emit(&output.data.get("rendered"))?;
    Ok(0)
}

/// `rustible-ios gather <resource> <file>`
pub fn gather(ctx: &CommandContext, args: &ParseArgs) -> Result<i32> {
    let device = device(ctx, &args.running_config)?;
    let params = params(vec![("state", json!("gathered"))]);
    let context = ModuleContext::new().with_device(device);

    let output = ctx.run(&args.resource, &params, &context)?;
    ctx.output.emit(&output.data.get("gathered"))?;
    Ok(0)
}

/// `rustible-ios diff <resource> <file> [--want FILE] [--state STATE]`
///
/// Prints the module result; the unified diff of pending commands also
/// goes to stderr.
pub fn diff(ctx: &CommandContext, args: &DiffArgs) -> Result<i32> {
    let device = device(ctx, &args.running_config)?;

    let mut pairs = vec![("state", json!(args.state.as_str()))];
    if let Some(path) = &args.want {
        pairs.push(("config", read_data(path)?));
    }
    let params = params(pairs);

    let context = ModuleContext::new()
        .with_device(device)
        .with_check_mode(true)
        .with_diff_mode(true);

    let output = ctx.run(&args.resource, &params, &context)?;
    if let Some(diff) = &output.diff {
        ctx.output.diff(diff);
    }
    ctx.output.emit(&output)?;
    Ok(0)
}
