//! Offline commands: decode a single call or log, list selectors.

use anyhow::{bail, Context, Result};
use modlogs_core::{
    event::RawLog,
    fingerprint::{event_signature, function_selector, to_hex},
};
use modlogs_evm::{DispatchConfig, DispatchResolver, EvmCallDecoder, EvmEventDecoder};
use std::sync::Arc;

use crate::render;
use crate::SchemaArgs;

pub fn decode_call(calldata: &str, schema: &SchemaArgs, as_json: bool) -> Result<()> {
    let registry = Arc::new(schema.load()?);
    let resolver = DispatchResolver::new(EvmCallDecoder::new(registry), DispatchConfig::default());

    let bytes = hex::decode(calldata.strip_prefix("0x").unwrap_or(calldata))
        .context("invalid calldata hex")?;

    let Some(call) = resolver.decode(&bytes)? else {
        bail!(
            "no function in {} v{} matches selector {}",
            schema.module,
            schema.release,
            to_hex(bytes.get(..4).unwrap_or(&bytes))
        );
    };

    if as_json {
        println!("{}", serde_json::to_string_pretty(&call)?);
    } else {
        render::print_call(&call);
    }
    Ok(())
}

pub fn decode_log(topics: Vec<String>, data: String, schema: &SchemaArgs, as_json: bool) -> Result<()> {
    let registry = Arc::new(schema.load()?);
    let decoder = EvmEventDecoder::new(registry);

    let log = RawLog {
        topics,
        data,
        ..Default::default()
    };

    let Some(event) = decoder.decode(&log)? else {
        bail!(
            "no event in {} v{} matches topic0 {}",
            schema.module,
            schema.release,
            log.topic0().unwrap_or("-")
        );
    };

    if as_json {
        println!("{}", serde_json::to_string_pretty(&event.to_json())?);
    } else {
        render::print_event(&event);
    }
    Ok(())
}

pub fn selectors(schema: &SchemaArgs) -> Result<()> {
    let registry = schema.load()?;

    println!("Schema:    {} v{}", schema.module, schema.release);
    println!("Functions:");
    for function in registry.functions() {
        let signature = function.signature();
        println!("  {}  {}", to_hex(&function_selector(&signature)), signature);
    }
    println!("Events:");
    for event in registry.events() {
        let signature = event.signature();
        if event.anonymous {
            println!("  {:66}  {} (anonymous)", "-", signature);
        } else {
            println!("  {}  {}", to_hex(&event_signature(&signature)), signature);
        }
    }
    Ok(())
}
