//! Operator RPC methods: `hodlinvoice`, `unhodlinvoice` and `inspecthodl`.
use anyhow::Error;
use cln_plugin::Plugin;
use serde_json::Value;

use crate::{
    cln_adapters::{
        params::{hex_param, no_params},
        state::PluginState,
    },
    core::{
        primitives::{PaymentHash, Preimage},
        HodlService,
    },
};

pub async fn hodlinvoice(plugin: Plugin<PluginState>, args: Value) -> Result<Value, Error> {
    hodl_invoice(&plugin.state().service, args)
}

pub async fn unhodlinvoice(plugin: Plugin<PluginState>, args: Value) -> Result<Value, Error> {
    unhodl_invoice(&plugin.state().service, args)
}

pub async fn inspecthodl(plugin: Plugin<PluginState>, args: Value) -> Result<Value, Error> {
    inspect_hodl(&plugin.state().service, args)
}

pub fn hodl_invoice(service: &HodlService, args: Value) -> Result<Value, Error> {
    let payment_hash: PaymentHash = hex_param(args, "payment_hash")?;
    Ok(serde_json::to_value(service.register_hold(payment_hash))?)
}

pub fn unhodl_invoice(service: &HodlService, args: Value) -> Result<Value, Error> {
    let preimage: Preimage = hex_param(args, "payment_preimage")?;
    Ok(serde_json::to_value(service.release(preimage))?)
}

pub fn inspect_hodl(service: &HodlService, args: Value) -> Result<Value, Error> {
    no_params(args)?;
    Ok(serde_json::to_value(service.inspect())?)
}
