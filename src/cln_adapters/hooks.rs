use anyhow::Error;
use cln_plugin::Plugin;
use log::{debug, warn};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    cln_adapters::{
        state::PluginState,
        types::{parse_block_height, HtlcAcceptedRequest, HtlcAcceptedResponse},
    },
    core::{
        gate::GateDecision,
        primitives::PaymentHash,
        responder::{HtlcResolution, Responder},
        HodlService,
    },
};

pub async fn htlc_accepted(plugin: Plugin<PluginState>, v: Value) -> Result<Value, Error> {
    let service = plugin.state().service.clone();
    handle_htlc_accepted(&service, v).await
}

pub async fn block_added(plugin: Plugin<PluginState>, v: Value) -> Result<(), Error> {
    let height = parse_block_height(&v)?;
    let report = plugin.state().service.on_block(height);
    if !report.expired.is_empty() {
        debug!(
            "block {}: failed {} held htlc(s) across {} payment hash(es)",
            report.height,
            report.failed(),
            report.expired.len()
        );
    }
    Ok(())
}

/// Runs one `htlc_accepted` call to completion. For a held HTLC this
/// future stays parked until the sweeper or the release controller
/// answers it.
pub async fn handle_htlc_accepted(service: &HodlService, v: Value) -> Result<Value, Error> {
    let req = match HtlcAcceptedRequest::deserialize(&v) {
        Ok(r) => r,
        Err(e) => return unreadable_htlc(service, &v, e),
    };

    let payment_hash = req.htlc.payment_hash;
    let (responder, rx) = Responder::channel();
    if let GateDecision::Held { .. } = service.on_htlc(req.htlc.into(), responder) {
        debug!("payment_hash: `{}`. Waiting for release or expiry", payment_hash);
    }

    let resolution = match rx.await {
        Ok(r) => r,
        Err(_) => {
            warn!(
                "payment_hash: `{}`. Held htlc dropped without an answer! Rejecting htlc...",
                payment_hash
            );
            HtlcResolution::expired()
        }
    };
    Ok(serde_json::to_value(HtlcAcceptedResponse::from(resolution))?)
}

/// A payload we cannot parse is let through, unless it carries a payment
/// hash we are holding: then `continue` could settle it behind the
/// operator's back, so it is failed instead.
fn unreadable_htlc(
    service: &HodlService,
    v: &Value,
    e: serde_json::Error,
) -> Result<Value, Error> {
    let held = v
        .pointer("/htlc/payment_hash")
        .and_then(|h| h.as_str())
        .and_then(|h| h.parse::<PaymentHash>().ok())
        .filter(|h| service.registry().contains(h));

    let resolution = match held {
        Some(hash) => {
            warn!(
                "payment_hash: `{}`. Could not parse htlc_accepted payload: {}. Rejecting htlc...",
                hash, e
            );
            HtlcResolution::expired()
        }
        None => {
            warn!("Could not parse htlc_accepted payload: {}. Continue...", e);
            HtlcResolution::Continue
        }
    };
    Ok(serde_json::to_value(HtlcAcceptedResponse::from(resolution))?)
}
