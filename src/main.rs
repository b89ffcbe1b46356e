use anyhow::Result;
use cln_plugin::Builder;
use log::{debug, info};

use hodlinvoice::cln_adapters::{hooks, rpc, state::PluginState};
use hodlinvoice::options::{parse_options, OPT_EXPIRY_MARGIN, OPT_EXPIRY_MODE};

#[tokio::main]
async fn main() -> Result<()> {
    log_panics::init();
    std::env::set_var(
        "CLN_PLUGIN_LOG",
        "cln_plugin=info,cln_rpc=info,hodlinvoice=debug,warn",
    );
    debug!("Starting hodlinvoice plugin");

    let plugin = match Builder::new(tokio::io::stdin(), tokio::io::stdout())
        .option(OPT_EXPIRY_MARGIN)
        .option(OPT_EXPIRY_MODE)
        .rpcmethod(
            "hodlinvoice",
            "Hold htlcs for payment_hash until released with unhodlinvoice",
            rpc::hodlinvoice,
        )
        .rpcmethod(
            "unhodlinvoice",
            "Settle the htlcs held for sha256(payment_preimage)",
            rpc::unhodlinvoice,
        )
        .rpcmethod(
            "inspecthodl",
            "List held payment hashes and their htlcs",
            rpc::inspecthodl,
        )
        .hook("htlc_accepted", hooks::htlc_accepted)
        .subscribe("block_added", hooks::block_added)
        .configure()
        .await?
    {
        Some(p) => p,
        None => return Ok(()),
    };

    let config = match parse_options(&plugin) {
        Ok(c) => c,
        Err(e) => return plugin.disable(&e.to_string()).await,
    };
    info!(
        "Holding htlcs until {} block(s) before expiry, expiry mode `{}`",
        config.expiry_margin, config.expiry_mode
    );

    let plugin = plugin.start(PluginState::new(config)).await?;
    plugin.join().await
}
