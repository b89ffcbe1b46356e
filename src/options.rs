use anyhow::anyhow;
use cln_plugin::{
    options::{ConfigOption, DefaultIntegerConfigOption, DefaultStringConfigOption},
    ConfiguredPlugin,
};

use crate::{
    cln_adapters::state::PluginState,
    core::{
        sweeper::{ExpiryMode, DEFAULT_EXPIRY_MARGIN_BLOCKS},
        HodlConfig,
    },
};

pub const OPT_EXPIRY_MARGIN: DefaultIntegerConfigOption = ConfigOption::new_i64_with_default(
    "hodlinvoice-expiry-margin",
    DEFAULT_EXPIRY_MARGIN_BLOCKS as i64,
    "Fail held htlcs this many blocks before their cltv_expiry",
);
pub const OPT_EXPIRY_MODE: DefaultStringConfigOption = ConfigOption::new_str_with_default(
    "hodlinvoice-expiry-mode",
    "entry",
    "On expiry fail every htlc of the payment hash (`entry`) or only the expired ones (`htlc`)",
);

pub fn parse_options(
    plugin: &ConfiguredPlugin<PluginState, tokio::io::Stdin, tokio::io::Stdout>,
) -> Result<HodlConfig, anyhow::Error> {
    build_config(
        plugin.option(&OPT_EXPIRY_MARGIN)?,
        &plugin.option(&OPT_EXPIRY_MODE)?,
    )
}

fn build_config(expiry_margin: i64, expiry_mode: &str) -> Result<HodlConfig, anyhow::Error> {
    let expiry_margin = u32::try_from(expiry_margin).map_err(|_| {
        anyhow!(
            "`{}` {} should be a non-negative number of blocks.",
            OPT_EXPIRY_MARGIN.name,
            expiry_margin
        )
    })?;
    let expiry_mode = expiry_mode
        .parse::<ExpiryMode>()
        .map_err(|e| anyhow!("`{}`: {}", OPT_EXPIRY_MODE.name, e))?;
    Ok(HodlConfig {
        expiry_margin,
        expiry_mode,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_build_default_config() {
        assert_eq!(build_config(1, "entry").unwrap(), HodlConfig::default());
    }

    #[test]
    fn accepts_htlc_mode() {
        let config = build_config(6, "htlc").unwrap();
        assert_eq!(config.expiry_margin, 6);
        assert_eq!(config.expiry_mode, ExpiryMode::Htlc);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(build_config(-1, "entry").is_err());
        assert!(build_config(i64::MAX, "entry").is_err());
        let err = build_config(1, "subset").unwrap_err();
        assert_eq!(
            err.to_string(),
            "`hodlinvoice-expiry-mode`: unknown expiry mode 'subset', expected 'entry' or 'htlc'"
        );
    }
}
