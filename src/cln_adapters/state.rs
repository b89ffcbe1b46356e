use std::sync::Arc;

use crate::core::{HodlConfig, HodlService};

#[derive(Clone, Debug)]
pub struct PluginState {
    pub service: Arc<HodlService>,
}

impl PluginState {
    pub fn new(config: HodlConfig) -> Self {
        Self {
            service: Arc::new(HodlService::new(config)),
        }
    }
}
