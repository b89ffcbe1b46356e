use std::{collections::BTreeMap, sync::Arc};

use log::info;
use serde::Serialize;

use crate::core::{
    primitives::PaymentHash,
    registry::{PendingRegistry, RequestInfo},
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RegisterReport {
    pub hodl: bool,
    pub payment_hash: PaymentHash,
    pub already_hodled: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InspectReport {
    pub hodled: BTreeMap<PaymentHash, Vec<RequestInfo>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blockheight: Option<u32>,
}

/// Operator-facing side of the registry: arm holds and look at them.
#[derive(Debug)]
pub struct HoldRegistration {
    registry: Arc<PendingRegistry>,
}

impl HoldRegistration {
    pub fn new(registry: Arc<PendingRegistry>) -> Self {
        Self { registry }
    }

    /// Arms a hold for `payment_hash` before any HTLC for it arrives.
    pub fn register_hold(&self, payment_hash: PaymentHash) -> RegisterReport {
        let already_hodled = self.registry.register(payment_hash);
        if already_hodled {
            info!("payment_hash: `{}`. Already held", payment_hash);
        } else {
            info!("payment_hash: `{}`. Holding htlcs from now on", payment_hash);
        }
        RegisterReport {
            hodl: true,
            payment_hash,
            already_hodled,
        }
    }

    pub fn inspect(&self, blockheight: Option<u32>) -> InspectReport {
        InspectReport {
            hodled: self.registry.snapshot(),
            blockheight,
        }
    }
}
