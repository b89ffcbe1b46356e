//! Node-independent hold logic.
//!
//! Everything in here is synchronous and talks to lightningd only through
//! [`responder::Responder`] handles. The `cln_adapters` module does the
//! translation from and to lightningd's JSON.
use std::sync::Arc;

pub mod gate;
pub mod hold;
pub mod primitives;
pub mod registry;
pub mod release;
pub mod responder;
pub mod sweeper;

use gate::{GateDecision, InterceptedHtlc, InterceptionGate};
use hold::{HoldRegistration, InspectReport, RegisterReport};
use primitives::{PaymentHash, Preimage};
use registry::PendingRegistry;
use release::{ReleaseController, ReleaseReport};
use responder::Responder;
use sweeper::{ExpiryMode, ExpirySweeper, SweepReport, DEFAULT_EXPIRY_MARGIN_BLOCKS};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HodlConfig {
    pub expiry_margin: u32,
    pub expiry_mode: ExpiryMode,
}

impl Default for HodlConfig {
    fn default() -> Self {
        Self {
            expiry_margin: DEFAULT_EXPIRY_MARGIN_BLOCKS,
            expiry_mode: ExpiryMode::Entry,
        }
    }
}

/// One registry shared by the gate, the sweeper, the release controller
/// and the registration API.
#[derive(Debug)]
pub struct HodlService {
    registry: Arc<PendingRegistry>,
    gate: InterceptionGate,
    sweeper: ExpirySweeper,
    release: ReleaseController,
    holds: HoldRegistration,
}

impl HodlService {
    pub fn new(config: HodlConfig) -> Self {
        let registry = Arc::new(PendingRegistry::new());
        Self {
            gate: InterceptionGate::new(registry.clone()),
            sweeper: ExpirySweeper::new(
                registry.clone(),
                config.expiry_margin,
                config.expiry_mode,
            ),
            release: ReleaseController::new(registry.clone()),
            holds: HoldRegistration::new(registry.clone()),
            registry,
        }
    }

    pub fn register_hold(&self, payment_hash: PaymentHash) -> RegisterReport {
        self.holds.register_hold(payment_hash)
    }

    pub fn inspect(&self) -> InspectReport {
        self.holds.inspect(self.sweeper.current_height())
    }

    pub fn on_htlc(&self, mut htlc: InterceptedHtlc, responder: Responder) -> GateDecision {
        if htlc.meta.arrival_height.is_none() {
            htlc.meta.arrival_height = self.sweeper.current_height();
        }
        self.gate.intercept(htlc, responder)
    }

    pub fn on_block(&self, height: u32) -> SweepReport {
        self.sweeper.on_block(height)
    }

    pub fn release(&self, preimage: Preimage) -> ReleaseReport {
        self.release.release(preimage)
    }

    pub fn registry(&self) -> &PendingRegistry {
        &self.registry
    }
}

impl Default for HodlService {
    fn default() -> Self {
        Self::new(HodlConfig::default())
    }
}
