use std::sync::Arc;

use log::{debug, info};

use crate::core::{
    primitives::PaymentHash,
    registry::{Enqueued, HtlcMeta, PendingRegistry, PendingRequest},
    responder::{HtlcResolution, Responder},
};

/// The parts of an `htlc_accepted` call the gate cares about.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InterceptedHtlc {
    pub payment_hash: PaymentHash,
    pub cltv_expiry: u32,
    pub meta: HtlcMeta,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateDecision {
    /// Not a hold; the responder was answered with `continue`.
    PassThrough,
    /// Suspended in the registry behind `queued - 1` earlier HTLCs.
    Held { queued: usize },
}

/// Decides, per incoming HTLC, whether to hold it or let it through.
///
/// The gate never waits: a held HTLC is just a responder that nobody has
/// answered yet. Expiry and release are someone else's job.
#[derive(Debug)]
pub struct InterceptionGate {
    registry: Arc<PendingRegistry>,
}

impl InterceptionGate {
    pub fn new(registry: Arc<PendingRegistry>) -> Self {
        Self { registry }
    }

    pub fn intercept(&self, htlc: InterceptedHtlc, responder: Responder) -> GateDecision {
        let request = PendingRequest::new(htlc.cltv_expiry, htlc.meta, responder);
        match self.registry.enqueue(htlc.payment_hash, request) {
            Enqueued::Held { queued } => {
                info!(
                    "payment_hash: `{}`. Holding htlc with cltv_expiry {} ({} held)",
                    htlc.payment_hash, htlc.cltv_expiry, queued
                );
                GateDecision::Held { queued }
            }
            Enqueued::NotHeld(request) => {
                debug!(
                    "payment_hash: `{}`. Not a hodlinvoice! Continue...",
                    htlc.payment_hash
                );
                request.complete(HtlcResolution::Continue);
                GateDecision::PassThrough
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn htlc(b: u8, cltv_expiry: u32) -> InterceptedHtlc {
        InterceptedHtlc {
            payment_hash: PaymentHash::from_byte_array([b; 32]),
            cltv_expiry,
            meta: HtlcMeta::default(),
        }
    }

    #[tokio::test]
    async fn passes_through_unregistered_hash() {
        let reg = Arc::new(PendingRegistry::new());
        let gate = InterceptionGate::new(reg.clone());
        let (responder, rx) = Responder::channel();

        assert_eq!(
            gate.intercept(htlc(3, 100), responder),
            GateDecision::PassThrough
        );
        assert_eq!(rx.await.unwrap(), HtlcResolution::Continue);
        assert!(reg.is_empty());
    }

    #[tokio::test]
    async fn holds_registered_hash_without_answering() {
        let reg = Arc::new(PendingRegistry::new());
        let gate = InterceptionGate::new(reg.clone());
        let hash = PaymentHash::from_byte_array([1; 32]);
        reg.register(hash);

        let (r1, mut rx1) = Responder::channel();
        let (r2, mut rx2) = Responder::channel();
        assert_eq!(
            gate.intercept(htlc(1, 100), r1),
            GateDecision::Held { queued: 1 }
        );
        assert_eq!(
            gate.intercept(htlc(1, 150), r2),
            GateDecision::Held { queued: 2 }
        );

        assert!(rx1.try_recv().is_err());
        assert!(rx2.try_recv().is_err());
        assert_eq!(reg.snapshot()[&hash].len(), 2);
    }
}
