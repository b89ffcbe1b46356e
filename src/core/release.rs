use std::sync::Arc;

use log::info;
use serde::Serialize;

use crate::core::{
    primitives::{PaymentHash, Preimage},
    registry::PendingRegistry,
    responder::HtlcResolution,
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReleaseReport {
    /// Whether the derived payment hash was registered.
    pub hodled: bool,
    pub payment_hash: PaymentHash,
    pub payment_preimage: Preimage,
    pub unhodled_count: usize,
}

/// Settles every HTLC held for `SHA-256(preimage)`.
///
/// Only the preimage is trusted: the payment hash is always derived from
/// it, never taken from the caller.
#[derive(Debug)]
pub struct ReleaseController {
    registry: Arc<PendingRegistry>,
}

impl ReleaseController {
    pub fn new(registry: Arc<PendingRegistry>) -> Self {
        Self { registry }
    }

    pub fn release(&self, preimage: Preimage) -> ReleaseReport {
        let payment_hash = preimage.payment_hash();
        let (hodled, queue) = match self.registry.drain_and_delete(&payment_hash) {
            Some(queue) => (true, queue),
            None => (false, Vec::new()),
        };

        let unhodled_count = queue.len();
        for request in queue {
            request.complete(HtlcResolution::Resolve {
                payment_key: preimage,
            });
        }

        if hodled {
            info!(
                "payment_hash: `{}`. Released {} held htlc(s)",
                payment_hash, unhodled_count
            );
        } else {
            info!(
                "payment_hash: `{}`. Nothing held, nothing released",
                payment_hash
            );
        }

        ReleaseReport {
            hodled,
            payment_hash,
            payment_preimage: preimage,
            unhodled_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        registry::{HtlcMeta, PendingRequest},
        responder::Responder,
    };

    #[tokio::test]
    async fn resolves_only_the_derived_hash() {
        let reg = Arc::new(PendingRegistry::new());
        let controller = ReleaseController::new(reg.clone());
        let preimage = Preimage::from_byte_array([0x42; 32]);
        let other = Preimage::from_byte_array([0x43; 32]);

        reg.register(preimage.payment_hash());
        let (responder, rx) = Responder::channel();
        reg.enqueue(
            preimage.payment_hash(),
            PendingRequest::new(100, HtlcMeta::default(), responder),
        );

        let report = controller.release(other);
        assert!(!report.hodled);
        assert_eq!(report.unhodled_count, 0);
        assert_eq!(report.payment_hash, other.payment_hash());
        assert!(reg.contains(&preimage.payment_hash()));

        let report = controller.release(preimage);
        assert!(report.hodled);
        assert_eq!(report.unhodled_count, 1);
        assert_eq!(
            rx.await.unwrap(),
            HtlcResolution::Resolve {
                payment_key: preimage
            }
        );
        assert!(reg.is_empty());
    }

    #[test]
    fn release_of_empty_hold_consumes_registration() {
        let reg = Arc::new(PendingRegistry::new());
        let controller = ReleaseController::new(reg.clone());
        let preimage = Preimage::from_byte_array([1; 32]);
        reg.register(preimage.payment_hash());

        let report = controller.release(preimage);
        assert!(report.hodled);
        assert_eq!(report.unhodled_count, 0);
        assert!(!controller.release(preimage).hodled);
    }

    #[test]
    fn report_serializes_as_hex() {
        let preimage = Preimage::from_byte_array([0; 32]);
        let report = ReleaseController::new(Arc::new(PendingRegistry::new())).release(preimage);
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            serde_json::json!({
                "hodled": false,
                "payment_hash": "66687aadf862bd776c8fc18b8e9f8e20089714856ee233b3902a591d0d5f2925",
                "payment_preimage": "00".repeat(32),
                "unhodled_count": 0,
            })
        );
    }
}
