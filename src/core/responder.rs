use log::warn;
use tokio::sync::oneshot;

use crate::core::primitives::{Preimage, EXPIRED_FAILURE_MESSAGE};

/// The answer eventually given to a suspended `htlc_accepted` call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HtlcResolution {
    /// Let lightningd handle the HTLC with its normal logic.
    Continue,
    /// Settle the HTLC with the given preimage.
    Resolve { payment_key: Preimage },
    /// Fail the HTLC back to the payer.
    Fail { failure_message: String },
}

impl HtlcResolution {
    pub fn expired() -> Self {
        HtlcResolution::Fail {
            failure_message: EXPIRED_FAILURE_MESSAGE.to_string(),
        }
    }
}

/// Handle to a suspended interception request.
///
/// `complete` consumes the handle, so a request can be answered at most
/// once. Whoever owns the `Responder` owns the obligation to answer.
#[derive(Debug)]
pub struct Responder {
    tx: oneshot::Sender<HtlcResolution>,
}

impl Responder {
    pub fn new(tx: oneshot::Sender<HtlcResolution>) -> Self {
        Self { tx }
    }

    /// Creates a responder together with the receiving end that the hook
    /// call parks on.
    pub fn channel() -> (Self, oneshot::Receiver<HtlcResolution>) {
        let (tx, rx) = oneshot::channel();
        (Self::new(tx), rx)
    }

    pub fn complete(self, resolution: HtlcResolution) {
        if let Err(r) = self.tx.send(resolution) {
            warn!("Suspended htlc went away before it could be answered with {:?}", r);
        }
    }
}
