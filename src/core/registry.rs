//! The pending-HTLC registry.
//!
//! Maps a payment hash to the queue of interception requests that are
//! currently suspended for it. Every mutation happens under a single
//! mutex and every operation that removes requests hands them out by
//! value, so a request can only ever be completed by the caller that took
//! it out of the map.
use std::collections::BTreeMap;

use parking_lot::Mutex;
use serde::Serialize;

use crate::core::{
    primitives::PaymentHash,
    responder::{HtlcResolution, Responder},
    sweeper::ExpiryMode,
};

/// Observational data about a held HTLC, reported by `inspecthodl`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct HtlcMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_channel_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub htlc_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_msat: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrival_height: Option<u32>,
}

/// One suspended interception attempt.
#[derive(Debug)]
pub struct PendingRequest {
    pub expiry_height: u32,
    pub meta: HtlcMeta,
    responder: Responder,
}

impl PendingRequest {
    pub fn new(expiry_height: u32, meta: HtlcMeta, responder: Responder) -> Self {
        Self {
            expiry_height,
            meta,
            responder,
        }
    }

    pub fn info(&self) -> RequestInfo {
        RequestInfo {
            expiry_height: self.expiry_height,
            meta: self.meta.clone(),
        }
    }

    pub fn complete(self, resolution: HtlcResolution) {
        self.responder.complete(resolution)
    }
}

/// Read-only view of a [`PendingRequest`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RequestInfo {
    pub expiry_height: u32,
    #[serde(flatten)]
    pub meta: HtlcMeta,
}

#[derive(Debug)]
pub enum Enqueued {
    /// The request now belongs to the registry. `queued` is the queue
    /// length after the append.
    Held { queued: usize },
    /// Nobody registered this hash; the request is handed back untouched.
    NotHeld(PendingRequest),
}

#[derive(Debug, Default)]
pub struct PendingRegistry {
    entries: Mutex<BTreeMap<PaymentHash, Vec<PendingRequest>>>,
}

impl PendingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes sure `hash` has an entry. Returns whether it already had one.
    pub fn register(&self, hash: PaymentHash) -> bool {
        let mut entries = self.entries.lock();
        if entries.contains_key(&hash) {
            true
        } else {
            entries.insert(hash, Vec::new());
            false
        }
    }

    /// Appends `request` to the queue of `hash`, but only if the hash is
    /// registered. Arrivals never create entries.
    pub fn enqueue(&self, hash: PaymentHash, request: PendingRequest) -> Enqueued {
        let mut entries = self.entries.lock();
        match entries.get_mut(&hash) {
            Some(queue) => {
                queue.push(request);
                Enqueued::Held {
                    queued: queue.len(),
                }
            }
            None => Enqueued::NotHeld(request),
        }
    }

    /// Atomically removes the entry for `hash` and returns its queue, or
    /// `None` if the hash was not registered.
    pub fn drain_and_delete(&self, hash: &PaymentHash) -> Option<Vec<PendingRequest>> {
        self.entries.lock().remove(hash)
    }

    /// Takes every request that is due at `deadline` out of the registry.
    ///
    /// With [`ExpiryMode::Entry`] an entry holding any due request is
    /// removed as a whole. With [`ExpiryMode::Htlc`] only the due requests
    /// are taken and the entry survives while it still holds requests.
    pub fn drain_expired(
        &self,
        deadline: u32,
        mode: ExpiryMode,
    ) -> Vec<(PaymentHash, Vec<PendingRequest>)> {
        let mut expired = Vec::new();
        self.entries.lock().retain(|hash, queue| match mode {
            ExpiryMode::Entry => {
                if queue.iter().any(|r| r.expiry_height <= deadline) {
                    expired.push((*hash, std::mem::take(queue)));
                    false
                } else {
                    true
                }
            }
            ExpiryMode::Htlc => {
                let (due, keep): (Vec<_>, Vec<_>) = std::mem::take(queue)
                    .into_iter()
                    .partition(|r| r.expiry_height <= deadline);
                *queue = keep;
                if due.is_empty() {
                    true
                } else {
                    expired.push((*hash, due));
                    !queue.is_empty()
                }
            }
        });
        expired
    }

    pub fn snapshot(&self) -> BTreeMap<PaymentHash, Vec<RequestInfo>> {
        self.entries
            .lock()
            .iter()
            .map(|(hash, queue)| (*hash, queue.iter().map(PendingRequest::info).collect()))
            .collect()
    }

    pub fn contains(&self, hash: &PaymentHash) -> bool {
        self.entries.lock().contains_key(hash)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
