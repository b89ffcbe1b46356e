use std::{fmt, str::FromStr, sync::Arc};

use log::{debug, warn};
use parking_lot::Mutex;
use thiserror::Error;

use crate::core::{
    primitives::PaymentHash,
    registry::PendingRegistry,
    responder::HtlcResolution,
};

/// Blocks before an HTLC's `cltv_expiry` at which we give up holding it,
/// so the fail has time to propagate.
pub const DEFAULT_EXPIRY_MARGIN_BLOCKS: u32 = 1;

/// How much of a hold is failed once one of its HTLCs runs out of time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExpiryMode {
    /// Fail every HTLC queued for the payment hash and drop the hold.
    #[default]
    Entry,
    /// Fail only the HTLCs that are due, keep holding the rest.
    Htlc,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown expiry mode '{0}', expected 'entry' or 'htlc'")]
pub struct UnknownExpiryMode(String);

impl FromStr for ExpiryMode {
    type Err = UnknownExpiryMode;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "entry" => Ok(ExpiryMode::Entry),
            "htlc" => Ok(ExpiryMode::Htlc),
            _ => Err(UnknownExpiryMode(s.to_string())),
        }
    }
}

impl fmt::Display for ExpiryMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ExpiryMode::Entry => write!(f, "entry"),
            ExpiryMode::Htlc => write!(f, "htlc"),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub height: u32,
    /// Payment hashes that lost HTLCs, with the number failed for each.
    pub expired: Vec<(PaymentHash, usize)>,
}

impl SweepReport {
    pub fn failed(&self) -> usize {
        self.expired.iter().map(|(_, n)| n).sum()
    }
}

/// Fails held HTLCs whose `cltv_expiry` is within `margin` blocks of the
/// chain tip.
#[derive(Debug)]
pub struct ExpirySweeper {
    registry: Arc<PendingRegistry>,
    margin: u32,
    mode: ExpiryMode,
    blockheight: Mutex<Option<u32>>,
}

impl ExpirySweeper {
    pub fn new(registry: Arc<PendingRegistry>, margin: u32, mode: ExpiryMode) -> Self {
        Self {
            registry,
            margin,
            mode,
            blockheight: Mutex::new(None),
        }
    }

    pub fn current_height(&self) -> Option<u32> {
        *self.blockheight.lock()
    }

    /// Called once per `block_added`. An HTLC expiring at `E` is failed at
    /// height `h` iff `E <= h + margin`.
    pub fn on_block(&self, height: u32) -> SweepReport {
        {
            let mut current = self.blockheight.lock();
            *current = Some(current.map_or(height, |h| h.max(height)));
        }

        let deadline = height.saturating_add(self.margin);
        let drained = self.registry.drain_expired(deadline, self.mode);

        let mut report = SweepReport {
            height,
            expired: Vec::with_capacity(drained.len()),
        };
        for (hash, queue) in drained {
            warn!(
                "payment_hash: `{}`. {} held htlc(s) expire at or before block {}. Failing...",
                hash,
                queue.len(),
                deadline
            );
            report.expired.push((hash, queue.len()));
            for request in queue {
                request.complete(HtlcResolution::expired());
            }
        }

        if report.expired.is_empty() {
            debug!("block {}: no held htlcs expired", height);
        }
        report
    }
}
