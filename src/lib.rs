//! A Core Lightning plugin that holds incoming HTLCs for registered
//! payment hashes until the operator reveals the preimage, or fails them
//! once they get too close to their `cltv_expiry`.
pub mod cln_adapters;
pub mod core;
pub mod options;
