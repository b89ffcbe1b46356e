//! Glue between lightningd's JSON interfaces and [`crate::core`].
pub mod hooks;
pub mod params;
pub mod rpc;
pub mod state;
pub mod types;
