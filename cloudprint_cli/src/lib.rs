//! Cloud-print account session replay
//!
//! Library side of the `cloudprint-accounts` binary: layered configuration,
//! a scripted cloud-print channel, session replay and output formatting.

pub mod channel;
pub mod config;
pub mod output;
pub mod session;
