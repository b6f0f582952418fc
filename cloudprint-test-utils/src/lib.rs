//! Test utilities for cloud-print account reconciliation
//!
//! This crate provides a recording cloud-print channel, account fixtures and
//! a reconciler builder for tests.

pub mod builders;
pub mod mocks;

// Re-export commonly used types
pub use builders::{ReconcilerBuilder, account, account1, account2};
pub use mocks::{ChannelCall, ChannelMethod, RecordingChannel};
