//! Mock implementations for testing

mod channel;

pub use channel::{ChannelCall, ChannelMethod, RecordingChannel};
