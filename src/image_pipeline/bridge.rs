//! Format bridge module
//!
//! Makes raw-buffer algorithms oblivious to whether the caller's image was raw or encoded.
//! Raw buffers are red-green-blue; decoded buffers are blue-green-red. [`ChannelState`]
//! tells every strategy which is in effect.

mod channels;
mod format_bridge;

pub use channels::{ChannelState, swap_red_blue};
pub use format_bridge::FormatBridge;
