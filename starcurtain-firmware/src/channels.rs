//! Inter-task communication channels
//!
//! Defines the static channels used for communication between Embassy tasks.
//! Uses embassy-sync primitives for safe async communication.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use heapless::String;

use starcurtain_protocol::MAX_FRAME_LEN;

/// One complete `!!...##` frame of text
pub type Frame = String<MAX_FRAME_LEN>;

/// Channel capacity for received command frames
const COMMAND_CHANNEL_SIZE: usize = 4;

/// Channel capacity for outgoing responses and notifications
const RESPONSE_CHANNEL_SIZE: usize = 4;

/// Framed commands from the serial link, drained by the animation task
pub static COMMAND_CHANNEL: Channel<CriticalSectionRawMutex, Frame, COMMAND_CHANNEL_SIZE> =
    Channel::new();

/// Encoded responses and notifications for the serial link
pub static RESPONSE_CHANNEL: Channel<CriticalSectionRawMutex, Frame, RESPONSE_CHANNEL_SIZE> =
    Channel::new();
