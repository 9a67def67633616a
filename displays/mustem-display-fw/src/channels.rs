//! Inter-task communication channels
//!
//! The serial task parses lines into commands; the render task owns the
//! scene and the panel and is the only consumer.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use portable_atomic::{AtomicU32, Ordering};

use mustem_protocol::Command;

/// Channel capacity for parsed commands
///
/// One winding is 100 commands; the serial task waits when the renderer
/// falls behind, and the UART buffer absorbs the rest.
const COMMAND_CHANNEL_SIZE: usize = 32;

/// Parsed commands from the serial link
pub static COMMANDS: Channel<CriticalSectionRawMutex, Command, COMMAND_CHANNEL_SIZE> =
    Channel::new();

/// Lines dropped by the serial task (overflow, bad UTF-8, parse errors)
pub static DROPPED_LINES: AtomicU32 = AtomicU32::new(0);

/// Count one dropped line
pub fn count_dropped() -> u32 {
    DROPPED_LINES.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
}
