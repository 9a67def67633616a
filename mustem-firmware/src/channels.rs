//! Inter-task communication channels
//!
//! Defines the static channels used for communication between Embassy tasks.
//! The sampler hands full blocks to the analysis task, which fans its
//! results out to the display link, the telemetry link and the motors.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use portable_atomic::{AtomicU32, Ordering};

use mustem_core::haptic::MOTOR_COUNT;
use mustem_core::sampler::BlockBuffer;
use mustem_protocol::{Command, Telemetry};

/// Full blocks waiting for analysis (double buffering)
const BLOCK_CHANNEL_SIZE: usize = 2;

/// Display commands waiting for the UART
const COMMAND_CHANNEL_SIZE: usize = 16;

/// Filled sample blocks from the sampler task
pub static BLOCKS: Channel<CriticalSectionRawMutex, BlockBuffer, BLOCK_CHANNEL_SIZE> =
    Channel::new();

/// Display commands from the analysis task
pub static COMMANDS: Channel<CriticalSectionRawMutex, Command, COMMAND_CHANNEL_SIZE> =
    Channel::new();

/// Latest telemetry frame (older frames are overwritten)
pub static TELEMETRY: Signal<CriticalSectionRawMutex, Telemetry> = Signal::new();

/// Latest motor intensities in percent (bass, mid, treble)
pub static HAPTIC: Signal<CriticalSectionRawMutex, [u8; MOTOR_COUNT]> = Signal::new();

/// Blocks dropped because analysis had not taken the previous ones
pub static DROPPED_BLOCKS: AtomicU32 = AtomicU32::new(0);

/// Count one dropped block
pub fn count_dropped_block() -> u32 {
    DROPPED_BLOCKS.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
}
