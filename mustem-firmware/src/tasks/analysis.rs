//! Audio analysis task
//!
//! Turns each sample block into features, then fans them out: display
//! commands through the planner, intensities to the motors and a telemetry
//! frame to the host link.

use defmt::*;
use embassy_time::Instant;
use heapless::Vec;

use mustem_core::analysis::FeatureExtractor;
use mustem_core::config::SenderConfig;
use mustem_core::haptic::HapticMapper;
use mustem_core::planner::CommandPlanner;
use mustem_core::winding::POINTS_PER_WINDING;
use mustem_protocol::Command;

use crate::channels::{BLOCKS, COMMANDS, HAPTIC, TELEMETRY};

/// Most commands one block can produce: a winding plus every gated command
const PLAN_CAPACITY: usize = POINTS_PER_WINDING + 8;

/// Analysis task - consumes blocks from the sampler
#[embassy_executor::task]
pub async fn analysis_task(config: SenderConfig) {
    info!("Analysis task started");

    let mut extractor = FeatureExtractor::new(&config.sampling, &config.analysis);
    let mut planner = CommandPlanner::new(&config.cadence);
    let mut haptic = HapticMapper::new(&config.haptic);
    let mut batch: Vec<Command, PLAN_CAPACITY> = Vec::new();

    // Bring the display to a known state before the first block
    planner.start(|cmd| {
        let _ = batch.push(cmd);
    });
    send_batch(&mut batch).await;

    loop {
        let mut block = BLOCKS.receive().await;
        let now_ms = Instant::now().as_millis() as u32;

        let features = extractor.process(block.as_mut_slice(), now_ms);

        if let Some(silent) = features.silence_changed {
            info!("Silence {}", if silent { "started" } else { "ended" });
        }
        if let Some(beat) = features.beat {
            debug!("Beat: strength={}, bpm={}", beat.strength, features.bpm);
        }
        trace!("Block: rms={}, freq={} Hz", features.rms, features.frequency);

        HAPTIC.signal(haptic.update(&features));
        if config.telemetry {
            TELEMETRY.signal(features.telemetry());
        }

        let mut overflow = false;
        planner.plan(&features, |cmd| {
            if batch.push(cmd).is_err() {
                overflow = true;
            }
        });
        if overflow {
            warn!("Command batch full, truncated");
        }
        send_batch(&mut batch).await;
    }
}

/// Queue a batch for the display link, waiting while the UART drains
async fn send_batch(batch: &mut Vec<Command, PLAN_CAPACITY>) {
    for cmd in batch.iter() {
        COMMANDS.send(*cmd).await;
    }
    batch.clear();
}
