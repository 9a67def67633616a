//! Microphone sampling task
//!
//! Paces ADC reads on a fixed microsecond grid and hands each full block
//! to the analysis task. Late slots are counted, not retried.
//!
//! Runs on the high-priority interrupt executor so block analysis on the
//! thread executor cannot hold up a sample slot.

use defmt::*;
use embassy_time::{Duration, Instant, Ticker};

use mustem_core::config::SamplingConfig;
use mustem_core::sampler::{BlockBuffer, FixedRateSampler, SamplerError, Slot};
use mustem_core::traits::SampleSource;

use crate::channels::{count_dropped_block, BLOCKS};
use crate::mic::MicInput;

/// Sampling task - fills blocks at the configured rate
#[embassy_executor::task]
pub async fn sampler_task(mut mic: MicInput, config: SamplingConfig) {
    let mut sampler = FixedRateSampler::from_config(&config);
    let mut block = BlockBuffer::new(config.block_size);

    info!(
        "Sampler task started: {} Hz, {} samples per block",
        config.sample_rate_hz,
        block.size()
    );

    // Slot grid follows the ticker schedule
    let period = Duration::from_micros(sampler.period_us() as u64);
    sampler.start_at((Instant::now() + period).as_micros() as u32);
    let mut ticker = Ticker::every(period);
    let mut late_slots: u32 = 0;
    let mut read_errors: u32 = 0;

    loop {
        ticker.next().await;

        let now_us = Instant::now().as_micros() as u32;
        match sampler.poll(now_us) {
            Ok(Slot::Due) => {}
            Ok(Slot::NotDue) => continue,
            Err(SamplerError::Jitter { late_by_us }) => {
                late_slots = late_slots.wrapping_add(1);
                trace!("Sample slot late by {} us", late_by_us);
            }
        }

        let sample = match mic.read_normalized() {
            Ok(sample) => sample,
            Err(e) => {
                read_errors = read_errors.wrapping_add(1);
                trace!("ADC read failed: {:?}", e);
                0.0
            }
        };

        if !block.push(sample) {
            continue;
        }

        if late_slots > 0 || read_errors > 0 {
            debug!(
                "Block ready: {} late slots, {} read errors, {} missed total",
                late_slots,
                read_errors,
                sampler.missed()
            );
        }
        late_slots = 0;
        read_errors = 0;

        if BLOCKS.try_send(block.clone()).is_err() {
            let dropped = count_dropped_block();
            warn!("Analysis behind, dropping block ({} total)", dropped);
        }
        block.clear();
    }
}
