//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod analysis;
pub mod display_tx;
pub mod haptic;
pub mod sampler;
pub mod telemetry;

pub use analysis::analysis_task;
pub use display_tx::display_tx_task;
pub use haptic::{haptic_task, Motor};
pub use sampler::sampler_task;
pub use telemetry::telemetry_task;
