//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels.

pub mod render;
pub mod serial_rx;

pub use render::render_task;
pub use serial_rx::serial_rx_task;
