//! CLI output formatting
//!
//! Provides human-readable terminal display for cycles, countdowns and
//! history.

pub mod display;

pub use display::render_history;
pub use display::render_status;
pub use display::CycleDisplay;
