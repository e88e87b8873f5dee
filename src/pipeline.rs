//! In-order five stage pipeline timing model
pub mod cpu;
pub mod debug;
pub mod hazard;
pub mod stage;

pub use cpu::Pipeline;
