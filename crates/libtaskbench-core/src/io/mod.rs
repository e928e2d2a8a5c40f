//! I/O-bound benchmarks
//!
//! Each top-level task runs a fixed sequence of phases over its own set of
//! ephemeral files while simulated network calls sleep in the background.

pub mod files;
pub mod heavy;
pub mod network;
pub mod runner;
pub mod task;

pub use files::FileSet;
pub use heavy::{heavy_io_task, run_heavy_benchmark, HeavyFileSet};
pub use network::NetworkCalls;
pub use runner::{run_io_benchmark, TaskStats};
pub use task::io_intensive_task;
