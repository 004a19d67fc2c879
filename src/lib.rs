//! Host side of the picomac bridge.
//!
//! The crates under `crates/` hold the board-independent pieces: the key-event ring
//! (`picomac-ipc`), cross-context state (`picomac-shared`), the keyboard input path
//! (`picomac-input`), and framebuffer scan-out (`picomac-video`). This crate adds the
//! machine-tick loop that feeds the emulated Mac, configuration, and a deterministic
//! single-threaded [`sim::Simulation`] that runs all of them together on a desktop.

pub mod config;
pub mod machine;
pub mod sim;
pub mod system;

pub use config::{BridgeConfig, ConfigError, PixelFormatKind, StartMode};
pub use machine::{MacMachine, MachineTicker, TickReport, TickTimings};
pub use sim::{KeyScript, ScriptError, SimReport, Simulation};
pub use system::LatchedSystemControl;
