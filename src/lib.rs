// Library surface for headless/integration tests and reuse.
// The binary in main.rs only owns the terminal and the CLI.
pub mod app;
pub mod app_dirs;
pub mod audio;
pub mod board;
pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;
pub mod session;
pub mod sinks;
pub mod ui;

pub use error::{GameError, GameResult};
