//! Maze screensaver: a hunter roams a generated maze eating prey that keep respawning.
//!
//! The simulation (`maze`, `mover`, `hunter`, `prey`, `screensaver`) is free of
//! I/O and takes its randomness from the caller. `effects` and `render` turn its
//! state into terminal output, `frame_loop` and `refresh` are host plumbing.

pub mod config;
pub mod direction;
pub mod effects;
pub mod error;
pub mod frame_loop;
pub mod hunter;
pub mod maze;
pub mod mover;
pub mod prey;
pub mod refresh;
pub mod render;
pub mod screensaver;

pub use config::{Config, DisplayConfig, SimulationConfig};
pub use direction::Dir;
pub use error::{RefreshError, Result, ScreensaverError};
pub use hunter::{CaptureEvent, Hunter};
pub use maze::{Cell, Maze, Occupancy};
pub use mover::{GridEntity, GridMover, Point, TurnPolicy};
pub use prey::{Prey, PreyState};
pub use screensaver::{Screensaver, Stats};
