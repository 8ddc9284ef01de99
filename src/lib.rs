pub mod config;
pub mod cumulative;
pub mod data;
pub mod error;
pub mod expand;
pub mod frames;
pub mod insights;
pub mod ranking;

pub use config::{Axis, LeaderboardConfig, YearRange};
pub use data::Movies;
pub use error::{LeaderboardError, Result};
pub use frames::{CancelToken, Frame, FrameBuilder, FrameRow, FrameSequence};
