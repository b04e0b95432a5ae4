use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{mode::GameMode, piece_bag::PieceSeed};

const DEFAULT_FPS: u32 = 60;
const MAX_FPS: u32 = 1000;

/// Settings a session is created from.
///
/// Every field has a default, so a partial JSON document such as
/// `{"mode": "lines-40"}` is a valid configuration.
///
/// # Example
///
/// ```
/// use stackfall_engine::{GameMode, LineTarget, SessionConfig};
///
/// let config: SessionConfig = serde_json::from_str(r#"{"mode": "lines-40"}"#).unwrap();
/// assert_eq!(config.mode, GameMode::Lines(LineTarget::L40));
/// assert_eq!(config.fps, 60);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    pub mode: GameMode,
    /// Seed for the piece bag and garbage holes; random when absent.
    pub seed: Option<PieceSeed>,
    /// Ticks per second used by headless drivers.
    pub fps: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("fps must be between 1 and {}, got {_0}", MAX_FPS)]
    InvalidFps(#[error(not(source))] u32),
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            mode: GameMode::default(),
            seed: None,
            fps: DEFAULT_FPS,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_FPS).contains(&self.fps) {
            return Err(ConfigError::InvalidFps(self.fps));
        }
        Ok(())
    }

    /// Length of one tick at the configured frame rate.
    #[must_use]
    pub fn frame_duration(&self) -> Duration {
        Duration::from_secs(1) / self.fps.max(1)
    }
}
