//! Game configuration

use crate::error::ConfigError;

/// Frames of input sampling per move at the start of a game
pub const START_SPEED: u8 = 12;
/// Fastest speed reached by the per-round ramp
pub const MAX_SPEED: u8 = 5;
/// Score needed to win, with a strict lead
pub const MAX_SCORE: u8 = 7;

/// Speed and win condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rules {
    /// Frames per move when a game starts
    pub start_speed: u8,
    /// Lower bound of frames per move
    pub max_speed: u8,
    /// Winning score
    pub max_score: u8,
}

impl Rules {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_speed == 0 {
            return Err(ConfigError::ZeroMaxSpeed);
        }
        if self.start_speed < self.max_speed {
            return Err(ConfigError::StartFasterThanMax {
                start: self.start_speed,
                max: self.max_speed,
            });
        }
        if self.max_score == 0 {
            return Err(ConfigError::ZeroMaxScore);
        }
        Ok(())
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            start_speed: START_SPEED,
            max_speed: MAX_SPEED,
            max_score: MAX_SCORE,
        }
    }
}

/// How collisions are detected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Oracle {
    /// Occupancy grid kept next to the update buffer
    #[default]
    Shadow,
    /// Flush, then read the cell back from VRAM
    Readback,
}

/// Configuration options for a [`crate::Game`]
#[derive(Debug, Clone, Default)]
pub struct GameConfig {
    pub rules: Rules,
    pub oracle: Oracle,
    /// Seed for the autonomous players; `None` draws one from the OS
    pub seed: Option<u64>,
}
