//! Siege - two-player light-cycle game for the NES nametable
//!
//! Two cycles leave trails on a 32x28 character grid; the first one to run
//! into a wall or a trail gives the point to the other. Player 0 is human
//! (or a bot in attract mode), player 1 is always a bot.
//!
//! ## Architecture
//!
//! The game only talks to hardware through the [`nes`] traits:
//! - **Screen** (`screen`): update-buffer queue flushed once per vblank,
//!   plus the collision oracle
//! - **Text** (`text`): characters, strings and boxes on top of the queue
//! - **Player** (`player`): headings and the movement model
//! - **Control** (`control`): joypad steering and the autonomous policy
//! - **Board** (`board`): palette, attribute table and playfield
//! - **Game** (`game`): round/game state machine
//! - **Term** (`term`): crossterm backend for playing in a terminal

pub mod board;
pub mod config;
pub mod control;
pub mod error;
pub mod game;
pub mod occupancy;
pub mod player;
pub mod screen;
pub mod term;
pub mod text;

// Re-exports for convenience
pub use config::{GameConfig, Oracle, Rules};
pub use error::{ConfigError, TermError};
pub use game::{Game, GameOutcome, GameState, Phase};
pub use player::{Controller, Heading, Player};
pub use screen::Screen;
