//! Round and game state machine
//!
//! ```text
//! GameInit -> RoundSetup -> Ticking -+-> CollisionResolution -+-> RoundSetup
//!                             ^   |  |                        +-> WinnerDeclared -> Finished
//!                             +---+  +-> DemoInterrupted -> Finished
//! ```
//!
//! [`Game::step`] runs one phase; in [`Phase::Ticking`] that is one
//! simulation step of `frames_per_move` frames.

use std::convert::Infallible;

use nes::input::Joypad;
use nes::ppu::{COLS, Ppu, ROWS};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::board;
use crate::config::{GameConfig, Rules};
use crate::control::{ai_control, human_control};
use crate::error::ConfigError;
use crate::player::{Controller, Heading, INVERT, Player};
use crate::screen::Screen;
use crate::text::{BOX_CHARS, draw_box, draw_char, draw_text};

/// Start cell and heading of each player
pub const START: [(u8, u8, Heading); 2] = [
    (5, 5, Heading::Right),
    (COLS - 6, ROWS - 6, Heading::Left),
];
/// Head and trail glyphs of each player
pub const GLYPHS: [(u8, u8); 2] = [(b'1', b'#'), (b'2', b'*')];
/// Steps of the collision flash
pub const FLASH_STEPS: u8 = 56;
/// Frames per flash step
pub const FLASH_FRAMES: u8 = 2;
/// Frames the winner screen is held
pub const WINNER_HOLD: u8 = 75;

/// Everything the rules need to know about the current game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub players: [Player; 2],
    pub attract: bool,
    pub gameover: bool,
    /// Frames of input sampling per simulation step
    pub frames_per_move: u8,
}

impl GameState {
    pub fn new(rules: &Rules) -> Self {
        Self {
            players: GLYPHS.map(|(head, trail)| Player::new(head, trail)),
            attract: false,
            gameover: false,
            frames_per_move: rules.start_speed,
        }
    }

    /// Fresh game: scores zeroed, speed reset, controllers assigned
    pub fn init(&mut self, rules: &Rules, attract: bool) {
        *self = Self::new(rules);
        self.attract = attract;
        if !attract {
            self.players[0].controller = Controller::Human;
        }
    }

    /// Put both players on their start cells; scores and speed are kept
    pub fn reset_players(&mut self) {
        for (player, &(x, y, heading)) in self.players.iter_mut().zip(START.iter()) {
            player.reset(x, y, heading);
        }
    }

    pub fn any_collided(&self) -> bool {
        self.players.iter().any(|p| p.collided)
    }

    /// Score a finished round, ramp the speed and check for a winner
    ///
    /// The player that did not collide gets the point; a double collision
    /// scores nothing. A winner needs `max_score` and a strict lead.
    pub fn score_round(&mut self, rules: &Rules) -> Option<usize> {
        match (self.players[0].collided, self.players[1].collided) {
            (true, false) => self.players[1].score += 1,
            (false, true) => self.players[0].score += 1,
            _ => {}
        }

        if self.frames_per_move > rules.max_speed {
            self.frames_per_move -= 1;
        }

        let (a, b) = (self.players[0].score, self.players[1].score);
        if a >= rules.max_score && a > b {
            Some(0)
        } else if b >= rules.max_score && b > a {
            Some(1)
        } else {
            None
        }
    }
}

/// Phase of the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    GameInit,
    RoundSetup,
    Ticking,
    CollisionResolution,
    WinnerDeclared(usize),
    DemoInterrupted,
    Finished,
}

/// How a game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    Winner(usize),
    DemoInterrupted,
}

pub struct Game<H> {
    screen: Screen<H>,
    state: GameState,
    rules: Rules,
    rng: StdRng,
    phase: Phase,
    outcome: Option<GameOutcome>,
    round: u32,
}

impl<H: Ppu + Joypad> Game<H> {
    pub fn new(hal: H, config: &GameConfig) -> Result<Self, ConfigError> {
        config.rules.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            screen: Screen::new(hal, config.oracle),
            state: GameState::new(&config.rules),
            rules: config.rules,
            rng,
            phase: Phase::Finished,
            outcome: None,
            round: 0,
        })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn screen(&self) -> &Screen<H> {
        &self.screen
    }

    pub fn hal(&self) -> &H {
        self.screen.hal()
    }

    pub fn hal_mut(&mut self) -> &mut H {
        self.screen.hal_mut()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    /// Arm a new game; the next [`Game::step`] runs [`Phase::GameInit`]
    pub fn start(&mut self, attract: bool) {
        self.state.attract = attract;
        self.phase = Phase::GameInit;
        self.outcome = None;
    }

    /// Run the current phase and move to the next one
    pub fn step(&mut self) -> Result<Phase, H::Error> {
        self.phase = match self.phase {
            Phase::GameInit => {
                let attract = self.state.attract;
                self.state.init(&self.rules, attract);
                self.round = 0;
                debug!(attract, "new game");
                Phase::RoundSetup
            }
            Phase::RoundSetup => {
                self.setup_round()?;
                Phase::Ticking
            }
            Phase::Ticking => {
                self.make_move()?;
                if self.state.gameover {
                    Phase::DemoInterrupted
                } else if self.state.any_collided() {
                    Phase::CollisionResolution
                } else {
                    Phase::Ticking
                }
            }
            Phase::CollisionResolution => {
                self.flash_colliders()?;
                let winner = self.state.score_round(&self.rules);
                let [p0, p1] = &self.state.players;
                info!(
                    round = self.round,
                    collided = ?[p0.collided, p1.collided],
                    score = ?[p0.score, p1.score],
                    frames_per_move = self.state.frames_per_move,
                    "round over"
                );
                match winner {
                    Some(winner) => Phase::WinnerDeclared(winner),
                    None => Phase::RoundSetup,
                }
            }
            Phase::WinnerDeclared(winner) => {
                self.declare_winner(winner)?;
                self.outcome = Some(GameOutcome::Winner(winner));
                Phase::Finished
            }
            Phase::DemoInterrupted => {
                debug!("attract mode interrupted");
                self.outcome = Some(GameOutcome::DemoInterrupted);
                Phase::Finished
            }
            Phase::Finished => Phase::Finished,
        };
        Ok(self.phase)
    }

    /// Play one complete game
    pub fn play_game(&mut self, attract: bool) -> Result<GameOutcome, H::Error> {
        self.start(attract);
        loop {
            if self.step()? == Phase::Finished {
                if let Some(outcome) = self.outcome {
                    return Ok(outcome);
                }
            }
        }
    }

    /// Alternate attract-mode and human games forever
    ///
    /// Only returns when the HAL fails.
    pub fn run(&mut self) -> Result<Infallible, H::Error> {
        loop {
            self.play_game(true)?;
            self.play_game(false)?;
        }
    }

    fn setup_round(&mut self) -> Result<(), H::Error> {
        self.round += 1;
        self.screen.hal_mut().set_display(false)?;
        board::setup_attributes(&mut self.screen)?;
        board::setup_palette(&mut self.screen, self.state.attract)?;
        self.screen.clear()?;
        board::draw_playfield(&mut self.screen, &self.state)?;
        self.state.reset_players();
        debug!(
            round = self.round,
            frames_per_move = self.state.frames_per_move,
            "round setup"
        );
        Ok(())
    }

    /// Sample input for `frames_per_move` frames, then steer and move
    ///
    /// Player 1 moves before player 0; on a head-on meeting player 0's
    /// head is drawn last.
    fn make_move(&mut self) -> Result<(), H::Error> {
        for _ in 0..self.state.frames_per_move {
            let joy = self.screen.hal_mut().poll(0);
            if human_control(&mut self.state.players[0], joy, self.state.attract) {
                self.state.gameover = true;
            }
            self.screen.vdelay(1)?;
        }

        for player in &mut self.state.players {
            ai_control(player, &mut self.screen, &mut self.rng)?;
        }
        let [p0, p1] = &mut self.state.players;
        p1.advance(&mut self.screen)?;
        p0.advance(&mut self.screen)?;
        Ok(())
    }

    fn flash_colliders(&mut self) -> Result<(), H::Error> {
        for _ in 0..FLASH_STEPS {
            for player in &mut self.state.players {
                if player.collided {
                    player.head ^= INVERT;
                }
            }
            self.screen.vdelay(FLASH_FRAMES)?;
            for player in &self.state.players {
                player.draw(&mut self.screen)?;
            }
        }
        Ok(())
    }

    fn declare_winner(&mut self, winner: usize) -> Result<(), H::Error> {
        info!(winner, "winner declared");
        self.screen.clear()?;
        for i in 0..ROWS / 2 - 3 {
            draw_box(&mut self.screen, i, i, COLS - 1 - i, ROWS - 1 - i, &BOX_CHARS)?;
            self.screen.vdelay(1)?;
        }
        draw_text(&mut self.screen, 12, 10, "WINNER:")?;
        draw_text(&mut self.screen, 12, 13, "PLAYER ")?;
        draw_char(&mut self.screen, 12 + 7, 13, b'1' + winner as u8)?;
        self.screen.vdelay(WINNER_HOLD)?;
        self.state.gameover = true;
        Ok(())
    }
}
