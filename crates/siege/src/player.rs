//! Players and the movement model

use nes::ppu::{COLS, Ppu, ROWS};

use crate::screen::Screen;

/// Bit that selects the inverted tile of a glyph
pub const INVERT: u8 = 0x80;

/// Direction of travel
///
/// The discriminants are significant: `+1` turns right, `-1` turns left
/// and `^2` reverses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Heading {
    #[default]
    Right = 0,
    Down = 1,
    Left = 2,
    Up = 3,
}

impl Heading {
    pub const ALL: [Heading; 4] = [Heading::Right, Heading::Down, Heading::Left, Heading::Up];

    #[inline]
    pub const fn from_index(index: u8) -> Self {
        match index & 3 {
            0 => Heading::Right,
            1 => Heading::Down,
            2 => Heading::Left,
            _ => Heading::Up,
        }
    }

    #[inline]
    pub const fn index(self) -> u8 {
        self as u8
    }

    #[inline]
    pub const fn opposite(self) -> Self {
        Self::from_index(self.index() ^ 2)
    }

    #[inline]
    pub const fn turn_right(self) -> Self {
        Self::from_index(self.index().wrapping_add(1))
    }

    #[inline]
    pub const fn turn_left(self) -> Self {
        Self::from_index(self.index().wrapping_sub(1))
    }

    /// Unit step in screen coordinates (y grows downwards)
    #[inline]
    pub const fn delta(self) -> (i8, i8) {
        match self {
            Heading::Right => (1, 0),
            Heading::Down => (0, 1),
            Heading::Left => (-1, 0),
            Heading::Up => (0, -1),
        }
    }
}

/// Who steers a player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Controller {
    Human,
    #[default]
    Autonomous,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub x: u8,
    pub y: u8,
    pub heading: Heading,
    pub score: u8,
    /// Glyph of the current cell
    pub head: u8,
    /// Glyph left behind
    pub trail: u8,
    pub collided: bool,
    pub controller: Controller,
}

impl Player {
    pub fn new(head: u8, trail: u8) -> Self {
        Self {
            x: 0,
            y: 0,
            heading: Heading::Right,
            score: 0,
            head,
            trail,
            collided: false,
            controller: Controller::Autonomous,
        }
    }

    pub fn is_human(&self) -> bool {
        self.controller == Controller::Human
    }

    /// Place the player for a new round; the score is kept
    pub fn reset(&mut self, x: u8, y: u8, heading: Heading) {
        self.x = x;
        self.y = y;
        self.heading = heading;
        self.collided = false;
        self.head &= !INVERT;
    }

    /// Cell `distance` steps away along `heading`, if it is on the nametable
    pub fn target(&self, heading: Heading, distance: u8) -> Option<(u8, u8)> {
        let (dx, dy) = heading.delta();
        let x = self.x as i16 + dx as i16 * distance as i16;
        let y = self.y as i16 + dy as i16 * distance as i16;
        if (0..COLS as i16).contains(&x) && (0..ROWS as i16).contains(&y) {
            Some((x as u8, y as u8))
        } else {
            None
        }
    }

    /// Draw the head glyph at the current cell
    pub fn draw<H: Ppu>(&self, screen: &mut Screen<H>) -> Result<(), H::Error> {
        screen.put(self.x, self.y, self.head)
    }

    /// Move one cell along the current heading
    ///
    /// Leaves the trail glyph behind, marks the player as collided if the
    /// new cell is already drawn on, and moves onto it either way. A step
    /// off the nametable counts as a collision and keeps the position.
    pub fn advance<H: Ppu>(&mut self, screen: &mut Screen<H>) -> Result<(), H::Error> {
        screen.put(self.x, self.y, self.trail)?;
        match self.target(self.heading, 1) {
            Some((x, y)) => {
                if screen.is_occupied(x, y)? {
                    self.collided = true;
                }
                self.x = x;
                self.y = y;
            }
            None => self.collided = true,
        }
        self.draw(screen)
    }
}
