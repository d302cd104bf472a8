//! Text and box drawing on top of the update queue

use nes::ppu::Ppu;

use crate::screen::Screen;

/// Glyphs used to draw a rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxChars {
    pub top_left: u8,
    pub top_right: u8,
    pub bottom_left: u8,
    pub bottom_right: u8,
    pub top: u8,
    pub bottom: u8,
    pub left: u8,
    pub right: u8,
}

impl BoxChars {
    /// Build from a table ordered top-left, top-right, bottom-left,
    /// bottom-right, top, bottom, left, right
    pub const fn from_table(table: [u8; 8]) -> Self {
        Self {
            top_left: table[0],
            top_right: table[1],
            bottom_left: table[2],
            bottom_right: table[3],
            top: table[4],
            bottom: table[5],
            left: table[6],
            right: table[7],
        }
    }
}

/// Border of the playfield and the winner screen
pub const BOX_CHARS: BoxChars = BoxChars::from_table(*b"++++--!!");

pub fn draw_char<H: Ppu>(screen: &mut Screen<H>, x: u8, y: u8, ch: u8) -> Result<(), H::Error> {
    screen.put(x, y, ch)
}

pub fn draw_text<H: Ppu>(screen: &mut Screen<H>, x: u8, y: u8, text: &str) -> Result<(), H::Error> {
    screen.put_run(x, y, text.as_bytes())
}

/// Draw the outline of the rectangle (`x1`, `y1`)-(`x2`, `y2`), inclusive
pub fn draw_box<H: Ppu>(
    screen: &mut Screen<H>,
    x1: u8,
    y1: u8,
    x2: u8,
    y2: u8,
    chars: &BoxChars,
) -> Result<(), H::Error> {
    screen.put(x1, y1, chars.top_left)?;
    screen.put(x2, y1, chars.top_right)?;
    screen.put(x1, y2, chars.bottom_left)?;
    screen.put(x2, y2, chars.bottom_right)?;
    for x in x1 + 1..x2 {
        screen.put(x, y1, chars.top)?;
        screen.put(x, y2, chars.bottom)?;
    }
    for y in y1 + 1..y2 {
        screen.put(x1, y, chars.left)?;
        screen.put(x2, y, chars.right)?;
    }
    Ok(())
}
