//! Playfield decoration: palette, attribute table, border and banners

use nes::ppu::{self, COLS, Ppu, ROWS, attr, vram};

use crate::game::GameState;
use crate::screen::Screen;
use crate::text::{BOX_CHARS, draw_box, draw_text};

/// Background palette; attract mode flips bit 0 of every entry
#[rustfmt::skip]
pub const PALETTE: [u8; 16] = [
    0x02,
    0x31, 0x31, 0x31, 0x00,
    0x34, 0x34, 0x34, 0x00,
    0x39, 0x39, 0x39, 0x00,
    0x00, 0x00, 0x00,
];

/// Sub-palette per 16x16 pixel block: banner row, side walls and the
/// bottom edge get their own colours
pub const ATTRIBUTES: [u8; vram::ATTRIBUTES_SIZE] = {
    let mut table = [0u8; vram::ATTRIBUTES_SIZE];
    let mut row = 0;
    while row < 8 {
        let mut col = 0;
        while col < 8 {
            let i = row * 8 + col;
            table[i] = if row == 0 {
                match col {
                    0 => attr(3, 3, 1, 0),
                    1..=3 => attr(3, 3, 0, 0),
                    4..=6 => attr(2, 2, 0, 0),
                    _ => attr(2, 2, 0, 1),
                }
            } else if row == 7 {
                attr(1, 1, 1, 1)
            } else {
                match col {
                    0 => attr(1, 0, 1, 0),
                    7 => attr(0, 1, 0, 1),
                    _ => attr(0, 0, 0, 0),
                }
            };
            col += 1;
        }
        row += 1;
    }
    table
};

/// Column of player 0's score digit
pub const SCORE_X: [u8; 2] = [9, 28];
/// Row of the score line
pub const SCORE_Y: u8 = 1;

/// Load the background palette, tinted in attract mode
pub fn setup_palette<H: Ppu>(screen: &mut Screen<H>, attract: bool) -> Result<(), H::Error> {
    let tint = u8::from(attract);
    for (i, &color) in PALETTE.iter().enumerate() {
        screen.hal_mut().set_palette(i as u8, color ^ tint)?;
    }
    Ok(())
}

/// Load the attribute table; the display must be off
pub fn setup_attributes<H: Ppu>(screen: &mut Screen<H>) -> Result<(), H::Error> {
    let hal = screen.hal_mut();
    hal.set_vram_addr(vram::ATTRIBUTES_A)?;
    hal.vram_write(&ATTRIBUTES)?;
    hal.set_vram_addr(0)
}

/// Glyph of a score digit; scores past 9 keep counting through ASCII
pub fn score_glyph(score: u8) -> u8 {
    b'0'.wrapping_add(score)
}

pub fn draw_scores<H: Ppu>(screen: &mut Screen<H>, state: &GameState) -> Result<(), H::Error> {
    for (player, &x) in state.players.iter().zip(SCORE_X.iter()) {
        screen.put(x, SCORE_Y, score_glyph(player.score))?;
    }
    Ok(())
}

/// Border, scores and the mode banner
pub fn draw_playfield<H: Ppu>(screen: &mut Screen<H>, state: &GameState) -> Result<(), H::Error> {
    draw_box(screen, 1, 2, COLS - 2, ROWS - 1, &BOX_CHARS)?;
    draw_scores(screen, state)?;
    if state.attract {
        draw_text(screen, 5, ROWS - 1, "ATTRACT MODE - PRESS 1")?;
    } else {
        draw_text(screen, 1, 1, "PLYR1:")?;
        draw_text(screen, 20, 1, "PLYR2:")?;
    }
    Ok(())
}

/// Sub-palette the attribute table assigns to cell (`x`, `y`)
pub fn cell_palette(x: u8, y: u8) -> u8 {
    ppu::cell_palette(&ATTRIBUTES, x, y)
}
