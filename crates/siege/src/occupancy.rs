//! Occupancy grid
//!
//! Mirrors every glyph queued for the nametable at enqueue time, so
//! collision checks see the board as it will look after the next flush
//! without waiting for one.

use nes::ppu::{self, CELLS, COLS};

/// Glyph of an empty cell
pub const BLANK: u8 = b' ';

#[derive(Clone, PartialEq, Eq)]
pub struct Occupancy {
    cells: [u8; CELLS],
}

impl Occupancy {
    pub fn new() -> Self {
        Self { cells: [BLANK; CELLS] }
    }

    pub fn clear(&mut self) {
        self.cells.fill(BLANK);
    }

    #[inline]
    fn index(x: u8, y: u8) -> usize {
        y as usize * COLS as usize + x as usize
    }

    pub fn set(&mut self, x: u8, y: u8, glyph: u8) {
        if ppu::in_bounds(x, y) {
            self.cells[Self::index(x, y)] = glyph;
        }
    }

    /// Glyph at (`x`, `y`), blank outside the grid
    pub fn get(&self, x: u8, y: u8) -> u8 {
        if ppu::in_bounds(x, y) {
            self.cells[Self::index(x, y)]
        } else {
            BLANK
        }
    }

    /// Cells outside the grid count as occupied
    pub fn is_occupied(&self, x: u8, y: u8) -> bool {
        !ppu::in_bounds(x, y) || self.get(x, y) != BLANK
    }

    /// Glyphs of row `y`
    pub fn row(&self, y: u8) -> &[u8] {
        let start = Self::index(0, y);
        &self.cells[start..start + COLS as usize]
    }
}

impl Default for Occupancy {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nes::ppu::ROWS;

    #[test]
    fn test_set_get_clear() {
        let mut grid = Occupancy::new();
        assert!(!grid.is_occupied(4, 4));
        grid.set(4, 4, b'#');
        assert_eq!(grid.get(4, 4), b'#');
        assert!(grid.is_occupied(4, 4));
        assert_eq!(grid.row(4)[4], b'#');

        grid.clear();
        assert!(!grid.is_occupied(4, 4));
    }

    #[test]
    fn test_outside_is_occupied() {
        let mut grid = Occupancy::new();
        grid.set(COLS, 0, b'#');
        assert!(grid.is_occupied(COLS, 0));
        assert!(grid.is_occupied(0, ROWS));
        assert_eq!(grid.get(COLS, 0), BLANK);
    }
}
