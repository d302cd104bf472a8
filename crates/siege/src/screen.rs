//! Frame sync and nametable update queue
//!
//! All nametable writes go through a 64-byte update buffer that is handed
//! to the PPU once per vertical blank. A write that would not fit flushes
//! the buffer first, so callers never see an overflow. The only way to
//! touch VRAM directly is [`Screen::clear`], which turns the display off
//! while it runs.

use nes::ppu::{self, CELLS, COLS, Ppu, update, vram};
use tracing::trace;

use crate::config::Oracle;
use crate::occupancy::{BLANK, Occupancy};

/// Size of the update buffer in bytes
pub const UPDATE_BUFFER_SIZE: usize = 64;
/// Bytes usable by entries; the last one is kept for the EOF marker
const UPDATE_LIMIT: usize = UPDATE_BUFFER_SIZE - 1;
/// Address and tile of a single-cell entry
const CELL_ENTRY: usize = 3;

/// Tile index used to display `glyph`
#[inline]
pub const fn glyph_to_tile(glyph: u8) -> u8 {
    glyph.wrapping_sub(0x20)
}

/// Glyph shown by tile index `tile`
#[inline]
pub const fn tile_to_glyph(tile: u8) -> u8 {
    tile.wrapping_add(0x20)
}

/// Update queue plus the PPU it feeds
pub struct Screen<H> {
    hal: H,
    buf: [u8; UPDATE_BUFFER_SIZE],
    len: usize,
    shadow: Occupancy,
    oracle: Oracle,
}

impl<H: Ppu> Screen<H> {
    pub fn new(hal: H, oracle: Oracle) -> Self {
        let mut buf = [0; UPDATE_BUFFER_SIZE];
        buf[0] = update::NT_UPD_EOF;
        Self {
            hal,
            buf,
            len: 0,
            shadow: Occupancy::new(),
            oracle,
        }
    }

    pub fn hal(&self) -> &H {
        &self.hal
    }

    pub fn hal_mut(&mut self) -> &mut H {
        &mut self.hal
    }

    /// Board as it will look after the next flush
    pub fn shadow(&self) -> &Occupancy {
        &self.shadow
    }

    /// Bytes waiting in the update buffer
    pub fn pending(&self) -> usize {
        self.len
    }

    fn end_buffer(&mut self) {
        self.buf[self.len] = update::NT_UPD_EOF;
    }

    fn reserve(&mut self, size: usize) -> Result<(), H::Error> {
        if self.len + size > UPDATE_LIMIT {
            self.flush()?;
        }
        Ok(())
    }

    /// Queue `glyph` for the cell at (`x`, `y`)
    pub fn put(&mut self, x: u8, y: u8, glyph: u8) -> Result<(), H::Error> {
        debug_assert!(ppu::in_bounds(x, y), "cell ({x}, {y}) is off the nametable");
        if !ppu::in_bounds(x, y) {
            return Ok(());
        }

        self.reserve(CELL_ENTRY)?;
        let addr = ppu::ntadr(x, y);
        let entry = [(addr >> 8) as u8, addr as u8, glyph_to_tile(glyph)];
        self.buf[self.len..self.len + CELL_ENTRY].copy_from_slice(&entry);
        self.len += CELL_ENTRY;
        self.end_buffer();

        self.shadow.set(x, y, glyph);
        Ok(())
    }

    /// Queue a horizontal run of glyphs starting at (`x`, `y`)
    ///
    /// The run is clipped at the right edge of the nametable.
    pub fn put_run(&mut self, x: u8, y: u8, glyphs: &[u8]) -> Result<(), H::Error> {
        debug_assert!(
            ppu::in_bounds(x, y) && x as usize + glyphs.len() <= COLS as usize,
            "run of {} at ({x}, {y}) is off the nametable",
            glyphs.len()
        );
        if !ppu::in_bounds(x, y) || glyphs.is_empty() {
            return Ok(());
        }

        let glyphs = &glyphs[..glyphs.len().min((COLS - x) as usize)];
        self.reserve(CELL_ENTRY + glyphs.len())?;
        let addr = ppu::ntadr(x, y);
        self.buf[self.len] = (addr >> 8) as u8 | update::NT_UPD_HORZ;
        self.buf[self.len + 1] = addr as u8;
        self.buf[self.len + 2] = glyphs.len() as u8;
        self.len += CELL_ENTRY;
        for (i, &glyph) in glyphs.iter().enumerate() {
            self.buf[self.len] = glyph_to_tile(glyph);
            self.len += 1;
            self.shadow.set(x + i as u8, y, glyph);
        }
        self.end_buffer();
        Ok(())
    }

    /// Wait for vertical blank, then apply every queued entry in order
    pub fn flush(&mut self) -> Result<(), H::Error> {
        self.end_buffer();
        self.hal.wait_vblank()?;
        self.hal.flush_vram_update(&self.buf[..=self.len])?;
        trace!(bytes = self.len, "flushed update buffer");
        self.len = 0;
        self.end_buffer();
        self.hal.set_vram_addr(0)
    }

    /// Flush `frames` times, one frame each
    pub fn vdelay(&mut self, frames: u8) -> Result<(), H::Error> {
        for _ in 0..frames {
            self.flush()?;
        }
        Ok(())
    }

    /// Blank the whole nametable with the display turned off
    ///
    /// Anything still queued is dropped.
    pub fn clear(&mut self) -> Result<(), H::Error> {
        self.len = 0;
        self.end_buffer();
        self.hal.set_display(false)?;
        self.hal.set_vram_addr(vram::NAMETABLE_A)?;
        self.hal.vram_fill(glyph_to_tile(BLANK), CELLS)?;
        self.hal.set_vram_addr(0)?;
        self.hal.set_display(true)?;
        self.shadow.clear();
        Ok(())
    }

    /// Read back the glyph displayed at (`x`, `y`)
    ///
    /// Flushes first, so every queued write is visible to the read.
    pub fn read_cell(&mut self, x: u8, y: u8) -> Result<u8, H::Error> {
        debug_assert!(ppu::in_bounds(x, y), "cell ({x}, {y}) is off the nametable");
        if !ppu::in_bounds(x, y) {
            return Ok(BLANK);
        }

        self.flush()?;
        let mut tile = [0u8];
        self.hal.set_vram_addr(ppu::ntadr(x, y))?;
        self.hal.vram_read(&mut tile)?;
        self.hal.set_vram_addr(0)?;
        Ok(tile_to_glyph(tile[0]))
    }

    /// Check if anything is drawn at (`x`, `y`)
    ///
    /// Cells off the nametable always count as occupied.
    pub fn is_occupied(&mut self, x: u8, y: u8) -> Result<bool, H::Error> {
        if !ppu::in_bounds(x, y) {
            return Ok(true);
        }
        match self.oracle {
            Oracle::Shadow => Ok(self.shadow.is_occupied(x, y)),
            Oracle::Readback => Ok(self.read_cell(x, y)? != BLANK),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nes::soft::SoftConsole;
    use pretty_assertions::assert_eq;

    fn screen(oracle: Oracle) -> Screen<SoftConsole> {
        let mut screen = Screen::new(SoftConsole::new(), oracle);
        screen.clear().unwrap();
        screen
    }

    fn shown(screen: &Screen<SoftConsole>, x: u8, y: u8) -> u8 {
        tile_to_glyph(screen.hal().tile(x, y))
    }

    #[test]
    fn test_writes_are_deferred_until_flush() {
        let mut s = screen(Oracle::Shadow);
        s.put(3, 4, b'#').unwrap();
        s.put_run(10, 1, b"PLYR1:").unwrap();
        assert_eq!(shown(&s, 3, 4), BLANK);
        assert_eq!(shown(&s, 10, 1), BLANK);

        s.flush().unwrap();
        assert_eq!(shown(&s, 3, 4), b'#');
        let row: Vec<u8> = (10..16).map(|x| shown(&s, x, 1)).collect();
        assert_eq!(row, b"PLYR1:".to_vec());
        assert_eq!(s.pending(), 0);
    }

    #[test]
    fn test_read_cell_sees_last_write() {
        let mut s = screen(Oracle::Readback);
        s.put(7, 7, b'1').unwrap();
        s.put(7, 7, b'#').unwrap();
        let frame = s.hal().frame();
        assert_eq!(s.read_cell(7, 7).unwrap(), b'#');
        assert_eq!(s.hal().frame(), frame + 1);
        assert_eq!(s.read_cell(8, 7).unwrap(), BLANK);
    }

    #[test]
    fn test_overflow_flushes_before_write() {
        let mut s = screen(Oracle::Shadow);
        for x in 0..21 {
            s.put(x, 3, b'*').unwrap();
        }
        // 21 entries of 3 bytes fill the 63 usable bytes exactly
        assert_eq!(s.pending(), 63);
        assert_eq!(s.hal().frame(), 0);

        s.put(21, 3, b'*').unwrap();
        assert_eq!(s.hal().frame(), 1);
        assert_eq!(s.pending(), 3);
        assert_eq!(shown(&s, 20, 3), b'*');
        assert_eq!(shown(&s, 21, 3), BLANK);
    }

    #[test]
    fn test_run_overflow_flushes() {
        let mut s = screen(Oracle::Shadow);
        s.put_run(0, 0, &[b'-'; 30]).unwrap();
        s.put_run(0, 1, &[b'-'; 30]).unwrap();
        assert_eq!(s.hal().frame(), 1);
        assert_eq!(shown(&s, 29, 0), b'-');
        assert_eq!(shown(&s, 0, 1), BLANK);
        assert_eq!(s.shadow().get(0, 1), b'-');
    }

    #[test]
    fn test_run_is_clipped_at_row_end() {
        let mut s = Screen::new(SoftConsole::new(), Oracle::Shadow);
        s.put_run(30, 5, b"ab").unwrap();
        s.flush().unwrap();
        assert_eq!(shown(&s, 30, 5), b'a');
        assert_eq!(shown(&s, 31, 5), b'b');
        assert_eq!(shown(&s, 0, 6), BLANK);
    }

    #[test]
    fn test_clear_drops_pending_and_blanks() {
        let mut s = screen(Oracle::Shadow);
        s.put(1, 1, b'!').unwrap();
        s.flush().unwrap();
        s.put(2, 2, b'!').unwrap();
        s.clear().unwrap();
        s.flush().unwrap();
        assert_eq!(shown(&s, 1, 1), BLANK);
        assert_eq!(shown(&s, 2, 2), BLANK);
        assert!(!s.shadow().is_occupied(2, 2));
        assert!(s.hal().display_enabled());
    }

    #[test]
    fn test_oracles_agree() {
        let mut shadow = screen(Oracle::Shadow);
        let mut readback = screen(Oracle::Readback);
        for s in [&mut shadow, &mut readback] {
            s.put(4, 4, b'#').unwrap();
            s.put_run(0, 9, b"AB").unwrap();
        }
        for (x, y) in [(4, 4), (5, 4), (0, 9), (1, 9), (2, 9), (32, 0)] {
            assert_eq!(
                shadow.is_occupied(x, y).unwrap(),
                readback.is_occupied(x, y).unwrap(),
                "cell ({x}, {y})"
            );
        }
    }

    #[test]
    fn test_inverted_glyph_roundtrips() {
        let mut s = screen(Oracle::Readback);
        s.put(6, 6, b'1' ^ 0x80).unwrap();
        assert_eq!(s.read_cell(6, 6).unwrap(), b'1' ^ 0x80);
    }
}
