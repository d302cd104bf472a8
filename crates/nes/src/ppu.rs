//! Picture Processing Unit (PPU) interface
//!
//! The PPU draws the background from a nametable: a 32x30 grid of tile
//! indices at `0x2000`, followed by a 64-byte attribute table that picks
//! one of four background sub-palettes for every 16x16 pixel block.
//! Only the top 28 rows are considered visible here (NTSC overscan).
//!
//! VRAM may only be touched while the PPU is in vertical blank or while
//! rendering is disabled. Games queue their nametable changes in an
//! update buffer and hand the whole buffer to [`Ppu::flush_vram_update`]
//! right after [`Ppu::wait_vblank`].
//!
//! # Update buffer format
//!
//! ```text
//! single cell:      [addr_hi, addr_lo, tile]
//! horizontal run:   [addr_hi | NT_UPD_HORZ, addr_lo, len, tile * len]
//! vertical run:     [addr_hi | NT_UPD_VERT, addr_lo, len, tile * len]
//! end of buffer:    [NT_UPD_EOF]
//! ```

/// Visible nametable columns
pub const COLS: u8 = 32;
/// Visible nametable rows
pub const ROWS: u8 = 28;
/// Number of visible cells
pub const CELLS: usize = COLS as usize * ROWS as usize;

/// Default VRAM addresses
pub mod vram {
    /// Nametable A
    pub const NAMETABLE_A: u16 = 0x2000;
    /// Attribute table of nametable A
    pub const ATTRIBUTES_A: u16 = 0x23C0;
    /// Size of the attribute table in bytes
    pub const ATTRIBUTES_SIZE: usize = 0x40;
    /// Palette RAM
    pub const PALETTE: u16 = 0x3F00;
    /// Size of the PPU address space
    pub const SIZE: usize = 0x4000;
}

/// Update buffer control bits
pub mod update {
    /// Entry is a horizontal run (set on the address high byte)
    pub const NT_UPD_HORZ: u8 = 0x40;
    /// Entry is a vertical run (set on the address high byte)
    pub const NT_UPD_VERT: u8 = 0x80;
    /// End of buffer marker
    pub const NT_UPD_EOF: u8 = 0xFF;
}

/// Nametable A address of the cell at (`x`, `y`)
#[inline]
pub const fn ntadr(x: u8, y: u8) -> u16 {
    vram::NAMETABLE_A | ((y as u16) << 5) | (x as u16)
}

/// Check if (`x`, `y`) lies on the visible nametable
#[inline]
pub const fn in_bounds(x: u8, y: u8) -> bool {
    x < COLS && y < ROWS
}

/// Pack four 2-bit sub-palette numbers into one attribute byte
///
/// Order is top-left, top-right, bottom-left, bottom-right.
#[inline]
pub const fn attr(tl: u8, tr: u8, bl: u8, br: u8) -> u8 {
    (tl & 3) | ((tr & 3) << 2) | ((bl & 3) << 4) | ((br & 3) << 6)
}

/// Sub-palette of the cell at (`x`, `y`) given an attribute table
pub fn cell_palette(attributes: &[u8], x: u8, y: u8) -> u8 {
    let index = (y as usize / 4) * 8 + x as usize / 4;
    let shift = ((y & 2) << 1) | (x & 2);
    attributes.get(index).map_or(0, |byte| (byte >> shift) & 3)
}

/// Hardware PPU access
///
/// Implemented by the real console glue and by host backends such as the
/// software PPU in [`crate::soft`]. All calls happen on a single thread;
/// the only suspension point is [`Ppu::wait_vblank`].
pub trait Ppu {
    /// Failure reported by a host backend (real hardware uses `Infallible`)
    type Error;

    /// Block until the next vertical blank. One call is one frame.
    fn wait_vblank(&mut self) -> Result<(), Self::Error>;

    /// Set the VRAM address used by the following read/write/fill
    fn set_vram_addr(&mut self, addr: u16) -> Result<(), Self::Error>;

    /// Write bytes at the current address, auto-incrementing it
    fn vram_write(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Read bytes from the current address, auto-incrementing it
    fn vram_read(&mut self, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Fill `len` bytes with `value` from the current address
    fn vram_fill(&mut self, value: u8, len: usize) -> Result<(), Self::Error>;

    /// Apply an update buffer (see module docs). Only valid during vblank.
    fn flush_vram_update(&mut self, buffer: &[u8]) -> Result<(), Self::Error>;

    /// Set one palette entry
    ///
    /// # Arguments
    /// * `index` - Palette index (0-31, 0-15 are background)
    /// * `color` - NES color number (0x00-0x3F)
    fn set_palette(&mut self, index: u8, color: u8) -> Result<(), Self::Error>;

    /// Enable or disable background rendering
    fn set_display(&mut self, enabled: bool) -> Result<(), Self::Error>;
}
