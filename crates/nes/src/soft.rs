//! Software PPU and joypad
//!
//! [`SoftConsole`] keeps the whole PPU address space in memory and counts
//! frames instead of waiting for a real vertical blank, which makes it a
//! deterministic clock for tests and the base of host backends.

use core::convert::Infallible;

use crate::input::{Buttons, Joypad};
use crate::ppu::{self, Ppu, update, vram};

/// Number of palette entries
pub const PALETTE_SIZE: usize = 32;

/// In-memory console
pub struct SoftConsole {
    vram: [u8; vram::SIZE],
    palette: [u8; PALETTE_SIZE],
    addr: u16,
    display: bool,
    frame: u64,
    pads: [Buttons; 2],
}

impl SoftConsole {
    pub fn new() -> Self {
        Self {
            vram: [0; vram::SIZE],
            palette: [0; PALETTE_SIZE],
            addr: 0,
            display: false,
            frame: 0,
            pads: [Buttons::NONE; 2],
        }
    }

    /// Frames elapsed since power on
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn display_enabled(&self) -> bool {
        self.display
    }

    /// Tile index currently shown at (`x`, `y`)
    pub fn tile(&self, x: u8, y: u8) -> u8 {
        self.vram[ppu::ntadr(x, y) as usize]
    }

    /// Attribute table of nametable A
    pub fn attributes(&self) -> &[u8] {
        let start = vram::ATTRIBUTES_A as usize;
        &self.vram[start..start + vram::ATTRIBUTES_SIZE]
    }

    pub fn palette(&self) -> &[u8; PALETTE_SIZE] {
        &self.palette
    }

    /// Hold `buttons` on pad `port` until changed
    pub fn set_pad(&mut self, port: u8, buttons: Buttons) {
        self.pads[port as usize & 1] = buttons;
    }

    fn write_byte(&mut self, value: u8) {
        let addr = self.addr & 0x3FFF;
        if addr >= vram::PALETTE {
            self.palette[addr as usize % PALETTE_SIZE] = value & 0x3F;
        } else {
            self.vram[addr as usize] = value;
        }
        self.addr = self.addr.wrapping_add(1);
    }

    fn read_byte(&mut self) -> u8 {
        let addr = self.addr & 0x3FFF;
        let value = if addr >= vram::PALETTE {
            self.palette[addr as usize % PALETTE_SIZE]
        } else {
            self.vram[addr as usize]
        };
        self.addr = self.addr.wrapping_add(1);
        value
    }

    fn poke(&mut self, addr: u16, value: u8) {
        self.vram[(addr & 0x3FFF) as usize] = value;
    }
}

impl Default for SoftConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Ppu for SoftConsole {
    type Error = Infallible;

    fn wait_vblank(&mut self) -> Result<(), Infallible> {
        self.frame += 1;
        Ok(())
    }

    fn set_vram_addr(&mut self, addr: u16) -> Result<(), Infallible> {
        self.addr = addr;
        Ok(())
    }

    fn vram_write(&mut self, data: &[u8]) -> Result<(), Infallible> {
        for &byte in data {
            self.write_byte(byte);
        }
        Ok(())
    }

    fn vram_read(&mut self, buf: &mut [u8]) -> Result<(), Infallible> {
        for byte in buf.iter_mut() {
            *byte = self.read_byte();
        }
        Ok(())
    }

    fn vram_fill(&mut self, value: u8, len: usize) -> Result<(), Infallible> {
        for _ in 0..len {
            self.write_byte(value);
        }
        Ok(())
    }

    fn flush_vram_update(&mut self, buffer: &[u8]) -> Result<(), Infallible> {
        let mut i = 0;
        while i + 2 < buffer.len() {
            let hi = buffer[i];
            if hi == update::NT_UPD_EOF {
                break;
            }
            let base = ((hi & 0x3F) as u16) << 8 | buffer[i + 1] as u16;
            if hi & (update::NT_UPD_HORZ | update::NT_UPD_VERT) == 0 {
                self.poke(base, buffer[i + 2]);
                i += 3;
                continue;
            }
            let step = if hi & update::NT_UPD_VERT != 0 { 32 } else { 1 };
            let len = buffer[i + 2] as usize;
            let tiles = buffer.get(i + 3..i + 3 + len).unwrap_or(&[]);
            for (n, &tile) in tiles.iter().enumerate() {
                self.poke(base.wrapping_add(n as u16 * step), tile);
            }
            i += 3 + len;
        }
        Ok(())
    }

    fn set_palette(&mut self, index: u8, color: u8) -> Result<(), Infallible> {
        self.palette[index as usize % PALETTE_SIZE] = color & 0x3F;
        Ok(())
    }

    fn set_display(&mut self, enabled: bool) -> Result<(), Infallible> {
        self.display = enabled;
        Ok(())
    }
}

impl Joypad for SoftConsole {
    fn poll(&mut self, port: u8) -> Buttons {
        self.pads[port as usize & 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Button;
    use crate::ppu::ntadr;

    fn ok<T>(r: Result<T, Infallible>) -> T {
        match r {
            Ok(v) => v,
            Err(e) => match e {},
        }
    }

    #[test]
    fn test_write_then_read_autoincrements() {
        let mut c = SoftConsole::new();
        ok(c.set_vram_addr(ntadr(3, 4)));
        ok(c.vram_write(&[1, 2, 3]));
        assert_eq!(c.tile(3, 4), 1);
        assert_eq!(c.tile(5, 4), 3);

        let mut buf = [0u8; 2];
        ok(c.set_vram_addr(ntadr(4, 4)));
        ok(c.vram_read(&mut buf));
        assert_eq!(buf, [2, 3]);
    }

    #[test]
    fn test_update_buffer_entries() {
        let mut c = SoftConsole::new();
        let a = ntadr(1, 1);
        let b = ntadr(10, 2);
        let v = ntadr(0, 5);
        let buffer = [
            (a >> 8) as u8, a as u8, 7,
            (b >> 8) as u8 | update::NT_UPD_HORZ, b as u8, 3, 9, 8, 7,
            (v >> 8) as u8 | update::NT_UPD_VERT, v as u8, 2, 5, 6,
            update::NT_UPD_EOF,
            // ignored after EOF
            (a >> 8) as u8, a as u8, 0x55,
        ];
        ok(c.flush_vram_update(&buffer));
        assert_eq!(c.tile(1, 1), 7);
        assert_eq!([c.tile(10, 2), c.tile(11, 2), c.tile(12, 2)], [9, 8, 7]);
        assert_eq!([c.tile(0, 5), c.tile(0, 6)], [5, 6]);
    }

    #[test]
    fn test_fill_and_palette() {
        let mut c = SoftConsole::new();
        ok(c.set_vram_addr(ntadr(0, 0)));
        ok(c.vram_fill(0x11, 4));
        assert_eq!(c.tile(3, 0), 0x11);
        assert_eq!(c.tile(4, 0), 0);

        ok(c.set_palette(1, 0x71));
        assert_eq!(c.palette()[1], 0x31);
    }

    #[test]
    fn test_vblank_counts_frames() {
        let mut c = SoftConsole::new();
        ok(c.wait_vblank());
        ok(c.wait_vblank());
        assert_eq!(c.frame(), 2);
    }

    #[test]
    fn test_pads() {
        let mut c = SoftConsole::new();
        c.set_pad(0, Button::START.into());
        assert!(c.poll(0).start());
        assert!(c.poll(1).is_empty());
    }
}
