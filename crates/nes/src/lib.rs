//! # NES - picture processing unit and joypad abstraction
//!
//! A hardware abstraction layer for tile-based NES games in Rust.
//!
//! ## Features
//!
//! - **PPU**: Nametable geometry, update-buffer format, VRAM/palette access
//! - **Input**: Joypad bitmask with button helpers
//! - **Soft console**: In-memory PPU and joypad with a frame counter
//!
//! ## Quick Start
//!
//! ```
//! use nes::prelude::*;
//!
//! let mut console = SoftConsole::new();
//! let addr = ppu::ntadr(5, 5);
//! let buffer = [(addr >> 8) as u8, addr as u8, b'1' - 0x20, ppu::update::NT_UPD_EOF];
//!
//! console.wait_vblank().unwrap();
//! console.flush_vram_update(&buffer).unwrap();
//! assert_eq!(console.tile(5, 5), b'1' - 0x20);
//! ```
//!
//! ## Modules
//!
//! - [`ppu`] - Picture Processing Unit interface
//! - [`input`] - Controller input handling
//! - [`soft`] - Software console

#![cfg_attr(not(test), no_std)]

pub mod ppu;
pub mod input;
pub mod soft;

/// Convenient re-exports for common usage
///
/// Import everything you need with:
/// ```
/// use nes::prelude::*;
/// ```
pub mod prelude {
    pub use crate::ppu::{self, COLS, ROWS, Ppu};
    pub use crate::input::{Button, Buttons, Joypad};
    pub use crate::soft::SoftConsole;
}
