//! Terminal backend
//!
//! Runs the software console in a terminal: every vblank redraws the
//! cells that changed, paces to the frame rate and turns key presses into
//! joypad state. Terminals report presses rather than held keys, so a
//! press stays down for [`LATCH_FRAMES`] frames.

use std::io::{self, Stdout, Write};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute, queue};
use nes::input::{Button, Buttons, Joypad};
use nes::ppu::{self, CELLS, COLS, Ppu, ROWS};
use nes::soft::SoftConsole;
use tracing::error;

use crate::error::TermError;
use crate::player::INVERT;
use crate::screen::tile_to_glyph;

/// Frames a key press is held on the joypad
pub const LATCH_FRAMES: u8 = 8;

const HELP: &str = "arrows/wasd steer  enter start  q quit";

/// What a key does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Press(Button),
    Quit,
    Ignore,
}

pub fn map_key(key: &KeyEvent) -> KeyAction {
    if key.kind == KeyEventKind::Release {
        return KeyAction::Ignore;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => KeyAction::Quit,
        KeyCode::Esc | KeyCode::Char('q') => KeyAction::Quit,
        KeyCode::Up | KeyCode::Char('w') => KeyAction::Press(Button::UP),
        KeyCode::Down | KeyCode::Char('s') => KeyAction::Press(Button::DOWN),
        KeyCode::Left | KeyCode::Char('a') => KeyAction::Press(Button::LEFT),
        KeyCode::Right | KeyCode::Char('d') => KeyAction::Press(Button::RIGHT),
        KeyCode::Enter | KeyCode::Char(' ' | '1') => KeyAction::Press(Button::START),
        _ => KeyAction::Ignore,
    }
}

/// Rough terminal colour for an NES colour number
pub fn nes_color(color: u8) -> Color {
    let (hue, luma) = (color & 0x0F, (color >> 4) & 3);
    match hue {
        0x0 if luma >= 2 => Color::White,
        0x0 | 0xD..=0xF => Color::DarkGrey,
        0x1 | 0x2 if luma >= 3 => Color::Cyan,
        0x1 | 0x2 => Color::Blue,
        0x3 | 0x4 => Color::Magenta,
        0x5 | 0x6 => Color::Red,
        0x7 | 0x8 => Color::Yellow,
        0x9..=0xB => Color::Green,
        _ => Color::Cyan,
    }
}

/// Held-button bookkeeping for pad 0
#[derive(Debug, Clone, Default)]
pub struct Latch {
    frames: [u8; 8],
}

impl Latch {
    const DPAD: u8 = Button::UP as u8 | Button::DOWN as u8 | Button::LEFT as u8 | Button::RIGHT as u8;

    pub fn press(&mut self, button: Button) {
        let bit = button as u8;
        if bit & Self::DPAD != 0 {
            for (i, frames) in self.frames.iter_mut().enumerate() {
                if (1 << i) & Self::DPAD != 0 {
                    *frames = 0;
                }
            }
        }
        self.frames[bit.trailing_zeros() as usize] = LATCH_FRAMES;
    }

    /// Age every press by one frame
    pub fn tick(&mut self) {
        for frames in &mut self.frames {
            *frames = frames.saturating_sub(1);
        }
    }

    pub fn buttons(&self) -> Buttons {
        let bits = self
            .frames
            .iter()
            .enumerate()
            .filter(|(_, frames)| **frames > 0)
            .fold(0u8, |acc, (i, _)| acc | (1 << i));
        Buttons(bits)
    }
}

pub struct Terminal {
    console: SoftConsole,
    out: Stdout,
    frame_time: Option<Duration>,
    deadline: Instant,
    latch: Latch,
    drawn: [Option<(u8, u8)>; CELLS],
}

impl Terminal {
    /// Take over the terminal; `fps == 0` runs unpaced
    pub fn open(fps: u32) -> Result<Self, TermError> {
        let mut out = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(out, EnterAlternateScreen, cursor::Hide, Clear(ClearType::All))?;
        queue!(out, cursor::MoveTo(0, ROWS as u16 + 1), Print(HELP))?;
        out.flush()?;

        let frame_time = (fps > 0).then(|| Duration::from_secs(1) / fps);
        Ok(Self {
            console: SoftConsole::new(),
            out,
            frame_time,
            deadline: Instant::now(),
            latch: Latch::default(),
            drawn: [None; CELLS],
        })
    }

    fn pace(&mut self) {
        let Some(frame_time) = self.frame_time else {
            return;
        };
        let now = Instant::now();
        if self.deadline > now {
            thread::sleep(self.deadline - now);
            self.deadline += frame_time;
        } else {
            self.deadline = now + frame_time;
        }
    }

    fn pump_events(&mut self) -> Result<(), TermError> {
        self.latch.tick();
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                match map_key(&key) {
                    KeyAction::Press(button) => self.latch.press(button),
                    KeyAction::Quit => return Err(TermError::Quit),
                    KeyAction::Ignore => {}
                }
            }
        }
        Ok(())
    }

    fn render(&mut self) -> Result<(), TermError> {
        if !self.console.display_enabled() {
            return Ok(());
        }
        let palette = *self.console.palette();
        for y in 0..ROWS {
            for x in 0..COLS {
                let tile = self.console.tile(x, y);
                let sub = ppu::cell_palette(self.console.attributes(), x, y);
                let color = palette[sub as usize * 4 + 1];
                let index = y as usize * COLS as usize + x as usize;
                if self.drawn[index] == Some((tile, color)) {
                    continue;
                }
                self.drawn[index] = Some((tile, color));

                let glyph = tile_to_glyph(tile);
                let ch = match (glyph & !INVERT) as char {
                    c if c.is_ascii_graphic() || c == ' ' => c,
                    _ => '?',
                };
                queue!(
                    self.out,
                    cursor::MoveTo(x as u16, y as u16),
                    SetForegroundColor(nes_color(color))
                )?;
                if glyph & INVERT != 0 {
                    queue!(
                        self.out,
                        SetAttribute(Attribute::Reverse),
                        Print(ch),
                        SetAttribute(Attribute::NoReverse)
                    )?;
                } else {
                    queue!(self.out, Print(ch))?;
                }
            }
        }
        queue!(self.out, ResetColor)?;
        self.out.flush()?;
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if let Err(err) = execute!(self.out, ResetColor, cursor::Show, LeaveAlternateScreen) {
            error!(?err, "failed to leave alternate screen");
        }
        if let Err(err) = terminal::disable_raw_mode() {
            error!(?err, "failed to disable raw mode");
        }
    }
}

impl Ppu for Terminal {
    type Error = TermError;

    fn wait_vblank(&mut self) -> Result<(), TermError> {
        let Ok(()) = self.console.wait_vblank();
        self.render()?;
        self.pace();
        self.pump_events()
    }

    fn set_vram_addr(&mut self, addr: u16) -> Result<(), TermError> {
        let Ok(()) = self.console.set_vram_addr(addr);
        Ok(())
    }

    fn vram_write(&mut self, data: &[u8]) -> Result<(), TermError> {
        let Ok(()) = self.console.vram_write(data);
        Ok(())
    }

    fn vram_read(&mut self, buf: &mut [u8]) -> Result<(), TermError> {
        let Ok(()) = self.console.vram_read(buf);
        Ok(())
    }

    fn vram_fill(&mut self, value: u8, len: usize) -> Result<(), TermError> {
        let Ok(()) = self.console.vram_fill(value, len);
        Ok(())
    }

    fn flush_vram_update(&mut self, buffer: &[u8]) -> Result<(), TermError> {
        let Ok(()) = self.console.flush_vram_update(buffer);
        Ok(())
    }

    fn set_palette(&mut self, index: u8, color: u8) -> Result<(), TermError> {
        let Ok(()) = self.console.set_palette(index, color);
        Ok(())
    }

    fn set_display(&mut self, enabled: bool) -> Result<(), TermError> {
        let Ok(()) = self.console.set_display(enabled);
        Ok(())
    }
}

impl Joypad for Terminal {
    fn poll(&mut self, port: u8) -> Buttons {
        if port == 0 { self.latch.buttons() } else { Buttons::NONE }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_mapping() {
        let press = |code| map_key(&KeyEvent::new(code, KeyModifiers::NONE));
        assert_eq!(press(KeyCode::Up), KeyAction::Press(Button::UP));
        assert_eq!(press(KeyCode::Char('a')), KeyAction::Press(Button::LEFT));
        assert_eq!(press(KeyCode::Enter), KeyAction::Press(Button::START));
        assert_eq!(press(KeyCode::Char('1')), KeyAction::Press(Button::START));
        assert_eq!(press(KeyCode::Esc), KeyAction::Quit);
        assert_eq!(press(KeyCode::Char('x')), KeyAction::Ignore);
        assert_eq!(
            map_key(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            KeyAction::Quit
        );
    }

    #[test]
    fn test_latch_holds_then_releases() {
        let mut latch = Latch::default();
        latch.press(Button::LEFT);
        for _ in 0..LATCH_FRAMES - 1 {
            latch.tick();
            assert!(latch.buttons().left());
        }
        latch.tick();
        assert!(latch.buttons().is_empty());
    }

    #[test]
    fn test_latch_new_direction_replaces_old() {
        let mut latch = Latch::default();
        latch.press(Button::UP);
        latch.press(Button::START);
        latch.press(Button::LEFT);
        let joy = latch.buttons();
        assert!(joy.left());
        assert!(!joy.up());
        assert!(joy.start());
    }

    #[test]
    fn test_nes_colors() {
        assert_eq!(nes_color(0x31), Color::Cyan);
        assert_eq!(nes_color(0x34), Color::Magenta);
        assert_eq!(nes_color(0x39), Color::Green);
        assert_eq!(nes_color(0x30), Color::White);
        assert_eq!(nes_color(0x0F), Color::DarkGrey);
    }
}
