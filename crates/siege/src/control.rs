//! Human and autonomous steering
//!
//! Both policies obey the same rule: a decision never reverses the
//! heading the player had when the decision started.

use nes::input::Buttons;
use nes::ppu::Ppu;
use rand::Rng;

use crate::player::{Heading, Player};
use crate::screen::Screen;

/// Apply a joypad snapshot to `player`
///
/// Returns `true` when START is pressed during attract mode, which ends
/// the demo whether or not the player is human.
pub fn human_control(player: &mut Player, joy: Buttons, attract: bool) -> bool {
    let demo_over = attract && joy.start();
    if !player.is_human() {
        return demo_over;
    }

    let mut heading = None;
    if joy.left() {
        heading = Some(Heading::Left);
    }
    if joy.right() {
        heading = Some(Heading::Right);
    }
    if joy.up() {
        heading = Some(Heading::Up);
    }
    if joy.down() {
        heading = Some(Heading::Down);
    }
    if let Some(heading) = heading {
        if heading != player.heading.opposite() {
            player.heading = heading;
        }
    }
    demo_over
}

/// Take `heading` if the cell `1 << shift` steps along it is free
pub fn try_heading<H: Ppu>(
    player: &mut Player,
    heading: Heading,
    shift: u8,
    screen: &mut Screen<H>,
) -> Result<bool, H::Error> {
    let Some((x, y)) = player.target(heading, 1 << shift) else {
        return Ok(false);
    };
    if screen.is_occupied(x, y)? {
        return Ok(false);
    }
    player.heading = heading;
    Ok(true)
}

/// Pick a heading for a computer-controlled player
///
/// Blocked ahead: turn right, or failing that left. Clear ahead: take a
/// free side turn when the cells further along it are free too, then go
/// back to straight if a random distance ahead is still clear. The last
/// successful probe wins.
pub fn ai_control<H: Ppu, R: Rng>(
    player: &mut Player,
    screen: &mut Screen<H>,
    rng: &mut R,
) -> Result<(), H::Error> {
    if player.is_human() {
        return Ok(());
    }

    let heading = player.heading;
    if !try_heading(player, heading, 0, screen)? {
        if !try_heading(player, heading.turn_right(), 0, screen)? {
            try_heading(player, heading.turn_left(), 0, screen)?;
        }
        return Ok(());
    }

    if try_heading(player, heading.turn_right(), 0, screen)? {
        let shift = 1 + rng.gen_range(0..4);
        try_heading(player, heading.turn_right(), shift, screen)?;
    }
    if try_heading(player, heading.turn_left(), 0, screen)? {
        let shift = 1 + rng.gen_range(0..4);
        try_heading(player, heading.turn_left(), shift, screen)?;
    }
    let shift = rng.gen_range(0..4);
    try_heading(player, heading, shift, screen)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Oracle;
    use crate::player::Controller;
    use nes::input::Button;
    use nes::soft::SoftConsole;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn human() -> Player {
        let mut p = Player::new(b'1', b'#');
        p.controller = Controller::Human;
        p.reset(10, 10, Heading::Right);
        p
    }

    fn bot(x: u8, y: u8, heading: Heading) -> Player {
        let mut p = Player::new(b'2', b'*');
        p.reset(x, y, heading);
        p
    }

    #[test]
    fn test_human_turns() {
        let mut p = human();
        assert!(!human_control(&mut p, Button::UP.into(), false));
        assert_eq!(p.heading, Heading::Up);
        human_control(&mut p, Buttons::NONE, false);
        assert_eq!(p.heading, Heading::Up);
    }

    #[test]
    fn test_human_cannot_reverse() {
        for start in Heading::ALL {
            for joy in [Button::UP, Button::DOWN, Button::LEFT, Button::RIGHT] {
                let mut p = human();
                p.heading = start;
                human_control(&mut p, joy.into(), false);
                assert_ne!(p.heading, start.opposite());
            }
        }
    }

    #[test]
    fn test_later_direction_bits_win() {
        let mut p = human();
        human_control(&mut p, Button::LEFT | Button::DOWN, false);
        assert_eq!(p.heading, Heading::Down);
    }

    #[test]
    fn test_start_ends_demo_for_any_player() {
        let mut p = bot(3, 3, Heading::Right);
        assert!(human_control(&mut p, Button::START | Button::UP, true));
        assert_eq!(p.heading, Heading::Right);
        assert!(!human_control(&mut p, Button::START.into(), false));
    }

    #[test]
    fn test_ai_turns_right_when_blocked() {
        let mut s = Screen::new(SoftConsole::new(), Oracle::Shadow);
        let mut rng = StdRng::seed_from_u64(1);
        let mut p = bot(10, 10, Heading::Right);
        s.put(11, 10, b'!').unwrap();
        ai_control(&mut p, &mut s, &mut rng).unwrap();
        assert_eq!(p.heading, Heading::Down);
    }

    #[test]
    fn test_ai_turns_left_as_fallback() {
        let mut s = Screen::new(SoftConsole::new(), Oracle::Shadow);
        let mut rng = StdRng::seed_from_u64(1);
        let mut p = bot(10, 10, Heading::Right);
        s.put(11, 10, b'!').unwrap();
        s.put(10, 11, b'!').unwrap();
        ai_control(&mut p, &mut s, &mut rng).unwrap();
        assert_eq!(p.heading, Heading::Up);
    }

    #[test]
    fn test_ai_boxed_in_keeps_heading() {
        let mut s = Screen::new(SoftConsole::new(), Oracle::Shadow);
        let mut rng = StdRng::seed_from_u64(1);
        let mut p = bot(10, 10, Heading::Right);
        for (x, y) in [(11, 10), (10, 11), (10, 9), (9, 10)] {
            s.put(x, y, b'!').unwrap();
        }
        ai_control(&mut p, &mut s, &mut rng).unwrap();
        assert_eq!(p.heading, Heading::Right);

        p.advance(&mut s).unwrap();
        assert!(p.collided);
        assert_eq!((p.x, p.y), (11, 10));
    }

    #[test]
    fn test_ai_treats_edges_as_blocked() {
        let mut s = Screen::new(SoftConsole::new(), Oracle::Shadow);
        let mut rng = StdRng::seed_from_u64(1);
        let mut p = bot(31, 0, Heading::Right);
        ai_control(&mut p, &mut s, &mut rng).unwrap();
        assert_eq!(p.heading, Heading::Down);
    }

    #[test]
    fn test_ai_picks_free_neighbour_and_never_reverses() {
        let mut rng = StdRng::seed_from_u64(42);
        // every combination of blocked front/right/left cells, behind blocked
        for heading in Heading::ALL {
            for mask in 0u8..7 {
                let mut s = Screen::new(SoftConsole::new(), Oracle::Shadow);
                let mut p = bot(15, 14, heading);
                let behind = p.target(heading.opposite(), 1).unwrap();
                s.put(behind.0, behind.1, b'#').unwrap();
                let sides = [heading, heading.turn_right(), heading.turn_left()];
                for (bit, side) in sides.iter().enumerate() {
                    if mask & (1 << bit) != 0 {
                        let (x, y) = p.target(*side, 1).unwrap();
                        s.put(x, y, b'!').unwrap();
                    }
                }

                ai_control(&mut p, &mut s, &mut rng).unwrap();
                assert_ne!(p.heading, heading.opposite());
                let (x, y) = p.target(p.heading, 1).unwrap();
                assert!(
                    !s.shadow().is_occupied(x, y),
                    "heading {heading:?} mask {mask:03b} chose blocked {:?}",
                    p.heading
                );
            }
        }
    }

    #[test]
    fn test_ai_ignores_human() {
        let mut s = Screen::new(SoftConsole::new(), Oracle::Shadow);
        let mut rng = StdRng::seed_from_u64(1);
        let mut p = human();
        s.put(11, 10, b'!').unwrap();
        ai_control(&mut p, &mut s, &mut rng).unwrap();
        assert_eq!(p.heading, Heading::Right);
    }
}
