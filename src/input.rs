//! Keyboard state to per-tick commands
//!
//! Movement keys are levels (held), ability and pause keys are edges
//! (pressed). Edges are latched until the next `take_input`, so a tap shorter
//! than a frame is never lost.

use glam::Vec2;

use crate::sim::{Ability, TickInput};

/// Held movement keys plus latched presses
#[derive(Debug, Clone, Default)]
pub struct KeyState {
    forward: bool,
    back: bool,
    left: bool,
    right: bool,
    pending_cast: [bool; Ability::COUNT],
    pending_pause: bool,
}

/// Ability bound to a `KeyboardEvent.code`
pub fn ability_for_key(code: &str) -> Option<Ability> {
    match code {
        "KeyE" => Some(Ability::ShadowBall),
        "KeyQ" => Some(Ability::Hypnosis),
        "KeyR" => Some(Ability::DreamEater),
        "KeyF" => Some(Ability::ShadowPunch),
        _ => None,
    }
}

impl KeyState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key press. `repeat` is the browser's auto-repeat flag;
    /// repeats never trigger abilities or pause.
    ///
    /// Returns true if the key is bound (so the caller can prevent default).
    pub fn key_down(&mut self, code: &str, repeat: bool) -> bool {
        if self.set_movement(code, true) {
            return true;
        }
        if let Some(ability) = ability_for_key(code) {
            if !repeat {
                self.pending_cast[ability.index()] = true;
            }
            return true;
        }
        if code == "Escape" || code == "KeyP" {
            if !repeat {
                self.pending_pause = true;
            }
            return true;
        }
        false
    }

    pub fn key_up(&mut self, code: &str) -> bool {
        self.set_movement(code, false) || ability_for_key(code).is_some()
    }

    fn set_movement(&mut self, code: &str, down: bool) -> bool {
        let slot = match code {
            "KeyW" | "ArrowUp" => &mut self.forward,
            "KeyS" | "ArrowDown" => &mut self.back,
            "KeyA" | "ArrowLeft" => &mut self.left,
            "KeyD" | "ArrowRight" => &mut self.right,
            _ => return false,
        };
        *slot = down;
        true
    }

    /// Ground-plane direction from held keys (x = world X, y = world Z).
    /// Forward is -Z, away from the camera. Unit length or zero.
    pub fn movement(&self) -> Vec2 {
        let axis = |neg: bool, pos: bool| (pos as i8 - neg as i8) as f32;
        let dir = Vec2::new(axis(self.left, self.right), axis(self.forward, self.back));
        dir.normalize_or_zero()
    }

    /// Build the next tick's input and clear latched presses
    pub fn take_input(&mut self) -> TickInput {
        let input = TickInput {
            movement: self.movement(),
            cast: self.pending_cast,
            pause: self.pending_pause,
        };
        self.pending_cast = [false; Ability::COUNT];
        self.pending_pause = false;
        input
    }

    /// Latch a pause toggle from outside the keyboard (blur, resume button)
    pub fn request_pause(&mut self) {
        self.pending_pause = true;
    }

    /// Release everything (window blur, restart)
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
