//! Heads-up display
//!
//! `HudSnapshot` is a read-only view of the numbers the page shows, taken
//! once per frame. On wasm, `HudView` writes it into the DOM. Missing
//! elements are skipped, so the game runs fine against a bare page.

use crate::sim::{Ability, GamePhase, GameState};
use crate::tuning::Tuning;

/// Displayed values, all percentages in 0..=100
#[derive(Debug, Clone, PartialEq)]
pub struct HudSnapshot {
    pub health_percent: f32,
    pub energy_percent: f32,
    /// Remaining cooldown per ability, indexed by `Ability::index()`
    pub cooldown_percent: [f32; Ability::COUNT],
    pub kills: u32,
    pub time: f32,
    pub paused: bool,
    pub game_over: bool,
}

/// Overlay visibility changes between two snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OverlayChanges {
    /// `Some(shown)` when the pause/controls panel must change
    pub controls: Option<bool>,
    /// `Some(shown)` when the game-over panel must change
    pub game_over: Option<bool>,
}

fn percent(value: f32, max: f32) -> f32 {
    if max <= 0.0 {
        return 0.0;
    }
    (value * 100.0 / max).clamp(0.0, 100.0)
}

impl HudSnapshot {
    pub fn from_state(state: &GameState, tuning: &Tuning) -> Self {
        let player = &state.player;
        let mut cooldown_percent = [0.0; Ability::COUNT];
        for ability in Ability::ALL {
            cooldown_percent[ability.index()] = player.cooldown_percent(ability, tuning.abilities.get(ability));
        }

        Self {
            health_percent: percent(player.health, tuning.player.max_health),
            energy_percent: percent(player.energy, tuning.player.max_energy),
            cooldown_percent,
            kills: state.kills,
            time: state.time,
            paused: state.phase == GamePhase::Paused,
            game_over: state.phase == GamePhase::GameOver,
        }
    }

    /// Which overlays need toggling since `previous` (everything on first frame)
    pub fn overlay_changes(&self, previous: Option<&HudSnapshot>) -> OverlayChanges {
        let changed = |now: bool, before: Option<bool>| (before != Some(now)).then_some(now);
        OverlayChanges {
            controls: match previous {
                // Leave the startup controls panel alone until the first pause
                None => None,
                Some(prev) => changed(self.paused, Some(prev.paused)),
            },
            game_over: changed(self.game_over, previous.map(|p| p.game_over)),
        }
    }
}

/// Writes snapshots into the page, touching overlays only when they change
#[derive(Debug, Default)]
pub struct HudView {
    last: Option<HudSnapshot>,
}

impl HudView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the last snapshot (after restart)
    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(target_arch = "wasm32")]
mod dom {
    use super::*;
    use web_sys::Document;

    fn set_width(document: &Document, id: &str, pct: f32) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("style", &format!("width: {:.1}%", pct));
        }
    }

    fn set_text(document: &Document, selector: &str, text: &str) {
        if let Some(el) = document.query_selector(selector).ok().flatten() {
            el.set_text_content(Some(text));
        }
    }

    pub(super) fn set_hidden(document: &Document, id: &str, hidden: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.class_list().toggle_with_force("hidden", hidden);
        }
    }

    impl HudView {
        /// Push a snapshot into the DOM
        pub fn apply(&mut self, document: &Document, snapshot: &HudSnapshot, fps: Option<u32>) {
            set_width(document, "health-fill", snapshot.health_percent);
            set_width(document, "energy-fill", snapshot.energy_percent);

            for ability in Ability::ALL {
                let selector = format!("#{} .cooldown", ability.dom_id());
                if let Some(el) = document.query_selector(&selector).ok().flatten() {
                    let pct = snapshot.cooldown_percent[ability.index()];
                    let _ = el.set_attribute("style", &format!("height: {:.1}%", pct));
                }
            }

            set_text(document, "#hud-kills .hud-value", &snapshot.kills.to_string());
            if let Some(fps) = fps {
                set_text(document, "#hud-fps .hud-value", &fps.to_string());
            }

            let changes = snapshot.overlay_changes(self.last.as_ref());
            if let Some(shown) = changes.controls {
                set_hidden(document, "controls-info", !shown);
            }
            if let Some(shown) = changes.game_over {
                set_hidden(document, "game-over", !shown);
                if shown {
                    set_text(document, "#final-kills", &snapshot.kills.to_string());
                    set_text(document, "#final-time", &format!("{:.0}s", snapshot.time));
                }
            }

            self.last = Some(snapshot.clone());
        }
    }

    /// Show or hide the controls panel directly (startup hint, close button)
    pub fn show_controls(document: &Document, shown: bool) {
        set_hidden(document, "controls-info", !shown);
    }

    /// Show or hide the FPS counter
    pub fn show_fps(document: &Document, shown: bool) {
        set_hidden(document, "hud-fps", !shown);
    }
}

#[cfg(target_arch = "wasm32")]
pub use dom::{show_controls, show_fps};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_percentages() {
        let tuning = Tuning::default();
        let mut state = GameState::new(1, &tuning);
        state.player.health = 25.0;
        state.player.energy = 60.0;
        state.player.cooldowns[Ability::Hypnosis.index()] = 2.5;

        let hud = HudSnapshot::from_state(&state, &tuning);
        assert_eq!(hud.health_percent, 25.0);
        assert_eq!(hud.energy_percent, 60.0);
        assert_eq!(hud.cooldown_percent[Ability::Hypnosis.index()], 50.0);
        assert_eq!(hud.cooldown_percent[Ability::ShadowBall.index()], 0.0);
        assert!(!hud.paused && !hud.game_over);
    }

    #[test]
    fn test_overlays_first_frame() {
        let tuning = Tuning::default();
        let state = GameState::new(1, &tuning);
        let hud = HudSnapshot::from_state(&state, &tuning);
        let changes = hud.overlay_changes(None);
        assert_eq!(changes.controls, None);
        assert_eq!(changes.game_over, Some(false));
    }

    #[test]
    fn test_overlays_only_on_transition() {
        let tuning = Tuning::default();
        let mut state = GameState::new(1, &tuning);
        let playing = HudSnapshot::from_state(&state, &tuning);

        state.phase = GamePhase::Paused;
        let paused = HudSnapshot::from_state(&state, &tuning);
        let changes = paused.overlay_changes(Some(&playing));
        assert_eq!(changes.controls, Some(true));
        assert_eq!(changes.game_over, None);

        assert_eq!(paused.overlay_changes(Some(&paused)), OverlayChanges::default());

        state.phase = GamePhase::GameOver;
        let over = HudSnapshot::from_state(&state, &tuning);
        let changes = over.overlay_changes(Some(&paused));
        assert_eq!(changes.controls, Some(false));
        assert_eq!(changes.game_over, Some(true));
    }
}
