//! HUD overlay using bevy_egui
//!
//! Clock and date, the status line, the city demo's keyboard and iris core,
//! and the computer demo's active key readout.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPrimaryContextPass};
use holohud_core::{HudClock, HudText};

use crate::tracking::{DemoState, StatusLine};
use crate::SceneConfig;

const HUD_CYAN: egui::Color32 = egui::Color32::from_rgb(0, 210, 255);
const HUD_ERROR: egui::Color32 = egui::Color32::from_rgb(255, 80, 80);

/// Hue shift and brightness applied to the iris while both hands are up
const IRIS_HUE_SHIFT_DEG: f32 = 160.0;
const IRIS_BRIGHTNESS: f32 = 1.4;

const KEYBOARD_ROWS: [&str; 3] = ["QWERTYUIOP", "ASDFGHJKL", "ZXCVBNM"];

/// Clock text plus its refresh timer
#[derive(Resource)]
pub struct HudClockState {
    pub text: HudText,
    pub timer: Timer,
}

impl FromWorld for HudClockState {
    fn from_world(world: &mut World) -> Self {
        let refresh = world.resource::<SceneConfig>().hud_refresh;
        Self {
            text: HudClock::now(),
            timer: Timer::new(refresh, TimerMode::Repeating),
        }
    }
}

pub struct HudPlugin;

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<HudClockState>()
            .add_systems(Update, tick_hud_clock)
            // bevy_egui 0.38+ draws in its own pass
            .add_systems(EguiPrimaryContextPass, hud_overlay);
    }
}

fn tick_hud_clock(time: Res<Time>, mut clock: ResMut<HudClockState>) {
    if clock.timer.tick(time.delta()).just_finished() {
        clock.text = HudClock::now();
    }
}

/// Iris core color: holographic cyan, hue-rotated and brightened for two hands
pub fn iris_color(dual_hand: bool) -> egui::Color32 {
    if !dual_hand {
        return HUD_CYAN;
    }
    let mut hsva = egui::ecolor::Hsva::from_srgb([HUD_CYAN.r(), HUD_CYAN.g(), HUD_CYAN.b()]);
    hsva.h = (hsva.h + IRIS_HUE_SHIFT_DEG / 360.0).rem_euclid(1.0);
    hsva.v = (hsva.v * IRIS_BRIGHTNESS).min(1.0);
    let [r, g, b] = hsva.to_srgb();
    egui::Color32::from_rgb(r, g, b)
}

/// Status to show: startup errors win, then the mapper's own status, then progress
fn status_text<'a>(status: &'a StatusLine, state: &DemoState) -> Option<(&'a str, bool)> {
    match (&status.message, state.mapper.status_line()) {
        (Some(message), _) if status.is_error => Some((message.as_str(), true)),
        (_, Some(line)) => Some((line, false)),
        (Some(message), None) => Some((message.as_str(), false)),
        (None, None) => None,
    }
}

fn hud_overlay(
    mut contexts: EguiContexts,
    config: Res<SceneConfig>,
    clock: Res<HudClockState>,
    state: Res<DemoState>,
    status: Res<StatusLine>,
) {
    let Ok(ctx) = contexts.ctx_mut() else { return };

    if config.demo.shows_clock() {
        egui::Area::new(egui::Id::new("hud_clock"))
            .anchor(egui::Align2::RIGHT_TOP, [-24.0, 24.0])
            .show(ctx, |ui| {
                ui.with_layout(egui::Layout::top_down(egui::Align::Max), |ui| {
                    ui.label(
                        egui::RichText::new(&clock.text.time)
                            .monospace()
                            .size(42.0)
                            .color(HUD_CYAN),
                    );
                    ui.label(egui::RichText::new(&clock.text.date).size(14.0).color(HUD_CYAN));
                });
            });
    }

    if let Some((text, is_error)) = status_text(&status, &state) {
        let color = if is_error { HUD_ERROR } else { HUD_CYAN };
        egui::Area::new(egui::Id::new("hud_status"))
            .anchor(egui::Align2::CENTER_BOTTOM, [0.0, -32.0])
            .show(ctx, |ui| {
                ui.label(egui::RichText::new(text).monospace().size(16.0).color(color));
            });
    }

    if let Some(keyboard) = state.mapper.keyboard() {
        let active = keyboard.active_labels();
        if !active.is_empty() {
            egui::Area::new(egui::Id::new("hud_keys"))
                .anchor(egui::Align2::LEFT_BOTTOM, [24.0, -24.0])
                .show(ctx, |ui| {
                    ui.label(
                        egui::RichText::new(format!("KEY {}", active.join(" ")))
                            .monospace()
                            .color(HUD_CYAN),
                    );
                });
        }
    }

    if config.demo == holohud_core::Demo::City {
        let dual_hand = state.mapper.dual_hand();
        egui::Area::new(egui::Id::new("hud_iris"))
            .anchor(egui::Align2::LEFT_TOP, [24.0, 24.0])
            .show(ctx, |ui| {
                let (rect, _) = ui.allocate_exact_size(egui::vec2(96.0, 96.0), egui::Sense::hover());
                let color = iris_color(dual_hand);
                let painter = ui.painter();
                painter.circle_stroke(rect.center(), 44.0, egui::Stroke::new(3.0, color));
                painter.circle_stroke(rect.center(), 30.0, egui::Stroke::new(1.5, color));
                painter.circle_filled(rect.center(), 12.0, color.gamma_multiply(0.6));
            });

        if dual_hand {
            egui::Area::new(egui::Id::new("hud_keyboard"))
                .anchor(egui::Align2::CENTER_BOTTOM, [0.0, -72.0])
                .show(ctx, |ui| {
                    egui::Frame::new()
                        .stroke(egui::Stroke::new(1.0, HUD_CYAN))
                        .inner_margin(12.0)
                        .show(ui, |ui| {
                            for row in KEYBOARD_ROWS {
                                ui.horizontal(|ui| {
                                    for key in row.chars() {
                                        ui.label(
                                            egui::RichText::new(key.to_string())
                                                .monospace()
                                                .size(20.0)
                                                .color(HUD_CYAN),
                                        );
                                    }
                                });
                            }
                        });
                });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use holohud_core::Demo;

    #[test]
    fn test_iris_color_shift() {
        assert_eq!(iris_color(false), HUD_CYAN);

        let shifted = iris_color(true);
        assert_ne!(shifted, HUD_CYAN);
        let base = egui::ecolor::Hsva::from_srgb([0, 210, 255]);
        let hsva = egui::ecolor::Hsva::from_srgb([shifted.r(), shifted.g(), shifted.b()]);
        let expected = (base.h + 160.0 / 360.0).rem_euclid(1.0);
        assert!((hsva.h - expected).abs() < 0.02, "hue {} vs {}", hsva.h, expected);
    }

    #[test]
    fn test_status_precedence() {
        let mut state = DemoState::new(Demo::Helmet);
        let mut status = StatusLine::default();
        assert_eq!(status_text(&status, &state), None);

        status.info("Loading face model");
        assert_eq!(status_text(&status, &state), Some(("Loading face model", false)));

        state.mapper.attach_asset(holohud_core::Normalization::from_bounds(
            &holohud_core::Bounds::new(Vec3::ZERO, Vec3::ONE),
            holohud_core::NormalizePolicy::helmet(),
        ));
        state
            .mapper
            .apply(&holohud_core::LandmarkFrame::with_matrix(&Mat4::IDENTITY))
            .unwrap();
        assert_eq!(
            status_text(&status, &state),
            Some((holohud_core::mapper::PILOT_DETECTED, false))
        );

        status.error("Camera permission denied");
        assert_eq!(status_text(&status, &state), Some(("Camera permission denied", true)));
    }
}
