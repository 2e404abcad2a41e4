//! HoloHUD Scene - Bevy side of the overlay demos
//!
//! This crate owns everything drawn over the webcam feed:
//! - Per-demo camera, lights, city and virtual keys
//! - glTF loading with bounding-box normalization
//! - Copying mapper state into transforms and materials
//! - The egui HUD (clock, status line, keyboard and iris overlays)
//!
//! It never touches the camera or the detector. The host app pushes detection
//! results into [`DetectionInbox`] and they are applied once per frame.

pub mod hud;
pub mod models;
pub mod setup;
pub mod tracking;

use bevy::prelude::*;
use holohud_core::{Config, Demo};
use std::time::Duration;

pub use tracking::{DemoState, DetectionInbox, StatusLine, TrackingAnchor};

/// Demo selection and asset locations for the scene
#[derive(Debug, Clone, Resource)]
pub struct SceneConfig {
    pub demo: Demo,
    /// glTF path relative to the asset root, `None` for the city
    pub asset_path: Option<String>,
    pub city_seed: Option<u64>,
    pub hud_refresh: Duration,
}

impl SceneConfig {
    pub fn new(demo: Demo, config: &Config) -> Self {
        Self {
            demo,
            asset_path: config.assets.path_for(demo).map(str::to_string),
            city_seed: config.demo.city_seed,
            hud_refresh: Duration::from_millis(config.hud.refresh_ms),
        }
    }

    /// Replace the demo's asset (ignored for the city, which has none)
    pub fn with_asset_path(mut self, path: impl Into<String>) -> Self {
        if self.asset_path.is_some() {
            self.asset_path = Some(path.into());
        }
        self
    }
}

/// Per-frame ordering: detections land, the mapper runs, the scene copies its state
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum HoloSet {
    Detect,
    Apply,
    Sync,
}

/// Plugin that sets up the selected demo scene
pub struct HoloScenePlugin {
    pub config: SceneConfig,
}

impl Plugin for HoloScenePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.config.clone())
            .insert_resource(DemoState::new(self.config.demo))
            .configure_sets(Update, (HoloSet::Detect, HoloSet::Apply, HoloSet::Sync).chain())
            .add_plugins(setup::SceneSetupPlugin)
            .add_plugins(models::ModelsPlugin)
            .add_plugins(tracking::TrackingPlugin)
            .add_plugins(hud::HudPlugin);
    }
}
