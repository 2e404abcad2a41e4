//! Bevy application for the browser

use bevy::prelude::*;
use bevy_egui::EguiPlugin;
use bevy_picking::DefaultPickingPlugins;
use holohud_core::Config;
use holohud_scene::{HoloScenePlugin, SceneConfig};

use crate::page::{PageParams, CANVAS_SELECTOR};
use crate::runtime::RuntimePlugin;

/// Run the Bevy application
pub fn run() {
    let params = PageParams::from_location();
    let mut config = Config::default();
    if params.seed.is_some() {
        config.demo.city_seed = params.seed;
    }
    let demo = params.demo.unwrap_or(config.demo.kind);

    let mut scene = SceneConfig::new(demo, &config);
    if let Some(model) = params.model {
        scene = scene.with_asset_path(model);
    }
    tracing::info!(%demo, asset = ?scene.asset_path, "Starting HoloHUD");

    App::new()
        .add_plugins(DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: "HoloHUD".to_string(),
                    canvas: Some(CANVAS_SELECTOR.to_string()),
                    fit_canvas_to_parent: true,
                    prevent_default_event_handling: false,
                    // webcam shows through the canvas
                    transparent: true,
                    ..default()
                }),
                ..default()
            })
            .set(AssetPlugin {
                // models are served next to the page
                file_path: "".to_string(),
                meta_check: bevy::asset::AssetMetaCheck::Never,
                ..default()
            })
        )
        // EguiPlugin looks for PickingPlugin, so this goes first
        .add_plugins(DefaultPickingPlugins)
        .add_plugins(EguiPlugin::default())
        .add_plugins(HoloScenePlugin { config: scene })
        .add_plugins(RuntimePlugin { demo, config })
        .run();
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::app::PluginGroup;

    #[test]
    fn test_default_picking_carries_picking_plugin() {
        // the only picking the overlay needs is what bevy_egui checks for
        let group = DefaultPickingPlugins.build();
        assert!(group.contains::<bevy_picking::PickingPlugin>());
    }
}
