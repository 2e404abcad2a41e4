//! Scene setup - camera, lights, city, grid and virtual keys

use bevy::prelude::*;
use bevy::render::alpha::AlphaMode;
use holohud_core::city::{self, box_edges, grid_lines, CityLayout};
use holohud_core::keys::{Keyboard, KEY_SIZE};
use holohud_core::mapper::INITIAL_CAMERA_DEPTH;
use holohud_core::Demo;

use crate::models::ModelRoot;
use crate::tracking::TrackingAnchor;
use crate::SceneConfig;

/// Holographic cyan used for keys, buildings and lights
pub const HOLO_CYAN: Color = Color::srgb(0.0, 210.0 / 255.0, 1.0);
const GRID_DARK: Color = Color::srgb(0.0, 0x22 as f32 / 255.0, 0x33 as f32 / 255.0);

const LINE_THICKNESS: f32 = 0.02;
const BUILDING_OPACITY: f32 = 0.25;

/// Marker component for the main camera
#[derive(Component)]
pub struct MainCamera;

/// Virtual key plane, `index` into the mapper's keyboard
#[derive(Component)]
pub struct KeyPlane {
    pub index: usize,
}

/// Marker for ground grid lines
#[derive(Component)]
pub struct GridLine;

/// Marker for building edges
#[derive(Component)]
pub struct BuildingEdge;

pub struct SceneSetupPlugin;

impl Plugin for SceneSetupPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(Color::NONE))
            .add_systems(Startup, setup_scene);
    }
}

/// Where the camera starts for each demo
pub fn camera_start(demo: Demo) -> Vec3 {
    match demo {
        Demo::Helmet => Vec3::ZERO,
        Demo::Computer => Vec3::new(0.0, 0.0, INITIAL_CAMERA_DEPTH),
        Demo::City => Vec3::new(0.0, 5.0, 12.0),
    }
}

fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    config: Res<SceneConfig>,
) {
    let demo = config.demo;

    // Camera looks down -z like the video frame; nothing is drawn behind the overlay
    commands.spawn((
        Camera3d::default(),
        Camera {
            clear_color: ClearColorConfig::Custom(Color::NONE),
            ..default()
        },
        Projection::Perspective(PerspectiveProjection {
            fov: 50f32.to_radians(),
            near: 0.1,
            far: 1000.0,
            ..default()
        }),
        Transform::from_translation(camera_start(demo)),
        MainCamera,
    ));

    let ambient = match demo {
        Demo::Helmet => 2.5,
        Demo::Computer | Demo::City => 1.2,
    };
    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: ambient * 400.0,
        ..default()
    });

    match demo {
        Demo::Helmet => {
            commands
                .spawn((Transform::default(), Visibility::default(), TrackingAnchor))
                .with_children(|anchor| {
                    anchor.spawn((Transform::default(), Visibility::Hidden, ModelRoot));
                });
        }
        Demo::Computer => {
            commands.spawn((
                DirectionalLight {
                    color: HOLO_CYAN,
                    illuminance: 4000.0,
                    ..default()
                },
                Transform::from_xyz(5.0, 10.0, 7.0).looking_at(Vec3::ZERO, Vec3::Y),
            ));
            // the normalized model root is itself the tracked node
            commands.spawn((Transform::default(), Visibility::Hidden, TrackingAnchor, ModelRoot));
            spawn_keyboard(&mut commands, &mut meshes, &mut materials, &Keyboard::default_row());
        }
        Demo::City => {
            spawn_grid(&mut commands, &mut meshes, &mut materials);
            let layout = CityLayout::generate(config.city_seed);
            spawn_city(&mut commands, &mut meshes, &mut materials, &layout);
        }
    }

    tracing::info!(demo = %demo, "Scene ready");
}

fn spawn_keyboard(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    keyboard: &Keyboard,
) {
    let plane = meshes.add(Rectangle::new(KEY_SIZE, KEY_SIZE));

    for (index, key) in keyboard.keys().iter().enumerate() {
        // one material per key so each can fade on its own
        let material = materials.add(StandardMaterial {
            base_color: HOLO_CYAN.with_alpha(key.opacity()),
            unlit: true,
            alpha_mode: AlphaMode::Blend,
            double_sided: true,
            cull_mode: None,
            ..default()
        });
        commands.spawn((
            Mesh3d(plane.clone()),
            MeshMaterial3d(material),
            Transform::from_translation(key.position),
            KeyPlane { index },
            Name::new(format!("key {}", key.label)),
        ));
    }
}

/// Thin cuboid standing in for a line segment (axis-aligned segments only)
fn segment_cuboid(a: Vec3, b: Vec3) -> (Cuboid, Vec3) {
    let extent = (b - a).abs().max(Vec3::splat(LINE_THICKNESS));
    (Cuboid::from_size(extent), (a + b) / 2.0)
}

fn spawn_grid(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) {
    let line_material = |color: Color| StandardMaterial {
        base_color: color,
        unlit: true,
        ..default()
    };
    let center = materials.add(line_material(HOLO_CYAN));
    let dark = materials.add(line_material(GRID_DARK));

    let lines = grid_lines(city::GRID_SIZE, city::GRID_DIVISIONS);
    // every line has one of two shapes, along x or along z
    let along_x = meshes.add(segment_cuboid(lines[0].0[0], lines[0].0[1]).0);
    let along_z = meshes.add(segment_cuboid(lines[1].0[0], lines[1].0[1]).0);

    for (i, ([a, b], is_center)) in lines.into_iter().enumerate() {
        let mesh = if i % 2 == 0 { along_x.clone() } else { along_z.clone() };
        let material = if is_center { center.clone() } else { dark.clone() };
        commands.spawn((
            Mesh3d(mesh),
            MeshMaterial3d(material),
            Transform::from_translation((a + b) / 2.0),
            GridLine,
        ));
    }
}

fn spawn_city(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    layout: &CityLayout,
) {
    let material = materials.add(StandardMaterial {
        base_color: HOLO_CYAN.with_alpha(BUILDING_OPACITY),
        unlit: true,
        alpha_mode: AlphaMode::Blend,
        ..default()
    });

    commands
        .spawn((Transform::default(), Visibility::default(), TrackingAnchor, Name::new("city")))
        .with_children(|group| {
            for building in layout.buildings() {
                for [a, b] in box_edges(&building.bounds()) {
                    let (cuboid, center) = segment_cuboid(a, b);
                    group.spawn((
                        Mesh3d(meshes.add(cuboid)),
                        MeshMaterial3d(material.clone()),
                        Transform::from_translation(center),
                        BuildingEdge,
                    ));
                }
            }
        });

    tracing::debug!(buildings = layout.buildings().len(), extent = ?layout.bounds(), "City generated");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_cuboid() {
        let (cuboid, center) = segment_cuboid(Vec3::new(-1.0, 0.0, 2.0), Vec3::new(1.0, 0.0, 2.0));
        assert_eq!(center, Vec3::new(0.0, 0.0, 2.0));
        assert_eq!(cuboid.size(), Vec3::new(2.0, LINE_THICKNESS, LINE_THICKNESS));
    }

    #[test]
    fn test_camera_start() {
        assert_eq!(camera_start(Demo::Computer).z, 6.0);
        assert_eq!(camera_start(Demo::City), Vec3::new(0.0, 5.0, 12.0));
    }
}
