//! glTF loading and scale normalization
//!
//! The asset is loaded once, spawned under [`ModelRoot`] and kept hidden until
//! its meshes are available. Bounds are then measured in the model root's local
//! space and turned into a [`Normalization`] for the demo's policy.

use bevy::asset::LoadState;
use bevy::gltf::Gltf;
use bevy::prelude::*;
use bevy::render::alpha::AlphaMode;
use bevy::camera::primitives::MeshAabb;
use holohud_core::{Bounds, Demo, Normalization};

use crate::tracking::{DemoState, StatusLine};
use crate::{HoloSet, SceneConfig};

/// Emissive strength of textured parts of the computer model
const HOLO_EMISSIVE_INTENSITY: f32 = 1.2;

/// Entity the loaded scene is spawned under; carries the normalization
#[derive(Component)]
pub struct ModelRoot;

/// Progress of the demo's asset
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ModelPhase {
    /// No asset for this demo
    #[default]
    None,
    Loading,
    /// Scene spawned, waiting for mesh data to measure
    Spawned(Entity),
    Ready(Normalization),
    Failed,
}

#[derive(Resource, Default)]
pub struct ModelLoad {
    pub path: Option<String>,
    pub handle: Option<Handle<Gltf>>,
    pub phase: ModelPhase,
}

pub struct ModelsPlugin;

impl Plugin for ModelsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ModelLoad>()
            .add_systems(Startup, start_model_load)
            .add_systems(
                Update,
                (spawn_loaded_model, normalize_model)
                    .chain()
                    .before(HoloSet::Apply),
            );
    }
}

fn start_model_load(
    config: Res<SceneConfig>,
    asset_server: Res<AssetServer>,
    mut model: ResMut<ModelLoad>,
) {
    let Some(path) = config.asset_path.clone() else {
        return;
    };
    tracing::info!(path = %path, "Loading model");
    model.handle = Some(asset_server.load::<Gltf>(path.clone()));
    model.path = Some(path);
    model.phase = ModelPhase::Loading;
}

/// Once the glTF is loaded, spawn its default (or first) scene under the model root
fn spawn_loaded_model(
    mut commands: Commands,
    mut model: ResMut<ModelLoad>,
    mut status: ResMut<StatusLine>,
    asset_server: Res<AssetServer>,
    gltf_assets: Res<Assets<Gltf>>,
    roots: Query<Entity, With<ModelRoot>>,
) {
    if model.phase != ModelPhase::Loading {
        return;
    }
    let Some(handle) = model.handle.clone() else {
        return;
    };
    let path = model.path.clone().unwrap_or_default();

    match asset_server.get_load_state(handle.id()) {
        Some(LoadState::Loaded) => {
            let Some(gltf) = gltf_assets.get(&handle) else {
                return;
            };
            let Some(scene) = gltf.default_scene.clone().or_else(|| gltf.scenes.first().cloned()) else {
                tracing::error!(path = %path, "Model has no scenes");
                status.error(format!("Model {} has no scenes", path));
                model.phase = ModelPhase::Failed;
                return;
            };
            let Ok(root) = roots.single() else {
                tracing::error!("No model root in the scene");
                model.phase = ModelPhase::Failed;
                return;
            };
            let scene_entity = commands.spawn(SceneRoot(scene)).id();
            commands.entity(root).add_child(scene_entity);
            model.phase = ModelPhase::Spawned(scene_entity);
        }
        Some(LoadState::Failed(e)) => {
            tracing::error!(path = %path, "Failed to load model: {}", e);
            status.error(format!("Failed to load model {}", path));
            model.phase = ModelPhase::Failed;
        }
        _ => {
            // Still loading
        }
    }
}

/// Accumulate mesh AABBs below `entity`, in the space `parent` maps into
fn collect_bounds(
    entity: Entity,
    parent: Mat4,
    children_query: &Query<&Children>,
    transforms: &Query<&Transform, Without<ModelRoot>>,
    mesh_query: &Query<&Mesh3d>,
    mesh_assets: &Assets<Mesh>,
    bounds: &mut Bounds,
    pending: &mut bool,
) {
    let local = transforms
        .get(entity)
        .map(|t| Mat4::from_scale_rotation_translation(t.scale, t.rotation, t.translation))
        .unwrap_or(Mat4::IDENTITY);
    let matrix = parent * local;

    if let Ok(mesh_handle) = mesh_query.get(entity) {
        match mesh_assets.get(&mesh_handle.0) {
            Some(mesh) => {
                if let Some(aabb) = mesh.compute_aabb() {
                    let center = Vec3::from(aabb.center);
                    let half = Vec3::from(aabb.half_extents);
                    let mesh_bounds = Bounds::new(center - half, center + half).transformed(&matrix);
                    *bounds = bounds.union(&mesh_bounds);
                }
            }
            None => *pending = true,
        }
    }

    if let Ok(children) = children_query.get(entity) {
        for child in children.iter() {
            collect_bounds(child, matrix, children_query, transforms, mesh_query, mesh_assets, bounds, pending);
        }
    }
}

/// See-through, two-sided finish for the computer model; textured parts glow in their own color
pub fn apply_hologram_finish(material: &mut StandardMaterial) {
    material.alpha_mode = AlphaMode::Blend;
    material.double_sided = true;
    material.cull_mode = None;
    if material.base_color_texture.is_some() {
        material.emissive = material.base_color.to_linear() * HOLO_EMISSIVE_INTENSITY;
    }
}

fn collect_materials(
    entity: Entity,
    children_query: &Query<&Children>,
    material_query: &Query<&MeshMaterial3d<StandardMaterial>>,
    handles: &mut Vec<Handle<StandardMaterial>>,
) {
    if let Ok(material) = material_query.get(entity) {
        if !handles.contains(&material.0) {
            handles.push(material.0.clone());
        }
    }
    if let Ok(children) = children_query.get(entity) {
        for child in children.iter() {
            collect_materials(child, children_query, material_query, handles);
        }
    }
}

fn normalize_model(
    config: Res<SceneConfig>,
    mut model: ResMut<ModelLoad>,
    mut state: ResMut<DemoState>,
    meshes: Res<Assets<Mesh>>,
    children_query: Query<&Children>,
    transforms: Query<&Transform, Without<ModelRoot>>,
    mesh_query: Query<&Mesh3d>,
    material_query: Query<&MeshMaterial3d<StandardMaterial>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut roots: Query<(&mut Transform, &mut Visibility), With<ModelRoot>>,
) {
    let ModelPhase::Spawned(scene_entity) = model.phase else {
        return;
    };
    let Some(policy) = config.demo.normalize_policy() else {
        return;
    };

    let mut bounds = Bounds::empty();
    let mut pending = false;
    collect_bounds(
        scene_entity,
        Mat4::IDENTITY,
        &children_query,
        &transforms,
        &mesh_query,
        &meshes,
        &mut bounds,
        &mut pending,
    );
    // scene not instantiated yet, or mesh data still streaming in
    if pending || bounds.is_empty() {
        return;
    }

    let normalization = Normalization::from_bounds(&bounds, policy);
    if !normalization.is_finite() {
        tracing::warn!(size = ?normalization.size, "Model has a degenerate bounding box, scale is not finite");
    }
    tracing::info!(
        demo = %config.demo,
        scale = normalization.scale,
        size = ?normalization.size,
        "Model normalized"
    );

    if let Ok((mut transform, mut visibility)) = roots.single_mut() {
        if config.demo == Demo::Helmet {
            // helmet normalization lives on the child of the face anchor
            *transform = Transform::from_translation(normalization.translation)
                .with_scale(Vec3::splat(normalization.scale));
        }
        *visibility = Visibility::Inherited;
    }

    if config.demo == Demo::Computer {
        let mut handles = Vec::new();
        collect_materials(scene_entity, &children_query, &material_query, &mut handles);
        for handle in &handles {
            if let Some(material) = materials.get_mut(handle) {
                apply_hologram_finish(material);
            }
        }
        tracing::debug!(materials = handles.len(), "Hologram finish applied");
    }

    state.mapper.attach_asset(normalization);
    model.phase = ModelPhase::Ready(normalization);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hologram_finish_untextured() {
        let mut material = StandardMaterial {
            base_color: Color::srgb(0.2, 0.4, 0.6),
            ..default()
        };
        apply_hologram_finish(&mut material);

        assert!(matches!(material.alpha_mode, AlphaMode::Blend));
        assert!(material.double_sided);
        assert!(material.cull_mode.is_none());
        // no texture, no glow
        assert_eq!(material.emissive, LinearRgba::BLACK);
    }

    #[test]
    fn test_hologram_finish_textured_glows() {
        let base_color = Color::srgb(0.2, 0.4, 0.6);
        let mut material = StandardMaterial {
            base_color,
            base_color_texture: Some(Handle::default()),
            ..default()
        };
        apply_hologram_finish(&mut material);

        let expected = base_color.to_linear();
        assert!((material.emissive.red - expected.red * 1.2).abs() < 1e-6);
        assert!((material.emissive.green - expected.green * 1.2).abs() < 1e-6);
        assert!((material.emissive.blue - expected.blue * 1.2).abs() < 1e-6);
    }
}
