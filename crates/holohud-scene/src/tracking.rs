//! Detection results to scene state

use bevy::prelude::*;
use holohud_core::{Demo, LandmarkFrame, Mapper};

use crate::setup::{KeyPlane, MainCamera};
use crate::HoloSet;

/// Container transform overwritten from the mapper's pose each frame
#[derive(Component)]
pub struct TrackingAnchor;

/// Detection results waiting to be applied, filled by the host app
#[derive(Resource, Debug, Default)]
pub struct DetectionInbox {
    frames: Vec<LandmarkFrame>,
}

impl DetectionInbox {
    pub fn push(&mut self, frame: LandmarkFrame) {
        self.frames.push(frame);
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = LandmarkFrame> + '_ {
        self.frames.drain(..)
    }
}

/// The running demo's mapper
#[derive(Resource, Debug)]
pub struct DemoState {
    pub mapper: Mapper,
}

impl DemoState {
    pub fn new(demo: Demo) -> Self {
        Self {
            mapper: Mapper::for_demo(demo),
        }
    }
}

/// Startup progress and failures shown on the HUD status line
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct StatusLine {
    pub message: Option<String>,
    pub is_error: bool,
}

impl StatusLine {
    pub fn info(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
        self.is_error = false;
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
        self.is_error = true;
    }

    pub fn clear(&mut self) {
        self.message = None;
        self.is_error = false;
    }
}

pub struct TrackingPlugin;

impl Plugin for TrackingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DetectionInbox>()
            .init_resource::<StatusLine>()
            .add_systems(Update, apply_detections.in_set(HoloSet::Apply))
            .add_systems(
                Update,
                (sync_anchor, sync_camera_depth, sync_key_materials).in_set(HoloSet::Sync),
            );
    }
}

/// Run the mapper over every queued detection; failures keep the previous pose
fn apply_detections(mut inbox: ResMut<DetectionInbox>, mut state: ResMut<DemoState>) {
    if inbox.is_empty() {
        return;
    }
    for frame in inbox.drain() {
        if let Err(e) = state.mapper.apply(&frame) {
            tracing::warn!("Skipping detection: {}", e);
        }
    }
}

fn sync_anchor(state: Res<DemoState>, mut anchors: Query<&mut Transform, With<TrackingAnchor>>) {
    if !state.is_changed() {
        return;
    }
    let Some(pose) = state.mapper.anchor_pose() else {
        return;
    };
    for mut transform in anchors.iter_mut() {
        transform.translation = pose.translation;
        transform.rotation = pose.rotation;
        transform.scale = Vec3::splat(pose.scale);
    }
}

fn sync_camera_depth(state: Res<DemoState>, mut cameras: Query<&mut Transform, With<MainCamera>>) {
    if !state.is_changed() {
        return;
    }
    let Some(depth) = state.mapper.camera_depth() else {
        return;
    };
    if let Ok(mut transform) = cameras.single_mut() {
        transform.translation.z = depth;
    }
}

fn sync_key_materials(
    state: Res<DemoState>,
    keys: Query<(&KeyPlane, &MeshMaterial3d<StandardMaterial>)>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    if !state.is_changed() {
        return;
    }
    let Some(keyboard) = state.mapper.keyboard() else {
        return;
    };
    for (plane, material) in keys.iter() {
        let Some(key) = keyboard.keys().get(plane.index) else {
            continue;
        };
        if let Some(material) = materials.get_mut(&material.0) {
            let color = material.base_color.to_srgba();
            material.base_color = Color::srgba(color.red, color.green, color.blue, key.opacity());
        }
    }
}
