//! Holographic virtual keys hit-tested against the index fingertip

use glam::Vec3;

use crate::landmark::Landmark;

/// Side length of a key plane
pub const KEY_SIZE: f32 = 0.4;

/// A key is active while the fingertip is strictly closer than this
pub const ACTIVATION_RADIUS: f32 = 0.4;

pub const ACTIVE_OPACITY: f32 = 0.8;
pub const IDLE_OPACITY: f32 = 0.3;

/// Scene units spanned by the normalized image width and height
const FINGERTIP_SPAN_X: f32 = 8.0;
const FINGERTIP_SPAN_Y: f32 = 6.0;

/// Depth of the key row plane
pub const KEY_PLANE_Z: f32 = 2.0;

/// Project a normalized fingertip landmark onto the key plane
pub fn fingertip_point(tip: &Landmark) -> Vec3 {
    Vec3::new(
        (tip.x - 0.5) * FINGERTIP_SPAN_X,
        -(tip.y - 0.5) * FINGERTIP_SPAN_Y,
        KEY_PLANE_Z,
    )
}

/// A static key plane
#[derive(Debug, Clone, PartialEq)]
pub struct VirtualKey {
    pub label: String,
    pub position: Vec3,
    pub active: bool,
}

impl VirtualKey {
    pub fn new(label: impl Into<String>, position: Vec3) -> Self {
        Self {
            label: label.into(),
            position,
            active: false,
        }
    }

    pub fn opacity(&self) -> f32 {
        if self.active {
            ACTIVE_OPACITY
        } else {
            IDLE_OPACITY
        }
    }

    /// Re-evaluate activation for a fingertip point, returns true if the state flipped
    pub fn update(&mut self, point: Vec3) -> bool {
        let active = point.distance(self.position) < ACTIVATION_RADIUS;
        let changed = active != self.active;
        self.active = active;
        changed
    }
}

/// Row of virtual keys
#[derive(Debug, Clone, PartialEq)]
pub struct Keyboard {
    keys: Vec<VirtualKey>,
}

impl Default for Keyboard {
    fn default() -> Self {
        Self::default_row()
    }
}

impl Keyboard {
    pub fn new(keys: Vec<VirtualKey>) -> Self {
        Self { keys }
    }

    /// Keys A through E spaced 0.6 apart below the model
    pub fn default_row() -> Self {
        let keys = ["A", "B", "C", "D", "E"]
            .iter()
            .enumerate()
            .map(|(i, label)| {
                VirtualKey::new(*label, Vec3::new(-1.2 + i as f32 * 0.6, -1.8, KEY_PLANE_Z))
            })
            .collect();
        Self { keys }
    }

    pub fn keys(&self) -> &[VirtualKey] {
        &self.keys
    }

    /// Update every key against the fingertip, returns how many flipped
    pub fn update(&mut self, point: Vec3) -> usize {
        self.keys.iter_mut().filter_map(|key| key.update(point).then_some(())).count()
    }

    pub fn active_labels(&self) -> Vec<&str> {
        self.keys
            .iter()
            .filter(|k| k.active)
            .map(|k| k.label.as_str())
            .collect()
    }
}
