//! Per-frame pose mapping
//!
//! Each demo turns a [`LandmarkFrame`] into the next state of its tracked node.
//! Frames without usable landmarks leave the previous pose untouched, which is
//! what keeps the overlay in place between detections.

use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};

use crate::bounds::Normalization;
use crate::demo::Demo;
use crate::error::TrackingError;
use crate::keys::{fingertip_point, Keyboard};
use crate::landmark::{HandLandmark, LandmarkFrame};
use crate::smooth::{lerp, map_linear, SMOOTHING_FACTOR};

/// Local offset from the face transform origin to the helmet center
pub const FACE_OFFSET: Vec3 = Vec3::new(0.0, 0.2, -0.25);

/// Wrist x to yaw gain (computer)
pub const YAW_GAIN: f32 = 4.0;
/// Wrist y to pitch gain (computer)
pub const PITCH_GAIN: f32 = 2.0;
/// Wrist x to yaw gain (city)
pub const CITY_YAW_GAIN: f32 = 2.0;

/// Pinch distances spanning the zoom range
pub const PINCH_RANGE: (f32, f32) = (0.0, 0.3);
/// Camera depths at the ends of [`PINCH_RANGE`]
pub const DEPTH_RANGE: (f32, f32) = (12.0, 3.0);
/// Camera z before any hand is seen
pub const INITIAL_CAMERA_DEPTH: f32 = 6.0;

pub const PILOT_DETECTED: &str = "JARVIS: PILOT DETECTED. SYSTEM NOMINAL.";

/// Position, rotation and uniform scale of a tracked node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: f32,
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Pose {
    pub const IDENTITY: Pose = Pose {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: 1.0,
    };

    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(Vec3::splat(self.scale), self.rotation, self.translation)
    }
}

/// Pinch distance to target camera depth (unclamped)
pub fn pinch_to_depth(pinch: f32) -> f32 {
    map_linear(pinch, PINCH_RANGE.0, PINCH_RANGE.1, DEPTH_RANGE.0, DEPTH_RANGE.1)
}

/// Helmet: anchor copies the face transform, offset in its local frame
#[derive(Debug, Clone, Default)]
pub struct FaceFollow {
    anchor: Pose,
    attached: bool,
    pilot_detected: bool,
}

impl FaceFollow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called once the helmet model exists; frames before that are ignored
    pub fn attach(&mut self) {
        self.attached = true;
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn anchor(&self) -> Pose {
        self.anchor
    }

    pub fn pilot_detected(&self) -> bool {
        self.pilot_detected
    }

    pub fn apply(&mut self, frame: &LandmarkFrame) -> Result<bool, TrackingError> {
        if !self.attached {
            return Ok(false);
        }
        let Some(matrix) = frame.first_matrix() else {
            return Ok(false);
        };
        let matrix = matrix?;

        // scale is discarded; only translation and rotation drive the anchor
        let (_, rotation, translation) = matrix.to_scale_rotation_translation();
        self.anchor.rotation = rotation;
        self.anchor.translation = translation + rotation * FACE_OFFSET;
        self.pilot_detected = true;
        Ok(true)
    }
}

/// Computer: smoothed wrist rotation, pinch zoom and key hit-testing
#[derive(Debug, Clone)]
pub struct HandOrbit {
    base: Option<Normalization>,
    /// (pitch about x, yaw about y)
    rotation: Vec2,
    camera_depth: f32,
    keyboard: Keyboard,
}

impl Default for HandOrbit {
    fn default() -> Self {
        Self::new()
    }
}

impl HandOrbit {
    pub fn new() -> Self {
        Self {
            base: None,
            rotation: Vec2::ZERO,
            camera_depth: INITIAL_CAMERA_DEPTH,
            keyboard: Keyboard::default_row(),
        }
    }

    /// Attach the loaded model's normalization; its scale is restored every frame
    pub fn attach(&mut self, normalization: Normalization) {
        self.base = Some(normalization);
    }

    pub fn is_attached(&self) -> bool {
        self.base.is_some()
    }

    pub fn rotation(&self) -> Vec2 {
        self.rotation
    }

    pub fn camera_depth(&self) -> f32 {
        self.camera_depth
    }

    pub fn keyboard(&self) -> &Keyboard {
        &self.keyboard
    }

    /// Model pose, `None` until the model is attached
    pub fn pose(&self) -> Option<Pose> {
        self.base.map(|base| Pose {
            translation: base.translation,
            rotation: Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, 0.0),
            scale: base.scale,
        })
    }

    pub fn apply(&mut self, frame: &LandmarkFrame) -> bool {
        if self.base.is_none() {
            return false;
        }
        let Some(hand) = frame.first_set() else {
            return false;
        };
        let (Some(wrist), Some(thumb), Some(index)) = (
            hand.hand(HandLandmark::Wrist),
            hand.hand(HandLandmark::ThumbTip),
            hand.hand(HandLandmark::IndexFingerTip),
        ) else {
            tracing::debug!(points = hand.len(), "Hand set too short, skipping frame");
            return false;
        };

        self.rotation.y = lerp(self.rotation.y, (wrist.x - 0.5) * YAW_GAIN, SMOOTHING_FACTOR);
        self.rotation.x = lerp(self.rotation.x, (wrist.y - 0.5) * PITCH_GAIN, SMOOTHING_FACTOR);

        let target_depth = pinch_to_depth(thumb.distance_2d(index));
        self.camera_depth = lerp(self.camera_depth, target_depth, SMOOTHING_FACTOR);

        self.keyboard.update(fingertip_point(index));
        true
    }
}

/// City: yaw follows the first wrist, two hands raise the keyboard flag
#[derive(Debug, Clone, Default)]
pub struct CityYaw {
    yaw: f32,
    dual_hand: bool,
}

impl CityYaw {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn dual_hand(&self) -> bool {
        self.dual_hand
    }

    pub fn pose(&self) -> Pose {
        Pose {
            rotation: Quat::from_rotation_y(self.yaw),
            ..Pose::IDENTITY
        }
    }

    pub fn apply(&mut self, frame: &LandmarkFrame) -> bool {
        let dual_hand = frame.set_count() >= 2;
        let mut changed = dual_hand != self.dual_hand;
        self.dual_hand = dual_hand;

        if let Some(wrist) = frame.first_set().and_then(|s| s.hand(HandLandmark::Wrist)) {
            self.yaw = lerp(self.yaw, (wrist.x - 0.5) * CITY_YAW_GAIN, SMOOTHING_FACTOR);
            changed = true;
        }
        changed
    }
}

/// The active demo's mapper
#[derive(Debug, Clone)]
pub enum Mapper {
    Helmet(FaceFollow),
    Computer(HandOrbit),
    City(CityYaw),
}

impl Mapper {
    pub fn for_demo(demo: Demo) -> Self {
        match demo {
            Demo::Helmet => Self::Helmet(FaceFollow::new()),
            Demo::Computer => Self::Computer(HandOrbit::new()),
            Demo::City => Self::City(CityYaw::new()),
        }
    }

    pub fn demo(&self) -> Demo {
        match self {
            Self::Helmet(_) => Demo::Helmet,
            Self::Computer(_) => Demo::Computer,
            Self::City(_) => Demo::City,
        }
    }

    /// Hand the normalized asset to the mapper once it has loaded
    pub fn attach_asset(&mut self, normalization: Normalization) {
        match self {
            Self::Helmet(m) => m.attach(),
            Self::Computer(m) => m.attach(normalization),
            Self::City(_) => {}
        }
    }

    /// Whether frames are being consumed yet
    pub fn is_ready(&self) -> bool {
        match self {
            Self::Helmet(m) => m.is_attached(),
            Self::Computer(m) => m.is_attached(),
            Self::City(_) => true,
        }
    }

    /// Apply one detection result; returns true when any tracked state changed
    pub fn apply(&mut self, frame: &LandmarkFrame) -> Result<bool, TrackingError> {
        match self {
            Self::Helmet(m) => m.apply(frame),
            Self::Computer(m) => Ok(m.apply(frame)),
            Self::City(m) => Ok(m.apply(frame)),
        }
    }

    /// Pose of the tracked node, `None` while its asset is still loading
    pub fn anchor_pose(&self) -> Option<Pose> {
        match self {
            Self::Helmet(m) => m.is_attached().then(|| m.anchor()),
            Self::Computer(m) => m.pose(),
            Self::City(m) => Some(m.pose()),
        }
    }

    /// Smoothed camera z (computer only)
    pub fn camera_depth(&self) -> Option<f32> {
        match self {
            Self::Computer(m) => Some(m.camera_depth()),
            _ => None,
        }
    }

    pub fn keyboard(&self) -> Option<&Keyboard> {
        match self {
            Self::Computer(m) => Some(m.keyboard()),
            _ => None,
        }
    }

    pub fn dual_hand(&self) -> bool {
        matches!(self, Self::City(m) if m.dual_hand())
    }

    pub fn status_line(&self) -> Option<&'static str> {
        match self {
            Self::Helmet(m) if m.pilot_detected() => Some(PILOT_DETECTED),
            _ => None,
        }
    }
}
