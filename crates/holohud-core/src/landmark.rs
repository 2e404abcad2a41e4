//! Landmark detection results
//!
//! The field names follow the MediaPipe Tasks Vision result objects so that a
//! `JSON.stringify`-ed `HandLandmarkerResult` or `FaceLandmarkerResult` parses
//! directly into a [`LandmarkFrame`].

use glam::Mat4;
use serde::{Deserialize, Serialize};

use crate::error::TrackingError;

/// One normalized keypoint (x, y in 0..1 image space, z relative depth)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Distance in the image plane (z ignored)
    pub fn distance_2d(&self, other: &Landmark) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Hand keypoints used by the gesture mappers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandLandmark {
    Wrist,
    ThumbTip,
    IndexFingerTip,
}

impl HandLandmark {
    /// Number of keypoints in a full hand set
    pub const COUNT: usize = 21;

    pub fn index(self) -> usize {
        match self {
            Self::Wrist => 0,
            Self::ThumbTip => 4,
            Self::IndexFingerTip => 8,
        }
    }
}

/// Ordered keypoints for one detected hand or face
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkSet(pub Vec<Landmark>);

impl LandmarkSet {
    pub fn new(points: Vec<Landmark>) -> Self {
        Self(points)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn hand(&self, landmark: HandLandmark) -> Option<&Landmark> {
        self.0.get(landmark.index())
    }
}

/// Row/column-tagged matrix as emitted by MediaPipe (column-major data)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixData {
    #[serde(default = "default_dim")]
    pub rows: u32,
    #[serde(default = "default_dim")]
    pub columns: u32,
    pub data: Vec<f32>,
}

fn default_dim() -> u32 {
    4
}

impl MatrixData {
    pub fn from_mat4(matrix: &Mat4) -> Self {
        Self {
            rows: 4,
            columns: 4,
            data: matrix.to_cols_array().to_vec(),
        }
    }

    pub fn to_mat4(&self) -> Result<Mat4, TrackingError> {
        if self.data.len() != 16 {
            return Err(TrackingError::InvalidMatrix(self.data.len()));
        }
        Ok(Mat4::from_cols_slice(&self.data))
    }
}

/// Detection result for one video frame
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LandmarkFrame {
    /// Hand sets (`landmarks`) or face meshes (`faceLandmarks`)
    #[serde(default, alias = "faceLandmarks")]
    pub landmarks: Vec<LandmarkSet>,
    /// Face transforms, present when the session was asked for them
    #[serde(default, rename = "facialTransformationMatrixes")]
    pub transformation_matrices: Vec<MatrixData>,
}

impl LandmarkFrame {
    pub fn from_json(json: &str) -> Result<Self, TrackingError> {
        serde_json::from_str(json).map_err(|e| TrackingError::Parse(e.to_string()))
    }

    /// A frame with the given landmark sets and no matrices
    pub fn with_sets(sets: Vec<LandmarkSet>) -> Self {
        Self {
            landmarks: sets,
            transformation_matrices: Vec::new(),
        }
    }

    /// A face frame carrying a single transformation matrix
    pub fn with_matrix(matrix: &Mat4) -> Self {
        Self {
            landmarks: Vec::new(),
            transformation_matrices: vec![MatrixData::from_mat4(matrix)],
        }
    }

    pub fn set_count(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty() && self.transformation_matrices.is_empty()
    }

    pub fn first_set(&self) -> Option<&LandmarkSet> {
        self.landmarks.first()
    }

    /// First transformation matrix, if any was detected
    pub fn first_matrix(&self) -> Option<Result<Mat4, TrackingError>> {
        self.transformation_matrices.first().map(MatrixData::to_mat4)
    }
}
