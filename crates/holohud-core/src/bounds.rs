//! Axis-aligned bounds and asset normalization
//!
//! Loaded models come in arbitrary units and with arbitrary origins. Each demo
//! rescales its asset uniformly and recenters it so the overlay has a predictable
//! on-screen size.

use glam::{Mat4, Vec3};

/// Target x-extent for the helmet model
pub const HELMET_TARGET_WIDTH: f32 = 5.0;

/// Target largest dimension for the computer model
pub const COMPUTER_TARGET_SIZE: f32 = 3.5;

/// Helmet scale factors below this are boosted (models authored in millimeters)
pub const MILLIMETER_THRESHOLD: f32 = 100.0;

/// Boost applied below [`MILLIMETER_THRESHOLD`]
pub const MILLIMETER_BOOST: f32 = 10.0;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Bounds containing nothing; extending it with a point yields that point
    pub fn empty() -> Self {
        Self {
            min: Vec3::splat(f32::INFINITY),
            max: Vec3::splat(f32::NEG_INFINITY),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.cmpgt(self.max).any()
    }

    /// Build bounds from a point cloud, `None` if there are no points
    pub fn from_points<I: IntoIterator<Item = Vec3>>(points: I) -> Option<Self> {
        let mut bounds = Self::empty();
        for point in points {
            bounds.extend(point);
        }
        (!bounds.is_empty()).then_some(bounds)
    }

    pub fn extend(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Per-axis extent
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// The eight corners, used to carry a box through a transform
    pub fn corners(&self) -> [Vec3; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            Vec3::new(lo.x, lo.y, lo.z),
            Vec3::new(hi.x, lo.y, lo.z),
            Vec3::new(lo.x, hi.y, lo.z),
            Vec3::new(hi.x, hi.y, lo.z),
            Vec3::new(lo.x, lo.y, hi.z),
            Vec3::new(hi.x, lo.y, hi.z),
            Vec3::new(lo.x, hi.y, hi.z),
            Vec3::new(hi.x, hi.y, hi.z),
        ]
    }

    /// Axis-aligned bounds of this box after an affine transform
    pub fn transformed(&self, matrix: &Mat4) -> Bounds {
        let mut out = Bounds::empty();
        for corner in self.corners() {
            out.extend(matrix.transform_point3(corner));
        }
        out
    }
}

/// How a demo derives its scale factor from a bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NormalizePolicy {
    /// Scale the x-extent to `target_width`, boosting small factors by 10x.
    WidthWithCorrection { target_width: f32 },
    /// Scale the largest extent to `target_size`.
    MaxDimension { target_size: f32 },
}

impl NormalizePolicy {
    pub fn helmet() -> Self {
        Self::WidthWithCorrection {
            target_width: HELMET_TARGET_WIDTH,
        }
    }

    pub fn computer() -> Self {
        Self::MaxDimension {
            target_size: COMPUTER_TARGET_SIZE,
        }
    }

    /// Scale factor for a box of the given size
    pub fn scale_factor(&self, size: Vec3) -> f32 {
        match *self {
            Self::WidthWithCorrection { target_width } => {
                let scale = target_width / size.x;
                if scale < MILLIMETER_THRESHOLD {
                    scale * MILLIMETER_BOOST
                } else {
                    scale
                }
            }
            Self::MaxDimension { target_size } => target_size / size.max_element(),
        }
    }
}

/// Result of normalizing a loaded asset: uniform scale plus recentering offset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalization {
    /// Per-axis extent of the raw model
    pub size: Vec3,
    /// Center of the raw model's bounds
    pub center: Vec3,
    /// Uniform scale applied to the model (kept for per-frame scale resets)
    pub scale: f32,
    /// Position that puts the scaled bounds' center at the origin
    pub translation: Vec3,
}

impl Normalization {
    pub fn from_bounds(bounds: &Bounds, policy: NormalizePolicy) -> Self {
        let size = bounds.size();
        let center = bounds.center();
        let scale = policy.scale_factor(size);

        Self {
            size,
            center,
            scale,
            translation: -center * scale,
        }
    }

    /// False for degenerate boxes (zero extent gives an infinite or NaN scale)
    pub fn is_finite(&self) -> bool {
        self.scale.is_finite() && self.translation.is_finite()
    }

    /// Model-space point to its normalized position
    pub fn apply(&self, point: Vec3) -> Vec3 {
        point * self.scale + self.translation
    }

    /// Where the raw bounds end up after normalization
    pub fn normalized_bounds(&self, bounds: &Bounds) -> Bounds {
        Bounds::new(self.apply(bounds.min), self.apply(bounds.max))
    }

    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.translation) * Mat4::from_scale(Vec3::splat(self.scale))
    }
}
