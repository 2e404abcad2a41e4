//! Procedural wireframe city

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::bounds::Bounds;

pub const BUILDING_COUNT: usize = 70;
/// Buildings are scattered over a square of this side, centered on the origin
pub const CITY_EXTENT: f32 = 25.0;
/// Square footprint of every building
pub const BUILDING_FOOTPRINT: f32 = 0.5;
pub const MIN_HEIGHT: f32 = 1.0;
pub const MAX_HEIGHT: f32 = 4.0;

/// Ground grid side length and line count per axis
pub const GRID_SIZE: f32 = 30.0;
pub const GRID_DIVISIONS: u32 = 30;

/// One building box standing on the ground plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Building {
    /// Box center (y is half the height)
    pub position: Vec3,
    pub height: f32,
}

impl Building {
    pub fn new(x: f32, z: f32, height: f32) -> Self {
        Self {
            position: Vec3::new(x, height / 2.0, z),
            height,
        }
    }

    pub fn bounds(&self) -> Bounds {
        let half = Vec3::new(BUILDING_FOOTPRINT, self.height, BUILDING_FOOTPRINT) / 2.0;
        Bounds::new(self.position - half, self.position + half)
    }
}

/// Building placement for the city demo
#[derive(Debug, Clone, PartialEq)]
pub struct CityLayout {
    buildings: Vec<Building>,
}

impl CityLayout {
    pub fn generate(seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let buildings = (0..BUILDING_COUNT)
            .map(|_| {
                let height = rng.gen_range(MIN_HEIGHT..MAX_HEIGHT);
                let x = (rng.gen::<f32>() - 0.5) * CITY_EXTENT;
                let z = (rng.gen::<f32>() - 0.5) * CITY_EXTENT;
                Building::new(x, z, height)
            })
            .collect();
        Self { buildings }
    }

    pub fn buildings(&self) -> &[Building] {
        &self.buildings
    }

    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(self.buildings.iter().flat_map(|b| b.bounds().corners()))
    }
}

/// The 12 edges of a box as line segments
pub fn box_edges(bounds: &Bounds) -> [[Vec3; 2]; 12] {
    let c = bounds.corners();
    // corner index bits: x = 1, y = 2, z = 4
    [
        [c[0], c[1]],
        [c[2], c[3]],
        [c[4], c[5]],
        [c[6], c[7]],
        [c[0], c[2]],
        [c[1], c[3]],
        [c[4], c[6]],
        [c[5], c[7]],
        [c[0], c[4]],
        [c[1], c[5]],
        [c[2], c[6]],
        [c[3], c[7]],
    ]
}

/// Ground grid on the xz plane; the flag marks the two center lines
pub fn grid_lines(size: f32, divisions: u32) -> Vec<([Vec3; 2], bool)> {
    let half = size / 2.0;
    let step = size / divisions as f32;
    let center = divisions / 2;
    (0..=divisions)
        .flat_map(|i| {
            let k = -half + i as f32 * step;
            let is_center = divisions % 2 == 0 && i == center;
            [
                ([Vec3::new(-half, 0.0, k), Vec3::new(half, 0.0, k)], is_center),
                ([Vec3::new(k, 0.0, -half), Vec3::new(k, 0.0, half)], is_center),
            ]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_within_extent() {
        let city = CityLayout::generate(Some(7));
        assert_eq!(city.buildings().len(), BUILDING_COUNT);

        for b in city.buildings() {
            assert!((MIN_HEIGHT..MAX_HEIGHT).contains(&b.height));
            assert!(b.position.x.abs() <= CITY_EXTENT / 2.0);
            assert!(b.position.z.abs() <= CITY_EXTENT / 2.0);
            // standing on the ground
            assert!(b.bounds().min.y.abs() < 1e-6);
        }
    }

    #[test]
    fn test_layout_bounds_cover_buildings() {
        let city = CityLayout::generate(Some(3));
        let bounds = city.bounds().unwrap();
        assert!(bounds.min.y.abs() < 1e-6);
        for b in city.buildings() {
            let own = b.bounds();
            assert!(own.min.cmpge(bounds.min).all() && own.max.cmple(bounds.max).all());
        }
        assert!(bounds.max.y <= MAX_HEIGHT);
    }

    #[test]
    fn test_seeded_layout_repeats() {
        assert_eq!(CityLayout::generate(Some(42)), CityLayout::generate(Some(42)));
        assert_ne!(CityLayout::generate(Some(1)), CityLayout::generate(Some(2)));
    }

    #[test]
    fn test_box_edges_have_axis_lengths() {
        let bounds = Building::new(0.0, 0.0, 2.0).bounds();
        let mut lengths: Vec<f32> = box_edges(&bounds)
            .iter()
            .map(|[a, b]| a.distance(*b))
            .collect();
        lengths.sort_by(|a, b| a.total_cmp(b));
        assert_eq!(&lengths[..8], &[0.5; 8]);
        assert_eq!(&lengths[8..], &[2.0; 4]);
    }

    #[test]
    fn test_grid_lines() {
        let lines = grid_lines(GRID_SIZE, GRID_DIVISIONS);
        assert_eq!(lines.len(), 62);
        let centers: Vec<_> = lines.iter().filter(|(_, c)| *c).collect();
        assert_eq!(centers.len(), 2);
        assert_eq!(centers[0].0, [Vec3::new(-15.0, 0.0, 0.0), Vec3::new(15.0, 0.0, 0.0)]);
    }
}
