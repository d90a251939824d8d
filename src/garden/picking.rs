//! Ray hit tests against the ground and the permission plane.
//!
//! Hit points go into a `HitBuffer` owned by the caller. The buffer is
//! cleared at the start of every call and reuses its allocation.

use bevy::math::Ray3d;
use bevy::prelude::*;

use super::grid::{Tile, TileGrid};
use crate::shared::GRID_PLANE_Y;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub distance: f32,
    pub point: Vec3,
}

/// Scratch storage for hit tests, sorted nearest first after each call.
#[derive(Resource, Debug, Default)]
pub struct HitBuffer {
    hits: Vec<RayHit>,
}

impl HitBuffer {
    pub fn clear(&mut self) {
        self.hits.clear();
    }

    pub fn push(&mut self, hit: RayHit) {
        self.hits.push(hit);
        self.hits
            .sort_by(|a, b| a.distance.total_cmp(&b.distance));
    }

    pub fn nearest(&self) -> Option<&RayHit> {
        self.hits.first()
    }

    pub fn hits(&self) -> &[RayHit] {
        &self.hits
    }

    pub fn capacity(&self) -> usize {
        self.hits.capacity()
    }
}

/// Intersect `ray` with the horizontal plane at `height`, recording the hit.
fn cast_onto_plane(ray: Ray3d, height: f32, hits: &mut HitBuffer) -> Option<RayHit> {
    hits.clear();
    let distance =
        ray.intersect_plane(Vec3::new(0.0, height, 0.0), InfinitePlane3d::new(Vec3::Y))?;
    let hit = RayHit {
        distance,
        point: ray.get_point(distance),
    };
    hits.push(hit);
    Some(hit)
}

/// Where a camera ray meets the ground (`y = 0`).
pub fn ground_point(ray: Ray3d, hits: &mut HitBuffer) -> Option<Vec3> {
    cast_onto_plane(ray, 0.0, hits).map(|hit| hit.point)
}

/// Permission of the tile straight below `pos`.
///
/// Casts down onto the grid plane and only counts hits inside its
/// `width x height` extent. Anything else is the sentinel.
pub fn permission_at_ray_hit<'a>(grid: &'a TileGrid, pos: Vec3, hits: &mut HitBuffer) -> &'a Tile {
    let down = Ray3d {
        origin: pos,
        direction: Dir3::NEG_Y,
    };
    let Some(hit) = cast_onto_plane(down, GRID_PLANE_Y, hits) else {
        return TileGrid::sentinel();
    };
    let half_w = grid.width() as f32 / 2.0;
    let half_h = grid.height() as f32 / 2.0;
    if hit.point.x.abs() > half_w || hit.point.z.abs() > half_h {
        return TileGrid::sentinel();
    }
    grid.permission_at(hit.point.x, hit.point.z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::TilePermission;

    fn ray(origin: Vec3, direction: Dir3) -> Ray3d {
        Ray3d { origin, direction }
    }

    fn grid() -> TileGrid {
        let mut grid = TileGrid::new(10, 10);
        grid.fill_region(TilePermission::CROPS, 0, 0, 5, 10).unwrap();
        grid
    }

    #[test]
    fn test_ground_point_from_above() {
        let mut hits = HitBuffer::default();
        let ray = ray(Vec3::new(2.0, 10.0, -3.0), Dir3::NEG_Y);
        let point = ground_point(ray, &mut hits).unwrap();
        assert!((point - Vec3::new(2.0, 0.0, -3.0)).length() < 1e-5);
        assert_eq!(hits.hits().len(), 1);
        assert!((hits.nearest().unwrap().distance - 10.0).abs() < 1e-5);
    }

    #[test]
    fn test_ray_pointing_away_misses() {
        let mut hits = HitBuffer::default();
        let ray = ray(Vec3::new(0.0, 10.0, 0.0), Dir3::Y);
        assert_eq!(ground_point(ray, &mut hits), None);
        assert!(hits.hits().is_empty());
    }

    #[test]
    fn test_buffer_is_reused_between_calls() {
        let mut hits = HitBuffer::default();
        let ray = ray(Vec3::new(0.0, 5.0, 0.0), Dir3::NEG_Y);
        ground_point(ray, &mut hits);
        let capacity = hits.capacity();
        for _ in 0..10 {
            ground_point(ray, &mut hits);
        }
        assert_eq!(hits.hits().len(), 1, "cleared per call");
        assert_eq!(hits.capacity(), capacity);
    }

    #[test]
    fn test_permission_below_point() {
        let grid = grid();
        let mut hits = HitBuffer::default();

        let crop = permission_at_ray_hit(&grid, Vec3::new(-3.0, 0.4, 0.0), &mut hits);
        assert!(crop.croppable);
        assert!(!TileGrid::is_sentinel(crop));

        let bare = permission_at_ray_hit(&grid, Vec3::new(3.0, 0.4, 0.0), &mut hits);
        assert!(!bare.croppable);
        assert!(!TileGrid::is_sentinel(bare));
    }

    #[test]
    fn test_permission_off_plane_is_sentinel() {
        let grid = grid();
        let mut hits = HitBuffer::default();
        let outside = permission_at_ray_hit(&grid, Vec3::new(30.0, 0.4, 0.0), &mut hits);
        assert!(TileGrid::is_sentinel(outside));

        // Below the grid plane the downward ray never meets it.
        let below = permission_at_ray_hit(&grid, Vec3::new(0.0, -5.0, 0.0), &mut hits);
        assert!(TileGrid::is_sentinel(below));
    }
}
