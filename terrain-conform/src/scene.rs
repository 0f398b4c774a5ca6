/// Path surface geometry answering vertical ray queries
use crate::snapper::SurfaceQuery;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// A solid piece of path geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PathSurface {
    /// Axis-aligned box, e.g. a road deck or bridge slab.
    Slab { min: Vec3, max: Vec3 },
    /// Single triangle of a road mesh; both faces are solid.
    Triangle { vertices: [Vec3; 3] },
}

impl PathSurface {
    /// Ray parameter of the nearest intersection at or in front of `origin`
    pub fn intersect(&self, origin: Vec3, direction: Vec3) -> Option<f32> {
        match self {
            PathSurface::Slab { min, max } => ray_aabb_hit_t(origin, direction, *min, *max),
            PathSurface::Triangle { vertices } => ray_triangle_hit_t(origin, direction, vertices),
        }
    }
}

/// Collection of path surfaces; the terrain itself is never part of it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathScene {
    pub surfaces: Vec<PathSurface>,
}

impl PathScene {
    pub fn new(surfaces: Vec<PathSurface>) -> Self {
        Self { surfaces }
    }
}

impl SurfaceQuery for PathScene {
    fn cast(&self, origin: Vec3, direction: Vec3) -> Option<f32> {
        let t = self
            .surfaces
            .iter()
            .filter_map(|surface| surface.intersect(origin, direction))
            .min_by(f32::total_cmp)?;
        Some((origin + direction * t).y)
    }
}

// Slab-method ray–AABB intersection, returns the entry t or None
pub fn ray_aabb_hit_t(ray_origin: Vec3, ray_direction: Vec3, min: Vec3, max: Vec3) -> Option<f32> {
    let mut t_near = f32::NEG_INFINITY;
    let mut t_far = f32::INFINITY;

    for axis in 0..3 {
        let (o, d) = (ray_origin[axis], ray_direction[axis]);
        let (lo, hi) = (min[axis], max[axis]);
        if d == 0.0 {
            // Parallel to this slab: must already be inside it.
            if o < lo || o > hi {
                return None;
            }
            continue;
        }

        let (mut t0, mut t1) = ((lo - o) / d, (hi - o) / d);
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        t_near = t_near.max(t0);
        t_far = t_far.min(t1);
        if t_near > t_far {
            return None;
        }
    }

    // Rays starting inside the box pass through it, like solid colliders.
    (t_near >= 0.0).then_some(t_near)
}

/// Möller–Trumbore ray–triangle intersection, double sided
pub fn ray_triangle_hit_t(ray_origin: Vec3, ray_direction: Vec3, vertices: &[Vec3; 3]) -> Option<f32> {
    const EPSILON: f32 = 1e-7;
    let [a, b, c] = *vertices;
    let edge1 = b - a;
    let edge2 = c - a;

    let p = ray_direction.cross(edge2);
    let det = edge1.dot(p);
    if det.abs() < EPSILON {
        return None;
    }
    let inv_det = 1.0 / det;

    let s = ray_origin - a;
    let u = s.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = ray_direction.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(q) * inv_det;
    (t >= 0.0).then_some(t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn slab(y: f32) -> PathSurface {
        PathSurface::Slab {
            min: Vec3::new(0.0, y - 0.5, 0.0),
            max: Vec3::new(10.0, y, 2.0),
        }
    }

    #[test]
    fn downward_ray_hits_slab_top() {
        let scene = PathScene::new(vec![slab(4.0)]);
        let hit = scene.cast(Vec3::new(5.0, 20.0, 1.0), Vec3::NEG_Y).unwrap();
        assert_relative_eq!(hit, 4.0);
        assert!(scene.cast(Vec3::new(5.0, 20.0, 3.0), Vec3::NEG_Y).is_none());
    }

    #[test]
    fn nearest_of_stacked_surfaces_is_returned() {
        let scene = PathScene::new(vec![slab(2.0), slab(8.0)]);
        let hit = scene.cast(Vec3::new(1.0, 20.0, 1.0), Vec3::NEG_Y).unwrap();
        assert_relative_eq!(hit, 8.0);
        let hit = scene.cast(Vec3::new(1.0, -5.0, 1.0), Vec3::Y).unwrap();
        assert_relative_eq!(hit, 1.5);
    }

    #[test]
    fn origin_inside_slab_is_ignored() {
        let (min, max) = (Vec3::new(0.0, 3.5, 0.0), Vec3::new(2.0, 4.0, 2.0));
        assert!(ray_aabb_hit_t(Vec3::new(1.0, 3.8, 1.0), Vec3::NEG_Y, min, max).is_none());
        let hit = ray_aabb_hit_t(Vec3::new(1.0, 5.0, 1.0), Vec3::NEG_Y, min, max).unwrap();
        assert_relative_eq!(hit, 1.0);
    }

    #[test]
    fn triangle_hits_are_double_sided() {
        let tri = PathSurface::Triangle {
            vertices: [
                Vec3::new(0.0, 1.0, 0.0),
                Vec3::new(4.0, 3.0, 0.0),
                Vec3::new(0.0, 1.0, 4.0),
            ],
        };
        let scene = PathScene::new(vec![tri]);

        let down = scene.cast(Vec3::new(2.0, 10.0, 1.0), Vec3::NEG_Y).unwrap();
        let up = scene.cast(Vec3::new(2.0, -10.0, 1.0), Vec3::Y).unwrap();
        assert_relative_eq!(down, 2.0, epsilon = 1e-5);
        assert_relative_eq!(up, 2.0, epsilon = 1e-5);
        assert!(scene.cast(Vec3::new(3.5, 10.0, 3.5), Vec3::NEG_Y).is_none());
    }

    #[test]
    fn surfaces_deserialize_from_tagged_json() {
        let scene: PathScene = serde_json::from_str(
            r#"{ "surfaces": [
                { "type": "slab", "min": [0, 0, 0], "max": [1, 1, 1] },
                { "type": "triangle", "vertices": [[0, 0, 0], [1, 0, 0], [0, 0, 1]] }
            ] }"#,
        )
        .unwrap();
        assert_eq!(scene.surfaces.len(), 2);
        assert!(matches!(scene.surfaces[1], PathSurface::Triangle { .. }));
    }
}
