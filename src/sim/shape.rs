//! Collision shapes
//!
//! Gameplay only needs axis-aligned boxes, circles, and small convex polygons
//! (the spike triangles). Every shape is origin-centered with a local offset;
//! bodies do not rotate, so world-space placement is a pure translation.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// A convex collision shape in body-local space
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Shape {
    /// Axis-aligned box given by half-extents
    Box { half: Vec2, offset: Vec2 },
    /// Circle
    Circle { radius: f32, offset: Vec2 },
    /// Convex polygon, counter-clockwise winding, offset baked into vertices
    Polygon { verts: Vec<Vec2> },
}

impl Shape {
    pub fn rect(half_x: f32, half_y: f32) -> Self {
        Shape::Box {
            half: Vec2::new(half_x, half_y),
            offset: Vec2::ZERO,
        }
    }

    pub fn rect_at(half_x: f32, half_y: f32, offset: Vec2) -> Self {
        Shape::Box {
            half: Vec2::new(half_x, half_y),
            offset,
        }
    }

    pub fn circle(radius: f32) -> Self {
        Shape::Circle {
            radius,
            offset: Vec2::ZERO,
        }
    }

    /// Build a convex polygon, normalizing the winding to counter-clockwise
    pub fn polygon(mut verts: Vec<Vec2>) -> Self {
        if signed_area(&verts) < 0.0 {
            verts.reverse();
        }
        Shape::Polygon { verts }
    }

    /// Shape area, used for mass computation (density x area)
    pub fn area(&self) -> f32 {
        match self {
            Shape::Box { half, .. } => 4.0 * half.x * half.y,
            Shape::Circle { radius, .. } => std::f32::consts::PI * radius * radius,
            Shape::Polygon { verts } => signed_area(verts).abs(),
        }
    }

    /// World-space axis-aligned bounding box as (min, max)
    pub fn aabb(&self, pos: Vec2) -> (Vec2, Vec2) {
        match self {
            Shape::Box { half, offset } => {
                let c = pos + *offset;
                (c - *half, c + *half)
            }
            Shape::Circle { radius, offset } => {
                let c = pos + *offset;
                let r = Vec2::splat(*radius);
                (c - r, c + r)
            }
            Shape::Polygon { verts } => {
                let mut min = Vec2::splat(f32::INFINITY);
                let mut max = Vec2::splat(f32::NEG_INFINITY);
                for v in verts {
                    let w = pos + *v;
                    min = min.min(w);
                    max = max.max(w);
                }
                (min, max)
            }
        }
    }

    /// World-space vertices for polygon-based narrow phase (boxes lower to
    /// their four corners; circles have none)
    pub fn world_verts(&self, pos: Vec2) -> Vec<Vec2> {
        match self {
            Shape::Box { half, offset } => {
                let c = pos + *offset;
                vec![
                    c + Vec2::new(-half.x, -half.y),
                    c + Vec2::new(half.x, -half.y),
                    c + Vec2::new(half.x, half.y),
                    c + Vec2::new(-half.x, half.y),
                ]
            }
            Shape::Circle { .. } => Vec::new(),
            Shape::Polygon { verts } => verts.iter().map(|v| pos + *v).collect(),
        }
    }
}

/// Shoelace signed area (positive for counter-clockwise winding)
fn signed_area(verts: &[Vec2]) -> f32 {
    let n = verts.len();
    let mut sum = 0.0;
    for i in 0..n {
        let a = verts[i];
        let b = verts[(i + 1) % n];
        sum += a.x * b.y - b.x * a.y;
    }
    sum / 2.0
}

/// Check two AABBs for overlap (broad phase)
pub fn aabb_overlap(a: (Vec2, Vec2), b: (Vec2, Vec2)) -> bool {
    a.0.x <= b.1.x && a.1.x >= b.0.x && a.0.y <= b.1.y && a.1.y >= b.0.y
}
