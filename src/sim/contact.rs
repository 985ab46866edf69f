//! Narrow-phase collision geometry
//!
//! All solid fixtures are convex: boxes lower to four-vertex polygons, so the
//! only pairings are polygon-polygon (separating axis), circle-polygon
//! (closest point), and circle-circle. A hit yields a contact normal pointing
//! from the first shape toward the second plus a penetration depth for
//! positional correction.

use glam::Vec2;

use super::shape::Shape;

/// Result of a narrow-phase test between two overlapping shapes
#[derive(Debug, Clone, Copy)]
pub struct Manifold {
    /// Unit normal pointing from shape `a` toward shape `b`
    pub normal: Vec2,
    /// Overlap depth along the normal
    pub penetration: f32,
}

impl Manifold {
    fn flipped(self) -> Self {
        Self {
            normal: -self.normal,
            penetration: self.penetration,
        }
    }
}

/// Test two placed shapes for overlap
pub fn collide_shapes(pos_a: Vec2, a: &Shape, pos_b: Vec2, b: &Shape) -> Option<Manifold> {
    match (a, b) {
        (
            Shape::Circle {
                radius: ra,
                offset: oa,
            },
            Shape::Circle {
                radius: rb,
                offset: ob,
            },
        ) => circle_circle(pos_a + *oa, *ra, pos_b + *ob, *rb),
        (Shape::Circle { radius, offset }, _) => {
            circle_polygon(pos_a + *offset, *radius, &b.world_verts(pos_b)).map(Manifold::flipped)
        }
        (_, Shape::Circle { radius, offset }) => {
            circle_polygon(pos_b + *offset, *radius, &a.world_verts(pos_a))
        }
        (_, _) => polygon_polygon(&a.world_verts(pos_a), &b.world_verts(pos_b)),
    }
}

fn circle_circle(ca: Vec2, ra: f32, cb: Vec2, rb: f32) -> Option<Manifold> {
    let d = cb - ca;
    let dist_sq = d.length_squared();
    let r = ra + rb;
    if dist_sq >= r * r {
        return None;
    }
    let dist = dist_sq.sqrt();
    let normal = if dist > 1e-6 { d / dist } else { Vec2::Y };
    Some(Manifold {
        normal,
        penetration: r - dist,
    })
}

/// Circle vs convex polygon; normal points from the polygon toward the circle
fn circle_polygon(center: Vec2, radius: f32, verts: &[Vec2]) -> Option<Manifold> {
    let n = verts.len();
    debug_assert!(n >= 3);

    // Track the closest edge point and whether the center is inside (it is
    // inside iff it lies left of every CCW edge).
    let mut inside = true;
    let mut closest = verts[0];
    let mut closest_dist_sq = f32::INFINITY;
    let mut deepest_face = 0;
    let mut deepest_dist = f32::NEG_INFINITY;

    for i in 0..n {
        let a = verts[i];
        let b = verts[(i + 1) % n];
        let edge = b - a;
        let to_center = center - a;
        if edge.perp_dot(to_center) < 0.0 {
            inside = false;
        }

        // Signed distance from center to the edge line (positive inside)
        let outward = Vec2::new(edge.y, -edge.x).normalize_or_zero();
        let face_dist = outward.dot(to_center);
        if face_dist > deepest_dist {
            deepest_dist = face_dist;
            deepest_face = i;
        }

        let t = (to_center.dot(edge) / edge.length_squared()).clamp(0.0, 1.0);
        let point = a + edge * t;
        let d_sq = (center - point).length_squared();
        if d_sq < closest_dist_sq {
            closest_dist_sq = d_sq;
            closest = point;
        }
    }

    if inside {
        // Center is buried in the polygon: push out through the nearest face
        let a = verts[deepest_face];
        let b = verts[(deepest_face + 1) % n];
        let edge = b - a;
        let outward = Vec2::new(edge.y, -edge.x).normalize_or_zero();
        return Some(Manifold {
            normal: outward,
            penetration: radius - deepest_dist,
        });
    }

    let dist = closest_dist_sq.sqrt();
    if dist >= radius {
        return None;
    }
    let normal = if dist > 1e-6 {
        (center - closest) / dist
    } else {
        Vec2::Y
    };
    Some(Manifold {
        normal,
        penetration: radius - dist,
    })
}

/// Separating-axis test between two convex polygons
fn polygon_polygon(a: &[Vec2], b: &[Vec2]) -> Option<Manifold> {
    let mut best = Manifold {
        normal: Vec2::Y,
        penetration: f32::INFINITY,
    };

    for verts in [a, b] {
        let n = verts.len();
        for i in 0..n {
            let edge = verts[(i + 1) % n] - verts[i];
            let axis = Vec2::new(edge.y, -edge.x).normalize_or_zero();
            if axis == Vec2::ZERO {
                continue;
            }
            let (min_a, max_a) = project(a, axis);
            let (min_b, max_b) = project(b, axis);
            let overlap = max_a.min(max_b) - min_a.max(min_b);
            if overlap <= 0.0 {
                return None;
            }
            if overlap < best.penetration {
                best = Manifold {
                    normal: axis,
                    penetration: overlap,
                };
            }
        }
    }

    // Orient the normal from a toward b
    let dir = centroid(b) - centroid(a);
    if dir.dot(best.normal) < 0.0 {
        best.normal = -best.normal;
    }
    Some(best)
}

fn project(verts: &[Vec2], axis: Vec2) -> (f32, f32) {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for v in verts {
        let p = v.dot(axis);
        min = min.min(p);
        max = max.max(p);
    }
    (min, max)
}

fn centroid(verts: &[Vec2]) -> Vec2 {
    verts.iter().copied().sum::<Vec2>() / verts.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::shape::Shape;

    #[test]
    fn box_box_overlap() {
        let a = Shape::rect(1.0, 1.0);
        let b = Shape::rect(1.0, 1.0);
        // b overlaps a from the right by 0.5
        let m = collide_shapes(Vec2::ZERO, &a, Vec2::new(1.5, 0.0), &b).unwrap();
        assert!((m.penetration - 0.5).abs() < 1e-5);
        assert!(m.normal.x > 0.99);

        assert!(collide_shapes(Vec2::ZERO, &a, Vec2::new(2.5, 0.0), &b).is_none());
    }

    #[test]
    fn box_box_vertical_normal() {
        let ground = Shape::rect(20.0, 1.0);
        let player = Shape::rect(1.0, 2.0);
        // Player resting 0.1 into the ground top
        let m = collide_shapes(Vec2::new(0.0, -10.0), &ground, Vec2::new(3.0, -7.1), &player)
            .unwrap();
        assert!(m.normal.y > 0.99, "normal should point up at the player");
        assert!((m.penetration - 0.1).abs() < 1e-4);
    }

    #[test]
    fn circle_box_from_above() {
        let b = Shape::rect(2.0, 0.5);
        let c = Shape::circle(0.5);
        let m = collide_shapes(Vec2::ZERO, &b, Vec2::new(0.0, 0.9), &c).unwrap();
        assert!(m.normal.y > 0.99);
        assert!((m.penetration - 0.1).abs() < 1e-5);
    }

    #[test]
    fn circle_circle_separated() {
        let c = Shape::circle(1.0);
        assert!(collide_shapes(Vec2::ZERO, &c, Vec2::new(2.1, 0.0), &c).is_none());
        let m = collide_shapes(Vec2::ZERO, &c, Vec2::new(1.5, 0.0), &c).unwrap();
        assert!((m.penetration - 0.5).abs() < 1e-5);
    }

    #[test]
    fn triangle_box_overlap() {
        // Spike triangle tip poking into a box below it
        let spike = Shape::polygon(vec![
            Vec2::new(0.0, -1.0),
            Vec2::new(-0.5, 0.5),
            Vec2::new(0.5, 0.5),
        ]);
        let ground = Shape::rect(5.0, 1.0);
        let m = collide_shapes(Vec2::new(0.0, 0.5), &spike, Vec2::new(0.0, -1.0), &ground);
        assert!(m.is_some());
        assert!(m.unwrap().normal.y < -0.99, "normal points down toward ground");
    }
}
