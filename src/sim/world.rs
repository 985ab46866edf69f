//! Physics world: integration, contact detection, and resolution
//!
//! Fixed-timestep advance over a generational body arena. Each call to
//! [`World::step_physics`]:
//! 1. integrates dynamic bodies (gravity on y, then position),
//! 2. finds overlapping fixture pairs (AABB pretest, then narrow phase),
//! 3. resolves solid-solid contacts with restitution and positional
//!    correction,
//! 4. diffs the persistent contact set into Begin/End events.
//!
//! Sensors participate in events but never in resolution. Destroyed bodies
//! are skipped everywhere and reclaimed by [`World::sweep_destroyed`].

use std::collections::HashSet;

use glam::Vec2;

use super::body::{Body, BodyHandle, BodyKind};
use super::contact::{Manifold, collide_shapes};
use super::shape::aabb_overlap;

/// Penetration allowed to persist so resting contacts do not flicker
const PENETRATION_SLOP: f32 = 0.01;
/// Fraction of remaining penetration corrected per step
const CORRECTION_FACTOR: f32 = 0.8;

/// One side of a contact event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactSide {
    pub body: BodyHandle,
    pub fixture: usize,
    pub sensor: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactKind {
    Begin,
    End,
}

/// Emitted when a fixture pair starts or stops overlapping
#[derive(Debug, Clone, Copy)]
pub struct ContactEvent {
    pub kind: ContactKind,
    pub a: ContactSide,
    pub b: ContactSide,
}

impl ContactEvent {
    /// Solid-solid contacts additionally fire `collide` listeners
    pub fn is_solid(&self) -> bool {
        !self.a.sensor && !self.b.sensor
    }
}

/// Persistent contact-pair key, normalized so the lower slot index is first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PairKey {
    a: (BodyHandle, usize),
    b: (BodyHandle, usize),
}

impl PairKey {
    fn new(a: (BodyHandle, usize), b: (BodyHandle, usize)) -> Self {
        if (a.0.index, a.1) <= (b.0.index, b.1) {
            Self { a, b }
        } else {
            Self { a: b, b: a }
        }
    }
}

struct Slot {
    generation: u32,
    body: Option<Body>,
}

/// Container of bodies with global gravity and a fixed timestep
pub struct World {
    /// Gravity magnitude, pulling along -y
    pub gravity: f32,
    /// Fixed timestep in seconds
    pub dt: f32,
    slots: Vec<Slot>,
    free: Vec<u32>,
    contacts: HashSet<PairKey>,
    running: bool,
}

impl World {
    pub fn new(gravity: f32, dt: f32) -> Self {
        Self {
            gravity,
            dt,
            slots: Vec::new(),
            free: Vec::new(),
            contacts: HashSet::new(),
            running: false,
        }
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn add_body(&mut self, body: Body) -> BodyHandle {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.body = Some(body);
            BodyHandle {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                body: Some(body),
            });
            BodyHandle {
                index,
                generation: 0,
            }
        }
    }

    /// Look up a live body; stale or destroyed handles yield `None`
    pub fn body(&self, handle: BodyHandle) -> Option<&Body> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.body.as_ref().filter(|b| !b.destroyed)
    }

    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.body.as_mut().filter(|b| !b.destroyed)
    }

    pub fn is_alive(&self, handle: BodyHandle) -> bool {
        self.body(handle).is_some()
    }

    /// Mark a body for removal at the next sweep; monotonic, and the body
    /// generates no further events from this point on
    pub fn destroy(&mut self, handle: BodyHandle) {
        if let Some(body) = self.body_mut(handle) {
            body.destroyed = true;
        }
    }

    /// Iterate live bodies (render enumeration, tests)
    pub fn bodies(&self) -> impl Iterator<Item = (BodyHandle, &Body)> {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            let body = slot.body.as_ref()?;
            if body.destroyed {
                return None;
            }
            Some((
                BodyHandle {
                    index: i as u32,
                    generation: slot.generation,
                },
                body,
            ))
        })
    }

    pub fn body_count(&self) -> usize {
        self.bodies().count()
    }

    /// Advance physics one fixed step and report contact transitions
    pub fn step_physics(&mut self) -> Vec<ContactEvent> {
        self.integrate();

        let overlaps = self.find_overlaps();

        // Resolve every currently-overlapping solid pair, new or persisting
        for overlap in &overlaps {
            if overlap.solid {
                self.resolve(overlap);
            }
        }

        self.diff_contacts(&overlaps)
    }

    fn integrate(&mut self) {
        let g = self.gravity;
        let dt = self.dt;
        for slot in &mut self.slots {
            let Some(body) = slot.body.as_mut() else {
                continue;
            };
            if body.destroyed || body.kind != BodyKind::Dynamic {
                continue;
            }
            body.vel.y -= g * body.gravity_scale * dt;
            body.pos += body.vel * dt;
        }
    }

    fn find_overlaps(&self) -> Vec<Overlap> {
        let live: Vec<(usize, &Body)> = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| {
                s.body
                    .as_ref()
                    .filter(|b| !b.destroyed)
                    .map(|b| (i, b))
            })
            .collect();

        let mut overlaps = Vec::new();
        for (n, &(i, body_a)) in live.iter().enumerate() {
            for &(j, body_b) in &live[n + 1..] {
                if body_a.kind == BodyKind::Static && body_b.kind == BodyKind::Static {
                    continue;
                }
                for (fi, fix_a) in body_a.fixtures.iter().enumerate() {
                    let aabb_a = fix_a.shape.aabb(body_a.pos);
                    for (fj, fix_b) in body_b.fixtures.iter().enumerate() {
                        let aabb_b = fix_b.shape.aabb(body_b.pos);
                        if !aabb_overlap(aabb_a, aabb_b) {
                            continue;
                        }
                        let Some(manifold) =
                            collide_shapes(body_a.pos, &fix_a.shape, body_b.pos, &fix_b.shape)
                        else {
                            continue;
                        };
                        overlaps.push(Overlap {
                            a: ContactSide {
                                body: self.handle_at(i),
                                fixture: fi,
                                sensor: fix_a.sensor,
                            },
                            b: ContactSide {
                                body: self.handle_at(j),
                                fixture: fj,
                                sensor: fix_b.sensor,
                            },
                            manifold,
                            solid: !fix_a.sensor && !fix_b.sensor,
                        });
                    }
                }
            }
        }
        overlaps
    }

    fn handle_at(&self, index: usize) -> BodyHandle {
        BodyHandle {
            index: index as u32,
            generation: self.slots[index].generation,
        }
    }

    /// Impulse resolution with restitution plus tangential friction, then
    /// positional correction leaving a small slop so resting contacts hold
    fn resolve(&mut self, overlap: &Overlap) {
        let ia = overlap.a.body.index as usize;
        let ib = overlap.b.body.index as usize;
        let (body_a, body_b) = self.two_bodies_mut(ia, ib);

        let inv_sum = body_a.inv_mass + body_b.inv_mass;
        if inv_sum == 0.0 {
            return;
        }
        let normal = overlap.manifold.normal;

        let rel = body_b.vel - body_a.vel;
        let vn = rel.dot(normal);
        if vn < 0.0 {
            let e = body_a.fixtures[overlap.a.fixture]
                .restitution
                .max(body_b.fixtures[overlap.b.fixture].restitution);
            let jn = -(1.0 + e) * vn / inv_sum;
            body_a.vel -= normal * jn * body_a.inv_mass;
            body_b.vel += normal * jn * body_b.inv_mass;

            let mu = (body_a.fixtures[overlap.a.fixture].friction
                * body_b.fixtures[overlap.b.fixture].friction)
                .sqrt();
            if mu > 0.0 {
                let tangent = (rel - normal * vn).normalize_or_zero();
                if tangent != Vec2::ZERO {
                    let jt = (-rel.dot(tangent) / inv_sum).clamp(-mu * jn, mu * jn);
                    body_a.vel -= tangent * jt * body_a.inv_mass;
                    body_b.vel += tangent * jt * body_b.inv_mass;
                }
            }
        }

        let correction =
            (overlap.manifold.penetration - PENETRATION_SLOP).max(0.0) * CORRECTION_FACTOR
                / inv_sum;
        body_a.pos -= normal * correction * body_a.inv_mass;
        body_b.pos += normal * correction * body_b.inv_mass;
    }

    fn two_bodies_mut(&mut self, i: usize, j: usize) -> (&mut Body, &mut Body) {
        debug_assert!(i != j);
        let (lo, hi) = (i.min(j), i.max(j));
        let (left, right) = self.slots.split_at_mut(hi);
        let body_lo = left[lo].body.as_mut().expect("resolved body missing");
        let body_hi = right[0].body.as_mut().expect("resolved body missing");
        if i < j { (body_lo, body_hi) } else { (body_hi, body_lo) }
    }

    /// Diff current overlaps against the persistent set, producing Begin
    /// events for new pairs and End events for dissolved ones
    fn diff_contacts(&mut self, overlaps: &[Overlap]) -> Vec<ContactEvent> {
        let mut current = HashSet::with_capacity(overlaps.len());
        let mut events = Vec::new();

        for overlap in overlaps {
            let key = PairKey::new(
                (overlap.a.body, overlap.a.fixture),
                (overlap.b.body, overlap.b.fixture),
            );
            current.insert(key);
            if !self.contacts.contains(&key) {
                events.push(ContactEvent {
                    kind: ContactKind::Begin,
                    a: overlap.a,
                    b: overlap.b,
                });
            }
        }

        for key in &self.contacts {
            if current.contains(key) {
                continue;
            }
            // Both sides must still be live; pairs dissolved by destruction
            // are dropped silently
            let (Some(body_a), Some(body_b)) = (self.body(key.a.0), self.body(key.b.0)) else {
                continue;
            };
            events.push(ContactEvent {
                kind: ContactKind::End,
                a: ContactSide {
                    body: key.a.0,
                    fixture: key.a.1,
                    sensor: body_a.fixtures[key.a.1].sensor,
                },
                b: ContactSide {
                    body: key.b.0,
                    fixture: key.b.1,
                    sensor: body_b.fixtures[key.b.1].sensor,
                },
            });
        }

        self.contacts = current;
        events
    }

    /// Remove destroyed bodies, bump slot generations, and drop their
    /// lingering contact pairs
    pub fn sweep_destroyed(&mut self) {
        for (i, slot) in self.slots.iter_mut().enumerate() {
            let destroyed = slot.body.as_ref().is_some_and(|b| b.destroyed);
            if destroyed {
                slot.body = None;
                slot.generation += 1;
                self.free.push(i as u32);
                let index = i as u32;
                self.contacts
                    .retain(|k| k.a.0.index != index && k.b.0.index != index);
            }
        }
    }
}

struct Overlap {
    a: ContactSide,
    b: ContactSide,
    manifold: Manifold,
    solid: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::body::{BodyTag, Fixture, Sprite};
    use crate::sim::shape::Shape;

    const DT: f32 = 1.0 / 60.0;

    fn ground(world: &mut World) -> BodyHandle {
        world.add_body(
            Body::new_static(BodyTag::Terrain, Vec2::new(0.0, -10.0), Sprite::Ground)
                .with_fixture(Fixture::solid(Shape::rect(20.0, 1.0))),
        )
    }

    fn falling_box(world: &mut World, pos: Vec2) -> BodyHandle {
        world.add_body(
            Body::new_dynamic(BodyTag::Enemy, pos, Sprite::SnailIdle)
                .with_fixture(Fixture::solid(Shape::rect(0.5, 0.5))),
        )
    }

    #[test]
    fn gravity_integration() {
        let mut world = World::new(10.0, DT);
        let h = falling_box(&mut world, Vec2::ZERO);
        world.step_physics();
        let body = world.body(h).unwrap();
        assert!((body.vel.y - (-10.0 * DT)).abs() < 1e-5);
        assert!(body.pos.y < 0.0);
    }

    #[test]
    fn static_bodies_do_not_integrate() {
        let mut world = World::new(10.0, DT);
        let h = ground(&mut world);
        world.step_physics();
        let body = world.body(h).unwrap();
        assert_eq!(body.pos, Vec2::new(0.0, -10.0));
        assert_eq!(body.vel, Vec2::ZERO);
    }

    #[test]
    fn begin_then_end_contact() {
        let mut world = World::new(10.0, DT);
        let g = ground(&mut world);
        let b = falling_box(&mut world, Vec2::new(0.0, -8.0));

        let mut began = false;
        for _ in 0..120 {
            for ev in world.step_physics() {
                if ev.kind == ContactKind::Begin {
                    let bodies = [ev.a.body, ev.b.body];
                    assert!(bodies.contains(&g) && bodies.contains(&b));
                    began = true;
                }
            }
            world.sweep_destroyed();
        }
        assert!(began, "box should land on the ground");

        // Fling the box upward; the contact should dissolve
        world.body_mut(b).unwrap().vel = Vec2::new(0.0, 20.0);
        let mut ended = false;
        for _ in 0..10 {
            for ev in world.step_physics() {
                if ev.kind == ContactKind::End {
                    ended = true;
                }
            }
        }
        assert!(ended, "leaving the ground should emit an End event");
    }

    #[test]
    fn resting_contact_does_not_flicker() {
        let mut world = World::new(10.0, DT);
        ground(&mut world);
        let b = falling_box(&mut world, Vec2::new(0.0, -8.45));

        // Let it settle
        for _ in 0..60 {
            world.step_physics();
        }
        // Settled: no further Begin/End churn
        for _ in 0..30 {
            let events = world.step_physics();
            assert!(events.is_empty(), "resting contact churned: {events:?}");
        }
        let body = world.body(b).unwrap();
        assert!(body.vel.y.abs() < 0.2);
    }

    #[test]
    fn restitution_amplifies_bounce() {
        let mut world = World::new(10.0, DT);
        world.add_body(
            Body::new_static(BodyTag::Trampoline, Vec2::new(0.0, -9.0), Sprite::Trampoline)
                .with_fixture(Fixture::solid(Shape::rect(2.0, 0.5)).with_restitution(1.2)),
        );
        let b = falling_box(&mut world, Vec2::new(0.0, -4.0));
        world.body_mut(b).unwrap().vel = Vec2::new(0.0, -10.0);

        let mut max_up = 0.0f32;
        for _ in 0..120 {
            world.step_physics();
            max_up = max_up.max(world.body(b).unwrap().vel.y);
        }
        // Impact speed exceeds 10; restitution 1.2 returns more than that
        assert!(max_up > 10.0, "expected amplified bounce, got {max_up}");
    }

    #[test]
    fn sensors_overlap_without_resolution() {
        let mut world = World::new(0.0, DT);
        let a = world.add_body(
            Body::new_dynamic(BodyTag::Spike, Vec2::ZERO, Sprite::Spike)
                .with_fixture(Fixture::sensor(Shape::rect(1.0, 1.0)))
                .with_gravity_scale(0.0),
        );
        let b = world.add_body(
            Body::new_dynamic(BodyTag::Player, Vec2::new(0.5, 0.0), Sprite::PlayerIdle)
                .with_fixture(Fixture::solid(Shape::rect(1.0, 1.0)))
                .with_gravity_scale(0.0),
        );

        let events = world.step_physics();
        assert_eq!(events.len(), 1);
        assert!(!events[0].is_solid());
        // Neither body moved
        assert_eq!(world.body(a).unwrap().pos, Vec2::ZERO);
        assert_eq!(world.body(b).unwrap().pos, Vec2::new(0.5, 0.0));
    }

    #[test]
    fn destroyed_body_generates_no_events_and_handle_goes_stale() {
        let mut world = World::new(10.0, DT);
        ground(&mut world);
        let b = falling_box(&mut world, Vec2::new(0.0, -8.4));

        world.destroy(b);
        assert!(world.body(b).is_none());
        let events = world.step_physics();
        assert!(events.is_empty());
        world.sweep_destroyed();
        assert!(!world.is_alive(b));

        // Slot reuse must not resurrect the old handle
        let b2 = falling_box(&mut world, Vec2::new(5.0, 0.0));
        assert_eq!(b.index, b2.index);
        assert_ne!(b.generation, b2.generation);
        assert!(world.body(b).is_none());
        assert!(world.body(b2).is_some());
    }
}
