//! Rigid-body world
//!
//! A small physics world in the spirit of a classic 2D engine: static,
//! kinematic and dynamic bodies carrying box/circle fixtures, sensor
//! fixtures that report contacts without a physical response, a contact
//! listener called back synchronously from `step`, and segment ray casts.
//!
//! Bodies never rotate. Coordinates are meters with y pointing down.
//!
//! The listener is owned by the world and only ever sees copies of contact
//! data, so a callback cannot create or destroy bodies mid-step.

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{self, Shape};
use super::contact::FixtureTag;

/// Generation-checked reference to a body.
///
/// A handle to a destroyed body stays invalid even after its slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BodyHandle {
    index: u32,
    generation: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    /// Never moves
    Static,
    /// Moves with a programmer-set velocity, ignores forces and gravity
    Kinematic,
    /// Fully simulated
    Dynamic,
}

/// Description of a fixture to attach to a body
#[derive(Debug, Clone, Copy)]
pub struct FixtureDef {
    pub shape: Shape,
    /// Shape center relative to the body position
    pub offset: Vec2,
    pub density: f32,
    pub friction: f32,
    pub is_sensor: bool,
    pub tag: FixtureTag,
}

impl FixtureDef {
    pub fn new(shape: Shape, tag: FixtureTag) -> Self {
        Self {
            shape,
            offset: Vec2::ZERO,
            density: 0.0,
            friction: 0.2,
            is_sensor: false,
            tag,
        }
    }

    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    pub fn sensor(mut self) -> Self {
        self.is_sensor = true;
        self
    }
}

/// Description of a body to create
#[derive(Debug, Clone, Copy)]
pub struct BodyDef {
    pub kind: BodyKind,
    pub position: Vec2,
    pub velocity: Vec2,
    pub gravity_scale: f32,
}

impl BodyDef {
    pub fn new(kind: BodyKind, position: Vec2) -> Self {
        Self {
            kind,
            position,
            velocity: Vec2::ZERO,
            gravity_scale: 1.0,
        }
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }
}

/// A simulated body
#[derive(Debug, Clone)]
pub struct Body {
    kind: BodyKind,
    position: Vec2,
    velocity: Vec2,
    gravity_scale: f32,
    fixtures: Vec<FixtureDef>,
    mass: f32,
    inv_mass: f32,
}

impl Body {
    fn new(def: BodyDef, fixtures: Vec<FixtureDef>) -> Self {
        let mut body = Self {
            kind: def.kind,
            position: def.position,
            velocity: if def.kind == BodyKind::Static {
                Vec2::ZERO
            } else {
                def.velocity
            },
            gravity_scale: def.gravity_scale,
            fixtures,
            mass: 0.0,
            inv_mass: 0.0,
        };
        body.update_mass();
        body
    }

    fn update_mass(&mut self) {
        if self.kind != BodyKind::Dynamic {
            self.mass = 0.0;
            self.inv_mass = 0.0;
            return;
        }
        let mass: f32 = self
            .fixtures
            .iter()
            .map(|f| f.density * f.shape.area())
            .sum();
        // Dynamic bodies always get some mass
        self.mass = if mass > 0.0 { mass } else { 1.0 };
        self.inv_mass = 1.0 / self.mass;
    }

    pub fn kind(&self) -> BodyKind {
        self.kind
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn gravity_scale(&self) -> f32 {
        self.gravity_scale
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn fixtures(&self) -> &[FixtureDef] {
        &self.fixtures
    }
}

struct Slot {
    generation: u32,
    body: Option<Body>,
}

/// Identifies one fixture of one body
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FixtureKey {
    pub body: BodyHandle,
    pub index: u16,
}

/// One side of a contact or ray hit
#[derive(Debug, Clone, Copy)]
pub struct FixtureRef {
    pub key: FixtureKey,
    pub tag: FixtureTag,
    pub is_sensor: bool,
}

impl FixtureRef {
    pub fn body(&self) -> BodyHandle {
        self.key.body
    }
}

/// A touching fixture pair
#[derive(Debug, Clone, Copy)]
pub struct Contact {
    pub fixture_a: FixtureRef,
    pub fixture_b: FixtureRef,
    /// Unit normal from A toward B
    pub normal: Vec2,
    pub penetration: f32,
    /// Mixed friction; `pre_solve` may override it for this step
    pub friction: f32,
    /// `pre_solve` may disable the physical response for this step
    pub enabled: bool,
}

impl Contact {
    pub fn is_sensor(&self) -> bool {
        self.fixture_a.is_sensor || self.fixture_b.is_sensor
    }

    pub fn tags(&self) -> (FixtureTag, FixtureTag) {
        (self.fixture_a.tag, self.fixture_b.tag)
    }
}

/// Receives contact callbacks from `PhysicsWorld::step`.
///
/// Callbacks run synchronously inside the step, in a stable order.
pub trait ContactListener {
    fn begin_contact(&mut self, _contact: &Contact) {}
    fn end_contact(&mut self, _contact: &Contact) {}
    /// Called every step for each touching non-sensor pair before it is solved
    fn pre_solve(&mut self, _contact: &mut Contact) {}
}

impl ContactListener for () {}

/// Reported to ray cast callbacks
#[derive(Debug, Clone, Copy)]
pub struct RayCastHit {
    pub fixture: FixtureRef,
    pub point: Vec2,
    pub normal: Vec2,
    pub fraction: f32,
}

type PairKey = (FixtureKey, FixtureKey);

/// Owns every body and the contact listener
pub struct PhysicsWorld<L: ContactListener> {
    gravity: Vec2,
    slots: Vec<Slot>,
    free: Vec<u32>,
    touching: BTreeMap<PairKey, Contact>,
    listener: L,
}

impl<L: ContactListener> PhysicsWorld<L> {
    pub fn new(gravity: Vec2, listener: L) -> Self {
        Self {
            gravity,
            slots: Vec::new(),
            free: Vec::new(),
            touching: BTreeMap::new(),
            listener,
        }
    }

    pub fn gravity(&self) -> Vec2 {
        self.gravity
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    pub fn create_body(&mut self, def: BodyDef, fixtures: Vec<FixtureDef>) -> BodyHandle {
        let body = Body::new(def, fixtures);
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

    /// Remove a body. Its touching contacts end (with callbacks).
    ///
    /// Returns false for a stale or unknown handle.
    pub fn destroy_body(&mut self, handle: BodyHandle) -> bool {
        if !self.contains(handle) {
            return false;
        }

        let ended: Vec<PairKey> = self
            .touching
            .keys()
            .filter(|(a, b)| a.body == handle || b.body == handle)
            .copied()
            .collect();
        for key in ended {
            if let Some(contact) = self.touching.remove(&key) {
                self.listener.end_contact(&contact);
            }
        }

        let slot = &mut self.slots[handle.index as usize];
        slot.body = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        true
    }

    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.slots
            .get(handle.index as usize)
            .is_some_and(|s| s.generation == handle.generation && s.body.is_some())
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&Body> {
        self.slots
            .get(handle.index as usize)
            .filter(|s| s.generation == handle.generation)
            .and_then(|s| s.body.as_ref())
    }

    fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|s| s.generation == handle.generation)
            .and_then(|s| s.body.as_mut())
    }

    pub fn body_count(&self) -> usize {
        self.slots.iter().filter(|s| s.body.is_some()).count()
    }

    pub fn position(&self, handle: BodyHandle) -> Option<Vec2> {
        self.body(handle).map(Body::position)
    }

    pub fn velocity(&self, handle: BodyHandle) -> Option<Vec2> {
        self.body(handle).map(Body::velocity)
    }

    pub fn mass(&self, handle: BodyHandle) -> Option<f32> {
        self.body(handle).map(Body::mass)
    }

    pub fn set_velocity(&mut self, handle: BodyHandle, velocity: Vec2) {
        if let Some(body) = self.body_mut(handle).filter(|b| b.kind != BodyKind::Static) {
            body.velocity = velocity;
        }
    }

    /// Teleport a body; contacts update on the next step
    pub fn set_position(&mut self, handle: BodyHandle, position: Vec2) {
        if let Some(body) = self.body_mut(handle) {
            body.position = position;
        }
    }

    pub fn set_gravity_scale(&mut self, handle: BodyHandle, scale: f32) {
        if let Some(body) = self.body_mut(handle) {
            body.gravity_scale = scale;
        }
    }

    /// Apply an impulse at the center of mass (dynamic bodies only)
    pub fn apply_linear_impulse(&mut self, handle: BodyHandle, impulse: Vec2) {
        if let Some(body) = self.body_mut(handle).filter(|b| b.kind == BodyKind::Dynamic) {
            body.velocity += impulse * body.inv_mass;
        }
    }

    /// Pairs currently touching, in stable order
    pub fn contacts(&self) -> impl Iterator<Item = &Contact> {
        self.touching.values()
    }

    /// Advance the world by `dt` seconds
    pub fn step(&mut self, dt: f32, velocity_iterations: u32, position_iterations: u32) {
        if dt <= 0.0 {
            return;
        }

        // Integrate
        let gravity = self.gravity;
        for body in self.slots.iter_mut().filter_map(|s| s.body.as_mut()) {
            match body.kind {
                BodyKind::Dynamic => {
                    body.velocity += gravity * body.gravity_scale * dt;
                    body.position += body.velocity * dt;
                }
                BodyKind::Kinematic => body.position += body.velocity * dt,
                BodyKind::Static => {}
            }
        }

        // Contact begin/end
        let mut current = self.find_contacts();
        let previous = std::mem::take(&mut self.touching);
        for (key, contact) in &previous {
            if !current.contains_key(key) {
                self.listener.end_contact(contact);
            }
        }
        for (key, contact) in &current {
            if !previous.contains_key(key) {
                self.listener.begin_contact(contact);
            }
        }

        // Pre-solve and collect the pairs that get a physical response
        let mut solid = Vec::new();
        for contact in current.values_mut() {
            if contact.is_sensor() {
                continue;
            }
            self.listener.pre_solve(contact);
            if contact.enabled {
                solid.push(*contact);
            }
        }
        self.touching = current;

        for _ in 0..velocity_iterations {
            for contact in &solid {
                self.solve_velocity(contact);
            }
        }
        for _ in 0..position_iterations {
            for contact in &solid {
                self.solve_position(contact);
            }
        }
    }

    /// Cast the segment `p1 -> p2` through every fixture.
    ///
    /// For each fixture hit no farther than the current clip fraction the
    /// callback decides: negative ignores the fixture, zero stops the cast,
    /// a fraction clips the segment there (1 continues unclipped).
    pub fn ray_cast<F>(&self, p1: Vec2, p2: Vec2, mut callback: F)
    where
        F: FnMut(&RayCastHit) -> f32,
    {
        let mut max_fraction = 1.0f32;
        for (handle, body) in self.iter_bodies() {
            for (index, fixture) in body.fixtures.iter().enumerate() {
                let center = body.position + fixture.offset;
                let Some(hit) = collision::ray_cast_shape(&fixture.shape, center, p1, p2) else {
                    continue;
                };
                if hit.fraction > max_fraction {
                    continue;
                }
                let report = RayCastHit {
                    fixture: FixtureRef {
                        key: FixtureKey {
                            body: handle,
                            index: index as u16,
                        },
                        tag: fixture.tag,
                        is_sensor: fixture.is_sensor,
                    },
                    point: hit.point,
                    normal: hit.normal,
                    fraction: hit.fraction,
                };
                let answer = callback(&report);
                if answer < 0.0 {
                    continue;
                }
                if answer == 0.0 {
                    return;
                }
                max_fraction = max_fraction.min(answer);
            }
        }
    }

    fn iter_bodies(&self) -> impl Iterator<Item = (BodyHandle, &Body)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.body.as_ref().map(|body| {
                (
                    BodyHandle {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    body,
                )
            })
        })
    }

    fn find_contacts(&self) -> BTreeMap<PairKey, Contact> {
        struct Entry {
            fref: FixtureRef,
            kind: BodyKind,
            shape: Shape,
            center: Vec2,
            friction: f32,
        }

        let mut entries = Vec::new();
        for (handle, body) in self.iter_bodies() {
            for (index, fixture) in body.fixtures.iter().enumerate() {
                entries.push(Entry {
                    fref: FixtureRef {
                        key: FixtureKey {
                            body: handle,
                            index: index as u16,
                        },
                        tag: fixture.tag,
                        is_sensor: fixture.is_sensor,
                    },
                    kind: body.kind,
                    shape: fixture.shape,
                    center: body.position + fixture.offset,
                    friction: fixture.friction,
                });
            }
        }

        let mut found = BTreeMap::new();
        for (i, a) in entries.iter().enumerate() {
            for b in &entries[i + 1..] {
                if a.fref.body() == b.fref.body() {
                    continue;
                }
                // Only pairs involving a dynamic body interact
                if a.kind != BodyKind::Dynamic && b.kind != BodyKind::Dynamic {
                    continue;
                }
                let result = collision::shapes_collide(&a.shape, a.center, &b.shape, b.center);
                if !result.hit {
                    continue;
                }
                found.insert(
                    (a.fref.key, b.fref.key),
                    Contact {
                        fixture_a: a.fref,
                        fixture_b: b.fref,
                        normal: result.normal,
                        penetration: result.penetration,
                        friction: (a.friction * b.friction).sqrt(),
                        enabled: true,
                    },
                );
            }
        }

        found
    }

    fn fixture_geometry(&self, key: FixtureKey) -> Option<(Shape, Vec2)> {
        let body = self.body(key.body)?;
        let fixture = body.fixtures.get(key.index as usize)?;
        Some((fixture.shape, body.position + fixture.offset))
    }

    fn solve_velocity(&mut self, contact: &Contact) {
        let (ha, hb) = (contact.fixture_a.body(), contact.fixture_b.body());
        let (Some(a), Some(b)) = (self.body(ha), self.body(hb)) else {
            return;
        };
        let (inv_a, inv_b) = (a.inv_mass, b.inv_mass);
        let inv_sum = inv_a + inv_b;
        if inv_sum == 0.0 {
            return;
        }

        let n = contact.normal;
        let relative = b.velocity - a.velocity;
        let vn = relative.dot(n);
        if vn >= 0.0 {
            return;
        }

        // Inelastic normal impulse
        let jn = -vn / inv_sum;
        let mut impulse = n * jn;

        // Coulomb friction along the tangent
        if contact.friction > 0.0 {
            let t = n.perp();
            let vt = relative.dot(t);
            let jt = (-vt / inv_sum).clamp(-contact.friction * jn, contact.friction * jn);
            impulse += t * jt;
        }

        if let Some(a) = self.body_mut(ha) {
            a.velocity -= impulse * inv_a;
        }
        if let Some(b) = self.body_mut(hb) {
            b.velocity += impulse * inv_b;
        }
    }

    fn solve_position(&mut self, contact: &Contact) {
        let (ka, kb) = (contact.fixture_a.key, contact.fixture_b.key);
        let (Some((shape_a, ca)), Some((shape_b, cb))) =
            (self.fixture_geometry(ka), self.fixture_geometry(kb))
        else {
            return;
        };
        let (inv_a, inv_b) = match (self.body(ka.body), self.body(kb.body)) {
            (Some(a), Some(b)) => (a.inv_mass, b.inv_mass),
            _ => return,
        };
        let inv_sum = inv_a + inv_b;
        if inv_sum == 0.0 {
            return;
        }

        let result = collision::shapes_collide(&shape_a, ca, &shape_b, cb);
        if !result.hit || result.penetration <= 0.0 {
            return;
        }
        let correction = result.normal * (result.penetration / inv_sum);
        if let Some(a) = self.body_mut(ka.body) {
            a.position -= correction * inv_a;
        }
        if let Some(b) = self.body_mut(kb.body) {
            b.position += correction * inv_b;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::contact::{PlatformId, PlayerId};

    #[derive(Default)]
    struct Recorder {
        begins: Vec<(FixtureTag, FixtureTag)>,
        ends: Vec<(FixtureTag, FixtureTag)>,
        zero_friction: bool,
    }

    impl ContactListener for Recorder {
        fn begin_contact(&mut self, contact: &Contact) {
            self.begins.push(contact.tags());
        }
        fn end_contact(&mut self, contact: &Contact) {
            self.ends.push(contact.tags());
        }
        fn pre_solve(&mut self, contact: &mut Contact) {
            if self.zero_friction {
                contact.friction = 0.0;
            }
        }
    }

    const GRAVITY: Vec2 = Vec2::new(0.0, 7.0);
    const DT: f32 = 1.0 / 60.0;

    fn player_fixture() -> FixtureDef {
        FixtureDef::new(Shape::rect(0.8, 1.2), FixtureTag::PlayerBody(PlayerId::ONE))
            .with_density(1.0)
            .with_friction(0.5)
    }

    fn slab(world: &mut PhysicsWorld<Recorder>, kind: BodyKind, at: Vec2, tag: FixtureTag) -> BodyHandle {
        world.create_body(
            BodyDef::new(kind, at),
            vec![FixtureDef::new(Shape::rect(6.0, 0.4), tag).with_friction(0.7)],
        )
    }

    #[test]
    fn test_stale_handle_rejected() {
        let mut world = PhysicsWorld::new(GRAVITY, ());
        let a = world.create_body(BodyDef::new(BodyKind::Static, Vec2::ZERO), vec![]);
        assert!(world.destroy_body(a));
        let b = world.create_body(BodyDef::new(BodyKind::Static, Vec2::ONE), vec![]);
        assert!(!world.contains(a));
        assert!(world.contains(b));
        assert!(!world.destroy_body(a));
        assert_eq!(world.position(b), Some(Vec2::ONE));
        assert_eq!(world.body_count(), 1);
    }

    #[test]
    fn test_dynamic_mass_from_density() {
        let mut world = PhysicsWorld::new(GRAVITY, ());
        let body = world.create_body(
            BodyDef::new(BodyKind::Dynamic, Vec2::ZERO),
            vec![player_fixture()],
        );
        assert!((world.mass(body).unwrap() - 0.96).abs() < 1e-5);

        let massless = world.create_body(BodyDef::new(BodyKind::Dynamic, Vec2::ZERO), vec![]);
        assert_eq!(world.mass(massless), Some(1.0));
    }

    #[test]
    fn test_kinematic_integration_is_exact() {
        let mut world = PhysicsWorld::new(GRAVITY, Recorder::default());
        let platform = world.create_body(
            BodyDef::new(BodyKind::Kinematic, Vec2::new(30.0, 8.0)).with_velocity(Vec2::new(-4.0, 0.0)),
            vec![FixtureDef::new(Shape::rect(4.0, 0.4), FixtureTag::Platform(PlatformId(1000)))],
        );
        for _ in 0..120 {
            world.step(DT, 8, 3);
        }
        let pos = world.position(platform).unwrap();
        assert!((pos.x - 22.0).abs() < 1e-2);
        assert_eq!(pos.y, 8.0);
    }

    #[test]
    fn test_player_lands_and_rests_on_static_slab() {
        let mut world = PhysicsWorld::new(GRAVITY, Recorder::default());
        slab(&mut world, BodyKind::Static, Vec2::new(0.0, 5.0), FixtureTag::Ground);
        let player = world.create_body(
            BodyDef::new(BodyKind::Dynamic, Vec2::new(0.0, 3.0)),
            vec![player_fixture()],
        );
        for _ in 0..180 {
            world.step(DT, 8, 3);
        }
        let pos = world.position(player).unwrap();
        // Slab top at 4.8, player half height 0.6
        assert!((pos.y - 4.2).abs() < 0.02, "player y = {}", pos.y);
        assert!(world.velocity(player).unwrap().y.abs() < 0.2);
        assert_eq!(world.listener().begins.len(), 1);
        assert!(world.listener().ends.is_empty());
    }

    #[test]
    fn test_sensor_reports_without_response() {
        let mut world = PhysicsWorld::new(Vec2::ZERO, Recorder::default());
        let player = world.create_body(
            BodyDef::new(BodyKind::Dynamic, Vec2::new(0.0, 0.0)).with_velocity(Vec2::new(3.0, 0.0)),
            vec![player_fixture()],
        );
        world.create_body(
            BodyDef::new(BodyKind::Kinematic, Vec2::new(0.8, 0.0)),
            vec![
                FixtureDef::new(
                    Shape::circle(0.5),
                    FixtureTag::Collectible(crate::sim::CollectibleKind::ScoreSmall),
                )
                .sensor(),
            ],
        );
        world.step(DT, 8, 3);
        assert_eq!(world.listener().begins.len(), 1);
        // Passed straight through
        assert_eq!(world.velocity(player), Some(Vec2::new(3.0, 0.0)));
        for _ in 0..60 {
            world.step(DT, 8, 3);
        }
        assert_eq!(world.listener().ends.len(), 1);
    }

    #[test]
    fn test_friction_drags_unless_zeroed() {
        for zero in [false, true] {
            let mut world = PhysicsWorld::new(GRAVITY, Recorder {
                zero_friction: zero,
                ..Default::default()
            });
            let platform = slab(
                &mut world,
                BodyKind::Kinematic,
                Vec2::new(0.0, 5.0),
                FixtureTag::Platform(PlatformId(1000)),
            );
            world.set_velocity(platform, Vec2::new(-1.0, 0.0));
            let player = world.create_body(
                BodyDef::new(BodyKind::Dynamic, Vec2::new(0.0, 4.2)),
                vec![player_fixture()],
            );
            for _ in 0..30 {
                world.step(DT, 8, 3);
            }
            let vx = world.velocity(player).unwrap().x;
            if zero {
                assert_eq!(vx, 0.0);
            } else {
                assert!(vx < -0.5, "vx = {vx}");
            }
        }
    }

    #[test]
    fn test_destroy_ends_contacts() {
        let mut world = PhysicsWorld::new(GRAVITY, Recorder::default());
        let ground = slab(&mut world, BodyKind::Static, Vec2::new(0.0, 5.0), FixtureTag::Ground);
        world.create_body(
            BodyDef::new(BodyKind::Dynamic, Vec2::new(0.0, 4.2)),
            vec![player_fixture()],
        );
        world.step(DT, 8, 3);
        assert_eq!(world.listener().begins.len(), 1);
        assert!(world.destroy_body(ground));
        assert_eq!(world.listener().ends.len(), 1);
        assert_eq!(world.contacts().count(), 0);
    }

    #[test]
    fn test_ray_cast_filter_and_clip() {
        let mut world = PhysicsWorld::new(GRAVITY, Recorder::default());
        slab(&mut world, BodyKind::Static, Vec2::new(0.0, 9.0), FixtureTag::Ground);
        slab(&mut world, BodyKind::Kinematic, Vec2::new(0.0, 6.0), FixtureTag::Platform(PlatformId(1001)));
        slab(&mut world, BodyKind::Kinematic, Vec2::new(0.0, 3.0), FixtureTag::Platform(PlatformId(1000)));

        let mut closest: Option<(PlatformId, f32)> = None;
        world.ray_cast(Vec2::ZERO, Vec2::new(0.0, 10.0), |hit| match hit.fixture.tag {
            FixtureTag::Platform(id) => {
                if closest.is_none_or(|(_, f)| hit.fraction < f) {
                    closest = Some((id, hit.fraction));
                }
                hit.fraction
            }
            _ => -1.0,
        });
        let (id, fraction) = closest.unwrap();
        assert_eq!(id, PlatformId(1000));
        assert!((fraction - 0.28).abs() < 1e-5);

        let mut calls = 0;
        world.ray_cast(Vec2::ZERO, Vec2::new(0.0, 10.0), |_| {
            calls += 1;
            0.0
        });
        assert_eq!(calls, 1);
    }
}
