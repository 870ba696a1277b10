//! Narrow-phase tests for fixture shapes
//!
//! Fixtures are axis-aligned boxes or circles (bodies never rotate), so every
//! test here works on centers and half extents. Normals always point from
//! shape A toward shape B.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Separation below which two shapes count as touching (meters)
pub const CONTACT_SLOP: f32 = 0.005;

/// Fixture geometry in body-local space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Box { half_extents: Vec2 },
    Circle { radius: f32 },
}

impl Shape {
    pub fn rect(width: f32, height: f32) -> Self {
        Shape::Box {
            half_extents: Vec2::new(width / 2.0, height / 2.0),
        }
    }

    pub fn circle(radius: f32) -> Self {
        Shape::Circle { radius }
    }

    pub fn area(&self) -> f32 {
        match *self {
            Shape::Box { half_extents } => 4.0 * half_extents.x * half_extents.y,
            Shape::Circle { radius } => std::f32::consts::PI * radius * radius,
        }
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn from_center(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Strict overlap; boxes sharing only an edge do not intersect
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    /// Grow left and right by `buffer`
    pub fn expanded_x(&self, buffer: f32) -> Aabb {
        Aabb {
            min: Vec2::new(self.min.x - buffer, self.min.y),
            max: Vec2::new(self.max.x + buffer, self.max.y),
        }
    }
}

/// Result of a collision check
#[derive(Debug, Clone, Copy)]
pub struct CollisionResult {
    /// Whether the shapes touch (within `CONTACT_SLOP`)
    pub hit: bool,
    /// Approximate contact point
    pub point: Vec2,
    /// Unit normal from A toward B
    pub normal: Vec2,
    /// Overlap depth; slightly negative when merely touching
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec2::ZERO,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }

    fn flipped(mut self) -> Self {
        self.normal = -self.normal;
        self
    }
}

/// Test two world-placed shapes against each other
pub fn shapes_collide(a: &Shape, center_a: Vec2, b: &Shape, center_b: Vec2) -> CollisionResult {
    match (*a, *b) {
        (Shape::Box { half_extents: ha }, Shape::Box { half_extents: hb }) => {
            box_box(center_a, ha, center_b, hb)
        }
        (Shape::Circle { radius }, Shape::Box { half_extents }) => {
            box_circle(center_b, half_extents, center_a, radius).flipped()
        }
        (Shape::Box { half_extents }, Shape::Circle { radius }) => {
            box_circle(center_a, half_extents, center_b, radius)
        }
        (Shape::Circle { radius: ra }, Shape::Circle { radius: rb }) => {
            circle_circle(center_a, ra, center_b, rb)
        }
    }
}

fn box_box(ca: Vec2, ha: Vec2, cb: Vec2, hb: Vec2) -> CollisionResult {
    let d = cb - ca;
    let overlap = (ha + hb) - d.abs();
    if overlap.x <= -CONTACT_SLOP || overlap.y <= -CONTACT_SLOP {
        return CollisionResult::miss();
    }

    // Push out along the axis of least overlap
    let (normal, penetration) = if overlap.x < overlap.y {
        (Vec2::new(if d.x < 0.0 { -1.0 } else { 1.0 }, 0.0), overlap.x)
    } else {
        (Vec2::new(0.0, if d.y < 0.0 { -1.0 } else { 1.0 }), overlap.y)
    };

    let lo = (ca - ha).max(cb - hb);
    let hi = (ca + ha).min(cb + hb);
    CollisionResult {
        hit: true,
        point: (lo + hi) * 0.5,
        normal,
        penetration,
    }
}

/// Box as A, circle as B
fn box_circle(cb: Vec2, half: Vec2, cc: Vec2, radius: f32) -> CollisionResult {
    let local = cc - cb;
    let clamped = local.clamp(-half, half);

    if clamped == local {
        // Circle center inside the box: leave through the nearest face
        let to_face = half - local.abs();
        let (normal, depth) = if to_face.x < to_face.y {
            (Vec2::new(if local.x < 0.0 { -1.0 } else { 1.0 }, 0.0), to_face.x)
        } else {
            (Vec2::new(0.0, if local.y < 0.0 { -1.0 } else { 1.0 }), to_face.y)
        };
        return CollisionResult {
            hit: true,
            point: cc,
            normal,
            penetration: depth + radius,
        };
    }

    let delta = local - clamped;
    let dist = delta.length();
    let penetration = radius - dist;
    if penetration <= -CONTACT_SLOP {
        return CollisionResult::miss();
    }
    CollisionResult {
        hit: true,
        point: cb + clamped,
        normal: delta / dist,
        penetration,
    }
}

fn circle_circle(ca: Vec2, ra: f32, cb: Vec2, rb: f32) -> CollisionResult {
    let d = cb - ca;
    let dist = d.length();
    let penetration = ra + rb - dist;
    if penetration <= -CONTACT_SLOP {
        return CollisionResult::miss();
    }
    let normal = if dist > f32::EPSILON { d / dist } else { Vec2::Y };
    CollisionResult {
        hit: true,
        point: ca + normal * ra,
        normal,
        penetration,
    }
}

/// Where a segment first enters a shape
#[derive(Debug, Clone, Copy)]
pub struct RayHit {
    pub point: Vec2,
    pub normal: Vec2,
    /// Position along `p1 -> p2`, in [0, 1]
    pub fraction: f32,
}

/// Cast the segment `p1 -> p2` against a world-placed shape.
///
/// A segment starting inside the shape reports nothing.
pub fn ray_cast_shape(shape: &Shape, center: Vec2, p1: Vec2, p2: Vec2) -> Option<RayHit> {
    let d = p2 - p1;
    if d.length_squared() == 0.0 {
        return None;
    }
    match *shape {
        Shape::Box { half_extents } => ray_aabb(p1, d, &Aabb::from_center(center, half_extents)),
        Shape::Circle { radius } => ray_circle(p1, d, center, radius),
    }
}

fn ray_aabb(origin: Vec2, d: Vec2, aabb: &Aabb) -> Option<RayHit> {
    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;
    let mut normal = Vec2::ZERO;

    for axis in 0..2 {
        let (o, dir, lo, hi) = (origin[axis], d[axis], aabb.min[axis], aabb.max[axis]);
        if dir.abs() < f32::EPSILON {
            if o <= lo || o >= hi {
                return None;
            }
            continue;
        }
        let inv = 1.0 / dir;
        let (mut t1, mut t2) = ((lo - o) * inv, (hi - o) * inv);
        let mut sign = -1.0;
        if t1 > t2 {
            std::mem::swap(&mut t1, &mut t2);
            sign = 1.0;
        }
        if t1 > t_enter {
            t_enter = t1;
            normal = Vec2::ZERO;
            normal[axis] = sign;
        }
        t_exit = t_exit.min(t2);
        if t_enter > t_exit {
            return None;
        }
    }

    if !(0.0..=1.0).contains(&t_enter) {
        return None;
    }
    Some(RayHit {
        point: origin + d * t_enter,
        normal,
        fraction: t_enter,
    })
}

fn ray_circle(origin: Vec2, d: Vec2, center: Vec2, radius: f32) -> Option<RayHit> {
    let s = origin - center;
    let b = s.dot(s) - radius * radius;
    if b <= 0.0 {
        return None;
    }
    let c = s.dot(d);
    let rr = d.dot(d);
    let sigma = c * c - rr * b;
    if sigma < 0.0 || c >= 0.0 {
        return None;
    }
    let t = -(c + sigma.sqrt()) / rr;
    if !(0.0..=1.0).contains(&t) {
        return None;
    }
    let point = origin + d * t;
    Some(RayHit {
        point,
        normal: (point - center).normalize_or_zero(),
        fraction: t,
    })
}
