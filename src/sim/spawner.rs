//! Procedural platform and pickup generation
//!
//! Platforms enter at the right edge of the screen on a timer. A candidate
//! that would crowd an existing platform is dropped silently; the next
//! attempt happens after the usual interval.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::clock::Clock;
use super::collision::{Aabb, Shape};
use super::contact::{FixtureTag, PlatformId};
use super::state::{Collectible, CollectibleKind, GameSession, Platform};
use super::world::{BodyDef, BodyKind, FixtureDef};
use crate::settings::CollectibleWeight;

/// Platform spawn timer
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Spawner {
    clock: Clock,
    /// Seconds from the last attempt to the next one
    next_spawn_time: f32,
}

impl Spawner {
    /// The first attempt happens on the first frame
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_spawn_time(&self) -> f32 {
        self.next_spawn_time
    }

    pub fn time_since_attempt(&self) -> f32 {
        self.clock.elapsed()
    }
}

/// Pick a pickup kind from a cumulative table.
///
/// Rows are tested in order against `roll` in [0, 1); the last row catches
/// everything the others did not.
pub fn pick_collectible_kind(table: &[CollectibleWeight], roll: f32) -> Option<CollectibleKind> {
    let (last, rows) = table.split_last()?;
    let mut cumulative = 0.0;
    for row in rows {
        cumulative += row.weight;
        if roll < cumulative {
            return Some(row.kind);
        }
    }
    Some(last.kind)
}

/// Bounds (pixels) a new platform must keep clear, buffer included
pub fn candidate_bounds(center: Vec2, length: f32, height: f32, buffer: f32) -> Aabb {
    Aabb::from_center(center, Vec2::new(length, height) / 2.0).expanded_x(buffer)
}

/// Current bounds of a live platform in pixels
pub fn platform_bounds(session: &GameSession, platform: &Platform) -> Option<Aabb> {
    let position = session.world.position(platform.body)?;
    Some(Aabb::from_center(
        session.units().vec_to_pixels(position),
        Vec2::new(platform.length, platform.height) / 2.0,
    ))
}

/// Advance the spawn timer and make an attempt when it fires
pub fn update_spawner(session: &mut GameSession, dt: f32) {
    session.spawner.clock.advance(dt);
    if !session.spawner.clock.has_reached(session.spawner.next_spawn_time) {
        return;
    }

    try_spawn_platform(session);

    let difficulty = session.difficulty;
    session.spawner.clock.restart();
    session.spawner.next_spawn_time = session
        .rng
        .random_range(difficulty.min_spawn_time..=difficulty.max_spawn_time);
}

/// One spawn attempt at the right edge; returns the committed platform id
pub fn try_spawn_platform(session: &mut GameSession) -> Option<PlatformId> {
    let (min_length, max_length) = session.current_length_bounds();
    let cfg = &session.config;
    let (min_y, max_y) = (cfg.platform_min_y, cfg.platform_max_y);
    let height = cfg.platform_height;
    let buffer = cfg.platform_overlap_buffer;

    let length = session.rng.random_range(min_length..=max_length);
    let y = session.rng.random_range(min_y..=max_y);
    let center = Vec2::new(session.config.window_width + length / 2.0, y);

    let candidate = candidate_bounds(center, length, height, buffer);
    let crowded = session
        .platforms
        .iter()
        .filter_map(|p| platform_bounds(session, p))
        .any(|bounds| candidate.intersects(&bounds));
    if crowded {
        log::debug!("Spawn rejected: {length:.0}px platform at y={y:.0} overlaps");
        return None;
    }

    let units = session.units();
    let velocity = units.vec_to_meters(Vec2::new(-session.difficulty.block_speed, 0.0));
    let id = session.allocate_platform_id();
    let fixture = FixtureDef::new(
        Shape::rect(units.to_meters(length), units.to_meters(height)),
        FixtureTag::Platform(id),
    )
    .with_friction(session.config.platform_friction);
    let body = session.world.create_body(
        BodyDef::new(BodyKind::Kinematic, units.vec_to_meters(center)).with_velocity(velocity),
        vec![fixture],
    );
    session.platforms.push(Platform {
        id,
        body,
        length,
        height,
        effect: session.platform_effect,
        marked_for_removal: false,
    });
    log::debug!("Spawned platform {} ({length:.0}px at y={y:.0})", id.0);

    if session.collectibles_enabled() {
        let chance = session.config.collectible_spawn_chance;
        if session.rng.random::<f32>() < chance {
            let roll = session.rng.random::<f32>();
            if let Some(kind) = pick_collectible_kind(&session.config.collectible_table, roll) {
                let r = session.config.collectible_radius;
                let lift = height / 2.0 + r + session.config.collectible_clearance;
                spawn_collectible(session, kind, center - Vec2::new(0.0, lift), velocity, false);
            }
        }
    }

    Some(id)
}

/// Create a pickup at `position` (pixels) moving at `velocity` (m/s)
pub fn spawn_collectible(
    session: &mut GameSession,
    kind: CollectibleKind,
    position: Vec2,
    velocity: Vec2,
    from_rain: bool,
) {
    let units = session.units();
    let radius = session.config.collectible_radius;
    let fixture = FixtureDef::new(
        Shape::circle(units.to_meters(radius)),
        FixtureTag::Collectible(kind),
    )
    .sensor();
    let body = session.world.create_body(
        BodyDef::new(BodyKind::Kinematic, units.vec_to_meters(position)).with_velocity(velocity),
        vec![fixture],
    );
    session.collectibles.push(Collectible {
        kind,
        body,
        radius,
        from_rain,
        marked_for_removal: false,
    });
}

/// Run the rain timers, dropping a pickup every interval until it expires
pub fn update_rain(session: &mut GameSession, dt: f32) {
    if !session.rain.active {
        return;
    }
    session.rain.duration.advance(dt);
    session.rain.spawn.advance(dt);

    if session.rain.duration.has_reached(session.config.rain_duration) {
        session.rain.active = false;
        log::info!("Rain ended");
        return;
    }
    if !session.rain.spawn.has_reached(session.config.rain_interval) {
        return;
    }

    let r = session.config.collectible_radius;
    let x = session
        .rng
        .random_range(r..=(session.config.window_width - r).max(r));
    let velocity = session
        .units()
        .vec_to_meters(Vec2::new(0.0, session.config.rain_speed));
    spawn_collectible(
        session,
        CollectibleKind::ScoreSmall,
        Vec2::new(x, -r),
        velocity,
        true,
    );
    session.rain.spawn.restart();
}
