//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Frame delta clamped, no wall clock
//! - Seeded RNG only
//! - Stable iteration order (slot order in the world, spawn order in lists)
//! - No rendering, audio or storage dependencies

pub mod autopilot;
pub mod clock;
pub mod collision;
pub mod contact;
pub mod mechanics;
pub mod snapshot;
pub mod spawner;
pub mod state;
pub mod tick;
pub mod world;

pub use autopilot::autopilot_input;
pub use clock::Clock;
pub use collision::{Aabb, CollisionResult, RayHit, Shape, ray_cast_shape, shapes_collide};
pub use contact::{ContactTracker, FixtureTag, PlatformId, PlayerId};
pub use snapshot::{RenderSnapshot, snapshot};
pub use spawner::{Spawner, pick_collectible_kind};
pub use state::{
    AudioCue, Collectible, CollectibleKind, Difficulty, GameEvent, GameMode, GameResult,
    GameSession, Platform, PlatformEffect, PlayMode, Player, Pose, RainEvent,
};
pub use tick::{PlayerInput, TickInput, tick};
pub use world::{
    BodyDef, BodyHandle, BodyKind, Contact, ContactListener, FixtureDef, PhysicsWorld, RayCastHit,
};
