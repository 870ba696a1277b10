//! Player movement: jumps, snap-down, fast-fall
//!
//! All functions here act on one player and ignore dead players.

use glam::Vec2;

use super::contact::PlayerId;
use super::state::{GameSession, Player};
use super::world::BodyHandle;
use crate::settings::JumpModel;
use crate::units::Units;

/// Upward impulse magnitude (N*s) for one jump
pub fn jump_impulse(model: JumpModel, gravity: f32, units: Units, mass: f32) -> f32 {
    match model {
        JumpModel::Height { height } => {
            mass * (2.0 * gravity.abs() * units.to_meters(height)).sqrt()
        }
        JumpModel::Velocity { speed } => mass * units.to_meters(speed),
    }
}

fn live_body(session: &GameSession, id: PlayerId) -> Option<BodyHandle> {
    session.player(id).filter(|p| p.alive).and_then(|p| p.body)
}

/// Spend one jump. Returns false when the player has none left.
pub fn try_jump(session: &mut GameSession, id: PlayerId) -> bool {
    let Some(body) = live_body(session, id) else {
        return false;
    };
    let Some(player) = session.player_mut(id).filter(|p| p.jumps_remaining > 0) else {
        return false;
    };
    player.jumps_remaining -= 1;

    let model = session.config.jump;
    let mass = session.world.mass(body).unwrap_or(0.0);
    let impulse = jump_impulse(model, session.config.gravity, session.units(), mass);
    if let JumpModel::Height { .. } = model {
        let velocity = session.world.velocity(body).unwrap_or(Vec2::ZERO);
        session.world.set_velocity(body, Vec2::new(velocity.x, 0.0));
    }
    session.world.apply_linear_impulse(body, Vec2::new(0.0, -impulse));
    log::trace!("{id} jumped ({} left)", session.players[id.index()].jumps_remaining);
    true
}

/// Teleport an airborne player onto the closest platform below it.
///
/// Returns false when grounded or when no platform is under the feet.
pub fn try_snap(session: &mut GameSession, id: PlayerId) -> bool {
    let Some(body) = live_body(session, id) else {
        return false;
    };
    if session.is_grounded(id) {
        return false;
    }
    let Some(position) = session.world.position(body) else {
        return false;
    };

    let units = session.units();
    let half_height = units.to_meters(session.config.player_height / 2.0);
    let start = position + Vec2::new(0.0, half_height + units.to_meters(1.0));
    let end = start + Vec2::new(0.0, units.to_meters(session.config.window_height));

    let mut closest: Option<(f32, Vec2)> = None;
    session.world.ray_cast(start, end, |hit| {
        if !hit.fixture.tag.is_platform() {
            return -1.0;
        }
        if closest.is_none_or(|(fraction, _)| hit.fraction < fraction) {
            closest = Some((hit.fraction, hit.point));
        }
        hit.fraction
    });
    let Some((_, point)) = closest else {
        return false;
    };

    session
        .world
        .set_position(body, Vec2::new(position.x, point.y - half_height));
    let velocity = session.world.velocity(body).unwrap_or(Vec2::ZERO);
    session.world.set_velocity(body, Vec2::new(velocity.x, 0.0));
    if let Some(player) = session.player_mut(id) {
        player.jumps_remaining = player.max_jumps;
    }
    log::trace!("{id} snapped to y={:.0}px", units.to_pixels(point.y));
    true
}

/// Set the gravity scale from the fast-fall input and grounding
pub fn apply_fast_fall(session: &mut GameSession, id: PlayerId) {
    let Some(body) = live_body(session, id) else {
        return;
    };
    let held = session.player(id).is_some_and(|p| p.fast_fall);
    let scale = if session.config.features.fast_fall && held && !session.is_grounded(id) {
        session.config.fast_fall_gravity_scale
    } else {
        1.0
    };
    session.world.set_gravity_scale(body, scale);
}

/// Grounded players get their full jump budget back
pub fn refill_jumps(player: &mut Player, grounded: bool) {
    player.grounded = grounded;
    if grounded {
        player.jumps_remaining = player.max_jumps;
    }
}

/// Zero the horizontal velocity so platforms never push the player along
pub fn cancel_drift(session: &mut GameSession, id: PlayerId) {
    let Some(body) = live_body(session, id) else {
        return;
    };
    if let Some(velocity) = session.world.velocity(body) {
        session.world.set_velocity(body, Vec2::new(0.0, velocity.y));
    }
}
