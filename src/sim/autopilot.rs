//! Scripted player for demos and headless runs
//!
//! Falls until there is nothing to land on, then spends a jump. With snap
//! enabled it drops straight onto a platform instead of drifting down.

use glam::Vec2;

use super::contact::PlayerId;
use super::state::GameSession;
use super::tick::PlayerInput;

/// Whether a platform lies under the player's feet within one screen height
pub fn platform_below(session: &GameSession, id: PlayerId) -> bool {
    let Some(body) = session.player(id).and_then(|p| p.body) else {
        return false;
    };
    let Some(position) = session.world.position(body) else {
        return false;
    };
    let units = session.units();
    let start = position + Vec2::new(0.0, units.to_meters(session.config.player_height / 2.0 + 1.0));
    let end = start + Vec2::new(0.0, units.to_meters(session.config.window_height));

    let mut found = false;
    session.world.ray_cast(start, end, |hit| {
        if hit.fixture.tag.is_platform() {
            found = true;
            0.0
        } else {
            -1.0
        }
    });
    found
}

/// Input the autopilot would give this frame
pub fn autopilot_input(session: &GameSession, id: PlayerId) -> PlayerInput {
    let mut input = PlayerInput::default();
    let Some(player) = session.player(id).filter(|p| p.alive) else {
        return input;
    };
    let Some(velocity) = player.body.and_then(|b| session.world.velocity(b)) else {
        return input;
    };
    if session.is_grounded(id) || velocity.y <= 0.0 {
        return input;
    }

    if platform_below(session, id) {
        input.snap = session.config.features.snap;
    } else if player.jumps_remaining > 0 {
        input.jump = true;
    }
    input
}
