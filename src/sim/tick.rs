//! Per-frame simulation tick
//!
//! One call advances a running session by one frame: input, physics step,
//! contact results, deaths, timers, spawning, difficulty.

use serde::{Deserialize, Serialize};

use super::autopilot::autopilot_input;
use super::contact::PlayerId;
use super::mechanics::{apply_fast_fall, cancel_drift, refill_jumps, try_jump, try_snap};
use super::spawner::{update_rain, update_spawner};
use super::state::{AudioCue, CollectibleKind, GameEvent, GameMode, GameResult, GameSession, PlatformEffect};
use crate::consts::*;

/// One player's controls for a frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInput {
    /// Jump key went down this frame
    pub jump: bool,
    /// Snap key went down this frame
    pub snap: bool,
    /// Fast-fall key is held
    pub fast_fall: bool,
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TickInput {
    /// Indexed by `PlayerId`
    pub players: [PlayerInput; MAX_PLAYERS],
    /// Scripted play replaces the player inputs
    pub autopilot: bool,
}

/// Advance a running session by `dt` seconds
pub fn tick(session: &mut GameSession, input: &TickInput, dt: f32) {
    if !session.mode.is_playing() {
        return;
    }
    let dt = dt.clamp(0.0, session.config.max_frame_dt);
    session.elapsed += dt;

    let mut input = input.clone();
    if input.autopilot {
        for i in 0..session.players.len().min(MAX_PLAYERS) {
            input.players[i] = autopilot_input(session, PlayerId(i as u8));
        }
    }

    // Input
    for i in 0..session.players.len().min(MAX_PLAYERS) {
        let id = PlayerId(i as u8);
        let controls = input.players[i];
        if !session.players[i].alive {
            continue;
        }
        session.players[i].fast_fall = controls.fast_fall;
        if controls.jump {
            try_jump(session, id);
        }
        if controls.snap && session.config.features.snap {
            try_snap(session, id);
        }
        apply_fast_fall(session, id);
        if session.config.features.cancel_drift {
            cancel_drift(session, id);
        }
    }

    session.world.step(
        dt,
        session.config.velocity_iterations,
        session.config.position_iterations,
    );

    // Contact results; removals happen only after the step
    cull_offscreen(session);
    resolve_collectibles(session);
    session.remove_marked();

    update_players(session);
    if !session.mode.is_playing() {
        return;
    }

    update_effects(session, dt);
    update_rain(session, dt);
    update_spawner(session, dt);
    session.difficulty.ramp(&session.config, dt);
}

/// Mark entities that have left the screen
fn cull_offscreen(session: &mut GameSession) {
    let units = session.units();
    let height = session.config.window_height;
    let world = &session.world;

    for platform in &mut session.platforms {
        let Some(pos) = world.position(platform.body) else {
            platform.marked_for_removal = true;
            continue;
        };
        if units.to_pixels(pos.x) < -platform.length / 2.0 {
            platform.marked_for_removal = true;
        }
    }

    for collectible in &mut session.collectibles {
        let Some(pos) = world.position(collectible.body) else {
            collectible.marked_for_removal = true;
            continue;
        };
        let pos = units.vec_to_pixels(pos);
        let r = collectible.radius;
        if pos.x < -r || pos.y > height + r {
            collectible.marked_for_removal = true;
        }
    }
}

/// Consume every pickup touched during the step
fn resolve_collectibles(session: &mut GameSession) {
    let touched = session.world.listener_mut().take_touched_collectibles();
    let enabled = session.collectibles_enabled();

    for body in touched {
        // A pickup touched twice in one step is consumed once
        let Some(collectible) = session
            .collectibles
            .iter_mut()
            .find(|c| c.body == body && !c.marked_for_removal)
        else {
            continue;
        };
        collectible.marked_for_removal = true;
        let kind = collectible.kind;

        if enabled {
            apply_collectible(session, kind);
        } else {
            log::debug!("{kind:?} consumed without effect");
        }
        session.emit(GameEvent::Audio(AudioCue::PlayPickup));
    }
}

/// Apply a pickup's effect to the session
pub fn apply_collectible(session: &mut GameSession, kind: CollectibleKind) {
    let cfg = &session.config;
    match kind {
        CollectibleKind::ScoreSmall => session.score += cfg.small_score_value,
        CollectibleKind::ScoreBig => session.score += cfg.big_score_value,
        CollectibleKind::PenaltyScore => {
            session.score = session.score.saturating_sub(cfg.penalty_value);
        }
        CollectibleKind::LengthenEffect => {
            session.platform_effect = PlatformEffect::Lengthen;
            session.effect_clock.restart();
            log::info!("Platforms lengthened");
        }
        CollectibleKind::ShortenEffect => {
            session.platform_effect = PlatformEffect::Shorten;
            session.effect_clock.restart();
            log::info!("Platforms shortened");
        }
        CollectibleKind::RainEvent => {
            session.rain.begin();
            log::info!("Rain started");
        }
    }
    log::debug!("Collected {kind:?}, score {}", session.score);
    session.emit(GameEvent::Collected(kind));
}

/// Expire the platform effect
pub fn update_effects(session: &mut GameSession, dt: f32) {
    if session.platform_effect == PlatformEffect::None {
        return;
    }
    session.effect_clock.advance(dt);
    if session.effect_clock.has_reached(session.config.effect_duration) {
        log::info!("{:?} expired", session.platform_effect);
        session.platform_effect = PlatformEffect::None;
    }
}

/// Whether a player meets any death condition this frame
fn is_dead(session: &GameSession, id: PlayerId) -> bool {
    if session.world.listener().has_touched_ground(id) {
        return true;
    }
    let Some(pos) = session.player_position(id) else {
        return false;
    };
    let cfg = &session.config;
    pos.y > cfg.window_height + cfg.player_height
        || (cfg.features.left_boundary_death && pos.x < -cfg.player_width)
}

/// Refill jumps, detect deaths, end the run when it is decided
fn update_players(session: &mut GameSession) {
    let mut deaths = Vec::new();
    for i in 0..session.players.len() {
        let id = session.players[i].id;
        if !session.players[i].alive {
            continue;
        }
        let grounded = session.is_grounded(id);
        refill_jumps(&mut session.players[i], grounded);
        if is_dead(session, id) {
            deaths.push(id);
        }
    }
    if deaths.is_empty() {
        return;
    }

    // Every player is checked before anyone is removed
    for &id in &deaths {
        session.kill_player(id);
        session.emit(GameEvent::PlayerDied(id));
        log::info!("{id} died after {:.1}s", session.elapsed);
    }

    let result = match session.mode {
        GameMode::PlayingSingle => {
            let new_high_score = session.score > session.high_score;
            if new_high_score {
                session.high_score = session.score;
                session.emit(GameEvent::HighScoreBeaten(session.score));
            }
            GameResult::Score {
                score: session.score,
                high_score: session.high_score,
                new_high_score,
            }
        }
        _ => {
            let survivors: Vec<PlayerId> = session
                .players
                .iter()
                .filter(|p| p.alive)
                .map(|p| p.id)
                .collect();
            match survivors.as_slice() {
                [] => GameResult::Tie,
                [winner] => GameResult::Winner(*winner),
                _ => return,
            }
        }
    };
    finish(session, result);
}

fn finish(session: &mut GameSession, result: GameResult) {
    for player in &mut session.players {
        if let Some(body) = player.body.take() {
            session.world.destroy_body(body);
        }
        player.grounded = false;
    }
    session.mode = GameMode::GameOver;
    session.result = Some(result);
    session.emit(GameEvent::Audio(AudioCue::StopMusic));
    session.emit(GameEvent::GameOver(result));
    log::info!("Game over: {result:?}");
}
