//! Render handoff
//!
//! Everything a frontend needs to draw one frame, in pixels.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::contact::PlayerId;
use super::state::{CollectibleKind, GameMode, GameResult, GameSession, PlatformEffect, Pose};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: PlayerId,
    pub position: Vec2,
    pub size: Vec2,
    pub pose: Pose,
    pub alive: bool,
    pub jumps_remaining: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformView {
    pub position: Vec2,
    pub size: Vec2,
    /// Effect active at spawn; selects the tint
    pub tint: PlatformEffect,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectibleView {
    pub position: Vec2,
    pub radius: f32,
    pub kind: CollectibleKind,
}

/// One frame of render state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderSnapshot {
    pub mode: GameMode,
    pub players: Vec<PlayerView>,
    pub platforms: Vec<PlatformView>,
    pub collectibles: Vec<CollectibleView>,
    pub score: u32,
    pub high_score: u32,
    pub result: Option<GameResult>,
}

impl RenderSnapshot {
    /// Text shown on the game-over screen
    pub fn result_text(&self) -> Option<String> {
        self.result.map(|result| match result {
            GameResult::Score { score, .. } => format!("Game Over! Score {score}"),
            GameResult::Winner(id) => format!("{id} Wins!"),
            GameResult::Tie => "Tie!".to_string(),
        })
    }
}

/// Capture the session for drawing. Dead players are left out.
pub fn snapshot(session: &GameSession) -> RenderSnapshot {
    let units = session.units();
    let to_px = |handle| session.world.position(handle).map(|p| units.vec_to_pixels(p));

    let players = session
        .players
        .iter()
        .filter_map(|p| {
            let position = to_px(p.body?)?;
            Some(PlayerView {
                id: p.id,
                position,
                size: p.size,
                pose: p.pose(),
                alive: p.alive,
                jumps_remaining: p.jumps_remaining,
            })
        })
        .collect();

    let platforms = session
        .platforms
        .iter()
        .filter_map(|p| {
            Some(PlatformView {
                position: to_px(p.body)?,
                size: Vec2::new(p.length, p.height),
                tint: p.effect,
            })
        })
        .collect();

    let collectibles = session
        .collectibles
        .iter()
        .filter_map(|c| {
            Some(CollectibleView {
                position: to_px(c.body)?,
                radius: c.radius,
                kind: c.kind,
            })
        })
        .collect();

    RenderSnapshot {
        mode: session.mode,
        players,
        platforms,
        collectibles,
        score: session.score,
        high_score: session.high_score,
        result: session.result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::GameConfig;
    use crate::sim::state::PlayMode;
    use crate::sim::tick::{TickInput, tick};

    #[test]
    fn test_snapshot_in_pixels() {
        let mut session = GameSession::new(GameConfig::default(), 8);
        session.start(PlayMode::Multi, 4);
        tick(&mut session, &TickInput::default(), 1.0 / 60.0);

        let snap = snapshot(&session);
        assert_eq!(snap.mode, GameMode::PlayingMulti);
        assert_eq!(snap.players.len(), 2);
        assert_eq!(snap.players[0].size, Vec2::new(40.0, 60.0));
        assert_eq!(snap.players[0].pose, Pose::Airborne);
        assert!((snap.players[1].position.x - 200.0).abs() < 1e-3);
        assert_eq!(snap.platforms.len(), 1);
        assert_eq!(snap.platforms[0].tint, PlatformEffect::None);
        assert_eq!(snap.high_score, 4);
        assert_eq!(snap.result_text(), None);
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut session = GameSession::new(GameConfig::default(), 8);
        session.start(PlayMode::Single, 0);
        let json = serde_json::to_string(&snapshot(&session)).unwrap();
        assert!(json.contains("\"mode\":\"PlayingSingle\""));
    }

    #[test]
    fn test_result_text() {
        let mut snap = snapshot(&GameSession::new(GameConfig::default(), 1));
        snap.result = Some(GameResult::Winner(PlayerId::TWO));
        assert_eq!(snap.result_text().as_deref(), Some("Player 2 Wins!"));
        snap.result = Some(GameResult::Tie);
        assert_eq!(snap.result_text().as_deref(), Some("Tie!"));
    }
}
