//! Game state and core simulation types
//!
//! `GameSession` owns the physics world and every gameplay entity. Entities
//! refer to their bodies by generation-checked handles; the lists here are
//! the only owners of gameplay data, the world only owns physics state.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::clock::Clock;
use super::collision::Shape;
use super::contact::{ContactTracker, FixtureTag, PlatformId, PlayerId};
use super::spawner::Spawner;
use super::world::{BodyDef, BodyHandle, BodyKind, FixtureDef, PhysicsWorld};
use crate::consts::*;
use crate::lerp;
use crate::settings::GameConfig;
use crate::units::Units;

/// Top-level state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameMode {
    /// Waiting for a mode to be chosen
    #[default]
    StartScreen,
    PlayingSingle,
    PlayingMulti,
    /// Run ended; result is available
    GameOver,
}

impl GameMode {
    pub fn is_playing(&self) -> bool {
        matches!(self, GameMode::PlayingSingle | GameMode::PlayingMulti)
    }
}

/// Mode chosen on the start screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayMode {
    Single,
    Multi,
}

impl PlayMode {
    pub fn player_count(&self) -> usize {
        match self {
            PlayMode::Single => 1,
            PlayMode::Multi => 2,
        }
    }

    fn game_mode(&self) -> GameMode {
        match self {
            PlayMode::Single => GameMode::PlayingSingle,
            PlayMode::Multi => GameMode::PlayingMulti,
        }
    }
}

/// Pickup kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollectibleKind {
    ScoreSmall,
    ScoreBig,
    LengthenEffect,
    ShortenEffect,
    RainEvent,
    PenaltyScore,
}

/// Timed modifier on newly spawned platform lengths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlatformEffect {
    #[default]
    None,
    Lengthen,
    Shorten,
}

impl PlatformEffect {
    pub fn length_factor(&self, config: &GameConfig) -> f32 {
        match self {
            PlatformEffect::None => 1.0,
            PlatformEffect::Lengthen => config.lengthen_factor,
            PlatformEffect::Shorten => config.shorten_factor,
        }
    }
}

/// A moving platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Platform {
    pub id: PlatformId,
    pub body: BodyHandle,
    /// Size in pixels
    pub length: f32,
    pub height: f32,
    /// Effect active when this platform spawned (drives its tint)
    pub effect: PlatformEffect,
    pub marked_for_removal: bool,
}

/// A pickup riding a platform or falling as rain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collectible {
    pub kind: CollectibleKind,
    pub body: BodyHandle,
    /// Radius in pixels
    pub radius: f32,
    pub from_rain: bool,
    pub marked_for_removal: bool,
}

/// Sprite selection for a player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pose {
    Idle,
    Airborne,
}

/// A player and its jump budget
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    /// None once the player has died
    pub body: Option<BodyHandle>,
    pub alive: bool,
    pub jumps_remaining: u32,
    pub max_jumps: u32,
    /// Fast-fall input currently held
    pub fast_fall: bool,
    /// Foot sensor on a platform after the last step
    pub grounded: bool,
    /// Size in pixels
    pub size: Vec2,
}

impl Player {
    pub fn pose(&self) -> Pose {
        if self.grounded {
            Pose::Idle
        } else {
            Pose::Airborne
        }
    }
}

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    /// Single player
    Score {
        score: u32,
        high_score: u32,
        new_high_score: bool,
    },
    Winner(PlayerId),
    /// Every player died on the same frame
    Tie,
}

/// Requests for the audio layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioCue {
    PlayPickup,
    StartMusic,
    StopMusic,
}

/// Events emitted during a tick, drained by the frontend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    Audio(AudioCue),
    Collected(CollectibleKind),
    PlayerDied(PlayerId),
    GameOver(GameResult),
    /// Carries the new best score, to be persisted
    HighScoreBeaten(u32),
}

/// Platform speed and spawn pacing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Difficulty {
    /// Platform speed (px/s)
    pub block_speed: f32,
    pub min_spawn_time: f32,
    pub max_spawn_time: f32,
}

impl Difficulty {
    pub fn initial(config: &GameConfig) -> Self {
        Self {
            block_speed: config.initial_block_speed,
            min_spawn_time: config.slow_min_spawn_time,
            max_spawn_time: config.slow_max_spawn_time,
        }
    }

    /// 0 at the initial speed, 1 at the cap
    pub fn speed_progress(&self, config: &GameConfig) -> f32 {
        let span = config.max_block_speed - config.initial_block_speed;
        if span <= 0.0 {
            return 1.0;
        }
        ((self.block_speed - config.initial_block_speed) / span).clamp(0.0, 1.0)
    }

    /// Speed up and tighten the spawn interval
    pub fn ramp(&mut self, config: &GameConfig, dt: f32) {
        self.block_speed =
            (self.block_speed + config.block_speed_increase * dt).min(config.max_block_speed);
        let t = self.speed_progress(config);
        self.min_spawn_time = lerp(config.slow_min_spawn_time, config.fast_min_spawn_time, t);
        self.max_spawn_time = lerp(config.slow_max_spawn_time, config.fast_max_spawn_time, t);
    }
}

/// Timed shower of score pickups
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RainEvent {
    pub active: bool,
    pub duration: Clock,
    pub spawn: Clock,
}

impl RainEvent {
    pub fn begin(&mut self) {
        self.active = true;
        self.duration.restart();
        self.spawn.restart();
    }
}

/// One game session: world, entities, timers and scores
pub struct GameSession {
    pub config: GameConfig,
    units: Units,
    pub mode: GameMode,
    pub world: PhysicsWorld<ContactTracker>,
    /// Indexed by `PlayerId`
    pub players: Vec<Player>,
    /// Spawn order
    pub platforms: Vec<Platform>,
    pub collectibles: Vec<Collectible>,
    /// Seconds of play in this session
    pub elapsed: f32,
    pub difficulty: Difficulty,
    pub platform_effect: PlatformEffect,
    pub effect_clock: Clock,
    pub rain: RainEvent,
    pub spawner: Spawner,
    pub score: u32,
    pub high_score: u32,
    pub result: Option<GameResult>,
    pub(crate) events: Vec<GameEvent>,
    pub(crate) rng: Pcg32,
    seed: u64,
    next_platform_id: u32,
    ground: BodyHandle,
}

impl GameSession {
    /// Create a session on the start screen with the static bounds in place
    pub fn new(config: GameConfig, seed: u64) -> Self {
        let units = config.units();
        let mut world = PhysicsWorld::new(Vec2::new(0.0, config.gravity), ContactTracker::new());

        let (w, h) = (config.window_width, config.window_height);
        let bound = |tag| FixtureDef::new(Shape::rect(units.to_meters(w), units.to_meters(20.0)), tag);
        let ground = world.create_body(
            BodyDef::new(BodyKind::Static, units.vec_to_meters(Vec2::new(w / 2.0, h + 50.0))),
            vec![bound(FixtureTag::Ground)],
        );
        world.create_body(
            BodyDef::new(BodyKind::Static, units.vec_to_meters(Vec2::new(w / 2.0, -10.0))),
            vec![bound(FixtureTag::Ceiling)],
        );

        let difficulty = Difficulty::initial(&config);
        Self {
            config,
            units,
            mode: GameMode::StartScreen,
            world,
            players: Vec::new(),
            platforms: Vec::new(),
            collectibles: Vec::new(),
            elapsed: 0.0,
            difficulty,
            platform_effect: PlatformEffect::None,
            effect_clock: Clock::new(),
            rain: RainEvent::default(),
            spawner: Spawner::new(),
            score: 0,
            high_score: 0,
            result: None,
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            seed,
            next_platform_id: PLATFORM_ID_BASE,
            ground,
        }
    }

    pub fn units(&self) -> Units {
        self.units
    }

    pub fn ground(&self) -> BodyHandle {
        self.ground
    }

    /// Begin a run. Only valid from the start screen.
    pub fn start(&mut self, play_mode: PlayMode, high_score: u32) -> bool {
        if self.mode != GameMode::StartScreen {
            log::warn!("Cannot start a run from {:?}", self.mode);
            return false;
        }

        self.clear_entities();
        self.world.listener_mut().reset();
        self.elapsed = 0.0;
        self.difficulty = Difficulty::initial(&self.config);
        self.platform_effect = PlatformEffect::None;
        self.effect_clock.restart();
        self.rain = RainEvent::default();
        self.spawner = Spawner::new();
        self.score = 0;
        self.high_score = high_score;
        self.result = None;
        self.next_platform_id = PLATFORM_ID_BASE;

        for i in 0..play_mode.player_count() {
            self.spawn_player(PlayerId(i as u8));
        }

        self.mode = play_mode.game_mode();
        self.emit(GameEvent::Audio(AudioCue::StartMusic));
        log::info!(
            "Started {:?} run (seed {}, high score {})",
            play_mode,
            self.seed,
            high_score
        );
        true
    }

    /// Leave the game-over screen. Only valid from game over.
    pub fn return_to_menu(&mut self) -> bool {
        if self.mode != GameMode::GameOver {
            return false;
        }
        self.clear_entities();
        self.world.listener_mut().reset();
        self.mode = GameMode::StartScreen;
        true
    }

    fn spawn_player(&mut self, id: PlayerId) {
        let cfg = &self.config;
        let size = Vec2::new(cfg.player_width, cfg.player_height);
        let spawn = Vec2::new(
            cfg.player_spawn_x - cfg.second_player_offset * id.index() as f32,
            cfg.player_spawn_y,
        );
        let u = self.units;

        let body_fixture = FixtureDef::new(
            Shape::rect(u.to_meters(size.x), u.to_meters(size.y)),
            FixtureTag::PlayerBody(id),
        )
        .with_density(cfg.player_density)
        .with_friction(cfg.player_friction);
        let foot_fixture = FixtureDef::new(
            Shape::rect(
                u.to_meters(size.x * cfg.foot_sensor_width_factor),
                u.to_meters(cfg.foot_sensor_height),
            ),
            FixtureTag::FootSensor(id),
        )
        .with_offset(Vec2::new(0.0, u.to_meters(size.y / 2.0)))
        .sensor();

        let body = self.world.create_body(
            BodyDef::new(BodyKind::Dynamic, u.vec_to_meters(spawn)),
            vec![body_fixture, foot_fixture],
        );

        let max_jumps = cfg.max_jumps;
        self.players.push(Player {
            id,
            body: Some(body),
            alive: true,
            jumps_remaining: max_jumps,
            max_jumps,
            fast_fall: false,
            grounded: false,
            size,
        });
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id.index())
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(id.index())
    }

    pub fn is_grounded(&self, id: PlayerId) -> bool {
        self.world.listener().is_grounded(id)
    }

    /// Player position in pixels
    pub fn player_position(&self, id: PlayerId) -> Option<Vec2> {
        let body = self.player(id)?.body?;
        self.world.position(body).map(|p| self.units.vec_to_pixels(p))
    }

    /// Remove a player's body and mark it dead
    pub(crate) fn kill_player(&mut self, id: PlayerId) {
        let Some(player) = self.players.get_mut(id.index()) else {
            return;
        };
        player.alive = false;
        player.grounded = false;
        if let Some(body) = player.body.take() {
            self.world.destroy_body(body);
        }
    }

    /// Platform length range for the next spawn
    pub fn current_length_bounds(&self) -> (f32, f32) {
        let factor = self.platform_effect.length_factor(&self.config);
        (
            self.config.platform_min_length * factor,
            self.config.platform_max_length * factor,
        )
    }

    /// Whether pickups spawn and take effect in this run
    pub fn collectibles_enabled(&self) -> bool {
        let features = &self.config.features;
        match self.mode {
            GameMode::PlayingMulti => features.collectibles && features.collectibles_in_multiplayer,
            _ => features.collectibles,
        }
    }

    pub(crate) fn allocate_platform_id(&mut self) -> PlatformId {
        let id = PlatformId(self.next_platform_id);
        self.next_platform_id += 1;
        id
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take the events produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Destroy the bodies of marked entities and drop them from the lists
    pub(crate) fn remove_marked(&mut self) {
        let world = &mut self.world;
        self.platforms.retain(|p| {
            if p.marked_for_removal {
                world.destroy_body(p.body);
            }
            !p.marked_for_removal
        });
        self.collectibles.retain(|c| {
            if c.marked_for_removal {
                world.destroy_body(c.body);
            }
            !c.marked_for_removal
        });
    }

    /// Destroy every player, platform and pickup
    pub(crate) fn clear_entities(&mut self) {
        for player in self.players.drain(..) {
            if let Some(body) = player.body {
                self.world.destroy_body(body);
            }
        }
        for platform in self.platforms.drain(..) {
            self.world.destroy_body(platform.body);
        }
        for collectible in self.collectibles.drain(..) {
            self.world.destroy_body(collectible.body);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::TuningPreset;

    fn session() -> GameSession {
        GameSession::new(GameConfig::default(), 7)
    }

    #[test]
    fn test_new_session_waits_on_start_screen() {
        let session = session();
        assert_eq!(session.mode, GameMode::StartScreen);
        assert!(session.players.is_empty());
        // Ground and ceiling only
        assert_eq!(session.world.body_count(), 2);
        let ground = session.world.position(session.ground()).unwrap();
        assert_eq!(session.units().vec_to_pixels(ground), Vec2::new(600.0, 750.0));
    }

    #[test]
    fn test_start_creates_players() {
        let mut session = session();
        assert!(session.start(PlayMode::Multi, 12));
        assert_eq!(session.mode, GameMode::PlayingMulti);
        assert_eq!(session.players.len(), 2);
        assert_eq!(session.high_score, 12);
        assert_eq!(session.player_position(PlayerId::ONE), Some(Vec2::new(300.0, 500.0)));
        assert_eq!(session.player_position(PlayerId::TWO), Some(Vec2::new(200.0, 500.0)));
        for player in &session.players {
            assert!(player.alive);
            assert_eq!(player.jumps_remaining, 10);
            assert_eq!(player.pose(), Pose::Airborne);
        }
        assert_eq!(
            session.drain_events(),
            vec![GameEvent::Audio(AudioCue::StartMusic)]
        );
        // A running session cannot be restarted
        assert!(!session.start(PlayMode::Single, 0));
    }

    #[test]
    fn test_player_mass_from_density() {
        let mut session = session();
        session.start(PlayMode::Single, 0);
        let body = session.players[0].body.unwrap();
        // 0.8 m x 1.2 m at density 1
        assert!((session.world.mass(body).unwrap() - 0.96).abs() < 1e-5);
    }

    #[test]
    fn test_return_to_menu_clears_entities() {
        let mut session = session();
        session.start(PlayMode::Single, 0);
        assert!(!session.return_to_menu());

        session.mode = GameMode::GameOver;
        assert!(session.return_to_menu());
        assert_eq!(session.mode, GameMode::StartScreen);
        assert!(session.players.is_empty());
        assert_eq!(session.world.body_count(), 2);
    }

    #[test]
    fn test_kill_player_destroys_body() {
        let mut session = session();
        session.start(PlayMode::Multi, 0);
        let body = session.players[0].body.unwrap();
        session.kill_player(PlayerId::ONE);
        assert!(!session.players[0].alive);
        assert!(session.players[0].body.is_none());
        assert!(!session.world.contains(body));
        assert!(session.players[1].alive);
    }

    #[test]
    fn test_length_bounds_follow_effect() {
        let mut session = session();
        assert_eq!(session.current_length_bounds(), (100.0, 300.0));
        session.platform_effect = PlatformEffect::Lengthen;
        assert_eq!(session.current_length_bounds(), (200.0, 600.0));
        session.platform_effect = PlatformEffect::Shorten;
        assert_eq!(session.current_length_bounds(), (50.0, 150.0));
    }

    #[test]
    fn test_collectibles_disabled_in_multiplayer_by_default() {
        let mut session = session();
        session.start(PlayMode::Multi, 0);
        assert!(!session.collectibles_enabled());

        let mut config = GameConfig::default();
        config.features.collectibles_in_multiplayer = true;
        let mut session = GameSession::new(config, 7);
        session.start(PlayMode::Multi, 0);
        assert!(session.collectibles_enabled());
    }

    #[test]
    fn test_difficulty_ramp_caps_and_lerps() {
        let config = GameConfig::from_preset(TuningPreset::Casual);
        let mut difficulty = Difficulty::initial(&config);
        assert_eq!(difficulty.speed_progress(&config), 0.0);

        // 40 s at +5/s reaches half of the 200..600 range
        difficulty.ramp(&config, 40.0);
        assert_eq!(difficulty.block_speed, 400.0);
        assert!((difficulty.min_spawn_time - 1.65).abs() < 1e-5);
        assert!((difficulty.max_spawn_time - 2.5).abs() < 1e-5);

        difficulty.ramp(&config, 1000.0);
        assert_eq!(difficulty.block_speed, 600.0);
        assert!((difficulty.min_spawn_time - 0.8).abs() < 1e-6);
        assert!((difficulty.max_spawn_time - 1.5).abs() < 1e-6);
    }
}
