//! Fixture tags and the contact state tracker
//!
//! Every fixture carries a `FixtureTag` saying what it is in the game. The
//! tracker listens to world contacts and keeps the per-player facts the game
//! loop needs after each step: grounded counts, ground touches, and which
//! collectibles were touched.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::state::CollectibleKind;
use super::world::{BodyHandle, Contact, ContactListener, FixtureRef};
use crate::consts::MAX_PLAYERS;

/// Player index (0-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    pub const ONE: PlayerId = PlayerId(0);
    pub const TWO: PlayerId = PlayerId(1);

    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// 1-based number shown to players
    pub fn number(self) -> u8 {
        self.0 + 1
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player {}", self.number())
    }
}

/// Platform identity; allocated from `PLATFORM_ID_BASE` upward
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlatformId(pub u32);

/// What a fixture is, for contact classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FixtureTag {
    /// Main collidable box of a player
    PlayerBody(PlayerId),
    /// Sensor under a player's feet
    FootSensor(PlayerId),
    /// Invisible floor below the screen
    Ground,
    /// Invisible bound above the screen
    Ceiling,
    Platform(PlatformId),
    Collectible(CollectibleKind),
}

impl FixtureTag {
    pub fn player_body(&self) -> Option<PlayerId> {
        match *self {
            FixtureTag::PlayerBody(p) => Some(p),
            _ => None,
        }
    }

    pub fn foot_sensor(&self) -> Option<PlayerId> {
        match *self {
            FixtureTag::FootSensor(p) => Some(p),
            _ => None,
        }
    }

    pub fn is_platform(&self) -> bool {
        matches!(self, FixtureTag::Platform(_))
    }
}

/// Order a pair so that the side matching `pick` comes first
fn split<'a, T>(
    contact: &'a Contact,
    pick: impl Fn(&FixtureTag) -> Option<T>,
) -> Option<(T, &'a FixtureRef)> {
    if let Some(v) = pick(&contact.fixture_a.tag) {
        Some((v, &contact.fixture_b))
    } else {
        pick(&contact.fixture_b.tag).map(|v| (v, &contact.fixture_a))
    }
}

/// Contact-derived state for each player
#[derive(Debug, Clone, Default)]
pub struct ContactTracker {
    foot_contacts: [u32; MAX_PLAYERS],
    ground_touched: [bool; MAX_PLAYERS],
    /// Appended during the step, drained by the game loop afterwards
    touched_collectibles: Vec<BodyHandle>,
}

impl ContactTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_grounded(&self, player: PlayerId) -> bool {
        self.foot_contacts(player) > 0
    }

    pub fn foot_contacts(&self, player: PlayerId) -> u32 {
        self.foot_contacts.get(player.index()).copied().unwrap_or(0)
    }

    pub fn has_touched_ground(&self, player: PlayerId) -> bool {
        self.ground_touched
            .get(player.index())
            .copied()
            .unwrap_or(false)
    }

    pub fn touched_collectibles(&self) -> &[BodyHandle] {
        &self.touched_collectibles
    }

    /// Hand over the collectibles touched since the last drain
    pub fn take_touched_collectibles(&mut self) -> Vec<BodyHandle> {
        std::mem::take(&mut self.touched_collectibles)
    }

    pub fn reset(&mut self) {
        self.foot_contacts = [0; MAX_PLAYERS];
        self.ground_touched = [false; MAX_PLAYERS];
        self.touched_collectibles.clear();
    }
}

impl ContactListener for ContactTracker {
    fn begin_contact(&mut self, contact: &Contact) {
        if let Some((player, other)) = split(contact, FixtureTag::foot_sensor) {
            if other.tag.is_platform() {
                if let Some(count) = self.foot_contacts.get_mut(player.index()) {
                    *count += 1;
                }
            }
        }

        if let Some((player, other)) = split(contact, FixtureTag::player_body) {
            match other.tag {
                FixtureTag::Ground => {
                    if let Some(flag) = self.ground_touched.get_mut(player.index()) {
                        *flag = true;
                    }
                }
                FixtureTag::Collectible(kind) => {
                    log::trace!("{player} touched {kind:?}");
                    self.touched_collectibles.push(other.body());
                }
                _ => {}
            }
        }
    }

    fn end_contact(&mut self, contact: &Contact) {
        // Ground touches stay latched for the rest of the life
        if let Some((player, other)) = split(contact, FixtureTag::foot_sensor) {
            if other.tag.is_platform() {
                if let Some(count) = self.foot_contacts.get_mut(player.index()) {
                    *count = count.saturating_sub(1);
                }
            }
        }
    }

    fn pre_solve(&mut self, contact: &mut Contact) {
        // Platforms must never drag a player sideways
        let zero = split(contact, FixtureTag::player_body)
            .is_some_and(|(_, other)| other.tag.is_platform());
        if zero {
            contact.friction = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::world::{BodyDef, BodyKind, FixtureKey, PhysicsWorld};
    use glam::Vec2;
    use proptest::prelude::*;

    /// Handle of the `n`th body created in a fresh world
    fn handle(n: u32) -> BodyHandle {
        let mut world = PhysicsWorld::new(Vec2::ZERO, ());
        let mut last = world.create_body(BodyDef::new(BodyKind::Static, Vec2::ZERO), vec![]);
        for _ in 0..n {
            last = world.create_body(BodyDef::new(BodyKind::Static, Vec2::ZERO), vec![]);
        }
        last
    }

    fn fixture(body: u32, tag: FixtureTag, is_sensor: bool) -> FixtureRef {
        FixtureRef {
            key: FixtureKey {
                body: handle(body),
                index: 0,
            },
            tag,
            is_sensor,
        }
    }

    fn contact(a: FixtureRef, b: FixtureRef) -> Contact {
        Contact {
            fixture_a: a,
            fixture_b: b,
            normal: Vec2::Y,
            penetration: 0.0,
            friction: 0.6,
            enabled: true,
        }
    }

    fn foot(p: PlayerId) -> FixtureRef {
        fixture(0, FixtureTag::FootSensor(p), true)
    }

    fn platform(id: u32) -> FixtureRef {
        fixture(1, FixtureTag::Platform(PlatformId(id)), false)
    }

    #[test]
    fn test_foot_counter_tracks_platforms() {
        let mut tracker = ContactTracker::new();
        let p = PlayerId::TWO;
        tracker.begin_contact(&contact(foot(p), platform(1000)));
        tracker.begin_contact(&contact(platform(1001), foot(p)));
        assert_eq!(tracker.foot_contacts(p), 2);
        assert!(tracker.is_grounded(p));
        assert!(!tracker.is_grounded(PlayerId::ONE));

        tracker.end_contact(&contact(foot(p), platform(1000)));
        assert!(tracker.is_grounded(p));
        tracker.end_contact(&contact(platform(1001), foot(p)));
        assert!(!tracker.is_grounded(p));
    }

    #[test]
    fn test_foot_sensor_ignores_non_platforms() {
        let mut tracker = ContactTracker::new();
        let ground = fixture(2, FixtureTag::Ground, false);
        tracker.begin_contact(&contact(foot(PlayerId::ONE), ground));
        assert!(!tracker.is_grounded(PlayerId::ONE));
        // Foot sensor on the ground is not a death
        assert!(!tracker.has_touched_ground(PlayerId::ONE));
    }

    #[test]
    fn test_ground_touch_latches() {
        let mut tracker = ContactTracker::new();
        let body = fixture(0, FixtureTag::PlayerBody(PlayerId::ONE), false);
        let ground = fixture(2, FixtureTag::Ground, false);
        tracker.begin_contact(&contact(ground, body));
        assert!(tracker.has_touched_ground(PlayerId::ONE));
        tracker.end_contact(&contact(ground, body));
        assert!(tracker.has_touched_ground(PlayerId::ONE));
        assert!(!tracker.has_touched_ground(PlayerId::TWO));
    }

    #[test]
    fn test_collectible_queue_holds_bodies() {
        let mut tracker = ContactTracker::new();
        let body = fixture(0, FixtureTag::PlayerBody(PlayerId::ONE), false);
        let coin = fixture(3, FixtureTag::Collectible(CollectibleKind::ScoreBig), true);
        tracker.begin_contact(&contact(body, coin));
        // The foot sensor touching a collectible does not collect it
        tracker.begin_contact(&contact(foot(PlayerId::ONE), coin));
        assert_eq!(tracker.touched_collectibles(), &[coin.body()]);

        let drained = tracker.take_touched_collectibles();
        assert_eq!(drained, vec![coin.body()]);
        assert!(tracker.touched_collectibles().is_empty());
    }

    #[test]
    fn test_pre_solve_zeroes_platform_friction_only() {
        let mut tracker = ContactTracker::new();
        let body = fixture(0, FixtureTag::PlayerBody(PlayerId::ONE), false);

        let mut on_platform = contact(platform(1000), body);
        tracker.pre_solve(&mut on_platform);
        assert_eq!(on_platform.friction, 0.0);

        let mut on_ceiling = contact(body, fixture(4, FixtureTag::Ceiling, false));
        tracker.pre_solve(&mut on_ceiling);
        assert_eq!(on_ceiling.friction, 0.6);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut tracker = ContactTracker::new();
        let body = fixture(0, FixtureTag::PlayerBody(PlayerId::ONE), false);
        tracker.begin_contact(&contact(foot(PlayerId::ONE), platform(1000)));
        tracker.begin_contact(&contact(body, fixture(2, FixtureTag::Ground, false)));
        tracker.begin_contact(&contact(
            body,
            fixture(3, FixtureTag::Collectible(CollectibleKind::ScoreSmall), true),
        ));
        tracker.reset();
        assert!(!tracker.is_grounded(PlayerId::ONE));
        assert!(!tracker.has_touched_ground(PlayerId::ONE));
        assert!(tracker.touched_collectibles().is_empty());
    }

    proptest! {
        #[test]
        fn prop_foot_counter_never_negative(ops in prop::collection::vec(any::<bool>(), 0..64)) {
            let mut tracker = ContactTracker::new();
            let p = PlayerId::ONE;
            let mut expected: u32 = 0;
            for begin in ops {
                let c = contact(foot(p), platform(1000));
                if begin {
                    tracker.begin_contact(&c);
                    expected += 1;
                } else {
                    tracker.end_contact(&c);
                    expected = expected.saturating_sub(1);
                }
                prop_assert_eq!(tracker.foot_contacts(p), expected);
                prop_assert_eq!(tracker.is_grounded(p), expected > 0);
            }
        }
    }
}
