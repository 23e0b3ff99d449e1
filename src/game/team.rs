use serde::{Deserialize, Serialize};

use crate::game::constants::player::MAX_ROSTER;
use crate::game::player::PlayerId;
use crate::game::roster::Formation;
use crate::util::vec3::Vec3;

/// The two clubs in a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamId {
    Home,
    Away,
}

impl TeamId {
    pub const ALL: [TeamId; 2] = [TeamId::Home, TeamId::Away];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            TeamId::Home => 0,
            TeamId::Away => 1,
        }
    }

    #[inline]
    pub fn opponent(self) -> TeamId {
        match self {
            TeamId::Home => TeamId::Away,
            TeamId::Away => TeamId::Home,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TeamId::Home => "home",
            TeamId::Away => "away",
        }
    }
}

/// End of the pitch a team defends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// +1 for the left side, -1 for the right (mirrors formation x)
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Side::Left => 1.0,
            Side::Right => -1.0,
        }
    }

    #[inline]
    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Goals per club
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub home: u32,
    pub away: u32,
}

impl Score {
    pub fn get(&self, team: TeamId) -> u32 {
        match team {
            TeamId::Home => self.home,
            TeamId::Away => self.away,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamStats {
    pub shots: u32,
    pub shots_on_target: u32,
    pub passes: u32,
    pub accurate_passes: u32,
    /// Fraction of passes that were accurate, 0.0 to 1.0
    pub pass_accuracy: f32,
    pub tackles: u32,
    pub fouls: u32,
}

impl TeamStats {
    pub fn record_shot(&mut self, on_target: bool) {
        self.shots += 1;
        if on_target {
            self.shots_on_target += 1;
        }
    }

    pub fn record_pass(&mut self, accurate: bool) {
        self.passes += 1;
        if accurate {
            self.accurate_passes += 1;
        }
        self.pass_accuracy = self.accurate_passes as f32 / self.passes as f32;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub color: String,
    pub side: Side,
    pub score: u32,
    pub stats: TeamStats,
    pub formation: Formation,
    /// Players in insertion order
    roster: Vec<PlayerId>,
    /// Owner of each formation slot
    slots: [Option<PlayerId>; MAX_ROSTER],
}

impl Team {
    pub fn new(id: TeamId, name: impl Into<String>, color: impl Into<String>, side: Side, formation: Formation) -> Self {
        Self {
            id,
            name: name.into(),
            color: color.into(),
            side,
            score: 0,
            stats: TeamStats::default(),
            formation,
            roster: Vec::with_capacity(MAX_ROSTER),
            slots: [None; MAX_ROSTER],
        }
    }

    pub fn roster(&self) -> &[PlayerId] {
        &self.roster
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.roster.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.roster.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.roster.len() >= MAX_ROSTER
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.roster.contains(&id)
    }

    /// Enrol a player, handing out the first free formation slot
    ///
    /// Returns `None` when the roster is full or the player is already on it.
    pub fn add_player(&mut self, id: PlayerId) -> Option<usize> {
        if self.is_full() || self.contains(id) {
            return None;
        }
        let slot = self.slots.iter().position(Option::is_none)?;
        self.slots[slot] = Some(id);
        self.roster.push(id);
        Some(slot)
    }

    pub fn remove_player(&mut self, id: PlayerId) -> bool {
        let Some(index) = self.roster.iter().position(|&p| p == id) else {
            return false;
        };
        self.roster.remove(index);
        for slot in self.slots.iter_mut() {
            if *slot == Some(id) {
                *slot = None;
            }
        }
        true
    }

    /// Slot a player currently holds
    pub fn slot_of(&self, id: PlayerId) -> Option<usize> {
        self.slots.iter().position(|&owner| owner == Some(id))
    }

    /// Pitch position for a formation slot on the current side
    pub fn slot_target(&self, slot: usize) -> Option<Vec3> {
        let spot = self.formation.slots().get(slot)?;
        Some(Vec3::new(spot.x * self.side.sign(), 0.0, spot.z))
    }

    pub fn switch_sides(&mut self) {
        self.side = self.side.opposite();
    }

    /// x coordinate of the goal line this team attacks
    pub fn attacking_goal_x(&self, half_length: f32) -> f32 {
        half_length * self.side.sign()
    }
}
