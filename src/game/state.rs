use serde::{Deserialize, Serialize};

use crate::game::constants::{possession, timing};
use crate::game::team::Side;

/// Match phase
///
/// `Kickoff` → `Playing` ⇄ `Goal`, `Playing` → `Halftime` → `Playing` → `Fulltime`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchPhase {
    /// Waiting for the opening whistle
    #[default]
    Kickoff,
    /// Ball in play, clock running
    Playing,
    /// Celebrating; kickoff reset pending
    Goal,
    /// Break between halves; second half pending
    Halftime,
    /// Match over
    Fulltime,
}

impl MatchPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchPhase::Kickoff => "kickoff",
            MatchPhase::Playing => "playing",
            MatchPhase::Goal => "goal",
            MatchPhase::Halftime => "halftime",
            MatchPhase::Fulltime => "fulltime",
        }
    }
}

/// Seconds of possession credited per side
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PossessionCounter {
    pub left: u32,
    pub right: u32,
}

/// Possession as rounded percentages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PossessionShare {
    pub left: u32,
    pub right: u32,
}

impl PossessionCounter {
    pub fn credit(&mut self, side: Side) {
        match side {
            Side::Left => self.left += 1,
            Side::Right => self.right += 1,
        }
    }

    /// 50/50 before anyone has been credited
    pub fn share(&self) -> PossessionShare {
        let total = self.left + self.right;
        if total == 0 {
            return PossessionShare { left: 50, right: 50 };
        }
        let pct = |n: u32| (n as f64 / total as f64 * 100.0).round() as u32;
        PossessionShare {
            left: pct(self.left),
            right: pct(self.right),
        }
    }
}

/// Clock, half and possession bookkeeping for one match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchState {
    pub phase: MatchPhase,
    /// Match clock in seconds; starts the second half at `half_duration`
    pub game_time: f32,
    pub half: u8,
    pub half_duration: f32,
    /// Stoppage time for the current half
    pub added_time: f32,
    pub possession: PossessionCounter,
    pub last_possession_sample: f32,
}

impl Default for MatchState {
    fn default() -> Self {
        Self::new(timing::HALF_DURATION)
    }
}

impl MatchState {
    pub fn new(half_duration: f32) -> Self {
        Self {
            phase: MatchPhase::Kickoff,
            game_time: 0.0,
            half: 1,
            half_duration,
            added_time: 0.0,
            possession: PossessionCounter::default(),
            last_possession_sample: 0.0,
        }
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.phase == MatchPhase::Playing
    }

    /// Clock reading at which the current half ends
    pub fn half_end(&self) -> f32 {
        let halves = if self.half >= 2 { 2.0 } else { 1.0 };
        self.half_duration * halves + self.added_time
    }

    /// Credit one unit to `side` if a full sample interval has elapsed
    pub fn sample_possession(&mut self, side: Option<Side>) -> bool {
        let Some(side) = side else {
            return false;
        };
        if self.game_time - self.last_possession_sample < possession::SAMPLE_INTERVAL {
            return false;
        }
        self.possession.credit(side);
        self.last_possession_sample = self.game_time;
        true
    }

    /// Move the clock to the start of the second half
    pub fn begin_second_half(&mut self) {
        self.half = 2;
        self.game_time = self.half_duration;
        self.added_time = 0.0;
        self.last_possession_sample = self.game_time;
    }
}
