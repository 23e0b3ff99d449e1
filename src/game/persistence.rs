//! Save and restore a running match
//!
//! A `SavedMatch` carries everything needed to resume: bodies, clock,
//! scores, control modes, the event log and whichever delayed transition was
//! pending with its remaining delay.

use chrono::{DateTime, Utc};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::game::ball::Ball;
use crate::game::engine::MatchEngine;
use crate::game::events::MatchEvent;
use crate::game::player::{AnimationState, ControlMode, PlayerId};
use crate::game::scheduler::Transition;
use crate::game::state::MatchState;
use crate::game::team::{Side, TeamId, TeamStats};
use crate::net::protocol::{decode, encode, DecodeError, EncodeError};
use crate::util::vec3::Vec3;

/// Format version written by `save`
pub const SAVE_VERSION: u32 = 2;

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported save version {0}")]
    UnsupportedVersion(u32),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedTeam {
    pub id: TeamId,
    pub side: Side,
    pub score: u32,
    pub stats: TeamStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedPlayer {
    pub id: PlayerId,
    pub team: TeamId,
    pub position: Vec3,
    pub velocity: Vec3,
    pub acceleration: Vec3,
    pub grounded: bool,
    pub stamina: f32,
    pub has_ball: bool,
    pub ball_control_time: f32,
    pub is_jumping: bool,
    pub is_sliding: bool,
    pub slide_timer: f32,
    pub facing: Vec3,
    pub animation: AnimationState,
    pub control: ControlMode,
}

/// A delayed transition and how long it still had to wait
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendingTransition {
    pub transition: Transition,
    pub remaining: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedMatch {
    pub version: u32,
    pub match_id: Uuid,
    pub saved_at: DateTime<Utc>,
    pub state: MatchState,
    pub ball: Ball,
    pub teams: Vec<SavedTeam>,
    pub players: Vec<SavedPlayer>,
    pub pending: Option<PendingTransition>,
    pub events: Vec<MatchEvent>,
    /// Random stream position, so rolls after a restore match the original
    pub rng: ChaCha8Rng,
}

impl SavedMatch {
    pub fn to_bytes(&self) -> Result<Vec<u8>, PersistenceError> {
        Ok(encode(self)?)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, PersistenceError> {
        let saved: SavedMatch = decode(data)?;
        saved.check_version()
    }

    pub fn to_json(&self) -> Result<String, PersistenceError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, PersistenceError> {
        let saved: SavedMatch = serde_json::from_str(json)?;
        saved.check_version()
    }

    fn check_version(self) -> Result<Self, PersistenceError> {
        if self.version != SAVE_VERSION {
            return Err(PersistenceError::UnsupportedVersion(self.version));
        }
        Ok(self)
    }
}

impl MatchEngine {
    pub fn save(&self) -> SavedMatch {
        let pending = self.pending_transition.and_then(|transition| {
            self.scheduler
                .next_due_in()
                .map(|remaining| PendingTransition { transition, remaining })
        });

        SavedMatch {
            version: SAVE_VERSION,
            match_id: self.match_id,
            saved_at: Utc::now(),
            state: self.state.clone(),
            ball: self.ball.clone(),
            teams: self
                .teams
                .iter()
                .map(|t| SavedTeam {
                    id: t.id,
                    side: t.side,
                    score: t.score,
                    stats: t.stats.clone(),
                })
                .collect(),
            players: self
                .players
                .iter()
                .map(|p| SavedPlayer {
                    id: p.id,
                    team: p.team,
                    position: p.body.position,
                    velocity: p.body.velocity,
                    acceleration: p.body.acceleration,
                    grounded: p.body.grounded,
                    stamina: p.stats.stamina,
                    has_ball: p.has_ball,
                    ball_control_time: p.ball_control_time,
                    is_jumping: p.is_jumping,
                    is_sliding: p.is_sliding,
                    slide_timer: p.slide_timer,
                    facing: p.facing,
                    animation: p.animation,
                    control: p.control,
                })
                .collect(),
            pending,
            events: self.events.clone(),
            rng: self.rng.clone(),
        }
    }

    /// Load a saved match into this engine's squads
    ///
    /// Players are matched by id; saved players this engine does not know
    /// are skipped. Any transition pending in the engine is cancelled and the
    /// saved one rescheduled. Returns the number of players restored.
    pub fn restore(&mut self, saved: &SavedMatch) -> usize {
        self.epoch += 1;
        self.scheduler.cancel_all();
        self.pending_transition = None;

        self.match_id = saved.match_id;
        self.state = saved.state.clone();
        self.ball = saved.ball.clone();
        self.events = saved.events.clone();
        self.rng = saved.rng.clone();

        for team in &saved.teams {
            let target = &mut self.teams[team.id.index()];
            target.side = team.side;
            target.score = team.score;
            target.stats = team.stats.clone();
        }

        let mut restored = 0;
        for sp in &saved.players {
            let Some(&i) = self.index.get(&sp.id) else {
                warn!("Saved match {} has unknown player {}", saved.match_id, sp.id);
                continue;
            };
            let player = &mut self.players[i];
            if player.team != sp.team {
                warn!("Saved player {} changed teams, skipping", sp.id);
                continue;
            }

            player.body.position = sp.position;
            player.body.velocity = sp.velocity;
            player.body.acceleration = sp.acceleration;
            player.body.grounded = sp.grounded;
            player.stats.stamina = sp.stamina.min(player.stats.max_stamina);
            player.has_ball = sp.has_ball;
            player.ball_control_time = sp.ball_control_time;
            player.is_jumping = sp.is_jumping;
            player.is_sliding = sp.is_sliding;
            player.slide_timer = sp.slide_timer;
            player.facing = sp.facing;
            player.animation = sp.animation;
            player.control = sp.control;
            restored += 1;
        }

        self.refresh_targets();
        if let Some(pending) = saved.pending {
            self.schedule(pending.transition, pending.remaining);
        }

        info!(
            "Restored match {} at {:.0}s ({} players, epoch {})",
            self.match_id, self.state.game_time, restored, self.epoch
        );
        restored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MatchConfig;
    use crate::game::constants::physics::DT;
    use crate::game::state::MatchPhase;
    use crate::game::team::Score;

    fn create_running_match(seed: u64) -> MatchEngine {
        let mut engine = MatchEngine::from_config(MatchConfig::seeded(seed)).unwrap();
        engine.start_match();
        for _ in 0..120 {
            engine.tick(DT);
        }
        engine
    }

    #[test]
    fn test_save_restore_players_and_ball() {
        let source = create_running_match(4);
        let saved = source.save();

        let mut target = MatchEngine::from_config(MatchConfig::seeded(99)).unwrap();
        assert_eq!(target.restore(&saved), 22);

        assert_eq!(target.match_id(), source.match_id());
        assert_eq!(target.ball(), source.ball());
        assert_eq!(target.state(), source.state());
        for (a, b) in source.players().iter().zip(target.players()) {
            assert_eq!(a.position(), b.position());
            assert_eq!(a.body.velocity, b.body.velocity);
            assert_eq!(a.stats.stamina, b.stats.stamina);
            assert_eq!(a.has_ball, b.has_ball);
        }
        assert_eq!(target.events().len(), source.events().len());
    }

    #[test]
    fn test_restored_match_continues_identically() {
        let mut source = MatchEngine::from_config(MatchConfig::seeded(21)).unwrap();
        source.start_match();
        for _ in 0..300 {
            source.tick(DT);
            source.advance_timers(DT);
        }
        let saved = SavedMatch::from_bytes(&source.save().to_bytes().unwrap()).unwrap();

        let mut target = MatchEngine::from_config(MatchConfig::seeded(21)).unwrap();
        target.restore(&saved);

        for _ in 0..300 {
            source.tick(DT);
            source.advance_timers(DT);
            target.tick(DT);
            target.advance_timers(DT);
        }
        assert_eq!(target.snapshot(), source.snapshot());
    }

    #[test]
    fn test_pending_transition_survives_restore() {
        let mut source = create_running_match(8);
        source.ball_mut().reposition(Vec3::new(52.6, 0.5, 0.0));
        source.tick(DT);
        source.advance_timers(1.0);
        assert_eq!(source.phase(), MatchPhase::Goal);

        let saved = source.save();
        let pending = saved.pending.unwrap();
        assert_eq!(pending.transition, Transition::ResumeAfterGoal { kicking: TeamId::Away });
        assert!((pending.remaining - 2.0).abs() < 1e-4);

        let mut target = MatchEngine::from_config(MatchConfig::seeded(8)).unwrap();
        target.restore(&saved);
        assert_eq!(target.score(), Score { home: 1, away: 0 });
        assert!(target.advance_timers(1.9).is_empty());
        assert_eq!(target.phase(), MatchPhase::Goal);

        target.advance_timers(0.2);
        assert_eq!(target.phase(), MatchPhase::Playing);
        assert_eq!(target.ball().last_touched_team, Some(TeamId::Away));
    }

    #[test]
    fn test_restore_cancels_engine_timers() {
        let mut engine = create_running_match(2);
        let saved = engine.save();
        assert!(saved.pending.is_none());

        engine.ball_mut().reposition(Vec3::new(-52.6, 0.5, 0.0));
        engine.tick(DT);
        assert_eq!(engine.phase(), MatchPhase::Goal);

        engine.restore(&saved);
        assert_eq!(engine.phase(), MatchPhase::Playing);
        assert_eq!(engine.score(), Score::default());
        assert!(engine.advance_timers(10.0).is_empty());
    }

    #[test]
    fn test_unknown_players_skipped() {
        let source = create_running_match(3);
        let mut saved = source.save();
        saved.players[0].id = 500;

        let mut target = MatchEngine::from_config(MatchConfig::seeded(3)).unwrap();
        assert_eq!(target.restore(&saved), 21);
    }

    #[test]
    fn test_binary_and_json_round_trip() {
        let saved = create_running_match(6).save();

        let from_bytes = SavedMatch::from_bytes(&saved.to_bytes().unwrap()).unwrap();
        assert_eq!(from_bytes, saved);

        let from_json = SavedMatch::from_json(&saved.to_json().unwrap()).unwrap();
        assert_eq!(from_json.players, saved.players);
        assert_eq!(from_json.state, saved.state);
    }

    #[test]
    fn test_version_mismatch_rejected() {
        let mut saved = create_running_match(1).save();
        saved.version = 42;
        let json = saved.to_json().unwrap();
        assert!(matches!(
            SavedMatch::from_json(&json),
            Err(PersistenceError::UnsupportedVersion(42))
        ));
    }
}
