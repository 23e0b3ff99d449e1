//! The match engine
//!
//! Owns every body and all match bookkeeping. A single writer drives it:
//! actions are applied between ticks, `tick` advances the simulation one
//! fixed step, and `advance_timers` runs delayed transitions at tick
//! boundaries.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{ConfigError, MatchConfig};
use crate::game::ball::Ball;
use crate::game::body::Body;
use crate::game::constants::ai::{CHASE_INTENSITY, DRIBBLE_INTENSITY, RETURN_INTENSITY};
use crate::game::constants::physics::{GRAVITY, GROUND_LEVEL};
use crate::game::constants::{ball as ball_consts, player as player_consts};
use crate::game::events::{EventBus, EventKind, EventTag, MatchEvent, SubscriptionId};
use crate::game::field::{Field, OutOfBounds};
use crate::game::match_result::MatchStatistics;
use crate::game::player::{ControlMode, ControllerId, Player, PlayerId, PlayerStats};
use crate::game::roster::{DefaultRoster, RosterProvider};
use crate::game::scheduler::{DeferredTask, Scheduler, TimerQueue, Transition};
use crate::game::state::{MatchPhase, MatchState, PossessionShare};
use crate::game::systems::actions::{self, KickRequest, TackleOutcome};
use crate::game::systems::ai::{self, AiDecision};
use crate::game::systems::rules::{self, Whistle};
use crate::game::systems::{collision, physics, possession};
use crate::game::team::{Score, Side, Team, TeamId};
use crate::net::protocol::{
    ActionRecord, BallSnapshot, MatchSnapshot, PlayerAction, PlayerSnapshot, TeamSnapshot,
};
use crate::util::vec3::Vec3;

pub struct MatchEngine {
    pub(crate) match_id: Uuid,
    pub(crate) config: MatchConfig,
    pub(crate) field: Field,
    pub(crate) ball: Ball,
    pub(crate) teams: [Team; 2],
    /// Roster order; AI and possession run in this order
    pub(crate) players: Vec<Player>,
    pub(crate) index: FxHashMap<PlayerId, usize>,
    pub(crate) state: MatchState,
    pub(crate) events: Vec<MatchEvent>,
    bus: EventBus,
    pub(crate) scheduler: Box<dyn Scheduler>,
    pub(crate) pending_transition: Option<Transition>,
    /// Bumped on teardown and restore; older deferred tasks are ignored
    pub(crate) epoch: u64,
    pub(crate) rng: ChaCha8Rng,
    next_id: PlayerId,
}

impl MatchEngine {
    /// Engine over the default red/blue squads in the configured formations
    pub fn from_config(config: MatchConfig) -> Result<Self, ConfigError> {
        let (home, away) = config.formations()?;
        Self::new(config, &DefaultRoster::new(home, away))
    }

    pub fn new(config: MatchConfig, roster: &dyn RosterProvider) -> Result<Self, ConfigError> {
        Self::with_scheduler(config, roster, Box::new(TimerQueue::new()))
    }

    pub fn with_scheduler(
        config: MatchConfig,
        roster: &dyn RosterProvider,
        scheduler: Box<dyn Scheduler>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let rng = match config.rng_seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let sheets = [roster.team_sheet(TeamId::Home), roster.team_sheet(TeamId::Away)];
        let teams = [TeamId::Home, TeamId::Away].map(|id| {
            let sheet = &sheets[id.index()];
            Team::new(id, sheet.name.clone(), sheet.color.clone(), sheet.side, sheet.formation)
        });

        let mut engine = Self {
            match_id: Uuid::new_v4(),
            state: MatchState::new(config.half_duration),
            config,
            field: Field::default(),
            ball: Ball::at_centre(),
            teams,
            players: Vec::with_capacity(2 * player_consts::MAX_ROSTER),
            index: FxHashMap::default(),
            events: Vec::new(),
            bus: EventBus::new(),
            scheduler,
            pending_transition: None,
            epoch: 0,
            rng,
            next_id: 1,
        };

        for (team, sheet) in TeamId::ALL.into_iter().zip(sheets.iter()) {
            for entry in &sheet.players {
                let stats = PlayerStats::build(&entry.stats, entry.archetype)?;
                let player = Player::new(engine.next_id, entry.name.clone(), team, entry.start, stats);
                if !engine.add_player(player) {
                    warn!("Dropped {} from {}: roster full", entry.name, sheet.name);
                }
            }
        }

        info!(
            "Match {} created: {} ({}) vs {} ({})",
            engine.match_id,
            engine.teams[0].name,
            engine.teams[0].formation,
            engine.teams[1].name,
            engine.teams[1].formation
        );
        Ok(engine)
    }

    // --- roster -----------------------------------------------------------

    /// Enrol a player in their team's first free formation slot
    ///
    /// False when the id is taken or the team already has eleven.
    pub fn add_player(&mut self, mut player: Player) -> bool {
        if self.index.contains_key(&player.id) {
            debug!("Player id {} already in use", player.id);
            return false;
        }
        let team = &mut self.teams[player.team.index()];
        let Some(slot) = team.add_player(player.id) else {
            debug!("{} is full, cannot add {}", team.name, player.name);
            return false;
        };

        player.formation_slot = Some(slot);
        if let Some(target) = team.slot_target(slot) {
            player.target_position = target;
        }
        self.next_id = self.next_id.max(player.id.saturating_add(1));
        self.index.insert(player.id, self.players.len());
        self.players.push(player);
        true
    }

    pub fn remove_player(&mut self, id: PlayerId) -> bool {
        let Some(&idx) = self.index.get(&id) else {
            return false;
        };
        // Controllers hear about it before the id disappears
        self.unassign_player_from_human(id);
        self.index.remove(&id);
        let player = self.players.remove(idx);
        self.teams[player.team.index()].remove_player(id);
        self.reindex();
        info!("Removed {} ({}) from {}", player.name, id, self.teams[player.team.index()].name);
        true
    }

    /// Next unused player id
    pub fn next_player_id(&self) -> PlayerId {
        self.next_id
    }

    pub(crate) fn reindex(&mut self) {
        self.index.clear();
        for (i, player) in self.players.iter().enumerate() {
            self.index.insert(player.id, i);
        }
    }

    /// Hand a player to a human controller
    ///
    /// Refused for unknown players and for players another human controls.
    pub fn assign_player_to_human(&mut self, id: PlayerId, controller: ControllerId) -> bool {
        let Some(&i) = self.index.get(&id) else {
            warn!("Controller {} asked for unknown player {}", controller, id);
            return false;
        };
        if let ControlMode::Human(current) = self.players[i].control {
            if current != controller {
                debug!("Player {} already controlled by {}", id, current);
                return false;
            }
        }

        self.players[i].control = ControlMode::Human(controller);
        info!("Player {} ({}) assigned to {}", self.players[i].name, id, controller);
        self.emit(EventKind::PlayerAssigned { player_id: id, controller });
        true
    }

    /// Return a human-controlled player to the AI
    pub fn unassign_player_from_human(&mut self, id: PlayerId) -> bool {
        let Some(&i) = self.index.get(&id) else {
            return false;
        };
        if self.players[i].is_ai() {
            return false;
        }

        self.players[i].control = ControlMode::Ai;
        info!("Player {} ({}) back under AI control", self.players[i].name, id);
        self.emit(EventKind::PlayerUnassigned { player_id: id });
        true
    }

    // --- match flow -------------------------------------------------------

    /// Opening whistle: line up and start the clock
    pub fn start_match(&mut self) -> bool {
        if self.state.phase != MatchPhase::Kickoff {
            return false;
        }
        self.reset_for_kickoff(TeamId::Home);
        self.ball.last_touched_team = None;
        self.state.phase = MatchPhase::Playing;
        info!("Match {} kicked off", self.match_id);
        true
    }

    /// Set the full match length; each half gets half of it
    pub fn set_match_duration(&mut self, minutes: f32) -> Result<(), ConfigError> {
        if !(minutes > 0.0 && minutes.is_finite()) {
            return Err(ConfigError::InvalidTiming {
                name: "match_duration",
                value: minutes,
            });
        }
        self.state.half_duration = minutes * 60.0 / 2.0;
        info!("Match duration set to {} minutes", minutes);
        Ok(())
    }

    /// Extend the current half
    pub fn add_stoppage_time(&mut self, seconds: f32) -> bool {
        if !(seconds > 0.0 && seconds.is_finite()) {
            return false;
        }
        self.state.added_time += seconds;
        info!("{:.0}s of stoppage time added to half {}", seconds, self.state.half);
        true
    }

    /// Advance one fixed step and return the events it produced
    pub fn tick(&mut self, dt: f32) -> Vec<MatchEvent> {
        if !self.state.is_playing() {
            return Vec::new();
        }
        let first = self.events.len();

        self.state.game_time += dt;
        let touching_side = self.ball.last_touched_team.map(|team| self.teams[team.index()].side);
        self.state.sample_possession(touching_side);

        for i in 0..self.players.len() {
            let player = &mut self.players[i];
            physics::apply_gravity(&mut player.body, GRAVITY);
            if collision::resolve_ground(&mut player.body, GROUND_LEVEL, player_consts::REST_THRESHOLD) {
                player.is_jumping = false;
            }
            physics::clamp_to_field(&mut player.body, &self.field, player_consts::BOUNDS_BUFFER);
            player.update(dt);

            possession::check_possession(&mut self.players, i, &mut self.ball, self.state.game_time);
        }

        physics::apply_gravity(&mut self.ball.body, GRAVITY);
        collision::resolve_ground(&mut self.ball.body, GROUND_LEVEL, ball_consts::REST_THRESHOLD);
        self.ball.update(dt);

        {
            let mut bodies: SmallVec<[&mut Body; 24]> = self.players.iter_mut().map(|p| &mut p.body).collect();
            bodies.push(&mut self.ball.body);
            collision::resolve_contacts(&mut bodies[..], self.config.separation);
        }

        if let Some(side) = self.field.check_goal(self.ball.position()) {
            self.on_goal(side);
        }

        if self.state.is_playing() {
            if let Some(kind) = self.field.out_of_bounds_kind(self.ball.position()) {
                self.on_out_of_bounds(kind);
            }
        }

        match rules::check_clock(&self.state) {
            Some(Whistle::Halftime) => self.on_halftime(),
            Some(Whistle::Fulltime) => self.on_fulltime(),
            None => {}
        }

        if self.state.is_playing() {
            self.run_ai();
        }

        self.events[first..].to_vec()
    }

    /// Feed elapsed time to the scheduler and run whatever fell due
    pub fn advance_timers(&mut self, elapsed: f32) -> Vec<MatchEvent> {
        let first = self.events.len();
        for task in self.scheduler.take_due(elapsed) {
            if task.epoch != self.epoch {
                debug!("Dropping stale {:?} from epoch {}", task.transition, task.epoch);
                continue;
            }
            self.run_transition(task.transition);
        }
        self.events[first..].to_vec()
    }

    /// Cancel pending transitions; anything already handed out is now stale
    pub fn teardown(&mut self) {
        self.epoch += 1;
        self.scheduler.cancel_all();
        self.pending_transition = None;
        info!("Match {} torn down", self.match_id);
    }

    pub(crate) fn schedule(&mut self, transition: Transition, delay: f32) {
        self.pending_transition = Some(transition);
        self.scheduler.schedule_after(
            delay,
            DeferredTask {
                epoch: self.epoch,
                transition,
            },
        );
        debug!("Scheduled {:?} in {:.1}s", transition, delay);
    }

    fn run_transition(&mut self, transition: Transition) {
        self.pending_transition = None;
        match transition {
            Transition::ResumeAfterGoal { kicking } => {
                if self.state.phase != MatchPhase::Goal {
                    debug!("Ignoring kickoff reset during {}", self.state.phase.as_str());
                    return;
                }
                self.reset_for_kickoff(kicking);
                self.state.phase = MatchPhase::Playing;
                info!("Play resumes, {} to kick off", self.teams[kicking.index()].name);
            }
            Transition::StartSecondHalf => {
                if self.state.phase != MatchPhase::Halftime {
                    debug!("Ignoring second half start during {}", self.state.phase.as_str());
                    return;
                }
                self.start_second_half();
            }
        }
    }

    fn on_goal(&mut self, side: Side) {
        let team = rules::team_on_side(&self.teams, side);
        self.teams[team.index()].score += 1;
        self.state.phase = MatchPhase::Goal;

        let score = self.score();
        let scorer = self.ball.last_touched_by;
        info!(
            "GOAL for {} at {:.0}s ({}-{})",
            self.teams[team.index()].name,
            self.state.game_time,
            score.home,
            score.away
        );
        self.emit(EventKind::Goal {
            team,
            side,
            scorer,
            score,
        });
        self.schedule(
            Transition::ResumeAfterGoal {
                kicking: team.opponent(),
            },
            self.config.goal_reset_delay,
        );
    }

    fn on_out_of_bounds(&mut self, kind: OutOfBounds) {
        let position = self.ball.position();
        self.emit(EventKind::OutOfBounds {
            kind,
            position,
            last_touched_team: self.ball.last_touched_team,
        });

        let spot = rules::restart_spot(&self.field, kind, position);
        self.ball.reposition(spot);
        self.ball.in_play = true;
    }

    fn on_halftime(&mut self) {
        self.state.phase = MatchPhase::Halftime;
        let score = self.score();
        info!("Half-time: {}-{}", score.home, score.away);
        self.emit(EventKind::Halftime);
        self.schedule(Transition::StartSecondHalf, self.config.halftime_delay);
    }

    fn on_fulltime(&mut self) {
        self.state.phase = MatchPhase::Fulltime;
        let score = self.score();
        info!("Full-time: {}-{}", score.home, score.away);
        self.emit(EventKind::Fulltime { score });
    }

    fn start_second_half(&mut self) {
        self.state.begin_second_half();
        for team in self.teams.iter_mut() {
            team.switch_sides();
        }

        let kicking = match self.ball.last_touched_team {
            Some(team) => team.opponent(),
            None => TeamId::Home,
        };
        self.reset_for_kickoff(kicking);
        self.state.phase = MatchPhase::Playing;

        info!("Second half underway, {} kick off", self.teams[kicking.index()].name);
        self.emit(EventKind::SecondHalfStart { kicking_team: kicking });
    }

    /// Recompute formation targets after a change of sides
    pub(crate) fn refresh_targets(&mut self) {
        let teams = &self.teams;
        for player in self.players.iter_mut() {
            if let Some(target) = player
                .formation_slot
                .and_then(|slot| teams[player.team.index()].slot_target(slot))
            {
                player.target_position = target;
            }
        }
    }

    /// Ball to the centre spot, everyone back to their formation spot
    fn reset_for_kickoff(&mut self, kicking: TeamId) {
        self.ball.place_for_kickoff(kicking);

        let teams = &self.teams;
        for player in self.players.iter_mut() {
            let target = player
                .formation_slot
                .and_then(|slot| teams[player.team.index()].slot_target(slot));
            match target {
                Some(target) => {
                    player.target_position = target;
                    player.reset_to(Vec3::new(target.x, player.body.radius(), target.z));
                }
                None => player.has_ball = false,
            }
        }
    }

    // --- actions ----------------------------------------------------------

    /// Apply one command; false when it is not allowed right now
    pub fn handle_player_action(&mut self, record: &ActionRecord) -> bool {
        if !self.state.is_playing() {
            debug!(
                "Ignoring {} for player {} during {}",
                record.action.name(),
                record.player_id,
                self.state.phase.as_str()
            );
            return false;
        }
        let Some(&i) = self.index.get(&record.player_id) else {
            debug!("Ignoring {} for unknown player {}", record.action.name(), record.player_id);
            return false;
        };
        if !actions::is_well_formed(&record.action) {
            warn!("Malformed {} from player {}", record.action.name(), record.player_id);
            return false;
        }

        let accepted = match &record.action {
            PlayerAction::Move { x, z, intensity } => self.players[i].apply_move(Vec3::planar(*x, *z), *intensity),
            PlayerAction::Jump => self.players[i].jump(),
            PlayerAction::Slide { x, z } => self.players[i].slide_tackle(Vec3::planar(*x, *z)),
            PlayerAction::Kick { direction, power, spin } => self.perform_kick(
                i,
                KickRequest {
                    direction: *direction,
                    power: *power,
                    spin: *spin,
                },
            ),
            PlayerAction::Pass { target, power } => self.perform_pass(i, *target, *power),
            PlayerAction::Tackle => self.perform_tackle(i),
        };

        if accepted {
            self.emit(EventKind::PlayerAction {
                player_id: record.player_id,
                action: record.action.clone(),
            });
        } else {
            debug!("Rejected {} for player {}", record.action.name(), record.player_id);
        }
        accepted
    }

    fn perform_kick(&mut self, i: usize, request: KickRequest) -> bool {
        let (id, team) = (self.players[i].id, self.players[i].team);
        let attacked = self.teams[team.index()].side.opposite();

        let Some(outcome) = actions::kick(
            &self.players[i],
            &mut self.ball,
            &self.field,
            attacked,
            request,
            self.state.game_time,
            &mut self.rng,
        ) else {
            return false;
        };

        self.teams[team.index()].stats.record_shot(outcome.on_target);
        self.emit(EventKind::BallKicked {
            player_id: id,
            direction: outcome.direction,
            power: outcome.power,
            on_target: outcome.on_target,
        });
        true
    }

    fn perform_pass(&mut self, i: usize, target: PlayerId, power: Option<f32>) -> bool {
        let Some(&t) = self.index.get(&target) else {
            return false;
        };
        let (id, team) = (self.players[i].id, self.players[i].team);

        let Some(outcome) = actions::pass(
            &self.players[i],
            &self.players[t],
            &mut self.ball,
            power,
            self.state.game_time,
            &mut self.rng,
        ) else {
            return false;
        };

        self.teams[team.index()].stats.record_pass(outcome.accurate);
        self.emit(EventKind::BallPassed {
            player_id: id,
            target_id: outcome.target,
            direction: outcome.direction,
            accurate: outcome.accurate,
        });
        true
    }

    fn perform_tackle(&mut self, i: usize) -> bool {
        let (id, team) = (self.players[i].id, self.players[i].team);
        let outcomes = actions::tackle(&mut self.players, i, &mut self.ball, &mut self.rng);
        if outcomes.is_empty() {
            return false;
        }

        for outcome in outcomes {
            match outcome {
                TackleOutcome::Won { tackled, took_ball } => {
                    self.teams[team.index()].stats.tackles += 1;
                    self.emit(EventKind::Tackle {
                        tackler: id,
                        tackled,
                        won_ball: took_ball,
                    });
                }
                TackleOutcome::Foul { fouled } => {
                    self.teams[team.index()].stats.fouls += 1;
                    self.emit(EventKind::Foul { fouler: id, fouled });
                }
                TackleOutcome::Missed { .. } => {}
            }
        }
        true
    }

    fn run_ai(&mut self) {
        for i in 0..self.players.len() {
            if !self.players[i].is_ai() {
                continue;
            }
            let team = self.players[i].team;
            let goal = self.field.goal_center(self.teams[team.index()].side.opposite());
            let decision = ai::decide(&self.players[i], &self.players, self.ball.position(), goal, &mut self.rng);

            match decision {
                AiDecision::Idle => {}
                AiDecision::Chase { direction } => {
                    self.players[i].apply_move(direction, CHASE_INTENSITY);
                }
                AiDecision::Dribble { direction } => {
                    self.players[i].apply_move(direction, DRIBBLE_INTENSITY);
                }
                AiDecision::ReturnToShape { direction } => {
                    self.players[i].apply_move(direction, RETURN_INTENSITY);
                }
                AiDecision::Pass { target, power } => {
                    self.perform_pass(i, target, Some(power));
                }
                AiDecision::Shoot { direction, power } => {
                    self.perform_kick(
                        i,
                        KickRequest {
                            direction: Some(direction),
                            power: Some(power),
                            spin: Vec3::ZERO,
                        },
                    );
                }
            }
        }
    }

    // --- events -----------------------------------------------------------

    /// Append to the log, then notify listeners
    fn emit(&mut self, kind: EventKind) {
        self.events.push(MatchEvent::now(self.state.game_time, kind));
        if let Some(event) = self.events.last() {
            self.bus.dispatch(event);
        }
    }

    pub fn subscribe<F>(&mut self, tag: EventTag, listener: F) -> SubscriptionId
    where
        F: FnMut(&MatchEvent) + Send + 'static,
    {
        self.bus.subscribe(tag, Box::new(listener))
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    // --- views ------------------------------------------------------------

    pub fn match_id(&self) -> Uuid {
        self.match_id
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn phase(&self) -> MatchPhase {
        self.state.phase
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn game_time(&self) -> f32 {
        self.state.game_time
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    /// Direct access for scripted restarts and scenario setup
    pub fn ball_mut(&mut self) -> &mut Ball {
        &mut self.ball
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.index.get(&id).map(|&i| &self.players[i])
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.index.get(&id).map(|&i| &mut self.players[i])
    }

    pub fn team(&self, id: TeamId) -> &Team {
        &self.teams[id.index()]
    }

    pub fn score(&self) -> Score {
        Score {
            home: self.teams[TeamId::Home.index()].score,
            away: self.teams[TeamId::Away.index()].score,
        }
    }

    pub fn possession_share(&self) -> PossessionShare {
        self.state.possession.share()
    }

    pub fn events(&self) -> &[MatchEvent] {
        &self.events
    }

    pub fn pending_transition(&self) -> Option<Transition> {
        self.pending_transition
    }

    pub fn statistics(&self) -> MatchStatistics {
        MatchStatistics::collect(&self.state, &self.teams, self.events.len())
    }

    /// Where the ball will be over the next `steps` ticks if nobody touches it
    pub fn predict_ball_trajectory(&self, steps: usize) -> Vec<Vec3> {
        collision::predict_trajectory(&self.ball, GRAVITY, GROUND_LEVEL, steps, self.config.dt())
    }

    pub fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot {
            match_id: self.match_id,
            phase: self.state.phase,
            game_time: self.state.game_time,
            half: self.state.half,
            score: self.score(),
            possession: self.possession_share(),
            ball: BallSnapshot {
                position: self.ball.position(),
                velocity: self.ball.velocity(),
                spin: self.ball.spin,
                last_touched_by: self.ball.last_touched_by,
                last_touched_team: self.ball.last_touched_team,
            },
            teams: self
                .teams
                .iter()
                .map(|team| TeamSnapshot {
                    id: team.id,
                    name: team.name.clone(),
                    color: team.color.clone(),
                    score: team.score,
                    side: team.side,
                    formation: team.formation,
                    stats: team.stats.clone(),
                    player_count: team.len() as u32,
                })
                .collect(),
            players: self
                .players
                .iter()
                .map(|p| PlayerSnapshot {
                    id: p.id,
                    name: p.name.clone(),
                    team: p.team,
                    position: p.position(),
                    velocity: p.body.velocity,
                    facing: p.facing,
                    has_ball: p.has_ball,
                    is_ai: p.is_ai(),
                    controller: p.controller(),
                    animation: p.animation,
                    archetype: p.stats.archetype,
                    stamina: p.stats.stamina,
                    max_stamina: p.stats.max_stamina,
                })
                .collect(),
        }
    }
}

impl std::fmt::Debug for MatchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchEngine")
            .field("match_id", &self.match_id)
            .field("phase", &self.state.phase)
            .field("game_time", &self.state.game_time)
            .field("players", &self.players.len())
            .field("events", &self.events.len())
            .field("epoch", &self.epoch)
            .finish()
    }
}
