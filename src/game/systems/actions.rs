//! Ball-striking and tackling
//!
//! Each function resolves one action against the current bodies and returns
//! what happened; the engine turns outcomes into events and team stats.

use rand::Rng;
use smallvec::SmallVec;

use crate::game::ball::{Ball, Touch};
use crate::game::constants::actions::*;
use crate::game::field::Field;
use crate::game::player::{ActionKind, Player, PlayerId};
use crate::game::team::Side;
use crate::net::protocol::PlayerAction;
use crate::util::vec3::Vec3;

/// Default kick direction: straight down +x with a little lift
pub const DEFAULT_KICK_DIRECTION: Vec3 = Vec3 { x: 1.0, y: 0.2, z: 0.0 };

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KickOutcome {
    /// Direction after jitter, not normalized
    pub direction: Vec3,
    pub power: f32,
    pub on_target: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassOutcome {
    pub target: PlayerId,
    pub direction: Vec3,
    pub accurate: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TackleOutcome {
    Won { tackled: PlayerId, took_ball: bool },
    Foul { fouled: PlayerId },
    Missed { opponent: PlayerId },
}

/// Skill stat scaled into [0, 1]
#[inline]
fn accuracy(skill: f32, scale: f32) -> f32 {
    (skill / scale).clamp(0.0, 1.0)
}

/// Uniform offset in [-factor/2, factor/2)
#[inline]
fn jitter<R: Rng>(rng: &mut R, factor: f32) -> f32 {
    (rng.gen::<f32>() - 0.5) * factor
}

/// Whether the ball is close enough for `action`
pub fn in_reach(player: &Player, ball: &Ball, action: ActionKind) -> bool {
    player.position().distance_to(ball.position()) <= player.action_radius(action)
}

/// Strike the ball toward `attacked` goal
///
/// Jitter shrinks with the shooting stat; at 10 or above the ball goes
/// exactly where aimed. Three random draws are taken regardless.
pub fn kick<R: Rng>(
    player: &Player,
    ball: &mut Ball,
    field: &Field,
    attacked: Side,
    request: KickRequest,
    game_time: f32,
    rng: &mut R,
) -> Option<KickOutcome> {
    if !in_reach(player, ball, ActionKind::Kick) {
        return None;
    }

    let aim = request.direction.unwrap_or(DEFAULT_KICK_DIRECTION);
    let power = request.power.unwrap_or(KICK_DEFAULT_POWER).clamp(0.0, KICK_MAX_POWER);
    let factor = (1.0 - accuracy(player.stats.shooting, SKILL_SCALE)) * KICK_JITTER;

    let offset = Vec3::new(jitter(rng, factor), jitter(rng, factor) * 0.5, jitter(rng, factor));
    let direction = aim + offset;

    ball.apply_kick(direction.normalize() * power, request.spin, Some(touch_for(player, game_time)));

    Some(KickOutcome {
        direction,
        power,
        on_target: field.ray_hits_goal_mouth(player.position(), direction, attacked),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct KickRequest {
    pub direction: Option<Vec3>,
    pub power: Option<f32>,
    pub spin: Vec3,
}

/// Play the ball to `target`, a teammate
pub fn pass<R: Rng>(
    player: &Player,
    target: &Player,
    ball: &mut Ball,
    power: Option<f32>,
    game_time: f32,
    rng: &mut R,
) -> Option<PassOutcome> {
    if target.id == player.id || target.team != player.team {
        return None;
    }
    if !in_reach(player, ball, ActionKind::Pass) {
        return None;
    }

    let aim = (target.position() - player.position()).normalize();
    let power = power.unwrap_or(PASS_DEFAULT_POWER).clamp(0.0, PASS_MAX_POWER);
    let factor = (1.0 - accuracy(player.stats.passing, SKILL_SCALE)) * PASS_JITTER;

    let offset = Vec3::new(jitter(rng, factor), 0.0, jitter(rng, factor));
    let direction = aim + offset;

    ball.apply_kick(direction.normalize() * power, Vec3::ZERO, Some(touch_for(player, game_time)));

    Some(PassOutcome {
        target: target.id,
        direction,
        accurate: factor < ACCURATE_PASS_JITTER,
    })
}

/// Challenge every opponent within tackle reach of `players[tackler]`
///
/// Each opponent is resolved independently, in roster order. A won tackle
/// shoves the opponent and, if they held the ball, knocks it loose.
pub fn tackle<R: Rng>(
    players: &mut [Player],
    tackler: usize,
    ball: &mut Ball,
    rng: &mut R,
) -> SmallVec<[TackleOutcome; 4]> {
    let mut outcomes = SmallVec::new();
    let Some(me) = players.get(tackler) else {
        return outcomes;
    };

    let origin = me.position();
    let team = me.team;
    let radius = me.action_radius(ActionKind::Tackle);
    let win_chance = accuracy(me.stats.defending, TACKLE_SKILL_SCALE);

    let targets: SmallVec<[usize; 4]> = players
        .iter()
        .enumerate()
        .filter(|(_, p)| p.team != team && p.position().distance_to(origin) <= radius)
        .map(|(i, _)| i)
        .collect();

    for index in targets {
        let opponent = &mut players[index];

        if rng.gen::<f32>() < win_chance {
            let push = (opponent.position() - origin).normalize();
            opponent.body.apply_force(push * TACKLE_PUSH_FORCE);

            let took_ball = opponent.has_ball;
            if took_ball {
                opponent.has_ball = false;
                ball.body.apply_force(push * TACKLE_BALL_FORCE);
            }
            outcomes.push(TackleOutcome::Won {
                tackled: opponent.id,
                took_ball,
            });
        } else if rng.gen_bool(FOUL_CHANCE) {
            outcomes.push(TackleOutcome::Foul { fouled: opponent.id });
        } else {
            outcomes.push(TackleOutcome::Missed { opponent: opponent.id });
        }
    }

    outcomes
}

fn touch_for(player: &Player, game_time: f32) -> Touch {
    Touch {
        player: player.id,
        team: player.team,
        time: game_time,
    }
}

/// Reject commands carrying NaN or infinite numbers
pub fn is_well_formed(action: &PlayerAction) -> bool {
    let power_ok = |v: Option<f32>| v.map_or(true, |p| p.is_finite() && p >= 0.0);
    match action {
        PlayerAction::Move { x, z, intensity } => {
            x.is_finite() && z.is_finite() && intensity.is_finite() && *intensity >= 0.0
        }
        PlayerAction::Slide { x, z } => x.is_finite() && z.is_finite(),
        PlayerAction::Kick { direction, power, spin } => {
            direction.map_or(true, |d| d.is_finite()) && power_ok(*power) && spin.is_finite()
        }
        PlayerAction::Pass { power, .. } => power_ok(*power),
        PlayerAction::Jump | PlayerAction::Tackle => true,
    }
}
