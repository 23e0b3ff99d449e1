//! Bot decision making
//!
//! Decisions are computed from a read-only view of the match and then
//! executed by the engine, one player at a time in roster order, so later
//! bots see the effects of earlier ones.

use rand::Rng;

use crate::game::constants::ai::*;
use crate::game::player::{Player, PlayerId};
use crate::util::vec3::Vec3;

/// What a bot wants to do this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AiDecision {
    /// Nothing to do
    Idle,
    /// Run at a nearby loose ball
    Chase { direction: Vec3 },
    /// Carry the ball toward goal
    Dribble { direction: Vec3 },
    /// Play the ball to the nearest teammate
    Pass { target: PlayerId, power: f32 },
    /// Strike at goal
    Shoot { direction: Vec3, power: f32 },
    /// Jog back to the formation spot
    ReturnToShape { direction: Vec3 },
}

impl AiDecision {
    pub fn name(&self) -> &'static str {
        match self {
            AiDecision::Idle => "idle",
            AiDecision::Chase { .. } => "chase",
            AiDecision::Dribble { .. } => "dribble",
            AiDecision::Pass { .. } => "pass",
            AiDecision::Shoot { .. } => "shoot",
            AiDecision::ReturnToShape { .. } => "return",
        }
    }
}

/// Nearest teammate of `player`, by straight-line distance
pub fn nearest_teammate(player: &Player, players: &[Player]) -> Option<PlayerId> {
    players
        .iter()
        .filter(|p| p.team == player.team && p.id != player.id)
        .map(|p| (p.id, p.position().distance_sq_to(player.position())))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id)
}

/// Pick the next move for one bot
///
/// `attacking_goal` is the centre of the goal the bot's team attacks. A
/// ball carrier rolls for a pass first and only then for a shot.
pub fn decide<R: Rng>(
    player: &Player,
    players: &[Player],
    ball_position: Vec3,
    attacking_goal: Vec3,
    rng: &mut R,
) -> AiDecision {
    let position = player.position();
    let to_ball = ball_position - position;

    if !player.has_ball && to_ball.length() < CHASE_RADIUS {
        return AiDecision::Chase {
            direction: to_ball.horizontal().normalize(),
        };
    }

    if player.has_ball {
        let to_goal = (attacking_goal - position).horizontal().normalize();

        if rng.gen_bool(PASS_CHANCE) {
            return match nearest_teammate(player, players) {
                Some(target) => AiDecision::Pass {
                    target,
                    power: PASS_POWER,
                },
                None => AiDecision::Idle,
            };
        }
        if rng.gen_bool(SHOOT_CHANCE) {
            return AiDecision::Shoot {
                direction: Vec3::new(to_goal.x, SHOT_LIFT, to_goal.z),
                power: SHOT_POWER,
            };
        }
        return AiDecision::Dribble { direction: to_goal };
    }

    let to_target = (player.target_position - position).horizontal();
    if to_target.length() > RETURN_THRESHOLD {
        return AiDecision::ReturnToShape {
            direction: to_target.normalize(),
        };
    }

    AiDecision::Idle
}
