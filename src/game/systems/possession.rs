use crate::game::ball::{Ball, Touch};
use crate::game::constants::possession::{MAX_PICKUP_SPEED, PICKUP_RADIUS, RELEASE_FACTOR};
use crate::game::player::Player;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PossessionChange {
    Gained,
    Lost,
    Unchanged,
}

/// Update possession for the player at `index`
///
/// A slow ball within reach is taken exclusively: everyone else loses it
/// first, then the touch is recorded. A ball beyond the release radius is
/// dropped.
pub fn check_possession(players: &mut [Player], index: usize, ball: &mut Ball, game_time: f32) -> PossessionChange {
    let Some(player) = players.get(index) else {
        return PossessionChange::Unchanged;
    };
    let distance = player.position().distance_to(ball.position());

    if distance <= PICKUP_RADIUS && ball.body.speed() < MAX_PICKUP_SPEED {
        let touch = Touch {
            player: player.id,
            team: player.team,
            time: game_time,
        };
        let already_held = player.has_ball;

        for other in players.iter_mut() {
            other.has_ball = false;
        }
        players[index].has_ball = true;
        ball.record_touch(touch);

        if already_held {
            PossessionChange::Unchanged
        } else {
            PossessionChange::Gained
        }
    } else if distance > PICKUP_RADIUS * RELEASE_FACTOR && player.has_ball {
        players[index].has_ball = false;
        PossessionChange::Lost
    } else {
        PossessionChange::Unchanged
    }
}

/// Number of players currently holding the ball
pub fn holders(players: &[Player]) -> usize {
    players.iter().filter(|p| p.has_ball).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::player::PlayerStats;
    use crate::game::team::TeamId;
    use crate::util::vec3::Vec3;
    use proptest::prelude::*;

    fn create_player(id: u32, team: TeamId, x: f32) -> Player {
        Player::new(id, format!("P{id}"), team, Vec3::new(x, 0.3, 0.0), PlayerStats::default())
    }

    #[test]
    fn test_gain_possession() {
        let mut players = vec![create_player(1, TeamId::Home, 0.0)];
        let mut ball = Ball::new(Vec3::new(0.5, 0.11, 0.0));

        assert_eq!(check_possession(&mut players, 0, &mut ball, 4.0), PossessionChange::Gained);
        assert!(players[0].has_ball);
        assert_eq!(ball.last_touched_by, Some(1));
        assert_eq!(ball.last_touched_team, Some(TeamId::Home));
        assert_eq!(ball.last_touch_time, 4.0);
    }

    #[test]
    fn test_fast_ball_cannot_be_taken() {
        let mut players = vec![create_player(1, TeamId::Home, 0.0)];
        let mut ball = Ball::new(Vec3::new(0.5, 0.11, 0.0));
        ball.body.velocity = Vec3::new(5.0, 0.0, 0.0);

        assert_eq!(check_possession(&mut players, 0, &mut ball, 0.0), PossessionChange::Unchanged);
        assert!(!players[0].has_ball);
    }

    #[test]
    fn test_possession_is_exclusive() {
        let mut players = vec![create_player(1, TeamId::Home, 0.0), create_player(2, TeamId::Away, 0.6)];
        let mut ball = Ball::new(Vec3::new(0.3, 0.3, 0.0));

        check_possession(&mut players, 0, &mut ball, 0.0);
        check_possession(&mut players, 1, &mut ball, 0.0);

        assert!(!players[0].has_ball);
        assert!(players[1].has_ball);
        assert_eq!(ball.last_touched_team, Some(TeamId::Away));
    }

    #[test]
    fn test_lose_possession_beyond_release_radius() {
        let mut players = vec![create_player(1, TeamId::Home, 0.0)];
        players[0].has_ball = true;

        // Between pickup and release radius: kept
        let mut ball = Ball::new(Vec3::new(1.0, 0.3, 0.0));
        assert_eq!(check_possession(&mut players, 0, &mut ball, 0.0), PossessionChange::Unchanged);
        assert!(players[0].has_ball);

        ball.body.position = Vec3::new(1.3, 0.3, 0.0);
        assert_eq!(check_possession(&mut players, 0, &mut ball, 0.0), PossessionChange::Lost);
        assert!(!players[0].has_ball);
    }

    proptest! {
        #[test]
        fn prop_at_most_one_holder(
            xs in proptest::collection::vec(-3.0f32..3.0, 1..12),
            ball_x in -3.0f32..3.0,
            ball_z in -1.0f32..1.0,
        ) {
            let mut players: Vec<Player> = xs
                .iter()
                .enumerate()
                .map(|(i, &x)| create_player(i as u32, if i % 2 == 0 { TeamId::Home } else { TeamId::Away }, x))
                .collect();
            let mut ball = Ball::new(Vec3::new(ball_x, 0.11, ball_z));

            for round in 0..3 {
                for i in 0..players.len() {
                    check_possession(&mut players, i, &mut ball, round as f32);
                    prop_assert!(holders(&players) <= 1);
                }
                ball.body.position.x += 0.5;
            }
        }
    }
}
