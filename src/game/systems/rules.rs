use crate::game::constants::ball::RESTART_HEIGHT;
use crate::game::field::{Field, OutOfBounds};
use crate::game::state::MatchState;
use crate::game::team::{Side, Team, TeamId};
use crate::util::vec3::Vec3;

/// What the clock says at the end of a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Whistle {
    Halftime,
    Fulltime,
}

/// Halftime at the end of the first half, fulltime at the end of the second
pub fn check_clock(state: &MatchState) -> Option<Whistle> {
    if !state.is_playing() || state.game_time < state.half_end() {
        return None;
    }
    match state.half {
        1 => Some(Whistle::Halftime),
        _ => Some(Whistle::Fulltime),
    }
}

/// Team currently playing from `side`
pub fn team_on_side(teams: &[Team; 2], side: Side) -> TeamId {
    teams
        .iter()
        .find(|t| t.side == side)
        .map(|t| t.id)
        .unwrap_or(match side {
            Side::Left => TeamId::Home,
            Side::Right => TeamId::Away,
        })
}

/// Where the ball is put back after leaving the field
///
/// Throw-ins restart on the nearest touchline; goal kicks and corners are
/// not distinguished and restart from the centre spot.
pub fn restart_spot(field: &Field, kind: OutOfBounds, position: Vec3) -> Vec3 {
    match kind {
        OutOfBounds::ThrowIn => field.throw_in_spot(position, RESTART_HEIGHT),
        OutOfBounds::GoalKickOrCorner => Vec3::new(0.0, RESTART_HEIGHT, 0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::roster::Formation;
    use crate::game::state::MatchPhase;

    fn create_teams() -> [Team; 2] {
        [
            Team::new(TeamId::Home, "Red", "#FF4444", Side::Left, Formation::default()),
            Team::new(TeamId::Away, "Blue", "#4444FF", Side::Right, Formation::default()),
        ]
    }

    #[test]
    fn test_clock_silent_outside_play() {
        let mut state = MatchState::new(60.0);
        state.game_time = 100.0;
        assert_eq!(check_clock(&state), None);

        state.phase = MatchPhase::Goal;
        assert_eq!(check_clock(&state), None);
    }

    #[test]
    fn test_clock_calls_halftime_then_fulltime() {
        let mut state = MatchState::new(60.0);
        state.phase = MatchPhase::Playing;

        state.game_time = 59.9;
        assert_eq!(check_clock(&state), None);
        state.game_time = 60.0;
        assert_eq!(check_clock(&state), Some(Whistle::Halftime));

        state.begin_second_half();
        assert_eq!(check_clock(&state), None);
        state.game_time = 120.0;
        assert_eq!(check_clock(&state), Some(Whistle::Fulltime));
    }

    #[test]
    fn test_stoppage_time_delays_whistle() {
        let mut state = MatchState::new(60.0);
        state.phase = MatchPhase::Playing;
        state.added_time = 2.0;
        state.game_time = 61.0;
        assert_eq!(check_clock(&state), None);
    }

    #[test]
    fn test_team_on_side_follows_switch() {
        let mut teams = create_teams();
        assert_eq!(team_on_side(&teams, Side::Left), TeamId::Home);

        for team in teams.iter_mut() {
            team.switch_sides();
        }
        assert_eq!(team_on_side(&teams, Side::Left), TeamId::Away);
        assert_eq!(team_on_side(&teams, Side::Right), TeamId::Home);
    }

    #[test]
    fn test_restart_spots() {
        let field = Field::default();
        let throw_in = restart_spot(&field, OutOfBounds::ThrowIn, Vec3::new(10.0, 0.1, -36.0));
        assert_eq!(throw_in, Vec3::new(10.0, RESTART_HEIGHT, field.min_z() + 1.0));

        let corner = restart_spot(&field, OutOfBounds::GoalKickOrCorner, Vec3::new(55.0, 0.1, 20.0));
        assert_eq!(corner, Vec3::new(0.0, RESTART_HEIGHT, 0.0));
    }
}
