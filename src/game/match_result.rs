//! Match statistics and final result
//!
//! Summarises a match from its clock, teams and event log.

use serde::{Deserialize, Serialize};

use crate::game::state::{MatchPhase, MatchState, PossessionShare};
use crate::game::team::{Score, Team, TeamId, TeamStats};

/// Per-team line of the statistics sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSummary {
    pub id: TeamId,
    pub name: String,
    pub score: u32,
    pub stats: TeamStats,
}

impl From<&Team> for TeamSummary {
    fn from(team: &Team) -> Self {
        Self {
            id: team.id,
            name: team.name.clone(),
            score: team.score,
            stats: team.stats.clone(),
        }
    }
}

/// Statistics sheet for a match, live or finished
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchStatistics {
    /// Match clock in seconds
    pub duration: f32,
    pub half: u8,
    pub phase: MatchPhase,
    pub possession: PossessionShare,
    pub home: TeamSummary,
    pub away: TeamSummary,
    pub final_score: Score,
    pub events: usize,
}

impl MatchStatistics {
    pub fn collect(state: &MatchState, teams: &[Team; 2], events: usize) -> Self {
        let home = TeamSummary::from(&teams[TeamId::Home.index()]);
        let away = TeamSummary::from(&teams[TeamId::Away.index()]);
        Self {
            duration: state.game_time,
            half: state.half,
            phase: state.phase,
            possession: state.possession.share(),
            final_score: Score {
                home: home.score,
                away: away.score,
            },
            home,
            away,
            events,
        }
    }

    pub fn team(&self, id: TeamId) -> &TeamSummary {
        match id {
            TeamId::Home => &self.home,
            TeamId::Away => &self.away,
        }
    }
}

/// Why a result was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchEndReason {
    /// Second half played out
    Fulltime,
    /// Stopped before the final whistle
    Abandoned,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchOutcome {
    /// `None` on a draw
    pub winner: Option<TeamId>,
    pub score: Score,
    pub reason: MatchEndReason,
}

/// Determine the result from a statistics sheet
pub fn determine_result(stats: &MatchStatistics) -> MatchOutcome {
    let score = stats.final_score;
    let winner = match score.home.cmp(&score.away) {
        std::cmp::Ordering::Greater => Some(TeamId::Home),
        std::cmp::Ordering::Less => Some(TeamId::Away),
        std::cmp::Ordering::Equal => None,
    };
    let reason = if stats.phase == MatchPhase::Fulltime {
        MatchEndReason::Fulltime
    } else {
        MatchEndReason::Abandoned
    };

    MatchOutcome { winner, score, reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::roster::Formation;
    use crate::game::team::Side;

    fn create_teams(home: u32, away: u32) -> [Team; 2] {
        let mut teams = [
            Team::new(TeamId::Home, "Red", "#FF4444", Side::Left, Formation::default()),
            Team::new(TeamId::Away, "Blue", "#4444FF", Side::Right, Formation::default()),
        ];
        teams[0].score = home;
        teams[1].score = away;
        teams
    }

    #[test]
    fn test_collect_statistics() {
        let mut state = MatchState::new(60.0);
        state.game_time = 42.0;
        state.possession.left = 3;
        state.possession.right = 1;
        let mut teams = create_teams(2, 1);
        teams[0].stats.record_pass(true);

        let stats = MatchStatistics::collect(&state, &teams, 7);

        assert_eq!(stats.duration, 42.0);
        assert_eq!(stats.final_score, Score { home: 2, away: 1 });
        assert_eq!(stats.possession, PossessionShare { left: 75, right: 25 });
        assert_eq!(stats.team(TeamId::Home).stats.passes, 1);
        assert_eq!(stats.events, 7);
    }

    #[test]
    fn test_home_win_at_fulltime() {
        let mut state = MatchState::new(60.0);
        state.phase = MatchPhase::Fulltime;
        let stats = MatchStatistics::collect(&state, &create_teams(3, 1), 0);

        let result = determine_result(&stats);
        assert_eq!(result.winner, Some(TeamId::Home));
        assert_eq!(result.reason, MatchEndReason::Fulltime);
    }

    #[test]
    fn test_draw_and_abandoned() {
        let state = MatchState::new(60.0);
        let stats = MatchStatistics::collect(&state, &create_teams(1, 1), 0);

        let result = determine_result(&stats);
        assert_eq!(result.winner, None);
        assert_eq!(result.reason, MatchEndReason::Abandoned);
    }

    #[test]
    fn test_away_win() {
        let stats = MatchStatistics::collect(&MatchState::new(60.0), &create_teams(0, 2), 0);
        assert_eq!(determine_result(&stats).winner, Some(TeamId::Away));
    }
}
