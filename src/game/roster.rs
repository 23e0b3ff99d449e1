use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::game::player::Archetype::{Defender as D, Forward as F, Goalkeeper as G, Midfielder as M};
use crate::game::player::{Archetype, StatsConfig};
use crate::game::team::{Side, TeamId};
use crate::util::vec3::Vec3;

/// One position in a formation, expressed for a team defending the left end
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormationSlot {
    pub role: Archetype,
    pub x: f32,
    pub z: f32,
}

const fn slot(role: Archetype, x: f32, z: f32) -> FormationSlot {
    FormationSlot { role, x, z }
}

const FOUR_FOUR_TWO: [FormationSlot; 11] = [
    slot(G, -40.0, 0.0),
    slot(D, -25.0, -15.0),
    slot(D, -25.0, -5.0),
    slot(D, -25.0, 5.0),
    slot(D, -25.0, 15.0),
    slot(M, -10.0, -10.0),
    slot(M, -10.0, -3.0),
    slot(M, -10.0, 3.0),
    slot(M, -10.0, 10.0),
    slot(F, 5.0, -5.0),
    slot(F, 5.0, 5.0),
];

const FOUR_THREE_THREE: [FormationSlot; 11] = [
    slot(G, -40.0, 0.0),
    slot(D, -25.0, -15.0),
    slot(D, -25.0, -5.0),
    slot(D, -25.0, 5.0),
    slot(D, -25.0, 15.0),
    slot(M, -10.0, -8.0),
    slot(M, -10.0, 0.0),
    slot(M, -10.0, 8.0),
    slot(F, 10.0, -10.0),
    slot(F, 10.0, 0.0),
    slot(F, 10.0, 10.0),
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Formation {
    #[default]
    #[serde(rename = "4-4-2")]
    FourFourTwo,
    #[serde(rename = "4-3-3")]
    FourThreeThree,
}

impl Formation {
    pub fn slots(&self) -> &'static [FormationSlot] {
        match self {
            Formation::FourFourTwo => &FOUR_FOUR_TWO,
            Formation::FourThreeThree => &FOUR_THREE_THREE,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Formation::FourFourTwo => "4-4-2",
            Formation::FourThreeThree => "4-3-3",
        }
    }
}

impl FromStr for Formation {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "4-4-2" => Ok(Formation::FourFourTwo),
            "4-3-3" => Ok(Formation::FourThreeThree),
            other => Err(ConfigError::UnknownFormation(other.to_string())),
        }
    }
}

impl fmt::Display for Formation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A player to be created for a team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSpec {
    pub name: String,
    pub archetype: Archetype,
    pub stats: StatsConfig,
    pub start: Vec3,
}

/// Everything needed to field one team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSheet {
    pub team: TeamId,
    pub name: String,
    pub color: String,
    pub side: Side,
    pub formation: Formation,
    pub players: Vec<PlayerSpec>,
}

/// Supplies the squads a match is built from
pub trait RosterProvider {
    fn team_sheet(&self, team: TeamId) -> TeamSheet;
}

/// Red vs blue, eleven a side: keeper, four defenders, four midfielders, two forwards
#[derive(Debug, Clone, Default)]
pub struct DefaultRoster {
    pub home_formation: Formation,
    pub away_formation: Formation,
}

impl DefaultRoster {
    pub fn new(home_formation: Formation, away_formation: Formation) -> Self {
        Self {
            home_formation,
            away_formation,
        }
    }

    fn archetype_for_index(index: usize) -> Archetype {
        match index {
            0 => Archetype::Goalkeeper,
            1..=4 => Archetype::Defender,
            5..=8 => Archetype::Midfielder,
            9 | 10 => Archetype::Forward,
            _ => Archetype::Midfielder,
        }
    }
}

impl RosterProvider for DefaultRoster {
    fn team_sheet(&self, team: TeamId) -> TeamSheet {
        let (name, color, side, formation) = match team {
            TeamId::Home => ("Team Red", "#FF4444", Side::Left, self.home_formation),
            TeamId::Away => ("Team Blue", "#4444FF", Side::Right, self.away_formation),
        };

        // Lined up in the team's own half until the kickoff reset
        let players = (0..11)
            .map(|i| {
                let offset = 20.0 + i as f32 * 3.0;
                PlayerSpec {
                    name: format!("Player {}", i + 1),
                    archetype: Self::archetype_for_index(i),
                    stats: StatsConfig::default(),
                    start: Vec3::new(-offset * side.sign(), 0.0, (i as f32 - 5.0) * 3.0),
                }
            })
            .collect();

        TeamSheet {
            team,
            name: name.to_string(),
            color: color.to_string(),
            side,
            formation,
            players,
        }
    }
}
