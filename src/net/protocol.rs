use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::events::MatchEvent;
use crate::game::player::{AnimationState, Archetype, ControllerId, PlayerId};
use crate::game::roster::Formation;
use crate::game::state::{MatchPhase, PossessionShare};
use crate::game::team::{Score, Side, TeamId, TeamStats};
use crate::util::vec3::Vec3;

/// Messages from client to server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClientMessage {
    /// Take control of a player
    AssignPlayer { player_id: PlayerId },
    /// Command for the player this connection controls
    Action(PlayerAction),
    /// Ping for latency measurement
    Ping { timestamp: u64 },
    /// Release the controlled player
    Leave,
}

/// Messages from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ServerMessage {
    /// Player assignment accepted
    Assigned { player_id: PlayerId, controller: ControllerId },
    /// Player assignment refused
    AssignRejected { player_id: PlayerId, reason: String },
    /// Full match state
    Snapshot(MatchSnapshot),
    /// Match event notification
    Event(MatchEvent),
    /// Pong response with server timestamp
    Pong {
        client_timestamp: u64,
        server_timestamp: u64,
    },
}

fn default_intensity() -> f32 {
    1.0
}

/// A command for one player
///
/// Every field has a default so sparse JSON from a client is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlayerAction {
    Move {
        #[serde(default)]
        x: f32,
        #[serde(default)]
        z: f32,
        #[serde(default = "default_intensity")]
        intensity: f32,
    },
    Jump,
    Slide {
        #[serde(default)]
        x: f32,
        #[serde(default)]
        z: f32,
    },
    Kick {
        /// Defaults to straight ahead with a little lift
        #[serde(default)]
        direction: Option<Vec3>,
        #[serde(default)]
        power: Option<f32>,
        #[serde(default)]
        spin: Vec3,
    },
    Pass {
        #[serde(default)]
        target: PlayerId,
        #[serde(default)]
        power: Option<f32>,
    },
    Tackle,
}

impl PlayerAction {
    pub fn name(&self) -> &'static str {
        match self {
            PlayerAction::Move { .. } => "move",
            PlayerAction::Jump => "jump",
            PlayerAction::Slide { .. } => "slide",
            PlayerAction::Kick { .. } => "kick",
            PlayerAction::Pass { .. } => "pass",
            PlayerAction::Tackle => "tackle",
        }
    }
}

/// An action addressed to a specific player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub player_id: PlayerId,
    pub action: PlayerAction,
}

impl ActionRecord {
    pub fn new(player_id: PlayerId, action: PlayerAction) -> Self {
        Self { player_id, action }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallSnapshot {
    pub position: Vec3,
    pub velocity: Vec3,
    pub spin: Vec3,
    pub last_touched_by: Option<PlayerId>,
    pub last_touched_team: Option<TeamId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSnapshot {
    pub id: TeamId,
    pub name: String,
    pub color: String,
    pub score: u32,
    pub side: Side,
    pub formation: Formation,
    pub stats: TeamStats,
    pub player_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub name: String,
    pub team: TeamId,
    pub position: Vec3,
    pub velocity: Vec3,
    pub facing: Vec3,
    pub has_ball: bool,
    pub is_ai: bool,
    pub controller: Option<ControllerId>,
    pub animation: AnimationState,
    pub archetype: Archetype,
    pub stamina: f32,
    pub max_stamina: f32,
}

/// Complete match state for broadcast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub match_id: Uuid,
    pub phase: MatchPhase,
    pub game_time: f32,
    pub half: u8,
    pub score: Score,
    pub possession: PossessionShare,
    pub ball: BallSnapshot,
    pub teams: Vec<TeamSnapshot>,
    pub players: Vec<PlayerSnapshot>,
}

/// Encode a message using bincode
/// Uses legacy config for fixed-size integers
pub fn encode<T: Serialize>(message: &T) -> Result<Vec<u8>, EncodeError> {
    bincode::serde::encode_to_vec(message, bincode::config::legacy())
        .map_err(|e| EncodeError(e.to_string()))
}

/// Decode a message using bincode
/// Uses legacy config for fixed-size integers
pub fn decode<T: for<'de> Deserialize<'de>>(data: &[u8]) -> Result<T, DecodeError> {
    bincode::serde::decode_from_slice(data, bincode::config::legacy())
        .map(|(msg, _)| msg)
        .map_err(|e| DecodeError(e.to_string()))
}

#[derive(Debug, thiserror::Error)]
#[error("Encode error: {0}")]
pub struct EncodeError(String);

#[derive(Debug, thiserror::Error)]
#[error("Decode error: {0}")]
pub struct DecodeError(String);
