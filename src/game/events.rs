use std::fmt;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::game::field::OutOfBounds;
use crate::game::player::{ControllerId, PlayerId};
use crate::game::team::{Score, Side, TeamId};
use crate::net::protocol::PlayerAction;
use crate::util::vec3::Vec3;

/// Something that happened during the match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchEvent {
    /// Wall-clock milliseconds since the Unix epoch
    pub timestamp_ms: i64,
    /// Match clock when the event fired
    pub game_time: f32,
    pub kind: EventKind,
}

impl MatchEvent {
    pub fn now(game_time: f32, kind: EventKind) -> Self {
        Self {
            timestamp_ms: chrono::Utc::now().timestamp_millis(),
            game_time,
            kind,
        }
    }

    #[inline]
    pub fn tag(&self) -> EventTag {
        self.kind.tag()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    Goal {
        team: TeamId,
        /// Side the scoring team attacked from
        side: Side,
        scorer: Option<PlayerId>,
        score: Score,
    },
    OutOfBounds {
        kind: OutOfBounds,
        position: Vec3,
        last_touched_team: Option<TeamId>,
    },
    Tackle {
        tackler: PlayerId,
        tackled: PlayerId,
        won_ball: bool,
    },
    Foul {
        fouler: PlayerId,
        fouled: PlayerId,
    },
    PlayerAction {
        player_id: PlayerId,
        action: PlayerAction,
    },
    BallKicked {
        player_id: PlayerId,
        direction: Vec3,
        power: f32,
        on_target: bool,
    },
    BallPassed {
        player_id: PlayerId,
        target_id: PlayerId,
        direction: Vec3,
        accurate: bool,
    },
    Halftime,
    Fulltime {
        score: Score,
    },
    SecondHalfStart {
        kicking_team: TeamId,
    },
    PlayerAssigned {
        player_id: PlayerId,
        controller: ControllerId,
    },
    PlayerUnassigned {
        player_id: PlayerId,
    },
}

impl EventKind {
    pub fn tag(&self) -> EventTag {
        match self {
            EventKind::Goal { .. } => EventTag::Goal,
            EventKind::OutOfBounds { .. } => EventTag::OutOfBounds,
            EventKind::Tackle { .. } => EventTag::Tackle,
            EventKind::Foul { .. } => EventTag::Foul,
            EventKind::PlayerAction { .. } => EventTag::PlayerAction,
            EventKind::BallKicked { .. } => EventTag::BallKicked,
            EventKind::BallPassed { .. } => EventTag::BallPassed,
            EventKind::Halftime => EventTag::Halftime,
            EventKind::Fulltime { .. } => EventTag::Fulltime,
            EventKind::SecondHalfStart { .. } => EventTag::SecondHalfStart,
            EventKind::PlayerAssigned { .. } => EventTag::PlayerAssigned,
            EventKind::PlayerUnassigned { .. } => EventTag::PlayerUnassigned,
        }
    }
}

/// Event type, used as the subscription key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventTag {
    Goal,
    OutOfBounds,
    Tackle,
    Foul,
    PlayerAction,
    BallKicked,
    BallPassed,
    Halftime,
    Fulltime,
    SecondHalfStart,
    PlayerAssigned,
    PlayerUnassigned,
}

impl EventTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventTag::Goal => "goal",
            EventTag::OutOfBounds => "outOfBounds",
            EventTag::Tackle => "tackle",
            EventTag::Foul => "foul",
            EventTag::PlayerAction => "playerAction",
            EventTag::BallKicked => "ballKicked",
            EventTag::BallPassed => "ballPassed",
            EventTag::Halftime => "halftime",
            EventTag::Fulltime => "fulltime",
            EventTag::SecondHalfStart => "secondHalfStart",
            EventTag::PlayerAssigned => "playerAssigned",
            EventTag::PlayerUnassigned => "playerUnassigned",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

pub type Listener = Box<dyn FnMut(&MatchEvent) + Send>;

/// Synchronous fan-out of events to per-tag listeners
///
/// Listeners for a tag run in subscription order.
#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    listeners: HashMap<EventTag, Vec<(SubscriptionId, Listener)>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, tag: EventTag, listener: Listener) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.listeners.entry(tag).or_default().push((id, listener));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        for listeners in self.listeners.values_mut() {
            if let Some(index) = listeners.iter().position(|(sub, _)| *sub == id) {
                listeners.remove(index);
                return true;
            }
        }
        false
    }

    pub fn dispatch(&mut self, event: &MatchEvent) {
        if let Some(listeners) = self.listeners.get_mut(&event.tag()) {
            for (_, listener) in listeners.iter_mut() {
                listener(event);
            }
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.values().map(Vec::len).sum()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listener_count())
            .finish()
    }
}
