//! Match session - owns the engine, applies client messages and broadcasts state
//!
//! Connection handlers decode client bytes and push them into the session's
//! inbox. `step` drains the inbox, ticks the engine, runs due timers and
//! pushes events and snapshots back out through a `Transport`.

use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::game::constants::net::MAX_MESSAGE_SIZE;
use crate::game::engine::MatchEngine;
use crate::game::events::{EventKind, MatchEvent};
use crate::game::input_buffer::{InputBuffer, InputBufferError, InputSender};
use crate::game::player::PlayerId;
use crate::game::state::MatchPhase;
use crate::metrics::Metrics;
use crate::net::protocol::{decode, encode, ActionRecord, ClientMessage, DecodeError, ServerMessage};

/// Identity of one client connection; doubles as its controller id
pub type ConnectionId = Uuid;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("connection {0} closed")]
    Closed(ConnectionId),
    #[error("transport I/O error: {0}")]
    Io(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("message of {0} bytes exceeds the limit")]
    TooLarge(usize),
    #[error("unknown connection {0}")]
    UnknownConnection(ConnectionId),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Inbox(#[from] InputBufferError),
}

/// Outbound side of a session
///
/// Payloads are already encoded; a broadcast encodes once and hands the same
/// bytes to every connection.
pub trait Transport {
    fn send(&mut self, connection: ConnectionId, payload: &[u8]) -> Result<(), TransportError>;
}

/// Transport that drops everything (headless runs)
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTransport;

impl Transport for NullTransport {
    fn send(&mut self, _connection: ConnectionId, _payload: &[u8]) -> Result<(), TransportError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
struct Connection {
    controlled: Option<PlayerId>,
}

pub struct MatchSession<T: Transport> {
    engine: MatchEngine,
    transport: T,
    inbox: InputBuffer,
    connections: HashMap<ConnectionId, Connection>,
    metrics: Option<Arc<Metrics>>,
    ticks: u64,
    snapshot_interval: u64,
}

impl<T: Transport> MatchSession<T> {
    pub fn new(engine: MatchEngine, transport: T) -> Self {
        let config = engine.config();
        let snapshot_interval = (config.tick_rate / config.broadcast_rate.max(1)).max(1) as u64;
        Self {
            engine,
            transport,
            inbox: InputBuffer::default(),
            connections: HashMap::new(),
            metrics: None,
            ticks: 0,
            snapshot_interval,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn engine(&self) -> &MatchEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut MatchEngine {
        &mut self.engine
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Sender handle for a connection handler task
    pub fn input_sender(&self) -> InputSender {
        self.inbox.sender()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Player a connection currently controls
    pub fn controlled_player(&self, connection: ConnectionId) -> Option<PlayerId> {
        self.connections.get(&connection).and_then(|c| c.controlled)
    }

    pub fn add_connection(&mut self) -> ConnectionId {
        let id = Uuid::new_v4();
        self.connections.insert(id, Connection::default());
        info!("Connection {} joined match {}", id, self.engine.match_id());
        self.update_connection_gauge();
        id
    }

    /// Drop a connection; its player goes back to the AI
    pub fn remove_connection(&mut self, connection: ConnectionId) -> bool {
        let Some(removed) = self.connections.remove(&connection) else {
            return false;
        };
        if let Some(player_id) = removed.controlled {
            self.engine.unassign_player_from_human(player_id);
        }
        info!("Connection {} left match {}", connection, self.engine.match_id());
        self.update_connection_gauge();
        true
    }

    /// Take a player off the pitch, releasing whichever connection held it
    pub fn remove_player(&mut self, player_id: PlayerId) -> bool {
        for entry in self.connections.values_mut() {
            if entry.controlled == Some(player_id) {
                entry.controlled = None;
            }
        }
        self.engine.remove_player(player_id)
    }

    /// Forget controls over players the engine no longer has
    fn drop_stale_controls(&mut self) {
        let engine = &self.engine;
        for entry in self.connections.values_mut() {
            if entry.controlled.map_or(false, |id| engine.player(id).is_none()) {
                entry.controlled = None;
            }
        }
    }

    /// Decode raw client bytes into the inbox
    pub fn receive(&self, connection: ConnectionId, data: &[u8]) -> Result<(), SessionError> {
        if data.len() > MAX_MESSAGE_SIZE {
            return Err(SessionError::TooLarge(data.len()));
        }
        if !self.connections.contains_key(&connection) {
            return Err(SessionError::UnknownConnection(connection));
        }
        let message: ClientMessage = decode(data)?;
        if let Some(metrics) = &self.metrics {
            metrics.record_received(data.len());
        }
        self.inbox
            .sender()
            .try_send(connection, message)
            .map_err(SessionError::from)
    }

    /// One fixed step: inbox, engine tick, timers, broadcast
    pub fn step(&mut self, dt: f32) -> Vec<MatchEvent> {
        let before = self.engine.events().len();
        self.drop_stale_controls();

        for input in self.inbox.drain() {
            self.handle_message(input.connection, input.message);
        }
        self.engine.tick(dt);
        self.engine.advance_timers(dt);

        // Everything emitted this step, including assignments and actions
        let events: Vec<MatchEvent> = self.engine.events()[before..].to_vec();
        for event in &events {
            self.broadcast(&ServerMessage::Event(event.clone()));
        }

        self.ticks += 1;
        if self.ticks % self.snapshot_interval == 0 {
            self.broadcast_snapshot();
        }

        self.observe(&events);
        events
    }

    pub fn handle_message(&mut self, connection: ConnectionId, message: ClientMessage) {
        if !self.connections.contains_key(&connection) {
            warn!("Message from unknown connection {}", connection);
            return;
        }

        match message {
            ClientMessage::AssignPlayer { player_id } => self.assign(connection, player_id),
            ClientMessage::Action(action) => {
                let Some(player_id) = self.controlled_player(connection) else {
                    debug!("Connection {} sent {} without a player", connection, action.name());
                    if let Some(metrics) = &self.metrics {
                        metrics.record_action(false);
                    }
                    return;
                };
                let accepted = self.engine.handle_player_action(&ActionRecord::new(player_id, action));
                if let Some(metrics) = &self.metrics {
                    metrics.record_action(accepted);
                }
            }
            ClientMessage::Ping { timestamp } => {
                let pong = ServerMessage::Pong {
                    client_timestamp: timestamp,
                    server_timestamp: Utc::now().timestamp_millis().max(0) as u64,
                };
                self.send_to(connection, &pong);
            }
            ClientMessage::Leave => self.release(connection),
        }
    }

    fn assign(&mut self, connection: ConnectionId, player_id: PlayerId) {
        if self.controlled_player(connection) == Some(player_id) {
            self.send_to(connection, &ServerMessage::Assigned { player_id, controller: connection });
            return;
        }

        if self.engine.assign_player_to_human(player_id, connection) {
            // One player per connection
            self.release(connection);
            if let Some(entry) = self.connections.get_mut(&connection) {
                entry.controlled = Some(player_id);
            }
            self.send_to(connection, &ServerMessage::Assigned { player_id, controller: connection });
        } else {
            let reason = match self.engine.player(player_id) {
                None => format!("no player {}", player_id),
                Some(_) => format!("player {} is already controlled", player_id),
            };
            self.send_to(connection, &ServerMessage::AssignRejected { player_id, reason });
        }
    }

    fn release(&mut self, connection: ConnectionId) {
        let Some(entry) = self.connections.get_mut(&connection) else {
            return;
        };
        if let Some(player_id) = entry.controlled.take() {
            self.engine.unassign_player_from_human(player_id);
        }
    }

    pub fn broadcast_snapshot(&mut self) {
        let snapshot = self.engine.snapshot();
        self.broadcast(&ServerMessage::Snapshot(snapshot));
    }

    /// Encode once, send to every connection
    pub fn broadcast(&mut self, message: &ServerMessage) {
        if self.connections.is_empty() {
            return;
        }
        let payload = match encode(message) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Failed to encode broadcast: {}", e);
                return;
            }
        };

        let mut closed = Vec::new();
        for &connection in self.connections.keys() {
            match self.transport.send(connection, &payload) {
                Ok(()) => {
                    if let Some(metrics) = &self.metrics {
                        metrics.record_sent(payload.len());
                    }
                }
                Err(TransportError::Closed(id)) => closed.push(id),
                Err(e) => debug!("Send to {} failed: {}", connection, e),
            }
        }

        for connection in closed {
            self.remove_connection(connection);
        }
    }

    pub fn send_to(&mut self, connection: ConnectionId, message: &ServerMessage) {
        let payload = match encode(message) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Failed to encode message for {}: {}", connection, e);
                return;
            }
        };
        match self.transport.send(connection, &payload) {
            Ok(()) => {
                if let Some(metrics) = &self.metrics {
                    metrics.record_sent(payload.len());
                }
            }
            Err(TransportError::Closed(id)) => {
                self.remove_connection(id);
            }
            Err(e) => debug!("Send to {} failed: {}", connection, e),
        }
    }

    /// Stop the match: cancel timers, free every player
    pub fn shutdown(&mut self) {
        let connections: Vec<ConnectionId> = self.connections.keys().copied().collect();
        for connection in connections {
            self.remove_connection(connection);
        }
        self.engine.teardown();
    }

    pub fn is_finished(&self) -> bool {
        self.engine.phase() == MatchPhase::Fulltime
    }

    fn observe(&self, events: &[MatchEvent]) {
        let Some(metrics) = &self.metrics else {
            return;
        };
        let goals = events
            .iter()
            .filter(|e| matches!(e.kind, EventKind::Goal { .. }))
            .count();
        let score = self.engine.score();
        let state = self.engine.state();
        let humans = self.engine.players().iter().filter(|p| !p.is_ai()).count();

        metrics.events_total.fetch_add(events.len() as u64, Ordering::Relaxed);
        metrics.goals_total.fetch_add(goals as u64, Ordering::Relaxed);
        metrics.score_home.store(score.home as u64, Ordering::Relaxed);
        metrics.score_away.store(score.away as u64, Ordering::Relaxed);
        metrics.match_time_seconds.store(state.game_time as u64, Ordering::Relaxed);
        metrics.half.store(state.half as u64, Ordering::Relaxed);
        metrics.players_human.store(humans as u64, Ordering::Relaxed);
    }

    fn update_connection_gauge(&self) {
        if let Some(metrics) = &self.metrics {
            metrics
                .connections_active
                .store(self.connections.len() as u64, Ordering::Relaxed);
        }
    }
}
