//! Pitch Server Library
//!
//! Authoritative simulation of an eleven-a-side football match: rigid-body
//! ball and players, contact resolution, match rules and clock, AI for
//! uncontrolled players, and a session layer that feeds client commands in
//! and state snapshots out.

pub mod config;
pub mod util;
pub mod game;
pub mod net;
pub mod metrics;
