pub mod constants;
pub mod body;
pub mod ball;
pub mod player;
pub mod team;
pub mod roster;
pub mod field;
pub mod state;
pub mod events;
pub mod scheduler;
pub mod systems;
pub mod engine;
pub mod persistence;
pub mod match_result;
pub mod input_buffer;
