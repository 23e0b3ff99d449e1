pub mod physics;
pub mod collision;
pub mod possession;
pub mod rules;
pub mod actions;
pub mod ai;
