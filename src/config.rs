use crate::game::constants::{net, physics, timing};
use crate::game::roster::Formation;
use crate::game::systems::collision::SeparationMode;

/// Invalid configuration, raised at construction time only
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("mass must be positive and finite, got {0}")]
    InvalidMass(f32),
    #[error("radius must be positive and finite, got {0}")]
    InvalidRadius(f32),
    #[error("{name} must be within [0, 1], got {value}")]
    InvalidCoefficient { name: &'static str, value: f32 },
    #[error("stat `{name}` must be positive and finite, got {value}")]
    InvalidStat { name: &'static str, value: f32 },
    #[error("unknown formation `{0}` (expected 4-4-2 or 4-3-3)")]
    UnknownFormation(String),
    #[error("invalid field geometry: {0}")]
    InvalidField(&'static str),
    #[error("{name} must be positive and finite, got {value}")]
    InvalidTiming { name: &'static str, value: f32 },
    #[error("tick rate must be between 1 and 1000 Hz, got {0}")]
    InvalidTickRate(u32),
}

/// Match configuration
#[derive(Debug, Clone)]
pub struct MatchConfig {
    /// Fixed simulation rate in Hz
    pub tick_rate: u32,
    /// Length of one half in seconds of match clock
    pub half_duration: f32,
    /// Delay between a goal and the kickoff reset
    pub goal_reset_delay: f32,
    /// Half-time break length
    pub halftime_delay: f32,
    /// Seed for jitter, tackle and AI rolls (None = entropy)
    pub rng_seed: Option<u64>,
    /// How overlapping bodies are pushed apart
    pub separation: SeparationMode,
    pub home_formation: String,
    pub away_formation: String,
    /// Snapshot broadcast rate in Hz
    pub broadcast_rate: u32,
    /// Wall-clock speed-up for the headless driver (2.0 = twice real time)
    pub time_scale: f32,
    /// Port for the Prometheus endpoint
    pub metrics_port: u16,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            tick_rate: physics::TICK_RATE,
            half_duration: timing::HALF_DURATION,
            goal_reset_delay: timing::GOAL_RESET_DELAY,
            halftime_delay: timing::HALFTIME_DELAY,
            rng_seed: None,
            separation: SeparationMode::EqualSplit,
            home_formation: "4-4-2".to_string(),
            away_formation: "4-4-2".to_string(),
            broadcast_rate: net::SNAPSHOT_RATE,
            time_scale: 1.0,
            metrics_port: 9090,
        }
    }
}

impl MatchConfig {
    /// Config for deterministic runs (tests, replays)
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng_seed: Some(seed),
            ..Self::default()
        }
    }

    /// Seconds per tick
    pub fn dt(&self) -> f32 {
        1.0 / self.tick_rate as f32
    }

    /// Load config from environment or use defaults
    pub fn load_or_default() -> Self {
        let mut config = Self::default();

        if let Ok(rate) = std::env::var("TICK_RATE") {
            match rate.parse::<u32>() {
                Ok(parsed) if (1..=1000).contains(&parsed) => config.tick_rate = parsed,
                _ => tracing::warn!("Invalid TICK_RATE '{}', using default", rate),
            }
        }

        if let Ok(minutes) = std::env::var("HALF_MINUTES") {
            match minutes.parse::<f32>() {
                Ok(parsed) if parsed > 0.0 && parsed.is_finite() => {
                    config.half_duration = parsed * 60.0;
                }
                _ => tracing::warn!("Invalid HALF_MINUTES '{}', using default", minutes),
            }
        }

        if let Some(delay) = parse_seconds("GOAL_RESET_DELAY") {
            config.goal_reset_delay = delay;
        }

        if let Some(delay) = parse_seconds("HALFTIME_DELAY") {
            config.halftime_delay = delay;
        }

        if let Ok(seed) = std::env::var("MATCH_SEED") {
            if let Ok(parsed) = seed.parse::<u64>() {
                config.rng_seed = Some(parsed);
            } else {
                tracing::warn!("Invalid MATCH_SEED '{}', using entropy", seed);
            }
        }

        if let Ok(mode) = std::env::var("SEPARATION_MODE") {
            match mode.to_ascii_lowercase().as_str() {
                "equal" => config.separation = SeparationMode::EqualSplit,
                "mass" => config.separation = SeparationMode::MassWeighted,
                _ => tracing::warn!("Invalid SEPARATION_MODE '{}' (equal|mass), using default", mode),
            }
        }

        if let Ok(formation) = std::env::var("HOME_FORMATION") {
            config.home_formation = formation;
        }

        if let Ok(formation) = std::env::var("AWAY_FORMATION") {
            config.away_formation = formation;
        }

        if let Ok(rate) = std::env::var("BROADCAST_RATE") {
            match rate.parse::<u32>() {
                Ok(parsed) if parsed > 0 => config.broadcast_rate = parsed,
                _ => tracing::warn!("Invalid BROADCAST_RATE '{}', using default", rate),
            }
        }

        if let Ok(scale) = std::env::var("TIME_SCALE") {
            match scale.parse::<f32>() {
                Ok(parsed) if parsed > 0.0 && parsed.is_finite() => config.time_scale = parsed,
                _ => tracing::warn!("Invalid TIME_SCALE '{}', using default", scale),
            }
        }

        if let Ok(port) = std::env::var("METRICS_PORT") {
            match port.parse::<u16>() {
                Ok(parsed) if parsed > 0 => config.metrics_port = parsed,
                _ => tracing::warn!("Invalid METRICS_PORT '{}', using default", port),
            }
        }

        config
    }

    /// Parsed home and away formations
    pub fn formations(&self) -> Result<(Formation, Formation), ConfigError> {
        Ok((self.home_formation.parse()?, self.away_formation.parse()?))
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_rate == 0 || self.tick_rate > 1000 {
            return Err(ConfigError::InvalidTickRate(self.tick_rate));
        }
        positive("half_duration", self.half_duration)?;
        positive("goal_reset_delay", self.goal_reset_delay)?;
        positive("halftime_delay", self.halftime_delay)?;
        positive("time_scale", self.time_scale)?;
        if self.broadcast_rate == 0 {
            return Err(ConfigError::InvalidTickRate(self.broadcast_rate));
        }
        self.formations()?;
        Ok(())
    }
}

fn parse_seconds(var: &str) -> Option<f32> {
    let raw = std::env::var(var).ok()?;
    match raw.parse::<f32>() {
        Ok(parsed) if parsed > 0.0 && parsed.is_finite() => Some(parsed),
        _ => {
            tracing::warn!("Invalid {} '{}', using default", var, raw);
            None
        }
    }
}

fn positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::InvalidTiming { name, value })
    }
}
