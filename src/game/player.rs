use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::ConfigError;
use crate::game::body::{Body, BodyKind, BodyProps, Kinetic};
use crate::game::constants::{player as consts, reach};
use crate::game::team::TeamId;
use crate::util::vec3::Vec3;

/// Player identifier, unique within a match
pub type PlayerId = u32;

/// Identity of a human controller (one per connection)
pub type ControllerId = Uuid;

/// Playing role; adjusts base stats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Archetype {
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
}

impl Archetype {
    pub fn as_str(&self) -> &'static str {
        match self {
            Archetype::Goalkeeper => "goalkeeper",
            Archetype::Defender => "defender",
            Archetype::Midfielder => "midfielder",
            Archetype::Forward => "forward",
        }
    }
}

/// Requested stats; anything missing falls back to the base value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    pub speed: Option<f32>,
    pub acceleration: Option<f32>,
    pub agility: Option<f32>,
    pub strength: Option<f32>,
    pub stamina: Option<f32>,
    pub max_stamina: Option<f32>,
    pub ball_control: Option<f32>,
    pub shooting: Option<f32>,
    pub passing: Option<f32>,
    pub defending: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub speed: f32,
    pub acceleration: f32,
    pub agility: f32,
    pub strength: f32,
    pub stamina: f32,
    pub max_stamina: f32,
    pub ball_control: f32,
    pub shooting: f32,
    pub passing: f32,
    pub defending: f32,
    pub archetype: Archetype,
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self {
            speed: 7.5,
            acceleration: 12.0,
            agility: 8.0,
            strength: 7.0,
            stamina: 100.0,
            max_stamina: 100.0,
            ball_control: 8.0,
            shooting: 7.0,
            passing: 8.0,
            defending: 6.0,
            archetype: Archetype::Midfielder,
        }
    }
}

impl PlayerStats {
    /// Base values, then requested overrides, then the archetype modifiers
    pub fn build(config: &StatsConfig, archetype: Archetype) -> Result<Self, ConfigError> {
        let base = Self::default();
        let mut stats = Self {
            speed: config.speed.unwrap_or(base.speed),
            acceleration: config.acceleration.unwrap_or(base.acceleration),
            agility: config.agility.unwrap_or(base.agility),
            strength: config.strength.unwrap_or(base.strength),
            stamina: config.stamina.unwrap_or(base.stamina),
            max_stamina: config.max_stamina.unwrap_or(base.max_stamina),
            ball_control: config.ball_control.unwrap_or(base.ball_control),
            shooting: config.shooting.unwrap_or(base.shooting),
            passing: config.passing.unwrap_or(base.passing),
            defending: config.defending.unwrap_or(base.defending),
            archetype,
        };

        match archetype {
            Archetype::Goalkeeper => {
                stats.defending = 9.0;
                stats.speed = 6.0;
                stats.shooting = 4.0;
            }
            Archetype::Defender => {
                stats.defending = 9.0;
                stats.strength = 9.0;
                stats.speed = 6.5;
                stats.shooting = 5.0;
            }
            Archetype::Midfielder => {
                stats.passing = 9.0;
                stats.ball_control = 9.0;
                // Engine of the team: a deeper stamina tank, starting full
                stats.max_stamina += 12.0;
                if config.stamina.is_none() {
                    stats.stamina = stats.max_stamina;
                }
            }
            Archetype::Forward => {
                stats.shooting = 9.0;
                stats.speed = 9.0;
                stats.acceleration = 14.0;
                stats.defending = 4.0;
            }
        }

        stats.validate()?;
        stats.stamina = stats.stamina.min(stats.max_stamina);
        Ok(stats)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("speed", self.speed),
            ("acceleration", self.acceleration),
            ("agility", self.agility),
            ("strength", self.strength),
            ("stamina", self.stamina),
            ("max_stamina", self.max_stamina),
            ("ball_control", self.ball_control),
            ("shooting", self.shooting),
            ("passing", self.passing),
            ("defending", self.defending),
        ];
        for (name, value) in fields {
            if !(value > 0.0 && value.is_finite()) {
                return Err(ConfigError::InvalidStat { name, value });
            }
        }
        Ok(())
    }

    pub fn consume_stamina(&mut self, amount: f32) {
        self.stamina = (self.stamina - amount).clamp(0.0, self.max_stamina);
    }

    pub fn recover_stamina(&mut self, amount: f32) {
        self.stamina = (self.stamina + amount).clamp(0.0, self.max_stamina);
    }

    /// 50% at empty stamina up to 100% when fresh
    pub fn speed_multiplier(&self) -> f32 {
        0.5 + 0.5 * (self.stamina / self.max_stamina)
    }
}

/// Actions whose reach depends on the player's radius
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Kick,
    Pass,
    Tackle,
    Intercept,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationState {
    #[default]
    Idle,
    Walking,
    Running,
    Jumping,
    Sliding,
}

/// Who drives a player
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlMode {
    #[default]
    Ai,
    Human(ControllerId),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub team: TeamId,
    pub body: Body,
    pub stats: PlayerStats,
    pub has_ball: bool,
    pub ball_control_time: f32,
    pub is_jumping: bool,
    pub is_sliding: bool,
    pub slide_timer: f32,
    pub facing: Vec3,
    pub animation: AnimationState,
    pub control: ControlMode,
    pub formation_slot: Option<usize>,
    pub target_position: Vec3,
}

impl Player {
    pub fn props() -> BodyProps {
        BodyProps {
            mass: consts::MASS,
            radius: consts::RADIUS,
            restitution: consts::RESTITUTION,
            friction: consts::FRICTION,
        }
    }

    pub fn new(id: PlayerId, name: impl Into<String>, team: TeamId, position: Vec3, stats: PlayerStats) -> Self {
        let mut body = Body::preset(position, Self::props());
        body.grounded = true;

        Self {
            id,
            name: name.into(),
            team,
            body,
            stats,
            has_ball: false,
            ball_control_time: 0.0,
            is_jumping: false,
            is_sliding: false,
            slide_timer: 0.0,
            facing: Vec3::X,
            animation: AnimationState::Idle,
            control: ControlMode::Ai,
            formation_slot: None,
            target_position: position,
        }
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.body.position
    }

    #[inline]
    pub fn is_ai(&self) -> bool {
        matches!(self.control, ControlMode::Ai)
    }

    pub fn controller(&self) -> Option<ControllerId> {
        match self.control {
            ControlMode::Human(id) => Some(id),
            ControlMode::Ai => None,
        }
    }

    /// Drive the player along `direction` on the ground plane
    ///
    /// Returns false only while sliding. Past the stamina-scaled speed cap the
    /// request is accepted but adds no force.
    pub fn apply_move(&mut self, direction: Vec3, intensity: f32) -> bool {
        if self.is_sliding {
            return false;
        }

        let intensity = intensity.clamp(0.0, 1.0);
        let max_force = self.stats.speed * self.stats.acceleration * intensity;
        let multiplier = self.stats.speed_multiplier();
        let speed_cap = self.stats.speed * multiplier;

        if self.body.speed() < speed_cap {
            self.body.apply_force(direction.normalize() * max_force * multiplier);

            if direction.length() > consts::FACING_THRESHOLD {
                self.facing = direction.normalize();
            }

            self.stats.consume_stamina(consts::MOVE_STAMINA_COST * intensity);
            self.animation = if intensity > consts::RUN_INTENSITY {
                AnimationState::Running
            } else {
                AnimationState::Walking
            };
        }

        true
    }

    pub fn jump(&mut self) -> bool {
        if !self.body.grounded || self.is_jumping || self.stats.stamina <= consts::JUMP_MIN_STAMINA {
            return false;
        }

        let force = consts::JUMP_BASE_FORCE + self.stats.strength * consts::JUMP_STRENGTH_FORCE;
        self.body.apply_force(Vec3::new(0.0, force, 0.0));
        self.body.grounded = false;
        self.is_jumping = true;
        self.stats.consume_stamina(consts::JUMP_STAMINA_COST);
        self.animation = AnimationState::Jumping;
        true
    }

    pub fn slide_tackle(&mut self, direction: Vec3) -> bool {
        if self.is_sliding || !self.body.grounded || self.stats.stamina <= consts::SLIDE_MIN_STAMINA {
            return false;
        }

        self.is_sliding = true;
        self.slide_timer = consts::SLIDE_DURATION;
        self.body.apply_force(direction.normalize() * consts::SLIDE_FORCE);
        self.stats.consume_stamina(consts::SLIDE_STAMINA_COST);
        self.animation = AnimationState::Sliding;
        true
    }

    pub fn update(&mut self, dt: f32) {
        if self.is_sliding {
            self.slide_timer -= dt;
            if self.slide_timer <= 0.0 {
                self.is_sliding = false;
                self.slide_timer = 0.0;
                self.animation = AnimationState::Idle;
            }
        }

        self.body.integrate(dt);
        self.body.apply_ground_friction();

        if !self.is_sliding && self.body.speed() < consts::REGEN_SPEED_THRESHOLD {
            self.stats.recover_stamina(consts::STAMINA_REGEN_RATE * dt);
        }

        if self.has_ball {
            self.ball_control_time += dt;
        } else {
            self.ball_control_time = 0.0;
        }
    }

    pub fn action_radius(&self, action: ActionKind) -> f32 {
        let base = self.body.radius();
        match action {
            ActionKind::Kick => base + reach::KICK,
            ActionKind::Pass => base + reach::PASS,
            ActionKind::Tackle if self.is_sliding => base + reach::TACKLE_SLIDING,
            ActionKind::Tackle => base + reach::TACKLE,
            ActionKind::Intercept => base + reach::INTERCEPT,
        }
    }

    /// Put the player back on a spot at rest, without the ball
    pub fn reset_to(&mut self, position: Vec3) {
        self.body.teleport(position);
        self.has_ball = false;
        self.ball_control_time = 0.0;
    }
}

impl Kinetic for Player {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn kind(&self) -> BodyKind {
        BodyKind::Player
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::constants::physics::DT;

    fn create_test_player() -> Player {
        Player::new(1, "Test", TeamId::Home, Vec3::new(0.0, consts::RADIUS, 0.0), PlayerStats::default())
    }

    #[test]
    fn test_default_stats() {
        let stats = PlayerStats::default();
        assert_eq!(stats.speed, 7.5);
        assert_eq!(stats.acceleration, 12.0);
        assert_eq!(stats.max_stamina, 100.0);
        assert_eq!(stats.defending, 6.0);
    }

    #[test]
    fn test_archetype_modifiers() {
        let config = StatsConfig::default();

        let gk = PlayerStats::build(&config, Archetype::Goalkeeper).unwrap();
        assert_eq!((gk.defending, gk.speed, gk.shooting), (9.0, 6.0, 4.0));

        let def = PlayerStats::build(&config, Archetype::Defender).unwrap();
        assert_eq!((def.defending, def.strength, def.speed, def.shooting), (9.0, 9.0, 6.5, 5.0));

        let fwd = PlayerStats::build(&config, Archetype::Forward).unwrap();
        assert_eq!((fwd.shooting, fwd.speed, fwd.acceleration, fwd.defending), (9.0, 9.0, 14.0, 4.0));
    }

    #[test]
    fn test_midfielder_gets_extra_stamina() {
        let mid = PlayerStats::build(&StatsConfig::default(), Archetype::Midfielder).unwrap();
        assert_eq!(mid.passing, 9.0);
        assert_eq!(mid.ball_control, 9.0);
        assert_eq!(mid.max_stamina, 112.0);
        assert_eq!(mid.stamina, 112.0);
    }

    #[test]
    fn test_build_uses_overrides() {
        let config = StatsConfig {
            passing: Some(3.0),
            strength: Some(10.0),
            ..StatsConfig::default()
        };
        let stats = PlayerStats::build(&config, Archetype::Forward).unwrap();
        assert_eq!(stats.passing, 3.0);
        assert_eq!(stats.strength, 10.0);
    }

    #[test]
    fn test_build_rejects_invalid_stat() {
        let config = StatsConfig {
            agility: Some(-1.0),
            ..StatsConfig::default()
        };
        assert!(matches!(
            PlayerStats::build(&config, Archetype::Midfielder),
            Err(ConfigError::InvalidStat { name: "agility", .. })
        ));

        let config = StatsConfig {
            max_stamina: Some(f32::INFINITY),
            ..StatsConfig::default()
        };
        assert!(PlayerStats::build(&config, Archetype::Forward).is_err());
    }

    #[test]
    fn test_stamina_clamps() {
        let mut stats = PlayerStats::default();
        stats.consume_stamina(500.0);
        assert_eq!(stats.stamina, 0.0);
        assert_eq!(stats.speed_multiplier(), 0.5);

        stats.recover_stamina(500.0);
        assert_eq!(stats.stamina, stats.max_stamina);
        assert_eq!(stats.speed_multiplier(), 1.0);
    }

    #[test]
    fn test_move_applies_scaled_force() {
        let mut player = create_test_player();
        player.stats.stamina = 50.0;

        assert!(player.apply_move(Vec3::new(2.0, 0.0, 0.0), 1.0));

        // force = 7.5 * 12 * 0.75 = 67.5, a = 67.5 / 75
        assert!((player.body.acceleration.x - 0.9).abs() < 1e-5);
        assert_eq!(player.facing, Vec3::X);
        assert!((player.stats.stamina - 49.9).abs() < 1e-4);
        assert_eq!(player.animation, AnimationState::Running);
    }

    #[test]
    fn test_move_intensity_is_bounded() {
        let mut player = create_test_player();
        player.stats.stamina = 80.0;
        assert!(player.apply_move(Vec3::X, -50.0));
        assert_eq!(player.body.acceleration, Vec3::ZERO);
        assert_eq!(player.stats.stamina, 80.0);

        let mut eager = create_test_player();
        let mut steady = create_test_player();
        eager.apply_move(Vec3::X, 50.0);
        steady.apply_move(Vec3::X, 1.0);
        assert_eq!(eager.body.acceleration, steady.body.acceleration);
        assert_eq!(eager.stats.stamina, steady.stats.stamina);
    }

    #[test]
    fn test_stamina_stays_within_bounds() {
        let mut stats = PlayerStats::default();
        stats.stamina = 95.0;
        stats.consume_stamina(-20.0);
        assert_eq!(stats.stamina, stats.max_stamina);

        stats.recover_stamina(-500.0);
        assert_eq!(stats.stamina, 0.0);
    }

    #[test]
    fn test_move_walk_animation() {
        let mut player = create_test_player();
        player.apply_move(Vec3::Z, 0.5);
        assert_eq!(player.animation, AnimationState::Walking);
    }

    #[test]
    fn test_move_at_speed_cap_adds_no_force() {
        let mut player = create_test_player();
        player.body.velocity = Vec3::new(8.0, 0.0, 0.0);
        let stamina = player.stats.stamina;

        assert!(player.apply_move(Vec3::X, 1.0));
        assert_eq!(player.body.acceleration, Vec3::ZERO);
        assert_eq!(player.stats.stamina, stamina);
    }

    #[test]
    fn test_move_rejected_while_sliding() {
        let mut player = create_test_player();
        assert!(player.slide_tackle(Vec3::X));
        player.body.acceleration = Vec3::ZERO;

        assert!(!player.apply_move(Vec3::Z, 1.0));
        assert_eq!(player.body.acceleration, Vec3::ZERO);
    }

    #[test]
    fn test_exhausted_player_still_moves() {
        let mut player = create_test_player();
        player.stats.stamina = 0.0;
        player.apply_move(Vec3::X, 1.0);
        assert!(player.body.acceleration.x > 0.0);
    }

    #[test]
    fn test_jump() {
        let mut player = create_test_player();
        assert!(player.jump());
        assert!(player.is_jumping);
        assert!(!player.body.grounded);
        assert_eq!(player.stats.stamina, 90.0);
        // (1000 + 7 * 50) / 75
        assert!((player.body.acceleration.y - 18.0).abs() < 1e-4);
    }

    #[test]
    fn test_jump_rejected_when_airborne_or_tired() {
        let mut player = create_test_player();
        player.body.grounded = false;
        assert!(!player.jump());
        assert_eq!(player.body.acceleration, Vec3::ZERO);
        assert_eq!(player.stats.stamina, 100.0);

        let mut tired = create_test_player();
        tired.stats.stamina = 10.0;
        assert!(!tired.jump());
        assert_eq!(tired.stats.stamina, 10.0);
    }

    #[test]
    fn test_slide_tackle() {
        let mut player = create_test_player();
        assert!(player.slide_tackle(Vec3::new(0.0, 0.0, 3.0)));
        assert!(player.is_sliding);
        assert_eq!(player.slide_timer, 1.0);
        assert_eq!(player.stats.stamina, 80.0);
        assert!((player.body.acceleration.z - 800.0 / 75.0).abs() < 1e-4);
        assert_eq!(player.animation, AnimationState::Sliding);

        assert!(!player.slide_tackle(Vec3::X));
    }

    #[test]
    fn test_slide_requires_stamina() {
        let mut player = create_test_player();
        player.stats.stamina = 20.0;
        assert!(!player.slide_tackle(Vec3::X));
        assert!(!player.is_sliding);
    }

    #[test]
    fn test_slide_expires() {
        let mut player = create_test_player();
        player.slide_tackle(Vec3::X);
        for _ in 0..61 {
            player.update(DT);
        }
        assert!(!player.is_sliding);
        assert_eq!(player.animation, AnimationState::Idle);
    }

    #[test]
    fn test_stamina_regen_only_when_slow() {
        let mut player = create_test_player();
        player.stats.stamina = 50.0;
        player.update(1.0);
        assert!((player.stats.stamina - 55.0).abs() < 1e-4);

        let mut sprinter = create_test_player();
        sprinter.stats.stamina = 50.0;
        sprinter.body.velocity = Vec3::new(6.0, 0.0, 0.0);
        sprinter.update(DT);
        assert_eq!(sprinter.stats.stamina, 50.0);
    }

    #[test]
    fn test_no_regen_while_sliding() {
        let mut player = create_test_player();
        player.stats.stamina = 50.0;
        player.is_sliding = true;
        player.slide_timer = 1.0;

        player.update(0.5);
        assert!(player.is_sliding);
        assert!(player.body.speed() < 1.0);
        assert_eq!(player.stats.stamina, 50.0);
    }

    #[test]
    fn test_ball_control_time() {
        let mut player = create_test_player();
        player.has_ball = true;
        player.update(0.5);
        player.update(0.5);
        assert!((player.ball_control_time - 1.0).abs() < 1e-6);

        player.has_ball = false;
        player.update(DT);
        assert_eq!(player.ball_control_time, 0.0);
    }

    #[test]
    fn test_action_radius() {
        let mut player = create_test_player();
        assert!((player.action_radius(ActionKind::Kick) - 0.8).abs() < 1e-6);
        assert!((player.action_radius(ActionKind::Pass) - 0.7).abs() < 1e-6);
        assert!((player.action_radius(ActionKind::Tackle) - 0.6).abs() < 1e-6);
        assert!((player.action_radius(ActionKind::Intercept) - 0.5).abs() < 1e-6);

        player.is_sliding = true;
        assert!((player.action_radius(ActionKind::Tackle) - 1.3).abs() < 1e-6);
    }

    #[test]
    fn test_control_mode() {
        let mut player = create_test_player();
        assert!(player.is_ai());
        assert!(player.controller().is_none());

        let controller = Uuid::new_v4();
        player.control = ControlMode::Human(controller);
        assert!(!player.is_ai());
        assert_eq!(player.controller(), Some(controller));
    }
}
