/// Physics constants - semi-implicit Euler, forces are accumulated then integrated once per tick
pub mod physics {
    /// Gravitational acceleration along Y (m/s²)
    pub const GRAVITY: f32 = -9.81;
    /// Height of the pitch surface
    pub const GROUND_LEVEL: f32 = 0.0;
    /// Default simulation tick rate in Hz
    pub const TICK_RATE: u32 = 60;
    /// Delta time per tick in seconds
    pub const DT: f32 = 1.0 / 60.0;
    /// Tick duration in milliseconds
    pub const TICK_DURATION_MS: u64 = 1000 / TICK_RATE as u64;
}

/// Ball constants (FIFA size 5 ball)
pub mod ball {
    /// Ball mass in kg
    pub const MASS: f32 = 0.45;
    /// Ball radius in metres
    pub const RADIUS: f32 = 0.11;
    /// Coefficient of restitution against ground and bodies
    pub const RESTITUTION: f32 = 0.6;
    /// Rolling friction applied to horizontal velocity while grounded
    pub const FRICTION: f32 = 0.98;
    /// Velocity multiplier applied every tick (exponential drag)
    pub const AIR_RESISTANCE: f32 = 0.999;
    /// Spin multiplier applied every tick
    pub const SPIN_DECAY: f32 = 0.99;
    /// Magnus force scale: F = (spin × velocity) * MAGNUS_COEFFICIENT
    pub const MAGNUS_COEFFICIENT: f32 = 0.0001;
    /// Spin magnitude below which no Magnus force is computed
    pub const SPIN_THRESHOLD: f32 = 0.1;
    /// Bounce speed below which the ball settles on the ground
    pub const REST_THRESHOLD: f32 = 0.3;
    /// Height the ball is placed at for restarts
    pub const RESTART_HEIGHT: f32 = 1.0;
}

/// Player body and action constants
pub mod player {
    /// Player mass in kg
    pub const MASS: f32 = 75.0;
    /// Collision radius in metres
    pub const RADIUS: f32 = 0.3;
    /// Low bounce off the ground and other bodies
    pub const RESTITUTION: f32 = 0.1;
    /// Ground friction applied to horizontal velocity while grounded
    pub const FRICTION: f32 = 0.98;
    /// Bounce speed below which a player counts as landed
    pub const REST_THRESHOLD: f32 = 0.5;
    /// Maximum roster size per team
    pub const MAX_ROSTER: usize = 11;

    /// Base jump force (plus strength scaling)
    pub const JUMP_BASE_FORCE: f32 = 1000.0;
    /// Extra jump force per point of strength
    pub const JUMP_STRENGTH_FORCE: f32 = 50.0;
    /// Stamina required (strictly above) to jump
    pub const JUMP_MIN_STAMINA: f32 = 10.0;
    /// Stamina spent per jump
    pub const JUMP_STAMINA_COST: f32 = 10.0;

    /// Lateral force of a slide tackle
    pub const SLIDE_FORCE: f32 = 800.0;
    /// Slide duration in seconds
    pub const SLIDE_DURATION: f32 = 1.0;
    /// Stamina required (strictly above) to slide
    pub const SLIDE_MIN_STAMINA: f32 = 20.0;
    /// Stamina spent per slide
    pub const SLIDE_STAMINA_COST: f32 = 20.0;

    /// Stamina spent per tick of movement at intensity 1.0
    pub const MOVE_STAMINA_COST: f32 = 0.1;
    /// Stamina recovered per second while resting
    pub const STAMINA_REGEN_RATE: f32 = 5.0;
    /// Speed below which stamina regenerates
    pub const REGEN_SPEED_THRESHOLD: f32 = 2.0;
    /// Minimum direction length that updates facing
    pub const FACING_THRESHOLD: f32 = 0.1;
    /// Intensity above which the running animation plays
    pub const RUN_INTENSITY: f32 = 0.7;
    /// Distance kept from the field edge
    pub const BOUNDS_BUFFER: f32 = 1.0;
}

/// Action radii offsets (added to the player's body radius)
pub mod reach {
    pub const KICK: f32 = 0.5;
    pub const PASS: f32 = 0.4;
    pub const TACKLE: f32 = 0.3;
    pub const TACKLE_SLIDING: f32 = 1.0;
    pub const INTERCEPT: f32 = 0.2;
}

/// Ball possession constants
pub mod possession {
    /// Distance within which a player picks up the ball
    pub const PICKUP_RADIUS: f32 = 0.8;
    /// Possession is lost beyond PICKUP_RADIUS * RELEASE_FACTOR
    pub const RELEASE_FACTOR: f32 = 1.5;
    /// Ball speed above which nobody can pick it up
    pub const MAX_PICKUP_SPEED: f32 = 3.0;
    /// Match-clock interval between possession samples (seconds)
    pub const SAMPLE_INTERVAL: f32 = 1.0;
}

/// Kick, pass and tackle tuning
pub mod actions {
    /// Default kick power when none is given
    pub const KICK_DEFAULT_POWER: f32 = 800.0;
    /// Kick power cap
    pub const KICK_MAX_POWER: f32 = 1500.0;
    /// Jitter scale for kicks at zero accuracy
    pub const KICK_JITTER: f32 = 0.3;
    /// Default pass power
    pub const PASS_DEFAULT_POWER: f32 = 400.0;
    /// Pass power cap
    pub const PASS_MAX_POWER: f32 = 800.0;
    /// Jitter scale for passes at zero accuracy
    pub const PASS_JITTER: f32 = 0.2;
    /// Passes with a jitter factor below this count as accurate
    pub const ACCURATE_PASS_JITTER: f32 = 0.1;
    /// Skill value that maps to perfect accuracy
    pub const SKILL_SCALE: f32 = 10.0;
    /// Tackle success = defending / TACKLE_SKILL_SCALE
    pub const TACKLE_SKILL_SCALE: f32 = 15.0;
    /// Force applied to a successfully tackled opponent
    pub const TACKLE_PUSH_FORCE: f32 = 300.0;
    /// Force applied to the ball when it is stripped
    pub const TACKLE_BALL_FORCE: f32 = 200.0;
    /// Chance that a failed tackle is a foul
    pub const FOUL_CHANCE: f64 = 0.3;
}

/// Match timing constants
pub mod timing {
    /// Half duration in seconds (45 minutes)
    pub const HALF_DURATION: f32 = 45.0 * 60.0;
    /// Delay between a goal and the kickoff reset (seconds)
    pub const GOAL_RESET_DELAY: f32 = 3.0;
    /// Half-time break (seconds)
    pub const HALFTIME_DELAY: f32 = 15.0;
}

/// AI bot constants
pub mod ai {
    /// Distance at which an AI player chases the ball
    pub const CHASE_RADIUS: f32 = 5.0;
    pub const CHASE_INTENSITY: f32 = 0.8;
    pub const DRIBBLE_INTENSITY: f32 = 0.6;
    pub const RETURN_INTENSITY: f32 = 0.4;
    /// Displacement from formation target that triggers a return
    pub const RETURN_THRESHOLD: f32 = 2.0;
    /// Per-tick chance to pass while holding the ball
    pub const PASS_CHANCE: f64 = 0.1;
    /// Per-tick chance to shoot while holding the ball (when not passing)
    pub const SHOOT_CHANCE: f64 = 0.05;
    pub const PASS_POWER: f32 = 400.0;
    pub const SHOT_POWER: f32 = 1000.0;
    /// Vertical component of an AI shot direction
    pub const SHOT_LIFT: f32 = 0.3;
}

/// Networking constants
#[allow(dead_code)] // Constants for client reference
pub mod net {
    /// Maximum reliable message size
    pub const MAX_MESSAGE_SIZE: usize = 65536;
    /// Snapshot broadcast rate (can be lower than tick rate)
    pub const SNAPSHOT_RATE: u32 = 60;
    /// Inbox capacity (messages buffered between ticks)
    pub const INPUT_BUFFER_SIZE: usize = 1024;
}
