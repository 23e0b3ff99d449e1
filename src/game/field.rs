use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::game::team::Side;
use crate::util::vec3::Vec3;

/// How the ball left the pitch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutOfBounds {
    /// Crossed an end line outside the goal mouth
    GoalKickOrCorner,
    /// Crossed a touchline
    ThrowIn,
}

/// Pitch geometry, centred on the origin with X along the length
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub length: f32,
    pub width: f32,
    pub goal_width: f32,
    pub goal_height: f32,
    pub penalty_area_length: f32,
    pub penalty_area_width: f32,
    pub centre_circle_radius: f32,
}

impl Default for Field {
    fn default() -> Self {
        Self {
            length: 105.0,
            width: 68.0,
            goal_width: 7.32,
            goal_height: 2.44,
            penalty_area_length: 16.5,
            penalty_area_width: 40.32,
            centre_circle_radius: 9.15,
        }
    }
}

impl Field {
    pub fn new(
        length: f32,
        width: f32,
        goal_width: f32,
        goal_height: f32,
        penalty_area_length: f32,
        penalty_area_width: f32,
    ) -> Result<Self, ConfigError> {
        let dims = [length, width, goal_width, goal_height, penalty_area_length, penalty_area_width];
        if dims.iter().any(|d| !(*d > 0.0 && d.is_finite())) {
            return Err(ConfigError::InvalidField("dimensions must be positive and finite"));
        }
        if goal_width >= width || penalty_area_width > width {
            return Err(ConfigError::InvalidField("goal and penalty area must fit the width"));
        }
        if penalty_area_length * 2.0 >= length {
            return Err(ConfigError::InvalidField("penalty areas overlap"));
        }

        Ok(Self {
            length,
            width,
            goal_width,
            goal_height,
            penalty_area_length,
            penalty_area_width,
            ..Self::default()
        })
    }

    #[inline]
    pub fn min_x(&self) -> f32 {
        -self.length / 2.0
    }

    #[inline]
    pub fn max_x(&self) -> f32 {
        self.length / 2.0
    }

    #[inline]
    pub fn min_z(&self) -> f32 {
        -self.width / 2.0
    }

    #[inline]
    pub fn max_z(&self) -> f32 {
        self.width / 2.0
    }

    pub fn is_in_bounds(&self, p: Vec3) -> bool {
        p.x >= self.min_x() && p.x <= self.max_x() && p.z >= self.min_z() && p.z <= self.max_z()
    }

    fn in_goal_mouth(&self, p: Vec3) -> bool {
        let half = self.goal_width / 2.0;
        p.z >= -half && p.z <= half && p.y <= self.goal_height
    }

    /// Which side scored, if the ball is over a goal line inside the mouth
    ///
    /// A ball past the left end line means the side attacking left (Right) scored.
    pub fn check_goal(&self, p: Vec3) -> Option<Side> {
        if !self.in_goal_mouth(p) {
            return None;
        }
        if p.x <= self.min_x() {
            Some(Side::Right)
        } else if p.x >= self.max_x() {
            Some(Side::Left)
        } else {
            None
        }
    }

    /// End lines are checked before touchlines
    pub fn out_of_bounds_kind(&self, p: Vec3) -> Option<OutOfBounds> {
        if p.x < self.min_x() || p.x > self.max_x() {
            Some(OutOfBounds::GoalKickOrCorner)
        } else if p.z < self.min_z() || p.z > self.max_z() {
            Some(OutOfBounds::ThrowIn)
        } else {
            None
        }
    }

    /// Penalty area at the end defended by `side`
    pub fn is_in_penalty_area(&self, p: Vec3, side: Side) -> bool {
        let half_width = self.penalty_area_width / 2.0;
        if p.z < -half_width || p.z > half_width {
            return false;
        }
        match side {
            Side::Left => p.x <= self.min_x() + self.penalty_area_length,
            Side::Right => p.x >= self.max_x() - self.penalty_area_length,
        }
    }

    /// Centre of the goal defended by `side`, on the ground
    pub fn goal_center(&self, side: Side) -> Vec3 {
        match side {
            Side::Left => Vec3::new(self.min_x(), 0.0, 0.0),
            Side::Right => Vec3::new(self.max_x(), 0.0, 0.0),
        }
    }

    /// Whether a horizontal ray from `origin` along `direction` enters the goal
    /// defended by `side` between the posts
    pub fn ray_hits_goal_mouth(&self, origin: Vec3, direction: Vec3, side: Side) -> bool {
        let goal_x = self.goal_center(side).x;
        let dx = goal_x - origin.x;
        if direction.x == 0.0 || dx.signum() != direction.x.signum() {
            return false;
        }
        let t = dx / direction.x;
        let z = origin.z + direction.z * t;
        z.abs() <= self.goal_width / 2.0
    }

    /// Clamp a position to lie `buffer` inside the touchlines and end lines
    ///
    /// Returns the clamped position and, per axis, whether clamping happened
    /// at the min (-1), max (+1) or not at all (0).
    pub fn clamp_inside(&self, p: Vec3, buffer: f32) -> (Vec3, [i8; 2]) {
        let mut out = p;
        let mut hit = [0i8; 2];

        if out.x < self.min_x() + buffer {
            out.x = self.min_x() + buffer;
            hit[0] = -1;
        } else if out.x > self.max_x() - buffer {
            out.x = self.max_x() - buffer;
            hit[0] = 1;
        }

        if out.z < self.min_z() + buffer {
            out.z = self.min_z() + buffer;
            hit[1] = -1;
        } else if out.z > self.max_z() - buffer {
            out.z = self.max_z() - buffer;
            hit[1] = 1;
        }

        (out, hit)
    }

    /// Restart spot for a throw-in: nearest touchline, one unit inside
    pub fn throw_in_spot(&self, p: Vec3, height: f32) -> Vec3 {
        let z = if p.z < 0.0 { self.min_z() + 1.0 } else { self.max_z() - 1.0 };
        Vec3::new(p.x.clamp(self.min_x(), self.max_x()), height, z)
    }
}
