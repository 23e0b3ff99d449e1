use serde::{Deserialize, Serialize};

use crate::game::body::{Body, BodyKind, BodyProps, Kinetic};
use crate::game::constants::ball::*;
use crate::game::player::PlayerId;
use crate::game::team::TeamId;
use crate::util::vec3::Vec3;

/// Who last touched the ball and when (match clock seconds)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Touch {
    pub player: PlayerId,
    pub team: TeamId,
    pub time: f32,
}

/// The match ball
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub body: Body,
    pub spin: Vec3,
    pub air_resistance: f32,
    pub spin_decay: f32,
    pub last_touched_by: Option<PlayerId>,
    pub last_touched_team: Option<TeamId>,
    pub last_touch_time: f32,
    pub in_play: bool,
}

impl Ball {
    pub fn props() -> BodyProps {
        BodyProps {
            mass: MASS,
            radius: RADIUS,
            restitution: RESTITUTION,
            friction: FRICTION,
        }
    }

    pub fn new(position: Vec3) -> Self {
        Self {
            body: Body::preset(position, Self::props()),
            spin: Vec3::ZERO,
            air_resistance: AIR_RESISTANCE,
            spin_decay: SPIN_DECAY,
            last_touched_by: None,
            last_touched_team: None,
            last_touch_time: 0.0,
            in_play: true,
        }
    }

    /// Ball at the centre spot, raised for the kickoff drop
    pub fn at_centre() -> Self {
        Self::new(Vec3::new(0.0, RESTART_HEIGHT, 0.0))
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.body.position
    }

    #[inline]
    pub fn velocity(&self) -> Vec3 {
        self.body.velocity
    }

    /// Apply an impulse-like force and add spin, recording the toucher if any
    pub fn apply_kick(&mut self, force: Vec3, spin: Vec3, toucher: Option<Touch>) {
        self.body.apply_force(force);
        self.spin += spin;
        if let Some(touch) = toucher {
            self.record_touch(touch);
        }
    }

    pub fn record_touch(&mut self, touch: Touch) {
        self.last_touched_by = Some(touch.player);
        self.last_touched_team = Some(touch.team);
        self.last_touch_time = touch.time;
    }

    /// Magnus force for the current spin and velocity
    pub fn magnus_force(&self) -> Vec3 {
        if self.spin.length() > SPIN_THRESHOLD {
            self.spin.cross(self.body.velocity) * MAGNUS_COEFFICIENT
        } else {
            Vec3::ZERO
        }
    }

    /// Drag, curve, spin decay, then integration and ground friction
    pub fn update(&mut self, dt: f32) {
        self.body.velocity *= self.air_resistance;

        let magnus = self.magnus_force();
        if magnus != Vec3::ZERO {
            self.body.apply_force(magnus);
        }

        self.spin *= self.spin_decay;
        self.body.integrate(dt);
        self.body.apply_ground_friction();
    }

    /// Move the ball for a restart, dropping velocity and spin
    pub fn reposition(&mut self, position: Vec3) {
        self.body.teleport(position);
        self.spin = Vec3::ZERO;
    }

    /// Centre spot restart; the kicking team counts as the last to touch
    pub fn place_for_kickoff(&mut self, kicking: TeamId) {
        self.reposition(Vec3::new(0.0, RESTART_HEIGHT, 0.0));
        self.last_touched_by = None;
        self.last_touched_team = Some(kicking);
    }
}

impl Kinetic for Ball {
    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn kind(&self) -> BodyKind {
        BodyKind::Ball
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_ball_defaults() {
        let ball = Ball::at_centre();
        assert_eq!(ball.position(), Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(ball.body.mass(), 0.45);
        assert_eq!(ball.body.radius(), 0.11);
        assert!(ball.last_touched_by.is_none());
        assert!(ball.in_play);
        assert_eq!(ball.kind(), BodyKind::Ball);
    }

    #[test]
    fn test_apply_kick_records_touch() {
        let mut ball = Ball::at_centre();
        let touch = Touch {
            player: 4,
            team: TeamId::Away,
            time: 12.5,
        };
        ball.apply_kick(Vec3::new(0.45, 0.0, 0.0), Vec3::new(0.0, 2.0, 0.0), Some(touch));

        assert!(ball.body.acceleration.approx_eq(Vec3::X, 1e-6));
        assert_eq!(ball.spin, Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(ball.last_touched_by, Some(4));
        assert_eq!(ball.last_touched_team, Some(TeamId::Away));
        assert_eq!(ball.last_touch_time, 12.5);
    }

    #[test]
    fn test_apply_kick_without_toucher_keeps_previous() {
        let mut ball = Ball::at_centre();
        ball.last_touched_by = Some(1);
        ball.apply_kick(Vec3::X, Vec3::ZERO, None);
        assert_eq!(ball.last_touched_by, Some(1));
    }

    #[test]
    fn test_update_applies_drag() {
        let mut ball = Ball::new(Vec3::new(0.0, 5.0, 0.0));
        ball.body.velocity = Vec3::new(10.0, 0.0, 0.0);
        ball.update(1.0 / 60.0);
        assert!((ball.velocity().x - 10.0 * AIR_RESISTANCE).abs() < 1e-5);
    }

    #[test]
    fn test_spin_decays() {
        let mut ball = Ball::new(Vec3::new(0.0, 5.0, 0.0));
        ball.spin = Vec3::new(0.0, 10.0, 0.0);
        ball.update(1.0 / 60.0);
        assert!((ball.spin.y - 10.0 * SPIN_DECAY).abs() < 1e-5);
    }

    #[test]
    fn test_magnus_curves_ball() {
        let mut ball = Ball::new(Vec3::new(0.0, 5.0, 0.0));
        ball.body.velocity = Vec3::new(20.0, 0.0, 0.0);
        ball.spin = Vec3::new(0.0, 50.0, 0.0);

        // (0, 50, 0) x (20, 0, 0) = (0, 0, -1000)
        let force = ball.magnus_force();
        assert!(force.z < 0.0);
        assert!(force.x.abs() < 1e-6);

        ball.update(1.0 / 60.0);
        assert!(ball.velocity().z < 0.0);
    }

    #[test]
    fn test_small_spin_has_no_magnus() {
        let mut ball = Ball::at_centre();
        ball.body.velocity = Vec3::new(20.0, 0.0, 0.0);
        ball.spin = Vec3::new(0.0, 0.05, 0.0);
        assert_eq!(ball.magnus_force(), Vec3::ZERO);
    }

    #[test]
    fn test_reposition_clears_motion() {
        let mut ball = Ball::at_centre();
        ball.body.velocity = Vec3::new(3.0, 3.0, 3.0);
        ball.spin = Vec3::UP;
        ball.reposition(Vec3::new(10.0, 1.0, 33.0));
        assert_eq!(ball.position(), Vec3::new(10.0, 1.0, 33.0));
        assert_eq!(ball.velocity(), Vec3::ZERO);
        assert_eq!(ball.spin, Vec3::ZERO);
    }

    #[test]
    fn test_place_for_kickoff() {
        let mut ball = Ball::new(Vec3::new(40.0, 0.11, 3.0));
        ball.last_touched_by = Some(9);
        ball.place_for_kickoff(TeamId::Home);
        assert_eq!(ball.position(), Vec3::new(0.0, 1.0, 0.0));
        assert!(ball.last_touched_by.is_none());
        assert_eq!(ball.last_touched_team, Some(TeamId::Home));
    }
}
