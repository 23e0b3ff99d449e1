use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::util::vec3::Vec3;

/// Physical properties of a body, validated once in [`Body::new`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyProps {
    pub mass: f32,
    pub radius: f32,
    pub restitution: f32,
    pub friction: f32,
}

/// Point mass with a spherical collision radius
///
/// Forces accumulate into `acceleration` and are consumed by [`Body::integrate`]
/// (semi-implicit Euler: velocity first, then position with the new velocity).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub position: Vec3,
    pub velocity: Vec3,
    pub acceleration: Vec3,
    mass: f32,
    radius: f32,
    restitution: f32,
    friction: f32,
    pub grounded: bool,
}

impl Body {
    pub fn new(position: Vec3, props: BodyProps) -> Result<Self, ConfigError> {
        if !(props.mass > 0.0 && props.mass.is_finite()) {
            return Err(ConfigError::InvalidMass(props.mass));
        }
        if !(props.radius > 0.0 && props.radius.is_finite()) {
            return Err(ConfigError::InvalidRadius(props.radius));
        }
        if !(0.0..=1.0).contains(&props.restitution) {
            return Err(ConfigError::InvalidCoefficient {
                name: "restitution",
                value: props.restitution,
            });
        }
        if !(0.0..=1.0).contains(&props.friction) {
            return Err(ConfigError::InvalidCoefficient {
                name: "friction",
                value: props.friction,
            });
        }

        Ok(Self::preset(position, props))
    }

    /// Build from the built-in ball/player constants, which are known valid
    pub(crate) fn preset(position: Vec3, props: BodyProps) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            mass: props.mass,
            radius: props.radius,
            restitution: props.restitution,
            friction: props.friction,
            grounded: false,
        }
    }

    #[inline]
    pub fn mass(&self) -> f32 {
        self.mass
    }

    #[inline]
    pub fn inverse_mass(&self) -> f32 {
        1.0 / self.mass
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    #[inline]
    pub fn restitution(&self) -> f32 {
        self.restitution
    }

    #[inline]
    pub fn friction(&self) -> f32 {
        self.friction
    }

    pub fn props(&self) -> BodyProps {
        BodyProps {
            mass: self.mass,
            radius: self.radius,
            restitution: self.restitution,
            friction: self.friction,
        }
    }

    /// Accumulate a force for the current step (a = F / m)
    #[inline]
    pub fn apply_force(&mut self, force: Vec3) {
        self.acceleration += force * self.inverse_mass();
    }

    /// Advance one step and clear the accumulated acceleration
    pub fn integrate(&mut self, dt: f32) {
        self.velocity += self.acceleration * dt;
        self.position += self.velocity * dt;
        self.acceleration = Vec3::ZERO;
    }

    /// Scale horizontal velocity by the friction coefficient while grounded
    pub fn apply_ground_friction(&mut self) {
        if self.grounded {
            self.velocity.x *= self.friction;
            self.velocity.z *= self.friction;
        }
    }

    /// Move without changing identity, dropping all motion
    pub fn teleport(&mut self, position: Vec3) {
        self.position = position;
        self.velocity = Vec3::ZERO;
        self.acceleration = Vec3::ZERO;
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }
}

/// What kind of simulated object a body belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyKind {
    Ball,
    Player,
}

/// Anything that carries a [`Body`]
pub trait Kinetic {
    fn body(&self) -> &Body;
    fn body_mut(&mut self) -> &mut Body;
    fn kind(&self) -> BodyKind;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props() -> BodyProps {
        BodyProps {
            mass: 2.0,
            radius: 0.5,
            restitution: 0.5,
            friction: 0.9,
        }
    }

    #[test]
    fn test_new_rejects_bad_props() {
        let bad_mass = BodyProps { mass: 0.0, ..props() };
        assert_eq!(Body::new(Vec3::ZERO, bad_mass), Err(ConfigError::InvalidMass(0.0)));

        let nan_mass = BodyProps { mass: f32::NAN, ..props() };
        assert!(matches!(Body::new(Vec3::ZERO, nan_mass), Err(ConfigError::InvalidMass(_))));

        let bad_radius = BodyProps { radius: -1.0, ..props() };
        assert_eq!(Body::new(Vec3::ZERO, bad_radius), Err(ConfigError::InvalidRadius(-1.0)));

        let bad_e = BodyProps { restitution: 1.5, ..props() };
        assert!(matches!(
            Body::new(Vec3::ZERO, bad_e),
            Err(ConfigError::InvalidCoefficient { name: "restitution", .. })
        ));

        let bad_f = BodyProps { friction: -0.1, ..props() };
        assert!(matches!(
            Body::new(Vec3::ZERO, bad_f),
            Err(ConfigError::InvalidCoefficient { name: "friction", .. })
        ));
    }

    #[test]
    fn test_apply_force_accumulates() {
        let mut body = Body::new(Vec3::ZERO, props()).unwrap();
        body.apply_force(Vec3::new(2.0, 0.0, 0.0));
        body.apply_force(Vec3::new(0.0, 4.0, 0.0));
        assert_eq!(body.acceleration, Vec3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn test_integrate_semi_implicit() {
        let mut body = Body::new(Vec3::ZERO, props()).unwrap();
        body.apply_force(Vec3::new(20.0, 0.0, 0.0));
        body.integrate(0.5);

        // v = 10 * 0.5 = 5, then x = 5 * 0.5 (uses the updated velocity)
        assert!(body.velocity.approx_eq(Vec3::new(5.0, 0.0, 0.0), 1e-6));
        assert!(body.position.approx_eq(Vec3::new(2.5, 0.0, 0.0), 1e-6));
        assert_eq!(body.acceleration, Vec3::ZERO);
    }

    #[test]
    fn test_integrate_zero_force_is_linear_motion() {
        let mut body = Body::new(Vec3::new(1.0, 2.0, 3.0), props()).unwrap();
        body.velocity = Vec3::new(1.0, -1.0, 2.0);
        body.integrate(0.25);
        assert!(body.position.approx_eq(Vec3::new(1.25, 1.75, 3.5), 1e-6));
        assert_eq!(body.velocity, Vec3::new(1.0, -1.0, 2.0));
    }

    #[test]
    fn test_ground_friction_only_when_grounded() {
        let mut body = Body::new(Vec3::ZERO, props()).unwrap();
        body.velocity = Vec3::new(10.0, 3.0, -10.0);

        body.apply_ground_friction();
        assert_eq!(body.velocity, Vec3::new(10.0, 3.0, -10.0));

        body.grounded = true;
        body.apply_ground_friction();
        assert!(body.velocity.approx_eq(Vec3::new(9.0, 3.0, -9.0), 1e-5));
    }

    #[test]
    fn test_teleport_clears_motion() {
        let mut body = Body::new(Vec3::ZERO, props()).unwrap();
        body.velocity = Vec3::new(1.0, 1.0, 1.0);
        body.apply_force(Vec3::UP);
        body.teleport(Vec3::new(5.0, 1.0, 5.0));
        assert_eq!(body.position, Vec3::new(5.0, 1.0, 5.0));
        assert_eq!(body.velocity, Vec3::ZERO);
        assert_eq!(body.acceleration, Vec3::ZERO);
    }
}
