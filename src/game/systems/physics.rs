use crate::game::body::Body;
use crate::game::field::Field;
use crate::util::vec3::Vec3;

/// Add the body's weight to its accumulated forces
#[inline]
pub fn apply_gravity(body: &mut Body, gravity: f32) {
    body.apply_force(Vec3::new(0.0, gravity * body.mass(), 0.0));
}

/// Keep a body `buffer` inside the pitch lines
///
/// The clamped axis loses only its outward velocity, so a player pinned to
/// the touchline can still run back infield.
pub fn clamp_to_field(body: &mut Body, field: &Field, buffer: f32) -> bool {
    let (clamped, hit) = field.clamp_inside(body.position, buffer);
    if hit == [0, 0] {
        return false;
    }

    body.position = clamped;
    match hit[0] {
        -1 => body.velocity.x = body.velocity.x.max(0.0),
        1 => body.velocity.x = body.velocity.x.min(0.0),
        _ => {}
    }
    match hit[1] {
        -1 => body.velocity.z = body.velocity.z.max(0.0),
        1 => body.velocity.z = body.velocity.z.min(0.0),
        _ => {}
    }
    true
}

/// Calculate kinetic energy for a body
pub fn kinetic_energy(mass: f32, velocity: Vec3) -> f32 {
    0.5 * mass * velocity.length_sq()
}

/// Calculate momentum for a body
pub fn momentum(mass: f32, velocity: Vec3) -> Vec3 {
    velocity * mass
}

/// Calculate momentum magnitude
pub fn momentum_magnitude(mass: f32, velocity: Vec3) -> f32 {
    mass * velocity.length()
}

/// Total kinetic energy of a set of bodies
pub fn total_kinetic_energy<'a>(bodies: impl IntoIterator<Item = &'a Body>) -> f32 {
    bodies
        .into_iter()
        .map(|b| kinetic_energy(b.mass(), b.velocity))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::ball::Ball;
    use crate::game::constants::physics::{DT, GRAVITY};
    use crate::game::player::Player;
    use proptest::prelude::*;

    fn create_test_body() -> Body {
        Body::new(Vec3::new(0.0, 5.0, 0.0), Player::props()).unwrap()
    }

    #[test]
    fn test_gravity_one_tick() {
        let mut body = create_test_body();
        apply_gravity(&mut body, GRAVITY);
        body.integrate(DT);

        assert!((body.velocity.y - GRAVITY * DT).abs() < 1e-6);
        assert!((body.position.y - (5.0 + GRAVITY * DT * DT)).abs() < 1e-6);
    }

    #[test]
    fn test_gravity_is_mass_independent() {
        let mut player = create_test_body();
        let mut ball = Body::new(Vec3::new(0.0, 5.0, 0.0), Ball::props()).unwrap();
        apply_gravity(&mut player, GRAVITY);
        apply_gravity(&mut ball, GRAVITY);
        assert!(player.acceleration.approx_eq(ball.acceleration, 1e-5));
    }

    #[test]
    fn test_clamp_to_field_zeroes_outward_velocity() {
        let field = Field::default();
        let mut body = create_test_body();
        body.position = Vec3::new(52.0, 0.3, 0.0);
        body.velocity = Vec3::new(4.0, 0.0, -2.0);

        assert!(clamp_to_field(&mut body, &field, 1.0));
        assert_eq!(body.position.x, 51.5);
        assert_eq!(body.velocity, Vec3::new(0.0, 0.0, -2.0));
    }

    #[test]
    fn test_clamp_keeps_inward_velocity() {
        let field = Field::default();
        let mut body = create_test_body();
        body.position = Vec3::new(0.0, 0.3, -33.5);
        body.velocity = Vec3::new(0.0, 0.0, 3.0);

        assert!(clamp_to_field(&mut body, &field, 1.0));
        assert_eq!(body.position.z, -33.0);
        assert_eq!(body.velocity.z, 3.0);
    }

    #[test]
    fn test_clamp_inside_is_noop() {
        let field = Field::default();
        let mut body = create_test_body();
        body.velocity = Vec3::new(1.0, 0.0, 1.0);
        assert!(!clamp_to_field(&mut body, &field, 1.0));
        assert_eq!(body.velocity, Vec3::new(1.0, 0.0, 1.0));
    }

    #[test]
    fn test_kinetic_energy() {
        let ke = kinetic_energy(100.0, Vec3::new(10.0, 0.0, 0.0));
        // KE = 0.5 * m * v^2 = 0.5 * 100 * 100 = 5000
        assert!((ke - 5000.0).abs() < 0.001);
    }

    #[test]
    fn test_momentum() {
        let p = momentum(100.0, Vec3::new(10.0, 5.0, -1.0));
        assert!(p.approx_eq(Vec3::new(1000.0, 500.0, -100.0), 1e-3));
        assert!((momentum_magnitude(2.0, Vec3::new(3.0, 4.0, 0.0)) - 10.0).abs() < 1e-5);
    }

    #[test]
    fn test_total_kinetic_energy() {
        let mut a = create_test_body();
        let mut b = create_test_body();
        a.velocity = Vec3::X;
        b.velocity = Vec3::Z;
        assert!((total_kinetic_energy([&a, &b]) - 75.0).abs() < 1e-4);
    }

    #[test]
    fn test_physics_determinism() {
        let mut a = create_test_body();
        let mut b = create_test_body();
        a.velocity = Vec3::new(5.0, 2.0, -1.0);
        b.velocity = Vec3::new(5.0, 2.0, -1.0);

        for _ in 0..100 {
            apply_gravity(&mut a, GRAVITY);
            apply_gravity(&mut b, GRAVITY);
            a.integrate(DT);
            b.integrate(DT);
        }

        assert_eq!(a.position, b.position);
        assert_eq!(a.velocity, b.velocity);
    }

    proptest! {
        #[test]
        fn prop_zero_force_moves_linearly(
            x in -50.0f32..50.0,
            vx in -20.0f32..20.0,
            vz in -20.0f32..20.0,
            dt in 0.001f32..0.1,
        ) {
            let mut body = create_test_body();
            body.position.x = x;
            body.velocity = Vec3::new(vx, 0.0, vz);
            body.integrate(dt);
            prop_assert!((body.position.x - (x + vx * dt)).abs() < 1e-3);
            prop_assert!((body.position.z - vz * dt).abs() < 1e-3);
            prop_assert_eq!(body.velocity, Vec3::new(vx, 0.0, vz));
        }
    }
}
