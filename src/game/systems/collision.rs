use serde::{Deserialize, Serialize};

use crate::game::ball::Ball;
use crate::game::body::Body;
use crate::util::vec3::Vec3;

/// How overlapping bodies are pushed apart before the impulse
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeparationMode {
    /// Each body moves half the overlap regardless of mass
    #[default]
    EqualSplit,
    /// Lighter bodies move further (inverse-mass share)
    MassWeighted,
}

/// Result of one resolved overlap
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit vector from the second body towards the first
    pub normal: Vec3,
    pub penetration: f32,
    /// Impulse magnitude along the normal (0 when already separating)
    pub impulse: f32,
}

/// Keep a body on or above the ground plane
///
/// Returns true when the body came to rest on this call (bounce below
/// `rest_threshold`). A body entirely above the ground loses its grounded flag.
pub fn resolve_ground(body: &mut Body, ground_level: f32, rest_threshold: f32) -> bool {
    let floor = ground_level + body.radius();

    if body.position.y > floor {
        body.grounded = false;
        return false;
    }

    body.position.y = floor;
    if body.velocity.y < 0.0 {
        body.velocity.y = -body.velocity.y * body.restitution();
        if body.velocity.y.abs() < rest_threshold {
            body.velocity.y = 0.0;
            body.grounded = true;
            return true;
        }
    }
    false
}

/// Separate two overlapping spheres and exchange a normal impulse
pub fn resolve_pair(a: &mut Body, b: &mut Body, mode: SeparationMode) -> Option<Contact> {
    let delta = a.position - b.position;
    let distance = delta.length();
    let min_distance = a.radius() + b.radius();

    // Coincident centres have no usable normal
    if distance >= min_distance || distance == 0.0 {
        return None;
    }

    let normal = delta * (1.0 / distance);
    let overlap = min_distance - distance;

    let (share_a, share_b) = match mode {
        SeparationMode::EqualSplit => (0.5, 0.5),
        SeparationMode::MassWeighted => {
            let total = a.inverse_mass() + b.inverse_mass();
            (a.inverse_mass() / total, b.inverse_mass() / total)
        }
    };
    a.position += normal * (overlap * share_a);
    b.position -= normal * (overlap * share_b);

    let velocity_along_normal = (a.velocity - b.velocity).dot(normal);
    if velocity_along_normal >= 0.0 {
        return Some(Contact {
            normal,
            penetration: overlap,
            impulse: 0.0,
        });
    }

    let restitution = a.restitution().min(b.restitution());
    let impulse = -(1.0 + restitution) * velocity_along_normal / (a.inverse_mass() + b.inverse_mass());

    a.velocity += normal * (impulse * a.inverse_mass());
    b.velocity -= normal * (impulse * b.inverse_mass());

    Some(Contact {
        normal,
        penetration: overlap,
        impulse,
    })
}

/// Resolve every unordered pair once, in index order
///
/// O(n²); fine for 23 bodies.
pub fn resolve_contacts(bodies: &mut [&mut Body], mode: SeparationMode) -> usize {
    let mut contacts = 0;
    for i in 0..bodies.len() {
        let (head, tail) = bodies.split_at_mut(i + 1);
        let a = &mut *head[i];
        for b in tail.iter_mut() {
            if resolve_pair(a, b, mode).is_some() {
                contacts += 1;
            }
        }
    }
    contacts
}

/// Future ball positions, simulated on a copy
///
/// Stops before the first sample that reaches the ground.
pub fn predict_trajectory(ball: &Ball, gravity: f32, ground_level: f32, steps: usize, dt: f32) -> Vec<Vec3> {
    let mut ghost = ball.clone();
    let mut points = Vec::with_capacity(steps);

    for _ in 0..steps {
        let weight = Vec3::new(0.0, gravity * ghost.body.mass(), 0.0);
        ghost.body.apply_force(weight);
        ghost.update(dt);

        if ghost.body.position.y <= ground_level + ghost.body.radius() {
            break;
        }
        points.push(ghost.body.position);
    }

    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::body::BodyProps;
    use crate::game::constants::physics::GRAVITY;
    use crate::game::player::Player;
    use crate::game::systems::physics::{kinetic_energy, momentum};
    use proptest::prelude::*;

    fn player_body(x: f32, vx: f32) -> Body {
        let mut body = Body::new(Vec3::new(x, 0.3, 0.0), Player::props()).unwrap();
        body.velocity = Vec3::new(vx, 0.0, 0.0);
        body
    }

    #[test]
    fn test_ground_clamps_and_bounces() {
        let mut body = Body::new(Vec3::new(0.0, 0.05, 0.0), Ball::props()).unwrap();
        body.velocity.y = -5.0;

        let landed = resolve_ground(&mut body, 0.0, 0.3);

        assert!(!landed);
        assert_eq!(body.position.y, 0.11);
        assert!((body.velocity.y - 3.0).abs() < 1e-5);
        assert!(!body.grounded);
    }

    #[test]
    fn test_ground_small_bounce_rests() {
        let mut body = Body::new(Vec3::new(0.0, 0.2, 0.0), Player::props()).unwrap();
        body.velocity.y = -1.0;

        assert!(resolve_ground(&mut body, 0.0, 0.5));
        assert_eq!(body.velocity.y, 0.0);
        assert!(body.grounded);
    }

    #[test]
    fn test_airborne_clears_grounded() {
        let mut body = Body::new(Vec3::new(0.0, 3.0, 0.0), Player::props()).unwrap();
        body.grounded = true;
        assert!(!resolve_ground(&mut body, 0.0, 0.5));
        assert!(!body.grounded);
    }

    #[test]
    fn test_separated_bodies_untouched() {
        let mut a = player_body(0.0, 1.0);
        let mut b = player_body(1.0, -1.0);
        assert!(resolve_pair(&mut a, &mut b, SeparationMode::EqualSplit).is_none());
        assert_eq!(a.velocity.x, 1.0);
    }

    #[test]
    fn test_coincident_bodies_skipped() {
        let mut a = player_body(2.0, 1.0);
        let mut b = player_body(2.0, -1.0);
        assert!(resolve_pair(&mut a, &mut b, SeparationMode::EqualSplit).is_none());
        assert!(a.position.is_finite());
        assert_eq!(a.position, b.position);
    }

    #[test]
    fn test_head_on_equal_mass() {
        // Two players closing at 2 m/s each, overlapping by 0.1
        let mut a = player_body(0.0, 2.0);
        let mut b = player_body(0.5, -2.0);

        let contact = resolve_pair(&mut a, &mut b, SeparationMode::EqualSplit).unwrap();

        assert!((contact.penetration - 0.1).abs() < 1e-5);
        assert!(contact.normal.approx_eq(-Vec3::X, 1e-6));
        assert!((a.position.distance_to(b.position) - 0.6).abs() < 1e-5);

        // e = 0.1: relative speed 4 becomes 0.4 apart
        assert!((a.velocity.x + 0.2).abs() < 1e-4);
        assert!((b.velocity.x - 0.2).abs() < 1e-4);
    }

    #[test]
    fn test_separating_bodies_get_no_impulse() {
        let mut a = player_body(0.0, -1.0);
        let mut b = player_body(0.5, 1.0);
        let contact = resolve_pair(&mut a, &mut b, SeparationMode::EqualSplit).unwrap();
        assert_eq!(contact.impulse, 0.0);
        assert_eq!(a.velocity.x, -1.0);
        assert_eq!(b.velocity.x, 1.0);
    }

    #[test]
    fn test_mass_weighted_moves_lighter_body() {
        let mut player = player_body(0.0, 0.0);
        let mut ball = Body::new(Vec3::new(0.3, 0.3, 0.0), Ball::props()).unwrap();

        resolve_pair(&mut player, &mut ball, SeparationMode::MassWeighted).unwrap();

        let player_shift = player.position.x.abs();
        let ball_shift = (ball.position.x - 0.3).abs();
        assert!(ball_shift > player_shift * 100.0);
        assert!((player.position.distance_to(ball.position) - 0.41).abs() < 1e-4);
    }

    #[test]
    fn test_resolve_contacts_counts_pairs() {
        let mut a = player_body(0.0, 0.0);
        let mut b = player_body(0.5, 0.0);
        let mut c = player_body(20.0, 0.0);
        let mut bodies = vec![&mut a, &mut b, &mut c];

        assert_eq!(resolve_contacts(&mut bodies, SeparationMode::EqualSplit), 1);
    }

    #[test]
    fn test_trajectory_does_not_mutate_ball() {
        let mut ball = Ball::new(Vec3::new(0.0, 2.0, 0.0));
        ball.body.velocity = Vec3::new(10.0, 5.0, 0.0);
        let before = ball.clone();

        let points = predict_trajectory(&ball, GRAVITY, 0.0, 60, 0.016);

        assert_eq!(ball, before);
        assert!(!points.is_empty());
        assert!(points.iter().all(|p| p.y > 0.11));
        assert!(points.windows(2).all(|w| w[1].x > w[0].x));
    }

    #[test]
    fn test_trajectory_stops_at_ground() {
        let ball = Ball::new(Vec3::new(0.0, 0.111, 0.0));
        let points = predict_trajectory(&ball, GRAVITY, 0.0, 60, 0.016);
        assert!(points.is_empty());

        let mut lob = Ball::new(Vec3::new(0.0, 1.0, 0.0));
        lob.body.velocity = Vec3::new(5.0, 20.0, 0.0);
        assert_eq!(predict_trajectory(&lob, GRAVITY, 0.0, 60, 0.016).len(), 60);
    }

    fn arb_props() -> impl Strategy<Value = BodyProps> {
        (0.1f32..100.0, 0.05f32..1.0, 0.0f32..=1.0).prop_map(|(mass, radius, restitution)| BodyProps {
            mass,
            radius,
            restitution,
            friction: 0.98,
        })
    }

    proptest! {
        #[test]
        fn prop_ground_invariant(y in -5.0f32..5.0, vy in -20.0f32..20.0, props in arb_props()) {
            let mut body = Body::new(Vec3::new(0.0, y, 0.0), props).unwrap();
            body.velocity.y = vy;
            resolve_ground(&mut body, 0.0, 0.3);
            prop_assert!(body.position.y >= body.radius() - 1e-6);
            if body.grounded {
                prop_assert_eq!(body.velocity.y, 0.0);
            }
        }

        #[test]
        fn prop_pair_conserves_momentum(
            pa in arb_props(),
            pb in arb_props(),
            gap in 0.01f32..0.9,
            va in -10.0f32..10.0,
            vb in -10.0f32..10.0,
        ) {
            let mut a = Body::new(Vec3::ZERO, pa).unwrap();
            let overlap_distance = (a.radius() + pb.radius) * gap;
            let mut b = Body::new(Vec3::new(overlap_distance, 0.0, 0.0), pb).unwrap();
            a.velocity = Vec3::new(va, 0.0, 0.0);
            b.velocity = Vec3::new(vb, 0.0, 0.0);

            let before = momentum(a.mass(), a.velocity) + momentum(b.mass(), b.velocity);
            let energy_before = kinetic_energy(a.mass(), a.velocity) + kinetic_energy(b.mass(), b.velocity);

            resolve_pair(&mut a, &mut b, SeparationMode::EqualSplit);

            let after = momentum(a.mass(), a.velocity) + momentum(b.mass(), b.velocity);
            let energy_after = kinetic_energy(a.mass(), a.velocity) + kinetic_energy(b.mass(), b.velocity);

            let scale = 1.0 + before.length();
            prop_assert!((after - before).length() <= 1e-3 * scale);
            prop_assert!(energy_after <= energy_before * (1.0 + 1e-4) + 1e-3);
        }

        #[test]
        fn prop_elastic_equal_masses_keep_energy(
            mass in 0.5f32..100.0,
            radius in 0.1f32..1.0,
            gap in 0.01f32..0.9,
            va in -10.0f32..10.0,
            vb in -10.0f32..10.0,
        ) {
            let props = BodyProps { mass, radius, restitution: 1.0, friction: 0.98 };
            let mut a = Body::new(Vec3::ZERO, props).unwrap();
            let mut b = Body::new(Vec3::new(2.0 * radius * gap, 0.0, 0.0), props).unwrap();
            a.velocity = Vec3::new(va, 0.0, 0.0);
            b.velocity = Vec3::new(vb, 0.0, 0.0);

            let energy_before = kinetic_energy(a.mass(), a.velocity) + kinetic_energy(b.mass(), b.velocity);
            resolve_pair(&mut a, &mut b, SeparationMode::EqualSplit);
            let energy_after = kinetic_energy(a.mass(), a.velocity) + kinetic_energy(b.mass(), b.velocity);

            prop_assert!((energy_after - energy_before).abs() <= 1e-4 * (1.0 + energy_before));
            if va > vb {
                // Head-on elastic contact between equal masses swaps velocities
                prop_assert!((a.velocity.x - vb).abs() < 1e-3);
                prop_assert!((b.velocity.x - va).abs() < 1e-3);
            }
        }

        #[test]
        fn prop_pair_never_produces_nan(
            x in -1.0f32..1.0,
            z in -1.0f32..1.0,
            mode in prop_oneof![Just(SeparationMode::EqualSplit), Just(SeparationMode::MassWeighted)],
        ) {
            let mut a = Body::new(Vec3::ZERO, Player::props()).unwrap();
            let mut b = Body::new(Vec3::new(x, 0.0, z), Ball::props()).unwrap();
            resolve_pair(&mut a, &mut b, mode);
            prop_assert!(a.position.is_finite() && b.position.is_finite());
            prop_assert!(a.velocity.is_finite() && b.velocity.is_finite());
        }
    }
}
