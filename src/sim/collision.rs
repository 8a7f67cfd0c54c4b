//! Collision detection and response for circular fruit
//!
//! Circle-vs-circle contacts, wall and floor response, and same-tier merge
//! adjudication. Mass is modelled as radius: on contact each fruit is pushed
//! by the other fruit's share of the summed radii, so larger fruit move less.

use glam::Vec2;

use super::state::{Body, BodyId, IdCounter, WorldGeometry};
use super::tiers::TierTable;
use crate::tuning::Tuning;

/// Overlap between two circles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit normal pointing from the first circle toward the second
    pub normal: Vec2,
    /// Overlap depth along the normal
    pub penetration: f32,
}

/// A merge performed by [`resolve_bodies`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Merge {
    /// Id of the newly created fruit
    pub id: BodyId,
    pub source_tier: usize,
    pub tier: usize,
    pub pos: Vec2,
}

/// Check two circles for overlap
///
/// Touching exactly (distance == sum of radii) is not a contact.
pub fn circle_contact(a_pos: Vec2, a_radius: f32, b_pos: Vec2, b_radius: f32) -> Option<Contact> {
    let delta = b_pos - a_pos;
    let dist_sq = delta.length_squared();
    let min_dist = a_radius + b_radius;
    if dist_sq >= min_dist * min_dist {
        return None;
    }

    let dist = dist_sq.sqrt();
    // Coincident centers: separate along +x
    let normal = if dist > f32::EPSILON {
        delta / dist
    } else {
        Vec2::X
    };
    Some(Contact {
        normal,
        penetration: min_dist - dist,
    })
}

/// Push two overlapping fruit apart and apply the contact impulse
///
/// Returns the relative velocity (`b - a`) measured before the impulse,
/// which is what merge adjudication looks at.
pub fn resolve_contact(a: &mut Body, b: &mut Body, contact: &Contact, restitution: f32) -> Vec2 {
    let total = a.radius + b.radius;
    let a_share = b.radius / total;
    let b_share = a.radius / total;

    a.pos -= contact.normal * contact.penetration * a_share;
    b.pos += contact.normal * contact.penetration * b_share;
    a.landed = true;
    b.landed = true;

    let rel_vel = b.vel - a.vel;
    let vel_along_normal = rel_vel.dot(contact.normal);
    if vel_along_normal < 0.0 {
        let j = -(1.0 + restitution) * vel_along_normal / (a_share + b_share);
        let impulse = contact.normal * j;
        a.vel -= impulse * a_share;
        b.vel += impulse * b_share;
    }

    rel_vel
}

/// Clamp a fruit inside the walls, reversing and damping horizontal speed
pub fn resolve_walls(body: &mut Body, geometry: &WorldGeometry, restitution: f32) -> bool {
    let mut hit = false;
    if body.pos.x - body.radius < geometry.left_wall_x {
        body.pos.x = geometry.left_wall_x + body.radius;
        body.vel.x *= -restitution;
        hit = true;
    }
    if body.pos.x + body.radius > geometry.right_wall_x {
        body.pos.x = geometry.right_wall_x - body.radius;
        body.vel.x *= -restitution;
        hit = true;
    }
    hit
}

/// Clamp a fruit above the floor; bounce vertically and apply landing friction
pub fn resolve_floor(
    body: &mut Body,
    geometry: &WorldGeometry,
    restitution: f32,
    friction: f32,
) -> bool {
    if body.pos.y + body.radius > geometry.ground_y {
        body.pos.y = geometry.ground_y - body.radius;
        body.vel.y *= -restitution;
        body.vel.x *= friction;
        body.landed = true;
        return true;
    }
    false
}

/// Whether two touching fruit combine
pub fn can_merge(a: &Body, b: &Body, rel_vel: Vec2, tiers: &TierTable, tuning: &Tuning) -> bool {
    if a.is_merge_locked() || b.is_merge_locked() || a.tier != b.tier {
        return false;
    }
    if a.tier >= tiers.top() && !tuning.allow_top_tier_merge {
        return false;
    }
    rel_vel.length() < tuning.merge_max_rel_speed
}

/// Build the fruit that replaces `a` and `b`
pub fn merge_bodies(a: &Body, b: &Body, id: BodyId, tiers: &TierTable, tuning: &Tuning) -> Body {
    let tier = tiers.merged(a.tier);
    let total = a.radius + b.radius;
    Body {
        id,
        tier,
        pos: (a.pos * a.radius + b.pos * b.radius) / total,
        vel: (a.vel + b.vel) * tuning.merge_velocity_factor,
        radius: tiers.get(tier).radius,
        merge_lock: tuning.merge_lock_steps,
        visual_scale: tuning.merge_pop_scale,
        landed: true,
    }
}

/// Resolve every overlapping pair once, merging where allowed
///
/// Merged-away fruit are marked and skipped for the rest of the pass, then
/// compacted out at the end, so removal never shifts pending pairs. The
/// merged fruit takes the first source's slot.
pub fn resolve_bodies(
    bodies: &mut Vec<Body>,
    tiers: &TierTable,
    tuning: &Tuning,
    ids: &mut IdCounter,
) -> Vec<Merge> {
    let count = bodies.len();
    let mut removed = vec![false; count];
    let mut merges = Vec::new();

    for i in 0..count {
        if removed[i] {
            continue;
        }
        for j in (i + 1)..count {
            if removed[j] {
                continue;
            }
            let (head, tail) = bodies.split_at_mut(j);
            let a = &mut head[i];
            let b = &mut tail[0];

            let Some(contact) = circle_contact(a.pos, a.radius, b.pos, b.radius) else {
                continue;
            };
            let rel_vel = resolve_contact(a, b, &contact, tuning.contact_restitution);

            if can_merge(a, b, rel_vel, tiers, tuning) {
                let merged = merge_bodies(a, b, ids.next_id(), tiers, tuning);
                merges.push(Merge {
                    id: merged.id,
                    source_tier: a.tier,
                    tier: merged.tier,
                    pos: merged.pos,
                });
                *a = merged;
                removed[j] = true;
            }
        }
    }

    if !merges.is_empty() {
        let mut index = 0;
        bodies.retain(|_| {
            let keep = !removed[index];
            index += 1;
            keep
        });
    }
    merges
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn body(id: BodyId, tier: usize, x: f32, y: f32) -> Body {
        let tiers = TierTable::classic();
        Body::new(id, tier, tiers.get(tier).radius, Vec2::new(x, y))
    }

    fn setup() -> (TierTable, Tuning, IdCounter) {
        (TierTable::classic(), Tuning::default(), IdCounter::starting_after(100))
    }

    #[test]
    fn test_circle_contact_overlap_and_miss() {
        let hit = circle_contact(Vec2::ZERO, 10.0, Vec2::new(15.0, 0.0), 10.0).unwrap();
        assert!((hit.normal - Vec2::X).length() < 1e-6);
        assert!((hit.penetration - 5.0).abs() < 1e-6);

        // Exactly touching is not overlap
        assert!(circle_contact(Vec2::ZERO, 10.0, Vec2::new(20.0, 0.0), 10.0).is_none());
        assert!(circle_contact(Vec2::ZERO, 10.0, Vec2::new(0.0, 30.0), 10.0).is_none());
    }

    #[test]
    fn test_coincident_centers_still_separate() {
        let contact = circle_contact(Vec2::ONE, 5.0, Vec2::ONE, 5.0).unwrap();
        assert_eq!(contact.normal, Vec2::X);
        assert!((contact.penetration - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_larger_body_moves_less() {
        let mut small = body(1, 0, 100.0, 100.0);
        let mut large = body(2, 9, 200.0, 100.0);
        let contact = circle_contact(small.pos, small.radius, large.pos, large.radius).unwrap();
        resolve_contact(&mut small, &mut large, &contact, 0.15);

        let small_moved = (small.pos.x - 100.0).abs();
        let large_moved = (large.pos.x - 200.0).abs();
        assert!(small_moved > large_moved);
        // Fully de-penetrated
        assert!((large.pos.x - small.pos.x - (small.radius + large.radius)).abs() < 1e-3);
        assert!(small.landed && large.landed);
    }

    #[test]
    fn test_impulse_only_when_approaching() {
        let mut a = body(1, 2, 100.0, 100.0);
        let mut b = body(2, 2, 150.0, 100.0);
        a.vel = Vec2::new(100.0, 0.0);
        let contact = circle_contact(a.pos, a.radius, b.pos, b.radius).unwrap();
        let rel = resolve_contact(&mut a, &mut b, &contact, 0.15);
        assert_eq!(rel, Vec2::new(-100.0, 0.0));
        assert!(a.vel.x < 100.0);
        assert!(b.vel.x > 0.0);

        // Separating pair: velocities untouched
        let mut a = body(1, 2, 100.0, 100.0);
        let mut b = body(2, 2, 150.0, 100.0);
        a.vel = Vec2::new(-50.0, 0.0);
        let contact = circle_contact(a.pos, a.radius, b.pos, b.radius).unwrap();
        resolve_contact(&mut a, &mut b, &contact, 0.15);
        assert_eq!(a.vel, Vec2::new(-50.0, 0.0));
        assert_eq!(b.vel, Vec2::ZERO);
    }

    #[test]
    fn test_wall_bounce_damps() {
        let geometry = WorldGeometry::default();
        let mut b = body(1, 0, geometry.left_wall_x + 5.0, 500.0);
        b.vel = Vec2::new(-200.0, 0.0);
        assert!(resolve_walls(&mut b, &geometry, 0.35));
        assert_eq!(b.pos.x, geometry.left_wall_x + b.radius);
        assert!((b.vel.x - 70.0).abs() < 1e-4);

        let mut b = body(2, 0, geometry.right_wall_x - 5.0, 500.0);
        b.vel = Vec2::new(300.0, 0.0);
        assert!(resolve_walls(&mut b, &geometry, 0.35));
        assert_eq!(b.pos.x, geometry.right_wall_x - b.radius);
        assert!((b.vel.x + 105.0).abs() < 1e-4);
    }

    #[test]
    fn test_floor_bounce_damps_and_rubs() {
        let geometry = WorldGeometry::default();
        let mut b = body(1, 0, 300.0, geometry.ground_y);
        b.vel = Vec2::new(100.0, 400.0);
        assert!(resolve_floor(&mut b, &geometry, 0.25, 0.98));
        assert_eq!(b.pos.y, geometry.ground_y - b.radius);
        assert!((b.vel.y + 100.0).abs() < 1e-4);
        assert!((b.vel.x - 98.0).abs() < 1e-4);
        assert!(b.landed);

        let mut airborne = body(2, 0, 300.0, 300.0);
        assert!(!resolve_floor(&mut airborne, &geometry, 0.25, 0.98));
        assert!(!airborne.landed);
    }

    #[test]
    fn test_same_tier_slow_pair_merges() {
        let (tiers, tuning, mut ids) = setup();
        let mut bodies = vec![body(1, 0, 100.0, 500.0), body(2, 0, 130.0, 500.0)];
        let merges = resolve_bodies(&mut bodies, &tiers, &tuning, &mut ids);

        assert_eq!(merges.len(), 1);
        assert_eq!(bodies.len(), 1);
        let merged = &bodies[0];
        assert_eq!(merged.tier, 1);
        assert_eq!(merged.radius, 26.0);
        assert!(merged.is_merge_locked());
        assert!(merged.landed);
        assert_eq!(merged.visual_scale, 1.15);
        assert_eq!(merged.id, 101);
        assert!((merged.pos - Vec2::new(115.0, 500.0)).length() < 1e-3);
    }

    #[test]
    fn test_fast_pair_bounces_instead() {
        let (tiers, tuning, mut ids) = setup();
        let mut a = body(1, 0, 100.0, 500.0);
        let b = body(2, 0, 130.0, 500.0);
        a.vel = Vec2::new(400.0, 0.0);
        let mut bodies = vec![a, b];
        let merges = resolve_bodies(&mut bodies, &tiers, &tuning, &mut ids);
        assert!(merges.is_empty());
        assert_eq!(bodies.len(), 2);
    }

    #[test]
    fn test_different_tiers_never_merge() {
        let (tiers, tuning, mut ids) = setup();
        let mut bodies = vec![body(1, 0, 100.0, 500.0), body(2, 1, 130.0, 500.0)];
        assert!(resolve_bodies(&mut bodies, &tiers, &tuning, &mut ids).is_empty());
        assert_eq!(bodies.len(), 2);
    }

    #[test]
    fn test_locked_body_never_merges() {
        let (tiers, tuning, mut ids) = setup();
        let mut locked = body(1, 0, 100.0, 500.0);
        locked.merge_lock = 3;
        let mut bodies = vec![locked, body(2, 0, 130.0, 500.0)];
        assert!(resolve_bodies(&mut bodies, &tiers, &tuning, &mut ids).is_empty());
        assert_eq!(bodies.len(), 2);
    }

    #[test]
    fn test_merged_body_cannot_merge_again_same_pass() {
        let (tiers, tuning, mut ids) = setup();
        // Two cherries merge into a plum which overlaps a third plum
        let mut bodies = vec![
            body(1, 0, 100.0, 500.0),
            body(2, 0, 130.0, 500.0),
            body(3, 1, 150.0, 500.0),
        ];
        let merges = resolve_bodies(&mut bodies, &tiers, &tuning, &mut ids);
        assert_eq!(merges.len(), 1);
        assert_eq!(bodies.len(), 2);
        assert!(bodies.iter().all(|b| b.tier == 1));
    }

    #[test]
    fn test_merged_away_body_is_inert() {
        let (tiers, tuning, mut ids) = setup();
        // The apple only overlaps the second cherry, which is merged away first
        let mut bodies = vec![
            body(1, 0, 100.0, 500.0),
            body(2, 0, 130.0, 500.0),
            body(3, 3, 185.0, 500.0),
        ];
        resolve_bodies(&mut bodies, &tiers, &tuning, &mut ids);
        let apple = bodies.iter().find(|b| b.id == 3).unwrap();
        assert_eq!(apple.pos, Vec2::new(185.0, 500.0));
        assert_eq!(apple.vel, Vec2::ZERO);
    }

    #[test]
    fn test_top_tier_merge_configurable() {
        let (tiers, tuning, mut ids) = setup();
        let top = tiers.top();
        let mut bodies = vec![body(1, top, 200.0, 500.0), body(2, top, 300.0, 500.0)];
        let merges = resolve_bodies(&mut bodies, &tiers, &tuning, &mut ids);
        assert_eq!(merges.len(), 1);
        assert_eq!(bodies[0].tier, top);

        let strict = Tuning {
            allow_top_tier_merge: false,
            ..Default::default()
        };
        let mut bodies = vec![body(1, top, 200.0, 500.0), body(2, top, 300.0, 500.0)];
        assert!(resolve_bodies(&mut bodies, &tiers, &strict, &mut ids).is_empty());
        assert_eq!(bodies.len(), 2);
    }

    proptest! {
        #[test]
        fn prop_slow_same_tier_overlap_merges_once(
            tier in 0usize..10,
            gap in 0.05f32..0.95,
            angle in 0.0f32..std::f32::consts::TAU,
            vx in -100.0f32..100.0,
            vy in -100.0f32..100.0,
        ) {
            let (tiers, tuning, mut ids) = setup();
            let radius = tiers.get(tier).radius;
            let offset = Vec2::from_angle(angle) * (2.0 * radius * gap);
            let mut a = body(1, tier, 360.0, 600.0);
            let mut b = body(2, tier, 360.0 + offset.x, 600.0 + offset.y);
            a.vel = Vec2::new(vx, vy);
            b.vel = Vec2::new(vy, vx);
            let mut bodies = vec![a, b];

            let merges = resolve_bodies(&mut bodies, &tiers, &tuning, &mut ids);
            prop_assert_eq!(merges.len(), 1);
            prop_assert_eq!(bodies.len(), 1);
            prop_assert_eq!(bodies[0].tier, tiers.merged(tier));
        }

        #[test]
        fn prop_bounce_never_gains_speed(vx in 1.0f32..2000.0, vy in 1.0f32..3000.0) {
            let geometry = WorldGeometry::default();
            let mut b = body(1, 0, geometry.right_wall_x, geometry.ground_y);
            b.vel = Vec2::new(vx, vy);
            resolve_walls(&mut b, &geometry, 0.35);
            resolve_floor(&mut b, &geometry, 0.25, 0.98);
            prop_assert!(b.vel.x.abs() < vx);
            prop_assert!(b.vel.y.abs() < vy);
        }
    }
}
