use glam::Vec3;

use crate::ecs::components::{
    Affection, Behavior, BehaviorState, Position, SocialLink, SoftBody, Velocity,
};
use crate::spatial::FenSnapshot;

/// Wool spring constants — tuned for a slow, plush wobble.
const WOOL_STIFFNESS: f32 = 25.0;
const WOOL_DAMPING: f32 = 4.0;
/// Squash/stretch approach rate toward the per-state target.
const SQUASH_LERP: f32 = 6.0;
/// Yaw blend rates, fastest wins the priority ladder:
/// explicit look target > movement heading > ambient attention.
/// The ordering avoids facing flicker when several cues disagree.
const LOOK_TURN: f32 = 6.0;
const HEAD_TURN: f32 = 4.0;
const AMBIENT_TURN: f32 = 1.5;
/// Heading only drives yaw above this planar speed.
const HEADING_MIN_SPEED: f32 = 0.15;
/// Footfall bob frequency per unit of travel speed.
const GAIT_FREQ: f32 = 5.5;
const FOOTFALL_GAIN: f32 = 0.06;

/// Drive the soft-body presentation from the state machine's outputs:
/// wool spring, squash/stretch, breathing, and yaw blending.
pub fn update(world: &mut hecs::World, dt: f32, snapshots: &[FenSnapshot]) {
    for (_, (behavior, soft, vel, pos, affection, link)) in world.query_mut::<(
        &Behavior,
        &mut SoftBody,
        &Velocity,
        &Position,
        &Affection,
        &SocialLink,
    )>() {
        // --- Squash/stretch target per state ---
        soft.squash_target = squash_for(behavior, affection);
        soft.squash += (soft.squash_target - soft.squash) * (SQUASH_LERP * dt).min(1.0);

        // --- Breathing ---
        let breath_scale = match behavior.state {
            BehaviorState::Sleeping => 0.5,
            BehaviorState::Resting => 0.75,
            BehaviorState::Fleeing => 2.2,
            BehaviorState::Bliss => 0.8,
            _ => 1.0,
        };
        soft.breath_phase += soft.breath_rate * breath_scale * dt;

        // --- Footfall bob feeds the wool spring ---
        let planar_speed = Vec3::new(vel.0.x, 0.0, vel.0.z).length();
        if planar_speed > HEADING_MIN_SPEED {
            soft.gait_phase += planar_speed * GAIT_FREQ * dt;
            soft.wool_vel += soft.gait_phase.sin() * planar_speed * FOOTFALL_GAIN;
        }

        // --- Wool spring ---
        let accel = -WOOL_STIFFNESS * soft.wool_offset - WOOL_DAMPING * soft.wool_vel;
        soft.wool_vel += accel * dt;
        soft.wool_offset += soft.wool_vel * dt;

        // --- Yaw priority ladder ---
        let desired = if let Some(look) = soft.look_target {
            Some((yaw_toward(pos.0, look), LOOK_TURN))
        } else if planar_speed > HEADING_MIN_SPEED {
            Some((vel.0.x.atan2(vel.0.z), HEAD_TURN))
        } else if let Some(attention) = link.0.and_then(|e| snapshot_pos(snapshots, e)) {
            Some((yaw_toward(pos.0, attention), AMBIENT_TURN))
        } else {
            None
        };
        if let Some((target_yaw, rate)) = desired {
            soft.yaw += wrap_angle(target_yaw - soft.yaw) * (rate * dt).min(1.0);
            soft.yaw = wrap_angle(soft.yaw);
        }

        // Bliss adds a dreamy sway on top of whatever yaw settled on.
        if behavior.state == BehaviorState::Bliss {
            soft.yaw += (behavior.timer * 1.8).sin() * 0.4 * dt;
        }
    }
}

fn squash_for(behavior: &Behavior, affection: &Affection) -> Vec3 {
    match behavior.state {
        BehaviorState::Grazing => {
            // Head-down graze compresses the body with a slow chew bob.
            let bob = (behavior.timer * 3.0).sin() * 0.03;
            Vec3::new(1.05, 0.85 + bob, 1.05)
        }
        BehaviorState::Stretching => match behavior.variant {
            0 => Vec3::new(1.15, 1.10, 0.90),
            1 => Vec3::new(0.90, 1.25, 0.90),
            _ => Vec3::new(1.20, 0.90, 1.05),
        },
        BehaviorState::Resting => Vec3::new(1.10, 0.80, 1.10),
        BehaviorState::Sleeping => Vec3::new(1.12, 0.75, 1.12),
        BehaviorState::Petted => {
            let wiggle = (behavior.timer * 9.0).sin() * affection.happiness;
            Vec3::new(1.0 + wiggle * 0.08, 1.0 - wiggle * 0.06, 1.0 + wiggle * 0.08)
        }
        BehaviorState::Bliss => {
            let sway = (behavior.timer * 2.0).sin();
            Vec3::new(1.0 + sway * 0.05, 1.05, 1.0 - sway * 0.05)
        }
        BehaviorState::Fleeing => Vec3::new(0.92, 1.05, 0.92),
        _ => Vec3::ONE,
    }
}

fn yaw_toward(from: Vec3, to: Vec3) -> f32 {
    (to.x - from.x).atan2(to.z - from.z)
}

/// Wrap an angle into (-PI, PI].
pub fn wrap_angle(a: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    let a = (a + PI).rem_euclid(TAU) - PI;
    if a <= -PI {
        a + TAU
    } else {
        a
    }
}

fn snapshot_pos(snapshots: &[FenSnapshot], entity: hecs::Entity) -> Option<Vec3> {
    snapshots.iter().find(|s| s.entity == entity).map(|s| s.pos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::MoveTarget;

    fn body(world: &mut hecs::World, state: BehaviorState) -> hecs::Entity {
        let mut behavior = Behavior::new();
        behavior.enter(state, 100.0);
        world.spawn((
            Position(Vec3::ZERO),
            Velocity(Vec3::ZERO),
            MoveTarget::default(),
            behavior,
            Affection::new(),
            SocialLink::default(),
            SoftBody::new(0.0, 1.6, 0.0),
        ))
    }

    #[test]
    fn wool_spring_settles_after_impulse() {
        let mut world = hecs::World::new();
        let e = body(&mut world, BehaviorState::Idle);
        world.get::<&mut SoftBody>(e).unwrap().wool_vel = 5.0;

        for _ in 0..600 {
            update(&mut world, 1.0 / 60.0, &[]);
        }
        let soft = world.get::<&SoftBody>(e).unwrap();
        assert!(soft.wool_offset.abs() < 0.01);
        assert!(soft.wool_vel.abs() < 0.01);
    }

    #[test]
    fn grazing_compresses_vertical_scale() {
        let mut world = hecs::World::new();
        let e = body(&mut world, BehaviorState::Grazing);
        for _ in 0..60 {
            update(&mut world, 1.0 / 60.0, &[]);
            world.get::<&mut Behavior>(e).unwrap().timer += 1.0 / 60.0;
        }
        let soft = world.get::<&SoftBody>(e).unwrap();
        assert!(soft.squash.y < 0.95);
        assert!(soft.squash.x > 1.0);
    }

    #[test]
    fn look_target_wins_over_heading() {
        let mut world = hecs::World::new();
        let e = body(&mut world, BehaviorState::Looking);
        {
            let mut soft = world.get::<&mut SoftBody>(e).unwrap();
            soft.look_target = Some(Vec3::new(5.0, 0.0, 0.0)); // +X, yaw = PI/2
        }
        // Moving along -Z, which would otherwise pull yaw to PI.
        world.get::<&mut Velocity>(e).unwrap().0 = Vec3::new(0.0, 0.0, -1.0);

        for _ in 0..240 {
            update(&mut world, 1.0 / 60.0, &[]);
        }
        let yaw = world.get::<&SoftBody>(e).unwrap().yaw;
        assert!(
            (yaw - std::f32::consts::FRAC_PI_2).abs() < 0.1,
            "yaw settled at {yaw}"
        );
    }

    #[test]
    fn heading_drives_yaw_when_no_look_target() {
        let mut world = hecs::World::new();
        let e = body(&mut world, BehaviorState::Idle);
        world.get::<&mut Velocity>(e).unwrap().0 = Vec3::new(1.0, 0.0, 0.0);

        for _ in 0..240 {
            update(&mut world, 1.0 / 60.0, &[]);
        }
        let yaw = world.get::<&SoftBody>(e).unwrap().yaw;
        assert!((yaw - std::f32::consts::FRAC_PI_2).abs() < 0.1);
    }

    #[test]
    fn wrap_angle_stays_in_range() {
        for i in -20..20 {
            let a = i as f32 * 1.3;
            let w = wrap_angle(a);
            assert!(w > -std::f32::consts::PI - 1e-5);
            assert!(w <= std::f32::consts::PI + 1e-5);
        }
        assert!((wrap_angle(std::f32::consts::TAU) - 0.0).abs() < 1e-5);
    }
}
