use glam::Vec3;

use crate::ecs::components::{Behavior, MoveTarget, Personality, Position, Velocity};
use crate::ecs::systems::behavior::state_speed;
use crate::field::Field;

/// Friction coefficient — multiplied per tick to slow creatures down.
const FRICTION: f32 = 0.92;
/// Minimum velocity magnitude before snapping to zero.
const MIN_VELOCITY: f32 = 0.02;
/// Steering acceleration toward the current waypoint, in speeds/second.
const STEER_ACCEL: f32 = 6.0;
/// Waypoint is considered reached within this range.
const ARRIVE_RADIUS: f32 = 0.35;
/// Keep creatures this far inside the fence.
const FENCE_MARGIN: f32 = 0.5;

/// Steer toward waypoints, integrate velocity, apply friction, clamp to the
/// pasture, and snap elevation to the terrain.
pub fn integrate(world: &mut hecs::World, dt: f32, field: &Field) {
    for (_, (pos, vel, target, behavior, personality)) in world.query_mut::<(
        &mut Position,
        &mut Velocity,
        &mut MoveTarget,
        &Behavior,
        &Personality,
    )>() {
        // Waypoint steering on the pasture plane.
        if let Some(t) = target.0 {
            let to = Vec3::new(t.x - pos.0.x, 0.0, t.z - pos.0.z);
            let dist = to.length();
            if dist < ARRIVE_RADIUS {
                target.0 = None;
            } else {
                let speed = state_speed(behavior.state, personality);
                if speed > 0.0 {
                    let dir = to / dist;
                    vel.0 += dir * speed * STEER_ACCEL * dt;
                    // Cap steered travel at the state's cruise speed.
                    let planar = Vec3::new(vel.0.x, 0.0, vel.0.z);
                    let planar_speed = planar.length();
                    if planar_speed > speed {
                        let capped = planar * (speed / planar_speed);
                        vel.0.x = capped.x;
                        vel.0.z = capped.z;
                    }
                }
            }
        }

        // Integrate velocity.
        pos.0.x += vel.0.x * dt;
        pos.0.z += vel.0.z * dt;

        // Apply friction.
        vel.0 *= FRICTION;

        // Snap tiny velocities to zero.
        if vel.0.length_squared() < MIN_VELOCITY * MIN_VELOCITY {
            vel.0 = Vec3::ZERO;
        }

        // Clamp to the fence.
        let limit = field.half_extent - FENCE_MARGIN;
        pos.0.x = pos.0.x.clamp(-limit, limit);
        pos.0.z = pos.0.z.clamp(-limit, limit);

        // Glue to the ground.
        pos.0.y = field.terrain.height_at(pos.0.x, pos.0.z);
    }
}
