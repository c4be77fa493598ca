use glam::{Vec2, Vec3};

use crate::ecs::components::{Position, SoftBody, Stature, Velocity};
use crate::field::Field;
use crate::spatial::{FenSnapshot, SpatialHash};

/// Fraction of pairwise overlap applied as positional correction per tick.
/// Full correction reads as rigid popping.
const SEPARATION_CORRECTION: f32 = 0.4;
/// Small velocity kick on top of the positional push, for a bouncy feel.
const SEPARATION_KICK: f32 = 1.5;
/// Wool spring impulse per unit of contact overlap.
const WOOL_CONTACT_IMPULSE: f32 = 3.0;
/// Ball push force per unit of creature speed.
const BALL_PUSH: f32 = 1.8;
/// Creatures slower than this don't move the ball.
const BALL_MIN_SPEED: f32 = 0.1;

/// Pre-allocated per-tick buffers, indexed by snapshot position.
pub struct SeparationBuffers {
    correction: Vec<Vec3>,
    kick: Vec<Vec3>,
}

impl SeparationBuffers {
    pub fn new(capacity: usize) -> Self {
        Self {
            correction: vec![Vec3::ZERO; capacity],
            kick: vec![Vec3::ZERO; capacity],
        }
    }
}

/// Resolve creature-creature separation, rock colliders, and ball pushes.
/// One pass per tick; simultaneous multi-body overlaps are approximated,
/// which is fine at flock sizes.
pub fn resolve(
    world: &mut hecs::World,
    snapshots: &[FenSnapshot],
    grid: &SpatialHash,
    field: &mut Field,
    bufs: &mut SeparationBuffers,
) {
    separation_read(snapshots, grid, bufs);
    separation_write(world, snapshots, bufs);
    resolve_rocks(world, field);
    push_balls(snapshots, field);
}

/// Pure-data read pass: accumulate pairwise pushes into the buffers.
fn separation_read(snapshots: &[FenSnapshot], grid: &SpatialHash, bufs: &mut SeparationBuffers) {
    let len = snapshots.len();
    bufs.correction.resize(len, Vec3::ZERO);
    bufs.kick.resize(len, Vec3::ZERO);
    for i in 0..len {
        bufs.correction[i] = Vec3::ZERO;
        bufs.kick[i] = Vec3::ZERO;
    }

    for my_idx in 0..len {
        let me = &snapshots[my_idx];
        grid.query_neighbors(me.pos, |neighbor_idx| {
            let ni = neighbor_idx as usize;
            // Each pair handled once, from the lower index.
            if ni <= my_idx || ni >= len {
                return;
            }
            let them = &snapshots[ni];
            let delta = Vec3::new(me.pos.x - them.pos.x, 0.0, me.pos.z - them.pos.z);
            let dist_sq = delta.length_squared();
            let reach = me.radius + them.radius;
            if dist_sq >= reach * reach {
                return;
            }
            let dist = dist_sq.sqrt();
            let overlap = reach - dist;
            let dir = if dist > 1e-4 { delta / dist } else { Vec3::X };

            // Both sides share the correction; soft, not rigid.
            let shift = dir * (overlap * SEPARATION_CORRECTION * 0.5);
            bufs.correction[my_idx] += shift;
            bufs.correction[ni] -= shift;

            let kick = dir * (overlap * SEPARATION_KICK);
            bufs.kick[my_idx] += kick;
            bufs.kick[ni] -= kick;
        });
    }
}

/// Apply accumulated pushes to the world, plus a wool jiggle on contact.
fn separation_write(world: &mut hecs::World, snapshots: &[FenSnapshot], bufs: &SeparationBuffers) {
    for (idx, snap) in snapshots.iter().enumerate() {
        let correction = bufs.correction[idx];
        if correction.length_squared() < 1e-10 {
            continue;
        }
        if let Ok(mut pos) = world.get::<&mut Position>(snap.entity) {
            pos.0 += correction;
        }
        if let Ok(mut vel) = world.get::<&mut Velocity>(snap.entity) {
            vel.0 += bufs.kick[idx];
        }
        if let Ok(mut soft) = world.get::<&mut SoftBody>(snap.entity) {
            soft.wool_vel += correction.length() * WOOL_CONTACT_IMPULSE;
        }
    }
}

/// Push creatures out of rock disks; remove the velocity component pointing
/// into the surface.
fn resolve_rocks(world: &mut hecs::World, field: &Field) {
    for (_, (pos, vel, stature, soft)) in
        world.query_mut::<(&mut Position, &mut Velocity, &Stature, &mut SoftBody)>()
    {
        let Some(hit) = field.rocks.hit(pos.0.x, pos.0.z, stature.radius) else {
            continue;
        };
        pos.0.x += hit.normal.x * hit.overlap;
        pos.0.z += hit.normal.y * hit.overlap;

        let planar = Vec2::new(vel.0.x, vel.0.z);
        let into = planar.dot(-hit.normal);
        if into > 0.0 {
            let removed = hit.normal * into;
            vel.0.x += removed.x;
            vel.0.z += removed.y;
            soft.wool_vel += into * 0.5;
        }
    }
}

/// Asymmetric ball contact: the ball gets shoved, the creature keeps walking.
/// Push force scales with the creature's speed.
fn push_balls(snapshots: &[FenSnapshot], field: &mut Field) {
    for ball in &mut field.balls {
        for snap in snapshots {
            let to_ball = ball.pos - Vec2::new(snap.pos.x, snap.pos.z);
            let dist_sq = to_ball.length_squared();
            let reach = ball.radius + snap.radius;
            if dist_sq >= reach * reach || dist_sq < 1e-8 {
                continue;
            }
            let speed = Vec2::new(snap.vel.x, snap.vel.z).length();
            if speed < BALL_MIN_SPEED {
                continue;
            }
            let dir = to_ball / dist_sq.sqrt();
            ball.push(dir, speed * BALL_PUSH);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::{Behavior, BehaviorState, Personality};
    use crate::ecs::systems::spatial;
    use crate::field::{Ball, Rock, RockField};

    fn plain_personality() -> Personality {
        Personality {
            shyness: 0.5,
            friendliness: 0.5,
            curiosity: 0.5,
            flightiness: 0.5,
            laziness: 0.5,
            sociability: 0.5,
        }
    }

    fn body(world: &mut hecs::World, pos: Vec3, vel: Vec3, radius: f32) -> hecs::Entity {
        world.spawn((
            Position(pos),
            Velocity(vel),
            Behavior::new(),
            plain_personality(),
            Stature { scale: 1.0, radius },
            SoftBody::new(0.0, 1.0, 0.0),
        ))
    }

    fn run_resolve(world: &mut hecs::World, field: &mut Field, ticks: usize) {
        let mut grid = SpatialHash::new(4.0, 256);
        let mut snapshots = Vec::new();
        let mut bufs = SeparationBuffers::new(16);
        for _ in 0..ticks {
            spatial::rebuild(world, &mut grid, &mut snapshots);
            resolve(world, &snapshots, &grid, field, &mut bufs);
        }
    }

    #[test]
    fn overlapping_pair_separates_softly() {
        let mut world = hecs::World::new();
        let mut field = Field::flat(30.0);
        let a = body(&mut world, Vec3::new(-0.1, 0.0, 0.0), Vec3::ZERO, 0.6);
        let b = body(&mut world, Vec3::new(0.1, 0.0, 0.0), Vec3::ZERO, 0.6);

        run_resolve(&mut world, &mut field, 120);

        let pa = world.get::<&Position>(a).unwrap().0;
        let pb = world.get::<&Position>(b).unwrap().0;
        let dist = pa.distance(pb);
        // Soft constraint: residual overlap within a small tolerance.
        assert!(dist >= 1.2 - 0.1, "still overlapping: dist {dist}");
    }

    #[test]
    fn single_pass_is_partial_not_rigid() {
        let mut world = hecs::World::new();
        let mut field = Field::flat(30.0);
        let a = body(&mut world, Vec3::new(-0.1, 0.0, 0.0), Vec3::ZERO, 0.6);
        let b = body(&mut world, Vec3::new(0.1, 0.0, 0.0), Vec3::ZERO, 0.6);

        run_resolve(&mut world, &mut field, 1);

        let pa = world.get::<&Position>(a).unwrap().0;
        let pb = world.get::<&Position>(b).unwrap().0;
        // One pass must not fully resolve a deep overlap.
        assert!(pa.distance(pb) < 1.2);
        assert!(pa.distance(pb) > 0.2);
    }

    #[test]
    fn rock_pushes_creature_out() {
        let mut world = hecs::World::new();
        let mut field = Field::flat(30.0);
        field.rocks = RockField::new(vec![Rock {
            pos: Vec2::ZERO,
            radius: 1.0,
        }]);
        let e = body(
            &mut world,
            Vec3::new(1.1, 0.0, 0.0),
            Vec3::new(-2.0, 0.0, 0.0),
            0.5,
        );

        run_resolve(&mut world, &mut field, 1);

        let p = world.get::<&Position>(e).unwrap().0;
        assert!((p.x - 1.5).abs() < 1e-4, "not pushed to surface: {}", p.x);
        // Inward velocity removed.
        let v = world.get::<&Velocity>(e).unwrap().0;
        assert!(v.x >= -1e-4);
    }

    #[test]
    fn ball_push_is_asymmetric() {
        let mut world = hecs::World::new();
        let mut field = Field::flat(30.0);
        field.balls.push(Ball::new(Vec2::new(0.8, 0.0), 0.4));
        let e = body(
            &mut world,
            Vec3::ZERO,
            Vec3::new(2.0, 0.0, 0.0),
            0.6,
        );
        // Moving state so the snapshot carries the velocity.
        world
            .get::<&mut Behavior>(e)
            .unwrap()
            .enter(BehaviorState::Idle, 1.0);

        run_resolve(&mut world, &mut field, 1);

        // Ball got shoved along +X...
        assert!(field.balls[0].vel.x > 0.0);
        // ...while the creature's velocity is untouched by the contact.
        let v = world.get::<&Velocity>(e).unwrap().0;
        assert!((v.x - 2.0).abs() < 1e-4);
    }

    #[test]
    fn slow_creature_does_not_move_ball() {
        let mut world = hecs::World::new();
        let mut field = Field::flat(30.0);
        field.balls.push(Ball::new(Vec2::new(0.5, 0.0), 0.4));
        body(&mut world, Vec3::ZERO, Vec3::ZERO, 0.6);

        run_resolve(&mut world, &mut field, 1);
        assert_eq!(field.balls[0].vel, Vec2::ZERO);
    }
}
