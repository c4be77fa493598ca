use glam::Vec3;

use crate::ecs::components::*;
use crate::ecs::systems::micro;
use crate::field::{Field, PlayerSnapshot};

/// Keep spawn points this far from the player.
const PLAYER_CLEARANCE: f32 = 3.0;
/// Keep spawn points this far from creatures already placed.
const PEER_CLEARANCE: f32 = 1.5;
/// Placement attempts before accepting an imperfect spot.
const PLACEMENT_TRIES: usize = 12;
/// Collision radius of an average-sized creature.
const BASE_RADIUS: f32 = 0.6;

/// Spawn a batch of Cloudfen with randomized personality and stature.
/// Positions avoid the player and already-placed creatures.
pub fn spawn_fens(
    world: &mut hecs::World,
    count: usize,
    field: &Field,
    player: &PlayerSnapshot,
    rng: &mut fastrand::Rng,
) -> Vec<hecs::Entity> {
    let mut placed: Vec<Vec3> = world
        .query::<&Position>()
        .iter()
        .map(|(_, p)| p.0)
        .collect();
    let mut spawned = Vec::with_capacity(count);

    for _ in 0..count {
        let pos = pick_spot(field, player, &placed, rng);
        placed.push(pos);
        let scale = 0.85 + rng.f32() * 0.4;
        spawned.push(spawn_fen_at(world, pos, scale, rng));
    }
    spawned
}

/// Spawn one creature at an explicit spot with the given size multiplier.
pub fn spawn_fen_at(
    world: &mut hecs::World,
    pos: Vec3,
    scale: f32,
    rng: &mut fastrand::Rng,
) -> hecs::Entity {
    let mut behavior = Behavior::new();
    // Stagger initial timers so the flock doesn't act in lockstep.
    behavior.duration = rng.f32() * 3.0;

    world.spawn((
        Position(pos),
        Velocity(Vec3::ZERO),
        MoveTarget::default(),
        behavior,
        random_personality(rng),
        Mood {
            contentment: 0.4 + rng.f32() * 0.2,
            alertness: 0.4 + rng.f32() * 0.2,
            playfulness: 0.4 + rng.f32() * 0.2,
        },
        Drives {
            tiredness: rng.f32() * 0.3,
            social_cooldown: rng.f32() * 20.0,
        },
        Affection::new(),
        micro::initial_timers(rng),
        SocialLink::default(),
        SoftBody::new(
            rng.f32() * std::f32::consts::TAU,
            1.4 + rng.f32() * 0.5,
            rng.f32() * std::f32::consts::TAU,
        ),
        Stature {
            scale,
            radius: BASE_RADIUS * scale,
        },
    ))
}

/// Six scalars in [0, 1], fixed for the creature's whole life.
fn random_personality(rng: &mut fastrand::Rng) -> Personality {
    Personality {
        shyness: rng.f32(),
        friendliness: rng.f32(),
        curiosity: rng.f32(),
        flightiness: rng.f32(),
        laziness: rng.f32(),
        sociability: rng.f32(),
    }
}

/// Rejection-sample a spawn point clear of the player and the flock.
/// After enough failed tries the last candidate is accepted as-is — the
/// separation pass will sort out any residual crowding.
fn pick_spot(
    field: &Field,
    player: &PlayerSnapshot,
    placed: &[Vec3],
    rng: &mut fastrand::Rng,
) -> Vec3 {
    let limit = field.half_extent - 1.0;
    let mut candidate = Vec3::ZERO;
    for _ in 0..PLACEMENT_TRIES {
        let x = (rng.f32() * 2.0 - 1.0) * limit;
        let z = (rng.f32() * 2.0 - 1.0) * limit;
        candidate = Vec3::new(x, field.terrain.height_at(x, z), z);

        let player_ok = candidate.distance(player.position) >= PLAYER_CLEARANCE;
        let peers_ok = placed
            .iter()
            .all(|p| candidate.distance(*p) >= PEER_CLEARANCE);
        if player_ok && peers_ok {
            break;
        }
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawns_carry_full_component_set() {
        let mut world = hecs::World::new();
        let field = Field::flat(20.0);
        let player = PlayerSnapshot::stationary(Vec3::ZERO);
        let mut rng = fastrand::Rng::with_seed(1);

        let spawned = spawn_fens(&mut world, 10, &field, &player, &mut rng);
        assert_eq!(spawned.len(), 10);
        assert_eq!(world.len(), 10);
        for e in spawned {
            assert!(world.get::<&Behavior>(e).is_ok());
            assert!(world.get::<&Personality>(e).is_ok());
            assert!(world.get::<&SoftBody>(e).is_ok());
        }
    }

    #[test]
    fn explicit_spawn_scales_collision_radius() {
        let mut world = hecs::World::new();
        let mut rng = fastrand::Rng::with_seed(5);
        let e = spawn_fen_at(&mut world, Vec3::new(1.0, 0.0, 2.0), 1.2, &mut rng);
        let stature = world.get::<&Stature>(e).unwrap();
        assert!((stature.radius - BASE_RADIUS * 1.2).abs() < 1e-6);
        assert_eq!(world.get::<&Position>(e).unwrap().0.x, 1.0);
    }

    #[test]
    fn personality_scalars_in_unit_range() {
        let mut rng = fastrand::Rng::with_seed(2);
        for _ in 0..100 {
            let p = random_personality(&mut rng);
            for v in [
                p.shyness,
                p.friendliness,
                p.curiosity,
                p.flightiness,
                p.laziness,
                p.sociability,
            ] {
                assert!((0.0..=1.0).contains(&v));
            }
        }
    }

    #[test]
    fn spawn_points_avoid_the_player() {
        let mut world = hecs::World::new();
        let field = Field::flat(20.0);
        let player = PlayerSnapshot::stationary(Vec3::ZERO);
        let mut rng = fastrand::Rng::with_seed(3);

        let spawned = spawn_fens(&mut world, 20, &field, &player, &mut rng);
        let mut close = 0;
        for e in spawned {
            if world.get::<&Position>(e).unwrap().0.distance(player.position)
                < PLAYER_CLEARANCE
            {
                close += 1;
            }
        }
        // Rejection sampling, not a hard guarantee — but on an empty 40x40
        // pasture essentially every spawn should clear the player.
        assert_eq!(close, 0);
    }

    #[test]
    fn spawn_points_stay_inside_the_fence() {
        let mut world = hecs::World::new();
        let field = Field::flat(8.0);
        let player = PlayerSnapshot::stationary(Vec3::ZERO);
        let mut rng = fastrand::Rng::with_seed(4);

        for e in spawn_fens(&mut world, 30, &field, &player, &mut rng) {
            let p = world.get::<&Position>(e).unwrap().0;
            assert!(p.x.abs() <= 7.0 && p.z.abs() <= 7.0);
        }
    }
}
