use crate::ecs::components::{Behavior, BehaviorState, MicroAction, MicroTimers, Position};
use crate::spatial::{FenSnapshot, SpatialHash};

/// Play lengths for each micro-action, seconds.
const EAR_TWITCH_LEN: f32 = 0.4;
const TAIL_WAG_LEN: f32 = 0.8;
const HEAD_SHAKE_LEN: f32 = 0.5;
const GROUND_PAW_LEN: f32 = 0.7;
const SNIFF_LEN: f32 = 1.0;
const VOCALIZE_LEN: f32 = 0.9;

/// Re-arm interval ranges, seconds.
const EAR_TWITCH_INTERVAL: (f32, f32) = (3.0, 8.0);
const TAIL_WAG_INTERVAL: (f32, f32) = (4.0, 10.0);
const HEAD_SHAKE_INTERVAL: (f32, f32) = (8.0, 18.0);
const GROUND_PAW_INTERVAL: (f32, f32) = (12.0, 25.0);
/// Curious creatures paw the ground far more often.
const GROUND_PAW_CURIOUS_INTERVAL: (f32, f32) = (2.0, 5.0);
const SNIFF_INTERVAL: (f32, f32) = (5.0, 12.0);
const VOCALIZE_INTERVAL: (f32, f32) = (10.0, 30.0);

/// Chance a bleat provokes the nearest peer into answering.
const RESPONSE_CHANCE: f32 = 0.3;
/// Answer delay range — a countdown field, decremented here, never a callback.
const RESPONSE_DELAY: (f32, f32) = (0.3, 0.8);
/// Bleats carry this far.
const EARSHOT: f32 = 10.0;
const EARSHOT_SQ: f32 = EARSHOT * EARSHOT;

pub fn rand_interval(range: (f32, f32), rng: &mut fastrand::Rng) -> f32 {
    range.0 + rng.f32() * (range.1 - range.0)
}

/// Build a freshly staggered timer set for a new creature.
pub fn initial_timers(rng: &mut fastrand::Rng) -> MicroTimers {
    MicroTimers {
        ear_twitch: MicroAction::armed(rand_interval(EAR_TWITCH_INTERVAL, rng)),
        tail_wag: MicroAction::armed(rand_interval(TAIL_WAG_INTERVAL, rng)),
        head_shake: MicroAction::armed(rand_interval(HEAD_SHAKE_INTERVAL, rng)),
        ground_paw: MicroAction::armed(rand_interval(GROUND_PAW_INTERVAL, rng)),
        sniff: MicroAction::armed(rand_interval(SNIFF_INTERVAL, rng)),
        vocalize: MicroAction::armed(rand_interval(VOCALIZE_INTERVAL, rng)),
        pending_response: None,
    }
}

/// Tick one action: returns true on the tick it fires.
fn tick_action(
    action: &mut MicroAction,
    dt: f32,
    interval: (f32, f32),
    length: f32,
    rng: &mut fastrand::Rng,
) -> bool {
    if action.active > 0.0 {
        action.active -= dt;
        return false;
    }
    action.next -= dt;
    if action.next <= 0.0 {
        action.active = length;
        action.next = rand_interval(interval, rng);
        return true;
    }
    false
}

/// Advance all six cosmetic timers and propagate call-and-response bleats.
pub fn update(
    world: &mut hecs::World,
    dt: f32,
    snapshots: &[FenSnapshot],
    grid: &SpatialHash,
    responses: &mut Vec<(hecs::Entity, f32)>,
    rng: &mut fastrand::Rng,
) {
    responses.clear();

    for (entity, (behavior, micro, pos)) in
        world.query_mut::<(&Behavior, &mut MicroTimers, &Position)>()
    {
        // Answer a pending bleat first; the countdown survives state changes
        // but the answer is swallowed if the creature can no longer respond.
        if let Some(mut delay) = micro.pending_response {
            delay -= dt;
            if delay <= 0.0 {
                micro.pending_response = None;
                if can_respond(behavior.state) {
                    micro.vocalize.active = VOCALIZE_LEN;
                }
            } else {
                micro.pending_response = Some(delay);
            }
        }

        // Asleep or bolting creatures have no spare attention for twitches.
        if matches!(
            behavior.state,
            BehaviorState::Sleeping | BehaviorState::Fleeing
        ) {
            continue;
        }

        tick_action(&mut micro.ear_twitch, dt, EAR_TWITCH_INTERVAL, EAR_TWITCH_LEN, rng);
        tick_action(&mut micro.tail_wag, dt, TAIL_WAG_INTERVAL, TAIL_WAG_LEN, rng);
        tick_action(&mut micro.head_shake, dt, HEAD_SHAKE_INTERVAL, HEAD_SHAKE_LEN, rng);
        tick_action(&mut micro.sniff, dt, SNIFF_INTERVAL, SNIFF_LEN, rng);

        let paw_interval = if behavior.state == BehaviorState::Curious {
            GROUND_PAW_CURIOUS_INTERVAL
        } else {
            GROUND_PAW_INTERVAL
        };
        tick_action(&mut micro.ground_paw, dt, paw_interval, GROUND_PAW_LEN, rng);

        let bleated = tick_action(
            &mut micro.vocalize,
            dt,
            VOCALIZE_INTERVAL,
            VOCALIZE_LEN,
            rng,
        );
        if bleated && rng.f32() < RESPONSE_CHANCE {
            if let Some(peer) = nearest_listener(entity, pos.0, snapshots, grid) {
                responses.push((peer, rand_interval(RESPONSE_DELAY, rng)));
            }
        }
    }

    for (entity, delay) in responses.drain(..) {
        if let Ok(mut micro) = world.get::<&mut MicroTimers>(entity) {
            if micro.pending_response.is_none() {
                micro.pending_response = Some(delay);
            }
        }
    }
}

fn can_respond(state: BehaviorState) -> bool {
    !matches!(
        state,
        BehaviorState::Sleeping
            | BehaviorState::Fleeing
            | BehaviorState::Petted
            | BehaviorState::Bliss
    )
}

/// Nearest peer within earshot that could plausibly answer.
fn nearest_listener(
    caller: hecs::Entity,
    pos: glam::Vec3,
    snapshots: &[FenSnapshot],
    grid: &SpatialHash,
) -> Option<hecs::Entity> {
    let mut best: Option<(f32, hecs::Entity)> = None;
    grid.query_neighbors(pos, |idx| {
        let Some(snap) = snapshots.get(idx as usize) else {
            return;
        };
        if snap.entity == caller || !can_respond(snap.state) {
            return;
        }
        let dist_sq = snap.pos.distance_squared(pos);
        if dist_sq < EARSHOT_SQ && best.map_or(true, |(b, _)| dist_sq < b) {
            best = Some((dist_sq, snap.entity));
        }
    });
    best.map(|(_, e)| e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::{Personality, Stature, Velocity};
    use crate::ecs::systems::spatial;
    use glam::Vec3;

    fn bleater(world: &mut hecs::World, pos: Vec3, rng: &mut fastrand::Rng) -> hecs::Entity {
        world.spawn((
            Position(pos),
            Velocity(Vec3::ZERO),
            Behavior::new(),
            initial_timers(rng),
            Personality {
                shyness: 0.5,
                friendliness: 0.5,
                curiosity: 0.5,
                flightiness: 0.5,
                laziness: 0.5,
                sociability: 0.5,
            },
            Stature {
                scale: 1.0,
                radius: 0.6,
            },
        ))
    }

    #[test]
    fn actions_fire_and_rearm() {
        let mut rng = fastrand::Rng::with_seed(8);
        let mut action = MicroAction::armed(0.5);
        let dt = 1.0 / 60.0;

        let mut fired = false;
        for _ in 0..40 {
            fired |= tick_action(&mut action, dt, (3.0, 8.0), 0.4, &mut rng);
        }
        assert!(fired);
        assert!(action.is_active());
        assert!(action.next >= 3.0 && action.next <= 8.0);

        // Active window runs out, timer counts toward the next fire.
        for _ in 0..40 {
            tick_action(&mut action, dt, (3.0, 8.0), 0.4, &mut rng);
        }
        assert!(!action.is_active());
    }

    #[test]
    fn pending_response_fires_after_countdown() {
        let mut world = hecs::World::new();
        let mut rng = fastrand::Rng::with_seed(2);
        let e = bleater(&mut world, Vec3::ZERO, &mut rng);
        world.get::<&mut MicroTimers>(e).unwrap().pending_response = Some(0.5);

        let grid = SpatialHash::new(4.0, 64);
        let mut responses = Vec::new();
        let dt = 1.0 / 60.0;
        for _ in 0..40 {
            update(&mut world, dt, &[], &grid, &mut responses, &mut rng);
        }
        let micro = world.get::<&MicroTimers>(e).unwrap();
        assert!(micro.pending_response.is_none());
        assert!(micro.vocalize.is_active());
    }

    #[test]
    fn sleeping_creature_swallows_the_answer() {
        let mut world = hecs::World::new();
        let mut rng = fastrand::Rng::with_seed(2);
        let e = bleater(&mut world, Vec3::ZERO, &mut rng);
        world.get::<&mut MicroTimers>(e).unwrap().pending_response = Some(0.1);
        world
            .get::<&mut Behavior>(e)
            .unwrap()
            .enter(BehaviorState::Sleeping, 0.0);

        let grid = SpatialHash::new(4.0, 64);
        let mut responses = Vec::new();
        for _ in 0..30 {
            update(&mut world, 1.0 / 60.0, &[], &grid, &mut responses, &mut rng);
        }
        let micro = world.get::<&MicroTimers>(e).unwrap();
        assert!(micro.pending_response.is_none());
        assert!(!micro.vocalize.is_active());
    }

    #[test]
    fn bleat_can_arm_a_neighbor_response() {
        let mut world = hecs::World::new();
        let mut rng = fastrand::Rng::with_seed(6);
        let a = bleater(&mut world, Vec3::ZERO, &mut rng);
        let b = bleater(&mut world, Vec3::new(2.0, 0.0, 0.0), &mut rng);
        // Force an imminent bleat from a.
        world.get::<&mut MicroTimers>(a).unwrap().vocalize = MicroAction::armed(0.01);

        let mut grid = SpatialHash::new(4.0, 64);
        let mut snapshots = Vec::new();
        let mut responses = Vec::new();
        // Run until either the neighbor was armed or clearly never will be.
        let mut armed = false;
        for _ in 0..36000 {
            spatial::rebuild(&world, &mut grid, &mut snapshots);
            update(
                &mut world,
                1.0 / 60.0,
                &snapshots,
                &grid,
                &mut responses,
                &mut rng,
            );
            let micro = world.get::<&MicroTimers>(b).unwrap();
            if micro.pending_response.is_some() || micro.vocalize.is_active() {
                armed = true;
                break;
            }
        }
        // 30% per bleat over ten minutes of bleating: statistically certain.
        assert!(armed, "neighbor never answered any bleat");
    }
}
