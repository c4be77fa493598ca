use glam::Vec3;

use crate::ecs::components::{
    Affection, Behavior, BehaviorState, Drives, Mood, MoveTarget, Personality, SocialLink,
    SoftBody, Velocity,
};
use crate::ecs::components::Position;
use crate::field::{Field, PlayerSnapshot};
use crate::spatial::FenSnapshot;

/// Player closer than this biases the idle-behavior roll (less grazing,
/// more looking).
const PLAYER_NEAR: f32 = 5.0;
/// Grazing breaks off when the player comes within this range.
const GRAZE_INTERRUPT: f32 = 3.0;
/// Stretch poses always play for this long.
const STRETCH_DURATION: f32 = 2.5;
/// Curious gives up after this long without a hover refresh.
const CURIOUS_TIMEOUT: f32 = 4.0;
/// Fleeing gives up after this long even if the target was never reached.
const FLEE_TIMEOUT: f32 = 3.0;
/// Happiness level that begins counting toward bliss.
const BLISS_THRESHOLD: f32 = 0.8;
/// Seconds happiness must stay above the threshold to tip into bliss.
const BLISS_HOLD: f32 = 2.0;
/// Seconds of lingering bliss after the hand leaves.
const BLISS_LINGER: f32 = 3.0;
/// Resting tips into sleep once tiredness drops below this (stochastic).
const SLEEP_TIREDNESS: f32 = 0.2;
/// Per-second chance resting settles into sleep once tiredness allows.
const SLEEP_CHANCE: f32 = 0.10;
/// Per-second chance a fully rested sleeper wakes into a stretch.
const WAKE_CHANCE: f32 = 0.25;
/// Idle wander waypoints are picked within this radius.
const WANDER_RADIUS: f32 = 4.0;
/// Per-second chance an idle creature with no waypoint picks one.
const WANDER_CHANCE: f32 = 0.8;
/// Per-second chance of a grazing heading jitter.
const GRAZE_JITTER_CHANCE: f32 = 0.5;
/// Curious creatures that were petted before sidle up to within this range.
const CURIOUS_COMFORT: f32 = 2.2;

/// Cruise speed for waypoint steering, per state.
pub fn state_speed(state: BehaviorState, personality: &Personality) -> f32 {
    match state {
        BehaviorState::Idle => 1.1 * (0.8 + 0.4 * (1.0 - personality.laziness)),
        BehaviorState::Grazing => 0.35,
        BehaviorState::Curious => 0.8,
        BehaviorState::Social => 1.4,
        BehaviorState::Called => 2.5 * (0.8 + 0.4 * personality.friendliness),
        BehaviorState::Fleeing => 4.5 * (0.9 + 0.3 * personality.flightiness),
        _ => 0.0,
    }
}

/// Look-target flavor for the Looking state, stored in `Behavior.variant`.
const LOOK_AT_PLAYER: u8 = 0;
const LOOK_AT_PEER: u8 = 1;
const LOOK_AT_POINT: u8 = 2;

/// Advance every creature's state machine by one tick.
pub fn update(
    world: &mut hecs::World,
    dt: f32,
    player: &PlayerSnapshot,
    snapshots: &[FenSnapshot],
    field: &Field,
    rng: &mut fastrand::Rng,
) {
    for (_, (behavior, target, vel, pos, personality, mood, drives, affection, link, soft)) in
        world.query_mut::<(
            &mut Behavior,
            &mut MoveTarget,
            &mut Velocity,
            &Position,
            &Personality,
            &Mood,
            &mut Drives,
            &mut Affection,
            &SocialLink,
            &mut SoftBody,
        )>()
    {
        behavior.timer += dt;
        drives.social_cooldown = (drives.social_cooldown - dt).max(0.0);

        let player_dist = pos.0.distance(player.position);

        match behavior.state {
            BehaviorState::Idle => {
                if target.0.is_none() && rng.f32() < WANDER_CHANCE * dt {
                    target.0 = Some(wander_point(pos.0, field, rng));
                }
                if behavior.timer >= behavior.duration {
                    choose_next(
                        behavior, target, personality, mood, drives, link, player_dist, rng,
                    );
                }
            }
            BehaviorState::Grazing => {
                if rng.f32() < GRAZE_JITTER_CHANCE * dt {
                    let angle = rng.f32() * std::f32::consts::TAU;
                    vel.0 += Vec3::new(angle.cos(), 0.0, angle.sin()) * 0.2;
                }
                if player_dist < GRAZE_INTERRUPT {
                    behavior.enter(BehaviorState::Looking, 1.5 + rng.f32() * 2.0);
                    behavior.variant = LOOK_AT_PLAYER;
                    target.0 = None;
                } else if behavior.timer >= behavior.duration {
                    choose_next(
                        behavior, target, personality, mood, drives, link, player_dist, rng,
                    );
                }
            }
            BehaviorState::Looking => {
                soft.look_target = match behavior.variant {
                    LOOK_AT_PLAYER => Some(player.position),
                    LOOK_AT_PEER => link.0.and_then(|e| snapshot_pos(snapshots, e)),
                    // Random-point gaze: pick once on the first tick of the
                    // state, then hold it for the rest.
                    _ if behavior.timer <= dt => Some(wander_point(pos.0, field, rng)),
                    _ => soft
                        .look_target
                        .or_else(|| Some(wander_point(pos.0, field, rng))),
                };
                if behavior.timer >= behavior.duration {
                    soft.look_target = None;
                    choose_next(
                        behavior, target, personality, mood, drives, link, player_dist, rng,
                    );
                }
            }
            BehaviorState::Stretching => {
                if behavior.timer >= STRETCH_DURATION {
                    choose_next(
                        behavior, target, personality, mood, drives, link, player_dist, rng,
                    );
                }
            }
            BehaviorState::Resting => {
                if drives.tiredness < SLEEP_TIREDNESS && rng.f32() < SLEEP_CHANCE * dt {
                    behavior.enter(BehaviorState::Sleeping, 0.0);
                    target.0 = None;
                } else if drives.tiredness <= 0.05 && behavior.timer >= behavior.duration {
                    choose_next(
                        behavior, target, personality, mood, drives, link, player_dist, rng,
                    );
                }
            }
            BehaviorState::Sleeping => {
                if drives.tiredness <= 0.02 && rng.f32() < WAKE_CHANCE * dt {
                    behavior.enter(BehaviorState::Stretching, STRETCH_DURATION);
                    behavior.variant = rng.u8(0..3);
                }
            }
            BehaviorState::Social => {
                // Approach/facing is steered by the social system; this only
                // handles the visit running its course.
                if behavior.timer >= behavior.duration {
                    soft.look_target = None;
                    target.0 = None;
                    choose_next(
                        behavior, target, personality, mood, drives, link, player_dist, rng,
                    );
                }
            }
            BehaviorState::Curious => {
                soft.look_target = Some(player.position);
                if affection.has_been_petted && player_dist > CURIOUS_COMFORT {
                    let toward = (player.position - pos.0).normalize_or_zero();
                    target.0 = Some(player.position - toward * (CURIOUS_COMFORT * 0.7));
                }
                if affection.is_hovered {
                    behavior.timer = 0.0;
                } else if behavior.timer >= CURIOUS_TIMEOUT {
                    soft.look_target = None;
                    target.0 = None;
                    choose_next(
                        behavior, target, personality, mood, drives, link, player_dist, rng,
                    );
                }
            }
            BehaviorState::Petted => {
                // Entered and left only through the handling interface; here we
                // only watch for the tip into bliss.
                if affection.happiness > BLISS_THRESHOLD {
                    affection.bliss_hold += dt;
                    if affection.bliss_hold >= BLISS_HOLD {
                        affection.bliss_hold = 0.0;
                        affection.bliss_level = affection.happiness;
                        behavior.enter(BehaviorState::Bliss, 0.0);
                    }
                } else {
                    affection.bliss_hold = 0.0;
                }
            }
            BehaviorState::Bliss => {
                if !affection.is_petted && behavior.timer >= BLISS_LINGER {
                    affection.bliss_level = 0.0;
                    behavior.enter(BehaviorState::Idle, 1.0 + rng.f32() * 2.0);
                }
            }
            BehaviorState::Called => {
                if let Some(mut summons) = behavior.summons {
                    summons.delay -= dt;
                    if summons.delay <= 0.0 {
                        target.0 = Some(summons.target);
                        behavior.summons = None;
                    } else {
                        behavior.summons = Some(summons);
                    }
                } else if target.0.is_none() {
                    // Waypoint reached (movement cleared it) — investigate.
                    behavior.enter(BehaviorState::Curious, 0.0);
                } else if behavior.timer > 15.0 {
                    // Never arrived; give up.
                    target.0 = None;
                    behavior.enter(BehaviorState::Idle, 1.0 + rng.f32() * 2.0);
                }
            }
            BehaviorState::Fleeing => {
                if target.0.is_none() || behavior.timer >= FLEE_TIMEOUT {
                    target.0 = None;
                    behavior.enter(BehaviorState::Idle, 1.0 + rng.f32() * 2.0);
                }
            }
        }
    }
}

/// Weighted roll across the self-selected idle behaviors. One flat table,
/// one sampling routine — fully deterministic under a seeded RNG.
#[allow(clippy::too_many_arguments)]
fn choose_next(
    behavior: &mut Behavior,
    target: &mut MoveTarget,
    personality: &Personality,
    mood: &Mood,
    drives: &Drives,
    link: &SocialLink,
    player_dist: f32,
    rng: &mut fastrand::Rng,
) {
    let near_player = player_dist < PLAYER_NEAR;
    let rested_prev = matches!(
        behavior.state,
        BehaviorState::Resting | BehaviorState::Sleeping
    ) || matches!(
        behavior.prev,
        BehaviorState::Resting | BehaviorState::Sleeping
    );

    let mut graze = 0.28 + personality.laziness * 0.10;
    if near_player {
        graze *= 0.5;
    }
    let mut look = 0.08 + personality.curiosity * 0.12;
    if near_player {
        look += 0.10;
    }
    let mut stretch = 0.04;
    if rested_prev {
        stretch += 0.30;
    }
    let rest = if drives.tiredness > 0.3 {
        0.10 + drives.tiredness * 1.2
    } else {
        0.0
    };
    let social = if link.0.is_some() && drives.social_cooldown <= 0.0 {
        0.08 + personality.sociability * 0.20
    } else {
        0.0
    };
    let wander = 0.30 + mood.playfulness * 0.10;

    let table = [
        (wander, BehaviorState::Idle),
        (graze, BehaviorState::Grazing),
        (look, BehaviorState::Looking),
        (stretch, BehaviorState::Stretching),
        (rest, BehaviorState::Resting),
        (social, BehaviorState::Social),
    ];
    let next = weighted_pick(&table, rng);

    target.0 = None;
    match next {
        BehaviorState::Idle => behavior.enter(BehaviorState::Idle, 2.0 + rng.f32() * 3.0),
        BehaviorState::Grazing => behavior.enter(BehaviorState::Grazing, 4.0 + rng.f32() * 5.0),
        BehaviorState::Looking => {
            behavior.enter(BehaviorState::Looking, 1.5 + rng.f32() * 2.0);
            behavior.variant = if near_player {
                LOOK_AT_PLAYER
            } else if link.0.is_some() && rng.f32() < 0.5 {
                LOOK_AT_PEER
            } else {
                LOOK_AT_POINT
            };
        }
        BehaviorState::Stretching => {
            behavior.enter(BehaviorState::Stretching, STRETCH_DURATION);
            behavior.variant = rng.u8(0..3);
        }
        BehaviorState::Resting => behavior.enter(BehaviorState::Resting, 8.0 + rng.f32() * 5.0),
        BehaviorState::Social => behavior.enter(BehaviorState::Social, 4.0 + rng.f32() * 3.0),
        _ => behavior.enter(BehaviorState::Idle, 2.0 + rng.f32() * 3.0),
    }
}

/// Single categorical sample over (weight, state) pairs.
pub fn weighted_pick(
    table: &[(f32, BehaviorState)],
    rng: &mut fastrand::Rng,
) -> BehaviorState {
    let total: f32 = table.iter().map(|(w, _)| w.max(0.0)).sum();
    if total <= 0.0 {
        return BehaviorState::Idle;
    }
    let r = rng.f32() * total;
    let mut acc = 0.0;
    for &(w, state) in table {
        acc += w.max(0.0);
        if r < acc {
            return state;
        }
    }
    table[table.len() - 1].1
}

fn wander_point(from: Vec3, field: &Field, rng: &mut fastrand::Rng) -> Vec3 {
    let angle = rng.f32() * std::f32::consts::TAU;
    let dist = 1.0 + rng.f32() * (WANDER_RADIUS - 1.0);
    let limit = field.half_extent - 1.0;
    Vec3::new(
        (from.x + angle.cos() * dist).clamp(-limit, limit),
        from.y,
        (from.z + angle.sin() * dist).clamp(-limit, limit),
    )
}

fn snapshot_pos(snapshots: &[FenSnapshot], entity: hecs::Entity) -> Option<Vec3> {
    snapshots.iter().find(|s| s.entity == entity).map(|s| s.pos)
}
