use glam::Vec3;

use crate::ecs::components::{
    Affection, Behavior, BehaviorState, Mood, MoveTarget, Personality, Position, SoftBody,
    Velocity,
};
use crate::field::{Field, PlayerSnapshot};

/// A running player inside this range can spook a creature.
const FLEE_RADIUS: f32 = 6.0;
/// Minimum alertness before a creature registers the threat at all.
const FLEE_ALERTNESS: f32 = 0.25;
/// Spook rolls per second at flightiness 1.0. Scaled by dt so tame creatures
/// can actually hold their nerve under a sustained threat.
const FLEE_ROLL_RATE: f32 = 3.0;
/// How far the flee waypoint is projected away from the player.
const FLEE_DISTANCE_MIN: f32 = 6.0;
const FLEE_DISTANCE_MAX: f32 = 9.0;
/// Flee state length — matches the state machine's give-up timeout.
const FLEE_DURATION: f32 = 3.0;
/// A sleeper wakes when the player gets this close.
const WAKE_RADIUS: f32 = 2.0;
/// A rester gets up when the player is this close and it is paying attention.
const REST_DISTURB_RADIUS: f32 = 4.0;
const REST_DISTURB_ALERTNESS: f32 = 0.5;
/// Pointer lingering this long turns the head.
const HOVER_LOOK_TIME: f32 = 1.5;
/// Pointer lingering this long pulls the creature into curiosity.
const HOVER_CURIOUS_TIME: f32 = 3.5;
/// A calm, close player can draw a curious approach.
const CURIOUS_RADIUS: f32 = 2.5;

/// Player-proximity reactions: spooks, wakes, hover attention. Runs before
/// the state machine so a flee decision preempts this tick's idle roll.
pub fn update(
    world: &mut hecs::World,
    dt: f32,
    player: &PlayerSnapshot,
    field: &Field,
    rng: &mut fastrand::Rng,
) {
    for (_, (behavior, target, vel, pos, personality, mood, affection, soft)) in world
        .query_mut::<(
            &mut Behavior,
            &mut MoveTarget,
            &mut Velocity,
            &Position,
            &Personality,
            &mut Mood,
            &mut Affection,
            &mut SoftBody,
        )>()
    {
        let player_dist = pos.0.distance(player.position);

        if affection.is_hovered {
            affection.hover_time += dt;
        } else {
            affection.hover_time = 0.0;
        }

        // --- Flee check: running player nearby, flightiness-gated roll ---
        // Sleepers wake first (below); only then can they spook.
        let flee_immune = matches!(
            behavior.state,
            BehaviorState::Petted
                | BehaviorState::Bliss
                | BehaviorState::Fleeing
                | BehaviorState::Sleeping
        );
        if !flee_immune
            && player.is_running
            && player_dist < FLEE_RADIUS
            && mood.alertness > FLEE_ALERTNESS
            && rng.f32() < personality.flightiness * FLEE_ROLL_RATE * dt
        {
            let away = flat_dir(pos.0 - player.position, rng);
            let dist = FLEE_DISTANCE_MIN + rng.f32() * (FLEE_DISTANCE_MAX - FLEE_DISTANCE_MIN);
            let limit = field.half_extent - 1.0;
            target.0 = Some(Vec3::new(
                (pos.0.x + away.x * dist).clamp(-limit, limit),
                pos.0.y,
                (pos.0.z + away.z * dist).clamp(-limit, limit),
            ));
            behavior.summons = None;
            behavior.enter(BehaviorState::Fleeing, FLEE_DURATION);
            soft.look_target = None;
            affection.is_petted = false;
            mood.alertness = 1.0;
            // Initial kick so the spook reads immediately.
            vel.0 += away * 1.5;
            continue;
        }

        match behavior.state {
            BehaviorState::Sleeping => {
                if player_dist < WAKE_RADIUS || affection.is_hovered {
                    behavior.enter(BehaviorState::Looking, 1.5 + rng.f32() * 1.5);
                    behavior.variant = 0; // look at the player
                    mood.alertness = (mood.alertness + 0.3).min(1.0);
                }
            }
            BehaviorState::Resting => {
                if player_dist < REST_DISTURB_RADIUS && mood.alertness > REST_DISTURB_ALERTNESS {
                    behavior.enter(BehaviorState::Looking, 1.5 + rng.f32() * 1.5);
                    behavior.variant = 0;
                }
            }
            BehaviorState::Idle | BehaviorState::Grazing | BehaviorState::Looking => {
                if affection.hover_time >= HOVER_CURIOUS_TIME {
                    behavior.enter(BehaviorState::Curious, 0.0);
                    target.0 = None;
                } else if affection.hover_time >= HOVER_LOOK_TIME
                    && behavior.state != BehaviorState::Looking
                {
                    behavior.enter(BehaviorState::Looking, 1.5 + rng.f32() * 2.0);
                    behavior.variant = 0;
                    target.0 = None;
                } else if player_dist < CURIOUS_RADIUS
                    && !player.is_running
                    && rng.f32() < personality.curiosity * 0.5 * dt
                {
                    behavior.enter(BehaviorState::Curious, 0.0);
                    target.0 = None;
                }
            }
            _ => {}
        }
    }
}

/// Normalized XZ direction; falls back to a random heading when degenerate.
fn flat_dir(v: Vec3, rng: &mut fastrand::Rng) -> Vec3 {
    let flat = Vec3::new(v.x, 0.0, v.z);
    if flat.length_squared() > 1e-6 {
        flat.normalize()
    } else {
        let angle = rng.f32() * std::f32::consts::TAU;
        Vec3::new(angle.cos(), 0.0, angle.sin())
    }
}
