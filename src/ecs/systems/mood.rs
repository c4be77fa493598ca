use crate::ecs::components::{Affection, Behavior, BehaviorState, Drives, Mood, Position};
use crate::field::PlayerSnapshot;

/// Exponential relaxation rate toward the 0.5 mood baseline, per second.
const RELAX_RATE: f32 = 0.05;
/// Player inside this range raises alertness.
const NOTICE_RADIUS: f32 = 8.0;
/// Happiness drain per second while nobody is petting.
const HAPPINESS_DECAY: f32 = 0.04;
/// Stroke speed smoothing decay, per second.
const STROKE_DECAY: f32 = 4.0;

/// Nudge moods from the current state, relax toward baseline, clamp, and
/// advance tiredness/happiness. Mood only ever biases probabilities elsewhere.
pub fn update(world: &mut hecs::World, dt: f32, player: &PlayerSnapshot) {
    for (_, (behavior, mood, drives, affection, pos)) in world.query_mut::<(
        &Behavior,
        &mut Mood,
        &mut Drives,
        &mut Affection,
        &Position,
    )>() {
        // --- Contentment ---
        mood.contentment += dt
            * match behavior.state {
                BehaviorState::Grazing => 0.03,
                BehaviorState::Resting | BehaviorState::Sleeping => 0.05,
                BehaviorState::Petted => 0.15,
                BehaviorState::Bliss => 0.25,
                BehaviorState::Fleeing => -0.40,
                _ => 0.0,
            };

        // --- Alertness ---
        let player_dist = pos.0.distance(player.position);
        if player_dist < NOTICE_RADIUS {
            let proximity = 1.0 - player_dist / NOTICE_RADIUS;
            let urgency = if player.is_running { 1.0 } else { 0.4 };
            mood.alertness += proximity * urgency * dt;
        }
        mood.alertness += dt
            * match behavior.state {
                BehaviorState::Fleeing => 0.8,
                BehaviorState::Sleeping => -0.3,
                _ => 0.0,
            };

        // --- Playfulness ---
        mood.playfulness += dt
            * match behavior.state {
                BehaviorState::Social | BehaviorState::Curious => 0.10,
                BehaviorState::Petted | BehaviorState::Bliss => 0.05,
                _ => 0.0,
            };

        // Relax toward baseline, then clamp hard.
        mood.contentment += (0.5 - mood.contentment) * RELAX_RATE * dt;
        mood.alertness += (0.5 - mood.alertness) * RELAX_RATE * dt;
        mood.playfulness += (0.5 - mood.playfulness) * RELAX_RATE * dt;
        mood.contentment = mood.contentment.clamp(0.0, 1.0);
        mood.alertness = mood.alertness.clamp(0.0, 1.0);
        mood.playfulness = mood.playfulness.clamp(0.0, 1.0);

        // --- Tiredness ---
        drives.tiredness += dt
            * match behavior.state {
                BehaviorState::Resting => -0.06,
                BehaviorState::Sleeping => -0.12,
                BehaviorState::Fleeing => 0.10,
                BehaviorState::Idle
                | BehaviorState::Called
                | BehaviorState::Social
                | BehaviorState::Curious => 0.012,
                _ => 0.006,
            };
        drives.tiredness = drives.tiredness.clamp(0.0, 1.0);

        // --- Happiness ---
        if affection.is_petted {
            affection.happiness += (0.15 + affection.stroke_speed * 0.25) * dt;
            affection.stroke_speed -= affection.stroke_speed * STROKE_DECAY * dt;
        } else {
            affection.happiness -= HAPPINESS_DECAY * dt;
            affection.stroke_speed = 0.0;
        }
        affection.happiness = affection.happiness.clamp(0.0, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::{MoveTarget, Personality, SocialLink, SoftBody, Stature, Velocity};
    use glam::Vec3;

    fn subject(world: &mut hecs::World, state: BehaviorState) -> hecs::Entity {
        let mut behavior = Behavior::new();
        behavior.enter(state, 100.0);
        world.spawn((
            Position(Vec3::ZERO),
            Velocity(Vec3::ZERO),
            MoveTarget::default(),
            behavior,
            Mood::neutral(),
            Drives {
                tiredness: 0.5,
                social_cooldown: 0.0,
            },
            Affection::new(),
            Personality {
                shyness: 0.5,
                friendliness: 0.5,
                curiosity: 0.5,
                flightiness: 0.5,
                laziness: 0.5,
                sociability: 0.5,
            },
            SocialLink::default(),
            SoftBody::new(0.0, 1.0, 0.0),
            Stature {
                scale: 1.0,
                radius: 0.6,
            },
        ))
    }

    fn far_player() -> PlayerSnapshot {
        PlayerSnapshot::stationary(Vec3::splat(100.0))
    }

    #[test]
    fn scalars_stay_clamped_through_a_chaotic_session() {
        let mut world = hecs::World::new();
        let mut rng = fastrand::Rng::with_seed(13);
        let e = subject(&mut world, BehaviorState::Idle);
        let states = [
            BehaviorState::Fleeing,
            BehaviorState::Bliss,
            BehaviorState::Sleeping,
            BehaviorState::Petted,
            BehaviorState::Social,
        ];

        let near = PlayerSnapshot {
            position: Vec3::new(1.0, 0.0, 0.0),
            velocity: Vec3::new(6.0, 0.0, 0.0),
            is_running: true,
            is_moving: true,
        };

        for tick in 0..20_000 {
            if tick % 97 == 0 {
                let next = states[rng.usize(0..states.len())];
                let mut b = world.get::<&mut Behavior>(e).unwrap();
                b.enter(next, 100.0);
                let mut a = world.get::<&mut Affection>(e).unwrap();
                a.is_petted = next == BehaviorState::Petted || next == BehaviorState::Bliss;
                a.stroke_speed = rng.f32() * 3.0;
            }
            update(&mut world, 1.0 / 60.0, &near);

            let mood = *world.get::<&Mood>(e).unwrap();
            let drives = *world.get::<&Drives>(e).unwrap();
            let affection = *world.get::<&Affection>(e).unwrap();
            for v in [
                mood.contentment,
                mood.alertness,
                mood.playfulness,
                drives.tiredness,
                affection.happiness,
            ] {
                assert!((0.0..=1.0).contains(&v), "scalar out of range: {v}");
            }
        }
    }

    #[test]
    fn happiness_decays_without_petting() {
        let mut world = hecs::World::new();
        let e = subject(&mut world, BehaviorState::Idle);
        world.get::<&mut Affection>(e).unwrap().happiness = 0.9;

        for _ in 0..600 {
            update(&mut world, 1.0 / 60.0, &far_player());
        }
        let h = world.get::<&Affection>(e).unwrap().happiness;
        assert!(h < 0.9 - 0.3, "happiness did not decay: {h}");
    }

    #[test]
    fn happiness_rises_while_stroked() {
        let mut world = hecs::World::new();
        let e = subject(&mut world, BehaviorState::Petted);
        {
            let mut a = world.get::<&mut Affection>(e).unwrap();
            a.is_petted = true;
        }

        for _ in 0..600 {
            // Fresh stroke input every tick, as a petting session would feed.
            world.get::<&mut Affection>(e).unwrap().stroke_speed = 1.5;
            update(&mut world, 1.0 / 60.0, &far_player());
        }
        let h = world.get::<&Affection>(e).unwrap().happiness;
        assert!(h > 0.8, "happiness did not build: {h}");
    }

    #[test]
    fn sleep_drains_tiredness_faster_than_rest() {
        let mut world = hecs::World::new();
        let sleeper = subject(&mut world, BehaviorState::Sleeping);
        let rester = subject(&mut world, BehaviorState::Resting);

        for _ in 0..600 {
            update(&mut world, 1.0 / 60.0, &far_player());
        }
        let slept = world.get::<&Drives>(sleeper).unwrap().tiredness;
        let rested = world.get::<&Drives>(rester).unwrap().tiredness;
        assert!(slept < rested);
        assert!(rested < 0.5);
    }

    #[test]
    fn running_player_nearby_raises_alertness() {
        let mut world = hecs::World::new();
        let e = subject(&mut world, BehaviorState::Idle);
        let near = PlayerSnapshot {
            position: Vec3::new(1.0, 0.0, 0.0),
            velocity: Vec3::new(6.0, 0.0, 0.0),
            is_running: true,
            is_moving: true,
        };
        for _ in 0..120 {
            update(&mut world, 1.0 / 60.0, &near);
        }
        assert!(world.get::<&Mood>(e).unwrap().alertness > 0.6);
    }
}
