//! The engine's external boundary: pointer hover, petting sessions, stroke
//! input, and the "call to me" whistle. All state changes flow through these
//! functions or the creatures' own timeouts — nothing here is frame-driven.

use glam::Vec3;

use crate::ecs::components::{
    Affection, Behavior, BehaviorState, MoveTarget, Personality, Position, SoftBody, Summons,
    Velocity,
};

/// How far from the caller the approach waypoint sits.
const COMFORT_DISTANCE: f32 = 1.8;
/// Response delay per point of shyness, seconds.
const SHYNESS_DELAY: f32 = 1.0;
/// Minimum dawdle before answering a call.
const BASE_DELAY: f32 = 0.2;
/// Wool jiggle per unit of stroke speed.
const STROKE_WOOL_GAIN: f32 = 0.3;
/// Petting sessions longer than this leave a lasting contentment bump.
const LONG_SESSION: f32 = 5.0;

/// Begin a petting session. Returns false if the creature is mid-flee (you
/// cannot pet a bolting sheep) or the entity is gone.
pub fn start_petting(world: &mut hecs::World, entity: hecs::Entity) -> bool {
    let Ok(mut behavior) = world.get::<&mut Behavior>(entity) else {
        return false;
    };
    if behavior.state == BehaviorState::Fleeing {
        return false;
    }
    if behavior.state != BehaviorState::Bliss && behavior.state != BehaviorState::Petted {
        behavior.enter(BehaviorState::Petted, 0.0);
    }
    drop(behavior);

    if let Ok(mut affection) = world.get::<&mut Affection>(entity) {
        affection.is_petted = true;
        affection.has_been_petted = true;
        affection.bliss_hold = 0.0;
    }
    if let Ok(mut target) = world.get::<&mut MoveTarget>(entity) {
        target.0 = None;
    }
    if let Ok(mut vel) = world.get::<&mut Velocity>(entity) {
        vel.0 = Vec3::ZERO;
    }
    true
}

/// End a petting session. `duration` is how long the session ran; long, calm
/// sessions leave the creature a little more content.
pub fn end_petting(world: &mut hecs::World, entity: hecs::Entity, duration: f32) {
    if let Ok(mut affection) = world.get::<&mut Affection>(entity) {
        affection.is_petted = false;
        affection.stroke_speed = 0.0;
        affection.bliss_hold = 0.0;
    }
    if let Ok(mut behavior) = world.get::<&mut Behavior>(entity) {
        if behavior.state == BehaviorState::Petted {
            behavior.enter(BehaviorState::Idle, 1.0 + duration.min(2.0));
        }
        // Bliss lingers and times out on its own.
    }
    if duration > LONG_SESSION {
        if let Ok(mut mood) = world.get::<&mut crate::ecs::components::Mood>(entity) {
            mood.contentment = (mood.contentment + 0.1).min(1.0);
        }
    }
}

/// Continuous petting input. Speed feeds happiness growth and wool jiggle;
/// ignored outside a session.
pub fn on_stroke(world: &mut hecs::World, entity: hecs::Entity, _dx: f32, _dy: f32, speed: f32) {
    let petted = world
        .get::<&Affection>(entity)
        .map(|a| a.is_petted)
        .unwrap_or(false);
    if !petted {
        return;
    }
    if let Ok(mut affection) = world.get::<&mut Affection>(entity) {
        affection.stroke_speed = affection.stroke_speed.max(speed);
    }
    if let Ok(mut soft) = world.get::<&mut SoftBody>(entity) {
        soft.wool_vel += speed * STROKE_WOOL_GAIN;
    }
}

/// Pointer entered the creature.
pub fn on_hover_start(world: &mut hecs::World, entity: hecs::Entity) {
    if let Ok(mut affection) = world.get::<&mut Affection>(entity) {
        affection.is_hovered = true;
    }
}

/// Pointer left the creature.
pub fn on_hover_end(world: &mut hecs::World, entity: hecs::Entity) {
    if let Ok(mut affection) = world.get::<&mut Affection>(entity) {
        affection.is_hovered = false;
        affection.hover_time = 0.0;
    }
}

/// "Come here" event. The creature beelines to a spot a comfort distance from
/// the caller, on its own side — shy creatures dawdle before committing.
pub fn on_called(world: &mut hecs::World, entity: hecs::Entity, source: Vec3) -> bool {
    let Ok(pos) = world.get::<&Position>(entity) else {
        return false;
    };
    let pos = pos.0;
    let shyness = world
        .get::<&Personality>(entity)
        .map(|p| p.shyness)
        .unwrap_or(0.5);

    let Ok(mut behavior) = world.get::<&mut Behavior>(entity) else {
        return false;
    };
    if matches!(
        behavior.state,
        BehaviorState::Petted | BehaviorState::Bliss | BehaviorState::Fleeing
    ) {
        return false;
    }

    let away = Vec3::new(pos.x - source.x, 0.0, pos.z - source.z);
    let dir = if away.length_squared() > 1e-6 {
        away.normalize()
    } else {
        Vec3::Z
    };
    behavior.summons = Some(Summons {
        target: source + dir * COMFORT_DISTANCE,
        delay: BASE_DELAY + shyness * SHYNESS_DELAY,
    });
    behavior.enter(BehaviorState::Called, 0.0);
    drop(behavior);

    if let Ok(mut target) = world.get::<&mut MoveTarget>(entity) {
        target.0 = None;
    }
    true
}
