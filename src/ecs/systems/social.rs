use glam::Vec3;

use crate::ecs::components::{
    Behavior, BehaviorState, Drives, MoveTarget, Position, SocialLink, SoftBody,
};
use crate::spatial::{FenSnapshot, SpatialHash};

/// Peers within this range count as "nearby" for the ambient attention link.
const NEIGHBOR_RADIUS: f32 = 8.0;
const NEIGHBOR_RADIUS_SQ: f32 = NEIGHBOR_RADIUS * NEIGHBOR_RADIUS;
/// Social visits start within this range.
const SOCIAL_RADIUS: f32 = 4.0;
const SOCIAL_RADIUS_SQ: f32 = SOCIAL_RADIUS * SOCIAL_RADIUS;
/// Per-tick base probability two loafing creatures strike up a visit.
const VISIT_CHANCE: f32 = 0.004;
/// Visiting creatures sidle up to about this far apart.
const VISIT_RANGE: f32 = 1.3;
/// Per-tick chance an approached partner joins the visit.
const RECIPROCATE_CHANCE: f32 = 0.02;
/// Cooldown range between visits, seconds.
const VISIT_COOLDOWN_MIN: f32 = 20.0;
const VISIT_COOLDOWN_MAX: f32 = 40.0;

enum SocialCmd {
    SetLink {
        entity: hecs::Entity,
        partner: Option<hecs::Entity>,
    },
    StartVisit {
        a: hecs::Entity,
        b: hecs::Entity,
    },
}

struct ActiveVisit {
    entity: hecs::Entity,
    pos: Vec3,
    partner: hecs::Entity,
    partner_pos: Option<Vec3>,
    partner_state: Option<BehaviorState>,
}

/// Buffers — pre-allocated, reused each tick.
pub struct SocialBuffers {
    commands: Vec<SocialCmd>,
    active: Vec<ActiveVisit>,
}

impl SocialBuffers {
    pub fn new() -> Self {
        Self {
            commands: Vec::with_capacity(64),
            active: Vec::with_capacity(64),
        }
    }
}

impl Default for SocialBuffers {
    fn default() -> Self {
        Self::new()
    }
}

/// Maintain attention links, steer active visits, and form new pairs.
pub fn update(
    world: &mut hecs::World,
    snapshots: &[FenSnapshot],
    grid: &SpatialHash,
    bufs: &mut SocialBuffers,
    rng: &mut fastrand::Rng,
) {
    steer_visits(world, bufs, rng);
    phase_read(snapshots, grid, bufs, rng);
    phase_write(world, bufs, rng);
}

/// Phase A: steer creatures already visiting a partner.
fn steer_visits(world: &mut hecs::World, bufs: &mut SocialBuffers, rng: &mut fastrand::Rng) {
    bufs.active.clear();

    // Pass 1 (read): collect current visitors.
    for (entity, (pos, behavior, link)) in
        world.query::<(&Position, &Behavior, &SocialLink)>().iter()
    {
        if behavior.state != BehaviorState::Social {
            continue;
        }
        let Some(partner) = link.0 else {
            continue;
        };
        bufs.active.push(ActiveVisit {
            entity,
            pos: pos.0,
            partner,
            partner_pos: None,
            partner_state: None,
        });
    }

    // Resolve partner positions and states.
    for visit in bufs.active.iter_mut() {
        if let Ok(pos) = world.get::<&Position>(visit.partner) {
            visit.partner_pos = Some(pos.0);
        }
        if let Ok(behavior) = world.get::<&Behavior>(visit.partner) {
            visit.partner_state = Some(behavior.state);
        }
    }

    // Pass 2 (write): approach, face, maybe pull the partner in.
    for visit in bufs.active.iter() {
        let Some(partner_pos) = visit.partner_pos else {
            // Partner despawned — the generational entity id fails lookup.
            give_up(world, visit.entity, rng);
            continue;
        };

        let to_partner = Vec3::new(
            partner_pos.x - visit.pos.x,
            0.0,
            partner_pos.z - visit.pos.z,
        );
        let dist = to_partner.length();

        if let Ok(mut soft) = world.get::<&mut SoftBody>(visit.entity) {
            soft.look_target = Some(partner_pos);
        }
        if let Ok(mut target) = world.get::<&mut MoveTarget>(visit.entity) {
            if dist > VISIT_RANGE {
                let dir = to_partner / dist;
                target.0 = Some(partner_pos - dir * (VISIT_RANGE * 0.8));
            } else {
                target.0 = None;
            }
        }

        // Close enough: the visit may spread to the partner.
        if dist <= VISIT_RANGE * 1.5
            && visit
                .partner_state
                .map(can_be_visited)
                .unwrap_or(false)
            && rng.f32() < RECIPROCATE_CHANCE
        {
            let duration = 4.0 + rng.f32() * 3.0;
            begin_visit(world, visit.partner, visit.entity, duration, rng);
        }
    }
}

fn give_up(world: &mut hecs::World, entity: hecs::Entity, rng: &mut fastrand::Rng) {
    if let Ok(mut behavior) = world.get::<&mut Behavior>(entity) {
        behavior.enter(BehaviorState::Idle, 0.5 + rng.f32() * 1.5);
    }
    if let Ok(mut target) = world.get::<&mut MoveTarget>(entity) {
        target.0 = None;
    }
    if let Ok(mut soft) = world.get::<&mut SoftBody>(entity) {
        soft.look_target = None;
    }
    if let Ok(mut link) = world.get::<&mut SocialLink>(entity) {
        link.0 = None;
    }
}

/// Phase B: read-only pass over snapshots — nearest-peer links and new pairs.
fn phase_read(
    snapshots: &[FenSnapshot],
    grid: &SpatialHash,
    bufs: &mut SocialBuffers,
    rng: &mut fastrand::Rng,
) {
    bufs.commands.clear();

    let count = snapshots.len();
    for my_idx in 0..count {
        let me = &snapshots[my_idx];
        let mut nearest: Option<(f32, hecs::Entity)> = None;

        grid.query_neighbors(me.pos, |neighbor_idx| {
            let ni = neighbor_idx as usize;
            if ni == my_idx || ni >= count {
                return;
            }
            let them = &snapshots[ni];
            let delta = me.pos - them.pos;
            let dist_sq = delta.length_squared();

            // --- Ambient attention link: nearest peer in range ---
            if dist_sq < NEIGHBOR_RADIUS_SQ
                && nearest.map_or(true, |(best, _)| dist_sq < best)
            {
                nearest = Some((dist_sq, them.entity));
            }

            // --- New visits (each pair considered once) ---
            if my_idx >= ni || dist_sq > SOCIAL_RADIUS_SQ {
                return;
            }
            if !can_be_visited(me.state) || !can_be_visited(them.state) {
                return;
            }
            let chance = VISIT_CHANCE
                * (0.5 + me.personality.sociability)
                * (0.5 + them.personality.sociability);
            if rng.f32() < chance {
                bufs.commands.push(SocialCmd::StartVisit {
                    a: me.entity,
                    b: them.entity,
                });
            }
        });

        bufs.commands.push(SocialCmd::SetLink {
            entity: me.entity,
            partner: nearest.map(|(_, e)| e),
        });
    }
}

/// Phase C: apply commands to the ECS world.
fn phase_write(world: &mut hecs::World, bufs: &mut SocialBuffers, rng: &mut fastrand::Rng) {
    for cmd in bufs.commands.drain(..) {
        match cmd {
            SocialCmd::SetLink { entity, partner } => {
                // Visitors keep their partner link until the visit ends.
                let visiting = world
                    .get::<&Behavior>(entity)
                    .map(|b| b.state == BehaviorState::Social)
                    .unwrap_or(false);
                if visiting {
                    continue;
                }
                if let Ok(mut link) = world.get::<&mut SocialLink>(entity) {
                    link.0 = partner;
                }
            }
            SocialCmd::StartVisit { a, b } => {
                if !can_start_visit(world, a) || !can_start_visit(world, b) {
                    continue;
                }
                let duration = 4.0 + rng.f32() * 3.0;
                begin_visit(world, a, b, duration, rng);
                begin_visit(world, b, a, duration, rng);
            }
        }
    }
}

fn can_be_visited(state: BehaviorState) -> bool {
    matches!(
        state,
        BehaviorState::Idle | BehaviorState::Grazing | BehaviorState::Looking
    )
}

/// Visit eligibility: loafing state and cooled down.
fn can_start_visit(world: &hecs::World, entity: hecs::Entity) -> bool {
    let state_ok = world
        .get::<&Behavior>(entity)
        .map(|b| can_be_visited(b.state))
        .unwrap_or(false);
    let cooled = world
        .get::<&Drives>(entity)
        .map(|d| d.social_cooldown <= 0.0)
        .unwrap_or(false);
    state_ok && cooled
}

fn begin_visit(
    world: &mut hecs::World,
    entity: hecs::Entity,
    partner: hecs::Entity,
    duration: f32,
    rng: &mut fastrand::Rng,
) {
    if let Ok(mut behavior) = world.get::<&mut Behavior>(entity) {
        if behavior.state == BehaviorState::Social {
            return;
        }
        behavior.enter(BehaviorState::Social, duration);
    }
    if let Ok(mut link) = world.get::<&mut SocialLink>(entity) {
        link.0 = Some(partner);
    }
    if let Ok(mut drives) = world.get::<&mut Drives>(entity) {
        drives.social_cooldown =
            VISIT_COOLDOWN_MIN + rng.f32() * (VISIT_COOLDOWN_MAX - VISIT_COOLDOWN_MIN);
    }
}
