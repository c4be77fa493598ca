//! Per-tick system pipeline. Order matters:
//! awareness and behavior decide, movement integrates, the spatial grid is
//! rebuilt from the fresh positions, then the neighbor-driven systems
//! (collision, social) run against it. Mood and soft-body are pure followers
//! and go last. Systems that only decide (behavior, micro) read the previous
//! tick's snapshots; one tick of staleness is invisible at 60 Hz.

pub mod awareness;
pub mod behavior;
pub mod collision;
pub mod micro;
pub mod mood;
pub mod movement;
pub mod social;
pub mod softbody;
pub mod spatial;

use crate::field::{Field, PlayerSnapshot};
use crate::spatial::{FenSnapshot, SpatialHash};

/// Scratch buffers reused across ticks so the pipeline stays allocation-free
/// once warm.
pub struct TickBuffers {
    pub snapshots: Vec<FenSnapshot>,
    pub separation: collision::SeparationBuffers,
    pub social: social::SocialBuffers,
    pub responses: Vec<(hecs::Entity, f32)>,
}

impl TickBuffers {
    pub fn new(capacity: usize) -> Self {
        Self {
            snapshots: Vec::with_capacity(capacity),
            separation: collision::SeparationBuffers::new(capacity),
            social: social::SocialBuffers::new(),
            responses: Vec::new(),
        }
    }
}

/// Run one fixed-timestep simulation tick over the whole flock.
pub fn tick(
    world: &mut hecs::World,
    dt: f32,
    player: &PlayerSnapshot,
    field: &mut Field,
    grid: &mut SpatialHash,
    bufs: &mut TickBuffers,
    rng: &mut fastrand::Rng,
) {
    awareness::update(world, dt, player, field, rng);
    behavior::update(world, dt, player, &bufs.snapshots, field, rng);
    micro::update(world, dt, &bufs.snapshots, grid, &mut bufs.responses, rng);
    movement::integrate(world, dt, field);
    spatial::rebuild(world, grid, &mut bufs.snapshots);
    collision::resolve(world, &bufs.snapshots, grid, field, &mut bufs.separation);
    social::update(world, &bufs.snapshots, grid, &mut bufs.social, rng);
    mood::update(world, dt, player);
    softbody::update(world, dt, &bufs.snapshots);
}
