use crate::ecs::components::{Behavior, Personality, Position, Stature, Velocity};
use crate::spatial::{FenSnapshot, SpatialHash};

/// Rebuild the spatial hash grid and snapshot cache from current positions.
pub fn rebuild(world: &hecs::World, grid: &mut SpatialHash, snapshots: &mut Vec<FenSnapshot>) {
    grid.clear();
    snapshots.clear();
    for (entity, (pos, vel, behavior, personality, stature)) in world
        .query::<(&Position, &Velocity, &Behavior, &Personality, &Stature)>()
        .iter()
    {
        let idx = snapshots.len() as u32;
        snapshots.push(FenSnapshot {
            entity,
            pos: pos.0,
            vel: vel.0,
            state: behavior.state,
            personality: *personality,
            radius: stature.radius,
        });
        grid.insert(pos.0, idx);
    }
}
