//! Top-level simulation driver: owns the world, the field, and the scratch
//! buffers, and steps everything on a fixed 60 Hz timestep behind a
//! wall-clock accumulator.

use glam::Vec3;

use crate::ecs::components::{Behavior, BehaviorState, Position, Stature};
use crate::ecs::systems::{self, TickBuffers};
use crate::effects::Effects;
use crate::fen;
use crate::field::{Field, PlayerSnapshot};
use crate::spatial::SpatialHash;

/// Fixed simulation timestep.
pub const TICK_DT: f32 = 1.0 / 60.0;
/// Wall-clock debt is clamped so a stall never triggers a tick avalanche.
const MAX_ACCUMULATOR: f64 = 0.25;
/// Spatial grid cell. Must cover the largest neighbor query radius
/// (bleat earshot, 10 units) so the 3x3 cell walk never misses a peer.
const GRID_CELL: f32 = 10.0;
const GRID_TABLE: usize = 1024;
/// Census log cadence, seconds.
const CENSUS_INTERVAL: f32 = 5.0;

#[derive(Debug, Clone)]
pub struct PastureConfig {
    /// Fence half-width; the pasture spans [-half_extent, half_extent] on XZ.
    pub half_extent: f32,
    /// Flock size at startup.
    pub fen_count: usize,
    /// Fixed seed for reproducible runs; None draws from entropy.
    pub seed: Option<u64>,
    /// Seconds between drift-in arrivals once the sim is running.
    /// Zero disables drifting.
    pub drift_spawn_interval: f32,
    /// Drift-in stops once the flock reaches this size.
    pub max_fens: usize,
}

impl Default for PastureConfig {
    fn default() -> Self {
        Self {
            half_extent: 30.0,
            fen_count: 8,
            seed: None,
            drift_spawn_interval: 0.0,
            max_fens: 24,
        }
    }
}

pub struct Pasture {
    world: hecs::World,
    field: Field,
    grid: SpatialHash,
    bufs: TickBuffers,
    effects: Effects,
    rng: fastrand::Rng,
    config: PastureConfig,
    accumulator: f64,
    tick_count: u64,
    drift_timer: f32,
    census_timer: f32,
    mote_scratch: Vec<(Vec3, BehaviorState, f32)>,
}

impl Pasture {
    pub fn new(config: PastureConfig) -> Self {
        let mut rng = match config.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        let mut world = hecs::World::new();
        let field = Field::flat(config.half_extent);
        let player = PlayerSnapshot::stationary(Vec3::ZERO);

        let spawned = fen::spawn_fens(&mut world, config.fen_count, &field, &player, &mut rng);
        log::info!("pasture ready: {} fens, fence +/-{}", spawned.len(), config.half_extent);

        let capacity = config.max_fens.max(config.fen_count);
        Self {
            world,
            field,
            grid: SpatialHash::new(GRID_CELL, GRID_TABLE),
            bufs: TickBuffers::new(capacity),
            effects: Effects::new(),
            rng,
            drift_timer: config.drift_spawn_interval,
            config,
            accumulator: 0.0,
            tick_count: 0,
            census_timer: 0.0,
            mote_scratch: Vec::new(),
        }
    }

    /// Feed wall-clock time; runs zero or more fixed ticks. Returns how many
    /// ticks ran.
    pub fn advance(&mut self, wall_dt: f64, player: &PlayerSnapshot) -> u32 {
        self.accumulator = (self.accumulator + wall_dt).min(MAX_ACCUMULATOR);
        let mut ran = 0;
        while self.accumulator >= TICK_DT as f64 {
            self.tick(TICK_DT, player);
            self.accumulator -= TICK_DT as f64;
            ran += 1;
        }
        ran
    }

    /// One fixed simulation step.
    pub fn tick(&mut self, dt: f32, player: &PlayerSnapshot) {
        systems::tick(
            &mut self.world,
            dt,
            player,
            &mut self.field,
            &mut self.grid,
            &mut self.bufs,
            &mut self.rng,
        );
        self.field.update_balls(dt);

        self.mote_scratch.clear();
        for (_, (pos, behavior, stature)) in self
            .world
            .query::<(&Position, &Behavior, &Stature)>()
            .iter()
        {
            self.mote_scratch.push((pos.0, behavior.state, stature.scale));
        }
        self.effects
            .spawn_from_behaviors(&self.mote_scratch, &mut self.rng, dt);
        self.effects.update(dt);

        self.drift_in(dt, player);

        self.tick_count += 1;
        self.census_timer += dt;
        if self.census_timer >= CENSUS_INTERVAL {
            self.census_timer = 0.0;
            self.log_census();
        }
    }

    /// Occasional newcomer wandering in from past the fence.
    fn drift_in(&mut self, dt: f32, player: &PlayerSnapshot) {
        if self.config.drift_spawn_interval <= 0.0 || self.world.len() as usize >= self.config.max_fens
        {
            return;
        }
        self.drift_timer -= dt;
        if self.drift_timer > 0.0 {
            return;
        }
        self.drift_timer = self.config.drift_spawn_interval * (0.75 + self.rng.f32() * 0.5);

        let spawned = fen::spawn_fens(&mut self.world, 1, &self.field, player, &mut self.rng);
        if let Some(&e) = spawned.first() {
            log::debug!("fen {:?} drifted in ({} total)", e, self.world.len());
        }
    }

    fn log_census(&self) {
        let mut counts = [0u32; 12];
        for (_, behavior) in self.world.query::<&Behavior>().iter() {
            counts[behavior.state as usize] += 1;
        }
        log::info!(
            "census t={:.0}s fens={} idle={} graze={} look={} stretch={} rest={} sleep={} \
             social={} curious={} pet={} bliss={} called={} flee={} motes={}",
            self.tick_count as f32 * TICK_DT,
            self.world.len(),
            counts[BehaviorState::Idle as usize],
            counts[BehaviorState::Grazing as usize],
            counts[BehaviorState::Looking as usize],
            counts[BehaviorState::Stretching as usize],
            counts[BehaviorState::Resting as usize],
            counts[BehaviorState::Sleeping as usize],
            counts[BehaviorState::Social as usize],
            counts[BehaviorState::Curious as usize],
            counts[BehaviorState::Petted as usize],
            counts[BehaviorState::Bliss as usize],
            counts[BehaviorState::Called as usize],
            counts[BehaviorState::Fleeing as usize],
            self.effects.count(),
        );
    }

    pub fn world(&self) -> &hecs::World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut hecs::World {
        &mut self.world
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn field_mut(&mut self) -> &mut Field {
        &mut self.field
    }

    pub fn effects(&self) -> &Effects {
        &self.effects
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn fen_count(&self) -> u32 {
        self.world.len()
    }
}
