use glam::{Vec2, Vec3};

/// Ball friction applied each tick.
const BALL_FRICTION: f32 = 0.96;
/// Minimum ball speed before it stops rolling.
const BALL_MIN_SPEED: f32 = 0.05;
/// Bounce elasticity against the pasture fence.
const BALL_BOUNCE: f32 = 0.6;

/// Ground elevation provider. The behavior engine only ever samples it.
pub trait Terrain {
    fn height_at(&self, x: f32, z: f32) -> f32;
}

/// Perfectly flat pasture.
pub struct FlatGround;

impl Terrain for FlatGround {
    fn height_at(&self, _x: f32, _z: f32) -> f32 {
        0.0
    }
}

/// Gentle sine hills, enough to keep creatures glued to a non-trivial surface.
pub struct RollingGround {
    pub amplitude: f32,
    pub wavelength: f32,
}

impl Terrain for RollingGround {
    fn height_at(&self, x: f32, z: f32) -> f32 {
        let k = std::f32::consts::TAU / self.wavelength;
        self.amplitude * ((x * k).sin() * 0.6 + (z * k * 0.7).cos() * 0.4)
    }
}

/// Static disk collider on the pasture plane.
#[derive(Debug, Clone, Copy)]
pub struct Rock {
    pub pos: Vec2,
    pub radius: f32,
}

/// Result of a rock collision query.
#[derive(Debug, Clone, Copy)]
pub struct RockHit {
    /// Unit normal pointing away from the rock center.
    pub normal: Vec2,
    /// Penetration depth.
    pub overlap: f32,
}

/// Fixed list of rock colliders. Externally owned geometry — the behavior
/// engine only queries it.
#[derive(Default)]
pub struct RockField {
    rocks: Vec<Rock>,
}

impl RockField {
    pub fn new(rocks: Vec<Rock>) -> Self {
        Self { rocks }
    }

    /// Deepest overlapping rock for a circle at (x, z), if any.
    pub fn hit(&self, x: f32, z: f32, radius: f32) -> Option<RockHit> {
        let pos = Vec2::new(x, z);
        let mut best: Option<RockHit> = None;
        for rock in &self.rocks {
            let delta = pos - rock.pos;
            let dist_sq = delta.length_squared();
            let reach = rock.radius + radius;
            if dist_sq >= reach * reach {
                continue;
            }
            let dist = dist_sq.sqrt();
            let overlap = reach - dist;
            let normal = if dist > 1e-4 {
                delta / dist
            } else {
                Vec2::X
            };
            if best.map_or(true, |b| overlap > b.overlap) {
                best = Some(RockHit { normal, overlap });
            }
        }
        best
    }

    pub fn rocks(&self) -> &[Rock] {
        &self.rocks
    }
}

/// A pushable ball rolling on the pasture plane.
#[derive(Debug, Clone, Copy)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
}

impl Ball {
    pub fn new(pos: Vec2, radius: f32) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            radius,
        }
    }

    /// Impulse from a creature shouldering into the ball. Asymmetric:
    /// the ball moves, the creature does not bounce off it.
    pub fn push(&mut self, direction: Vec2, force: f32) {
        self.vel += direction * force;
    }

    /// Roll, slow down, bounce off the fence.
    pub fn update(&mut self, dt: f32, half_extent: f32) {
        self.pos += self.vel * dt;
        self.vel *= BALL_FRICTION;

        let limit = half_extent - self.radius;
        if self.pos.x < -limit {
            self.pos.x = -limit;
            self.vel.x = self.vel.x.abs() * BALL_BOUNCE;
        }
        if self.pos.x > limit {
            self.pos.x = limit;
            self.vel.x = -self.vel.x.abs() * BALL_BOUNCE;
        }
        if self.pos.y < -limit {
            self.pos.y = -limit;
            self.vel.y = self.vel.y.abs() * BALL_BOUNCE;
        }
        if self.pos.y > limit {
            self.pos.y = limit;
            self.vel.y = -self.vel.y.abs() * BALL_BOUNCE;
        }

        if self.vel.length_squared() < BALL_MIN_SPEED * BALL_MIN_SPEED {
            self.vel = Vec2::ZERO;
        }
    }
}

/// Per-frame snapshot of the player, refreshed by the embedding app.
/// Read-only from the creatures' perspective.
#[derive(Debug, Clone, Copy)]
pub struct PlayerSnapshot {
    pub position: Vec3,
    pub velocity: Vec3,
    pub is_running: bool,
    pub is_moving: bool,
}

impl PlayerSnapshot {
    pub fn stationary(position: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            is_running: false,
            is_moving: false,
        }
    }
}

/// World context passed into every tick — terrain, static colliders, balls.
/// Explicit argument instead of a global registry.
pub struct Field {
    /// Half-extent of the square pasture.
    pub half_extent: f32,
    pub terrain: Box<dyn Terrain>,
    pub rocks: RockField,
    pub balls: Vec<Ball>,
}

impl Field {
    pub fn flat(half_extent: f32) -> Self {
        Self {
            half_extent,
            terrain: Box::new(FlatGround),
            rocks: RockField::default(),
            balls: Vec::new(),
        }
    }

    /// Advance ball physics. Creature pushes are applied by the collision
    /// system before this runs.
    pub fn update_balls(&mut self, dt: f32) {
        for ball in &mut self.balls {
            ball.update(dt, self.half_extent);
        }
    }
}
