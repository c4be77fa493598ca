use glam::Vec3;

use crate::ecs::components::BehaviorState;

/// Maximum concurrent motes.
const MAX_MOTES: usize = 512;

/// What a mote looks like — the renderer maps these to sprites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoteKind {
    Heart,
    Zzz,
    Dust,
}

/// A single emotion mote drifting above a creature.
#[derive(Debug, Clone, Copy)]
pub struct Mote {
    pub pos: Vec3,
    pub vel: Vec3,
    pub lifetime: f32,
    pub max_lifetime: f32,
    pub size: f32,
    pub kind: MoteKind,
}

impl Mote {
    /// Remaining-life fade, eased so motes vanish quickly near death.
    pub fn fade(&self) -> f32 {
        let frac = (self.lifetime / self.max_lifetime).clamp(0.0, 1.0);
        frac * frac
    }
}

/// Pool of emotion motes spawned from creature behavior states.
pub struct Effects {
    motes: Vec<Mote>,
    pub enabled: bool,
}

impl Effects {
    pub fn new() -> Self {
        Self {
            motes: Vec::with_capacity(MAX_MOTES),
            enabled: true,
        }
    }

    /// Spawn motes for each creature based on its state.
    /// `creatures` is a slice of (position, behavior state, scale).
    pub fn spawn_from_behaviors(
        &mut self,
        creatures: &[(Vec3, BehaviorState, f32)],
        rng: &mut fastrand::Rng,
        dt: f32,
    ) {
        if !self.enabled {
            return;
        }
        for &(pos, state, scale) in creatures {
            let spawn = match state {
                BehaviorState::Sleeping => {
                    // Zzz — low rate, float up slowly.
                    if rng.f32() < 0.6 * dt {
                        Some(MoteSpawn {
                            kind: MoteKind::Zzz,
                            size: 0.15 + rng.f32() * 0.1,
                            vel: Vec3::new(rng.f32() * 0.4 - 0.2, 0.6 + rng.f32() * 0.4, 0.0),
                            lifetime: 1.5 + rng.f32(),
                        })
                    } else {
                        None
                    }
                }
                BehaviorState::Bliss => {
                    // Periodic hearts, the signature bliss tell.
                    if rng.f32() < 1.5 * dt {
                        Some(MoteSpawn {
                            kind: MoteKind::Heart,
                            size: 0.18 + rng.f32() * 0.08,
                            vel: Vec3::new(
                                rng.f32() * 0.6 - 0.3,
                                0.8 + rng.f32() * 0.4,
                                rng.f32() * 0.6 - 0.3,
                            ),
                            lifetime: 1.0 + rng.f32() * 0.5,
                        })
                    } else {
                        None
                    }
                }
                BehaviorState::Petted => {
                    if rng.f32() < 0.7 * dt {
                        Some(MoteSpawn {
                            kind: MoteKind::Heart,
                            size: 0.12 + rng.f32() * 0.06,
                            vel: Vec3::new(rng.f32() * 0.4 - 0.2, 0.7, rng.f32() * 0.4 - 0.2),
                            lifetime: 0.8 + rng.f32() * 0.4,
                        })
                    } else {
                        None
                    }
                }
                BehaviorState::Fleeing => {
                    // Kicked-up dust at the heels.
                    if rng.f32() < 6.0 * dt {
                        let angle = rng.f32() * std::f32::consts::TAU;
                        Some(MoteSpawn {
                            kind: MoteKind::Dust,
                            size: 0.1 + rng.f32() * 0.08,
                            vel: Vec3::new(angle.cos() * 0.8, 0.3, angle.sin() * 0.8),
                            lifetime: 0.3 + rng.f32() * 0.3,
                        })
                    } else {
                        None
                    }
                }
                // Quiet states spawn nothing.
                _ => None,
            };

            if let Some(spawn) = spawn {
                if self.motes.len() < MAX_MOTES {
                    let above = if spawn.kind == MoteKind::Dust { 0.1 } else { 1.2 };
                    let offset = Vec3::new(
                        rng.f32() * 0.3 - 0.15,
                        scale * above,
                        rng.f32() * 0.3 - 0.15,
                    );
                    self.motes.push(Mote {
                        pos: pos + offset,
                        vel: spawn.vel,
                        lifetime: spawn.lifetime,
                        max_lifetime: spawn.lifetime,
                        size: spawn.size,
                        kind: spawn.kind,
                    });
                }
            }
        }
    }

    /// Update all motes: drift, age, remove dead.
    pub fn update(&mut self, dt: f32) {
        let mut i = 0;
        while i < self.motes.len() {
            let m = &mut self.motes[i];
            m.pos += m.vel * dt;
            m.vel.y += 0.2 * dt; // gentle lift
            m.vel *= 1.0 - 2.0 * dt; // drag
            m.lifetime -= dt;

            if m.lifetime <= 0.0 {
                self.motes.swap_remove(i);
            } else {
                i += 1;
            }
        }
    }

    pub fn motes(&self) -> &[Mote] {
        &self.motes
    }

    pub fn count(&self) -> usize {
        self.motes.len()
    }
}

impl Default for Effects {
    fn default() -> Self {
        Self::new()
    }
}

struct MoteSpawn {
    kind: MoteKind,
    size: f32,
    vel: Vec3,
    lifetime: f32,
}
