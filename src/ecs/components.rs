use glam::Vec3;

/// Current world position. X/Z span the pasture plane, Y follows the terrain.
#[derive(Debug, Clone, Copy)]
pub struct Position(pub Vec3);

/// Velocity in units/second. Y is driven by the terrain snap, not integrated.
#[derive(Debug, Clone, Copy)]
pub struct Velocity(pub Vec3);

/// Optional waypoint the creature is steering toward.
#[derive(Debug, Clone, Copy, Default)]
pub struct MoveTarget(pub Option<Vec3>);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BehaviorState {
    Idle,
    Grazing,
    Looking,
    Stretching,
    Resting,
    Sleeping,
    Social,
    Curious,
    Petted,
    Bliss,
    Called,
    Fleeing,
}

/// A pending "come here" request, armed by `handling::on_called`.
/// `delay` counts down before the creature commits to moving (shy ones dawdle).
#[derive(Debug, Clone, Copy)]
pub struct Summons {
    pub target: Vec3,
    pub delay: f32,
}

/// Behavior state machine bookkeeping.
#[derive(Debug, Clone, Copy)]
pub struct Behavior {
    pub state: BehaviorState,
    /// State before the current one ("just woke up -> stretch" logic).
    pub prev: BehaviorState,
    /// Seconds since entering the current state. Counts up, resets on entry.
    pub timer: f32,
    /// Randomized duration budget for the current state, where one applies.
    pub duration: f32,
    /// Pose variant index (stretch poses).
    pub variant: u8,
    /// Outstanding call-to-player request, if any.
    pub summons: Option<Summons>,
}

impl Behavior {
    pub fn new() -> Self {
        Self {
            state: BehaviorState::Idle,
            prev: BehaviorState::Idle,
            timer: 0.0,
            duration: 0.0,
            variant: 0,
            summons: None,
        }
    }

    /// Transition into `next`. Timer resets to exactly zero.
    pub fn enter(&mut self, next: BehaviorState, duration: f32) {
        self.prev = self.state;
        self.state = next;
        self.timer = 0.0;
        self.duration = duration;
    }
}

impl Default for Behavior {
    fn default() -> Self {
        Self::new()
    }
}

/// Personality traits — each in [0.0, 1.0], fixed at spawn, never mutated.
#[derive(Debug, Clone, Copy)]
pub struct Personality {
    pub shyness: f32,
    pub friendliness: f32,
    pub curiosity: f32,
    pub flightiness: f32,
    pub laziness: f32,
    pub sociability: f32,
}

/// Slow-moving emotional scalars in [0.0, 1.0]. They bias behavior selection
/// but never drive it directly; each relaxes toward a 0.5 baseline.
#[derive(Debug, Clone, Copy)]
pub struct Mood {
    pub contentment: f32,
    pub alertness: f32,
    pub playfulness: f32,
}

impl Mood {
    pub fn neutral() -> Self {
        Self {
            contentment: 0.5,
            alertness: 0.5,
            playfulness: 0.5,
        }
    }
}

/// Physical drives that gate behavior choice.
#[derive(Debug, Clone, Copy)]
pub struct Drives {
    /// [0, 1]; builds while active, drains while resting/sleeping.
    pub tiredness: f32,
    /// Seconds until the creature may start another social visit.
    pub social_cooldown: f32,
}

/// Petting/hover interaction state.
#[derive(Debug, Clone, Copy)]
pub struct Affection {
    /// [0, 1]; rises while stroked, decays otherwise.
    pub happiness: f32,
    pub bliss_level: f32,
    pub is_petted: bool,
    pub is_hovered: bool,
    /// Seconds the pointer has lingered on this creature.
    pub hover_time: f32,
    /// Smoothed stroke speed from the most recent petting input.
    pub stroke_speed: f32,
    /// Seconds happiness has stayed above the bliss threshold while petted.
    pub bliss_hold: f32,
    /// Once true, the creature will approach the player while curious.
    pub has_been_petted: bool,
}

impl Affection {
    pub fn new() -> Self {
        Self {
            happiness: 0.0,
            bliss_level: 0.0,
            is_petted: false,
            is_hovered: false,
            hover_time: 0.0,
            stroke_speed: 0.0,
            bliss_hold: 0.0,
            has_been_petted: false,
        }
    }
}

impl Default for Affection {
    fn default() -> Self {
        Self::new()
    }
}

/// One cosmetic micro-action: `next` counts down to the firing instant,
/// `active` is the remaining play time once fired.
#[derive(Debug, Clone, Copy)]
pub struct MicroAction {
    pub next: f32,
    pub active: f32,
}

impl MicroAction {
    pub fn armed(next: f32) -> Self {
        Self { next, active: 0.0 }
    }

    pub fn is_active(&self) -> bool {
        self.active > 0.0
    }
}

/// Independent countdown timers for cosmetic actions. All plain floats
/// decremented in the main tick — no deferred callbacks anywhere.
#[derive(Debug, Clone, Copy)]
pub struct MicroTimers {
    pub ear_twitch: MicroAction,
    pub tail_wag: MicroAction,
    pub head_shake: MicroAction,
    pub ground_paw: MicroAction,
    pub sniff: MicroAction,
    pub vocalize: MicroAction,
    /// Countdown to an answering bleat, armed by a neighbor's call.
    pub pending_response: Option<f32>,
}

/// Attention/social partner. A stale entity simply fails lookup — the
/// generational index can never resurrect a despawned creature.
#[derive(Debug, Clone, Copy, Default)]
pub struct SocialLink(pub Option<hecs::Entity>);

/// Soft-body presentation state driven by the state machine's outputs.
#[derive(Debug, Clone, Copy)]
pub struct SoftBody {
    /// Wool spring displacement along the vertical scale axis.
    pub wool_offset: f32,
    pub wool_vel: f32,
    /// Current squash/stretch scale multipliers per axis.
    pub squash: Vec3,
    pub squash_target: Vec3,
    pub breath_phase: f32,
    pub breath_rate: f32,
    /// Facing angle on the pasture plane, radians.
    pub yaw: f32,
    /// Explicit look target — wins over movement heading when set.
    pub look_target: Option<Vec3>,
    /// Footfall bob phase, advanced by travel speed.
    pub gait_phase: f32,
}

impl SoftBody {
    pub fn new(breath_phase: f32, breath_rate: f32, yaw: f32) -> Self {
        Self {
            wool_offset: 0.0,
            wool_vel: 0.0,
            squash: Vec3::ONE,
            squash_target: Vec3::ONE,
            breath_phase,
            breath_rate,
            yaw,
            look_target: None,
            gait_phase: 0.0,
        }
    }
}

/// Body size. Collision radius scales with the creature.
#[derive(Debug, Clone, Copy)]
pub struct Stature {
    /// Size multiplier (1.0 = normal).
    pub scale: f32,
    /// Collision radius in world units.
    pub radius: f32,
}
