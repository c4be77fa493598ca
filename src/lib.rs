//! Cloudfen: a headless behavior engine for a pasture of soft, shy,
//! sheep-like creatures. The crate simulates the whole flock — behavior
//! states, personality, mood, micro-fidgets, collision, and soft-body
//! presentation — and leaves rendering and input to the embedding app,
//! which talks to it through [`handling`], [`prompt`], and the
//! [`sim::Pasture`] driver.

pub mod ecs;
pub mod effects;
pub mod fen;
pub mod field;
pub mod handling;
pub mod prompt;
pub mod sim;
pub mod spatial;

pub use ecs::components::{Behavior, BehaviorState, Mood, Personality};
pub use field::{Ball, Field, PlayerSnapshot, Rock, Terrain};
pub use handling::{end_petting, on_called, on_hover_end, on_hover_start, on_stroke, start_petting};
pub use prompt::{select_prompt, PromptAction, PromptContext};
pub use sim::{Pasture, PastureConfig, TICK_DT};
