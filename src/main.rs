//! Headless demo: a scripted shepherd strolls the pasture while the flock
//! lives its life. Census lines land in the log every few seconds.
//!
//! Env knobs: CLOUDFEN_SEED (u64), CLOUDFEN_FENS (usize),
//! CLOUDFEN_SECONDS (u64, 0 = run forever).

use std::error::Error;
use std::time::Duration;

use glam::Vec3;
use instant::Instant;

use cloudfen::ecs::components::Position;
use cloudfen::field::PlayerSnapshot;
use cloudfen::sim::{Pasture, PastureConfig};

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        log::error!("fatal: {err}");
        std::process::exit(1);
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Result<Option<T>, Box<dyn Error>>
where
    T::Err: Error + 'static,
{
    match std::env::var(key) {
        Ok(raw) => Ok(Some(raw.parse()?)),
        Err(_) => Ok(None),
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let seed = env_parse::<u64>("CLOUDFEN_SEED")?;
    let fen_count = env_parse::<usize>("CLOUDFEN_FENS")?.unwrap_or(8);
    let run_seconds = env_parse::<u64>("CLOUDFEN_SECONDS")?.unwrap_or(60);

    let mut pasture = Pasture::new(PastureConfig {
        fen_count,
        seed,
        drift_spawn_interval: 45.0,
        ..PastureConfig::default()
    });

    let started = Instant::now();
    let mut last_frame = started;
    let mut whistled = false;

    loop {
        let now = Instant::now();
        let wall_dt = now.duration_since(last_frame).as_secs_f64();
        last_frame = now;

        let elapsed = now.duration_since(started).as_secs_f32();
        let player = scripted_shepherd(elapsed);
        pasture.advance(wall_dt, &player);

        // Thirty seconds in, whistle the farthest creature over once.
        if !whistled && elapsed > 30.0 {
            whistled = true;
            if let Some(target) = farthest_fen(&pasture, player.position) {
                let answered = cloudfen::on_called(pasture.world_mut(), target, player.position);
                log::info!("whistled at {target:?}, answered: {answered}");
            }
        }

        if run_seconds > 0 && elapsed as u64 >= run_seconds {
            break;
        }
        std::thread::sleep(Duration::from_millis(16));
    }

    log::info!(
        "done: {} ticks, {} fens",
        pasture.tick_count(),
        pasture.fen_count()
    );
    Ok(())
}

/// Walk a slow circle, breaking into a run for a few seconds each lap.
fn scripted_shepherd(t: f32) -> PlayerSnapshot {
    let lap = 40.0;
    let angle = t * std::f32::consts::TAU / lap;
    let radius = 12.0;
    let running = (t % lap) > lap - 5.0;
    let speed = if running { 6.0 } else { 1.8 };

    let pos = Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius);
    let tangent = Vec3::new(-angle.sin(), 0.0, angle.cos());
    PlayerSnapshot {
        position: pos,
        velocity: tangent * speed,
        is_running: running,
        is_moving: true,
    }
}

fn farthest_fen(pasture: &Pasture, from: Vec3) -> Option<hecs::Entity> {
    pasture
        .world()
        .query::<&Position>()
        .iter()
        .max_by(|(_, a), (_, b)| {
            a.0.distance_squared(from)
                .total_cmp(&b.0.distance_squared(from))
        })
        .map(|(e, _)| e)
}
