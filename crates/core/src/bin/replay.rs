use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context};
use serde::Deserialize;

use ledgehop_core::{Command, MotionState, Params, Simulation, Viewport, DT_MS};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Action {
    KeyDown(String),
    KeyUp(String),
    Resize { width: f32, height: f32 },
    Blur,
}

#[derive(Debug, Deserialize)]
struct Scripted {
    frame: u32,
    action: Action,
}

#[derive(Debug, Deserialize)]
struct Replay {
    viewport: Viewport,
    #[serde(default)]
    params: Params,
    frames: u32,
    #[serde(default)]
    events: Vec<Scripted>,
}

impl From<Action> for Command {
    fn from(a: Action) -> Self {
        match a {
            Action::KeyDown(code) => Command::KeyDown(code),
            Action::KeyUp(code) => Command::KeyUp(code),
            Action::Resize { width, height } => Command::Resize { width, height },
            Action::Blur => Command::Blur,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init();

    let Some(path) = std::env::args().nth(1).map(PathBuf::from) else {
        bail!("usage: cargo run -p ledgehop_core --features cli --bin replay -- <replay.json>");
    };
    let raw = fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
    let replay: Replay = serde_json::from_str(&raw).context("parsing replay json")?;

    let viewport = Viewport::new(replay.viewport.width, replay.viewport.height)?;
    let mut sim = Simulation::new(replay.params, viewport)?;

    let mut events = replay.events;
    events.sort_by_key(|e| e.frame);
    let mut pending = events.into_iter().peekable();

    log::info!("replaying {} frames from {}", replay.frames, path.display());
    println!("frame,t_ms,x,y,vx,vy,grounded,state,jumped");
    for frame in 0..replay.frames {
        while let Some(ev) = pending.next_if(|e| e.frame == frame) {
            sim.push(ev.action.into());
        }
        let now = frame as f64 * DT_MS;
        let r = sim.tick(now);
        let p = sim.player_aabb().center;
        let v = sim.player_velocity();
        println!(
            "{},{:.3},{},{},{},{},{},{},{}",
            frame,
            now,
            p.x,
            p.y,
            v.x,
            v.y,
            r.grounded as u8,
            (r.control.state == MotionState::Grounded) as u8,
            r.control.jumped as u8
        );
    }
    if let Some(left) = pending.peek() {
        log::warn!("events scheduled at frame {} and later never ran", left.frame);
    }
    Ok(())
}
