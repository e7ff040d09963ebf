use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use roomwalk::constants::LOOP_TIME;
use roomwalk::entity::{Actor, Ego, Entity, Object, Sprite};
use roomwalk::formatter::FrameFormatter;
use roomwalk::game::Game;
use roomwalk::input::{Joystick, Signals};
use roomwalk::room::RoomSet;
use tracing::{debug, info, warn};
use tracing_error::ErrorLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

/// Built-in room table for the headless demo.
const ROOMS: &str = include_str!("../assets/rooms.json");

const DEFAULT_FRAMES: u32 = 900;

/// Held directions and how many frames to hold them for.
const SCRIPT: &[(u32, Joystick)] = &[
    (90, Joystick::empty()),
    (170, Joystick::RIGHT),
    (60, Joystick::empty()),
    (40, Joystick::DOWN),
    (210, Joystick::LEFT),
    (30, Joystick::empty()),
    (140, Joystick::UP),
];

fn script_at(frame: u32) -> Signals {
    let mut remaining = frame;
    for (frames, held) in SCRIPT {
        if remaining < *frames {
            return Signals::from(*held);
        }
        remaining -= frames;
    }
    Signals::NONE
}

fn setup_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,{name}=info", name = env!("CARGO_CRATE_NAME"))));

    let subscriber = tracing_subscriber::fmt()
        .with_ansi(cfg!(not(target_os = "emscripten")))
        .event_format(FrameFormatter::new())
        .with_env_filter(filter)
        .finish()
        .with(ErrorLayer::default());

    tracing::subscriber::set_global_default(subscriber).context("Could not set global default subscriber")
}

fn sleep(duration: Duration) {
    #[cfg(not(target_os = "emscripten"))]
    spin_sleep::sleep(duration);
    #[cfg(target_os = "emscripten")]
    std::thread::sleep(duration);
}

pub fn main() -> Result<()> {
    setup_logging()?;

    let frames = std::env::args()
        .nth(1)
        .map(|arg| arg.parse::<u32>())
        .transpose()
        .context("Frame count must be a positive number")?
        .unwrap_or(DEFAULT_FRAMES);

    let rooms = RoomSet::from_json(ROOMS).context("Built-in room table is invalid")?;
    info!(rooms = rooms.len(), frames, "Starting");

    let mut game = Game::new(rooms);
    let mut sprite = Sprite::new("ego", 50.0, 150.0);
    sprite.set_position(400.0, 0.0, 700.0);
    game.start(Ego::new(Actor::new(sprite, game.commands()), 1))?;

    let hermit = game.find_by_name("hermit").map(Entity::id);
    if let Some(actor) = hermit.and_then(|id| game.find_mut(id)).and_then(Object::as_actor_mut) {
        actor.say("Mind the river.", 220.0, None);
    }

    let start = Instant::now();
    let mut deadline = start;
    for frame in 0..frames {
        let now_ms = start.elapsed().as_secs_f64() * 1000.0;
        game.tick(now_ms, &script_at(frame));

        for event in game.drain_events() {
            debug!(?event, "Event");
        }
        if frame % 120 == 119 {
            if let Some(ego) = game.ego() {
                let position = ego.sprite().position();
                debug!(
                    room = game.room(),
                    x = position.x,
                    z = position.z,
                    objects = game.objects().len(),
                    input = game.input_enabled(),
                    "Status"
                );
            }
        }

        deadline += LOOP_TIME;
        let now = Instant::now();
        if deadline > now {
            sleep(deadline - now);
        } else if now - deadline > LOOP_TIME {
            warn!(behind = ?(now - deadline), "Frame loop behind schedule");
            deadline = now;
        }
    }

    if let Some(ego) = game.ego() {
        let position = ego.sprite().position();
        info!(room = ego.room(), x = position.x, z = position.z, "Finished");
    }
    Ok(())
}
