//! Shardfall entry point
//!
//! The playable build lives with a host that owns a canvas and keyboard.
//! Natively this runs a headless session under a simple autopilot and logs
//! what happens, which is handy for tuning a config file.
//!
//! Usage: `shardfall [config.json] [seed]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Shardfall (headless) starting...");

    if let Err(e) = native::run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The web host drives `Session` directly
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::time::Duration;

    use shardfall::sim::{FrameClock, Kind, Session, SessionEvent, UserInput};
    use shardfall::{SimConfig, facing};

    /// Wall-clock length of the demo run
    const RUN_FOR: Duration = Duration::from_secs(20);
    const FRAME: Duration = Duration::from_millis(16);

    pub fn run() -> Result<(), Box<dyn std::error::Error>> {
        let mut args = std::env::args().skip(1);
        let config = match args.next() {
            Some(path) => {
                let json = std::fs::read_to_string(&path)?;
                log::info!("Loaded config from {}", path);
                SimConfig::from_json_str(&json)?
            }
            None => SimConfig::default(),
        };
        let mut session = match args.next() {
            Some(seed) => Session::new(config, seed.parse()?),
            None => Session::from_entropy(config),
        };

        let mut clock = FrameClock::new(session.world().config().max_frame_ms);
        clock.tick();
        let frames = RUN_FOR.as_millis() / FRAME.as_millis();
        for frame in 0..frames {
            std::thread::sleep(FRAME);
            let dt = clock.tick();
            let input = autopilot(&session);

            for event in session.advance(&input, dt) {
                log::info!("{:?}", event);
                if event == SessionEvent::GameOver {
                    log::info!("Final HUD: {}", serde_json::to_string(&session.hud())?);
                    return Ok(());
                }
            }

            if frame % 60 == 0 {
                log::debug!(
                    "t={:.0}ms entities={} hud={}",
                    session.world().clock_ms(),
                    session.world().entities().len(),
                    serde_json::to_string(&session.hud())?
                );
            }
        }

        log::info!("Final HUD: {}", serde_json::to_string(&session.hud())?);
        Ok(())
    }

    /// Turn toward the nearest asteroid, fire when roughly lined up, and
    /// raise the shield when one gets close
    fn autopilot(session: &Session) -> UserInput {
        let mut input = UserInput::default();
        let world = session.world();
        let Some(ship) = world.player() else {
            return input;
        };

        let center = ship.center();
        let nearest = world
            .entities()
            .iter()
            .filter(|e| e.is(Kind::Asteroid))
            .map(|e| (e.center() - center, e.radius()))
            .min_by(|a, b| a.0.length_squared().total_cmp(&b.0.length_squared()));
        let Some((offset, radius)) = nearest else {
            return input;
        };

        let heading = facing(ship.rotation);
        let cross = heading.perp_dot(offset.normalize_or_zero());
        if cross > 0.05 {
            input.rotate_right = true;
        } else if cross < -0.05 {
            input.rotate_left = true;
        } else {
            input.fire = true;
        }

        let reach = world.config().starship_shield_diameter / 2.0 + radius;
        input.shield = offset.length() < reach * 1.2;
        input
    }
}
