//! Tamaro Jump entry point
//!
//! Headless driver: runs the campaign at a fixed 60 Hz with an accumulator
//! loop and logs the HUD once per second. A windowed host would feed real
//! input and draw the render items instead.

use std::thread;
use std::time::{Duration, Instant};

use tamaro_jump::audio::NullBackend;
use tamaro_jump::consts::{MAX_SUBSTEPS, SIM_DT};
use tamaro_jump::game::{Phase, format_time};
use tamaro_jump::platform::SystemClock;
use tamaro_jump::{Game, Input};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut game = Game::new(Box::new(NullBackend::new()), Box::new(SystemClock::new()));
    game.start_game();
    // Walk toward the door so the demo makes progress
    game.handle_input(Input::MoveRight);

    let mut accumulator = 0.0f32;
    let mut last = Instant::now();
    let mut last_report = Instant::now();

    while game.phase() == Phase::Playing {
        let now = Instant::now();
        accumulator += now.duration_since(last).as_secs_f32();
        last = now;

        let mut substeps = 0;
        while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            game.tick();
            accumulator -= SIM_DT;
            substeps += 1;
        }
        // Behind by more than the substep budget: drop the debt
        if substeps == MAX_SUBSTEPS {
            accumulator = 0.0;
        }

        if last_report.elapsed() >= Duration::from_secs(1) {
            let hud = game.hud();
            log::info!(
                "level {} | hp {} | coins {} | score {} | {}",
                game.current_level() + 1,
                hud.health,
                hud.coins,
                hud.score,
                format_time(hud.elapsed_ms)
            );
            last_report = Instant::now();
        }

        thread::sleep(Duration::from_millis(2));
    }

    log::info!("run ended in {:?}", game.phase());
}
