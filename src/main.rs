//! Tennis Trivia entry point
//!
//! The browser build is driven from `web.rs`. Natively this runs a headless
//! self-playing match and prints the result.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use tennis_trivia::GameLoop;
    use tennis_trivia::consts::SIM_DT;
    use tennis_trivia::sim::GameState;
    use tennis_trivia::tuning::Tuning;

    /// Give up after an hour of simulated play
    const MAX_TICKS: u64 = 120 * 60 * 60;

    env_logger::init();
    log::info!("Tennis Trivia (native) starting...");

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse::<u64>().ok())
        .unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map_or(0, |d| d.as_millis() as u64)
        });

    let tuning = match std::env::var("TENNIS_TRIVIA_TUNING") {
        Ok(json) => match Tuning::from_json(&json) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::error!("Invalid tuning: {}", e);
                std::process::exit(2);
            }
        },
        Err(_) => Tuning::default(),
    };

    let mut game = match GameLoop::new(seed, tuning) {
        Ok(game) => game,
        Err(e) => {
            log::error!("Refusing to start: {}", e);
            std::process::exit(1);
        }
    };
    game.set_idle(true);

    while game.state() != GameState::GameOver && game.sim().time_ticks < MAX_TICKS {
        game.advance(SIM_DT);
    }

    let snap = game.snapshot();
    println!("\nSeed {}: {:?} after {} ticks", seed, snap.winner, game.sim().time_ticks);
    for (i, set) in snap.score.completed_sets.iter().enumerate() {
        match set.tiebreak {
            Some((p, c)) => println!(
                "  Set {}: {}-{} ({}-{})",
                i + 1,
                set.player_games,
                set.cpu_games,
                p,
                c
            ),
            None => println!("  Set {}: {}-{}", i + 1, set.player_games, set.cpu_games),
        }
    }
    let stats = &snap.stats;
    println!(
        "  Points {}-{}, longest rally {}, questions {} ({:.0}% correct, {} timed out)",
        stats.player_points_won,
        stats.cpu_points_won,
        stats.longest_rally,
        stats.questions_asked,
        stats.accuracy() * 100.0,
        stats.timed_out
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main in web.rs, this is just to satisfy the compiler
}
