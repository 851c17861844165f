//! Blast Arena headless runner
//!
//! Plays one round with scripted random bots and prints every simulation
//! event as a JSON line on stdout.
//!
//! Usage: `blast-arena [seed] [config.json]`

#[cfg(not(target_arch = "wasm32"))]
use std::process::ExitCode;

#[cfg(not(target_arch = "wasm32"))]
use blast_arena::ArenaConfig;
#[cfg(not(target_arch = "wasm32"))]
use blast_arena::sim::{Arena, Direction, Intent, RoundPhase};

/// Fixed simulation step (seconds)
#[cfg(not(target_arch = "wasm32"))]
const DT: f32 = 1.0 / 60.0;
/// Give up on rounds nobody wins within five minutes
#[cfg(not(target_arch = "wasm32"))]
const MAX_TICKS: u32 = 60 * 60 * 5;

#[cfg(not(target_arch = "wasm32"))]
fn main() -> ExitCode {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed = match args.next().map(|s| s.parse::<u64>()) {
        Some(Ok(seed)) => seed,
        Some(Err(e)) => {
            eprintln!("invalid seed: {}", e);
            return ExitCode::FAILURE;
        }
        None => 0,
    };

    let config = match args.next() {
        Some(path) => match load_config(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{}: {}", path, e);
                return ExitCode::FAILURE;
            }
        },
        None => ArenaConfig::default(),
    };

    let mut arena = match Arena::new(config, seed) {
        Ok(arena) => arena,
        Err(e) => {
            log::error!("Arena setup failed: {}", e);
            return ExitCode::FAILURE;
        }
    };
    log::info!("Blast Arena (headless) starting with seed {}", seed);

    // Bot input has its own stream so the arena RNG only feeds the simulation
    let mut bots = bots::Bots::new(seed);
    for _ in 0..MAX_TICKS {
        for (player_id, intent) in bots.intents(&arena) {
            arena.submit_intent(player_id, intent);
        }
        for event in arena.advance(DT) {
            match serde_json::to_string(&event) {
                Ok(line) => println!("{}", line),
                Err(e) => log::warn!("Event not serializable: {}", e),
            }
        }
        if arena.phase() == RoundPhase::Over {
            log::info!("Finished after {:.2}s: {:?}", arena.elapsed(), arena.outcome());
            return ExitCode::SUCCESS;
        }
    }

    log::info!("No winner after {:.2}s", arena.elapsed());
    ExitCode::SUCCESS
}

#[cfg(not(target_arch = "wasm32"))]
fn load_config(path: &str) -> Result<ArenaConfig, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)?;
    Ok(ArenaConfig::from_json(&text)?)
}

#[cfg(not(target_arch = "wasm32"))]
mod bots {
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use super::{Arena, Direction, Intent};

    /// Chance per tick that a bot drops a bomb
    const ACT_CHANCE: f32 = 0.02;
    /// Chance per tick that a bot picks a new heading
    const TURN_CHANCE: f32 = 0.1;

    pub struct Bots {
        rng: Pcg32,
        headings: Vec<Direction>,
    }

    impl Bots {
        pub fn new(seed: u64) -> Self {
            Self {
                rng: Pcg32::seed_from_u64(seed ^ 0xB0B5),
                headings: Vec::new(),
            }
        }

        /// One intent batch for every living player
        pub fn intents(&mut self, arena: &Arena) -> Vec<(usize, Intent)> {
            self.headings.resize(arena.players().len(), Direction::Down);
            let mut out = Vec::new();
            for player in arena.alive_players() {
                if self.rng.random::<f32>() < TURN_CHANCE {
                    let idx = self.rng.random_range(0..Direction::ALL.len());
                    self.headings[player.id] = Direction::ALL[idx];
                }
                out.push((player.id, Intent::Move(self.headings[player.id])));
                if self.rng.random::<f32>() < ACT_CHANCE {
                    out.push((player.id, Intent::Act));
                }
            }
            out
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The simulation is embedded by a host application on the web
}
