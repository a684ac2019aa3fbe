//! Laser Board demo runner
//!
//! Plays a greedy bot against itself and prints every turn.
//!
//! Usage: `laser-board [laser|pharaoh|<config.json>] [seed] [turns]`

use std::process::ExitCode;

use laser_board::sim::{RayPath, SegmentEnd, ShotOutcome, TurnEngine};
use laser_board::variant::ConfigError;
use laser_board::{GreedyBot, Variant, VariantConfig};

const DEFAULT_SEED: u64 = 1;
const DEFAULT_TURNS: u32 = 40;

fn load_config(arg: Option<&str>) -> Result<VariantConfig, ConfigError> {
    match arg {
        None => Ok(Variant::default().config()),
        Some(name) => match Variant::from_str(name) {
            Some(variant) => Ok(variant.config()),
            None => VariantConfig::load(name),
        },
    }
}

fn describe_path(path: &RayPath) -> String {
    let cells: Vec<String> = path.cells().iter().map(|c| c.to_string()).collect();
    let end = match path.termination() {
        SegmentEnd::Exited if path.truncated => "stopped at step limit".to_string(),
        SegmentEnd::Exited => "left the board".to_string(),
        SegmentEnd::Absorbed => "absorbed".to_string(),
        SegmentEnd::Destroyed => "destroyed a piece".to_string(),
        SegmentEnd::HitPivotal { owner } => format!("struck the {} pharaoh", owner.as_str()),
        SegmentEnd::Reflected => "reflected".to_string(),
    };
    if cells.is_empty() {
        end
    } else {
        format!("{} ({})", cells.join(" "), end)
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match load_config(args.first().map(String::as_str)) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("laser-board: {e}");
            return ExitCode::FAILURE;
        }
    };
    let seed = args
        .get(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_SEED);
    let turns = args
        .get(2)
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_TURNS);

    let mut engine = match TurnEngine::new(config) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("laser-board: {e}");
            return ExitCode::FAILURE;
        }
    };
    log::info!("Laser Board demo: seed {}, up to {} turns", seed, turns);

    let mut bot = GreedyBot::new(seed);
    println!("{engine}");

    for turn in 1..=turns {
        let Some(play) = bot.choose(&engine) else {
            println!("No legal plays left");
            break;
        };
        let report = match engine.play(play) {
            Ok(report) => report,
            Err(e) => {
                log::error!("Bot play {:?} rejected: {}", play, e);
                return ExitCode::FAILURE;
            }
        };

        if let Some(record) = engine.move_log().last() {
            println!("{turn:>3}. {} {}", record.player.as_str(), record.description);
        }
        println!("     ray: {}", describe_path(&report.path));
        for piece in &report.destroyed {
            println!("     lost: {} {}", piece.owner.as_str(), piece.kind.as_str());
        }
        println!("{engine}");

        if let ShotOutcome::Winner(winner) = report.outcome {
            println!("{} wins after {} turns", winner.as_str(), turn);
            return ExitCode::SUCCESS;
        }
    }

    println!("No winner after {turns} turns");
    ExitCode::SUCCESS
}
