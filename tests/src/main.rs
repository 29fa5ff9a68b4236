// Scenario runner: plays scripted games against the mock board and prints the transcript

use simon_core::sequence::DEFAULT_SEED;
use simon_core::{CadenceConfig, GameConfig, RoundOutcome};
use simon_tests::scenario::InputMode;
use simon_tests::Scenario;

fn main() {
    println!("Simon scenario runner (engine v{})", simon_core::VERSION);

    run("Default board, buttons", Scenario::default(), 5);
    run(
        "Slowest cadence, keyboard",
        Scenario::default()
            .with_reading(255)
            .with_input(InputMode::Keyboard),
        3,
    );

    match GameConfig::new(0x0BAD_5EED, CadenceConfig::default(), 1, 5) {
        Ok(config) => run("Custom seed", Scenario::new(config), 8),
        Err(error) => println!("Invalid configuration: {}", error),
    }

    if let Err(error) = GameConfig::new(0, CadenceConfig::default(), 1, 5) {
        println!("Zero seed rejected: {}", error);
    }

    println!();
    println!("Run the assertions with: cargo test -p simon-tests");
}

fn run(name: &str, scenario: Scenario, rounds: usize) {
    println!();
    println!("== {} (seed {:#010x}, {} rounds) ==", name, scenario.config.seed, rounds);

    match scenario.play(rounds) {
        Ok(report) => {
            for outcome in &report.outcomes {
                match outcome {
                    RoundOutcome::Success { score } => println!("  round won, score {}", score),
                    RoundOutcome::GameOver { score } => println!("  game over, score {}", score),
                }
            }
            println!(
                "  {} ms simulated, next seed {:#010x}, stage {:?}",
                report.ticks, report.next_seed, report.final_stage
            );
            println!("  transcript:");
            for line in report.transcript.lines() {
                println!("    {}", line);
            }
        }
        Err(error) => println!("  failed: {}", error),
    }

    if scenario.config.seed == DEFAULT_SEED {
        println!("  (default seed)");
    }
}
