use std::sync::Arc;

use clap::{Parser, Subcommand};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use flotilla::{init_logging, random_fleet, Game, Router, Server};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the match server.
    Serve {
        #[arg(long, default_value = "0.0.0.0:3000")]
        bind: String,
        #[arg(long, help = "Fix RNG seed for reproducible seats and bot play")]
        seed: Option<u64>,
    },
    /// Simulate one bot-vs-bot match in-process and print the outcome.
    Local {
        #[arg(long, help = "Fix RNG seed for a reproducible match")]
        seed: Option<u64>,
    },
}

fn rng_from(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(s) => SmallRng::seed_from_u64(s),
        None => {
            let mut seed_rng = rand::rng();
            SmallRng::from_rng(&mut seed_rng)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { bind, seed } => {
            let router = Arc::new(match seed {
                Some(s) => Router::with_seed(s),
                None => Router::new(),
            });
            Server::new(router).run(&bind).await?;
        }
        Commands::Local { seed } => {
            let mut rng = rng_from(seed);
            let mut game = Game::new(0, 0, 1, &mut rng);
            let [(_, seat_a), (_, seat_b)] = game.players();

            let fleet = random_fleet(&mut rng);
            game.place_ships(seat_a, fleet, &mut rng)?;
            let fleet = random_fleet(&mut rng);
            game.place_ships(seat_b, fleet, &mut rng)?;
            println!("Match started, first seat: {}", game.turn_seat());

            let mut shots = 0u32;
            let winner_seat = loop {
                let outcome = game.random_attack(game.turn_seat(), &mut rng)?;
                shots += 1;
                if let Some((_, seat)) = outcome.winner {
                    break seat;
                }
            };
            println!("Seat {} wins after {} shots", winner_seat, shots);
        }
    }
    Ok(())
}
