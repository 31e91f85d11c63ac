use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use floorpath_core::{RoomRef, RoutingOptions};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "floorpath", version, about = "Inspect indoor venues and compute multi-floor routes")]
struct Args {
    /// Log progress to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print per-floor graph and portal statistics
    Summary {
        /// Venue JSON file
        #[arg(long, value_name = "PATH")]
        venue: PathBuf,
    },
    /// Route between two rooms and print the legs
    Route {
        /// Venue JSON file
        #[arg(long, value_name = "PATH")]
        venue: PathBuf,

        /// Start room as FLOOR:ROOM
        #[arg(long, value_name = "FLOOR:ROOM", allow_hyphen_values = true)]
        from: RoomRef,

        /// Destination room as FLOOR:ROOM
        #[arg(long, value_name = "FLOOR:ROOM", allow_hyphen_values = true)]
        to: RoomRef,

        /// Routing options JSON file
        #[arg(long, value_name = "PATH")]
        options: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    let level = if args.verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder().with_ansi(false).with_writer(std::io::stderr).with_max_level(level).finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
    info!(?args, "starting floorpath");

    let out = match args.command {
        Command::Summary { venue } => {
            let venue = commands::load_venue(&venue, &RoutingOptions::default())?;
            commands::summary(&venue)?
        }
        Command::Route { venue, from, to, options } => {
            let options = commands::load_options(options.as_deref())?;
            let venue = commands::load_venue(&venue, &options)?;
            commands::route(&venue, from, to)?
        }
    };
    println!("{out}");
    Ok(())
}
