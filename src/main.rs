use std::path::PathBuf;

use clap::Parser;
use dragsense::consts::{ENV_DELAY_MS, ENV_DISTANCE_PX};
use dragsense::replay::{ReplayError, Scene, replay};

#[derive(Parser, Debug)]
#[command(name = "dragsense", about = "Replay a pointer trace through drag sensors")]
struct Cli {
    /// Scene file: elements plus timed pointer events.
    scene: PathBuf,

    /// Minimum press duration in milliseconds. Overrides the scene's options.
    #[arg(long, env = ENV_DELAY_MS)]
    delay: Option<u64>,

    /// Minimum pointer travel in pixels. Overrides the scene's options.
    #[arg(long, env = ENV_DISTANCE_PX)]
    distance: Option<f64>,

    /// Pretty-print each record.
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<(), ReplayError> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    let cli = Cli::parse();

    let scene = Scene::load(&cli.scene)?;
    let options = scene.effective_options(cli.delay, cli.distance)?;
    tracing::info!(path = %cli.scene.display(), delay = options.delay, distance = options.distance, "loaded scene");

    for record in replay(&scene, options)? {
        let line = if cli.pretty {
            serde_json::to_string_pretty(&record)?
        } else {
            serde_json::to_string(&record)?
        };
        println!("{line}");
    }
    Ok(())
}
