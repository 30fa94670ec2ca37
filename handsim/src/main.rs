//! handsim-replay - drive a simulated hand from a recorded frame script
//! and print the resulting events as s-expressions.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use handsim::gesture::{EventLog, GesturesProfile, InputSource, ProfileSource, SexpProfileFile};
use handsim::hand::{HandVariant, Handedness, SimulatedHand};
use handsim::replay;

#[derive(Parser, Debug)]
#[command(name = "handsim-replay", about = "Replay a simulated-hand frame script")]
struct Cli {
    /// Frame script (one plist per frame)
    #[arg(long)]
    script: PathBuf,

    /// Gesture profile plist (default: built-in profile)
    #[arg(long)]
    profile: Option<PathBuf>,

    /// Hand variant: gesture or articulated
    #[arg(long, default_value = "gesture")]
    variant: String,

    /// Which hand: left or right
    #[arg(long, default_value = "right")]
    hand: String,

    /// Log recognizer status after every frame
    #[arg(long)]
    trace: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "handsim=info,handsim_replay=info".into()),
        )
        .init();

    info!("handsim-replay v{} starting", env!("CARGO_PKG_VERSION"));

    let variant = HandVariant::parse(&cli.variant).with_context(|| {
        format!("unknown variant: {}. Use: gesture or articulated", cli.variant)
    })?;
    let handedness = Handedness::parse(&cli.hand)
        .with_context(|| format!("unknown hand: {}. Use: left or right", cli.hand))?;

    let profile: Box<dyn ProfileSource> = match cli.profile {
        Some(path) => {
            let file = SexpProfileFile::new(path);
            // Fail loudly here; the hand itself would quietly fall back to defaults.
            file.load()
                .with_context(|| format!("loading profile {:?}", file.path))?;
            Box::new(file)
        }
        None => Box::new(GesturesProfile::default()),
    };

    let frames = replay::load_script(&cli.script)
        .with_context(|| format!("loading script {:?}", cli.script))?;
    info!("{} frames, {} {} hand", frames.len(), variant.as_str(), handedness.as_str());

    let name = match handedness {
        Handedness::Left => "Left Hand",
        Handedness::Right => "Right Hand",
    };
    let mut hand = SimulatedHand::new(variant, InputSource::new(1, name, handedness), profile)
        .with_sink(EventLog::new());

    let trace = cli.trace;
    replay::run(&mut hand, frames, |i, hand| {
        if let Some(log) = hand.sink_mut() {
            for event in log.drain() {
                println!("{}", event.to_sexp());
            }
        }
        if trace {
            info!(frame = i, "{}", hand.status_sexp());
        }
    });

    Ok(())
}
