mod cli;
mod logger;

use anyhow::Result;
use clap::Parser;
use log::info;

use lightpath::optics::read_config;
use lightpath::scene::presets::default_bench;
use lightpath::{Termination, TraceConfig};

fn main() -> Result<()> {
    let args = cli::Args::parse();
    logger::init_logger(args.log_level.into());

    let mut config = match &args.config {
        Some(path) => {
            info!("Loading trace config from {}", path.display());
            read_config(path)?
        }
        None => TraceConfig::new(),
    };
    if let Some(max_depth) = args.max_depth {
        config = config.with_max_depth(max_depth);
    }
    config.validate()?;

    let scene = default_bench()?;
    info!(
        "Default bench: {} elements, {} surfaces, {} sources",
        scene.len(),
        scene.surfaces().len(),
        scene.sources().len()
    );

    for (uid, result) in scene.trace_sources(&config) {
        info!(
            "Source {uid}: {} segments, {} escaped, {} absorbed, {} depth exceeded",
            result.segments.len(),
            result.count(Termination::Escaped),
            result.count(Termination::Absorbed),
            result.count(Termination::DepthExceeded)
        );
        println!("source {uid}");
        for seg in result.segments.iter() {
            println!("  [{}] {:.3} -> {:.3}", seg.depth, seg.start, seg.end);
        }
    }

    Ok(())
}
