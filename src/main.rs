use std::path::PathBuf;

use app::Application;
use clap::Parser;
use log::{info, LevelFilter};
use pipeline::{debug, Pipeline};

mod app;
mod error;
mod insts;
mod logger;
mod parse;
mod pipeline;

#[derive(Parser, Debug)]
#[command(version, about, long_about)]
struct Args {
    /// Path to the program to be simulated
    #[arg(short, long)]
    input: PathBuf,

    /// Enable forwarding (bypass) paths
    #[arg(short, long)]
    forwarding: bool,

    /// Log level written to stderr
    #[arg(long, default_value_t = LevelFilter::Warn)]
    log_level: LevelFilter,

    /// log4rs YAML configuration, overrides --log-level
    #[arg(long)]
    log_config: Option<PathBuf>,

    /// Stop after this many cycles even if the pipeline has not drained
    #[arg(long)]
    max_cycles: Option<u64>,
}

fn main() -> error::Result<()> {
    let args = Args::parse();
    logger::init(args.log_config.as_deref(), args.log_level)?;

    println!("Loading application...{}", args.input.display());
    let mut app = Application::load(&args.input)?;

    println!("Initializing pipeline...");
    let mut pipeline = Pipeline::new(&mut app, args.forwarding);
    info!("Forwarding: {}", pipeline.forwarding());

    let summary = pipeline.run(args.max_cycles);

    println!("{}", debug::header());
    for record in &summary.trace {
        println!("{}", debug::pcycle(record));
    }

    if summary.drained {
        println!("Completed in {} cycles", summary.cycles);
        println!("Stalls: {}", pipeline.stalls());
    } else {
        println!(
            "Stopped after {} cycles without draining the pipeline",
            pipeline.clock()
        );
    }

    Ok(())
}
