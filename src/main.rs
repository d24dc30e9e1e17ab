mod app;

use std::path::PathBuf;

use clap::Parser;
use env_logger::Env;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Graph JSON with `nodes` and `edges`; a built-in sample is shown when omitted.
    #[arg(long)]
    graph: Option<PathBuf>,
    /// Engine config JSON; missing fields keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Lay the graph out once and freeze it instead of animating the simulation.
    #[arg(long)]
    batch: bool,
}

fn init_logging() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
}

fn main() -> eframe::Result<()> {
    init_logging();
    let args = Args::parse();
    let launch = app::LaunchOptions {
        graph_path: args.graph,
        config_path: args.config,
        batch: args.batch,
    };
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "graph-spotlight",
        options,
        Box::new(move |cc| Ok(Box::new(app::SpotlightApp::new(cc, launch)))),
    )
}
