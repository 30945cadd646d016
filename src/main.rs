mod app;
mod graph;
mod util;

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Endpoint graph JSON to open on startup.
    graph: Option<PathBuf>,

    /// Length every link relaxes toward, in layout units.
    #[arg(long, default_value_t = 160.0)]
    rest_distance: f32,

    /// Many-body strength; negative values repel.
    #[arg(long, default_value_t = -300.0, allow_negative_numbers = true)]
    charge: f32,

    #[arg(long, default_value_t = 1440.0)]
    width: f32,

    #[arg(long, default_value_t = 920.0)]
    height: f32,
}

fn main() -> eframe::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let config = app::SimulationConfig {
        charge: args.charge,
        rest_distance: args.rest_distance.max(1.0),
        ..Default::default()
    };
    log::debug!("starting with {config:?}");

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([args.width, args.height]),
        ..Default::default()
    };

    eframe::run_native(
        "API Explorer",
        options,
        Box::new(move |cc| Ok(Box::new(app::ExplorerApp::new(cc, args.graph.clone(), config)))),
    )
}
