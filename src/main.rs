mod app;

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Network snapshot (JSON) to open.
    snapshot: PathBuf,

    /// Engine configuration (JSON); defaults apply to anything left out.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log at debug level.
    #[arg(long)]
    verbose: bool,
}

fn main() -> eframe::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_target(false)
        .init();

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "contact-graph",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::ContactGraphApp::new(
                cc,
                args.snapshot.clone(),
                args.config.clone(),
            )))
        }),
    )
}
