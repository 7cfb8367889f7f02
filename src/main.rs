mod state;
mod data;
mod processing;
mod ui;
mod app;

use std::path::PathBuf;

use app::WinestatApp;
use clap::Parser;
use data::loader::{self, Dataset};
use eframe::egui;
use processing::report::WineReport;
use state::app_state::AppState;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Grouped wine statistics by alcohol class")]
struct Args {
    /// Dataset to open (.json, .csv, .xls or .xlsx). Defaults to the last
    /// opened dataset, then the bundled sample.
    dataset: Option<PathBuf>,

    /// Print the statistics tables to stdout instead of opening a window
    #[arg(long)]
    print: bool,

    /// With --print, emit JSON instead of text tables
    #[arg(long, requires = "print")]
    json: bool,

    /// Include the number of values behind each statistic
    #[arg(long)]
    counts: bool,

    /// Settings file (default: $XDG_CONFIG_HOME/winestat.json)
    #[arg(long)]
    settings: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let settings_path = args.settings.clone().unwrap_or_else(AppState::default_path);
    let mut state = AppState::load(&settings_path);

    if args.print {
        let dataset = match &args.dataset {
            Some(path) => loader::load_dataset(path)?,
            None => Dataset::bundled(),
        };
        let report = WineReport::compute(&dataset.records);
        if args.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print!("{}", report.to_text(args.counts || state.show_counts));
        }
        return Ok(());
    }

    let dataset = open_initial_dataset(&args, &mut state);
    if args.counts {
        state.show_counts = true;
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("winestat")
            .with_inner_size([960.0, 640.0])
            .with_min_inner_size([600.0, 400.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "winestat",
        options,
        Box::new(move |cc| Ok(Box::new(WinestatApp::new(cc, state, settings_path, dataset)))),
    )?;
    Ok(())
}

/// Command-line dataset first, then the remembered one, then the bundled
/// sample. A remembered dataset that no longer loads is forgotten.
fn open_initial_dataset(args: &Args, state: &mut AppState) -> Dataset {
    if let Some(path) = &args.dataset {
        match loader::load_dataset(path) {
            Ok(dataset) => {
                state.last_dataset = Some(path.clone());
                return dataset;
            }
            Err(e) => tracing::error!("Failed to load {:?}: {e}", path),
        }
    } else if let Some(path) = state.last_dataset.clone() {
        match loader::load_dataset(&path) {
            Ok(dataset) => return dataset,
            Err(e) => {
                tracing::warn!("Cannot reopen last dataset {:?}: {e}", path);
                state.last_dataset = None;
            }
        }
    }
    Dataset::bundled()
}
