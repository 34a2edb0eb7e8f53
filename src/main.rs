//! Physio Timeline CLI
//!
//! Render, inspect and serve physiological sensor timelines.

use clap::{Parser, Subcommand};
use physio_timeline::{
    config::Config,
    core::{simulate_with, BrushSelection, ZoomTransform},
    dashboard::Dashboard,
    data::{load_csv, summarize},
    VERSION,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "physio-timeline")]
#[command(version = VERSION)]
#[command(about = "Interactive timeline explorer for physiological sensor data", long_about = None)]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the timeline and simulator charts as SVG
    Render {
        /// CSV file to load
        #[arg(long, short)]
        data: Option<PathBuf>,

        /// Output directory for the SVG files
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Brush selection in pixels, as X0,X1
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        brush: Option<Vec<f64>>,

        /// Zoom transform, as K,X
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        zoom: Option<Vec<f64>>,

        /// Stress slider value for the simulator
        #[arg(long)]
        stress: Option<f64>,

        /// Exercise slider value for the simulator
        #[arg(long)]
        exercise: Option<f64>,
    },

    /// Show dataset extents and per-channel statistics
    Inspect {
        /// CSV file to load
        #[arg(long, short)]
        data: Option<PathBuf>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print simulated points as JSON
    Simulate {
        #[arg(long, default_value = "0")]
        stress: f64,

        #[arg(long, default_value = "0")]
        exercise: f64,
    },

    /// Show the tooltip for the marker under a pixel
    Hover {
        /// Pixel x inside the plotting area
        #[arg(allow_hyphen_values = true)]
        x: f64,

        /// Pixel y inside the plotting area
        #[arg(allow_hyphen_values = true)]
        y: f64,

        /// CSV file to load
        #[arg(long, short)]
        data: Option<PathBuf>,

        /// Brush selection in pixels, as X0,X1
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        brush: Option<Vec<f64>>,

        /// Zoom transform, as K,X
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        zoom: Option<Vec<f64>>,
    },

    /// Serve the dashboard over HTTP
    #[cfg(feature = "server")]
    Serve {
        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,

        /// CSV file to load
        #[arg(long, short)]
        data: Option<PathBuf>,
    },

    /// Show configuration
    Config {
        /// Write the current configuration to the config file
        #[arg(long)]
        save: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref());

    match cli.command {
        Commands::Render {
            data,
            output,
            brush,
            zoom,
            stress,
            exercise,
        } => {
            cmd_render(&config, data, output, brush, zoom, stress, exercise);
        }
        Commands::Inspect { data, json } => {
            cmd_inspect(&config, data, json);
        }
        Commands::Simulate { stress, exercise } => {
            cmd_simulate(&config, stress, exercise);
        }
        Commands::Hover {
            x,
            y,
            data,
            brush,
            zoom,
        } => {
            cmd_hover(&config, x, y, data, brush, zoom);
        }
        #[cfg(feature = "server")]
        Commands::Serve { port, data } => {
            cmd_serve(config, port, data);
        }
        Commands::Config { save } => {
            cmd_config(cli.config, &config, save);
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> Config {
    match path {
        Some(path) => Config::load_from(path).unwrap_or_else(|e| {
            eprintln!("Error loading config {}: {e}", path.display());
            std::process::exit(1);
        }),
        None => Config::load().unwrap_or_else(|e| {
            eprintln!("Warning: ignoring unreadable config file: {e}");
            Config::default()
        }),
    }
}

fn load_dashboard(config: &Config, data: Option<PathBuf>) -> Dashboard {
    let path = data.unwrap_or_else(|| config.data_path.clone());
    Dashboard::load_path(&path, config).unwrap_or_else(|e| {
        eprintln!("Error loading data: {e}");
        std::process::exit(1);
    })
}

/// Parse a two-number option, exiting with a message when malformed.
fn pair(name: &str, values: &[f64]) -> [f64; 2] {
    match values {
        [a, b] if a.is_finite() && b.is_finite() => [*a, *b],
        _ => {
            eprintln!("Error: --{name} expects two numbers separated by a comma");
            std::process::exit(1);
        }
    }
}

/// Replay zoom and brush options onto the timeline. Zoom goes first; a
/// brush afterwards replaces the zoomed view.
fn apply_gestures(dashboard: &mut Dashboard, brush: Option<Vec<f64>>, zoom: Option<Vec<f64>>) {
    if let Some(zoom) = zoom {
        let [k, x] = pair("zoom", &zoom);
        if k <= 0.0 {
            eprintln!("Error: zoom scale must be positive");
            std::process::exit(1);
        }
        let applied = dashboard.timeline.on_zoom(ZoomTransform::new(k, x, 0.0));
        println!("Zoom: k={} x={}", applied.k, applied.x);
    }
    if let Some(brush) = brush {
        let [x0, x1] = pair("brush", &brush);
        dashboard
            .timeline
            .on_brush_end(Some(BrushSelection::new(x0, x1)));
        let state = dashboard.timeline.state();
        println!(
            "Brush: {} of {} readings selected",
            state.displayed, state.total
        );
    }
}

fn cmd_render(
    config: &Config,
    data: Option<PathBuf>,
    output: Option<PathBuf>,
    brush: Option<Vec<f64>>,
    zoom: Option<Vec<f64>>,
    stress: Option<f64>,
    exercise: Option<f64>,
) {
    let mut dashboard = load_dashboard(config, data);
    apply_gestures(&mut dashboard, brush, zoom);

    if stress.is_some() || exercise.is_some() {
        dashboard.simulate(stress.unwrap_or(0.0), exercise.unwrap_or(0.0));
    }

    let output_dir = output.unwrap_or_else(|| config.output_path.clone());
    if let Err(e) = std::fs::create_dir_all(&output_dir) {
        eprintln!("Error creating output directory: {e}");
        std::process::exit(1);
    }

    let files = [
        ("timeline.svg", dashboard.timeline_svg()),
        ("simulator.svg", dashboard.simulator_svg()),
    ];
    for (name, svg) in files {
        let path = output_dir.join(name);
        if let Err(e) = std::fs::write(&path, svg) {
            eprintln!("Error writing {}: {e}", path.display());
            std::process::exit(1);
        }
        println!("Wrote {}", path.display());
    }
}

fn cmd_inspect(config: &Config, data: Option<PathBuf>, json: bool) {
    let path = data.unwrap_or_else(|| config.data_path.clone());
    let readings = load_csv(&path).unwrap_or_else(|e| {
        eprintln!("Error loading data: {e}");
        std::process::exit(1);
    });
    let summary = summarize(&readings);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).unwrap_or_else(|_| "Error".to_string())
        );
        return;
    }

    println!("Dataset");
    println!("=======");
    println!();
    println!("File: {}", path.display());
    println!("Readings: {}", summary.count);
    if let (Some(start), Some(end)) = (summary.start, summary.end) {
        println!("Start: {}", start.to_rfc3339());
        println!("End:   {}", end.to_rfc3339());
        println!("Span:  {}s", (end - start).num_seconds());
    }
    println!();
    println!(
        "{:<6} {:>10} {:>10} {:>10} {:>10}",
        "", "min", "max", "mean", "std"
    );
    for c in &summary.channels {
        println!(
            "{:<6} {:>10.2} {:>10.2} {:>10.2} {:>10.2}  {}",
            c.channel.label(),
            c.min,
            c.max,
            c.mean,
            c.std_dev,
            c.channel.unit()
        );
    }
}

fn cmd_simulate(config: &Config, stress: f64, exercise: f64) {
    let points = simulate_with(&config.simulator.slider, stress, exercise);
    println!(
        "{}",
        serde_json::to_string_pretty(&points).unwrap_or_else(|_| "Error".to_string())
    );
}

fn cmd_hover(
    config: &Config,
    x: f64,
    y: f64,
    data: Option<PathBuf>,
    brush: Option<Vec<f64>>,
    zoom: Option<Vec<f64>>,
) {
    let mut dashboard = load_dashboard(config, data);
    apply_gestures(&mut dashboard, brush, zoom);

    match dashboard.timeline.hit_test(x, y) {
        Some((marker, tooltip)) => {
            println!("{} marker #{}", marker.channel, marker.index);
            for line in tooltip.lines(dashboard.tz()) {
                println!("  {line}");
            }
        }
        None => println!("No marker at ({x}, {y})"),
    }
}

#[cfg(feature = "server")]
fn cmd_serve(mut config: Config, port: Option<u16>, data: Option<PathBuf>) {
    use physio_timeline::server::{run, ServerConfig};

    if let Some(data) = data {
        config.data_path = data;
    }
    let port = port.unwrap_or(config.server_port);

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Error starting runtime: {e}");
        std::process::exit(1);
    });

    runtime.block_on(async move {
        let (addr, shutdown_tx) = match run(ServerConfig::new(port, config)).await {
            Ok(server) => server,
            Err(e) => {
                eprintln!("Error starting server: {e}");
                std::process::exit(1);
            }
        };
        println!("Serving on http://{addr}");
        println!("Press Ctrl+C to stop.");

        if let Err(e) = tokio::signal::ctrl_c().await {
            eprintln!("Error waiting for Ctrl+C: {e}");
        }
        let _ = shutdown_tx.send(());
        println!();
        println!("Server stopped.");
    });
}

fn cmd_config(path: Option<PathBuf>, config: &Config, save: bool) {
    let path = path.unwrap_or_else(Config::config_path);

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", path);
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(config).unwrap_or_else(|_| "Error".to_string())
    );

    if save {
        if let Err(e) = config.save_to(&path) {
            eprintln!("Error saving config: {e}");
            std::process::exit(1);
        }
        println!();
        println!("Saved.");
    }
}
