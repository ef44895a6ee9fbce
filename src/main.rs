use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ridership_map::{api, config::ViewerConfig, loader::DataSource, panel_render, viewer::Viewer};

#[derive(Parser)]
#[command(name = "rmap")]
#[command(about = "Transit ridership map viewer")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct SourceArgs {
    /// Viewer configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base URL layer documents are fetched from
    #[arg(long, conflicts_with = "data_dir")]
    data_url: Option<String>,

    /// Local directory layer documents are read from
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load all layers and serve the viewer
    Serve {
        /// Port for HTTP API
        #[arg(short, long, default_value = "3000")]
        port: u16,

        #[command(flatten)]
        source: SourceArgs,
    },
    /// Load all layers and print the control panel as a tree
    Inspect {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Print the effective configuration as JSON
    Config {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

/// Initialize tracing with output to stderr (for printing commands) or stdout
fn init_tracing(use_stderr: bool) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG")
            .unwrap_or_else(|_| "ridership_map=debug,tower_http=debug".into()),
    );

    if use_stderr {
        // Printing commands keep stdout for their output
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn resolve(args: &SourceArgs) -> anyhow::Result<(ViewerConfig, DataSource)> {
    let config = ViewerConfig::load(args.config.as_deref())?;
    let source = match (&args.data_dir, &args.data_url) {
        (Some(dir), _) => DataSource::dir(dir),
        (None, Some(url)) => DataSource::http(url.clone()),
        (None, None) => config.data.source(),
    };
    Ok((config, source))
}

async fn serve(port: u16, args: &SourceArgs) -> anyhow::Result<()> {
    let (config, source) = resolve(args)?;
    tracing::info!("Loading {} layers from {}", config.layers.len(), source.describe());

    let viewer = Viewer::load(config, &source).await;
    let app = api::create_router(viewer);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    tracing::info!("Ridership map listening on http://127.0.0.1:{}", port);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn inspect(args: &SourceArgs) -> anyhow::Result<()> {
    let (config, source) = resolve(args)?;
    let viewer = Viewer::load(config, &source).await;
    print!(
        "{}",
        panel_render::render_panel(&viewer.title(), &viewer.panel(), &viewer.report())
    );
    Ok(())
}

fn print_config(path: Option<&Path>) -> anyhow::Result<()> {
    let config = ViewerConfig::load(path)?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let use_stderr = matches!(
        cli.command,
        Some(Commands::Inspect { .. }) | Some(Commands::Config { .. })
    );
    init_tracing(use_stderr);

    match cli.command {
        Some(Commands::Serve { port, source }) => serve(port, &source).await?,
        Some(Commands::Inspect { source }) => inspect(&source).await?,
        Some(Commands::Config { config }) => print_config(config.as_deref())?,
        None => {
            // Default: start server
            let source = SourceArgs {
                config: None,
                data_url: None,
                data_dir: None,
            };
            serve(3000, &source).await?;
        }
    }

    Ok(())
}
