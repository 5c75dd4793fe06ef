//! Virtual Tourist CLI - pins, photo albums and the saved map region.
//!
//! # Usage
//!
//! ```bash
//! # Create or upgrade the local database
//! vt migrate
//!
//! # Drop a pin on San Francisco and fetch its album
//! vt pin add 37.7749 -122.4194
//! vt album show 37.7749 -122.4194
//!
//! # Download every image of the album
//! vt album download 37.7749 -122.4194
//!
//! # Remember where the map was
//! vt region save 37.7749 -122.4194 0.5 0.5
//! ```
//!
//! # Commands
//!
//! - `migrate` - Apply database migrations
//! - `pin add|list|remove` - Manage pins
//! - `album show|reload|download` - Fetch and materialise a pin's album
//! - `photo remove` - Drop a single photo from an album
//! - `region show|save` - Read or persist the map region
//!
//! Logging goes to stderr and honours `RUST_LOG` and `VT_LOG_FORMAT`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

const DEFAULT_LOG_FILTER: &str = "virtual_tourist=info,vt=info";

#[derive(Parser)]
#[command(name = "vt")]
#[command(author, version, about = "Virtual Tourist CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply database migrations
    Migrate,
    /// Manage pins
    Pin {
        #[command(subcommand)]
        action: PinAction,
    },
    /// Fetch and download a pin's photo album
    Album {
        #[command(subcommand)]
        action: AlbumAction,
    },
    /// Manage single photos
    Photo {
        #[command(subcommand)]
        action: PhotoAction,
    },
    /// Read or save the map region
    Region {
        #[command(subcommand)]
        action: RegionAction,
    },
}

/// A latitude/longitude pair given on the command line.
#[derive(clap::Args)]
struct CoordinateArgs {
    /// Latitude in degrees, -90 to 90
    #[arg(allow_negative_numbers = true)]
    latitude: f64,

    /// Longitude in degrees, -180 to 180
    #[arg(allow_negative_numbers = true)]
    longitude: f64,
}

#[derive(Subcommand)]
enum PinAction {
    /// Drop a pin at a coordinate
    Add(CoordinateArgs),
    /// List all pins
    List,
    /// Remove the pin at a coordinate together with its album
    Remove(CoordinateArgs),
}

#[derive(Subcommand)]
enum AlbumAction {
    /// Show a pin's album, fetching one on first visit
    Show(CoordinateArgs),
    /// Replace a pin's album with a fresh sample
    Reload(CoordinateArgs),
    /// Download every photo of a pin's album that is still a stub
    Download(CoordinateArgs),
}

#[derive(Subcommand)]
enum PhotoAction {
    /// Remove a photo by ID
    Remove {
        /// Photo ID as shown by `vt album show`
        id: i64,
    },
}

#[derive(Subcommand)]
enum RegionAction {
    /// Print the saved map region
    Show,
    /// Save the map region
    Save {
        #[command(flatten)]
        center: CoordinateArgs,

        /// Visible latitude span in degrees
        latitude_delta: f64,

        /// Visible longitude span in degrees
        longitude_delta: f64,
    },
}

/// Install the global subscriber. Logs go to stderr so stdout stays
/// parseable; `VT_LOG_FORMAT=json` switches to one JSON object per line.
fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    let is_json = std::env::var("VT_LOG_FORMAT").is_ok_and(|format| format == "json");
    let json_layer = is_json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer =
        (!is_json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Pin { action } => match action {
            PinAction::Add(at) => commands::pin::add(at.latitude, at.longitude).await?,
            PinAction::List => commands::pin::list().await?,
            PinAction::Remove(at) => commands::pin::remove(at.latitude, at.longitude).await?,
        },
        Commands::Album { action } => match action {
            AlbumAction::Show(at) => commands::album::show(at.latitude, at.longitude).await?,
            AlbumAction::Reload(at) => commands::album::reload(at.latitude, at.longitude).await?,
            AlbumAction::Download(at) => {
                commands::album::download(at.latitude, at.longitude).await?;
            }
        },
        Commands::Photo { action } => match action {
            PhotoAction::Remove { id } => commands::photo::remove(id).await?,
        },
        Commands::Region { action } => match action {
            RegionAction::Show => commands::region::show().await?,
            RegionAction::Save {
                center,
                latitude_delta,
                longitude_delta,
            } => {
                commands::region::save(
                    center.latitude,
                    center.longitude,
                    latitude_delta,
                    longitude_delta,
                )
                .await?;
            }
        },
    }
    Ok(())
}
