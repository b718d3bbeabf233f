use clap::{Parser, Subcommand};

#[cfg(not(feature = "dhat-heap"))]
use mimalloc::MiMalloc;

use crate::{config::Config, get_matrix::GetMatrixArgs, optimize::OptimizeArgs};

mod config;
mod get_matrix;
mod input;
mod optimize;
mod parsers;
mod pipeline;
mod report;
mod schema;
mod travel_cost;

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

#[cfg(not(feature = "dhat-heap"))]
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Geocodes the stops, fetches the matrix and plans the routes
    #[command(visible_alias = "o")]
    Optimize {
        #[command(flatten)]
        args: OptimizeArgs,
    },
    /// Geocodes the stops and fetches the matrix into the caches
    Matrix {
        #[command(flatten)]
        args: GetMatrixArgs,
    },
    /// Prints the JSON schema of the input file
    Schema,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    dotenvy::dotenv().ok();
    dotenvy::from_filename("./.env.local").ok();

    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    let config = Config::from_env();

    match cli.command {
        Commands::Optimize { args } => optimize::run(args, &config).await?,
        Commands::Matrix { args } => get_matrix::run(args, &config).await?,
        Commands::Schema => schema::run()?,
    }

    Ok(())
}
