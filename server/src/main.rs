use clap::Parser;
use log::{error, info};
use server::network::{Server, ServerConfig};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Server IP address to bind to
    #[clap(short = 'H', long, default_value = "0.0.0.0")]
    host: String,
    /// Server port to listen on
    #[clap(short, long, default_value_t = shared::DEFAULT_PORT)]
    port: u16,
    /// Text file describing the map, one row per line
    #[clap(short, long, default_value = "map.txt")]
    map: PathBuf,
    /// Half-width of the square revealed around a player after each step
    #[clap(short, long, default_value_t = shared::DEFAULT_VISIBILITY_RADIUS)]
    radius: u32,
    /// Seed for item and spawn placement
    #[clap(short, long)]
    seed: Option<u64>,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        ServerConfig {
            host: args.host,
            port: args.port,
            map_path: args.map,
            visibility_radius: args.radius,
            seed: args.seed,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = ServerConfig::from(Args::parse());
    let server = Server::from_config(&config).await?;

    tokio::select! {
        result = server.run() => {
            if let Err(e) = result {
                error!("Server stopped: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down gracefully...");
        }
    }

    Ok(())
}
