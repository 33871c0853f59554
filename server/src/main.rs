use clap::Parser;
use log::{error, info};
use server::network::Server;
use std::sync::atomic::Ordering;

/// Main-method of the application.
/// Parses command-line arguments, then runs the authoritative server until
/// it stops or Ctrl+C arrives.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Command line arguments
    #[derive(Parser, Debug)]
    #[clap(author, version, about)]
    struct Args {
        /// Server IP address to bind to
        #[clap(short = 'H', long, default_value = "127.0.0.1")]
        host: String,
        /// Server port to listen on
        #[clap(short, long, default_value_t = shared::DEFAULT_PORT)]
        port: u16,
        /// Tick rate (updates per second)
        #[clap(short, long, default_value_t = shared::TICK_RATE)]
        tick_rate: u32,
        /// Maximum number of connected clients
        #[clap(short, long, default_value_t = shared::MAX_CLIENTS)]
        max_clients: usize,
        /// Number of enemies scattered across the overworld
        #[clap(short, long, default_value_t = shared::SWORD_ORC_COUNT)]
        enemies: usize,
        /// Participate in the simulation as a local player
        #[clap(long)]
        play: bool,
    }

    let args = Args::parse();

    let mut server = Server::new(
        &args.host,
        args.port,
        args.tick_rate,
        args.max_clients,
        args.play,
        args.enemies,
    )
    .await?;

    // Ctrl+C clears the stop flag; the run loop notices within a tick.
    let running = server.shutdown_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, shutting down");
            running.store(false, Ordering::Relaxed);
        }
    });

    if let Err(e) = server.run().await {
        error!("Server stopped: {}", e);
    }

    Ok(())
}
