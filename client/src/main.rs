use clap::Parser;
use client::controller::Controller;
use client::network::Client;
use log::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short = 's', long, default_value = "127.0.0.1:5555")]
    server: String,

    /// Walk a slow patrol instead of standing still
    #[arg(short = 'w', long)]
    wander: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    info!("Starting client...");
    let controller = if args.wander {
        info!("Wandering enabled");
        Controller::wander()
    } else {
        Controller::Still
    };

    let client = Client::connect(&args.server, controller).await?;
    client.run().await?;

    Ok(())
}
