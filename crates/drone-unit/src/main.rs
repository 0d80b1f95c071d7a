use clap::Parser;
use drone_domain::Location;
use drone_protocol::Transport;
use drone_unit::{UnitConfig, UnitError, UnitMission};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "drone-unit")]
#[command(about = "Run a single fire-suppression unit's mission loop")]
struct Args {
    /// Numeric drone id; ports and the wire id (`drone<N>`) derive from it.
    #[arg(short = 'n', long)]
    drone_number: u32,

    /// Home/base x coordinate.
    #[arg(long, default_value_t = 0)]
    home_x: i64,

    /// Home/base y coordinate.
    #[arg(long, default_value_t = 0)]
    home_y: i64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = UnitConfig::new(args.drone_number);

    tracing::info!(drone_id = %config.drone_id, send_port = config.send_port, receive_port = config.receive_port, "starting unit");

    let transport = Transport::bind(config.send_port, config.receive_port)
        .await
        .map_err(|source| UnitError::Bind {
            send_port: config.send_port,
            receive_port: config.receive_port,
            source,
        })?;
    let home = Location::new(args.home_x, args.home_y);

    let mut mission = UnitMission::new(config.drone_id, home, config.coordinator_addr, Arc::new(transport));
    mission.run().await;
}
