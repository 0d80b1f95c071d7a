use clap::Parser;
use drone_ingest::parse_events;
use drone_protocol::ports::{COORDINATOR_RECEIVE_PORT, INGEST_SEND_PORT};
use drone_protocol::{encode_fire_event, Transport};
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "drone-ingest")]
#[command(about = "Send a file of fire events to the coordinator")]
struct Args {
    /// Path to the event file.
    path: String,

    /// Delay between sent events, in milliseconds.
    #[arg(long, default_value_t = 0)]
    delay_ms: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let contents = std::fs::read_to_string(&args.path)?;
    let events = parse_events(&contents);
    tracing::info!(count = events.len(), path = %args.path, "loaded fire events");

    let transport = Transport::bind(INGEST_SEND_PORT, drone_protocol::ports::INGEST_RECEIVE_PORT).await?;
    let coordinator_addr = SocketAddr::from(([127, 0, 0, 1], COORDINATOR_RECEIVE_PORT));

    for event in &events {
        let wire = encode_fire_event(event);
        transport.send_to(&wire, coordinator_addr).await?;
        tracing::debug!(%wire, "sent event");
        if args.delay_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(args.delay_ms)).await;
        }
    }

    tracing::info!("all events sent");
    Ok(())
}
