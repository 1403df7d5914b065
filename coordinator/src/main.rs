//! Main entry point for the discovery coordinator binary.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use clap::Parser;
use env_logger::fmt::Color;
use env_logger::Builder;
use log::{error, info, LevelFilter};
use serde::Serialize;
use uuid::Uuid;

use common::{DeviceAddr, DiscoveryConfig, Responder, Result};
use coordinator::discovery::start_discovery;
use coordinator::transport::{Transport, UdpTransport};

const BANNER: &str = r#"
╔══════════════════════════════════════════╗
║   Device Discovery Coordinator v0.1.0    ║
╚══════════════════════════════════════════╝
"#;

fn setup_logger() {
    let mut builder = Builder::from_default_env();

    builder
        .format(|buf, record| {
            let mut level_style = buf.style();
            let level_color = match record.level() {
                log::Level::Error => Color::Red,
                log::Level::Warn => Color::Yellow,
                log::Level::Info => Color::Green,
                log::Level::Debug => Color::Cyan,
                log::Level::Trace => Color::White,
            };

            writeln!(
                buf,
                "{} {} [{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                level_style.set_color(level_color).value(record.level()),
                record.target(),
                record.args()
            )
        })
        .filter(None, LevelFilter::Info)
        .init();
}

#[derive(Parser)]
#[command(about = "Discovers devices on the local network")]
struct Args {
    /// Explicit peer addresses (ip:port, comma separated). Broadcast
    /// when omitted.
    #[arg(long, value_delimiter = ',')]
    targets: Vec<String>,

    #[arg(long)]
    port: Option<u16>,

    /// Wire framing: text or binary.
    #[arg(long)]
    format: Option<String>,

    /// Seconds to keep listening for responses.
    #[arg(long, default_value_t = 10)]
    window_secs: u64,
}

#[derive(Serialize)]
struct DiscoverySummary {
    session_id: Uuid,
    responders: Vec<Responder>,
    dropped: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logger();
    println!("{}", BANNER);

    info!("Starting discovery coordinator...");
    let args = Args::parse();

    let mut config = DiscoveryConfig::from_env();
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(format) = &args.format {
        config.wire_format = format.parse()?;
    }
    config.listen_window = Some(Duration::from_secs(args.window_secs));
    info!("Configuration loaded successfully");

    let targets: Vec<DeviceAddr> = if args.targets.is_empty() {
        vec![DeviceAddr::Broadcast]
    } else {
        args.targets
            .iter()
            .map(|t| -> Result<DeviceAddr> { Ok(DeviceAddr::Ip(t.parse()?)) })
            .collect::<Result<_>>()?
    };
    info!("Probing {} target(s)", targets.len());

    let transport = UdpTransport::bind(&config).await.map_err(|e| {
        error!("Failed to bring the transport up: {}", e);
        e
    })?;
    info!("✓ Transport ready on port {}", config.port);

    let handle = start_discovery(config, Transport::Udp(transport), targets).await?;
    info!("✓ Discovery session {} running", handle.session_id());

    let session_id = handle.session_id();
    let registry = Arc::clone(handle.registry());
    if let Err(err) = handle.join().await {
        error!("Collector failed: {}", err);
    }

    let summary = DiscoverySummary {
        session_id,
        responders: registry.snapshot(),
        dropped: registry.dropped(),
    };
    info!(
        "Discovered {} device(s), {} response(s) dropped",
        summary.responders.len(),
        summary.dropped
    );
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
