//! Main entry point for the device responder binary.

use std::io::Write;

use chrono::Local;
use clap::Parser;
use env_logger::fmt::Color;
use env_logger::Builder;
use log::{error, info, warn, LevelFilter};
use mac_address::get_mac_address;

use common::{DeviceType, DiscoveryConfig, Result};
use device::discovery::ResponderService;

const BANNER: &str = r#"
╔══════════════════════════════════════════╗
║     Device Discovery Responder v0.1.0    ║
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
#[command(about = "Answers local-network discovery requests")]
struct Args {
    /// Identity announced in discovery responses.
    #[arg(long, default_value = "temp_sensor")]
    device_type: String,

    #[arg(long)]
    port: Option<u16>,

    /// Wire framing: text or binary.
    #[arg(long)]
    format: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logger();
    println!("{}", BANNER);

    info!("Starting discovery responder...");
    let args = Args::parse();

    let device_type: DeviceType = args.device_type.parse()?;
    let mut config = DiscoveryConfig::from_env();
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(format) = &args.format {
        config.wire_format = format.parse()?;
    }

    info!("Device type: {}", device_type);
    match get_mac_address() {
        Ok(Some(mac)) => info!("Link identity: {}", mac),
        Ok(None) => info!("Link identity: unknown"),
        Err(err) => warn!("Could not read MAC address: {}", err),
    }

    let service = ResponderService::bind(
        &format!("0.0.0.0:{}", config.port),
        device_type,
        config.wire_format,
    )
    .await?;
    info!("✓ Responder ready on port {}", config.port);

    match service.run().await {
        Err(err) => {
            error!("Responder terminated: {}", err);
            Err(err)
        }
        Ok(()) => Ok(()),
    }
}
