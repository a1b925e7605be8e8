use anyhow::Result;
use clap::Parser;
use lakeshore335::config::Config;
use lakeshore335::driver::Lakeshore335;
use lakeshore335::logging::{get_logger, init_logging};
use lakeshore335::web::AppState;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Lake Shore 335 temperature controller daemon
#[derive(Debug, Parser)]
#[command(version = env!("CARGO_PKG_VERSION"), about)]
struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address the HTTP API binds to
    #[arg(long)]
    host: Option<String>,

    /// Port the HTTP API listens on
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load_from(args.config.as_deref())
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;
    if let Some(host) = args.host {
        config.web.host = host;
    }
    if let Some(port) = args.port {
        config.web.port = port;
    }
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    init_logging(&config.logging)
        .map_err(|e| anyhow::anyhow!("Failed to initialise logging: {}", e))?;

    let logger = get_logger("main");
    logger.info(&format!(
        "Lake Shore 335 adapter {} starting up",
        env!("CARGO_PKG_VERSION")
    ));

    let (host, port) = (config.web.host.clone(), config.web.port);
    let logging = config.logging.clone();
    let mut device = Lakeshore335::new(config);

    // Stay up on a failed open so the state can be read over the API
    if device.connect().await.is_err() {
        logger.warn("Device is not operational; serving status only");
    }

    let state = AppState::new(Arc::new(Mutex::new(device)), logging);
    lakeshore335::web::serve(state, &host, port).await?;

    logger.info("Web server stopped");
    Ok(())
}
