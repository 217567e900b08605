use std::sync::Arc;

use anyhow::Result;
use boxleo_proxy::server;
use boxleo_proxy::sources::upstream::BoxleoClient;
use boxleo_proxy::utils::config_loader;
use boxleo_proxy::utils::logging::{self, LogLevel};
use clap::Parser;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = "boxleo-proxy.yaml")]
    config: String,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // -------------------------------
    // 1. Load YAML config
    // -------------------------------

    let service_config = config_loader::run(&args.config).await?;
    logging::run(&service_config, args.log_level);

    // -------------------------------
    // 2. Create upstream client
    //
    // token and cancellation reasons are fetched lazily on first use
    // -------------------------------

    let client = Arc::new(BoxleoClient::from_config(&service_config)?);

    // -------------------------------
    // 3. Start http server
    // -------------------------------

    info!(
        "Service starting, proxying {} as /api/{}",
        service_config.upstream.base_url,
        service_config.service_name()
    );
    server::server::start(&service_config, client).await?;

    Ok(())
}
