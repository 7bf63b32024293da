use std::env;
use std::process;

use log::{error, info};

mod codec;
mod config;
mod counter;
mod error;
mod server;
mod storage;

use crate::config::Config;
use crate::error::Result;

const DEFAULT_LOG_FILTER: &str = "request_window=info,actix_server=info,actix_web=info";

async fn start() -> Result<()> {
    let config = Config::from_env()?;
    info!(
        "Counting requests over the last {}s, state in {}",
        config.retention.num_seconds(),
        config.state_file.display()
    );

    let shutdown = server::shutdown_signal()?;
    server::run(&config, shutdown).await
}

#[actix_rt::main]
async fn main() {
    dotenv::dotenv().ok();
    if env::var_os("RUST_LOG").is_none() {
        env::set_var("RUST_LOG", DEFAULT_LOG_FILTER);
    }
    env_logger::init();

    // Startup and shutdown failures both mean the window cannot be
    // trusted or kept, so they end the process.
    if let Err(e) = start().await {
        error!("{}", e);
        process::exit(1);
    }
}
