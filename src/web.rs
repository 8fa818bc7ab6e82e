#![cfg(not(tarpaulin_include))]

use clap::Parser;
use pap_tracker::app::{self, AppConfig};

/// Command line options of the web host
#[derive(Parser, Debug)]
#[command(name = "pap-web", about = "Verificación de Entregas de PAP")]
struct Args {
    /// Address and port to listen on
    #[arg(long, default_value = "127.0.0.1:3000")]
    bind: String,

    /// Largest accepted upload, in MiB
    #[arg(long, default_value_t = 20)]
    max_upload_mb: usize,
}

/// Main entry point for the web application
///
/// Starts the page and its API. Logging follows `RUST_LOG` and defaults to
/// `info`.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = AppConfig {
        bind: args.bind,
        max_upload_bytes: args.max_upload_mb * 1024 * 1024,
    };

    app::run(config).await
}
