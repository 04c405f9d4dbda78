//! statekv Development Backend
//!
//! Serves the key-value protocol from an in-memory engine.

use clap::Parser;
use statekv::backend::MemoryBackend;
use statekv::network::Server;
use statekv::Config;
use tracing_subscriber::{fmt, EnvFilter};

/// statekv development backend
#[derive(Parser, Debug)]
#[command(name = "statekv-backend")]
#[command(about = "In-memory key-value service for the statekv adapter")]
#[command(version)]
struct Args {
    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:50051")]
    listen: String,

    /// Worker threads serving connections
    #[arg(short, long, default_value = "8")]
    workers: usize,

    /// Idle connection read timeout in milliseconds
    #[arg(long, default_value = "5000")]
    read_timeout_ms: u64,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,statekv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("statekv backend v{}", statekv::VERSION);
    tracing::info!("Listen address: {}", args.listen);

    let config = Config::builder()
        .listen_addr(&args.listen)
        .worker_threads(args.workers)
        .read_timeout_ms(args.read_timeout_ms)
        .build();

    let server = match Server::bind(config, MemoryBackend::new()) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", args.listen, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
