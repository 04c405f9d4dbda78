//! statekv CLI Client
//!
//! Command-line interface for reading and writing versioned state.

use clap::{Parser, Subcommand};
use statekv::client::RemoteClient;
use statekv::{
    Config, Height, QueryResultsIterator, RangeOptions, ResultsIterator, StateDbProvider,
    UpdateBatch, VersionedDb,
};
use tracing_subscriber::{fmt, EnvFilter};

/// statekv CLI
#[derive(Parser, Debug)]
#[command(name = "statekv-cli")]
#[command(about = "CLI for the statekv versioned state adapter")]
#[command(version)]
struct Args {
    /// Backend address
    #[arg(short, long, default_value = "127.0.0.1:50051")]
    server: String,

    /// Logical store (database) name
    #[arg(long, default_value = "channel1")]
    store: String,

    /// Per-request timeout in milliseconds
    #[arg(long, default_value = "1000")]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get the versioned value of a key
    Get { namespace: String, key: String },

    /// Write a value and record the height as savepoint
    Put {
        namespace: String,
        key: String,
        value: String,
        #[arg(long)]
        block: u64,
        #[arg(long, default_value = "0")]
        tx: u64,
    },

    /// Delete a key and record the height as savepoint
    Del {
        namespace: String,
        key: String,
        #[arg(long)]
        block: u64,
        #[arg(long, default_value = "0")]
        tx: u64,
    },

    /// Scan a key range; an empty end scans to the end of the namespace
    Scan {
        namespace: String,
        #[arg(default_value = "")]
        start: String,
        #[arg(default_value = "")]
        end: String,
        /// Maximum records (0 = unbounded)
        #[arg(short, long, default_value = "0")]
        limit: u32,
    },

    /// Show the latest savepoint of the store
    Savepoint,

    /// Ping the backend
    Ping,

    /// Drop every key in the backend
    DropAll,
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,statekv=debug"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> statekv::Result<()> {
    let config = Config::builder()
        .backend_addr(&args.server)
        .request_timeout_ms(args.timeout_ms)
        .build();

    let provider = StateDbProvider::new(&config)?;
    let store = provider.store(&args.store)?;

    match args.command {
        Commands::Get { namespace, key } => match store.get_state(&namespace, &key)? {
            Some(vv) => println!(
                "{} @ {}",
                String::from_utf8_lossy(&vv.value),
                vv.version
            ),
            None => println!("(not found)"),
        },
        Commands::Put {
            namespace,
            key,
            value,
            block,
            tx,
        } => {
            let height = Height::new(block, tx);
            let mut batch = UpdateBatch::new();
            batch.put(&namespace, &key, value.into_bytes(), height);
            store.apply_updates(&batch, Some(height))?;
            println!("OK");
        }
        Commands::Del {
            namespace,
            key,
            block,
            tx,
        } => {
            let height = Height::new(block, tx);
            let mut batch = UpdateBatch::new();
            batch.delete(&namespace, &key, height);
            store.apply_updates(&batch, Some(height))?;
            println!("OK");
        }
        Commands::Scan {
            namespace,
            start,
            end,
            limit,
        } => {
            let mut scanner = store.get_state_range_scan_iterator_with_options(
                &namespace,
                &start,
                &end,
                RangeOptions::with_limit(limit),
            )?;
            while let Some(kv) = scanner.next_result()? {
                println!(
                    "{} = {} @ {}",
                    kv.key,
                    String::from_utf8_lossy(&kv.value.value),
                    kv.value.version
                );
            }
            let bookmark = scanner.bookmark_and_close()?;
            if !bookmark.is_empty() {
                println!("(more; resume from {:?})", bookmark);
            }
        }
        Commands::Savepoint => match store.get_latest_save_point()? {
            Some(height) => println!("{}", height),
            None => println!("(no savepoint)"),
        },
        Commands::DropAll => {
            provider.drop_all()?;
            println!("OK");
        }
        Commands::Ping => {
            RemoteClient::new(&config)?.ping()?;
            println!("PONG");
        }
    }

    Ok(())
}
