use crate::application::{CreatePolicy, EngineSettings};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Command-line and environment configuration for the server binary.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Address the HTTP server listens on.
    #[arg(long, env = "CABHAIL_BIND", default_value = "0.0.0.0:9000")]
    pub bind: SocketAddr,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, env = "CABHAIL_DB_PATH")]
    pub db_path: Option<PathBuf>,

    /// Deadline for each storage call, in milliseconds.
    #[arg(long, env = "CABHAIL_STORE_TIMEOUT_MS", default_value_t = 5000)]
    pub store_timeout_ms: u64,

    /// Expire verification codes after this many seconds. Codes never
    /// expire when unset.
    #[arg(long, env = "CABHAIL_CODE_TTL_SECS")]
    pub code_ttl_secs: Option<u64>,

    /// Refuse a new cab request while the rider already has an active one.
    #[arg(long, env = "CABHAIL_EXCLUSIVE_REQUESTS")]
    pub exclusive_requests: bool,

    /// Open storage, log the resolved settings and exit without serving.
    #[arg(long)]
    pub dry_run: bool,
}

impl Cli {
    pub fn settings(&self) -> EngineSettings {
        EngineSettings {
            store_timeout: Duration::from_millis(self.store_timeout_ms),
            code_ttl: self.code_ttl_secs.map(Duration::from_secs),
            create_policy: if self.exclusive_requests {
                CreatePolicy::Exclusive
            } else {
                CreatePolicy::Legacy
            },
        }
    }
}
