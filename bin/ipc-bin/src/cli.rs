use std::path::PathBuf;

use clap::Parser;
use ipc_source::config::{DEFAULT_CACHE_TTL, DEFAULT_CSV_URL, DEFAULT_FETCH_TIMEOUT};

#[derive(Parser, Debug)]
#[command(author, version, about = "IPC monthly variation and rent adjustment API", long_about = None)]
pub struct IpcCli {
    /// CSV dataset with the national CPI series
    #[arg(long, env = "IPC_CSV_URL", default_value = DEFAULT_CSV_URL)]
    pub csv_url: String,

    /// Directory holding the cached dataset
    #[arg(long, env = "IPC_CACHE_DIR", default_value = "config")]
    pub cache_dir: PathBuf,

    /// Seconds a cached dataset is served without revalidation
    #[arg(long, env = "IPC_CACHE_TTL_SECS", default_value_t = DEFAULT_CACHE_TTL.as_secs())]
    pub cache_ttl_secs: u64,

    /// Timeout for the dataset download
    #[arg(long, env = "IPC_FETCH_TIMEOUT_SECS", default_value_t = DEFAULT_FETCH_TIMEOUT.as_secs())]
    pub fetch_timeout_secs: u64,

    #[arg(long, env = "ADMIN_USER", default_value = "admin")]
    pub admin_user: String,

    #[arg(long, env = "ADMIN_PASS", default_value = "admin", hide_env_values = true)]
    pub admin_pass: String,

    /// API host
    #[arg(long, env = "API_HOST", default_value = "0.0.0.0")]
    pub api_host: String,

    /// API port
    #[arg(long, env = "API_PORT", default_value = "8000")]
    pub api_port: u16,

    /// Per-request timeout
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "30")]
    pub request_timeout_secs: u64,

    /// Comma-separated list of allowed origins, permissive when unset
    #[arg(long, env = "CORS_ALLOWED_ORIGINS")]
    pub cors_allowed_origins: Option<String>,
}
