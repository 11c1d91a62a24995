// Copyright © 2025 rustblast.dev
// Licensed under RustBlast License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use clap::{builder::ValueParser, Parser};
use std::{collections::HashSet, env, path::PathBuf, sync::LazyLock};

#[cfg(not(test))]
pub static SETTINGS: LazyLock<Settings> = LazyLock::new(Settings::parse);

#[cfg(test)]
pub static SETTINGS: LazyLock<Settings> = LazyLock::new(Settings::new_for_test);

#[derive(Debug, Parser)]
#[clap(
    name = "rustblast",
    about = "A self-hosted WhatsApp campaign dispatch service: contacts, managed files,
    scheduled blast campaigns and per-recipient delivery tracking over interchangeable providers.",
    version = env!("CARGO_PKG_VERSION")
)]
pub struct Settings {
    /// rustblast log level (default: "info")
    #[clap(
        long,
        default_value = "info",
        env,
        help = "Set the log level for rustblast"
    )]
    pub rustblast_log_level: String,

    /// rustblast HTTP port (default: 15730)
    #[clap(
        long,
        default_value = "15730",
        env,
        help = "Set the HTTP port for rustblast"
    )]
    pub rustblast_http_port: i32,

    /// The IP address that the node binds to, in IPv4 format (e.g., 192.168.1.1).
    #[clap(
        long,
        env,
        default_value = "0.0.0.0",
        help = "The IP address that the HTTP server binds to, in IPv4 format (e.g., 192.168.1.1).",
        value_parser = ValueParser::new(|s: &str| {
            if s.parse::<std::net::Ipv4Addr>().is_err() {
                return Err("The bind IP address must be a valid IPv4 address.".to_string());
            }
            Ok(s.to_string())
        })
    )]
    pub rustblast_bind_ip: Option<String>,

    /// CORS allowed origins (default: "*")
    #[clap(
        long,
        default_value = "*",
        env,
        help = "Set the allowed CORS origins (comma-separated list, e.g., \"https://example.com, https://another.com\")",
        value_parser = ValueParser::new(|s: &str| -> Result<HashSet<String>, String> {
            let set: HashSet<String> = s.split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect();
            Ok(set)
        })
    )]
    pub rustblast_cors_origins: HashSet<String>,

    /// CORS max age in seconds (default: 86400)
    #[clap(
        long,
        default_value = "86400",
        env,
        help = "Set the CORS max age in seconds"
    )]
    pub rustblast_cors_max_age: i32,

    /// Enable ANSI logs (default: true)
    #[clap(long, default_value = "true", env, help = "Enable ANSI formatted logs")]
    pub rustblast_ansi_logs: bool,

    /// Enable log file output (default: false)
    /// If false, logs will be printed to stdout
    #[clap(
        long,
        default_value = "false",
        env,
        help = "Enable log file output (otherwise logs go to stdout)"
    )]
    pub rustblast_log_to_file: bool,

    /// Maximum number of log files (default: 5)
    #[clap(
        long,
        default_value = "5",
        env,
        help = "Set the maximum number of server log files"
    )]
    pub rustblast_max_server_log_files: usize,

    #[clap(
        long,
        env,
        help = "Set the data directory for rustblast (metadata database, file blobs, logs)",
        value_parser = ValueParser::new(|s: &str| {
            let path = PathBuf::from(s);
            if !path.is_absolute() {
                return Err("Path must be an absolute directory path".to_string());
            }
            if !path.exists() {
                return Err(format!("Path {:?} does not exist", path));
            }
            if !path.is_dir() {
                return Err(format!("Path {:?} is not a directory", path));
            }
            Ok(s.to_string())
        })
    )]
    pub rustblast_root_dir: String,

    #[clap(
        long,
        env,
        default_value = "134217728",
        help = "Set the cache size for the rustblast metadata database in bytes"
    )]
    pub rustblast_metadata_cache_size: Option<usize>,

    #[clap(
        long,
        env,
        default_value = "false",
        help = "Keep metadata in memory instead of on disk (non-persistent; primarily for testing)"
    )]
    pub rustblast_metadata_memory_mode_enabled: bool,

    #[clap(
        long,
        default_value = "true",
        env,
        help = "Enable compression for the open api server"
    )]
    pub rustblast_http_compression_enabled: bool,

    /// Scheduler poll interval in seconds (default: 10)
    #[clap(
        long,
        default_value = "10",
        env,
        help = "The interval (in seconds) between scans for due scheduled campaigns",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub rustblast_scheduler_interval_seconds: u64,
}

impl Settings {
    #[cfg(test)]
    fn new_for_test() -> Self {
        let test_root = std::env::temp_dir().join("rustblast_test_data");
        let _ = std::fs::create_dir_all(&test_root);
        Self {
            rustblast_log_level: "info".to_string(),
            rustblast_http_port: 15730,
            rustblast_bind_ip: Default::default(),
            rustblast_cors_origins: Default::default(),
            rustblast_cors_max_age: 86400,
            rustblast_ansi_logs: false,
            rustblast_log_to_file: false,
            rustblast_max_server_log_files: 5,
            rustblast_root_dir: test_root.to_string_lossy().into_owned(),
            rustblast_metadata_cache_size: None,
            rustblast_metadata_memory_mode_enabled: true,
            rustblast_http_compression_enabled: true,
            rustblast_scheduler_interval_seconds: 10,
        }
    }
}
