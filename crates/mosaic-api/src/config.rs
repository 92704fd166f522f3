use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command, ValueHint};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use mosaic_compute::linalg::{DEFAULT_GRID_RANGE, DEFAULT_GRID_SIZE};
use mosaic_compute::stats::DEFAULT_BINS;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Request body cap, applies to CSV uploads.
    pub max_upload_bytes: usize,
    pub preview_rows: usize,
    pub default_grid_size: usize,
    pub default_grid_range: f64,
    /// Largest `grid_size` a transform request may ask for.
    pub max_grid_size: usize,
    pub default_bins: usize,
    /// Largest `bins` a histogram request may ask for.
    pub max_bins: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: String::from("127.0.0.1"),
            port: 8000,
            max_upload_bytes: 10 * 1024 * 1024,
            preview_rows: 10,
            default_grid_size: DEFAULT_GRID_SIZE,
            default_grid_range: DEFAULT_GRID_RANGE,
            max_grid_size: 500,
            default_bins: DEFAULT_BINS,
            max_bins: 10_000,
        }
    }
}

impl ServerConfig {
    /// Build the configuration from an optional JSON file, then apply the
    /// `--host` / `--port` overrides.
    pub fn from_arguments(matches: &ArgMatches) -> Result<Self> {
        let mut config = match matches.get_one::<PathBuf>("config") {
            Some(path) => {
                log::info!("[Mosaic] Using config: {:?}", path);
                load_server_config(path)?
            }
            None => ServerConfig::default(),
        };

        if let Some(host) = matches.get_one::<String>("host") {
            config.host = host.clone();
        }

        if let Some(port) = matches.get_one::<u16>("port") {
            config.port = *port;
        }

        Ok(config)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

pub fn load_server_config<P: AsRef<Path>>(path: P) -> Result<ServerConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;
    let config: ServerConfig = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;
    Ok(config)
}

/// Command-line interface of the `mosaic` server binary.
pub fn build_cli() -> Command {
    Command::new("mosaic")
        .version(clap::crate_version!())
        .about("Mosaic - linear algebra and CSV statistics over HTTP")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("Path to a JSON server configuration file")
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("host")
                .long("host")
                .help("Address to bind. Overrides the host in the configuration file.")
                .value_parser(clap::builder::NonEmptyStringValueParser::new())
                .value_hint(ValueHint::Hostname),
        )
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .help("Port to listen on. Overrides the port in the configuration file.")
                .value_parser(clap::value_parser!(u16)),
        )
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             Version {version}\n\n\
             {all-args}{after-help}",
        )
}
