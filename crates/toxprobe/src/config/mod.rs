//! Service configuration, stored as TOML.

mod types;

use std::{env, fmt, fs, path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use types::{HttpConfig, ProbeConfig, ScanConfig};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not write config {path}: {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse config: {0}")]
    ParseFailed(#[from] toml::de::Error),

    #[error("could not serialize config: {0}")]
    SerializeFailed(#[from] toml::ser::Error),

    #[error("no config path available (neither XDG_CONFIG_HOME nor HOME is set)")]
    ConfigPathUnavailable,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub http: HttpConfig,
    pub scan: ScanConfig,
    pub probe: ProbeConfig,
}

/// Used to ensure we are actually reading a toml file
fn normalize_toml_path(path: &path::Path) -> path::PathBuf {
    let mut path = path.to_path_buf();
    if path.extension().map(|ext| ext != "toml").unwrap_or(true) {
        path.set_extension("toml");
    }
    path
}

/// Get default config path ($XDG_CONFIG_HOME/toxstatus/config.toml or
/// $HOME/.config/...)
fn default_config_path() -> Result<path::PathBuf, ConfigError> {
    let path = if let Ok(config_home) = env::var("XDG_CONFIG_HOME") {
        path::PathBuf::from(config_home)
    } else if let Ok(home_dir) = env::var("HOME") {
        path::PathBuf::from(home_dir).join(".config")
    } else {
        return Err(ConfigError::ConfigPathUnavailable);
    };

    Ok(path.join("toxstatus/config.toml"))
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let write_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str, value: &dyn fmt::Display| {
                writeln!(f, "  {:indent$}{}: {}", "", label, value, indent = level * 2)
            }
        };
        let write_title_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str| {
                writeln!(f, "{:indent$}{}", "", label, indent = level * 2)
            }
        };

        let write_title_1 = write_title_indented(1);
        let write_1 = write_indented(1);
        let unbounded = |limit: Option<usize>| limit.map_or("unbounded".to_string(), |n| n.to_string());

        writeln!(f, "Current Internal Configuration State:")?;
        write_title_1(f, "HTTP")?;
        write_1(f, "Bind Address", &self.http.bind)?;
        write_1(f, "Port", &self.http.port)?;

        write_title_1(f, "Scan")?;
        write_1(f, "Interval (s)", &self.scan.interval_seconds)?;
        write_1(f, "Directory Source", &self.scan.directory_source)?;
        write_1(f, "Max Concurrent Nodes", &unbounded(self.scan.max_concurrent_nodes))?;

        write_title_1(f, "Probe")?;
        write_1(f, "Connect Timeout (ms)", &self.probe.connect_timeout_ms)?;
        write_1(f, "Read Timeout (ms)", &self.probe.read_timeout_ms)?;
        write_1(f, "Max MOTD Length", &self.probe.max_motd_length)?;
        write_1(f, "Max UDP Packet Size", &self.probe.max_udp_packet_size)?;
        write_1(f, "TCP Ports", &format!("{:?}", self.probe.tcp_ports))?;
        write_1(f, "Max Concurrent Ports", &unbounded(self.probe.max_concurrent_ports))?;

        Ok(())
    }
}

impl Config {
    /// Generate Config structure from file
    ///
    /// Creates a default config in ~/.config/toxstatus/config.toml
    ///  or the specified path, with the name config.toml if one does not exist
    ///
    /// ```no_run
    /// let cfg = toxprobe::Config::from_config(None::<&std::path::Path>)?;
    /// println!("{}", cfg);
    /// # Ok::<(), toxprobe::ConfigError>(())
    /// ```
    pub fn from_config(optional_path: Option<impl AsRef<path::Path>>) -> Result<Self, ConfigError> {
        let config_path: path::PathBuf = if let Some(path) = optional_path {
            normalize_toml_path(path.as_ref())
        } else {
            default_config_path()?
        };

        if config_path.exists() {
            let raw_string = fs::read_to_string(&config_path).map_err(|source| {
                ConfigError::ReadFailed { path: config_path.display().to_string(), source }
            })?;
            Ok(toml::from_str(raw_string.as_str())?)
        } else {
            let config = Self::default();
            config.write_config(&config_path)?;
            Ok(config)
        }
    }

    /// Serialize and write a config to a file
    pub fn write_config(&self, path: &path::Path) -> Result<(), ConfigError> {
        let config_str: String = toml::to_string_pretty(self)?;
        let write_failed =
            |source| ConfigError::WriteFailed { path: path.display().to_string(), source };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_failed)?;
        }

        fs::write(path, config_str).map_err(write_failed)
    }
}
