use std::path::{Path, PathBuf};

use error_stack::{Report, ResultExt};
use serde::Deserialize;
use status_pages::PagesConfig;

use crate::{error::Error, Cli};

#[derive(Deserialize, Debug, Default)]
pub struct ServerConfig {
    /// The port to listen on
    pub port: Option<u16>,

    /// The IP to bind to.
    pub host: Option<String>,

    /// Set to false to skip loading the .env file alongside this config.
    pub dotenv: Option<bool>,

    #[serde(flatten)]
    pub pages: PagesConfig,
}

/// Read the configuration file, if one was given. A relative `template_dir` is resolved against
/// the directory containing the file.
pub fn read_config(path: Option<&Path>) -> Result<ServerConfig, Report<Error>> {
    let Some(path) = path else {
        return Ok(ServerConfig::default());
    };

    let config_path = if path.is_dir() {
        path.join("status-pages.toml")
    } else {
        path.to_path_buf()
    };

    let buf = std::fs::read_to_string(&config_path)
        .change_context(Error::Config)
        .attach_printable_lazy(|| format!("Reading config file {}", config_path.display()))?;

    let mut config = toml::from_str::<ServerConfig>(&buf)
        .change_context(Error::Config)
        .attach_printable_lazy(|| format!("Error in config file {}", config_path.display()))?;

    if let (Some(dir), Some(parent)) = (&config.pages.template_dir, config_path.parent()) {
        config.pages.template_dir = Some(parent.join(dir));
    }

    Ok(config)
}

/// Apply command line and environment overrides.
pub fn merge_server_config(cmd: &Cli, mut config: ServerConfig) -> ServerConfig {
    if cmd.host.is_some() {
        config.host = cmd.host.clone();
    }

    if cmd.port.is_some() {
        config.port = cmd.port;
    }

    if let Some(dir) = &cmd.templates {
        config.pages.template_dir = Some(PathBuf::from(dir));
    }

    config
}
