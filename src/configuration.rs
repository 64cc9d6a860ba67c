// Copyright (c) 2022 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Configuration file handling.

use crate::errors::ServiceError;
use config::Config;
use log::{info, warn};
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Default configuration file.
pub const DEF_CONFIG_FILE: &str = "configuration.yaml";

pub const DEF_HA_URL: &str = "http://homeassistant.local:8123";

/// Prefix of all configuration environment variables.
///
/// Nested keys are separated with `__`, e.g. `SKILL_HASS__URL` sets `hass.url`.
pub const ENV_PREFIX: &str = "SKILL";

/// Environment variable to disable TLS verification to the Home Assistant server.
pub const ENV_DISABLE_CERT_VERIFICATION: &str = "SKILL_DISABLE_CERT_VERIFICATION";

/// Environment variable to enable Home Assistant server request & response tracing.
///
/// Valid values:
/// - `all`: enable incoming and outgoing message traces
/// - `in`: only response bodies
/// - `out`: only request bodies
///
/// **Attention:** this setting is only for debugging and exposes all data!
pub const ENV_HASS_MSG_TRACING: &str = "SKILL_HASS_MSG_TRACING";

#[derive(Default, serde::Deserialize, serde::Serialize)]
pub struct Settings {
    pub hass: HomeAssistantSettings,
}

#[derive(Clone, serde::Deserialize, serde::Serialize)]
pub struct HomeAssistantSettings {
    /// Home Assistant server address: `http(s)://host:port` or just `host:port`.
    url: String,
    /// Long-lived access token, sent as bearer token.
    token: String,
    /// HTTP connection timeout in seconds.
    /// This is the max time allowed to connect to the remote host, including DNS name resolution.
    pub connection_timeout: u8,
    /// HTTP request timeout in seconds.
    /// This is the total time before a response must be received. Should be equal or greater than `connection_timeout`.
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u8,
    /// Maximum accepted response body size. `api/states` grows with the number of entities!
    #[serde(default = "default_max_body_size_kb")]
    pub max_body_size_kb: usize,
    /// Disables certificate verification for https connections.
    #[serde(default)]
    pub disable_cert_validation: bool,
}

impl Default for HomeAssistantSettings {
    fn default() -> Self {
        Self {
            url: DEF_HA_URL.to_string(),
            token: "".to_string(),
            connection_timeout: 6,
            request_timeout: default_request_timeout(),
            max_body_size_kb: default_max_body_size_kb(),
            disable_cert_validation: false,
        }
    }
}

impl HomeAssistantSettings {
    /// Create settings from the host provided `URL` and `API_KEY` values with default timeouts.
    pub fn new(url: impl Into<String>, token: impl AsRef<str>) -> Self {
        let mut settings = Self {
            url: url.into(),
            ..Default::default()
        };
        settings.set_token(token);
        settings
    }

    /// Return the configured HA server base URL.
    ///
    /// A missing scheme defaults to `http`, WebSocket schemes are mapped to their http equivalent.
    pub fn get_url(&self) -> Result<Url, ServiceError> {
        parse_base_url(&self.url)
    }

    pub fn get_token(&self) -> &str {
        &self.token
    }

    /// Update the configuration URL.
    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = url.into();
    }

    /// Update the configuration token.
    pub fn set_token(&mut self, token: impl AsRef<str>) {
        self.token = token.as_ref().trim().to_string();
    }

    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.connection_timeout as u64)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout as u64)
    }
}

impl Display for HomeAssistantSettings {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "url={}, token={}, connection_timeout={}s, request_timeout={}s",
            self.url,
            if self.token.is_empty() { "<missing>" } else { "***" },
            self.connection_timeout,
            self.request_timeout
        )
    }
}

fn default_request_timeout() -> u8 {
    10
}
fn default_max_body_size_kb() -> usize {
    5120
}

/// Parse a Home Assistant server address into a base URL.
///
/// Accepted forms: `host`, `host:port`, `http(s)://host:port[/path]` and `ws(s)://...`.
/// The path of the returned URL always ends with a `/`, so that endpoints can be joined.
pub fn parse_base_url(address: &str) -> Result<Url, ServiceError> {
    let address = address.trim();
    if address.is_empty() {
        return Err(ServiceError::ConfigError(
            "Home Assistant URL is missing".into(),
        ));
    }
    // `Url::parse("host:8123")` succeeds with `host` as scheme
    let mut url = if address.contains("://") {
        Url::parse(address)?
    } else {
        Url::parse(&format!("http://{address}"))?
    };

    let scheme = match url.scheme() {
        "http" | "ws" => "http",
        "https" | "wss" => "https",
        scheme => {
            return Err(ServiceError::ConfigError(format!(
                "invalid scheme in hass.url: {scheme}. Valid: [http, https]"
            )));
        }
    };
    url.set_scheme(scheme)
        .map_err(|_| ServiceError::ConfigError(format!("invalid hass.url: {address}")))?;
    if !url.has_host() {
        return Err(ServiceError::ConfigError(format!(
            "missing host in hass.url: {address}"
        )));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);

    Ok(url)
}

/// Load the configuration settings.
///
/// The skill provides default values which can be overriden in the following order:
/// 1. Configuration settings in the optional yaml or json configuration file specified in `filename`
/// 2. Environment variables with prefix `SKILL_`, using `__` as separator for nested keys.
pub fn get_configuration(filename: Option<&str>) -> Result<Settings, config::ConfigError> {
    // default configuration
    let mut config = Config::builder().add_source(Config::try_from(&Settings::default())?);
    // read optional configuration file to override defaults
    if let Some(filename) = filename {
        info!("Loading configuration file: {filename}");
        config = config.add_source(config::File::with_name(filename));
    }

    // E.g. `SKILL_HASS__URL=http://localhost:8123` would set the `hass.url` key
    let config = config
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    let settings: Settings = config.try_deserialize()?;

    check_cfg_values(settings)
}

/// Return the default configuration file if no file is specified and the default file exists.
pub fn default_config_file(filename: Option<&str>) -> Option<&str> {
    match filename {
        Some(f) => Some(f),
        None if Path::new(DEF_CONFIG_FILE).exists() => Some(DEF_CONFIG_FILE),
        None => None,
    }
}

fn check_cfg_values(mut settings: Settings) -> Result<Settings, config::ConfigError> {
    if settings.hass.connection_timeout == 0 {
        warn!("Invalid HA connection timeout, using default.");
        settings.hass.connection_timeout = HomeAssistantSettings::default().connection_timeout;
    }
    if settings.hass.request_timeout < settings.hass.connection_timeout {
        warn!(
            "HA request timeout {}s is lower than connection timeout, using {}s.",
            settings.hass.request_timeout, settings.hass.connection_timeout
        );
        settings.hass.request_timeout = settings.hass.connection_timeout;
    }
    if settings.hass.max_body_size_kb < 64 {
        warn!("Invalid HA max body size, using default.");
        settings.hass.max_body_size_kb = default_max_body_size_kb();
    }

    // only validate here, the normalized URL is created by the client
    parse_base_url(&settings.hass.url)
        .map_err(|e| config::ConfigError::Message(e.to_string()))?;

    Ok(settings)
}
