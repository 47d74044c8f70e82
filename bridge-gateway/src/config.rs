//! Process configuration, read once at startup.

use std::path::Path;

use bridge_referrals::ReferralConfig;

use crate::error::GatewayError;

/// Default listen address when `BRIDGE_LISTEN_ADDR` is unset.
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:6382";

/// Settings for the gateway process.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct GatewayConfig {
    /// Socket address the HTTP server binds to.
    pub listen_addr: String,
    /// Referral dispatch settings.
    pub referrals: ReferralConfig,
}

impl GatewayConfig {
    /// Load from `BRIDGE_LISTEN_ADDR` and the optional JSON file named by
    /// `BRIDGE_CONFIG`.
    ///
    /// # Errors
    /// Returns [`GatewayError::Config`] if the config file cannot be read or
    /// parsed.
    pub fn from_env() -> Result<Self, GatewayError> {
        let listen_addr = std::env::var("BRIDGE_LISTEN_ADDR").ok();
        let config_path = std::env::var("BRIDGE_CONFIG").ok();
        Self::load(listen_addr, config_path.as_deref().map(Path::new))
    }

    /// Build a config from explicit sources.
    ///
    /// # Errors
    /// Returns [`GatewayError::Config`] if the config file cannot be read or
    /// parsed.
    pub fn load(
        listen_addr: Option<String>,
        config_path: Option<&Path>,
    ) -> Result<Self, GatewayError> {
        let referrals = match config_path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|e| {
                    GatewayError::Config(format!("cannot read {}: {e}", path.display()))
                })?;
                serde_json::from_str(&raw).map_err(|e| {
                    GatewayError::Config(format!("cannot parse {}: {e}", path.display()))
                })?
            }
            None => ReferralConfig::default(),
        };
        Ok(Self {
            listen_addr: listen_addr.unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_owned()),
            referrals,
        })
    }
}
