use std::env;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use crate::catalog::ContainerSpec;
use crate::model::CalculationSettings;

/// Complete application configuration, loaded from environment variables or default values.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub advice: AdviceConfig,
    pub estimator: EstimatorConfig,
}

impl AppConfig {
    /// Creates a configuration from the currently available environment variables.
    pub fn from_env() -> Self {
        Self {
            api: ApiConfig::from_env(),
            advice: AdviceConfig::from_env(),
            estimator: EstimatorConfig::from_env(),
        }
    }
}

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    bind_ip: IpAddr,
    display_host: String,
    port: u16,
}

impl ApiConfig {
    const DEFAULT_HOST: &'static str = "0.0.0.0";
    const DEFAULT_PORT: u16 = 8080;

    fn from_env() -> Self {
        let host_value =
            env_string("STOWPLAN_API_HOST").unwrap_or_else(|| Self::DEFAULT_HOST.to_string());
        let (bind_ip, effective_host) = match host_value.parse::<IpAddr>() {
            Ok(ip) => (ip, host_value),
            Err(err) => {
                eprintln!(
                    "⚠️ Could not parse STOWPLAN_API_HOST ('{}'): {}. Using {}.",
                    host_value,
                    err,
                    Self::DEFAULT_HOST
                );
                (
                    Self::DEFAULT_HOST
                        .parse::<IpAddr>()
                        .expect("Default host must be valid"),
                    Self::DEFAULT_HOST.to_string(),
                )
            }
        };

        let port = match env_string("STOWPLAN_API_PORT") {
            Some(raw) => match raw.parse::<u16>() {
                Ok(value) if value != 0 => value,
                Ok(_) => {
                    eprintln!(
                        "⚠️ STOWPLAN_API_PORT must not be 0. Using {}.",
                        Self::DEFAULT_PORT
                    );
                    Self::DEFAULT_PORT
                }
                Err(err) => {
                    eprintln!(
                        "⚠️ Could not parse STOWPLAN_API_PORT ('{}'): {}. Using {}.",
                        raw,
                        err,
                        Self::DEFAULT_PORT
                    );
                    Self::DEFAULT_PORT
                }
            },
            None => Self::DEFAULT_PORT,
        };

        Self {
            bind_ip,
            display_host: effective_host,
            port,
        }
    }

    /// Socket address to bind the server to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_ip, self.port)
    }

    /// Visible hostname for logging and hints.
    pub fn display_host(&self) -> &str {
        &self.display_host
    }

    /// Configured port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Indicates whether binding to all interfaces.
    pub fn binds_to_all_interfaces(&self) -> bool {
        match self.bind_ip {
            IpAddr::V4(addr) => addr == Ipv4Addr::UNSPECIFIED,
            IpAddr::V6(addr) => addr == Ipv6Addr::UNSPECIFIED,
        }
    }

    /// Checks whether the hostname matches the default value.
    pub fn uses_default_host(&self) -> bool {
        self.display_host == Self::DEFAULT_HOST
    }
}

/// Configuration for the AI advisory text service.
///
/// The key is read from `STOWPLAN_GEMINI_API_KEY`, falling back to the plain
/// `GEMINI_API_KEY` that the hosted tooling already sets. A missing key is
/// not an error: the advice endpoint degrades to a static notice.
#[derive(Clone, Debug)]
pub struct AdviceConfig {
    api_key: Option<String>,
    model: String,
    endpoint: String,
}

impl AdviceConfig {
    const DEFAULT_MODEL: &'static str = "gemini-2.5-flash";
    const DEFAULT_ENDPOINT: &'static str = "https://generativelanguage.googleapis.com/v1beta";

    fn from_env() -> Self {
        Self {
            api_key: env_string("STOWPLAN_GEMINI_API_KEY")
                .or_else(|| env_string("GEMINI_API_KEY")),
            model: env_string("STOWPLAN_ADVICE_MODEL")
                .unwrap_or_else(|| Self::DEFAULT_MODEL.to_string()),
            endpoint: env_string("STOWPLAN_ADVICE_ENDPOINT")
                .map(|raw| raw.trim_end_matches('/').to_string())
                .unwrap_or_else(|| Self::DEFAULT_ENDPOINT.to_string()),
        }
    }

    /// API key for the text-generation service, if one is configured.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Whether an API key is present.
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Model identifier sent to the service.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Returns the URL the generation request is posted to.
    pub fn generate_content_endpoint(&self) -> String {
        format!(
            "{endpoint}/models/{model}:generateContent",
            endpoint = self.endpoint,
            model = self.model
        )
    }
}

/// Configuration for the packing estimator defaults.
#[derive(Clone, Copy, Debug)]
pub struct EstimatorConfig {
    default_space_utilization: u8,
}

impl EstimatorConfig {
    const SPACE_UTILIZATION_VAR: &'static str = "STOWPLAN_DEFAULT_SPACE_UTILIZATION";

    fn from_env() -> Self {
        let default_space_utilization = match env_string(Self::SPACE_UTILIZATION_VAR) {
            Some(raw) => match parse_utilization(&raw) {
                Some(value) => value,
                None => {
                    eprintln!(
                        "⚠️ {} contains invalid value '{}': must be an integer between {} and {}. Using {}.",
                        Self::SPACE_UTILIZATION_VAR,
                        raw,
                        CalculationSettings::MIN_SPACE_UTILIZATION,
                        CalculationSettings::MAX_SPACE_UTILIZATION,
                        CalculationSettings::DEFAULT_SPACE_UTILIZATION
                    );
                    CalculationSettings::DEFAULT_SPACE_UTILIZATION
                }
            },
            None => CalculationSettings::DEFAULT_SPACE_UTILIZATION,
        };

        Self {
            default_space_utilization,
        }
    }

    /// Space utilization percentage applied when a request sends none.
    pub fn default_space_utilization(&self) -> u8 {
        self.default_space_utilization
    }

    /// Baseline settings for a container before request overrides: the
    /// configured utilization and the container's full weight allowance.
    pub fn default_settings_for(&self, container: &ContainerSpec) -> CalculationSettings {
        CalculationSettings {
            space_utilization: self.default_space_utilization,
            max_weight_limit: container.max_weight_tons(),
        }
    }
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            default_space_utilization: CalculationSettings::DEFAULT_SPACE_UTILIZATION,
        }
    }
}

fn env_string(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_owned())
            }
        }
        Err(env::VarError::NotPresent) => None,
        Err(err) => {
            eprintln!(
                "⚠️ Access to {} failed: {}. Using default value.",
                name, err
            );
            None
        }
    }
}

fn parse_utilization(raw: &str) -> Option<u8> {
    let value = raw.trim().parse::<u8>().ok()?;
    (CalculationSettings::MIN_SPACE_UTILIZATION..=CalculationSettings::MAX_SPACE_UTILIZATION)
        .contains(&value)
        .then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{self, ContainerType};

    #[test]
    fn test_parse_utilization_accepts_range() {
        assert_eq!(parse_utilization("50"), Some(50));
        assert_eq!(parse_utilization("95"), Some(95));
        assert_eq!(parse_utilization("100"), Some(100));

        // Test with whitespace
        assert_eq!(parse_utilization(" 80 "), Some(80));
    }

    #[test]
    fn test_parse_utilization_rejects_out_of_range() {
        assert_eq!(parse_utilization("49"), None);
        assert_eq!(parse_utilization("101"), None);
        assert_eq!(parse_utilization("0"), None);
        assert_eq!(parse_utilization("255"), None);
    }

    #[test]
    fn test_parse_utilization_rejects_non_integers() {
        assert_eq!(parse_utilization("ninety"), None);
        assert_eq!(parse_utilization("95.5"), None);
        assert_eq!(parse_utilization("-95"), None);
        assert_eq!(parse_utilization(""), None);
        assert_eq!(parse_utilization("  "), None);
    }

    #[test]
    fn default_settings_track_the_container_allowance() {
        let config = EstimatorConfig::default();
        let settings = config.default_settings_for(catalog::spec(ContainerType::Gp20));
        assert_eq!(settings.space_utilization, 95);
        assert_eq!(settings.max_weight_limit, 28.0);

        let settings = config.default_settings_for(catalog::spec(ContainerType::Hq40));
        assert_eq!(settings.max_weight_limit, 26.0);
    }

    #[test]
    fn generate_content_endpoint_joins_endpoint_and_model() {
        let config = AdviceConfig {
            api_key: Some("k".to_string()),
            model: "gemini-2.5-flash".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
        };
        assert_eq!(
            config.generate_content_endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }
}
