use rovia_catalog::pricing::{PricingConfig, RateTier};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub notifier: NotifierConfig,
    pub pricing: PricingRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotifierConfig {
    /// Internal channel receiving the ops alert for every booking.
    pub ops_recipient: String,
    #[serde(default = "default_send_attempts")]
    pub send_attempts: u32,
}

fn default_send_attempts() -> u32 {
    3
}

/// File-configurable pricing inputs. The tier table may be overridden
/// wholesale; an empty list keeps the built-in eight tiers.
#[derive(Debug, Deserialize, Clone)]
pub struct PricingRules {
    pub deposit: f64,
    pub license_rate: f64,
    #[serde(default)]
    pub day_tiers: Vec<RateTier>,
}

impl PricingRules {
    pub fn to_pricing_config(&self) -> PricingConfig {
        let day_tiers = if self.day_tiers.is_empty() {
            PricingConfig::default().day_tiers
        } else {
            self.day_tiers.clone()
        };
        PricingConfig {
            day_tiers,
            license_rate: self.license_rate,
            deposit: self.deposit,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Add in the current environment file (optional)
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add in a local configuration file that shouldn't be
            // checked in to git (optional)
            .add_source(config::File::with_name("config/local").required(false))
            // Add in settings from the environment (with a prefix of ROVIA)
            // Eg.. `ROVIA__SERVER__PORT=8080` would set the server port
            .add_source(config::Environment::with_prefix("ROVIA").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_tier_override_keeps_builtin_table() {
        let rules = PricingRules { deposit: 100.0, license_rate: 10.0, day_tiers: vec![] };

        let config = rules.to_pricing_config();

        assert_eq!(config.day_tiers, PricingConfig::default().day_tiers);
        assert_eq!(config.deposit, 100.0);
        assert_eq!(config.license_rate, 10.0);
    }

    #[test]
    fn test_explicit_tier_override_wins() {
        let rules = PricingRules {
            deposit: 100.0,
            license_rate: 10.0,
            day_tiers: vec![RateTier { min_days: 1, daily_rate: 40.0 }],
        };

        let config = rules.to_pricing_config();

        assert_eq!(config.day_tiers.len(), 1);
        assert_eq!(config.day_tiers[0].daily_rate, 40.0);
    }
}
