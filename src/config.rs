use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::PortfolioError;

pub const ENV_PREFIX: &str = "PORTFOLIO_";
pub const DEFAULT_CONFIG_FILE: &str = "portfolio.toml";

/// Runtime configuration. Defaults match a stock local deployment; a TOML
/// file and `PORTFOLIO_*` environment variables override them in that order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub listen_addr: String,
    pub database_url: String,
    /// Run the bundled `CREATE TABLE IF NOT EXISTS` statements at startup.
    pub init_schema: bool,
    pub upload_dir: PathBuf,
    /// URL prefix for served uploads, also the prefix of stored `image_path` values.
    pub upload_prefix: String,
    pub max_upload_bytes: usize,
    pub loglevel: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:3001".to_string(),
            database_url: "sqlite:portfolio_db.sqlite".to_string(),
            init_schema: false,
            upload_dir: PathBuf::from("uploads"),
            upload_prefix: "uploads".to_string(),
            max_upload_bytes: 25 * 1024 * 1024,
            loglevel: "info".to_string(),
        }
    }
}

impl Config {
    /// Defaults, then the TOML file named by `PORTFOLIO_CONFIG`, then the environment.
    pub fn figment() -> Figment {
        let file = Env::var_or("PORTFOLIO_CONFIG", DEFAULT_CONFIG_FILE);
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed(ENV_PREFIX).ignore(&["config"]))
    }

    pub fn load() -> Result<Self, PortfolioError> {
        Self::from_figment(Self::figment())
    }

    pub fn from_figment(figment: Figment) -> Result<Self, PortfolioError> {
        let cfg: Config = figment.extract().map_err(Box::new)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), PortfolioError> {
        if self.upload_prefix.trim_matches('/').is_empty() {
            return Err(PortfolioError::InvalidConfig(
                "upload_prefix must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_toml(toml: &str) -> Figment {
        Figment::from(Serialized::defaults(Config::default())).merge(Toml::string(toml))
    }

    #[test]
    fn defaults_match_local_deployment() {
        let cfg = Config::from_figment(with_toml("")).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.listen_addr, "0.0.0.0:3001");
        assert_eq!(cfg.upload_prefix, "uploads");
        assert!(!cfg.init_schema);
    }

    #[test]
    fn toml_overrides_selected_keys() {
        let cfg = Config::from_figment(with_toml(
            r#"
            listen_addr = "127.0.0.1:8080"
            database_url = "sqlite::memory:"
            init_schema = true
            upload_dir = "/srv/portfolio/uploads"
            "#,
        ))
        .unwrap();
        assert_eq!(cfg.listen_addr, "127.0.0.1:8080");
        assert_eq!(cfg.database_url, "sqlite::memory:");
        assert!(cfg.init_schema);
        assert_eq!(cfg.upload_dir, PathBuf::from("/srv/portfolio/uploads"));
        assert_eq!(cfg.loglevel, "info");
    }

    #[test]
    fn empty_upload_prefix_is_rejected() {
        let err = Config::from_figment(with_toml(r#"upload_prefix = "/""#)).unwrap_err();
        assert!(matches!(err, PortfolioError::InvalidConfig(_)));
    }

    #[test]
    fn wrong_type_is_a_config_error() {
        let err = Config::from_figment(with_toml(r#"max_upload_bytes = "lots""#)).unwrap_err();
        assert!(matches!(err, PortfolioError::ConfigError(_)));
    }
}
