//! Configuration
//!
//! ## Sources (highest priority first)
//!
//! 1. Environment: `WGLED_BOARD_ADDR`, `WGLED_BOARD_PORT`, `WGLED_BOARD_SERIAL`
//! 2. TOML file (path from the command line or `WGLED_CONFIG`)
//! 3. Built-in defaults
//!
//! ## File format
//!
//! ```toml
//! [board]
//! address = "192.168.0.10"
//! port = 60000
//! serial_number = 175111864
//! door = 1
//!
//! [beacon]
//! interval_ms = 500
//! stop_timeout_ms = 1000
//!
//! [workflow]
//! confirm_token = "confirm"
//! exit_token = "exit"
//! product_prefix = "PRD"
//! release_policy = "simulate"   # simulate | reactivate | counterpart
//!
//! [products]
//! PRD1 = 1
//! PRD2 = 2
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info};

use wgled_core::constants::{
    DEFAULT_BEACON_INTERVAL_MS, DEFAULT_PORT, DEFAULT_STOP_TIMEOUT_MS, DOOR_RANGE,
};
use wgled_core::{BoardIdentity, IndicatorId};
use wgled_types::ProductId;

use crate::beacon::BeaconConfig;
use crate::catalog::ProductCatalog;
use crate::controller::ReleasePolicy;
use crate::error::{Error, Result};
use crate::workflow::ScanTokens;

/// Environment variable naming the config file
pub const CONFIG_PATH_ENV: &str = "WGLED_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BoardSection {
    pub address: String,
    pub port: u16,
    pub serial_number: u32,
    pub door: u8,
    /// Local address the UDP socket binds to
    pub bind_address: String,
}

impl Default for BoardSection {
    fn default() -> Self {
        Self {
            address: "255.255.255.255".to_string(),
            port: DEFAULT_PORT,
            serial_number: 175_111_864,
            door: 1,
            bind_address: "0.0.0.0:0".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BeaconSection {
    pub interval_ms: u64,
    pub stop_timeout_ms: u64,
}

impl Default for BeaconSection {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_BEACON_INTERVAL_MS,
            stop_timeout_ms: DEFAULT_STOP_TIMEOUT_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkflowSection {
    pub confirm_token: String,
    pub exit_token: String,
    pub product_prefix: String,
    pub release_policy: ReleasePolicy,
}

impl Default for WorkflowSection {
    fn default() -> Self {
        let tokens = ScanTokens::default();
        Self {
            confirm_token: tokens.confirm,
            exit_token: tokens.exit,
            product_prefix: ProductCatalog::DEFAULT_PREFIX.to_string(),
            release_policy: ReleasePolicy::default(),
        }
    }
}

/// Complete runtime configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub board: BoardSection,
    pub beacon: BeaconSection,
    pub workflow: WorkflowSection,
    /// Product code -> indicator number
    pub products: BTreeMap<String, u8>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            board: BoardSection::default(),
            beacon: BeaconSection::default(),
            workflow: WorkflowSection::default(),
            products: (1..=5u8).map(|n| (format!("PRD{}", n), n)).collect(),
        }
    }
}

impl Config {
    /// Parse TOML text (missing keys take defaults)
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Reading config from {:?}", path);
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Build the effective configuration from all sources and validate it
    ///
    /// `path` wins over `WGLED_CONFIG`; with neither, defaults are used.
    pub fn resolve(path: Option<PathBuf>) -> Result<Self> {
        let path = path.or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));

        let mut config = match path {
            Some(path) => Self::load(&path)?,
            None => {
                info!("No config file given, using defaults");
                Self::default()
            }
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `WGLED_BOARD_*` overrides from `lookup`
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(address) = lookup("WGLED_BOARD_ADDR") {
            debug!(address = %address, "Board address overridden");
            self.board.address = address;
        }
        if let Some(port) = lookup("WGLED_BOARD_PORT") {
            self.board.port = port
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("WGLED_BOARD_PORT: invalid port '{}'", port)))?;
        }
        if let Some(serial) = lookup("WGLED_BOARD_SERIAL") {
            self.board.serial_number = parse_serial(&serial).ok_or_else(|| {
                Error::Config(format!("WGLED_BOARD_SERIAL: invalid serial '{}'", serial))
            })?;
        }
        Ok(())
    }

    /// Check everything the protocol and workflow rely on
    pub fn validate(&self) -> Result<()> {
        if self.board.address.trim().is_empty() {
            return Err(Error::Config("board.address must not be empty".into()));
        }
        if !DOOR_RANGE.contains(&self.board.door) {
            return Err(Error::Config(format!(
                "board.door {} outside {}..={}",
                self.board.door,
                DOOR_RANGE.start(),
                DOOR_RANGE.end()
            )));
        }
        if self.beacon.interval_ms == 0 {
            return Err(Error::Config("beacon.interval_ms must be positive".into()));
        }
        if self.beacon.stop_timeout_ms == 0 {
            return Err(Error::Config("beacon.stop_timeout_ms must be positive".into()));
        }

        let confirm = self.workflow.confirm_token.trim();
        let exit = self.workflow.exit_token.trim();
        if confirm.is_empty() || exit.is_empty() {
            return Err(Error::Config("workflow tokens must not be empty".into()));
        }
        if confirm.eq_ignore_ascii_case(exit) {
            return Err(Error::Config("confirm and exit tokens must differ".into()));
        }
        for token in [confirm, exit] {
            if self.products.keys().any(|p| p.eq_ignore_ascii_case(token)) {
                return Err(Error::Config(format!("token '{}' is also a product code", token)));
            }
        }

        // Catalog construction checks indicator ranges and duplicates
        self.catalog()?;
        Ok(())
    }

    pub fn board_identity(&self) -> BoardIdentity {
        BoardIdentity::new(
            self.board.address.clone(),
            self.board.port,
            self.board.serial_number,
        )
    }

    pub fn beacon_config(&self) -> BeaconConfig {
        BeaconConfig {
            interval: Duration::from_millis(self.beacon.interval_ms),
            stop_timeout: Duration::from_millis(self.beacon.stop_timeout_ms),
        }
    }

    pub fn scan_tokens(&self) -> ScanTokens {
        ScanTokens {
            confirm: self.workflow.confirm_token.trim().to_string(),
            exit: self.workflow.exit_token.trim().to_string(),
        }
    }

    pub fn catalog(&self) -> Result<ProductCatalog> {
        let mut catalog = ProductCatalog::new(self.workflow.product_prefix.clone());
        for (code, indicator) in &self.products {
            catalog
                .insert(ProductId::new(code)?, IndicatorId::new(*indicator))
                .map_err(|e| Error::Config(format!("products.{}: {}", code, e)))?;
        }
        Ok(catalog)
    }
}

/// Decimal or `0x`-prefixed hexadecimal serial number
fn parse_serial(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => raw.parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        config.validate().unwrap();

        assert_eq!(
            config.board_identity(),
            BoardIdentity::new("255.255.255.255", 60000, 175111864)
        );
        assert_eq!(config.beacon_config(), BeaconConfig::default());
        assert_eq!(config.catalog().unwrap().len(), 5);
        assert_eq!(config.workflow.release_policy, ReleasePolicy::Simulate);
    }

    #[test]
    fn test_parse_full_file() {
        let config = Config::from_toml_str(
            r#"
            [board]
            address = "192.168.0.10"
            port = 6000
            serial_number = 123
            door = 2

            [beacon]
            interval_ms = 250

            [workflow]
            confirm_token = "ok"
            release_policy = "counterpart"

            [products]
            BOX-A = 7
            BOX-B = 47
            "#,
        )
        .unwrap();
        config.validate().unwrap();

        assert_eq!(config.board.address, "192.168.0.10");
        assert_eq!(config.board.door, 2);
        assert_eq!(config.beacon.interval_ms, 250);
        assert_eq!(config.beacon.stop_timeout_ms, 1000);
        assert_eq!(config.workflow.confirm_token, "ok");
        assert_eq!(config.workflow.exit_token, "exit");
        assert_eq!(config.workflow.release_policy, ReleasePolicy::Counterpart);

        let catalog = config.catalog().unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.lookup("BOX-B").map(|(_, i)| i), Some(IndicatorId::new(47)));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result = Config::from_toml_str("[board]\nadress = \"1.2.3.4\"\n");
        assert!(matches!(result, Err(Error::ConfigParse(_))));
    }

    #[test]
    fn test_unknown_policy_rejected() {
        let result = Config::from_toml_str("[workflow]\nrelease_policy = \"blink\"\n");
        assert!(matches!(result, Err(Error::ConfigParse(_))));
    }

    #[test]
    fn test_validate_rejects_bad_door() {
        let mut config = Config::default();
        config.board.door = 5;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_bad_indicator() {
        let mut config = Config::default();
        config.products.insert("PRD6".into(), 81);
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_shared_indicator() {
        let mut config = Config::default();
        config.products.insert("PRD6".into(), 1);
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_token_clash() {
        let mut config = Config::default();
        config.workflow.exit_token = "CONFIRM".into();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.products.insert("confirm".into(), 9);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let mut config = Config::default();
        config.beacon.interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_stop_timeout() {
        let mut config = Config::default();
        config.beacon.stop_timeout_ms = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let result =
            Config::from_toml_str("[beacon]\nstop_timeout_ms = 0\n").and_then(|c| c.validate());
        assert!(result.is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("WGLED_BOARD_ADDR", "10.1.1.1"),
            ("WGLED_BOARD_PORT", "6001"),
            ("WGLED_BOARD_SERIAL", "0x0A6FFEB8"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(
            config.board_identity(),
            BoardIdentity::new("10.1.1.1", 6001, 175111864)
        );
    }

    #[test]
    fn test_env_override_invalid_port() {
        let mut config = Config::default();
        let result = config.apply_overrides(|key| (key == "WGLED_BOARD_PORT").then(|| "70000".to_string()));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_parse_serial() {
        assert_eq!(parse_serial("175111864"), Some(175111864));
        assert_eq!(parse_serial(" 0x0a6ffeb8 "), Some(175111864));
        assert_eq!(parse_serial("serial"), None);
    }
}
