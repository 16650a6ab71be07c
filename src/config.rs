// Copyright 2024 Simo Sorce
// See LICENSE.txt file for terms

use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::backend::BackendKind;
use crate::error::{Error, ErrorKind, Result};
use crate::rsa::{MAX_RSA_SIZE_BITS, MIN_RSA_SIZE_BITS};

use serde::{Deserialize, Serialize};
use toml;

#[cfg(not(test))]
const DEFAULT_CONF_DIR: &str = {
    match option_env!("CONFDIR") {
        Some(p) => p,
        None => "/usr/local/etc",
    }
};
#[cfg(test)]
const DEFAULT_CONF_DIR: &str = "testdata";

pub const DEFAULT_CONF_NAME: &str = "backend.conf";

/// Environment variable naming the configuration file
pub const CONF_ENV: &str = "CRYPTOBACKEND_CONF";
/// Environment variable overriding the configured backend
pub const BACKEND_ENV: &str = "CRYPTOBACKEND_BACKEND";

/// Backend configuration
///
/// Every field is optional in the file, missing ones take their
/// default value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Which provider serves RSA operations
    pub backend: BackendKind,
    /// Smallest modulus accepted for key generation
    pub min_rsa_bits: usize,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            backend: BackendKind::default(),
            min_rsa_bits: 2048,
        }
    }
}

impl Config {
    pub fn new() -> Config {
        Config::default()
    }

    /// Looks for a configuration file, the env var has the highest
    /// precedence, then the user config dirs, then the system one.
    pub fn find_conf() -> Option<String> {
        if let Ok(var) = env::var(CONF_ENV) {
            return Some(var);
        }
        let mut candidates = Vec::with_capacity(3);
        if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
            candidates
                .push(format!("{}/cryptobackend/{}", xdg, DEFAULT_CONF_NAME));
        }
        if let Ok(home) = env::var("HOME") {
            candidates.push(format!(
                "{}/.config/cryptobackend/{}",
                home, DEFAULT_CONF_NAME
            ));
        }
        candidates.push(format!(
            "{}/cryptobackend/{}",
            DEFAULT_CONF_DIR, DEFAULT_CONF_NAME
        ));
        candidates.into_iter().find(|c| Path::new(c).is_file())
    }

    pub fn from_file(filename: &str) -> Result<Config> {
        let config_str = fs::read_to_string(filename)?;
        Self::from_toml(&config_str)
    }

    pub fn from_toml(config_str: &str) -> Result<Config> {
        let conf: Config = toml::from_str(config_str)?;
        conf.validate()?;
        Ok(conf)
    }

    /// Loads the configuration from the standard locations, falling
    /// back to defaults when no file exists, then applies the
    /// environment override.
    pub fn load() -> Result<Config> {
        let mut conf = match Self::find_conf() {
            Some(filename) => Self::from_file(&filename)?,
            None => Config::default(),
        };
        conf.apply_env()?;
        Ok(conf)
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(var) = env::var(BACKEND_ENV) {
            self.backend = BackendKind::from_str(&var)?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.min_rsa_bits < MIN_RSA_SIZE_BITS
            || self.min_rsa_bits > MAX_RSA_SIZE_BITS
        {
            return Err(Error::with_errmsg(
                ErrorKind::Config,
                format!(
                    "min_rsa_bits must be between {} and {}",
                    MIN_RSA_SIZE_BITS, MAX_RSA_SIZE_BITS
                ),
            ));
        }
        Ok(())
    }
}
