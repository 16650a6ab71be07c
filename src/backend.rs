// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

//! Process wide backend selection.
//!
//! The backend is chosen once, either explicitly with [`init`] or lazily
//! from the configuration on first use, and never changes afterwards.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{Error, ErrorKind, Result};
use crate::hash::HashAlg;
use crate::provider::RsaProvider;

#[cfg(feature = "native")]
use crate::native::NativeRsaProvider;
#[cfg(feature = "openssl")]
use crate::ossl::OsslRsaProvider;

#[cfg(feature = "log")]
use log::info;

/// The available backend kinds
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// OpenSSL with its default provider
    OpenSsl,
    /// OpenSSL restricted to the FIPS provider
    Fips,
    /// Built-in Rust implementation
    Native,
}

impl Default for BackendKind {
    fn default() -> BackendKind {
        if cfg!(feature = "openssl") {
            BackendKind::OpenSsl
        } else {
            BackendKind::Native
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BackendKind::OpenSsl => write!(f, "openssl"),
            BackendKind::Fips => write!(f, "fips"),
            BackendKind::Native => write!(f, "native"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<BackendKind> {
        match s {
            "openssl" => Ok(BackendKind::OpenSsl),
            "fips" => Ok(BackendKind::Fips),
            "native" => Ok(BackendKind::Native),
            _ => Err(Error::with_errmsg(
                ErrorKind::Config,
                format!("unknown backend '{}'", s),
            )),
        }
    }
}

/// The provider instance serving a backend
#[derive(Debug)]
pub enum Provider {
    #[cfg(feature = "openssl")]
    Ossl(OsslRsaProvider),
    #[cfg(feature = "native")]
    Native(NativeRsaProvider),
}

/// An initialized backend
#[derive(Debug)]
pub struct Backend {
    kind: BackendKind,
    min_rsa_bits: usize,
    provider: Provider,
}

impl Backend {
    /// Instantiates the backend described by the configuration
    pub fn new(config: &Config) -> Result<Backend> {
        let provider = match config.backend {
            #[cfg(feature = "openssl")]
            BackendKind::OpenSsl => Provider::Ossl(OsslRsaProvider::new()?),
            #[cfg(feature = "openssl")]
            BackendKind::Fips => Provider::Ossl(OsslRsaProvider::new_fips()?),
            #[cfg(feature = "native")]
            BackendKind::Native => Provider::Native(NativeRsaProvider::new()),
            #[allow(unreachable_patterns)]
            kind => {
                return Err(Error::with_errmsg(
                    ErrorKind::BackendUnavailable,
                    format!("the {} backend is not built in", kind),
                ))
            }
        };
        Ok(Backend {
            kind: config.backend,
            min_rsa_bits: config.min_rsa_bits,
            provider: provider,
        })
    }

    /// Instantiates a backend of the given kind with default settings
    pub fn with_kind(kind: BackendKind) -> Result<Backend> {
        let config = Config {
            backend: kind,
            ..Config::default()
        };
        Self::new(&config)
    }

    pub fn kind(&self) -> BackendKind {
        self.kind
    }

    pub fn min_rsa_bits(&self) -> usize {
        self.min_rsa_bits
    }

    pub fn provider(&self) -> &Provider {
        &self.provider
    }

    pub fn name(&self) -> &'static str {
        match &self.provider {
            #[cfg(feature = "openssl")]
            Provider::Ossl(p) => p.name(),
            #[cfg(feature = "native")]
            Provider::Native(p) => p.name(),
        }
    }

    /// Whether operations run inside a certified module
    pub fn is_certified(&self) -> bool {
        match &self.provider {
            #[cfg(feature = "openssl")]
            Provider::Ossl(p) => p.is_certified(),
            #[cfg(feature = "native")]
            Provider::Native(p) => p.is_certified(),
        }
    }

    /// Computes a message digest with this backend
    pub fn hash(&self, alg: HashAlg, data: &[u8]) -> Result<Vec<u8>> {
        match &self.provider {
            #[cfg(feature = "openssl")]
            Provider::Ossl(p) => p.hash(alg, data),
            #[cfg(feature = "native")]
            Provider::Native(p) => p.hash(alg, data),
        }
    }
}

static BACKEND: OnceCell<Backend> = OnceCell::new();

fn create(config: &Config) -> Result<Backend> {
    let backend = Backend::new(config)?;
    #[cfg(feature = "log")]
    info!("Using the {} cryptographic backend", backend.name());
    Ok(backend)
}

/// Selects the process wide backend. Fails if a backend is already
/// in use, whether selected explicitly or lazily.
pub fn init(config: &Config) -> Result<()> {
    let mut created = false;
    BACKEND.get_or_try_init(|| {
        created = true;
        create(config)
    })?;
    if !created {
        return Err(Error::new(ErrorKind::AlreadyInitialized));
    }
    Ok(())
}

/// Returns the process wide backend, initializing it from the
/// configuration files and environment if [`init`] was never called.
pub fn active() -> Result<&'static Backend> {
    BACKEND.get_or_try_init(|| create(&Config::load()?))
}

/// Whether the process wide backend is the external OpenSSL library.
/// Never selects a backend: false until one is in use.
pub fn enabled() -> bool {
    match BACKEND.get() {
        Some(b) => b.kind() != BackendKind::Native,
        None => false,
    }
}

/// Whether the process wide backend runs in FIPS mode
pub fn fips_enabled() -> bool {
    match BACKEND.get() {
        Some(b) => b.is_certified(),
        None => false,
    }
}

/// Marks built-in code that must never run while OpenSSL serves the
/// process.
pub fn unreachable() {
    if enabled() {
        panic!("built-in cryptography used while the OpenSSL backend is active");
    }
}

/// Like [`unreachable`], except in test builds, where both backends
/// are exercised side by side.
pub fn unreachable_except_tests() {
    if !cfg!(test) {
        unreachable();
    }
}
