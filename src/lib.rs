// Copyright 2023 Simo Sorce
// See LICENSE.txt file for terms

//! This is cryptobackend
//!
//! RSA key generation and RSA-PSS signatures served by a pluggable
//! provider: OpenSSL, OpenSSL restricted to its FIPS module, or a
//! built-in Rust implementation. The provider is chosen once per
//! process, see [`backend`].

pub mod backend;
pub mod config;
pub mod error;
pub mod hash;
pub mod provider;
pub mod pss;
pub mod rsa;

#[cfg(feature = "log")]
mod log;

/* Include providers based on selected features */
include!("enabled.rs");

pub use backend::{Backend, BackendKind};
pub use config::Config;
pub use error::{Error, ErrorKind, Result};
pub use hash::HashAlg;
pub use provider::{
    PssParams, RsaPrivateComponents, RsaPublicComponents, SaltLength,
};
pub use rsa::RsaKey;

#[cfg(test)]
mod tests;
