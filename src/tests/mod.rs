// Copyright 2023 Simo Sorce
// See LICENSE.txt file for terms

use std::sync::LazyLock;

use crate::backend::{Backend, BackendKind};
use crate::hash::HashAlg;
use crate::provider::RsaPrivateComponents;
use crate::rsa::RsaKey;

#[cfg(feature = "openssl")]
static OSSL_BACKEND: LazyLock<Backend> =
    LazyLock::new(|| Backend::with_kind(BackendKind::OpenSsl).unwrap());

#[cfg(feature = "openssl")]
pub fn ossl_backend() -> &'static Backend {
    &OSSL_BACKEND
}

#[cfg(feature = "native")]
static NATIVE_BACKEND: LazyLock<Backend> =
    LazyLock::new(|| Backend::with_kind(BackendKind::Native).unwrap());

#[cfg(feature = "native")]
pub fn native_backend() -> &'static Backend {
    &NATIVE_BACKEND
}

/* Generating with OpenSSL is much faster than with the rsa crate in
 * debug builds, so when available it provides the shared key */
#[cfg(feature = "openssl")]
fn test_backend() -> &'static Backend {
    ossl_backend()
}

#[cfg(not(feature = "openssl"))]
fn test_backend() -> &'static Backend {
    native_backend()
}

static TEST_KEY: LazyLock<RsaPrivateComponents> = LazyLock::new(|| {
    RsaKey::generate_in(test_backend(), 2048, None)
        .unwrap()
        .export_private_components()
        .unwrap()
});

/// Components of a 2048 bit key shared across tests
pub fn test_key_components() -> &'static RsaPrivateComponents {
    &TEST_KEY
}

/// Imports the shared test key into a backend
pub fn test_key(backend: &Backend) -> RsaKey<'_> {
    RsaKey::import_private_in(backend, test_key_components()).unwrap()
}

pub fn sha256(data: &[u8]) -> Vec<u8> {
    test_backend().hash(HashAlg::Sha256, data).unwrap()
}

mod backend;
mod config;
mod hash;

#[cfg(feature = "native")]
mod native;
