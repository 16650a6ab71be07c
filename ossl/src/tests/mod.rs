// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

use std::sync::LazyLock;

use crate::pkey::EvpPkey;
use crate::{BigNum, OsslContext};

static TEST_CONTEXT: LazyLock<OsslContext> =
    LazyLock::new(|| OsslContext::new_lib_ctx().unwrap());

pub fn test_ossl_context() -> &'static OsslContext {
    &TEST_CONTEXT
}

pub fn f4() -> BigNum {
    let mut e = BigNum::new().unwrap();
    e.set_word(65537).unwrap();
    e
}

static TEST_KEY: LazyLock<EvpPkey> = LazyLock::new(|| {
    EvpPkey::generate_rsa(test_ossl_context(), 2048, &f4(), None).unwrap()
});

/// A 2048 bit RSA key shared across tests
pub fn test_rsa_key() -> &'static EvpPkey {
    &TEST_KEY
}

mod fips;
mod pkey;
