// Copyright 2023 Simo Sorce
// See LICENSE.txt file for terms

//! RSA provider backed by OpenSSL, either through the default provider
//! or restricted to the FIPS module.

use ossl::digest::{self, DigestAlg};
use ossl::OsslContext;

use crate::error::{Error, ErrorKind, Result};
use crate::hash::HashAlg;

#[cfg(feature = "log")]
use log::info;

pub mod rsa;

pub use self::rsa::OsslRsaProvider;

pub(crate) fn hash_to_digest_alg(alg: HashAlg) -> DigestAlg {
    match alg {
        HashAlg::Sha1 => DigestAlg::Sha1,
        HashAlg::Sha224 => DigestAlg::Sha2_224,
        HashAlg::Sha256 => DigestAlg::Sha2_256,
        HashAlg::Sha384 => DigestAlg::Sha2_384,
        HashAlg::Sha512 => DigestAlg::Sha2_512,
        HashAlg::Sha512_224 => DigestAlg::Sha2_512_224,
        HashAlg::Sha512_256 => DigestAlg::Sha2_512_256,
        HashAlg::Sha3_224 => DigestAlg::Sha3_224,
        HashAlg::Sha3_256 => DigestAlg::Sha3_256,
        HashAlg::Sha3_384 => DigestAlg::Sha3_384,
        HashAlg::Sha3_512 => DigestAlg::Sha3_512,
    }
}

/// Creates the library context for the requested mode
pub(crate) fn new_context(fips: bool) -> Result<OsslContext> {
    if !fips {
        return Ok(OsslContext::new_lib_ctx()?);
    }
    match OsslContext::new_fips_ctx() {
        Ok(ctx) => {
            #[cfg(feature = "log")]
            info!("OpenSSL FIPS provider loaded");
            Ok(ctx)
        }
        Err(e) => Err(Error::from_error(ErrorKind::BackendUnavailable, e)),
    }
}

pub(crate) fn hash(
    ctx: &OsslContext,
    alg: HashAlg,
    data: &[u8],
) -> Result<Vec<u8>> {
    match digest::digest(ctx, hash_to_digest_alg(alg), data) {
        Ok(v) => Ok(v),
        /* a digest the provider does not offer */
        Err(e) => Err(Error::from_error(ErrorKind::ConfigurationRejected, e)),
    }
}
