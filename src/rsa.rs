// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

//! RSA keys bound to a backend, with RSA-PSS signing and verification
//! over precomputed digests.

use crate::backend::{self, Backend, BackendKind, Provider};
use crate::error::{Error, ErrorKind, Result};
use crate::hash::HashAlg;
use crate::provider::*;
use crate::pss;

#[cfg(feature = "native")]
use crate::native::rsa::NativeRsaKey;
#[cfg(feature = "openssl")]
use crate::ossl::rsa::OsslRsaKey;

/// The only public exponent FIPS 186 key generation uses here
pub const FIPS_PUBLIC_EXPONENT: u32 = 65537;
/// Smallest modulus FIPS 186-5 allows for new keys
pub const FIPS_MIN_RSA_BITS: usize = 2048;
pub const MIN_RSA_SIZE_BITS: usize = 1024;
pub const MAX_RSA_SIZE_BITS: usize = 16384;

#[derive(Debug)]
enum KeyInner {
    #[cfg(feature = "openssl")]
    Ossl(OsslRsaKey),
    #[cfg(feature = "native")]
    Native(NativeRsaKey),
}

impl KeyInner {
    fn handle(&self) -> &dyn RsaKeyHandle {
        match self {
            #[cfg(feature = "openssl")]
            KeyInner::Ossl(k) => k,
            #[cfg(feature = "native")]
            KeyInner::Native(k) => k,
        }
    }
}

/* Runs $body with the provider and key of matching backends */
macro_rules! with_provider {
    ($key:expr, $p:ident, $k:ident => $body:expr) => {
        match ($key.backend.provider(), &$key.inner) {
            #[cfg(feature = "openssl")]
            (Provider::Ossl($p), KeyInner::Ossl($k)) => $body,
            #[cfg(feature = "native")]
            (Provider::Native($p), KeyInner::Native($k)) => $body,
            #[allow(unreachable_patterns)]
            _ => Err(Error::with_errmsg(
                ErrorKind::BackendUnavailable,
                "key does not belong to its backend".to_string(),
            )),
        }
    };
}

/* Built-in code may serve the process only when OpenSSL does not */
fn process_default() -> Result<&'static Backend> {
    let backend = backend::active()?;
    if backend.kind() == BackendKind::Native {
        backend::unreachable();
    }
    Ok(backend)
}

/// An RSA key created by, and usable only with, one backend
#[derive(Debug)]
pub struct RsaKey<'b> {
    backend: &'b Backend,
    inner: KeyInner,
}

impl RsaKey<'static> {
    /// Generates a key pair with the active backend
    pub fn generate_fips(bits: usize) -> Result<RsaKey<'static>> {
        Self::generate_in(process_default()?, bits, None)
    }

    /// Generates a key pair with the active backend, reporting
    /// progress; returning false from the callback aborts generation.
    pub fn generate_fips_with_progress(
        bits: usize,
        progress: KeygenProgress,
    ) -> Result<RsaKey<'static>> {
        Self::generate_in(process_default()?, bits, Some(progress))
    }

    pub fn from_public_components(
        components: &RsaPublicComponents,
    ) -> Result<RsaKey<'static>> {
        Self::import_public_in(process_default()?, components)
    }

    pub fn from_private_components(
        components: &RsaPrivateComponents,
    ) -> Result<RsaKey<'static>> {
        Self::import_private_in(process_default()?, components)
    }
}

impl<'b> RsaKey<'b> {
    /// Generates a key pair with public exponent 65537 on a specific
    /// backend
    pub fn generate_in(
        backend: &'b Backend,
        bits: usize,
        progress: Option<KeygenProgress>,
    ) -> Result<RsaKey<'b>> {
        if bits < backend.min_rsa_bits() || bits > MAX_RSA_SIZE_BITS {
            return Err(Error::with_errmsg(
                ErrorKind::InvalidInput,
                format!(
                    "RSA key size must be between {} and {} bits",
                    backend.min_rsa_bits(),
                    MAX_RSA_SIZE_BITS
                ),
            ));
        }
        let inner = match backend.provider() {
            #[cfg(feature = "openssl")]
            Provider::Ossl(p) => {
                KeyInner::Ossl(p.generate_fips_key(bits, progress)?)
            }
            #[cfg(feature = "native")]
            Provider::Native(p) => {
                KeyInner::Native(p.generate_fips_key(bits, progress)?)
            }
        };
        Ok(RsaKey {
            backend: backend,
            inner: inner,
        })
    }

    pub fn import_public_in(
        backend: &'b Backend,
        components: &RsaPublicComponents,
    ) -> Result<RsaKey<'b>> {
        let inner = match backend.provider() {
            #[cfg(feature = "openssl")]
            Provider::Ossl(p) => KeyInner::Ossl(p.import_public_key(components)?),
            #[cfg(feature = "native")]
            Provider::Native(p) => {
                KeyInner::Native(p.import_public_key(components)?)
            }
        };
        Ok(RsaKey {
            backend: backend,
            inner: inner,
        })
    }

    pub fn import_private_in(
        backend: &'b Backend,
        components: &RsaPrivateComponents,
    ) -> Result<RsaKey<'b>> {
        let inner = match backend.provider() {
            #[cfg(feature = "openssl")]
            Provider::Ossl(p) => {
                KeyInner::Ossl(p.import_private_key(components)?)
            }
            #[cfg(feature = "native")]
            Provider::Native(p) => {
                KeyInner::Native(p.import_private_key(components)?)
            }
        };
        Ok(RsaKey {
            backend: backend,
            inner: inner,
        })
    }

    /// Moves the key material to another backend
    pub fn transfer_to<'c>(&self, backend: &'c Backend) -> Result<RsaKey<'c>> {
        if self.is_private() {
            let components = self.export_private_components()?;
            RsaKey::import_private_in(backend, &components)
        } else {
            RsaKey::import_public_in(backend, &self.public_components()?)
        }
    }

    pub fn backend(&self) -> &'b Backend {
        self.backend
    }

    /// Modulus size in bits
    pub fn bits(&self) -> usize {
        self.inner.handle().bits()
    }

    /// Modulus size in bytes, which is also the signature size
    pub fn size(&self) -> usize {
        self.inner.handle().size()
    }

    pub fn is_private(&self) -> bool {
        self.inner.handle().is_private()
    }

    pub fn public_components(&self) -> Result<RsaPublicComponents> {
        self.inner.handle().public_components()
    }

    /// Big endian public exponent
    pub fn public_exponent(&self) -> Result<Vec<u8>> {
        Ok(self.public_components()?.e)
    }

    pub fn export_private_components(&self) -> Result<RsaPrivateComponents> {
        with_provider!(self, p, k => p.export_private_key(k))
    }

    /// Returns the length a signature with these parameters will have
    pub fn signature_len(
        &self,
        digest: &[u8],
        params: &PssParams,
    ) -> Result<usize> {
        with_provider!(self, p, k => pss::sign_pss(p, k, digest, params, None))
    }

    /// Signs a precomputed digest
    pub fn sign_pss(&self, digest: &[u8], params: &PssParams) -> Result<Vec<u8>> {
        with_provider!(self, p, k => pss::sign_pss_to_vec(p, k, digest, params))
    }

    /// Signs a precomputed digest into `out`, which is left untouched
    /// on failure
    pub fn sign_pss_into(
        &self,
        digest: &[u8],
        params: &PssParams,
        out: &mut [u8],
    ) -> Result<usize> {
        with_provider!(self, p, k => pss::sign_pss(p, k, digest, params, Some(out)))
    }

    /// Checks a signature over a precomputed digest
    pub fn verify_pss(
        &self,
        digest: &[u8],
        params: &PssParams,
        signature: &[u8],
    ) -> Result<()> {
        let valid = with_provider!(self, p, k => {
            Ok(pss::verify_pss(p, k, digest, params, signature))
        })?;
        if !valid {
            return Err(Error::new(ErrorKind::VerifyFailed));
        }
        Ok(())
    }
}

/// Computes a digest with the active backend
pub fn hash(alg: HashAlg, data: &[u8]) -> Result<Vec<u8>> {
    process_default()?.hash(alg, data)
}
