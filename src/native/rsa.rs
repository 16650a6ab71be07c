// Copyright 2024 Simo Sorce
// See LICENSE.txt file for terms

use ::rsa::rand_core::OsRng;
use ::rsa::traits::{PrivateKeyParts, PublicKeyParts};
use ::rsa::{BigUint, Pss, RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512, Sha512_224, Sha512_256};

use crate::error::{Error, ErrorKind, Result};
use crate::hash::HashAlg;
use crate::provider::*;
use crate::rsa::{FIPS_MIN_RSA_BITS, FIPS_PUBLIC_EXPONENT, MAX_RSA_SIZE_BITS};

/// An RSA key held in memory by the `rsa` crate
#[derive(Debug)]
pub struct NativeRsaKey {
    public: RsaPublicKey,
    private: Option<RsaPrivateKey>,
}

impl RsaKeyHandle for NativeRsaKey {
    fn bits(&self) -> usize {
        self.public.n().bits()
    }

    fn size(&self) -> usize {
        self.public.size()
    }

    fn public_components(&self) -> Result<RsaPublicComponents> {
        Ok(RsaPublicComponents {
            n: self.public.n().to_bytes_be(),
            e: self.public.e().to_bytes_be(),
        })
    }

    fn is_private(&self) -> bool {
        self.private.is_some()
    }
}

fn supported(alg: HashAlg) -> bool {
    matches!(
        alg,
        HashAlg::Sha224
            | HashAlg::Sha256
            | HashAlg::Sha384
            | HashAlg::Sha512
            | HashAlg::Sha512_224
            | HashAlg::Sha512_256
    )
}

fn pss_padding(alg: HashAlg, salt_len: usize) -> Result<Pss> {
    Ok(match alg {
        HashAlg::Sha224 => Pss::new_with_salt::<Sha224>(salt_len),
        HashAlg::Sha256 => Pss::new_with_salt::<Sha256>(salt_len),
        HashAlg::Sha384 => Pss::new_with_salt::<Sha384>(salt_len),
        HashAlg::Sha512 => Pss::new_with_salt::<Sha512>(salt_len),
        HashAlg::Sha512_224 => Pss::new_with_salt::<Sha512_224>(salt_len),
        HashAlg::Sha512_256 => Pss::new_with_salt::<Sha512_256>(salt_len),
        _ => return Err(Error::new(ErrorKind::ConfigurationRejected)),
    })
}

fn rejected(msg: &str) -> Error {
    Error::with_errmsg(ErrorKind::ConfigurationRejected, msg.to_string())
}

/// Accumulates the PSS configuration; the `rsa` crate takes all of it
/// at once when the operation runs.
#[derive(Debug)]
pub struct NativePssContext<'a> {
    key: &'a NativeRsaKey,
    op: SigOp,
    padding: bool,
    salt: Option<SaltLength>,
    digest: Option<HashAlg>,
    mgf1: Option<HashAlg>,
}

impl NativePssContext<'_> {
    /// Resolves the configured salt length to a byte count
    fn salt_len(&self, alg: HashAlg) -> Result<usize> {
        /* emLen = ceil((modBits - 1) / 8) */
        let em_len = (self.key.bits() + 6) / 8;
        let max = match em_len.checked_sub(alg.size() + 2) {
            Some(m) => m,
            None => return Err(rejected("key too small for digest")),
        };
        let len = match self.salt {
            Some(SaltLength::Digest) => alg.size(),
            Some(SaltLength::Max) | Some(SaltLength::Auto) => max,
            Some(SaltLength::Bytes(len)) => len,
            None => return Err(rejected("salt length not set")),
        };
        if len > max {
            return Err(rejected("salt too long for key and digest"));
        }
        Ok(len)
    }

    fn pss_scheme(&self, digest: &[u8]) -> Result<Pss> {
        if !self.padding {
            return Err(rejected("padding not set"));
        }
        let alg = match (self.digest, self.mgf1) {
            (Some(d), Some(_)) => d,
            _ => return Err(rejected("digest not set")),
        };
        if digest.len() != alg.size() {
            return Err(Error::new(ErrorKind::InvalidInput));
        }
        pss_padding(alg, self.salt_len(alg)?)
    }
}

impl PssContext for NativePssContext<'_> {
    fn set_padding_pss(&mut self) -> Result<()> {
        self.padding = true;
        Ok(())
    }

    fn set_salt_length(&mut self, salt: SaltLength) -> Result<()> {
        if !self.padding {
            return Err(rejected("salt length requires PSS padding"));
        }
        if self.op == SigOp::Verify && salt == SaltLength::Auto {
            return Err(rejected("salt length recovery is not supported"));
        }
        self.salt = Some(salt);
        Ok(())
    }

    fn set_digest(&mut self, alg: HashAlg) -> Result<()> {
        if !supported(alg) {
            return Err(rejected("unsupported digest"));
        }
        self.digest = Some(alg);
        Ok(())
    }

    fn set_mgf1_digest(&mut self, alg: HashAlg) -> Result<()> {
        if !self.padding {
            return Err(rejected("MGF1 digest requires PSS padding"));
        }
        if self.digest != Some(alg) {
            return Err(rejected("MGF1 digest must match the signature digest"));
        }
        self.mgf1 = Some(alg);
        Ok(())
    }

    fn sign(&mut self, digest: &[u8], out: Option<&mut [u8]>) -> Result<usize> {
        if self.op != SigOp::Sign {
            return Err(Error::new(ErrorKind::ProviderFailure));
        }
        let privkey = match &self.key.private {
            Some(k) => k,
            None => {
                return Err(Error::with_errmsg(
                    ErrorKind::InvalidInput,
                    "signing requires a private key".to_string(),
                ))
            }
        };
        let padding = self.pss_scheme(digest)?;
        let siglen = self.key.size();
        let out = match out {
            Some(o) => o,
            None => return Ok(siglen),
        };
        if out.len() < siglen {
            return Err(Error::buffer_too_small(siglen));
        }
        let signature = privkey.sign_with_rng(&mut OsRng, padding, digest)?;
        if signature.len() != siglen {
            return Err(Error::new(ErrorKind::ProviderFailure));
        }
        out[..siglen].copy_from_slice(&signature);
        Ok(siglen)
    }

    fn verify(&mut self, digest: &[u8], signature: &[u8]) -> Result<bool> {
        if self.op != SigOp::Verify {
            return Err(Error::new(ErrorKind::ProviderFailure));
        }
        let padding = self.pss_scheme(digest)?;
        Ok(self.key.public.verify(padding, digest, signature).is_ok())
    }
}

/// Largest private key the `rsa` crate validates
const NATIVE_MAX_PRIVATE_BITS: usize = 4096;

/// RSA provider implemented with the `rsa` and `sha2` crates.
///
/// Public keys up to `MAX_RSA_SIZE_BITS` are accepted. Private keys
/// stop at 4096 bits, the limit of the crate's key validation, so
/// larger keys can only be transferred here without their private part.
#[derive(Debug, Default)]
pub struct NativeRsaProvider;

impl NativeRsaProvider {
    pub fn new() -> NativeRsaProvider {
        NativeRsaProvider
    }
}

fn to_biguint(v: &[u8]) -> BigUint {
    BigUint::from_bytes_be(v)
}

impl RsaProvider for NativeRsaProvider {
    type Key = NativeRsaKey;
    type Context<'a> = NativePssContext<'a>;

    fn name(&self) -> &'static str {
        "native"
    }

    fn is_certified(&self) -> bool {
        false
    }

    fn hash(&self, alg: HashAlg, data: &[u8]) -> Result<Vec<u8>> {
        Ok(match alg {
            HashAlg::Sha224 => Sha224::digest(data).to_vec(),
            HashAlg::Sha256 => Sha256::digest(data).to_vec(),
            HashAlg::Sha384 => Sha384::digest(data).to_vec(),
            HashAlg::Sha512 => Sha512::digest(data).to_vec(),
            HashAlg::Sha512_224 => Sha512_224::digest(data).to_vec(),
            HashAlg::Sha512_256 => Sha512_256::digest(data).to_vec(),
            _ => return Err(rejected("unsupported digest")),
        })
    }

    fn generate_fips_key(
        &self,
        bits: usize,
        mut progress: Option<KeygenProgress>,
    ) -> Result<NativeRsaKey> {
        if bits < FIPS_MIN_RSA_BITS {
            return Err(Error::with_errmsg(
                ErrorKind::InvalidInput,
                format!("RSA keys must be at least {} bits", FIPS_MIN_RSA_BITS),
            ));
        }
        if let Some(cb) = progress.as_mut() {
            if !(*cb)(0, 0) {
                return Err(Error::new(ErrorKind::ProviderFailure));
            }
        }
        let exponent = BigUint::from(FIPS_PUBLIC_EXPONENT);
        let private = RsaPrivateKey::new_with_exp(&mut OsRng, bits, &exponent)?;
        if let Some(cb) = progress.as_mut() {
            /* generation is done, the result is kept either way */
            let _ = (*cb)(3, 0);
        }
        Ok(NativeRsaKey {
            public: RsaPublicKey::from(&private),
            private: Some(private),
        })
    }

    fn import_public_key(
        &self,
        components: &RsaPublicComponents,
    ) -> Result<NativeRsaKey> {
        let public = RsaPublicKey::new_with_max_size(
            to_biguint(&components.n),
            to_biguint(&components.e),
            MAX_RSA_SIZE_BITS,
        )
        .map_err(|e| Error::from_error(ErrorKind::InvalidInput, e))?;
        Ok(NativeRsaKey {
            public: public,
            private: None,
        })
    }

    fn import_private_key(
        &self,
        components: &RsaPrivateComponents,
    ) -> Result<NativeRsaKey> {
        let bits = to_biguint(&components.n).bits();
        if bits > NATIVE_MAX_PRIVATE_BITS {
            return Err(Error::with_errmsg(
                ErrorKind::InvalidInput,
                format!(
                    "native private keys are limited to {} bits, got {}",
                    NATIVE_MAX_PRIVATE_BITS, bits
                ),
            ));
        }
        let mut private = RsaPrivateKey::from_components(
            to_biguint(&components.n),
            to_biguint(&components.e),
            to_biguint(&components.d),
            vec![to_biguint(&components.p), to_biguint(&components.q)],
        )
        .map_err(|e| Error::from_error(ErrorKind::InvalidInput, e))?;
        private
            .validate()
            .map_err(|e| Error::from_error(ErrorKind::InvalidInput, e))?;
        private.precompute()?;
        Ok(NativeRsaKey {
            public: RsaPublicKey::from(&private),
            private: Some(private),
        })
    }

    fn export_private_key(
        &self,
        key: &NativeRsaKey,
    ) -> Result<RsaPrivateComponents> {
        let private = match &key.private {
            Some(k) => k,
            None => {
                return Err(Error::with_errmsg(
                    ErrorKind::InvalidInput,
                    "not a private key".to_string(),
                ))
            }
        };
        let primes = private.primes();
        if primes.len() != 2 {
            return Err(Error::new(ErrorKind::ProviderFailure));
        }
        Ok(RsaPrivateComponents {
            n: private.n().to_bytes_be(),
            e: private.e().to_bytes_be(),
            d: private.d().to_bytes_be(),
            p: primes[0].to_bytes_be(),
            q: primes[1].to_bytes_be(),
        })
    }

    fn pss_context<'a>(
        &'a self,
        key: &'a NativeRsaKey,
        op: SigOp,
    ) -> Result<NativePssContext<'a>> {
        Ok(NativePssContext {
            key: key,
            op: op,
            padding: false,
            salt: None,
            digest: None,
            mgf1: None,
        })
    }
}
