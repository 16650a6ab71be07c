// Copyright 2023 Simo Sorce
// See LICENSE.txt file for terms

use ossl::pkey::{EvpPkey, RsaData};
use ossl::signature::{OsslSignature, PssSaltLen};
use ossl::{BigNum, OsslContext};

use crate::error::{Error, ErrorKind, Result};
use crate::hash::HashAlg;
use crate::provider::*;
use crate::rsa::FIPS_PUBLIC_EXPONENT;

use super::hash_to_digest_alg;

#[cfg(feature = "log")]
use log::error;

/// An RSA key held by OpenSSL
#[derive(Debug)]
pub struct OsslRsaKey {
    pkey: EvpPkey,
    bits: usize,
    size: usize,
    private: bool,
}

impl OsslRsaKey {
    fn new(pkey: EvpPkey) -> Result<OsslRsaKey> {
        let bits = pkey.get_bits()?;
        let size = pkey.get_size()?;
        let private = pkey.is_private();
        Ok(OsslRsaKey {
            pkey: pkey,
            bits: bits,
            size: size,
            private: private,
        })
    }
}

impl RsaKeyHandle for OsslRsaKey {
    fn bits(&self) -> usize {
        self.bits
    }

    fn size(&self) -> usize {
        self.size
    }

    fn public_components(&self) -> Result<RsaPublicComponents> {
        let data = self.pkey.export_rsa()?;
        Ok(RsaPublicComponents {
            n: data.n.clone(),
            e: data.e.clone(),
        })
    }

    fn is_private(&self) -> bool {
        self.private
    }
}

/// A configured OpenSSL sign/verify context
#[derive(Debug)]
pub struct OsslPssContext {
    sig: OsslSignature,
}

#[cfg_attr(not(feature = "log"), allow(unused_variables))]
fn rejected(step: PssStep, e: ossl::Error) -> Error {
    #[cfg(feature = "log")]
    error!("OpenSSL refused PSS {:?} setting", step);
    Error::from_error(ErrorKind::ConfigurationRejected, e)
}

impl PssContext for OsslPssContext {
    fn set_padding_pss(&mut self) -> Result<()> {
        self.sig
            .set_pad_mode_pss()
            .map_err(|e| rejected(PssStep::Padding, e))
    }

    fn set_salt_length(&mut self, salt: SaltLength) -> Result<()> {
        let saltlen = match salt {
            SaltLength::Digest => PssSaltLen::Digest,
            SaltLength::Max => PssSaltLen::Max,
            SaltLength::Auto => PssSaltLen::Auto,
            SaltLength::Bytes(len) => PssSaltLen::Len(len),
        };
        self.sig
            .set_pss_saltlen(saltlen)
            .map_err(|e| rejected(PssStep::SaltLength, e))
    }

    fn set_digest(&mut self, alg: HashAlg) -> Result<()> {
        self.sig
            .set_digest(hash_to_digest_alg(alg))
            .map_err(|e| rejected(PssStep::Digest, e))
    }

    fn set_mgf1_digest(&mut self, alg: HashAlg) -> Result<()> {
        self.sig
            .set_mgf1_digest(hash_to_digest_alg(alg))
            .map_err(|e| rejected(PssStep::Mgf1Digest, e))
    }

    fn sign(&mut self, digest: &[u8], out: Option<&mut [u8]>) -> Result<usize> {
        Ok(self.sig.sign(digest, out)?)
    }

    fn verify(&mut self, digest: &[u8], signature: &[u8]) -> Result<bool> {
        /* libcrypto does not tell a mismatch from other failures */
        Ok(self.sig.verify(digest, signature).is_ok())
    }
}

/// RSA provider over an OpenSSL library context
#[derive(Debug)]
pub struct OsslRsaProvider {
    ctx: OsslContext,
    fips: bool,
}

impl OsslRsaProvider {
    /// Uses the default OpenSSL provider
    pub fn new() -> Result<OsslRsaProvider> {
        Ok(OsslRsaProvider {
            ctx: super::new_context(false)?,
            fips: false,
        })
    }

    /// Uses only the OpenSSL FIPS provider, fails if it is not installed
    pub fn new_fips() -> Result<OsslRsaProvider> {
        let ctx = super::new_context(true)?;
        let fips = ctx.is_fips_enabled();
        if !fips {
            return Err(Error::new(ErrorKind::BackendUnavailable));
        }
        Ok(OsslRsaProvider {
            ctx: ctx,
            fips: fips,
        })
    }

    pub fn context(&self) -> &OsslContext {
        &self.ctx
    }
}

impl RsaProvider for OsslRsaProvider {
    type Key = OsslRsaKey;
    type Context<'a> = OsslPssContext;

    fn name(&self) -> &'static str {
        if self.fips {
            "openssl-fips"
        } else {
            "openssl"
        }
    }

    fn is_certified(&self) -> bool {
        self.fips
    }

    fn hash(&self, alg: HashAlg, data: &[u8]) -> Result<Vec<u8>> {
        super::hash(&self.ctx, alg, data)
    }

    fn generate_fips_key(
        &self,
        bits: usize,
        progress: Option<KeygenProgress>,
    ) -> Result<OsslRsaKey> {
        /* the FIPS module enforces 65537 itself, it is still passed in
         * explicitly so every provider gets the same request */
        let mut exponent = BigNum::new()?;
        exponent.set_word(FIPS_PUBLIC_EXPONENT)?;
        let pkey = EvpPkey::generate_rsa(&self.ctx, bits, &exponent, progress)?;
        OsslRsaKey::new(pkey)
    }

    fn import_public_key(
        &self,
        components: &RsaPublicComponents,
    ) -> Result<OsslRsaKey> {
        let data = RsaData {
            n: components.n.clone(),
            e: components.e.clone(),
            d: None,
            p: None,
            q: None,
        };
        let pkey = EvpPkey::import_rsa(&self.ctx, &data)
            .map_err(|e| Error::from_error(ErrorKind::InvalidInput, e))?;
        OsslRsaKey::new(pkey)
    }

    fn import_private_key(
        &self,
        components: &RsaPrivateComponents,
    ) -> Result<OsslRsaKey> {
        let data = RsaData {
            n: components.n.clone(),
            e: components.e.clone(),
            d: Some(components.d.clone()),
            p: Some(components.p.clone()),
            q: Some(components.q.clone()),
        };
        let pkey = EvpPkey::import_rsa(&self.ctx, &data)
            .map_err(|e| Error::from_error(ErrorKind::InvalidInput, e))?;
        OsslRsaKey::new(pkey)
    }

    fn export_private_key(
        &self,
        key: &OsslRsaKey,
    ) -> Result<RsaPrivateComponents> {
        if !key.private {
            return Err(Error::with_errmsg(
                ErrorKind::InvalidInput,
                "not a private key".to_string(),
            ));
        }
        let data = key.pkey.export_rsa()?;
        match (&data.d, &data.p, &data.q) {
            (Some(d), Some(p), Some(q)) => Ok(RsaPrivateComponents {
                n: data.n.clone(),
                e: data.e.clone(),
                d: d.clone(),
                p: p.clone(),
                q: q.clone(),
            }),
            _ => Err(Error::new(ErrorKind::ProviderFailure)),
        }
    }

    fn pss_context<'a>(
        &'a self,
        key: &'a OsslRsaKey,
        op: SigOp,
    ) -> Result<OsslPssContext> {
        let op = match op {
            SigOp::Sign => ossl::signature::SigOp::Sign,
            SigOp::Verify => ossl::signature::SigOp::Verify,
        };
        Ok(OsslPssContext {
            sig: OsslSignature::new(&self.ctx, op, &key.pkey)?,
        })
    }
}
