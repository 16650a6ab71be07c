// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

//! This module provides an abstraction over the OpenSSL EVP_PKEY
//! signature apis for RSA-PSS signatures over precomputed digests.
//!
//! PSS parameters are applied to the context one at a time so that a
//! failure can be attributed to the specific setting that was refused.

use std::ffi::c_int;

use crate::bindings::*;
use crate::digest::DigestAlg;
use crate::pkey::{EvpPkey, EvpPkeyCtx};
use crate::{cstr, trace_ossl, Error, ErrorKind, OsslContext, OsslParam};

/// Operation type for OsslSignature
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SigOp {
    Sign,
    Verify,
}

/// PSS salt length selector
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PssSaltLen {
    /// Salt as long as the digest output
    Digest,
    /// Largest salt that fits in the modulus
    Max,
    /// Sign with the maximum, recover the length on verification
    Auto,
    /// Explicit length in bytes
    Len(usize),
}

/// Higher level wrapper for RSA-PSS signature operations with OpenSSL
#[derive(Debug)]
pub struct OsslSignature {
    /// The underlying OpenSSL EVP PKEY context.
    pkey_ctx: EvpPkeyCtx,
    /// An extra reference on the key held for the context lifetime
    _key: EvpPkey,
    /// The requested operation type
    op: SigOp,
}

impl OsslSignature {
    /// Creates a new sign/verify context for the key. No parameter is
    /// set, the caller must configure padding and digests before use.
    pub fn new(
        libctx: &OsslContext,
        op: SigOp,
        key: &EvpPkey,
    ) -> Result<OsslSignature, Error> {
        let mut key = key.try_clone()?;
        let mut ctx = OsslSignature {
            pkey_ctx: key.new_ctx(libctx)?,
            _key: key,
            op: op,
        };

        let ret = unsafe {
            match ctx.op {
                SigOp::Sign => EVP_PKEY_sign_init(ctx.pkey_ctx.as_mut_ptr()),
                SigOp::Verify => {
                    EVP_PKEY_verify_init(ctx.pkey_ctx.as_mut_ptr())
                }
            }
        };
        if ret != 1 {
            match ctx.op {
                SigOp::Sign => {
                    trace_ossl!("EVP_PKEY_sign_init()");
                }
                SigOp::Verify => {
                    trace_ossl!("EVP_PKEY_verify_init()");
                }
            }
            return Err(Error::new(ErrorKind::OsslError));
        }
        Ok(ctx)
    }

    /// Selects PSS padding, must be called before any other setting
    pub fn set_pad_mode_pss(&mut self) -> Result<(), Error> {
        let mut params = OsslParam::with_capacity(1);
        params.add_const_c_string(
            cstr!(OSSL_SIGNATURE_PARAM_PAD_MODE),
            cstr!(OSSL_PKEY_RSA_PAD_MODE_PSS),
        )?;
        params.finalize();
        self.pkey_ctx.set_params(&params)
    }

    pub fn set_pss_saltlen(&mut self, saltlen: PssSaltLen) -> Result<(), Error> {
        let mut params = OsslParam::with_capacity(1);
        let key = cstr!(OSSL_SIGNATURE_PARAM_PSS_SALTLEN);
        match saltlen {
            PssSaltLen::Digest => params.add_const_c_string(
                key,
                cstr!(OSSL_PKEY_RSA_PSS_SALT_LEN_DIGEST),
            )?,
            PssSaltLen::Max => params
                .add_const_c_string(key, cstr!(OSSL_PKEY_RSA_PSS_SALT_LEN_MAX))?,
            PssSaltLen::Auto => params.add_const_c_string(
                key,
                cstr!(OSSL_PKEY_RSA_PSS_SALT_LEN_AUTO),
            )?,
            PssSaltLen::Len(len) => {
                params.add_int(key, c_int::try_from(len)?)?
            }
        }
        params.finalize();
        self.pkey_ctx.set_params(&params)
    }

    /// Sets the digest the input was computed with
    pub fn set_digest(&mut self, digest: DigestAlg) -> Result<(), Error> {
        let mut params = OsslParam::with_capacity(1);
        params.add_const_c_string(
            cstr!(OSSL_SIGNATURE_PARAM_DIGEST),
            digest.name(),
        )?;
        params.finalize();
        self.pkey_ctx.set_params(&params)
    }

    /// Sets the digest used by the MGF1 mask generation function
    pub fn set_mgf1_digest(&mut self, digest: DigestAlg) -> Result<(), Error> {
        let mut params = OsslParam::with_capacity(1);
        params.add_const_c_string(
            cstr!(OSSL_SIGNATURE_PARAM_MGF1_DIGEST),
            digest.name(),
        )?;
        params.finalize();
        self.pkey_ctx.set_params(&params)
    }

    /// One shot signature, takes the digest and a buffer where to store
    /// the signature. When no buffer is provided only the required
    /// length is returned. The signature buffer must have enough space
    /// to receive the signature. On success the signature length is
    /// returned.
    pub fn sign(
        &mut self,
        data: &[u8],
        signature: Option<&mut [u8]>,
    ) -> Result<usize, Error> {
        if self.op != SigOp::Sign {
            return Err(Error::new(ErrorKind::WrapperError));
        }
        let mut siglen: usize = 0;

        /* check siglen buffer is large enough */
        let ret = unsafe {
            EVP_PKEY_sign(
                self.pkey_ctx.as_mut_ptr(),
                std::ptr::null_mut(),
                &mut siglen,
                data.as_ptr(),
                data.len(),
            )
        };
        if ret != 1 {
            trace_ossl!("EVP_PKEY_sign()");
            return Err(Error::new(ErrorKind::OsslError));
        }

        if let Some(sig) = signature {
            if siglen > sig.len() {
                return Err(Error::new(ErrorKind::BufferSize));
            }
            siglen = sig.len();
            let ret = unsafe {
                EVP_PKEY_sign(
                    self.pkey_ctx.as_mut_ptr(),
                    sig.as_mut_ptr(),
                    &mut siglen,
                    data.as_ptr(),
                    data.len(),
                )
            };
            if ret != 1 {
                trace_ossl!("EVP_PKEY_sign()");
                return Err(Error::new(ErrorKind::OsslError));
            }
        }

        Ok(siglen)
    }

    /// One shot verification function
    pub fn verify(&mut self, data: &[u8], signature: &[u8]) -> Result<(), Error> {
        if self.op != SigOp::Verify {
            return Err(Error::new(ErrorKind::WrapperError));
        }
        let ret = unsafe {
            EVP_PKEY_verify(
                self.pkey_ctx.as_mut_ptr(),
                signature.as_ptr(),
                signature.len(),
                data.as_ptr(),
                data.len(),
            )
        };
        if ret != 1 {
            trace_ossl!("EVP_PKEY_verify()");
            return Err(Error::new(ErrorKind::OsslError));
        }
        Ok(())
    }
}
