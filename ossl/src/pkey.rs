// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

//! This module provides a coherent abstraction for OpenSSL asymmetric Key
//! management. It handles RSA key import, component export and key
//! generation with an optional progress callback.

use std::ffi::{c_int, c_uint, c_void, CStr};
use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::bindings::*;
use crate::{
    cstr, trace_ossl, BigNum, Error, ErrorKind, OsslContext, OsslParam,
};

/// Wrapper around OpenSSL's `EVP_PKEY_CTX`, managing its lifecycle.
/// Used for key generation and for signature operations.
#[derive(Debug)]
pub struct EvpPkeyCtx {
    ptr: *mut EVP_PKEY_CTX,
}

/// Methods for creating and accessing `EvpPkeyCtx`.
impl EvpPkeyCtx {
    /// Fetches an algorithm by name and returns a wrapper `EvpPkeyCtx`
    pub fn new(ctx: &OsslContext, name: &CStr) -> Result<EvpPkeyCtx, Error> {
        let ptr = unsafe {
            EVP_PKEY_CTX_new_from_name(
                ctx.ptr(),
                name.as_ptr(),
                std::ptr::null(),
            )
        };
        if ptr.is_null() {
            trace_ossl!("EVP_PKEY_CTX_new_from_name()");
            return Err(Error::new(ErrorKind::NullPtr));
        }
        Ok(EvpPkeyCtx { ptr: ptr })
    }

    /// Creates an `EvpPkeyCtx` from an existing raw pointer (takes ownership).
    pub unsafe fn from_ptr(
        ptr: *mut EVP_PKEY_CTX,
    ) -> Result<EvpPkeyCtx, Error> {
        if ptr.is_null() {
            return Err(Error::new(ErrorKind::NullPtr));
        }
        Ok(EvpPkeyCtx { ptr: ptr })
    }

    /// Applies a finalized parameter array to the context
    pub fn set_params(&mut self, params: &OsslParam) -> Result<(), Error> {
        let res = unsafe { EVP_PKEY_CTX_set_params(self.ptr, params.as_ptr()?) };
        if res != 1 {
            trace_ossl!("EVP_PKEY_CTX_set_params()");
            return Err(Error::new(ErrorKind::OsslError));
        }
        Ok(())
    }

    /// Returns a mutable pointer to the underlying `EVP_PKEY_CTX`.
    pub fn as_mut_ptr(&mut self) -> *mut EVP_PKEY_CTX {
        self.ptr
    }
}

impl Drop for EvpPkeyCtx {
    fn drop(&mut self) {
        unsafe {
            EVP_PKEY_CTX_free(self.ptr);
        }
    }
}

unsafe impl Send for EvpPkeyCtx {}
unsafe impl Sync for EvpPkeyCtx {}

/// Raw RSA key components as big endian unsigned integers
///
/// The private fields are all either present or absent; a key with only
/// `n` and `e` is a public key.
#[derive(Debug, Default)]
pub struct RsaData {
    pub n: Vec<u8>,
    pub e: Vec<u8>,
    pub d: Option<Vec<u8>>,
    pub p: Option<Vec<u8>>,
    pub q: Option<Vec<u8>>,
}

impl Drop for RsaData {
    fn drop(&mut self) {
        use zeroize::Zeroize;
        self.d.zeroize();
        self.p.zeroize();
        self.q.zeroize();
    }
}

/// Progress reporting closure invoked during key generation with the
/// current phase and iteration counter. Returning false aborts the
/// generation.
pub type KeygenCallback<'a> = &'a mut dyn FnMut(i32, i32) -> bool;

unsafe extern "C" fn keygen_progress(ctx: *mut EVP_PKEY_CTX) -> c_int {
    let data = unsafe { EVP_PKEY_CTX_get_app_data(ctx) };
    if data.is_null() {
        return 1;
    }
    let phase = unsafe { EVP_PKEY_CTX_get_keygen_info(ctx, 0) };
    let count = unsafe { EVP_PKEY_CTX_get_keygen_info(ctx, 1) };
    let cb = unsafe { &mut *(data as *mut KeygenCallback) };
    /* never unwind across the C stack */
    match catch_unwind(AssertUnwindSafe(|| (*cb)(phase, count))) {
        Ok(true) => 1,
        _ => 0,
    }
}

/// Wrapper around OpenSSL's `EVP_PKEY`, representing a public or
/// private RSA key. Manages the key's lifecycle.
#[derive(Debug)]
pub struct EvpPkey {
    ptr: *mut EVP_PKEY,
}

impl EvpPkey {
    /// Creates an `EvpPkey` from key material provided via `OSSL_PARAM`s.
    pub fn fromdata(
        ctx: &OsslContext,
        pkey_name: &CStr,
        pkey_type: u32,
        params: &OsslParam,
    ) -> Result<EvpPkey, Error> {
        let mut pctx = EvpPkeyCtx::new(ctx, pkey_name)?;
        let res = unsafe { EVP_PKEY_fromdata_init(pctx.as_mut_ptr()) };
        if res != 1 {
            trace_ossl!("EVP_PKEY_fromdata_init()");
            return Err(Error::new(ErrorKind::OsslError));
        }
        let mut pkey: *mut EVP_PKEY = std::ptr::null_mut();
        let res = unsafe {
            EVP_PKEY_fromdata(
                pctx.as_mut_ptr(),
                &mut pkey,
                c_int::try_from(pkey_type)?,
                params.as_ptr()? as *mut OSSL_PARAM,
            )
        };
        if res != 1 {
            trace_ossl!("EVP_PKEY_fromdata()");
            return Err(Error::new(ErrorKind::OsslError));
        }
        Ok(EvpPkey { ptr: pkey })
    }

    /// Imports an RSA key from its raw components
    pub fn import_rsa(
        ctx: &OsslContext,
        data: &RsaData,
    ) -> Result<EvpPkey, Error> {
        let mut params = OsslParam::with_capacity(5);
        params.zeroize = true;
        params.add_bn(cstr!(OSSL_PKEY_PARAM_RSA_N), &data.n)?;
        params.add_bn(cstr!(OSSL_PKEY_PARAM_RSA_E), &data.e)?;
        let mut pkey_class = EVP_PKEY_PUBLIC_KEY;
        match (&data.d, &data.p, &data.q) {
            (Some(d), Some(p), Some(q)) => {
                params.add_bn(cstr!(OSSL_PKEY_PARAM_RSA_D), d)?;
                /* OpenSSL can compute the CRT values from p and q */
                params.add_bn(cstr!(OSSL_PKEY_PARAM_RSA_FACTOR1), p)?;
                params.add_bn(cstr!(OSSL_PKEY_PARAM_RSA_FACTOR2), q)?;
                pkey_class = EVP_PKEY_KEYPAIR;
            }
            (None, None, None) => (),
            _ => return Err(Error::new(ErrorKind::BadArg)),
        }
        params.finalize();

        EvpPkey::fromdata(ctx, c"RSA", pkey_class, &params)
    }

    /// Exports the RSA components, private ones only if available
    pub fn export_rsa(&self) -> Result<RsaData, Error> {
        let mut data = RsaData {
            n: self.get_bn_param(cstr!(OSSL_PKEY_PARAM_RSA_N))?.to_bigendian()?,
            e: self.get_bn_param(cstr!(OSSL_PKEY_PARAM_RSA_E))?.to_bigendian()?,
            d: None,
            p: None,
            q: None,
        };
        if self.is_private() {
            data.d = Some(
                self.get_bn_param(cstr!(OSSL_PKEY_PARAM_RSA_D))?
                    .to_bigendian()?,
            );
            data.p = Some(
                self.get_bn_param(cstr!(OSSL_PKEY_PARAM_RSA_FACTOR1))?
                    .to_bigendian()?,
            );
            data.q = Some(
                self.get_bn_param(cstr!(OSSL_PKEY_PARAM_RSA_FACTOR2))?
                    .to_bigendian()?,
            );
        }
        Ok(data)
    }

    /// Generates a new RSA key pair of `bits` size with the given public
    /// exponent.
    ///
    /// If a progress callback is provided it is invoked by OpenSSL during
    /// prime generation; when it returns false generation is aborted and
    /// an error is returned.
    pub fn generate_rsa(
        ctx: &OsslContext,
        bits: usize,
        exponent: &BigNum,
        progress: Option<KeygenCallback>,
    ) -> Result<EvpPkey, Error> {
        let mut params = OsslParam::with_capacity(2);
        params.add_bignum(cstr!(OSSL_PKEY_PARAM_RSA_E), exponent)?;
        params.add_uint(
            cstr!(OSSL_PKEY_PARAM_RSA_BITS),
            c_uint::try_from(bits)?,
        )?;
        params.finalize();

        let mut pctx = EvpPkeyCtx::new(ctx, c"RSA")?;
        let res = unsafe { EVP_PKEY_keygen_init(pctx.as_mut_ptr()) };
        if res != 1 {
            trace_ossl!("EVP_PKEY_keygen_init()");
            return Err(Error::new(ErrorKind::OsslError));
        }
        pctx.set_params(&params)?;

        /* must outlive the EVP_PKEY_generate() call below */
        let mut callback: Option<KeygenCallback> = progress;
        if let Some(cb) = callback.as_mut() {
            unsafe {
                EVP_PKEY_CTX_set_app_data(
                    pctx.as_mut_ptr(),
                    cb as *mut KeygenCallback as *mut c_void,
                );
                EVP_PKEY_CTX_set_cb(pctx.as_mut_ptr(), Some(keygen_progress));
            }
        }

        let mut pkey: *mut EVP_PKEY = std::ptr::null_mut();
        let res = unsafe { EVP_PKEY_generate(pctx.as_mut_ptr(), &mut pkey) };
        if callback.is_some() {
            unsafe {
                EVP_PKEY_CTX_set_cb(pctx.as_mut_ptr(), None);
                EVP_PKEY_CTX_set_app_data(
                    pctx.as_mut_ptr(),
                    std::ptr::null_mut(),
                );
            }
        }
        if res != 1 {
            trace_ossl!("EVP_PKEY_generate()");
            return Err(Error::new(ErrorKind::OsslError));
        }
        Ok(EvpPkey { ptr: pkey })
    }

    /// Fetches a big number parameter from the key
    pub fn get_bn_param(&self, name: &CStr) -> Result<BigNum, Error> {
        let mut bn: *mut BIGNUM = std::ptr::null_mut();
        let ret =
            unsafe { EVP_PKEY_get_bn_param(self.ptr, name.as_ptr(), &mut bn) };
        if ret != 1 {
            trace_ossl!("EVP_PKEY_get_bn_param()");
            return Err(Error::new(ErrorKind::OsslError));
        }
        unsafe { BigNum::from_ptr(bn) }
    }

    /// Whether the key carries private material
    pub fn is_private(&self) -> bool {
        let mut bn: *mut BIGNUM = std::ptr::null_mut();
        let ret = unsafe {
            EVP_PKEY_get_bn_param(
                self.ptr,
                cstr!(OSSL_PKEY_PARAM_RSA_D).as_ptr(),
                &mut bn,
            )
        };
        if ret != 1 {
            /* a missing parameter queues an error we do not care about */
            unsafe { ERR_clear_error() };
            return false;
        }
        unsafe { BN_clear_free(bn) };
        true
    }

    /// Creates a new `EvpPkeyCtx` associated with this `EvpPkey`.
    ///
    /// Used to prepare for operations using this specific key.
    pub fn new_ctx(&mut self, ctx: &OsslContext) -> Result<EvpPkeyCtx, Error> {
        /* this function takes care of checking for NULL */
        unsafe {
            EvpPkeyCtx::from_ptr(
                /* this function will use refcounting to keep EVP_PKEY
                 * alive for the lifetime of the context, so it is ok
                 * to not use rust lifetimes here */
                EVP_PKEY_CTX_new_from_pkey(
                    ctx.ptr(),
                    self.as_mut_ptr(),
                    std::ptr::null_mut(),
                ),
            )
        }
    }

    /// Returns a const pointer to the underlying `EVP_PKEY`.
    pub fn as_ptr(&self) -> *const EVP_PKEY {
        self.ptr
    }

    /// Returns a mutable pointer to the underlying `EVP_PKEY`.
    pub fn as_mut_ptr(&mut self) -> *mut EVP_PKEY {
        self.ptr
    }

    /// Gets the key size in bits.
    pub fn get_bits(&self) -> Result<usize, Error> {
        let ret = unsafe { EVP_PKEY_get_bits(self.ptr) };
        if ret == 0 {
            trace_ossl!("EVP_PKEY_get_bits()");
            return Err(Error::new(ErrorKind::OsslError));
        }
        Ok(usize::try_from(ret)?)
    }

    /// Gets the maximum signature size in bytes
    pub fn get_size(&self) -> Result<usize, Error> {
        Ok(usize::try_from(unsafe { EVP_PKEY_get_size(self.as_ptr()) })?)
    }

    /// Takes an additional reference on the same key
    pub fn try_clone(&self) -> Result<EvpPkey, Error> {
        if unsafe { EVP_PKEY_up_ref(self.ptr) } != 1 {
            trace_ossl!("EVP_PKEY_up_ref()");
            return Err(Error::new(ErrorKind::OsslError));
        }
        Ok(EvpPkey { ptr: self.ptr })
    }
}

impl Drop for EvpPkey {
    fn drop(&mut self) {
        unsafe {
            EVP_PKEY_free(self.ptr);
        }
    }
}

unsafe impl Send for EvpPkey {}
unsafe impl Sync for EvpPkey {}
