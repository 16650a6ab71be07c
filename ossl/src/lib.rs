// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

//! This crate provides thin, owning wrappers around the subset of the
//! OpenSSL libcrypto (3.x) API needed to generate RSA keys and to compute
//! and check RSA-PSS signatures over precomputed digests.
//!
//! Every raw OpenSSL object is held by a Rust type that frees it on drop,
//! so early returns on any error path never leak libcrypto resources.

use std::ffi::{c_char, c_int, c_uint, c_void, CStr};

use zeroize::Zeroize;

pub mod bindings {
    #![allow(non_upper_case_globals)]
    #![allow(non_camel_case_types)]
    #![allow(non_snake_case)]
    #![allow(dead_code)]
    #![allow(improper_ctypes)]
    include!(concat!(env!("OUT_DIR"), "/ossl_bindings.rs"));
}

use bindings::*;

pub mod digest;
pub mod fips;
pub mod pkey;
pub mod signature;

#[cfg(test)]
mod tests;

/// Converts a NUL terminated byte string constant generated by bindgen
/// into a `&CStr`
#[macro_export]
macro_rules! cstr {
    ($name:expr) => {
        unsafe { ::std::ffi::CStr::from_bytes_with_nul_unchecked($name) }
    };
}

/// Reports a failed libcrypto call and drains the thread error queue
#[macro_export]
macro_rules! trace_ossl {
    ($name:expr) => {
        $crate::drain_error_queue($name, file!(), line!())
    };
}

#[doc(hidden)]
#[allow(unused_variables)]
pub fn drain_error_queue(func: &str, file: &str, line: u32) {
    cfg_if::cfg_if! {
        if #[cfg(feature = "log")] {
            use log::error;

            error!("{}:{}: {} failed", file, line, func);
            loop {
                let mut buf = [0u8; 256];
                let code = unsafe {
                    ERR_get_error_all(
                        std::ptr::null_mut(),
                        std::ptr::null_mut(),
                        std::ptr::null_mut(),
                        std::ptr::null_mut(),
                        std::ptr::null_mut(),
                    )
                };
                if code == 0 {
                    break;
                }
                unsafe {
                    ERR_error_string_n(
                        code,
                        buf.as_mut_ptr() as *mut c_char,
                        buf.len(),
                    );
                }
                let msg = CStr::from_bytes_until_nul(&buf)
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                error!("  {}", msg);
            }
        } else {
            unsafe { ERR_clear_error() };
        }
    }
}

/// Classes of failures reported by this crate
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// OpenSSL returned a NULL object
    NullPtr,
    /// An OpenSSL call returned a failure code
    OsslError,
    /// The wrapper was used incorrectly
    WrapperError,
    /// An output buffer is too small
    BufferSize,
    /// An argument is out of range
    BadArg,
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    origin: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Error {
        Error {
            kind: kind,
            origin: None,
        }
    }

    pub fn wrap<E>(kind: ErrorKind, error: E) -> Error
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Error {
            kind: kind,
            origin: Some(error.into()),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.origin {
            Some(e) => write!(f, "{:?}: {}", self.kind, e),
            None => write!(f, "{:?}", self.kind),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.origin {
            Some(e) => Some(e.as_ref()),
            None => None,
        }
    }
}

impl From<std::num::TryFromIntError> for Error {
    fn from(error: std::num::TryFromIntError) -> Error {
        Error::wrap(ErrorKind::BadArg, error)
    }
}

/// Wrapper around OpenSSL's `OSSL_LIB_CTX`
///
/// All algorithm fetches go through a library context, which determines
/// which providers (default, fips, ...) serve the request.
#[derive(Debug)]
pub struct OsslContext {
    context: *mut OSSL_LIB_CTX,
    providers: Vec<OsslProvider>,
}

impl OsslContext {
    /// Creates a fresh library context; the default provider is loaded
    /// automatically on first use.
    pub fn new_lib_ctx() -> Result<OsslContext, Error> {
        let ptr = unsafe { OSSL_LIB_CTX_new() };
        if ptr.is_null() {
            trace_ossl!("OSSL_LIB_CTX_new()");
            return Err(Error::new(ErrorKind::NullPtr));
        }
        Ok(OsslContext {
            context: ptr,
            providers: Vec::new(),
        })
    }

    /// Loads the named provider in this context. The provider stays loaded
    /// for as long as the context lives.
    pub fn load_provider(&mut self, name: &CStr) -> Result<(), Error> {
        let ptr = unsafe { OSSL_PROVIDER_load(self.context, name.as_ptr()) };
        if ptr.is_null() {
            trace_ossl!("OSSL_PROVIDER_load()");
            return Err(Error::new(ErrorKind::NullPtr));
        }
        self.providers.push(OsslProvider { ptr: ptr });
        Ok(())
    }

    pub fn ptr(&self) -> *mut OSSL_LIB_CTX {
        self.context
    }
}

impl Drop for OsslContext {
    fn drop(&mut self) {
        /* providers must be unloaded before the context goes away */
        self.providers.clear();
        unsafe {
            OSSL_LIB_CTX_free(self.context);
        }
    }
}

unsafe impl Send for OsslContext {}
unsafe impl Sync for OsslContext {}

/// A provider loaded in an `OsslContext`
#[derive(Debug)]
struct OsslProvider {
    ptr: *mut OSSL_PROVIDER,
}

impl Drop for OsslProvider {
    fn drop(&mut self) {
        unsafe {
            OSSL_PROVIDER_unload(self.ptr);
        }
    }
}

/// Wrapper around OpenSSL's `BIGNUM`
#[derive(Debug)]
pub struct BigNum {
    ptr: *mut BIGNUM,
}

impl BigNum {
    /// Allocates a new zero valued BigNum
    pub fn new() -> Result<BigNum, Error> {
        let ptr = unsafe { BN_new() };
        if ptr.is_null() {
            trace_ossl!("BN_new()");
            return Err(Error::new(ErrorKind::NullPtr));
        }
        Ok(BigNum { ptr: ptr })
    }

    /// Takes ownership of a BIGNUM allocated by OpenSSL
    pub unsafe fn from_ptr(ptr: *mut BIGNUM) -> Result<BigNum, Error> {
        if ptr.is_null() {
            return Err(Error::new(ErrorKind::NullPtr));
        }
        Ok(BigNum { ptr: ptr })
    }

    /// Creates a BigNum from a big endian unsigned integer
    pub fn from_bigendian(v: &[u8]) -> Result<BigNum, Error> {
        let ptr = unsafe {
            BN_bin2bn(v.as_ptr(), c_int::try_from(v.len())?, std::ptr::null_mut())
        };
        if ptr.is_null() {
            trace_ossl!("BN_bin2bn()");
            return Err(Error::new(ErrorKind::NullPtr));
        }
        Ok(BigNum { ptr: ptr })
    }

    /// Sets the value to a single machine word
    pub fn set_word(&mut self, word: u32) -> Result<(), Error> {
        if unsafe { BN_set_word(self.ptr, word.into()) } != 1 {
            trace_ossl!("BN_set_word()");
            return Err(Error::new(ErrorKind::OsslError));
        }
        Ok(())
    }

    pub fn num_bits(&self) -> usize {
        usize::try_from(unsafe { BN_num_bits(self.ptr) }).unwrap_or(0)
    }

    pub fn num_bytes(&self) -> usize {
        (self.num_bits() + 7) / 8
    }

    /// Returns the minimal big endian encoding of the number
    pub fn to_bigendian(&self) -> Result<Vec<u8>, Error> {
        let len = self.num_bytes();
        let mut v = vec![0u8; len];
        let ret = unsafe { BN_bn2bin(self.ptr, v.as_mut_ptr()) };
        if usize::try_from(ret)? != len {
            trace_ossl!("BN_bn2bin()");
            return Err(Error::new(ErrorKind::OsslError));
        }
        Ok(v)
    }

    pub fn as_ptr(&self) -> *const BIGNUM {
        self.ptr
    }
}

impl Drop for BigNum {
    fn drop(&mut self) {
        unsafe {
            BN_clear_free(self.ptr);
        }
    }
}

unsafe impl Send for BigNum {}
unsafe impl Sync for BigNum {}

/// An owned `OSSL_PARAM` array
///
/// Values added to the array are copied into buffers owned by this
/// structure, so the array can outlive the data it was built from.
/// Once all values are added `finalize()` must be called to terminate
/// the array before it can be handed to OpenSSL.
#[derive(Debug)]
pub struct OsslParam {
    v: Vec<Vec<u8>>,
    i: Vec<Box<c_int>>,
    u: Vec<Box<c_uint>>,
    p: Vec<OSSL_PARAM>,
    finalized: bool,
    pub zeroize: bool,
}

impl Drop for OsslParam {
    fn drop(&mut self) {
        if self.zeroize {
            while let Some(mut vec) = self.v.pop() {
                vec.zeroize();
            }
        }
    }
}

impl OsslParam {
    pub fn with_capacity(capacity: usize) -> OsslParam {
        OsslParam {
            v: Vec::new(),
            i: Vec::new(),
            u: Vec::new(),
            p: Vec::with_capacity(capacity + 1),
            finalized: false,
            zeroize: false,
        }
    }

    fn check_open(&self) -> Result<(), Error> {
        if self.finalized {
            return Err(Error::new(ErrorKind::WrapperError));
        }
        Ok(())
    }

    /// Adds a big endian unsigned integer as a BIGNUM parameter
    pub fn add_bn(&mut self, key: &'static CStr, v: &[u8]) -> Result<(), Error> {
        let bn = BigNum::from_bigendian(v)?;
        self.add_bignum(key, &bn)
    }

    /// Adds a copy of a BigNum as a parameter
    pub fn add_bignum(
        &mut self,
        key: &'static CStr,
        bn: &BigNum,
    ) -> Result<(), Error> {
        self.check_open()?;

        let mut param = unsafe {
            OSSL_PARAM_construct_BN(key.as_ptr(), std::ptr::null_mut(), 0)
        };
        /* calculate needed size */
        if unsafe { OSSL_PARAM_set_BN(&mut param, bn.as_ptr()) } != 1 {
            trace_ossl!("OSSL_PARAM_set_BN()");
            return Err(Error::new(ErrorKind::OsslError));
        }
        let mut container = vec![0u8; param.return_size];
        param.data = container.as_mut_ptr() as *mut c_void;
        param.data_size = container.len();
        if unsafe { OSSL_PARAM_set_BN(&mut param, bn.as_ptr()) } != 1 {
            trace_ossl!("OSSL_PARAM_set_BN()");
            return Err(Error::new(ErrorKind::OsslError));
        }
        self.v.push(container);
        self.p.push(param);
        Ok(())
    }

    pub fn add_int(&mut self, key: &'static CStr, val: c_int) -> Result<(), Error> {
        self.check_open()?;

        let mut container = Box::new(val);
        let param = unsafe {
            OSSL_PARAM_construct_int(key.as_ptr(), container.as_mut())
        };
        self.i.push(container);
        self.p.push(param);
        Ok(())
    }

    pub fn add_uint(
        &mut self,
        key: &'static CStr,
        val: c_uint,
    ) -> Result<(), Error> {
        self.check_open()?;

        let mut container = Box::new(val);
        let param = unsafe {
            OSSL_PARAM_construct_uint(key.as_ptr(), container.as_mut())
        };
        self.u.push(container);
        self.p.push(param);
        Ok(())
    }

    /// Adds a static string, no copy is necessary
    pub fn add_const_c_string(
        &mut self,
        key: &'static CStr,
        val: &'static CStr,
    ) -> Result<(), Error> {
        self.check_open()?;

        let param = unsafe {
            OSSL_PARAM_construct_utf8_string(
                key.as_ptr(),
                val.as_ptr() as *mut c_char,
                0,
            )
        };
        self.p.push(param);
        Ok(())
    }

    /// Terminates the array, no more parameters can be added after this
    pub fn finalize(&mut self) {
        if self.finalized {
            return;
        }
        self.p.push(unsafe { OSSL_PARAM_construct_end() });
        self.finalized = true;
    }

    pub fn as_ptr(&self) -> Result<*const OSSL_PARAM, Error> {
        if !self.finalized {
            return Err(Error::new(ErrorKind::WrapperError));
        }
        Ok(self.p.as_ptr())
    }
}

unsafe impl Send for OsslParam {}
unsafe impl Sync for OsslParam {}
