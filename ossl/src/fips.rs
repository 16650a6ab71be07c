// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

//! This module implements support for running operations through the
//! OpenSSL FIPS provider only.
//!
//! A dedicated library context is created, the fips and base providers
//! are loaded in it and the "fips=yes" default property is set, so any
//! algorithm fetched through the context is served by the validated
//! module or fails.

use std::ffi::CStr;

use crate::bindings::*;
use crate::{trace_ossl, Error, ErrorKind, OsslContext};

const FIPS_PROVIDER: &CStr = c"fips";
const BASE_PROVIDER: &CStr = c"base";

/// Checks whether the FIPS provider is installed and configured so that
/// it can be loaded
pub fn fips_available() -> bool {
    let Ok(mut ctx) = OsslContext::new_lib_ctx() else {
        return false;
    };
    ctx.load_provider(FIPS_PROVIDER).is_ok()
}

impl OsslContext {
    /// Creates a library context restricted to the FIPS provider
    pub fn new_fips_ctx() -> Result<OsslContext, Error> {
        let mut ctx = OsslContext::new_lib_ctx()?;
        ctx.load_provider(FIPS_PROVIDER)?;
        /* base provides encoders/decoders but no algorithms */
        ctx.load_provider(BASE_PROVIDER)?;
        let ret = unsafe { EVP_default_properties_enable_fips(ctx.ptr(), 1) };
        if ret != 1 {
            trace_ossl!("EVP_default_properties_enable_fips()");
            return Err(Error::new(ErrorKind::OsslError));
        }
        Ok(ctx)
    }

    /// Reports whether fetches in this context default to "fips=yes"
    pub fn is_fips_enabled(&self) -> bool {
        unsafe { EVP_default_properties_is_fips_enabled(self.ptr()) == 1 }
    }
}
