// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

//! Digest algorithms as OpenSSL names them in signature parameters, and
//! a single call hash computed by the providers of a library context.

use std::ffi::{c_uint, c_void, CStr};

use crate::bindings::*;

use crate::{cstr, trace_ossl, Error, ErrorKind, OsslContext};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DigestAlg {
    Sha1,
    Sha2_224,
    Sha2_256,
    Sha2_384,
    Sha2_512,
    Sha2_512_224,
    Sha2_512_256,
    Sha3_224,
    Sha3_256,
    Sha3_384,
    Sha3_512,
}

impl DigestAlg {
    /// The name providers register the algorithm under
    pub fn name(self) -> &'static CStr {
        match self {
            DigestAlg::Sha1 => cstr!(OSSL_DIGEST_NAME_SHA1),
            DigestAlg::Sha2_224 => cstr!(OSSL_DIGEST_NAME_SHA2_224),
            DigestAlg::Sha2_256 => cstr!(OSSL_DIGEST_NAME_SHA2_256),
            DigestAlg::Sha2_384 => cstr!(OSSL_DIGEST_NAME_SHA2_384),
            DigestAlg::Sha2_512 => cstr!(OSSL_DIGEST_NAME_SHA2_512),
            DigestAlg::Sha2_512_224 => cstr!(OSSL_DIGEST_NAME_SHA2_512_224),
            DigestAlg::Sha2_512_256 => cstr!(OSSL_DIGEST_NAME_SHA2_512_256),
            DigestAlg::Sha3_224 => cstr!(OSSL_DIGEST_NAME_SHA3_224),
            DigestAlg::Sha3_256 => cstr!(OSSL_DIGEST_NAME_SHA3_256),
            DigestAlg::Sha3_384 => cstr!(OSSL_DIGEST_NAME_SHA3_384),
            DigestAlg::Sha3_512 => cstr!(OSSL_DIGEST_NAME_SHA3_512),
        }
    }
}

/* An implementation fetched from a library context, freed on drop */
struct FetchedMd {
    ptr: *mut EVP_MD,
}

impl FetchedMd {
    fn fetch(ctx: &OsslContext, alg: DigestAlg) -> Result<FetchedMd, Error> {
        let ptr = unsafe {
            EVP_MD_fetch(ctx.ptr(), alg.name().as_ptr(), std::ptr::null())
        };
        if ptr.is_null() {
            trace_ossl!("EVP_MD_fetch()");
            return Err(Error::new(ErrorKind::NullPtr));
        }
        Ok(FetchedMd { ptr })
    }
}

impl Drop for FetchedMd {
    fn drop(&mut self) {
        unsafe {
            EVP_MD_free(self.ptr);
        }
    }
}

/// Hashes `data` with the implementation of `alg` found in `ctx`.
///
/// Fails with `NullPtr` when none of the loaded providers offers the
/// algorithm, as the FIPS provider does for some of them.
pub fn digest(
    ctx: &OsslContext,
    alg: DigestAlg,
    data: &[u8],
) -> Result<Vec<u8>, Error> {
    let md = FetchedMd::fetch(ctx, alg)?;
    let size = usize::try_from(unsafe { EVP_MD_get_size(md.ptr) })?;
    let mut out = vec![0u8; size];
    let mut outlen: c_uint = 0;
    let ret = unsafe {
        EVP_Digest(
            data.as_ptr() as *const c_void,
            data.len(),
            out.as_mut_ptr(),
            &mut outlen,
            md.ptr,
            std::ptr::null_mut(),
        )
    };
    if ret != 1 {
        trace_ossl!("EVP_Digest()");
        return Err(Error::new(ErrorKind::OsslError));
    }
    out.truncate(usize::try_from(outlen)?);
    Ok(out)
}
