// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

//! RSA-PSS operation sequencing, common to all backends.
//!
//! Each operation creates a fresh context, applies the configuration
//! steps in [`PssStep::ORDER`], executes, and drops the context on the
//! way out. The first failing step aborts the operation; the context is
//! released by `Drop` on every path.

use crate::error::{Error, ErrorKind, Result};
use crate::provider::{PssContext, PssParams, PssStep, RsaProvider, SigOp};

use zeroize::Zeroizing;

#[cfg(feature = "log")]
use log::debug;

/// Applies one configuration step to a context
pub fn apply_step<C: PssContext>(
    ctx: &mut C,
    step: PssStep,
    params: &PssParams,
) -> Result<()> {
    match step {
        PssStep::Padding => ctx.set_padding_pss(),
        PssStep::SaltLength => ctx.set_salt_length(params.salt),
        PssStep::Digest => ctx.set_digest(params.digest),
        PssStep::Mgf1Digest => ctx.set_mgf1_digest(params.mgf1),
    }
}

fn configure<C: PssContext>(ctx: &mut C, params: &PssParams) -> Result<()> {
    for step in PssStep::ORDER {
        if let Err(e) = apply_step(ctx, step, params) {
            #[cfg(feature = "log")]
            debug!("PSS configuration step {:?} failed: {}", step, e);
            return Err(e);
        }
    }
    Ok(())
}

fn check_digest(digest: &[u8], params: &PssParams) -> Result<()> {
    if digest.len() != params.digest.size() {
        return Err(Error::with_errmsg(
            ErrorKind::InvalidInput,
            format!(
                "{} digest must be {} bytes, got {}",
                params.digest,
                params.digest.size(),
                digest.len()
            ),
        ));
    }
    Ok(())
}

/// Signs a precomputed digest.
///
/// With `out` set to None only the signature length is computed and
/// returned. Otherwise the signature is written to the start of `out`
/// and its length returned; on any failure `out` is left untouched.
pub fn sign_pss<P: RsaProvider>(
    provider: &P,
    key: &P::Key,
    digest: &[u8],
    params: &PssParams,
    out: Option<&mut [u8]>,
) -> Result<usize> {
    check_digest(digest, params)?;

    let mut ctx = provider.pss_context(key, SigOp::Sign)?;
    configure(&mut ctx, params)?;

    let siglen = ctx.sign(digest, None)?;
    let out = match out {
        Some(o) => o,
        None => return Ok(siglen),
    };
    if siglen > out.len() {
        return Err(Error::buffer_too_small(siglen));
    }

    /* never expose a partially written signature */
    let mut scratch = Zeroizing::new(vec![0u8; siglen]);
    let len = ctx.sign(digest, Some(scratch.as_mut_slice()))?;
    if len > siglen {
        return Err(Error::new(ErrorKind::ProviderFailure));
    }
    out[..len].copy_from_slice(&scratch[..len]);
    Ok(len)
}

/// Signs a precomputed digest into a newly allocated buffer of the
/// exact signature length
pub fn sign_pss_to_vec<P: RsaProvider>(
    provider: &P,
    key: &P::Key,
    digest: &[u8],
    params: &PssParams,
) -> Result<Vec<u8>> {
    check_digest(digest, params)?;

    let mut ctx = provider.pss_context(key, SigOp::Sign)?;
    configure(&mut ctx, params)?;

    let siglen = ctx.sign(digest, None)?;
    let mut signature = vec![0u8; siglen];
    let len = ctx.sign(digest, Some(signature.as_mut_slice()))?;
    signature.truncate(len);
    Ok(signature)
}

/// Checks a signature over a precomputed digest.
///
/// Only acceptance or rejection is reported; any failure, including
/// invalid parameters, is a rejection.
pub fn verify_pss<P: RsaProvider>(
    provider: &P,
    key: &P::Key,
    digest: &[u8],
    params: &PssParams,
    signature: &[u8],
) -> bool {
    let result = (|| -> Result<bool> {
        check_digest(digest, params)?;
        let mut ctx = provider.pss_context(key, SigOp::Verify)?;
        configure(&mut ctx, params)?;
        ctx.verify(digest, signature)
    })();
    matches!(result, Ok(true))
}
