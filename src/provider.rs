// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

//! The uniform RSA contract every backend implements.
//!
//! A backend provides key handles and single use PSS contexts; the
//! sequencing of an operation (configuration order, size query, capacity
//! check, cleanup) lives in [`crate::pss`] and is shared by all of them.

use crate::error::Result;
use crate::hash::HashAlg;

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Direction of a PSS context
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SigOp {
    Sign,
    Verify,
}

/// PSS salt length selector
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SaltLength {
    /// As long as the digest output
    Digest,
    /// The largest salt the key and digest permit
    Max,
    /// Recovered from the signature on verification, `Max` on signing
    Auto,
    /// Explicit length in bytes
    Bytes(usize),
}

/// The parameters of a PSS signature
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PssParams {
    /// Algorithm the signed digest was computed with
    pub digest: HashAlg,
    /// MGF1 mask generation digest
    pub mgf1: HashAlg,
    pub salt: SaltLength,
}

impl PssParams {
    /// Parameters using the same digest for the message and for MGF1
    pub fn new(digest: HashAlg, salt: SaltLength) -> PssParams {
        PssParams {
            digest: digest,
            mgf1: digest,
            salt: salt,
        }
    }

    pub fn with_mgf1(mut self, mgf1: HashAlg) -> PssParams {
        self.mgf1 = mgf1;
        self
    }
}

/// A single configuration step of a PSS context
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PssStep {
    Padding,
    SaltLength,
    Digest,
    Mgf1Digest,
}

impl PssStep {
    /// The order in which steps are applied to a context
    pub const ORDER: [PssStep; 4] = [
        PssStep::Padding,
        PssStep::SaltLength,
        PssStep::Digest,
        PssStep::Mgf1Digest,
    ];
}

/// Public RSA key parts as big endian unsigned integers
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RsaPublicComponents {
    pub n: Vec<u8>,
    pub e: Vec<u8>,
}

/// Private RSA key parts as big endian unsigned integers, wiped on drop
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct RsaPrivateComponents {
    pub n: Vec<u8>,
    pub e: Vec<u8>,
    pub d: Vec<u8>,
    pub p: Vec<u8>,
    pub q: Vec<u8>,
}

impl RsaPrivateComponents {
    pub fn public(&self) -> RsaPublicComponents {
        RsaPublicComponents {
            n: self.n.clone(),
            e: self.e.clone(),
        }
    }
}

impl std::fmt::Debug for RsaPrivateComponents {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("RsaPrivateComponents")
            .field("n", &self.n)
            .field("e", &self.e)
            .finish_non_exhaustive()
    }
}

/// Key generation progress callback, receives the phase and iteration
/// counter reported by the backend. Returning false aborts generation.
pub type KeygenProgress<'a> = &'a mut dyn FnMut(i32, i32) -> bool;

/// A transient signing or verification context.
///
/// Contexts are created for a single operation and released when
/// dropped; they are never reused.
pub trait PssContext {
    fn set_padding_pss(&mut self) -> Result<()>;
    fn set_salt_length(&mut self, salt: SaltLength) -> Result<()>;
    fn set_digest(&mut self, alg: HashAlg) -> Result<()>;
    fn set_mgf1_digest(&mut self, alg: HashAlg) -> Result<()>;

    /// Signs `digest`; with no output only the signature length is
    /// returned, otherwise the signature is written to `out` which must
    /// be large enough.
    fn sign(&mut self, digest: &[u8], out: Option<&mut [u8]>) -> Result<usize>;

    /// Ok(false) means the signature does not match, errors mean the
    /// check could not be performed.
    fn verify(&mut self, digest: &[u8], signature: &[u8]) -> Result<bool>;
}

/// An RSA key owned by a backend
pub trait RsaKeyHandle {
    /// Modulus size in bits
    fn bits(&self) -> usize;
    /// Modulus size in bytes, which is also the signature size
    fn size(&self) -> usize;
    fn public_components(&self) -> Result<RsaPublicComponents>;
    fn is_private(&self) -> bool;
}

/// A backend able to generate RSA keys and run PSS operations
pub trait RsaProvider {
    type Key: RsaKeyHandle;
    type Context<'a>: PssContext
    where
        Self: 'a;

    fn name(&self) -> &'static str;

    /// Whether operations run inside a certified (FIPS) module
    fn is_certified(&self) -> bool;

    fn hash(&self, alg: HashAlg, data: &[u8]) -> Result<Vec<u8>>;

    /// Generates a key pair with the public exponent fixed to 65537
    fn generate_fips_key(
        &self,
        bits: usize,
        progress: Option<KeygenProgress>,
    ) -> Result<Self::Key>;

    fn import_public_key(
        &self,
        components: &RsaPublicComponents,
    ) -> Result<Self::Key>;

    fn import_private_key(
        &self,
        components: &RsaPrivateComponents,
    ) -> Result<Self::Key>;

    fn export_private_key(&self, key: &Self::Key)
        -> Result<RsaPrivateComponents>;

    /// Creates a fresh, unconfigured context for one operation
    fn pss_context<'a>(
        &'a self,
        key: &'a Self::Key,
        op: SigOp,
    ) -> Result<Self::Context<'a>>;
}
