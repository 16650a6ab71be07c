// Copyright 2023 Simo Sorce
// See LICENSE.txt file for terms

//! Digest descriptors shared by every backend

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, ErrorKind, Result};

/// Identifies a hash function, used both as the signed message digest
/// and as the PSS mask generation digest
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum HashAlg {
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
    Sha512_224,
    Sha512_256,
    Sha3_224,
    Sha3_256,
    Sha3_384,
    Sha3_512,
}

#[derive(Debug)]
pub struct HashInfo {
    pub alg: HashAlg,
    pub name: &'static str,
    pub hash_size: usize,
    pub block_size: usize,
}

pub static HASH_SET: [HashInfo; 11] = [
    HashInfo {
        alg: HashAlg::Sha1,
        name: "SHA1",
        hash_size: 20,
        block_size: 64,
    },
    HashInfo {
        alg: HashAlg::Sha224,
        name: "SHA224",
        hash_size: 28,
        block_size: 64,
    },
    HashInfo {
        alg: HashAlg::Sha256,
        name: "SHA256",
        hash_size: 32,
        block_size: 64,
    },
    HashInfo {
        alg: HashAlg::Sha384,
        name: "SHA384",
        hash_size: 48,
        block_size: 128,
    },
    HashInfo {
        alg: HashAlg::Sha512,
        name: "SHA512",
        hash_size: 64,
        block_size: 128,
    },
    HashInfo {
        alg: HashAlg::Sha512_224,
        name: "SHA512-224",
        hash_size: 28,
        block_size: 128,
    },
    HashInfo {
        alg: HashAlg::Sha512_256,
        name: "SHA512-256",
        hash_size: 32,
        block_size: 128,
    },
    HashInfo {
        alg: HashAlg::Sha3_224,
        name: "SHA3-224",
        hash_size: 28,
        block_size: 144,
    },
    HashInfo {
        alg: HashAlg::Sha3_256,
        name: "SHA3-256",
        hash_size: 32,
        block_size: 136,
    },
    HashInfo {
        alg: HashAlg::Sha3_384,
        name: "SHA3-384",
        hash_size: 48,
        block_size: 104,
    },
    HashInfo {
        alg: HashAlg::Sha3_512,
        name: "SHA3-512",
        hash_size: 64,
        block_size: 72,
    },
];

impl HashAlg {
    fn info(self) -> &'static HashInfo {
        /* the table is indexed in declaration order */
        &HASH_SET[self as usize]
    }

    /// Output length in bytes
    pub fn size(self) -> usize {
        self.info().hash_size
    }

    /// Input block length in bytes
    pub fn block_size(self) -> usize {
        self.info().block_size
    }

    pub fn name(self) -> &'static str {
        self.info().name
    }
}

impl fmt::Display for HashAlg {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for HashAlg {
    type Err = Error;

    fn from_str(s: &str) -> Result<HashAlg> {
        for h in &HASH_SET {
            if h.name.eq_ignore_ascii_case(s) {
                return Ok(h.alg);
            }
        }
        Err(Error::with_errmsg(
            ErrorKind::InvalidInput,
            format!("unknown hash algorithm {}", s),
        ))
    }
}
