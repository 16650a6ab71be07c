// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

use std::str::FromStr;

use crate::error::ErrorKind;
use crate::hash::HashAlg;

use serial_test::parallel;

#[test]
#[parallel]
fn test_hash_descriptors() {
    assert_eq!(HashAlg::Sha1.size(), 20);
    assert_eq!(HashAlg::Sha256.size(), 32);
    assert_eq!(HashAlg::Sha384.size(), 48);
    assert_eq!(HashAlg::Sha512_256.size(), 32);
    assert_eq!(HashAlg::Sha3_512.size(), 64);
    assert_eq!(HashAlg::Sha256.block_size(), 64);
    assert_eq!(HashAlg::Sha512.block_size(), 128);
    assert_eq!(HashAlg::Sha3_256.block_size(), 136);
    assert_eq!(HashAlg::Sha512_224.name(), "SHA512-224");
    assert_eq!(format!("{}", HashAlg::Sha3_384), "SHA3-384");
}

#[test]
#[parallel]
fn test_hash_parse() {
    assert_eq!(HashAlg::from_str("sha256").unwrap(), HashAlg::Sha256);
    assert_eq!(HashAlg::from_str("SHA3-224").unwrap(), HashAlg::Sha3_224);
    assert_eq!(
        HashAlg::from_str("md5").unwrap_err().kind(),
        ErrorKind::InvalidInput
    );
}

#[test]
#[parallel]
fn test_hash_sha256_abc() {
    let expected = hex::decode(
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad",
    )
    .unwrap();
    assert_eq!(super::sha256(b"abc"), expected);

    #[cfg(feature = "native")]
    assert_eq!(
        super::native_backend()
            .hash(HashAlg::Sha256, b"abc")
            .unwrap(),
        expected
    );
}

#[cfg(feature = "native")]
#[test]
#[parallel]
fn test_hash_native_sha3_rejected() {
    let err = super::native_backend()
        .hash(HashAlg::Sha3_256, b"abc")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConfigurationRejected);
}

#[cfg(all(feature = "openssl", feature = "native"))]
#[test]
#[parallel]
fn test_hash_backends_agree() {
    let data = b"The quick brown fox jumps over the lazy dog";
    for alg in [
        HashAlg::Sha224,
        HashAlg::Sha256,
        HashAlg::Sha384,
        HashAlg::Sha512,
        HashAlg::Sha512_224,
        HashAlg::Sha512_256,
    ] {
        let a = super::ossl_backend().hash(alg, data).unwrap();
        let b = super::native_backend().hash(alg, data).unwrap();
        assert_eq!(a.len(), alg.size());
        assert_eq!(a, b, "{} mismatch", alg);
    }
}
