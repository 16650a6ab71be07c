// Copyright 2024 Simo Sorce
// See LICENSE.txt file for terms

use crate::error::ErrorKind;
use crate::hash::HashAlg;
use crate::native::NativeRsaProvider;
use crate::provider::*;
use crate::pss::{sign_pss, verify_pss};

use super::{sha256, test_key_components};

use serial_test::parallel;

#[test]
#[parallel]
fn test_native_import_export() {
    let provider = NativeRsaProvider::new();
    let key = provider.import_private_key(test_key_components()).unwrap();
    assert_eq!(key.bits(), 2048);
    assert_eq!(key.size(), 256);
    assert!(key.is_private());

    let exported = provider.export_private_key(&key).unwrap();
    assert_eq!(exported.n, test_key_components().n);
    assert_eq!(exported.d, test_key_components().d);
    assert_eq!(key.public_components().unwrap(), exported.public());

    /* inconsistent private parts */
    let mut bad = test_key_components().clone();
    bad.d[10] ^= 0x01;
    let err = provider.import_private_key(&bad).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[test]
#[parallel]
fn test_native_small_key_refused() {
    let provider = NativeRsaProvider::new();
    let err = provider.generate_fips_key(1024, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[test]
#[parallel]
fn test_native_configuration_rejected() {
    let provider = NativeRsaProvider::new();
    let key = provider.import_private_key(test_key_components()).unwrap();
    let digest = sha256(b"native");
    let mut out = vec![0u8; 256];

    /* steps out of order */
    let mut ctx = provider.pss_context(&key, SigOp::Sign).unwrap();
    let err = ctx.set_salt_length(SaltLength::Digest).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConfigurationRejected);
    let err = ctx.sign(&digest, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConfigurationRejected);

    /* MGF1 with a different digest */
    let params = PssParams::new(HashAlg::Sha256, SaltLength::Digest)
        .with_mgf1(HashAlg::Sha384);
    let err = sign_pss(&provider, &key, &digest, &params, Some(&mut out))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConfigurationRejected);

    /* digests outside of SHA-2 */
    let params = PssParams::new(HashAlg::Sha3_256, SaltLength::Digest);
    let err = sign_pss(&provider, &key, &digest, &params, Some(&mut out))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConfigurationRejected);
    assert!(out.iter().all(|b| *b == 0));

    /* salt recovery on verification */
    let params = PssParams::new(HashAlg::Sha256, SaltLength::Max);
    let sig = crate::pss::sign_pss_to_vec(&provider, &key, &digest, &params)
        .unwrap();
    assert!(verify_pss(&provider, &key, &digest, &params, &sig));
    let params = PssParams::new(HashAlg::Sha256, SaltLength::Auto);
    assert!(!verify_pss(&provider, &key, &digest, &params, &sig));
}

#[test]
#[parallel]
fn test_native_wrong_direction() {
    let provider = NativeRsaProvider::new();
    let key = provider.import_private_key(test_key_components()).unwrap();
    let digest = sha256(b"direction");
    let params = PssParams::new(HashAlg::Sha256, SaltLength::Digest);

    let mut ctx = provider.pss_context(&key, SigOp::Verify).unwrap();
    for step in PssStep::ORDER {
        crate::pss::apply_step(&mut ctx, step, &params).unwrap();
    }
    let err = ctx.sign(&digest, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ProviderFailure);
}

#[test]
#[parallel]
fn test_native_large_keys() {
    let provider = NativeRsaProvider::new();
    let mut n = vec![0xb7u8; 1024];
    n[1023] |= 0x01;
    let public = RsaPublicComponents {
        n: n.clone(),
        e: vec![0x01, 0x00, 0x01],
    };
    let key = provider.import_public_key(&public).unwrap();
    assert_eq!(key.bits(), 8192);
    assert_eq!(key.size(), 1024);
    assert!(!key.is_private());

    /* beyond the largest supported modulus */
    let huge = RsaPublicComponents {
        n: vec![0xffu8; 2049],
        e: vec![0x01, 0x00, 0x01],
    };
    let err = provider.import_public_key(&huge).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    /* private keys stop at 4096 bits */
    let private = RsaPrivateComponents {
        n: n,
        e: vec![0x01, 0x00, 0x01],
        d: vec![0x03; 1024],
        p: vec![0x05; 512],
        q: vec![0x07; 512],
    };
    let err = provider.import_private_key(&private).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}
