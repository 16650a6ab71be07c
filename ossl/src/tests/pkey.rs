// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

use serial_test::parallel;

use crate::bindings::*;
use crate::pkey::{EvpPkey, RsaData};
use crate::tests::{f4, test_ossl_context, test_rsa_key};
use crate::{cstr, BigNum, ErrorKind};

#[test]
#[parallel]
fn test_bignum() {
    let mut bn = BigNum::new().unwrap();
    assert_eq!(bn.num_bits(), 0);
    bn.set_word(65537).unwrap();
    assert_eq!(bn.num_bits(), 17);
    assert_eq!(bn.to_bigendian().unwrap(), vec![0x01, 0x00, 0x01]);

    let bn = BigNum::from_bigendian(&[0x00, 0x80, 0x00]).unwrap();
    assert_eq!(bn.num_bits(), 16);
    assert_eq!(bn.to_bigendian().unwrap(), vec![0x80, 0x00]);
}

#[test]
#[parallel]
fn test_rsa_generate() {
    let key = test_rsa_key();
    assert_eq!(key.get_bits().unwrap(), 2048);
    assert_eq!(key.get_size().unwrap(), 256);
    assert!(key.is_private());

    let e = key.get_bn_param(cstr!(OSSL_PKEY_PARAM_RSA_E)).unwrap();
    assert_eq!(e.to_bigendian().unwrap(), vec![0x01, 0x00, 0x01]);
    let n = key.get_bn_param(cstr!(OSSL_PKEY_PARAM_RSA_N)).unwrap();
    assert_eq!(n.num_bits(), 2048);
}

#[test]
#[parallel]
fn test_rsa_generate_progress() {
    let mut calls = 0usize;
    let mut progress = |_phase: i32, _count: i32| -> bool {
        calls += 1;
        true
    };
    let key = EvpPkey::generate_rsa(
        test_ossl_context(),
        2048,
        &f4(),
        Some(&mut progress),
    )
    .unwrap();
    assert_eq!(key.get_bits().unwrap(), 2048);
    assert!(calls > 0);
}

#[test]
#[parallel]
fn test_rsa_generate_abort() {
    let mut progress = |_phase: i32, _count: i32| -> bool { false };
    let err = EvpPkey::generate_rsa(
        test_ossl_context(),
        2048,
        &f4(),
        Some(&mut progress),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OsslError);
}

#[test]
#[parallel]
fn test_rsa_export_import() {
    let key = test_rsa_key();
    let data = key.export_rsa().unwrap();
    assert_eq!(data.e, vec![0x01, 0x00, 0x01]);
    assert!(data.d.is_some());

    let public = RsaData {
        n: data.n.clone(),
        e: data.e.clone(),
        d: None,
        p: None,
        q: None,
    };
    let pubkey = EvpPkey::import_rsa(test_ossl_context(), &public).unwrap();
    assert!(!pubkey.is_private());
    assert_eq!(pubkey.get_bits().unwrap(), 2048);
    let exported = pubkey.export_rsa().unwrap();
    assert_eq!(exported.n, data.n);
    assert!(exported.d.is_none());

    let privkey = EvpPkey::import_rsa(test_ossl_context(), &data).unwrap();
    assert!(privkey.is_private());
    assert_eq!(privkey.export_rsa().unwrap().d, data.d);
}

#[test]
#[parallel]
fn test_rsa_import_partial() {
    let data = test_rsa_key().export_rsa().unwrap();
    let partial = RsaData {
        n: data.n.clone(),
        e: data.e.clone(),
        d: data.d.clone(),
        p: None,
        q: None,
    };
    let err = EvpPkey::import_rsa(test_ossl_context(), &partial).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BadArg);
}
