// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

#![cfg(feature = "native")]

use cryptobackend::backend::{self, Backend, BackendKind};
use cryptobackend::native::NativeRsaProvider;
use cryptobackend::provider::{RsaProvider, RsaPublicComponents, SigOp};
use cryptobackend::{Config, HashAlg, PssParams, SaltLength};

fn synthetic_public() -> RsaPublicComponents {
    let mut n = vec![0xc5u8; 256];
    n[255] |= 0x01;
    RsaPublicComponents {
        n: n,
        e: vec![0x01, 0x00, 0x01],
    }
}

/* Using backends the caller owns must leave the process wide selection
 * open, and must never trip the built-in code guard */
#[test]
fn test_owned_backends_leave_selection_open() {
    let native = Backend::with_kind(BackendKind::Native).unwrap();
    let digest = native.hash(HashAlg::Sha256, b"owned").unwrap();
    assert_eq!(digest.len(), 32);

    let provider = NativeRsaProvider::new();
    let key = provider.import_public_key(&synthetic_public()).unwrap();
    let params = PssParams::new(HashAlg::Sha256, SaltLength::Digest);
    let sig = vec![0u8; 256];
    assert!(!cryptobackend::pss::verify_pss(
        &provider, &key, &digest, &params, &sig
    ));
    assert!(provider.pss_context(&key, SigOp::Verify).is_ok());

    #[cfg(feature = "openssl")]
    {
        let ossl = Backend::with_kind(BackendKind::OpenSsl).unwrap();
        let key = cryptobackend::RsaKey::import_public_in(
            &ossl,
            &synthetic_public(),
        )
        .unwrap();
        let nkey = key.transfer_to(&native).unwrap();
        assert!(nkey.verify_pss(&digest, &params, &sig).is_err());
    }

    assert!(!backend::enabled());
    assert!(!backend::fips_enabled());

    let conf = Config {
        backend: BackendKind::Native,
        ..Config::default()
    };
    backend::init(&conf).unwrap();
    assert_eq!(backend::active().unwrap().kind(), BackendKind::Native);
    assert!(!backend::enabled());
    assert!(std::panic::catch_unwind(backend::unreachable).is_ok());
}
