// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

use std::str::FromStr;

use crate::backend::{self, Backend, BackendKind};
use crate::config::Config;
use crate::error::ErrorKind;

use serial_test::{parallel, serial};

#[test]
#[parallel]
fn test_backend_kind_names() {
    for kind in [BackendKind::OpenSsl, BackendKind::Fips, BackendKind::Native] {
        let name = kind.to_string();
        assert_eq!(BackendKind::from_str(&name).unwrap(), kind);
    }
    assert_eq!(
        BackendKind::from_str("boringssl").unwrap_err().kind(),
        ErrorKind::Config
    );
}

#[cfg(feature = "openssl")]
#[test]
#[parallel]
fn test_backend_openssl() {
    let b = Backend::with_kind(BackendKind::OpenSsl).unwrap();
    assert_eq!(b.kind(), BackendKind::OpenSsl);
    assert_eq!(b.name(), "openssl");
    assert!(!b.is_certified());
    assert_eq!(b.min_rsa_bits(), 2048);
}

#[cfg(feature = "native")]
#[test]
#[parallel]
fn test_backend_native() {
    let b = Backend::with_kind(BackendKind::Native).unwrap();
    assert_eq!(b.kind(), BackendKind::Native);
    assert_eq!(b.name(), "native");
    assert!(!b.is_certified());
}

#[cfg(not(feature = "native"))]
#[test]
#[parallel]
fn test_backend_native_missing() {
    let err = Backend::with_kind(BackendKind::Native).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BackendUnavailable);
}

#[cfg(feature = "openssl")]
#[test]
#[parallel]
fn test_backend_fips() {
    match Backend::with_kind(BackendKind::Fips) {
        Ok(b) => {
            assert_eq!(b.name(), "openssl-fips");
            assert!(b.is_certified());
        }
        Err(e) => {
            /* no FIPS provider installed on this system */
            assert_eq!(e.kind(), ErrorKind::BackendUnavailable);
            println!("Skipping FIPS backend checks: {}", e);
        }
    }
}

#[test]
#[serial]
fn test_backend_init_once() {
    let conf = Config::default();
    /* the first selection wins, whether explicit or lazy */
    let _ = backend::init(&conf);
    let active = backend::active().unwrap();
    assert_eq!(
        backend::init(&conf).unwrap_err().kind(),
        ErrorKind::AlreadyInitialized
    );
    assert!(std::ptr::eq(active, backend::active().unwrap()));
    assert_eq!(
        backend::enabled(),
        active.kind() != BackendKind::Native
    );
    assert_eq!(backend::fips_enabled(), active.is_certified());

    /* test builds never trip the guard */
    backend::unreachable_except_tests();
}

#[test]
#[serial]
fn test_backend_unreachable() {
    let _ = backend::init(&Config::default());
    let active = backend::active().unwrap();
    assert_eq!(backend::enabled(), active.kind() != BackendKind::Native);

    /* panics exactly when OpenSSL serves the process */
    let tripped = std::panic::catch_unwind(backend::unreachable).is_err();
    assert_eq!(tripped, backend::enabled());
}
