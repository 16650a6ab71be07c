// Copyright 2024 Simo Sorce
// See LICENSE.txt file for terms

use std::env;

use crate::backend::BackendKind;
use crate::config::{Config, BACKEND_ENV, CONF_ENV};
use crate::error::ErrorKind;

use serial_test::{parallel, serial};

#[test]
#[parallel]
fn test_config_defaults() {
    let conf = Config::from_toml("").unwrap();
    assert_eq!(conf, Config::default());
    assert_eq!(conf.min_rsa_bits, 2048);
    assert_eq!(conf.backend, BackendKind::default());
}

#[test]
#[parallel]
fn test_config_parse() {
    let conf =
        Config::from_toml("backend = \"fips\"\nmin_rsa_bits = 4096\n").unwrap();
    assert_eq!(conf.backend, BackendKind::Fips);
    assert_eq!(conf.min_rsa_bits, 4096);

    let conf = Config::from_file("testdata/backend.conf").unwrap();
    assert_eq!(conf.backend, BackendKind::Native);
    assert_eq!(conf.min_rsa_bits, 3072);
}

#[test]
#[parallel]
fn test_config_invalid() {
    for bad in [
        "backend = \"boringssl\"",
        "min_rsa_bits = 512",
        "min_rsa_bits = 32768",
        "slots = 3",
    ] {
        let err = Config::from_toml(bad).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config, "accepted: {}", bad);
    }
    assert!(Config::from_file("testdata/bad_backend.conf").is_err());
    assert_eq!(
        Config::from_file("testdata/missing.conf")
            .unwrap_err()
            .kind(),
        ErrorKind::Nested
    );
}

#[test]
#[serial]
fn test_config_env() {
    env::set_var(CONF_ENV, "testdata/backend.conf");
    env::remove_var(BACKEND_ENV);
    assert_eq!(
        Config::find_conf(),
        Some("testdata/backend.conf".to_string())
    );
    let conf = Config::load().unwrap();
    assert_eq!(conf.backend, BackendKind::Native);
    assert_eq!(conf.min_rsa_bits, 3072);

    /* the backend override beats the file */
    env::set_var(BACKEND_ENV, "fips");
    let conf = Config::load().unwrap();
    assert_eq!(conf.backend, BackendKind::Fips);
    assert_eq!(conf.min_rsa_bits, 3072);

    env::set_var(BACKEND_ENV, "nonsense");
    assert_eq!(Config::load().unwrap_err().kind(), ErrorKind::Config);

    /* an explicitly named file must exist */
    env::remove_var(BACKEND_ENV);
    env::set_var(CONF_ENV, "testdata/missing.conf");
    assert!(Config::load().is_err());

    env::remove_var(CONF_ENV);
}
