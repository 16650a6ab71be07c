// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

use crate::fips::fips_available;
use crate::OsslContext;

use serial_test::parallel;

#[test]
#[parallel]
fn test_fips_context() {
    let ctx = OsslContext::new_lib_ctx().unwrap();
    assert!(!ctx.is_fips_enabled());

    if !fips_available() {
        assert!(OsslContext::new_fips_ctx().is_err());
        println!("FIPS provider not installed, skipping");
        return;
    }
    let fctx = OsslContext::new_fips_ctx().unwrap();
    assert!(fctx.is_fips_enabled());
}
