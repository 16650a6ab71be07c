// Copyright 2024 Simo Sorce
// See LICENSE.txt file for terms

//! Built-in RSA provider using native Rust implementations

pub mod rsa;

pub use self::rsa::NativeRsaProvider;
