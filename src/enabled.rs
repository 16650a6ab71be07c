// Copyright 2024 Simo Sorce
// See LICENSE.txt file for terms

#[cfg(not(any(feature = "openssl", feature = "native")))]
compile_error!("At least one of the features 'openssl' and 'native' must be enabled");

#[cfg(feature = "openssl")]
pub mod ossl;

#[cfg(feature = "native")]
pub mod native;
