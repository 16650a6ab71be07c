// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

use std::env;
use std::panic::set_hook;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct OsslCallbacks;
const OPENSSL_3_0_0: i64 = 0x30000000;

impl bindgen::callbacks::ParseCallbacks for OsslCallbacks {
    fn int_macro(
        &self,
        name: &str,
        value: i64,
    ) -> Option<bindgen::callbacks::IntKind> {
        if name == "OPENSSL_VERSION_NUMBER" {
            if value < OPENSSL_3_0_0 {
                panic!(
                    "OpenSSL 3.0.0 is the minimum viable version. Found {:x}",
                    value
                );
            }
        }

        None
    }

    fn include_file(&self, filename: &str) {
        println!("cargo:rerun-if-changed={filename}");
    }
}

fn ossl_bindings<T: AsRef<str>>(args: &[T], out_file: &Path) {
    bindgen::Builder::default()
        .header("ossl.h")
        .clang_args(args)
        .derive_default(true)
        .formatter(bindgen::Formatter::Prettyplease)
        .allowlist_item("OSSL_.*")
        .allowlist_item("OPENSSL_.*")
        .allowlist_item("EVP_.*")
        .allowlist_item("BN_.*")
        .allowlist_item("ERR_.*")
        .parse_callbacks(Box::new(OsslCallbacks))
        .generate()
        .expect("Unable to generate bindings")
        .write_to_file(out_file)
        .expect("Couldn't write bindings!");
}

fn use_system_ossl(out_file: &Path) {
    let library = pkg_config::Config::new()
        .atleast_version("3.0.0")
        .statik(!cfg!(feature = "dynamic"))
        .probe("libcrypto")
        .unwrap();

    let mut args: Vec<String> = Vec::new();
    for include_path in library.include_paths {
        args.push(["-I", include_path.to_str().unwrap()].concat());
    }

    ossl_bindings(&args, out_file);
}

fn set_pretty_panic() {
    set_hook(Box::new(|panic_info| {
        if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            println!("Compile Error: {s:?}");
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            println!("Compile Error: {s:?}");
        } else if let Some(location) = panic_info.location() {
            println!(
                "Unrecognized compile error in file '{}' at line {}",
                location.file(),
                location.line(),
            );
        } else {
            println!("Unknown panic with no location information...");
        }
    }));
}

fn main() {
    set_pretty_panic();

    let out_path = PathBuf::from(env::var("OUT_DIR").unwrap());
    let ossl_bindings = out_path.join("ossl_bindings.rs");

    use_system_ossl(&ossl_bindings);

    println!("cargo:rerun-if-changed=ossl.h");
    println!("cargo:rerun-if-changed=build.rs");
}
