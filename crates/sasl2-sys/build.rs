use std::env;

use pkg_config::Config;

fn main() {
    println!("cargo:rerun-if-env-changed=SASL2_LIB_DIR");
    println!("cargo:rerun-if-env-changed=SASL2_LIB_NAME");

    if let Ok(lib_dir) = env::var("SASL2_LIB_DIR") {
        println!("cargo:rustc-link-search=native={}", lib_dir);
        println!(
            "cargo:rustc-link-lib={}",
            env::var("SASL2_LIB_NAME").unwrap_or_else(|_| "sasl2".to_string())
        );
    } else if let Err(err) = Config::new().atleast_version("2").probe("libsasl2") {
        // Declarations stay usable; only binaries calling into the library will fail to link.
        println!("cargo:warning=Could not find the Cyrus SASL library: {err}");
    }
}
