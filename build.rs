#![forbid(
    dead_code,
    deprecated,
    future_incompatible,
    missing_copy_implementations,
    missing_debug_implementations,
    nonstandard_style,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unused,
    unsafe_code,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used
)]

fn git_hash() -> String {
    use std::process::Command;
    if let Ok(hash) = std::env::var("KEYSTRETCH_BUILD_GIT_HASH") {
        return if hash == "skip" {
            String::new()
        } else {
            format!(" (rev {hash})")
        };
    }
    let args = &["rev-parse", "--short", "HEAD"];
    let Ok(output) = Command::new("git").args(args).output() else {
        return String::new();
    };
    if !output.status.success() {
        return String::new();
    }
    let hash = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if hash.is_empty() {
        String::new()
    } else {
        format!(" (rev {hash})")
    }
}

fn main() {
    println!("cargo::rerun-if-changed=build.rs");
    println!("cargo::rerun-if-env-changed=KEYSTRETCH_BUILD_GIT_HASH");
    // always set, so `env!` in the binary never fails outside a checkout
    println!("cargo::rustc-env=KEYSTRETCH_BUILD_GIT_HASH={}", git_hash());
}
