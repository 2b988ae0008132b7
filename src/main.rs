#![deny(
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
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used
)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

const EXPANDED_VERSION: &str = concat!(
    "v",
    env!("CARGO_PKG_VERSION"),
    env!("KEYSTRETCH_BUILD_GIT_HASH"),
);

mod cli;

use cli::Cli;

// musl's allocator is noticeably slower than glibc's, and scrypt's scratch
// arrays are large and short-lived. when building with musl we use jemalloc
// instead. only on 64-bit systems, because jemalloc doesn't support i686.
#[cfg(all(target_env = "musl", target_pointer_width = "64"))]
#[global_allocator]
static ALLOC: jemallocator::Jemalloc = jemallocator::Jemalloc;

#[allow(clippy::redundant_pub_crate)] // macro generated
async fn shutdown() {
    let ctrlc = async {
        if tokio::signal::ctrl_c().await.is_err() {
            core::future::pending::<()>().await;
        }
    };
    #[cfg(unix)]
    let term = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => core::future::pending::<()>().await,
        }
    };
    #[cfg(not(unix))]
    let term = core::future::pending::<()>();
    tokio::select! {
        () = ctrlc => (),
        () = term => (),
    }
}

#[tokio::main]
#[allow(clippy::needless_return, clippy::redundant_pub_crate)] // macro generated
async fn main() -> Result<(), cli::Context> {
    tokio::select! {
        r = async { Cli::run().await } => r,
        () = shutdown() => {
            // a derivation in progress cannot be interrupted
            eprintln!("interrupted, abandoning running derivations");
            std::process::exit(130);
        },
    }
}
