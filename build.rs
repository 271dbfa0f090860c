//! Build script for check-service.
//!
//! Records build metadata (target triple, git commit, build date, rustc
//! version) as compile-time environment variables for `version.rs`.

use std::env;
use std::process::Command;

fn main() {
    // Tell cargo to re-run this script if it changes
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=.git/HEAD");

    println!(
        "cargo:rustc-env=CHECK_SERVICE_TARGET={}",
        env::var("TARGET").unwrap_or_else(|_| "unknown".to_string())
    );

    if let Some(hash) = run_trimmed("git", &["rev-parse", "--short", "HEAD"]) {
        println!("cargo:rustc-env=CHECK_SERVICE_GIT_HASH={}", hash);
    }

    if let Some(date) = run_trimmed("date", &["-u", "+%Y-%m-%dT%H:%M:%SZ"]) {
        println!("cargo:rustc-env=CHECK_SERVICE_BUILD_DATE={}", date);
    }

    // "rustc 1.75.0 (..." -> "1.75.0"
    let rustc = env::var("RUSTC").unwrap_or_else(|_| "rustc".to_string());
    if let Some(version) = run_trimmed(&rustc, &["--version"])
        .and_then(|s| s.split_whitespace().nth(1).map(|v| v.to_string()))
    {
        println!("cargo:rustc-env=CHECK_SERVICE_RUSTC_VERSION={}", version);
    }
}

/// Run a command and return its trimmed stdout on success
fn run_trimmed(program: &str, args: &[&str]) -> Option<String> {
    Command::new(program)
        .args(args)
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
