//! Stamps `MODSYNC_VERSION` into the binary for `modsync --version`.
//!
//! Checkouts with tags report the nearest tag (with `-dev` when the tree is
//! dirty); tarball builds report the crate version.

use std::process::Command;

fn git_version() -> Option<String> {
    let out = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty=-dev"])
        .output()
        .ok()?;
    if !out.status.success() {
        return None;
    }
    let described = String::from_utf8(out.stdout).ok()?;
    let tag = described.trim();
    let tag = tag.strip_prefix('v').unwrap_or(tag);
    (!tag.is_empty()).then(|| tag.to_string())
}

fn main() {
    // The workspace root holds the repository.
    println!("cargo:rerun-if-changed=../../.git/HEAD");
    println!("cargo:rerun-if-changed=../../.git/refs/tags");

    let version = git_version().unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());
    println!("cargo:rustc-env=MODSYNC_VERSION={version}");
}
