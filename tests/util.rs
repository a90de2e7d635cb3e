//! Shared test utilities for integration tests
//!
//! Builds small Go module fixtures on disk and runs the binary
//! with a clean environment.

#![allow(dead_code)]

use std::process::Command;

use assert_cmd::prelude::*;
use assert_fs::prelude::*;

/// Module path of every fixture
pub const MODULE: &str = "example.com/demo";

/// Fresh module root with a go.mod
pub fn module_fixture() -> assert_fs::TempDir
{
    let tmp = assert_fs::TempDir::new().expect("tempdir");
    tmp.child("go.mod")
        .write_str(&format!("module {MODULE}\n\ngo 1.22\n"))
        .expect("write go.mod");
    tmp
}

/// Write `src` to `rel` under the fixture root
pub fn write(
    tmp: &assert_fs::TempDir,
    rel: &str,
    src: &str,
)
{
    tmp.child(rel)
        .write_str(src)
        .expect("write fixture file");
}

/// Two packages exporting the same constant plus an adapter input
pub fn max_retries_fixture() -> assert_fs::TempDir
{
    let tmp = module_fixture();
    write(&tmp, "alpha/alpha.go", "package alpha\n\nconst MaxRetries = 3\n");
    write(&tmp, "beta/beta.go", "package beta\n\nconst MaxRetries = 5\n");
    write(
        &tmp,
        "adapters/api.go",
        "package adapters\n\n//go:adapter:package example.com/demo/alpha\n//go:adapter:package example.com/demo/beta\n",
    );
    tmp
}

/// The binary, isolated from the caller's Go and goadapt environment
pub fn goadapt() -> Command
{
    let mut cmd = Command::cargo_bin("goadapt").expect("goadapt binary");
    cmd.env_remove("RUST_LOG")
        .env_remove("GOMODCACHE")
        .env_remove("GOPATH")
        .env_remove("GOROOT")
        .env_remove("GOADAPT__PACKAGE_NAME");
    cmd
}
