#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use odbstat_store::{kilobytes, on_disk_bytes};
use odbstat_types::ObjectId;
use tempfile::TempDir;

pub const BLOB_HEX: &str = "ce013625030ba8dba906f756967f9e9ca394464a";

/// A temporary object directory with command helpers pointed at it.
pub struct ObjectStore {
    dir: TempDir,
}

impl ObjectStore {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("tempdir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a loose object file for `hex` and return its path.
    pub fn add_loose(&self, hex: &str, body: &[u8]) -> PathBuf {
        let bucket = self.path().join(&hex[..2]);
        fs::create_dir_all(&bucket).expect("bucket");
        let path = bucket.join(&hex[2..]);
        fs::write(&path, body).expect("write loose object");
        path
    }

    pub fn add_file(&self, relative: &str, body: &[u8]) -> PathBuf {
        let path = self.path().join(relative);
        fs::create_dir_all(path.parent().expect("parent")).expect("parent dir");
        fs::write(&path, body).expect("write file");
        path
    }

    pub fn command(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("odbstat");
        cmd.env("GIT_OBJECT_DIRECTORY", self.path())
            .env_remove("GIT_DIR")
            .env_remove("RUST_LOG")
            .env_remove("CLICOLOR_FORCE");
        cmd
    }
}

pub fn oid(hex: &str) -> ObjectId {
    hex.parse().expect("valid object id")
}

/// Kilobytes the given files occupy on disk, as the report computes them.
pub fn kilobytes_on_disk(paths: &[PathBuf]) -> u64 {
    let bytes = paths
        .iter()
        .map(|p| on_disk_bytes(&fs::metadata(p).expect("metadata")))
        .sum();
    kilobytes(bytes)
}

pub fn stdout_of(assert: &assert_cmd::assert::Assert) -> String {
    String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout")
}

pub fn stderr_of(assert: &assert_cmd::assert::Assert) -> String {
    String::from_utf8(assert.get_output().stderr.clone()).expect("utf8 stderr")
}
