//! Test fixtures for common test scenarios.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// An unpacked GCC source tree with an executable `configure` stub.
#[derive(Debug)]
pub struct GccSourceFixture {
    tmp: TempDir,
    source_dir: PathBuf,
}

impl GccSourceFixture {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("failed to create temp dir");
        let source_dir = tmp.path().join("gcc-4.8.0");
        fs::create_dir_all(&source_dir).expect("failed to create source dir");
        write_script(&source_dir.join("configure"), "#!/bin/sh\nexit 0\n");
        GccSourceFixture { tmp, source_dir }
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Keg root inside the fixture's temp dir.
    pub fn prefix(&self) -> PathBuf {
        self.tmp.path().join("Cellar/gcc48/4.8.0")
    }
}

impl Default for GccSourceFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Write an executable shell script.
pub fn write_script(path: &Path, body: &str) {
    fs::write(path, body).expect("failed to write script");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755))
            .expect("failed to chmod script");
    }
}

/// Write a tarball whose entries all live under `top/`.
///
/// Compression follows the file name: `.tar.gz`, `.tar.bz2` or plain `.tar`.
pub fn write_tarball(path: &Path, top: &str, files: &[(&str, &str)]) {
    let mut builder = tar::Builder::new(Vec::new());
    for (name, contents) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder
            .append_data(&mut header, format!("{}/{}", top, name), contents.as_bytes())
            .expect("failed to append tar entry");
    }
    let tar_bytes = builder.into_inner().expect("failed to finish tar");

    let name = path.to_string_lossy();
    let bytes = if name.ends_with(".tar.gz") {
        let mut enc = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        enc.write_all(&tar_bytes).unwrap();
        enc.finish().unwrap()
    } else if name.ends_with(".tar.bz2") {
        let mut enc = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::default());
        enc.write_all(&tar_bytes).unwrap();
        enc.finish().unwrap()
    } else {
        tar_bytes
    };
    fs::write(path, bytes).expect("failed to write tarball");
}
