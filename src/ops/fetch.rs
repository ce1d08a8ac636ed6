//! Source archive download and unpacking.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use url::Url;

use crate::core::recipe::Recipe;
use crate::util::fs::{ensure_dir, remove_dir_all_if_exists};
use crate::util::hash::{file_digest, matches_checksum};
use crate::util::shell::{Shell, Status};

/// Options for `gccforge fetch`.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Directory holding `downloads/` and `src/`.
    pub cache_dir: PathBuf,

    /// Download again even if a verified archive is cached.
    pub force: bool,
}

/// Outcome of a fetch.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub archive: PathBuf,
    pub source_dir: PathBuf,
    pub downloaded: bool,
}

/// Compression of a source archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    TarBz2,
    TarGz,
    Tar,
}

impl ArchiveFormat {
    /// Detect the format from the archive's file name.
    pub fn from_file_name(name: &str) -> Option<Self> {
        if name.ends_with(".tar.bz2") || name.ends_with(".tbz2") {
            Some(ArchiveFormat::TarBz2)
        } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(ArchiveFormat::TarGz)
        } else if name.ends_with(".tar") {
            Some(ArchiveFormat::Tar)
        } else {
            None
        }
    }
}

/// Download, verify and unpack the recipe's source archive.
pub fn fetch(recipe: &Recipe, opts: &FetchOptions, shell: &Shell) -> Result<FetchResult> {
    let downloads = opts.cache_dir.join("downloads");
    ensure_dir(&downloads)?;

    let archive = downloads.join(recipe.archive_name());
    let cached = !opts.force
        && archive.is_file()
        && matches_checksum(&archive, &recipe.checksum).unwrap_or(false);

    if cached {
        tracing::debug!("using cached archive {}", archive.display());
    } else {
        let url = http_url(&recipe.url)?;
        shell.status(Status::Fetching, &url);
        download(&url, &archive, shell)?;
        verify(&archive, recipe)?;
    }
    shell.status(Status::Verified, format!("{} ({})", recipe.archive_name(), recipe.checksum));

    let source_dir = opts
        .cache_dir
        .join("src")
        .join(format!("{}-{}", recipe.name, recipe.version));
    shell.status(Status::Unpacking, source_dir.display());
    unpack_archive(&archive, &source_dir)?;

    Ok(FetchResult {
        archive,
        source_dir,
        downloaded: !cached,
    })
}

/// Parse the URL and require a scheme the HTTP client can fetch.
fn http_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).with_context(|| format!("invalid source url `{}`", raw))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => bail!(
            "cannot download `{}` over {}\n\
             \n\
             Set `source.url` in .gccforge/config.toml to an HTTP(S) mirror, or download\n\
             the archive yourself and pass the unpacked tree with --source-dir.",
            raw,
            scheme
        ),
    }
}

/// Stream a URL into `dest`, writing to a temporary name first.
fn download(url: &Url, dest: &Path, shell: &Shell) -> Result<()> {
    let mut response = reqwest::blocking::get(url.as_str())
        .with_context(|| format!("failed to download {}", url))?;

    if !response.status().is_success() {
        bail!("failed to download {}: HTTP {}", url, response.status());
    }

    let partial = dest.with_extension("part");
    let file = File::create(&partial)
        .with_context(|| format!("failed to create {}", partial.display()))?;
    let mut writer = BufWriter::new(file);

    let progress = shell.bytes_progress("Downloading", response.content_length());
    let mut buffer = [0u8; 64 * 1024];
    loop {
        let n = response
            .read(&mut buffer)
            .with_context(|| format!("failed to read response body from {}", url))?;
        if n == 0 {
            break;
        }
        writer.write_all(&buffer[..n])?;
        progress.inc(n as u64);
    }
    writer.flush()?;
    progress.finish();

    fs::rename(&partial, dest)
        .with_context(|| format!("failed to move download to {}", dest.display()))?;
    Ok(())
}

/// Verify a downloaded archive, deleting it on mismatch.
fn verify(archive: &Path, recipe: &Recipe) -> Result<()> {
    let actual = file_digest(archive, recipe.checksum.kind)?;
    if actual != recipe.checksum.hex {
        let _ = fs::remove_file(archive);
        bail!(
            "checksum mismatch for {}:\n  expected: {}\n  actual:   {}",
            recipe.archive_name(),
            recipe.checksum.hex,
            actual
        );
    }
    tracing::debug!("checksum verified: {}", actual);
    Ok(())
}

/// Unpack a tarball into `dest`, dropping its single top-level directory.
///
/// Any existing `dest` is replaced.
pub fn unpack_archive(archive: &Path, dest: &Path) -> Result<()> {
    let name = archive
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let format = ArchiveFormat::from_file_name(name)
        .with_context(|| format!("unsupported archive format: {}", archive.display()))?;

    let parent = dest
        .parent()
        .with_context(|| format!("invalid destination: {}", dest.display()))?;
    ensure_dir(parent)?;

    let staging = tempfile::Builder::new()
        .prefix(".unpack-")
        .tempdir_in(parent)
        .with_context(|| format!("failed to create staging directory in {}", parent.display()))?;

    let file = BufReader::new(
        File::open(archive).with_context(|| format!("failed to open {}", archive.display()))?,
    );
    let reader: Box<dyn Read> = match format {
        ArchiveFormat::TarBz2 => Box::new(bzip2::read::BzDecoder::new(file)),
        ArchiveFormat::TarGz => Box::new(flate2::read::GzDecoder::new(file)),
        ArchiveFormat::Tar => Box::new(file),
    };
    tar::Archive::new(reader)
        .unpack(staging.path())
        .with_context(|| format!("failed to unpack {}", archive.display()))?;

    let root = single_top_level_dir(staging.path())?;
    remove_dir_all_if_exists(dest)?;
    fs::rename(&root, dest)
        .with_context(|| format!("failed to move unpacked source to {}", dest.display()))?;

    Ok(())
}

/// The archive's root directory. Release tarballs have exactly one.
fn single_top_level_dir(staging: &Path) -> Result<PathBuf> {
    let entries: Vec<PathBuf> = fs::read_dir(staging)
        .with_context(|| format!("failed to read {}", staging.display()))?
        .map(|e| e.map(|e| e.path()))
        .collect::<std::io::Result<_>>()?;

    match entries.as_slice() {
        [only] if only.is_dir() => Ok(only.clone()),
        _ => bail!("archive does not contain a single top-level directory"),
    }
}
