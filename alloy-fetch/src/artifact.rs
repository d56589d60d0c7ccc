use std::fmt;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{ensure, Context, Result};
use tracing::info;

const RELEASE_BASE_URL: &str = "https://github.com/grafana/alloy/releases/download";

// Path of the executable inside the extracted .deb tree.
const PACKAGED_BINARY: &str = "usr/bin/alloy";

pub struct Artifact {
    release: String,
    patch: String,
    arch: String,
}

impl Artifact {
    pub fn new(release: &str, patch: &str, arch: &str) -> Self {
        Self {
            release: release.to_string(),
            patch: patch.to_string(),
            arch: arch.to_string(),
        }
    }

    pub fn deb_name(&self) -> String {
        format!("alloy-{}-{}.{}.deb", self.release, self.patch, self.arch)
    }

    pub fn url(&self) -> String {
        format!(
            "{}/v{}/{}",
            RELEASE_BASE_URL,
            self.release,
            self.deb_name()
        )
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "alloy {}-{} ({})", self.release, self.patch, self.arch)
    }
}

/// Downloads the release package, skipping the transfer when a previous run
/// already left it in place.
pub fn download(url: &str, dest: &Path) -> Result<()> {
    if dest.is_file() {
        info!("Package already downloaded at {}", dest.display());
        return Ok(());
    }

    info!("Downloading {}", url);
    let status = Command::new("curl")
        .args(["--silent", "--show-error", "--fail", "-L", "-o"])
        .arg(dest)
        .arg(url)
        .stdout(Stdio::inherit())
        .status()
        .context("Failed to run curl")?;
    ensure!(status.success(), "curl exited with {}", status);

    Ok(())
}

/// Unpacks the .deb into `extract_dir` and returns the path of the packaged
/// executable. The package is only interesting for its static binary, so it
/// is extracted directly instead of installed.
pub fn extract(deb: &Path, extract_dir: &Path) -> Result<PathBuf> {
    let binary = extract_dir.join(PACKAGED_BINARY);
    if !binary.is_file() {
        info!("Extracting {}", deb.display());
        let status = Command::new("dpkg")
            .arg("-x")
            .arg(deb)
            .arg(extract_dir)
            .stdout(Stdio::inherit())
            .status()
            .context("Failed to run dpkg")?;
        ensure!(status.success(), "dpkg exited with {}", status);
    }
    ensure!(
        binary.is_file(),
        "Package did not contain {}",
        PACKAGED_BINARY
    );

    Ok(binary)
}

/// Copies the extracted binary into the workspace and marks it executable.
pub fn install(binary: &Path, workspace: &Path) -> Result<PathBuf> {
    fs::create_dir_all(workspace)
        .with_context(|| format!("Failed to create {}", workspace.display()))?;

    let dest = workspace.join("alloy");
    fs::copy(binary, &dest)
        .with_context(|| format!("Failed to copy the binary to {}", dest.display()))?;

    let mut permissions = fs::metadata(&dest)?.permissions();
    permissions.set_mode(0o755);
    fs::set_permissions(&dest, permissions)
        .with_context(|| format!("Failed to mark {} executable", dest.display()))?;

    Ok(dest)
}

/// Removes the download and the extraction tree so they do not end up in the
/// image layer.
pub fn cleanup(deb: &Path, extract_dir: &Path) -> Result<()> {
    fs::remove_dir_all(extract_dir)
        .with_context(|| format!("Failed to remove {}", extract_dir.display()))?;
    fs::remove_file(deb).with_context(|| format!("Failed to remove {}", deb.display()))?;
    Ok(())
}
