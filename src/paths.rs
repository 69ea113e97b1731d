use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::config::BootstrapConfig;

/// Resolve the current account name from the process environment: `USERNAME`
/// first, then the final segment of `USERPROFILE`.
pub fn resolve_username() -> Option<String> {
    username_from(
        std::env::var("USERNAME").ok().as_deref(),
        std::env::var("USERPROFILE").ok().as_deref(),
    )
}

fn username_from(username: Option<&str>, profile: Option<&str>) -> Option<String> {
    if let Some(name) = username {
        let name = name.trim();
        if !name.is_empty() {
            return Some(name.to_string());
        }
    }

    let profile = profile?;
    let name = Path::new(profile).file_name()?.to_str()?.trim();
    if name.is_empty() {
        return None;
    }
    Some(name.to_string())
}

/// Fixed location the bootstrap script installs uv to.
pub fn uv_probe_path(username: &str) -> PathBuf {
    PathBuf::from(format!(r"C:\Users\{username}\.local\bin\uv.exe"))
}

/// Program to spawn for uv subcommands: the fixed install location when it
/// exists, then a PATH lookup, then the bare name.
pub fn uv_program(username: Option<&str>) -> PathBuf {
    if let Some(username) = username {
        let fixed = uv_probe_path(username);
        if fixed.exists() {
            return fixed;
        }
    }

    which::which("uv").unwrap_or_else(|_| PathBuf::from("uv"))
}

/// The user's home directory.
pub fn home_dir() -> anyhow::Result<PathBuf> {
    dirs::home_dir().context("could not determine the user's home directory")
}

/// The two executables the bootstrap script leaves under the user-local bin
/// directory.
pub fn user_local_bin_exes(home: &Path) -> (PathBuf, PathBuf) {
    let bin = home.join(".local").join("bin");
    (bin.join("uv.exe"), bin.join("uvx.exe"))
}

/// `file:///` URI for a local directory, with backslashes normalized to
/// forward slashes so uv accepts it as a mirror source.
pub fn file_uri(path: &Path) -> String {
    let text = path.to_string_lossy().replace('\\', "/");
    format!("file:///{text}")
}

/// Layout of the bundle directory the installer runs from: the installer
/// assets next to the application project.
#[derive(Debug, Clone)]
pub struct BundleLayout {
    pub root: PathBuf,
    pub assets_dir: PathBuf,
    pub project_dir: PathBuf,
}

impl BundleLayout {
    pub fn at(root: PathBuf, config: &BootstrapConfig) -> Self {
        let assets_dir = root.join(&config.assets_dir);
        let project_dir = root.join(&config.project_dir);
        Self {
            root,
            assets_dir,
            project_dir,
        }
    }
}
