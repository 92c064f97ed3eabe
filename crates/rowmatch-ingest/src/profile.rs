//! Match profile persistence.
//!
//! A profile is a TOML serialization of [`MatchSettings`]. The default
//! location is the platform config folder:
//! - Linux: ~/.config/rowmatch/profile.toml
//! - macOS: ~/Library/Application Support/com.rowmatch.rowmatch/profile.toml
//! - Windows: %APPDATA%/rowmatch/rowmatch/config/profile.toml

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use tracing::{debug, info};

use rowmatch_model::MatchSettings;

const APP_QUALIFIER: &str = "com";
const APP_ORG: &str = "rowmatch";
const APP_NAME: &str = "rowmatch";
const PROFILE_FILENAME: &str = "profile.toml";

/// Default profile path, `None` when no home directory can be determined.
pub fn default_profile_path() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .map(|dirs| dirs.config_dir().join(PROFILE_FILENAME))
}

/// Load a profile; a missing file yields default settings, a malformed one
/// is an error.
pub fn load_profile(path: &Path) -> Result<MatchSettings> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "no profile found, using defaults");
            return Ok(MatchSettings::default());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("read profile: {}", path.display()));
        }
    };
    let settings: MatchSettings =
        toml::from_str(&content).with_context(|| format!("parse profile: {}", path.display()))?;
    info!(path = %path.display(), "loaded profile");
    Ok(settings)
}

/// Save a profile, creating the parent directory if needed.
pub fn save_profile(path: &Path, settings: &MatchSettings) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create profile directory: {}", parent.display()))?;
    }
    let content = toml::to_string_pretty(settings).context("serialize profile")?;
    fs::write(path, content).with_context(|| format!("write profile: {}", path.display()))?;
    info!(path = %path.display(), "saved profile");
    Ok(())
}
