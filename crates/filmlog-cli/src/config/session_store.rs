//! Session cookie persistence between invocations.

use std::path::Path;

use anyhow::{Context, Result};
use reqwest::cookie::{CookieStore, Jar};
use serde::{Deserialize, Serialize};
use url::Url;

/// On-disk form of the session cookies.
#[derive(Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
struct SessionFile {
    /// `name=value` pairs sent to the backend.
    #[serde(default)]
    cookies: Vec<String>,
}

/// Adds the cookies stored in the session file to `jar`.
///
/// A missing file restores nothing. Returns the number of restored cookies.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn restore_cookies(path: &Path, jar: &Jar, base_url: &Url) -> Result<usize> {
    if !path.exists() {
        return Ok(0);
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let file: SessionFile =
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))?;
    for cookie in &file.cookies {
        jar.add_cookie_str(cookie, base_url);
    }
    tracing::debug!(count = file.cookies.len(), "restored session cookies");
    Ok(file.cookies.len())
}

/// Writes the cookies the jar would send to `base_url`.
///
/// An empty jar writes an empty list, which clears a previous login.
///
/// # Errors
///
/// Returns an error if directory creation or file write fails.
pub fn save_cookies(path: &Path, jar: &Jar, base_url: &Url) -> Result<()> {
    let cookies = jar
        .cookies(base_url)
        .and_then(|header| header.to_str().ok().map(String::from))
        .map(|header| header.split("; ").map(String::from).collect())
        .unwrap_or_default();
    write_session_file(path, &SessionFile { cookies })
}

/// Forgets every stored cookie.
///
/// # Errors
///
/// Returns an error if directory creation or file write fails.
pub fn clear_cookies(path: &Path) -> Result<()> {
    write_session_file(path, &SessionFile::default())
}

fn write_session_file(path: &Path, file: &SessionFile) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    let content = toml::to_string_pretty(file).context("failed to serialize session")?;
    std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
}
