//! Project settings store (`project.godot` style `[section]` + `key=value`)
//!
//! Keys are addressed as `section/property`, e.g. `application/config/name`.
//! Both halves may contain `/` (`[dotnet/project]` holds
//! `dotnet/project/assembly_name`), so a key is matched by composing each
//! line's full key while scanning rather than by splitting the request.
//! Properties before the first section are addressed by their bare key.
//!
//! The store only rewrites existing lines. It never adds keys, and every
//! untouched line (comments, blank lines, line endings) is kept as-is.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error reading or editing a settings file
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SettingsError {
    /// Settings file does not exist
    #[error("settings file not found: {}", .0.display())]
    FileNotFound(PathBuf),
    /// Reading or writing the settings file failed
    #[error("I/O error on {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The key is not present in the file
    #[error("key not found: {0}")]
    KeyNotFound(String),
    /// The key has an empty section or property part
    #[error("invalid key '{0}', expected section/property")]
    InvalidKey(String),
}

/// Reject keys with an empty leading or trailing segment.
fn check_key(full_key: &str) -> Result<(), SettingsError> {
    if full_key.is_empty() || full_key.starts_with('/') || full_key.ends_with('/') {
        return Err(SettingsError::InvalidKey(full_key.to_string()));
    }
    Ok(())
}

/// Full key of a property: `section/property`, or the bare property in
/// the preamble.
fn full_key_of(section: Option<&str>, property: &str) -> String {
    match section {
        Some(section) => format!("{}/{}", section, property),
        None => property.to_string(),
    }
}

/// Section name if the line is a `[section]` header
fn section_header(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    trimmed.strip_prefix('[')?.strip_suffix(']').map(str::trim)
}

/// Split a `key=value` line, ignoring comments.
fn property_line(line: &str) -> Option<(&str, &str)> {
    let trimmed = line.trim();
    if trimmed.starts_with(';') || trimmed.starts_with('#') {
        return None;
    }
    let (key, value) = trimmed.split_once('=')?;
    Some((key.trim(), value.trim()))
}

/// In-memory copy of a settings file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSettings {
    /// Lines including their terminators
    lines: Vec<String>,
}

impl ProjectSettings {
    pub fn parse(text: &str) -> Self {
        Self { lines: text.split_inclusive('\n').map(String::from).collect() }
    }

    /// Read a settings file.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => SettingsError::FileNotFound(path.to_path_buf()),
            _ => SettingsError::Io { path: path.to_path_buf(), source: e },
        })?;
        Ok(Self::parse(&text))
    }

    /// Write the settings back in a single write.
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        fs::write(path, self.to_text())
            .map_err(|e| SettingsError::Io { path: path.to_path_buf(), source: e })
    }

    pub fn to_text(&self) -> String {
        self.lines.concat()
    }

    /// Index of the line holding `full_key`.
    fn find(&self, full_key: &str) -> Result<usize, SettingsError> {
        check_key(full_key)?;
        let mut section: Option<&str> = None;

        for (i, line) in self.lines.iter().enumerate() {
            if let Some(name) = section_header(line) {
                section = Some(name);
                continue;
            }
            if let Some((property, _)) = property_line(line) {
                if full_key_of(section, property) == full_key {
                    return Ok(i);
                }
            }
        }

        Err(SettingsError::KeyNotFound(full_key.to_string()))
    }

    /// Raw value text of an existing key (quotes included).
    pub fn get(&self, full_key: &str) -> Result<&str, SettingsError> {
        let index = self.find(full_key)?;
        property_line(&self.lines[index])
            .map(|(_, value)| value)
            .ok_or_else(|| SettingsError::KeyNotFound(full_key.to_string()))
    }

    /// Replace the value of an existing key in place.
    ///
    /// Leading indentation and the line terminator are preserved.
    pub fn set(&mut self, full_key: &str, value: &str) -> Result<(), SettingsError> {
        let index = self.find(full_key)?;
        let line = &self.lines[index];

        let indent_len = line.len() - line.trim_start().len();
        let ending = if line.ends_with("\r\n") {
            "\r\n"
        } else if line.ends_with('\n') {
            "\n"
        } else {
            ""
        };
        let property = property_line(line)
            .map(|(property, _)| property)
            .ok_or_else(|| SettingsError::KeyNotFound(full_key.to_string()))?;
        let updated = format!("{}{}={}{}", &line[..indent_len], property, value, ending);

        self.lines[index] = updated;
        log::debug!("updated {} at line {}", full_key, index + 1);
        Ok(())
    }
}
