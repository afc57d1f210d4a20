//! Storage-safe upload paths for imported originals.
//!
//! ```text
//! <folder>[/<date_path>]/<filename>
//! original_images/2024/03/Harbour_at_dusk.jpg
//! ```
//!
//! The filename is cleaned for storage (spaces become underscores, anything
//! other than word characters, `-` and `.` is dropped, non-ASCII becomes `_`)
//! and its stem is shortened so the whole path stays below
//! [`MAX_PATH_CHARS`] characters.

use crate::config::UploadConfig;
use chrono::NaiveDateTime;
use std::fmt::Write;
use thiserror::Error;

/// Upper bound (exclusive) on the length of an upload path.
pub const MAX_PATH_CHARS: usize = 95;

#[derive(Error, Debug, PartialEq)]
pub enum NamingError {
    #[error("Could not derive a valid file name from {0:?}")]
    InvalidName(String),
    #[error("Invalid date path pattern: {0:?}")]
    InvalidDatePath(String),
}

/// Build the storage path for an uploaded file.
///
/// `now` is only used when the config has a `date_path` pattern.
pub fn upload_path(
    filename: &str,
    config: &UploadConfig,
    now: NaiveDateTime,
) -> Result<String, NamingError> {
    let mut folder = config.folder.trim().trim_end_matches('/').to_string();
    if let Some(pattern) = &config.date_path {
        let mut date_path = String::new();
        write!(date_path, "{}", now.format(pattern))
            .map_err(|_| NamingError::InvalidDatePath(pattern.clone()))?;
        folder = format!("{folder}/{date_path}");
    }

    let filename = ascii_name(&valid_name(filename)?);
    let full_path = format!("{folder}/{filename}");
    let length = full_path.chars().count();
    if length < MAX_PATH_CHARS {
        return Ok(full_path);
    }

    let trim = length - (MAX_PATH_CHARS - 1);
    let (stem, extension) = split_extension(&filename);
    let keep = stem.len().saturating_sub(trim);
    Ok(format!("{folder}/{}{extension}", &stem[..keep]))
}

/// Clean a file name for storage: trim, spaces to underscores, and drop
/// everything except word characters, `-` and `.`.
pub fn valid_name(name: &str) -> Result<String, NamingError> {
    let cleaned: String = name
        .trim()
        .replace(' ', "_")
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
        .collect();
    match cleaned.as_str() {
        "" | "." | ".." => Err(NamingError::InvalidName(name.to_string())),
        _ => Ok(cleaned),
    }
}

fn ascii_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii() { c } else { '_' })
        .collect()
}

/// Split `name.ext` into `("name", ".ext")`. Leading dots do not start an
/// extension.
fn split_extension(name: &str) -> (&str, &str) {
    let leading = name.len() - name.trim_start_matches('.').len();
    match name[leading..].rfind('.') {
        Some(i) => name.split_at(leading + i),
        None => (name, ""),
    }
}
