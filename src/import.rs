//! Batch import of a directory of images.
//!
//! ```text
//! dir/ ──walk──► JPEG/TIFF paths (sorted)
//!                   │ hash (parallel)
//!                   ▼
//!             dedup by fingerprint, first path wins
//!                   │ extract + apply (parallel)
//!                   ▼
//!             ImportManifest { images, duplicates }
//! ```
//!
//! Every unique file becomes a new [`CaptionedImage`] titled after its file
//! name, populated through the create-time merge rule, with an upload path
//! from [`naming::upload_path`](crate::naming::upload_path). Files are
//! processed in parallel with rayon; the manifest keeps the sorted walk
//! order.

use crate::config::Config;
use crate::exif::ExifError;
use crate::fingerprint::hash_reader;
use crate::naming::{NamingError, upload_path};
use crate::record::CaptionedImage;
use chrono::{NaiveDateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Extensions of the containers metadata can be read from.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "tif", "tiff"];

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Metadata error in {path}: {source}")]
    Metadata { path: PathBuf, source: ExifError },
    #[error("Cannot name {path}: {source}")]
    Naming { path: PathBuf, source: NamingError },
}

/// One imported image.
#[derive(Debug, Clone, Serialize)]
pub struct ImportEntry {
    pub source: PathBuf,
    pub file_hash: String,
    pub upload_path: String,
    pub image: CaptionedImage,
}

/// A file skipped because an earlier file had the same contents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Duplicate {
    pub source: PathBuf,
    pub original: PathBuf,
    pub file_hash: String,
}

/// Result of importing a directory.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportManifest {
    pub images: Vec<ImportEntry>,
    pub duplicates: Vec<Duplicate>,
}

/// Import every JPEG/TIFF under `dir`, using the current UTC time for
/// date-based upload folders.
pub fn import_dir(dir: &Path, config: &Config) -> Result<ImportManifest, ImportError> {
    import_dir_at(dir, config, Utc::now().naive_utc())
}

/// [`import_dir`] with an explicit import time.
pub fn import_dir_at(
    dir: &Path,
    config: &Config,
    now: NaiveDateTime,
) -> Result<ImportManifest, ImportError> {
    let paths = find_images(dir)?;

    let hashed = paths
        .par_iter()
        .map(|path| -> Result<_, ImportError> {
            let hash = hash_reader(&mut File::open(path)?)?;
            Ok((path, hash))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut seen: HashMap<&str, &Path> = HashMap::new();
    let mut unique = Vec::new();
    let mut duplicates = Vec::new();
    for (path, hash) in &hashed {
        match seen.get(hash.as_str()) {
            Some(original) => {
                debug!("Skipping {}: same contents as {}", path.display(), original.display());
                duplicates.push(Duplicate {
                    source: path.to_path_buf(),
                    original: original.to_path_buf(),
                    file_hash: hash.clone(),
                });
            }
            None => {
                seen.insert(hash.as_str(), path.as_path());
                unique.push((*path, hash));
            }
        }
    }

    let images = unique
        .par_iter()
        .map(|(path, hash)| import_file(path, hash, config, now))
        .collect::<Result<Vec<_>, _>>()?;

    info!(
        "Imported {} images ({} duplicates skipped)",
        images.len(),
        duplicates.len()
    );
    Ok(ImportManifest { images, duplicates })
}

fn import_file(
    path: &Path,
    hash: &str,
    config: &Config,
    now: NaiveDateTime,
) -> Result<ImportEntry, ImportError> {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut reader = BufReader::new(File::open(path)?);
    let image = CaptionedImage::create(filename.as_str(), &mut reader, config.extract.exif)
        .map_err(|source| ImportError::Metadata {
            path: path.to_path_buf(),
            source,
        })?;
    let upload_path =
        upload_path(&filename, &config.upload, now).map_err(|source| ImportError::Naming {
            path: path.to_path_buf(),
            source,
        })?;

    debug!("Imported {} as {upload_path}", path.display());
    Ok(ImportEntry {
        source: path.to_path_buf(),
        file_hash: hash.to_string(),
        upload_path,
        image,
    })
}

/// All JPEG/TIFF files below `dir`, sorted by path.
pub fn find_images(dir: &Path) -> Result<Vec<PathBuf>, ImportError> {
    let mut paths = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry?;
        if entry.file_type().is_file() && is_image(entry.path()) {
            paths.push(entry.into_path());
        }
    }
    paths.sort();
    Ok(paths)
}

fn is_image(path: &Path) -> bool {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    IMAGE_EXTENSIONS.contains(&ext.as_str())
}
