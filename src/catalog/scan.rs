//! Directory scanner producing a catalog.
//!
//! Walks a media directory, detects type by extension, and probes image
//! headers so corrupt files never reach the page. Captions come from file
//! stems. Items are ordered alphabetically by path.

use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::models::{MediaItem, MediaKind};

use super::{Catalog, CatalogError};

/// Scans `root` recursively and builds a catalog from every readable media
/// file under it.
pub fn scan_directory(root: &Path) -> Result<Catalog, CatalogError> {
    if !root.is_dir() {
        return Err(CatalogError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("not a directory: {}", root.display()),
        )));
    }

    let mut found: Vec<(PathBuf, MediaKind)> = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("skipping unreadable entry: {err}");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let Some(kind) = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(MediaKind::from_extension)
        else {
            debug!("skipping non-media file {}", path.display());
            continue;
        };
        // Videos are probed by the player at playback time; images we can
        // check cheaply here with a header read.
        if kind == MediaKind::Image {
            if let Err(err) = image::image_dimensions(path) {
                warn!("skipping unreadable image {}: {err}", path.display());
                continue;
            }
        }
        found.push((path.to_path_buf(), kind));
    }

    found.sort();
    let items: Vec<MediaItem> = found
        .into_iter()
        .map(|(path, kind)| {
            let caption = caption_from(&path);
            let source = path.to_string_lossy().into_owned();
            match kind {
                MediaKind::Image => MediaItem::image(source, caption),
                MediaKind::Video => MediaItem::video(source, caption, None),
            }
        })
        .collect();

    info!("scanned {} media items under {}", items.len(), root.display());
    Ok(Catalog::new(items))
}

/// File stem with separators spaced out: `saam-2.webp` -> `saam 2`.
fn caption_from(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(|stem| stem.replace(['_', '-'], " "))
        .unwrap_or_default()
}
