use std::path::{Path, PathBuf};
use std::thread;

use image::{ImageReader, RgbaImage};

use crate::config::AssetPaths;
use crate::error::{BlobError, Result};

const ASSET_DIR: &str = "assets";

/// `assets/` next to the executable if it exists, otherwise under the working directory.
pub fn resolve_root() -> PathBuf {
    let beside_exe = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(ASSET_DIR)));
    match beside_exe {
        Some(dir) if dir.is_dir() => dir,
        _ => PathBuf::from(ASSET_DIR),
    }
}

/// Decode a PNG into RGBA8. The error carries the path; callers decide how fatal it is.
pub fn load_rgba(path: &Path) -> std::result::Result<RgbaImage, String> {
    let reader = ImageReader::open(path).map_err(|e| format!("open failed: {e}"))?;
    let decoded = reader.decode().map_err(|e| format!("decode failed: {e}"))?;
    Ok(decoded.to_rgba8())
}

/// Load the blob sprite. Without it there is nothing to animate.
pub fn load_blob(path: &Path) -> Result<RgbaImage> {
    load_rgba(path).map_err(|reason| BlobError::MissingElement {
        path: path.to_path_buf(),
        reason,
    })
}

/// Load the background. Failure is survivable: the ocean falls back to a flat colour.
pub fn load_background(path: &Path) -> Option<RgbaImage> {
    match load_rgba(path) {
        Ok(img) => Some(img),
        Err(reason) => {
            let err = BlobError::Asset {
                path: path.to_path_buf(),
                reason,
            };
            log::warn!("Background unavailable, using plain water: {err}");
            None
        }
    }
}

/// Scale (w, h) down, preserving aspect ratio, so neither side exceeds `max_extent`.
pub fn fit_within(w: u32, h: u32, max_extent: f32) -> (f32, f32) {
    let (w, h) = (w as f32, h as f32);
    let longest = w.max(h);
    if longest <= max_extent || longest <= 0.0 {
        return (w, h);
    }
    let k = max_extent / longest;
    (w * k, h * k)
}

/// Check on a background thread that every asset is where we expect.
/// Purely diagnostic: startup never waits on this.
pub fn probe(paths: &AssetPaths) -> Option<thread::JoinHandle<usize>> {
    let entries: Vec<(&'static str, PathBuf)> = paths
        .all()
        .iter()
        .map(|(label, p)| (*label, p.to_path_buf()))
        .collect();

    let spawned = thread::Builder::new()
        .name("asset-probe".into())
        .spawn(move || {
            let mut missing = 0;
            for (label, path) in &entries {
                if path.is_file() {
                    log::debug!("Asset {label} found at {path:?}");
                } else {
                    log::warn!("Asset {label} missing at {path:?}");
                    missing += 1;
                }
            }
            missing
        });

    match spawned {
        Ok(handle) => Some(handle),
        Err(e) => {
            log::warn!("Could not spawn asset probe: {e}");
            None
        }
    }
}
