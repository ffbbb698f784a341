use std::path::{Path, PathBuf};

/// Margin kept between the blob's edges and the window edges (pixels).
pub const PADDING: f32 = 20.0;
/// How far the blob swims away from the centre when poked (pixels).
pub const FLEE_DISTANCE: f32 = 300.0;
/// Delay before the wander loop retries after a failed move (seconds).
pub const RETRY_DELAY: f32 = 1.0;

/// Motion tunables for the wander loop, flee and resize correction.
#[derive(Debug, Clone, Copy)]
pub struct MotionConfig {
    pub padding: f32,
    /// Wander move duration range in seconds (min, max).
    pub wander_duration: (f32, f32),
    /// Wander rotation range in degrees (min, max).
    pub wander_rotation: (f32, f32),
    pub flee_distance: f32,
    pub flee_duration: f32,
    /// Flee rotation range in degrees (min, max).
    pub flee_rotation: (f32, f32),
    pub settle_duration: f32,
    pub resize_duration: f32,
    pub retry_delay: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            padding: PADDING,
            wander_duration: (5.0, 8.0),
            wander_rotation: (-15.0, 15.0),
            flee_distance: FLEE_DISTANCE,
            flee_duration: 2.0,
            flee_rotation: (-30.0, 30.0),
            settle_duration: 1.0,
            resize_duration: 0.5,
            retry_delay: RETRY_DELAY,
        }
    }
}

/// Volumes for the two clips. Ambience loops, the reaction is one-shot.
#[derive(Debug, Clone, Copy)]
pub struct AudioConfig {
    pub ambience_volume: f32,
    pub reaction_volume: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            ambience_volume: 0.5,
            reaction_volume: 0.7,
        }
    }
}

/// Asset file locations, already joined onto the asset root.
#[derive(Debug, Clone)]
pub struct AssetPaths {
    pub ambience: PathBuf,
    pub reaction: PathBuf,
    pub blob: PathBuf,
    pub background: PathBuf,
}

impl AssetPaths {
    pub fn under(root: &Path) -> Self {
        Self {
            ambience: root.join("beachsong.mp3"),
            reaction: root.join("laughh.mp3"),
            blob: root.join("blob.png"),
            background: root.join("ocean.png"),
        }
    }

    /// Every path, labelled, for diagnostics.
    pub fn all(&self) -> [(&'static str, &Path); 4] {
        [
            ("ambience", self.ambience.as_path()),
            ("reaction", self.reaction.as_path()),
            ("blob", self.blob.as_path()),
            ("background", self.background.as_path()),
        ]
    }
}

/// Everything the toy needs to start up.
#[derive(Debug, Clone)]
pub struct Config {
    pub title: &'static str,
    pub initial_size: (u32, u32),
    /// The blob image is scaled down so neither side exceeds this (pixels).
    pub max_blob_extent: f32,
    pub motion: MotionConfig,
    pub audio: AudioConfig,
    pub assets: AssetPaths,
}

impl Config {
    pub fn new(asset_root: &Path) -> Self {
        Self {
            title: "Blob",
            initial_size: (1280, 800),
            max_blob_extent: 180.0,
            motion: MotionConfig::default(),
            audio: AudioConfig::default(),
            assets: AssetPaths::under(asset_root),
        }
    }
}
