use std::path::PathBuf;

use thiserror::Error;

use crate::motion::MotionError;

/// Everything that can go wrong, split by how much of the toy it takes down.
#[derive(Debug, Error)]
pub enum BlobError {
    /// GPU or audio output could not be brought up. Nothing else can run.
    #[error("{what} unavailable: {reason}")]
    MissingCollaborator { what: &'static str, reason: String },

    /// The blob image itself is missing or undecodable.
    #[error("blob image {path:?} could not be loaded: {reason}")]
    MissingElement { path: PathBuf, reason: String },

    /// Optional asset (audio clip, background). The feature degrades.
    #[error("asset {path:?} could not be loaded: {reason}")]
    Asset { path: PathBuf, reason: String },

    #[error("audio playback failed: {0}")]
    Playback(String),

    #[error(transparent)]
    Motion(#[from] MotionError),

    #[error("event loop failed: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}

impl BlobError {
    /// Fatal errors abort startup; the rest are logged and survived.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            BlobError::MissingCollaborator { .. }
                | BlobError::MissingElement { .. }
                | BlobError::EventLoop(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, BlobError>;
