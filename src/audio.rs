use std::fs;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};

use crate::config::{AssetPaths, AudioConfig};
use crate::error::{BlobError, Result};

/// Lifecycle of one clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipState {
    /// Never loaded, or failed to load.
    Unloaded,
    Loaded,
    Playing,
    Stopped,
}

/// How to load and play a clip.
#[derive(Debug, Clone)]
pub struct ClipSpec {
    pub path: PathBuf,
    pub looping: bool,
    pub volume: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipId(pub usize);

/// Whatever actually makes noise.
pub trait AudioBackend {
    /// Load a clip. Missing or undecodable media is an `Asset` error.
    fn load(&mut self, spec: &ClipSpec) -> Result<ClipId>;
    fn play(&mut self, clip: ClipId) -> Result<()>;
    fn is_playing(&self, clip: ClipId) -> bool;
    fn stop(&mut self, clip: ClipId);
}

// ---------------------------------------------------------------------------
// rodio backend
// ---------------------------------------------------------------------------

struct LoadedClip {
    bytes: Arc<[u8]>,
    looping: bool,
    volume: f32,
    /// Persistent sink for looping clips; one-shots detach a fresh sink per play.
    sink: Option<Sink>,
    last_one_shot: Option<Sink>,
}

/// Plays clips through the default output device.
pub struct RodioBackend {
    // Dropping the stream silences everything, so it lives as long as we do.
    _stream: OutputStream,
    handle: OutputStreamHandle,
    clips: Vec<LoadedClip>,
}

impl RodioBackend {
    pub fn new() -> Result<Self> {
        let (stream, handle) =
            OutputStream::try_default().map_err(|e| BlobError::MissingCollaborator {
                what: "audio output",
                reason: e.to_string(),
            })?;
        log::info!("Audio output stream opened");
        Ok(Self {
            _stream: stream,
            handle,
            clips: Vec::with_capacity(2),
        })
    }

    fn decoder(bytes: &Arc<[u8]>) -> std::result::Result<Decoder<Cursor<Arc<[u8]>>>, rodio::decoder::DecoderError> {
        Decoder::new(Cursor::new(Arc::clone(bytes)))
    }

    fn new_sink(&self, volume: f32) -> Result<Sink> {
        let sink = Sink::try_new(&self.handle).map_err(|e| BlobError::Playback(e.to_string()))?;
        sink.set_volume(volume);
        Ok(sink)
    }
}

impl AudioBackend for RodioBackend {
    fn load(&mut self, spec: &ClipSpec) -> Result<ClipId> {
        let asset_err = |reason: String| BlobError::Asset {
            path: spec.path.clone(),
            reason,
        };
        let bytes: Arc<[u8]> = fs::read(&spec.path)
            .map_err(|e| asset_err(e.to_string()))?
            .into();
        // Decode once up front so a bad file fails here rather than on first play.
        Self::decoder(&bytes).map_err(|e| asset_err(e.to_string()))?;

        let id = ClipId(self.clips.len());
        self.clips.push(LoadedClip {
            bytes,
            looping: spec.looping,
            volume: spec.volume,
            sink: None,
            last_one_shot: None,
        });
        Ok(id)
    }

    fn play(&mut self, clip: ClipId) -> Result<()> {
        let (bytes, looping, volume) = match self.clips.get(clip.0) {
            Some(c) => (Arc::clone(&c.bytes), c.looping, c.volume),
            None => return Err(BlobError::Playback(format!("unknown clip {}", clip.0))),
        };
        let source = Self::decoder(&bytes).map_err(|e| BlobError::Playback(e.to_string()))?;
        let sink = self.new_sink(volume)?;

        if looping {
            sink.append(source.repeat_infinite());
            if let Some(old) = self.clips[clip.0].sink.replace(sink) {
                old.stop();
            }
        } else {
            sink.append(source);
            // Keep a handle to the newest instance for `is_playing`; older
            // instances keep playing detached so triggers layer.
            if let Some(prev) = self.clips[clip.0].last_one_shot.replace(sink) {
                prev.detach();
            }
        }
        Ok(())
    }

    fn is_playing(&self, clip: ClipId) -> bool {
        self.clips.get(clip.0).is_some_and(|c| {
            c.sink
                .as_ref()
                .or(c.last_one_shot.as_ref())
                .is_some_and(|s| !s.empty() && !s.is_paused())
        })
    }

    fn stop(&mut self, clip: ClipId) {
        if let Some(c) = self.clips.get_mut(clip.0) {
            if let Some(sink) = c.sink.take() {
                sink.stop();
            }
            if let Some(sink) = c.last_one_shot.take() {
                sink.stop();
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Sound board
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clip {
    /// Looping background track.
    Ambience,
    /// One-shot played when the blob is poked.
    Reaction,
}

struct Slot {
    label: &'static str,
    id: Option<ClipId>,
    state: ClipState,
}

impl Slot {
    fn load<B: AudioBackend>(backend: &mut B, label: &'static str, spec: &ClipSpec) -> Self {
        match backend.load(spec) {
            Ok(id) => {
                log::info!("Loaded {label} clip from {:?}", spec.path);
                Self {
                    label,
                    id: Some(id),
                    state: ClipState::Loaded,
                }
            }
            Err(e) => {
                log::warn!("Error loading {label} clip: {e}");
                Self {
                    label,
                    id: None,
                    state: ClipState::Unloaded,
                }
            }
        }
    }
}

/// The two clips plus the autoplay / first-gesture bookkeeping.
pub struct SoundBoard<B: AudioBackend> {
    pub(crate) backend: B,
    ambience: Slot,
    reaction: Slot,
    /// Armed until the first pointer press anywhere.
    gesture_pending: bool,
}

impl<B: AudioBackend> SoundBoard<B> {
    /// Load both clips. Load failures are logged; the clip stays silent.
    pub fn new(mut backend: B, paths: &AssetPaths, cfg: &AudioConfig) -> Self {
        let ambience = Slot::load(
            &mut backend,
            "ambience",
            &ClipSpec {
                path: paths.ambience.clone(),
                looping: true,
                volume: cfg.ambience_volume,
            },
        );
        let reaction = Slot::load(
            &mut backend,
            "reaction",
            &ClipSpec {
                path: paths.reaction.clone(),
                looping: false,
                volume: cfg.reaction_volume,
            },
        );
        Self {
            backend,
            ambience,
            reaction,
            gesture_pending: true,
        }
    }

    fn slot(&self, clip: Clip) -> &Slot {
        match clip {
            Clip::Ambience => &self.ambience,
            Clip::Reaction => &self.reaction,
        }
    }

    fn play(&mut self, clip: Clip) -> Result<()> {
        let slot = match clip {
            Clip::Ambience => &mut self.ambience,
            Clip::Reaction => &mut self.reaction,
        };
        let Some(id) = slot.id else {
            return Err(BlobError::Playback(format!("{} clip is not loaded", slot.label)));
        };
        self.backend.play(id)?;
        slot.state = ClipState::Playing;
        Ok(())
    }

    /// Try to start the ambience right away. The first gesture retries if this fails.
    pub fn try_autoplay(&mut self) {
        match self.play(Clip::Ambience) {
            Ok(()) => log::info!("Ambience autoplay started"),
            Err(e) => log::info!("Ambience autoplay deferred until first click: {e}"),
        }
    }

    /// Call on every pointer press. Only the first one does anything.
    pub fn on_first_gesture(&mut self) {
        if !self.gesture_pending {
            return;
        }
        self.gesture_pending = false;

        if self.state(Clip::Ambience) == ClipState::Playing {
            return;
        }
        if let Err(e) = self.play(Clip::Ambience) {
            log::warn!("Ambience could not start on first gesture: {e}");
        }
    }

    /// Fire-and-forget reaction sound. Overlapping calls layer.
    pub fn play_reaction(&mut self) {
        if let Err(e) = self.play(Clip::Reaction) {
            log::warn!("Reaction sound failed: {e}");
        }
    }

    pub fn stop_all(&mut self) {
        for slot in [&mut self.ambience, &mut self.reaction] {
            if let Some(id) = slot.id {
                self.backend.stop(id);
                slot.state = ClipState::Stopped;
            }
        }
    }

    /// Current state, with finished one-shots reported as `Stopped`.
    pub fn state(&self, clip: Clip) -> ClipState {
        let slot = self.slot(clip);
        match (slot.state, slot.id) {
            (ClipState::Playing, Some(id)) if !self.backend.is_playing(id) => ClipState::Stopped,
            (state, _) => state,
        }
    }

    pub fn gesture_pending(&self) -> bool {
        self.gesture_pending
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;

    /// Records what was asked of it. Clips whose path contains "missing" fail to load.
    #[derive(Default)]
    pub struct MockBackend {
        pub loaded: Vec<ClipSpec>,
        pub plays: Vec<ClipId>,
        pub playing: Vec<bool>,
        pub fail_play: bool,
    }

    impl AudioBackend for MockBackend {
        fn load(&mut self, spec: &ClipSpec) -> Result<ClipId> {
            if spec.path.to_string_lossy().contains("missing") {
                return Err(BlobError::Asset {
                    path: spec.path.clone(),
                    reason: "not found".into(),
                });
            }
            self.loaded.push(spec.clone());
            self.playing.push(false);
            Ok(ClipId(self.loaded.len() - 1))
        }

        fn play(&mut self, clip: ClipId) -> Result<()> {
            if self.fail_play {
                return Err(BlobError::Playback("blocked".into()));
            }
            self.plays.push(clip);
            self.playing[clip.0] = true;
            Ok(())
        }

        fn is_playing(&self, clip: ClipId) -> bool {
            self.playing[clip.0]
        }

        fn stop(&mut self, clip: ClipId) {
            self.playing[clip.0] = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::mock::MockBackend;
    use super::*;

    fn board(root: &str, backend: MockBackend) -> SoundBoard<MockBackend> {
        SoundBoard::new(backend, &AssetPaths::under(Path::new(root)), &AudioConfig::default())
    }

    #[test]
    fn clips_load_with_expected_settings() {
        let b = board("assets", MockBackend::default());
        assert_eq!(b.backend.loaded.len(), 2);
        assert!(b.backend.loaded[0].looping);
        assert_eq!(b.backend.loaded[0].volume, 0.5);
        assert!(!b.backend.loaded[1].looping);
        assert_eq!(b.backend.loaded[1].volume, 0.7);
        assert_eq!(b.state(Clip::Ambience), ClipState::Loaded);
        assert_eq!(b.state(Clip::Reaction), ClipState::Loaded);
    }

    #[test]
    fn autoplay_success_means_gesture_does_not_restart() {
        let mut b = board("assets", MockBackend::default());
        b.try_autoplay();
        assert_eq!(b.state(Clip::Ambience), ClipState::Playing);
        b.on_first_gesture();
        assert_eq!(b.backend.plays.len(), 1);
    }

    #[test]
    fn blocked_autoplay_falls_back_to_first_gesture_once() {
        let mut b = board("assets", MockBackend {
            fail_play: true,
            ..Default::default()
        });
        b.try_autoplay();
        assert_eq!(b.state(Clip::Ambience), ClipState::Loaded);

        b.backend.fail_play = false;
        b.on_first_gesture();
        assert_eq!(b.state(Clip::Ambience), ClipState::Playing);
        assert!(!b.gesture_pending());

        b.stop_all();
        b.on_first_gesture();
        assert_eq!(b.backend.plays.len(), 1);
        assert_eq!(b.state(Clip::Ambience), ClipState::Stopped);
    }

    #[test]
    fn reaction_layers_and_reports_stopped_when_done() {
        let mut b = board("assets", MockBackend::default());
        b.play_reaction();
        b.play_reaction();
        assert_eq!(b.backend.plays, vec![ClipId(1), ClipId(1)]);
        assert_eq!(b.state(Clip::Reaction), ClipState::Playing);

        b.backend.playing[1] = false;
        assert_eq!(b.state(Clip::Reaction), ClipState::Stopped);
    }

    #[test]
    fn missing_clips_degrade_to_silence() {
        let mut b = board("missing", MockBackend::default());
        assert_eq!(b.state(Clip::Ambience), ClipState::Unloaded);
        assert_eq!(b.state(Clip::Reaction), ClipState::Unloaded);
        b.try_autoplay();
        b.on_first_gesture();
        b.play_reaction();
        assert!(b.backend.plays.is_empty());
    }
}
