use glam::Vec2;

use crate::audio::{AudioBackend, SoundBoard};
use crate::blob::BlobAnimator;
use crate::motion::Viewport;

/// The blob and its sounds. Owns every handle the event handlers touch.
pub struct BlobToy<B: AudioBackend> {
    pub animator: BlobAnimator,
    pub sounds: SoundBoard<B>,
}

impl<B: AudioBackend> BlobToy<B> {
    /// Start swimming and try to get the ambience going.
    pub fn new(mut animator: BlobAnimator, mut sounds: SoundBoard<B>) -> Self {
        animator.start();
        sounds.try_autoplay();
        Self { animator, sounds }
    }

    /// A press or touch at `point`. Any press unlocks the ambience; a press on
    /// the blob makes it swim away. Returns true if the blob was hit.
    pub fn on_pointer_down(&mut self, point: Vec2) -> bool {
        self.sounds.on_first_gesture();
        if !self.animator.hit_test(point) {
            return false;
        }
        self.poke();
        true
    }

    /// Laugh and flee. The sound never holds up the motion.
    pub fn poke(&mut self) {
        self.animator.flee();
        self.sounds.play_reaction();
    }

    pub fn on_resize(&mut self, viewport: Viewport) {
        self.animator.on_resize(viewport);
    }

    pub fn update(&mut self, dt: f32) {
        self.animator.update(dt);
    }

    pub fn shutdown(&mut self) {
        self.sounds.stop_all();
        log::info!("Blob retired after {} wander moves", self.animator.moves());
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::audio::mock::MockBackend;
    use crate::audio::{Clip, ClipState};
    use crate::blob::MotionPhase;
    use crate::config::{AssetPaths, AudioConfig, MotionConfig};
    use crate::motion::ElementSize;

    fn toy(asset_root: &str) -> BlobToy<MockBackend> {
        let animator = BlobAnimator::new(
            Viewport::new(800.0, 600.0),
            ElementSize::new(100.0, 100.0),
            MotionConfig::default(),
            fastrand::Rng::with_seed(42),
        );
        let sounds = SoundBoard::new(
            MockBackend::default(),
            &AssetPaths::under(Path::new(asset_root)),
            &AudioConfig::default(),
        );
        BlobToy::new(animator, sounds)
    }

    #[test]
    fn starts_wandering_with_ambience() {
        let t = toy("assets");
        assert_eq!(t.animator.phase(), MotionPhase::Wandering);
        assert_eq!(t.sounds.state(Clip::Ambience), ClipState::Playing);
    }

    #[test]
    fn press_on_blob_flees_and_laughs() {
        let mut t = toy("assets");
        // Blob starts at (350, 250) with size 100.
        assert!(t.on_pointer_down(Vec2::new(400.0, 300.0)));
        assert_eq!(t.animator.phase(), MotionPhase::Fleeing);
        assert_eq!(t.sounds.state(Clip::Reaction), ClipState::Playing);
    }

    #[test]
    fn press_elsewhere_only_unlocks_audio() {
        let mut t = toy("assets");
        assert!(!t.on_pointer_down(Vec2::new(5.0, 5.0)));
        assert_eq!(t.animator.phase(), MotionPhase::Wandering);
        assert!(!t.sounds.gesture_pending());
    }

    #[test]
    fn flee_completes_without_reaction_audio() {
        let mut t = toy("missing");
        assert_eq!(t.sounds.state(Clip::Reaction), ClipState::Unloaded);

        assert!(t.on_pointer_down(Vec2::new(400.0, 300.0)));
        assert_eq!(t.animator.phase(), MotionPhase::Fleeing);
        t.update(2.0);
        assert_eq!(t.animator.phase(), MotionPhase::Settling);
        t.update(1.0);
        assert_eq!(t.animator.phase(), MotionPhase::Wandering);
        assert!(t.animator.bounds().contains(t.animator.transform().pos));
    }

    #[test]
    fn shutdown_stops_ambience() {
        let mut t = toy("assets");
        t.shutdown();
        assert_eq!(t.sounds.state(Clip::Ambience), ClipState::Stopped);
    }
}
