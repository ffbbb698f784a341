use glam::Vec2;

use crate::config::MotionConfig;
use crate::error::Result;
use crate::motion::{self, Bounds, ElementSize, Transform, Viewport};
use crate::tween::{Ease, TweenId, TweenProps, Tweener};

/// What the blob is doing right now.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionPhase {
    /// Constructed but `start` not called yet.
    Idle,
    Wandering,
    Fleeing,
    /// Rotation easing back to level after a flee.
    Settling,
    /// A move failed; waiting `remaining` seconds before retrying the wander.
    Recovering { remaining: f32 },
}

impl MotionPhase {
    pub fn label(self) -> &'static str {
        match self {
            MotionPhase::Idle => "Idle",
            MotionPhase::Wandering => "Wandering",
            MotionPhase::Fleeing => "Fleeing",
            MotionPhase::Settling => "Settling",
            MotionPhase::Recovering { .. } => "Recovering",
        }
    }
}

/// Owns the blob's transform and drives it through wander, flee and settle.
///
/// Exactly one tween at a time "owns" the phase (`owner`); its completion
/// drives the next transition. Resize corrections run alongside without
/// ownership and never trigger transitions.
pub struct BlobAnimator {
    transform: Transform,
    size: ElementSize,
    viewport: Viewport,
    bounds: Bounds,
    phase: MotionPhase,
    owner: Option<TweenId>,
    tweener: Tweener,
    rng: fastrand::Rng,
    cfg: MotionConfig,
    moves: u64,
}

impl BlobAnimator {
    pub fn new(viewport: Viewport, size: ElementSize, cfg: MotionConfig, rng: fastrand::Rng) -> Self {
        let start = motion::centered(viewport, size);
        log::info!(
            "Blob {}x{} placed at ({:.0}, {:.0}) in {}x{} viewport",
            size.width,
            size.height,
            start.x,
            start.y,
            viewport.width,
            viewport.height,
        );
        Self {
            transform: Transform::at(start),
            size,
            viewport,
            bounds: Bounds::new(viewport, size, cfg.padding),
            phase: MotionPhase::Idle,
            owner: None,
            tweener: Tweener::new(),
            rng,
            cfg,
            moves: 0,
        }
    }

    /// Kick off the wander loop.
    pub fn start(&mut self) {
        self.begin_wander();
    }

    /// Start the next wander move, or schedule a retry if it can't be computed.
    pub fn begin_wander(&mut self) {
        if let Err(e) = self.try_wander() {
            log::error!("Wander move failed, retrying in {:.1}s: {e}", self.cfg.retry_delay);
            self.owner = None;
            self.phase = MotionPhase::Recovering {
                remaining: self.cfg.retry_delay,
            };
        }
    }

    fn try_wander(&mut self) -> Result<()> {
        let target = motion::wander_target(&mut self.rng, &self.bounds, &self.cfg)?;
        let duration = motion::wander_duration(&mut self.rng, &self.cfg);
        let id = self.tweener.to(
            self.transform,
            TweenProps::full(target.pos.x, target.pos.y, target.rotation_deg),
            duration,
            Ease::SineInOut,
        );
        self.owner = Some(id);
        self.phase = MotionPhase::Wandering;
        self.moves += 1;
        log::debug!(
            "Wander -> ({:.0}, {:.0}) rot {:.1} over {:.1}s",
            target.pos.x,
            target.pos.y,
            target.rotation_deg,
            duration,
        );
        Ok(())
    }

    /// Swim away from the centre. Preempts whatever is running.
    pub fn flee(&mut self) {
        self.tweener.kill_all();
        self.owner = None;

        if let Err(e) = self.try_flee() {
            log::error!("Flee failed, resuming wander: {e}");
            self.begin_wander();
        }
    }

    fn try_flee(&mut self) -> Result<()> {
        let target = motion::flee_target(
            &mut self.rng,
            self.transform.pos,
            self.viewport,
            &self.bounds,
            &self.cfg,
        )?;
        let id = self.tweener.to(
            self.transform,
            TweenProps::full(target.pos.x, target.pos.y, target.rotation_deg),
            self.cfg.flee_duration,
            Ease::Power2Out,
        );
        self.owner = Some(id);
        self.phase = MotionPhase::Fleeing;
        log::info!("Blob fleeing to ({:.0}, {:.0})", target.pos.x, target.pos.y);
        Ok(())
    }

    fn settle(&mut self) {
        let id = self.tweener.to(
            self.transform,
            TweenProps::rotation(0.0),
            self.cfg.settle_duration,
            Ease::Power1InOut,
        );
        self.owner = Some(id);
        self.phase = MotionPhase::Settling;
    }

    /// Advance the clock by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        let completed = self.tweener.advance(dt, &mut self.transform);
        let owner_done = match self.owner {
            Some(id) => completed.contains(&id),
            None => false,
        };

        if owner_done {
            self.owner = None;
            match self.phase {
                MotionPhase::Wandering | MotionPhase::Settling => self.begin_wander(),
                MotionPhase::Fleeing => self.settle(),
                MotionPhase::Idle | MotionPhase::Recovering { .. } => {}
            }
            return;
        }

        if let MotionPhase::Recovering { remaining } = self.phase {
            let remaining = remaining - dt;
            if remaining <= 0.0 {
                self.begin_wander();
            } else {
                self.phase = MotionPhase::Recovering { remaining };
            }
        }
    }

    /// The window changed size. Pull the blob back in if it now overflows.
    pub fn on_resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.bounds = Bounds::new(viewport, self.size, self.cfg.padding);

        if let Some(fix) = motion::resize_correction(self.transform.pos, &self.bounds) {
            log::debug!(
                "Resize to {}x{}: correcting blob to ({:.0}, {:.0})",
                viewport.width,
                viewport.height,
                fix.x,
                fix.y,
            );
            self.tweener.to(
                self.transform,
                TweenProps::position(fix.x, fix.y),
                self.cfg.resize_duration,
                Ease::Power1Out,
            );
        }
    }

    /// Is `point` (window pixels) on the blob? Accounts for rotation.
    pub fn hit_test(&self, point: Vec2) -> bool {
        let half = self.size.as_vec2() * 0.5;
        let center = self.transform.pos + half;
        let local = Vec2::from_angle(-self.transform.rotation_deg.to_radians()).rotate(point - center);
        local.x.abs() <= half.x && local.y.abs() <= half.y
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn size(&self) -> ElementSize {
        self.size
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn phase(&self) -> MotionPhase {
        self.phase
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn active_tweens(&self) -> usize {
        self.tweener.active_count()
    }

    /// Number of wander moves started so far.
    pub fn moves(&self) -> u64 {
        self.moves
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn animator(seed: u64) -> BlobAnimator {
        BlobAnimator::new(
            Viewport::new(800.0, 600.0),
            ElementSize::new(100.0, 100.0),
            MotionConfig::default(),
            fastrand::Rng::with_seed(seed),
        )
    }

    #[test]
    fn starts_centred_and_idle() {
        let a = animator(1);
        assert_eq!(a.transform().pos, Vec2::new(350.0, 250.0));
        assert_eq!(a.phase(), MotionPhase::Idle);
        assert_eq!(a.active_tweens(), 0);
    }

    #[test]
    fn wander_loop_keeps_going_and_stays_in_bounds() {
        let mut a = animator(2);
        a.start();
        assert_eq!(a.phase(), MotionPhase::Wandering);

        // Two minutes at 60 fps is well over a dozen moves.
        for _ in 0..(60 * 120) {
            a.update(1.0 / 60.0);
            assert!(a.active_tweens() <= 1);
            assert_eq!(a.phase(), MotionPhase::Wandering);
        }
        assert!(a.moves() >= 15, "only {} moves", a.moves());
        assert!(a.bounds().contains(a.transform().pos));
    }

    #[test]
    fn flee_preempts_wander_then_settles_then_wanders() {
        let mut a = animator(3);
        a.start();
        a.update(1.0);

        a.flee();
        assert_eq!(a.phase(), MotionPhase::Fleeing);
        assert_eq!(a.active_tweens(), 1);

        a.update(1.0);
        assert_eq!(a.phase(), MotionPhase::Fleeing);
        a.update(1.01);
        assert_eq!(a.phase(), MotionPhase::Settling);
        assert_eq!(a.active_tweens(), 1);
        assert!(a.bounds().contains(a.transform().pos));

        a.update(1.01);
        assert_eq!(a.transform().rotation_deg, 0.0);
        assert_eq!(a.phase(), MotionPhase::Wandering);
        assert_eq!(a.active_tweens(), 1);
    }

    #[test]
    fn flee_from_centre_lands_right_of_centre() {
        let mut a = animator(4);
        a.start();
        a.transform.pos = a.viewport().center();
        a.flee();
        a.update(2.0);
        let pos = a.transform().pos;
        assert_eq!(pos, Vec2::new(680.0, 300.0));
        assert!(a.bounds().contains(pos));
    }

    #[test]
    fn repeated_flee_never_stacks_tweens() {
        let mut a = animator(5);
        a.start();
        for _ in 0..10 {
            a.flee();
            a.update(0.1);
            assert_eq!(a.active_tweens(), 1);
        }
    }

    #[test]
    fn failed_wander_retries_after_delay() {
        let mut a = BlobAnimator::new(
            Viewport::new(100.0, 100.0),
            ElementSize::new(100.0, 100.0),
            MotionConfig::default(),
            fastrand::Rng::with_seed(6),
        );
        a.start();
        assert!(matches!(a.phase(), MotionPhase::Recovering { .. }));
        assert_eq!(a.active_tweens(), 0);

        // Window grows while we wait; the retry succeeds.
        a.on_resize(Viewport::new(800.0, 600.0));
        a.update(0.5);
        assert!(matches!(a.phase(), MotionPhase::Recovering { .. }));
        a.update(0.6);
        assert_eq!(a.phase(), MotionPhase::Wandering);
    }

    #[test]
    fn failed_flee_falls_back_to_wander() {
        let mut a = animator(7);
        a.start();
        a.on_resize(Viewport::new(90.0, 90.0));
        a.flee();
        // Viewport too small for anything: wander retry is scheduled.
        assert!(matches!(a.phase(), MotionPhase::Recovering { .. }));
        assert_eq!(a.active_tweens(), 0);
    }

    #[test]
    fn resize_pulls_overflowing_blob_back() {
        let mut a = animator(8);
        // Centre of 800x600 is (350, 250); shrink so max becomes (180, 180).
        a.on_resize(Viewport::new(300.0, 300.0));
        assert_eq!(a.active_tweens(), 1);
        a.update(0.6);
        assert_eq!(a.transform().pos, Vec2::new(180.0, 180.0));
        assert_eq!(a.active_tweens(), 0);
    }

    #[test]
    fn resize_is_idempotent_for_in_bounds_blob() {
        let mut a = animator(9);
        let vp = Viewport::new(1024.0, 768.0);
        a.on_resize(vp);
        a.on_resize(vp);
        assert_eq!(a.active_tweens(), 0);
        assert_eq!(a.transform().pos, Vec2::new(350.0, 250.0));
    }

    #[test]
    fn resize_does_not_cancel_wander() {
        let mut a = animator(10);
        a.start();
        a.on_resize(Viewport::new(300.0, 300.0));
        assert_eq!(a.phase(), MotionPhase::Wandering);
        assert_eq!(a.active_tweens(), 2);
    }

    #[test]
    fn hit_test_respects_rotation() {
        let a = animator(11);
        // Blob spans (350..450, 250..350).
        assert!(a.hit_test(Vec2::new(400.0, 300.0)));
        assert!(a.hit_test(Vec2::new(351.0, 251.0)));
        assert!(!a.hit_test(Vec2::new(349.0, 300.0)));

        let mut b = animator(12);
        b.transform.rotation_deg = 45.0;
        // The unrotated corner is outside a 45 degree diamond.
        assert!(!b.hit_test(Vec2::new(352.0, 252.0)));
        assert!(b.hit_test(Vec2::new(400.0, 300.0)));
    }
}
