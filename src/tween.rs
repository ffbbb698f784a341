use std::f32::consts::PI;

use crate::motion::Transform;

/// Easing curves, named after the tweening-library conventions they mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ease {
    /// Smooth start and stop. Used for wandering.
    SineInOut,
    /// Quadratic in-out. Used for settling rotation.
    Power1InOut,
    /// Quadratic decelerate. Default for short corrections.
    Power1Out,
    /// Cubic decelerate. Used for fleeing.
    Power2Out,
}

impl Ease {
    /// Map linear progress `t` in [0, 1] to eased progress.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::SineInOut => -((PI * t).cos() - 1.0) * 0.5,
            Ease::Power1InOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) * 0.5
                }
            }
            Ease::Power1Out => 1.0 - (1.0 - t).powi(2),
            Ease::Power2Out => 1.0 - (1.0 - t).powi(3),
        }
    }
}

/// Channels a tween drives. `None` channels are left alone.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TweenProps {
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub rotation_deg: Option<f32>,
}

impl TweenProps {
    pub fn position(x: f32, y: f32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            rotation_deg: None,
        }
    }

    pub fn full(x: f32, y: f32, rotation_deg: f32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            rotation_deg: Some(rotation_deg),
        }
    }

    pub fn rotation(rotation_deg: f32) -> Self {
        Self {
            rotation_deg: Some(rotation_deg),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TweenId(u64);

#[derive(Debug, Clone, Copy)]
struct Tween {
    id: TweenId,
    from: Transform,
    to: TweenProps,
    duration: f32,
    elapsed: f32,
    ease: Ease,
}

impl Tween {
    /// Write this tween's channels at its current progress. Returns true once finished.
    fn apply(&self, target: &mut Transform) -> bool {
        let progress = if self.duration > 0.0 {
            (self.elapsed / self.duration).min(1.0)
        } else {
            1.0
        };
        let done = progress >= 1.0;
        // Land exactly on the end values instead of trusting the curve at t=1.
        let k = if done { 1.0 } else { self.ease.apply(progress) };
        let lerp = |a: f32, b: f32| if done { b } else { a + (b - a) * k };

        if let Some(x) = self.to.x {
            target.pos.x = lerp(self.from.pos.x, x);
        }
        if let Some(y) = self.to.y {
            target.pos.y = lerp(self.from.pos.y, y);
        }
        if let Some(r) = self.to.rotation_deg {
            target.rotation_deg = lerp(self.from.rotation_deg, r);
        }
        done
    }
}

/// Every tween currently targeting the blob, stepped in start order.
/// Later tweens win on channels they share with earlier ones.
pub struct Tweener {
    tweens: Vec<Tween>,
    next_id: u64,
    completed: Vec<TweenId>,
}

impl Tweener {
    pub fn new() -> Self {
        Self {
            tweens: Vec::with_capacity(4),
            next_id: 0,
            completed: Vec::with_capacity(4),
        }
    }

    /// Start a tween from `current` toward `props`.
    pub fn to(&mut self, current: Transform, props: TweenProps, duration: f32, ease: Ease) -> TweenId {
        let id = TweenId(self.next_id);
        self.next_id += 1;
        self.tweens.push(Tween {
            id,
            from: current,
            to: props,
            duration: duration.max(0.0),
            elapsed: 0.0,
            ease,
        });
        id
    }

    /// Cancel every tween. Cancelled tweens never report completion.
    pub fn kill_all(&mut self) {
        if !self.tweens.is_empty() {
            log::debug!("Killing {} tween(s)", self.tweens.len());
        }
        self.tweens.clear();
    }

    /// Step all tweens by `dt` seconds and write into `target`.
    /// Returns the ids of tweens that finished during this step.
    pub fn advance(&mut self, dt: f32, target: &mut Transform) -> &[TweenId] {
        self.completed.clear();
        for tween in &mut self.tweens {
            tween.elapsed += dt;
            if tween.apply(target) {
                self.completed.push(tween.id);
            }
        }
        let completed = &self.completed;
        self.tweens.retain(|t| !completed.contains(&t.id));
        &self.completed
    }

    pub fn is_active(&self, id: TweenId) -> bool {
        self.tweens.iter().any(|t| t.id == id)
    }

    pub fn active_count(&self) -> usize {
        self.tweens.len()
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;

    #[test]
    fn eases_hit_their_endpoints() {
        for ease in [
            Ease::SineInOut,
            Ease::Power1InOut,
            Ease::Power1Out,
            Ease::Power2Out,
        ] {
            assert!(ease.apply(0.0).abs() < 1e-6, "{ease:?}");
            assert!((ease.apply(1.0) - 1.0).abs() < 1e-6, "{ease:?}");
        }
        assert!((Ease::SineInOut.apply(0.5) - 0.5).abs() < 1e-6);
        // Decelerating curves run ahead of a straight line early on.
        assert!(Ease::Power2Out.apply(0.25) > 0.25);
        assert!(Ease::Power1Out.apply(0.25) > 0.25);
    }

    #[test]
    fn tween_lands_exactly_and_reports_once() {
        let mut tweener = Tweener::new();
        let mut tf = Transform::at(Vec2::ZERO);
        let id = tweener.to(tf, TweenProps::full(100.0, 50.0, 10.0), 1.0, Ease::SineInOut);

        assert!(tweener.advance(0.5, &mut tf).is_empty());
        assert!((tf.pos.x - 50.0).abs() < 1e-3);
        assert!(tweener.is_active(id));

        assert_eq!(tweener.advance(0.6, &mut tf), &[id]);
        assert_eq!(tf.pos, Vec2::new(100.0, 50.0));
        assert_eq!(tf.rotation_deg, 10.0);
        assert_eq!(tweener.active_count(), 0);

        assert!(tweener.advance(1.0, &mut tf).is_empty());
    }

    #[test]
    fn untouched_channels_are_preserved() {
        let mut tweener = Tweener::new();
        let mut tf = Transform {
            pos: Vec2::new(5.0, 6.0),
            rotation_deg: 20.0,
        };
        tweener.to(tf, TweenProps::rotation(0.0), 1.0, Ease::Power1InOut);
        tweener.advance(2.0, &mut tf);
        assert_eq!(tf.pos, Vec2::new(5.0, 6.0));
        assert_eq!(tf.rotation_deg, 0.0);
    }

    #[test]
    fn killed_tweens_never_complete() {
        let mut tweener = Tweener::new();
        let mut tf = Transform::at(Vec2::ZERO);
        tweener.to(tf, TweenProps::position(10.0, 10.0), 1.0, Ease::Power1Out);
        tweener.kill_all();
        assert!(tweener.advance(5.0, &mut tf).is_empty());
        assert_eq!(tf.pos, Vec2::ZERO);
    }

    #[test]
    fn zero_duration_completes_on_next_step() {
        let mut tweener = Tweener::new();
        let mut tf = Transform::at(Vec2::ZERO);
        let id = tweener.to(tf, TweenProps::position(3.0, 4.0), 0.0, Ease::Power1Out);
        assert_eq!(tweener.advance(0.0, &mut tf), &[id]);
        assert_eq!(tf.pos, Vec2::new(3.0, 4.0));
    }
}
