use glam::Vec2;
use thiserror::Error;

use crate::config::MotionConfig;

/// Window inner size in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }
}

/// Rendered size of the blob in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementSize {
    pub width: f32,
    pub height: f32,
}

impl ElementSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn as_vec2(self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

/// Current transform of the blob. `pos` is the top-left corner translation,
/// rotation is around the element centre, in degrees (clockwise on screen).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub pos: Vec2,
    pub rotation_deg: f32,
}

impl Transform {
    pub fn at(pos: Vec2) -> Self {
        Self {
            pos,
            rotation_deg: 0.0,
        }
    }
}

/// Where a move should end up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveTarget {
    pub pos: Vec2,
    pub rotation_deg: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum MotionError {
    #[error("viewport {width}x{height} too small for a {element_w}x{element_h} blob with padding")]
    ViewportTooSmall {
        width: f32,
        height: f32,
        element_w: f32,
        element_h: f32,
    },
    #[error("blob transform is not finite: ({x}, {y})")]
    NonFinite { x: f32, y: f32 },
}

/// Allowed range for the blob's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
    viewport: Viewport,
    element: ElementSize,
}

impl Bounds {
    pub fn new(viewport: Viewport, element: ElementSize, padding: f32) -> Self {
        Self {
            min: Vec2::splat(padding),
            max: Vec2::new(
                viewport.width - element.width - padding,
                viewport.height - element.height - padding,
            ),
            viewport,
            element,
        }
    }

    /// True when the window is too small to fit the blob plus padding.
    pub fn is_degenerate(&self) -> bool {
        self.max.x < self.min.x || self.max.y < self.min.y
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Clamp into range. On a degenerate axis the lower edge wins.
    pub fn clamp(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            p.x.min(self.max.x).max(self.min.x),
            p.y.min(self.max.y).max(self.min.y),
        )
    }

    fn check(&self) -> Result<(), MotionError> {
        if self.is_degenerate() {
            return Err(MotionError::ViewportTooSmall {
                width: self.viewport.width,
                height: self.viewport.height,
                element_w: self.element.width,
                element_h: self.element.height,
            });
        }
        Ok(())
    }
}

/// Uniform sample in [lo, hi].
pub fn random_range(rng: &mut fastrand::Rng, (lo, hi): (f32, f32)) -> f32 {
    lo + rng.f32() * (hi - lo)
}

/// Initial placement: the blob sits dead centre.
pub fn centered(viewport: Viewport, element: ElementSize) -> Vec2 {
    (Vec2::new(viewport.width, viewport.height) - element.as_vec2()) * 0.5
}

/// Pick the next wander destination.
pub fn wander_target(
    rng: &mut fastrand::Rng,
    bounds: &Bounds,
    cfg: &MotionConfig,
) -> Result<MoveTarget, MotionError> {
    bounds.check()?;
    Ok(MoveTarget {
        pos: Vec2::new(
            random_range(rng, (bounds.min.x, bounds.max.x)),
            random_range(rng, (bounds.min.y, bounds.max.y)),
        ),
        rotation_deg: random_range(rng, cfg.wander_rotation),
    })
}

pub fn wander_duration(rng: &mut fastrand::Rng, cfg: &MotionConfig) -> f32 {
    random_range(rng, cfg.wander_duration)
}

/// Direction the blob flees in: away from the viewport centre. A blob
/// sitting exactly on the centre flees to the right.
pub fn flee_direction(current: Vec2, viewport: Viewport) -> Vec2 {
    let away = current - viewport.center();
    let len = away.length();
    if len > 0.0 {
        away / len
    } else {
        Vec2::X
    }
}

/// Pick the flee destination from the current position.
pub fn flee_target(
    rng: &mut fastrand::Rng,
    current: Vec2,
    viewport: Viewport,
    bounds: &Bounds,
    cfg: &MotionConfig,
) -> Result<MoveTarget, MotionError> {
    if !current.is_finite() {
        return Err(MotionError::NonFinite {
            x: current.x,
            y: current.y,
        });
    }
    bounds.check()?;

    let raw = current + flee_direction(current, viewport) * cfg.flee_distance;
    Ok(MoveTarget {
        pos: bounds.clamp(raw),
        rotation_deg: random_range(rng, cfg.flee_rotation),
    })
}

/// After a resize, where the blob has to move to be back in range.
/// Only overflow past the far edges is corrected; `None` means leave it be.
pub fn resize_correction(current: Vec2, bounds: &Bounds) -> Option<Vec2> {
    if bounds.is_degenerate() {
        return None;
    }
    if current.x > bounds.max.x || current.y > bounds.max.y {
        Some(current.min(bounds.max))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> (Viewport, ElementSize, Bounds) {
        let viewport = Viewport::new(800.0, 600.0);
        let element = ElementSize::new(100.0, 100.0);
        (viewport, element, Bounds::new(viewport, element, 20.0))
    }

    #[test]
    fn bounds_for_800x600() {
        let (_, _, bounds) = scenario();
        assert_eq!(bounds.min, Vec2::new(20.0, 20.0));
        assert_eq!(bounds.max, Vec2::new(680.0, 480.0));
        assert!(!bounds.contains(Vec2::new(700.0, 500.0)));
        assert_eq!(bounds.clamp(Vec2::new(700.0, 500.0)), Vec2::new(680.0, 480.0));
    }

    #[test]
    fn wander_targets_stay_in_bounds() {
        let (_, _, bounds) = scenario();
        let cfg = MotionConfig::default();
        let mut rng = fastrand::Rng::with_seed(7);
        for _ in 0..2000 {
            let t = wander_target(&mut rng, &bounds, &cfg).unwrap();
            assert!(bounds.contains(t.pos), "{:?}", t.pos);
            assert!((-15.0..=15.0).contains(&t.rotation_deg));
            let d = wander_duration(&mut rng, &cfg);
            assert!((5.0..=8.0).contains(&d));
        }
    }

    #[test]
    fn flee_targets_are_clamped() {
        let (viewport, _, bounds) = scenario();
        let cfg = MotionConfig::default();
        let mut rng = fastrand::Rng::with_seed(11);
        // Near a corner the raw 300px vector leaves the window.
        for start in [
            Vec2::new(20.0, 20.0),
            Vec2::new(680.0, 480.0),
            Vec2::new(600.0, 30.0),
            Vec2::new(21.0, 470.0),
        ] {
            let t = flee_target(&mut rng, start, viewport, &bounds, &cfg).unwrap();
            assert!(bounds.contains(t.pos), "{start:?} -> {:?}", t.pos);
            assert!((-30.0..=30.0).contains(&t.rotation_deg));
        }
    }

    #[test]
    fn flee_from_exact_centre_goes_right() {
        let (viewport, _, bounds) = scenario();
        let cfg = MotionConfig::default();
        let mut rng = fastrand::Rng::with_seed(3);
        let start = viewport.center();
        assert_eq!(flee_direction(start, viewport), Vec2::X);

        let t = flee_target(&mut rng, start, viewport, &bounds, &cfg).unwrap();
        assert!(t.pos.is_finite());
        assert!(bounds.contains(t.pos));
        assert_eq!(t.pos, Vec2::new(680.0, 300.0));
    }

    #[test]
    fn flee_direction_is_unit_length() {
        let viewport = Viewport::new(800.0, 600.0);
        let dir = flee_direction(Vec2::new(100.0, 500.0), viewport);
        assert!((dir.length() - 1.0).abs() < 1e-5);
        assert!(dir.x < 0.0 && dir.y > 0.0);
    }

    #[test]
    fn tiny_viewport_is_an_error_not_a_panic() {
        let viewport = Viewport::new(120.0, 600.0);
        let element = ElementSize::new(100.0, 100.0);
        let bounds = Bounds::new(viewport, element, 20.0);
        let cfg = MotionConfig::default();
        let mut rng = fastrand::Rng::with_seed(1);
        assert!(bounds.is_degenerate());
        assert!(matches!(
            wander_target(&mut rng, &bounds, &cfg),
            Err(MotionError::ViewportTooSmall { .. })
        ));
        assert!(flee_target(&mut rng, Vec2::ZERO, viewport, &bounds, &cfg).is_err());
        assert_eq!(resize_correction(Vec2::new(500.0, 10.0), &bounds), None);
    }

    #[test]
    fn non_finite_position_is_rejected() {
        let (viewport, _, bounds) = scenario();
        let cfg = MotionConfig::default();
        let mut rng = fastrand::Rng::with_seed(1);
        let err = flee_target(&mut rng, Vec2::new(f32::NAN, 0.0), viewport, &bounds, &cfg);
        assert!(matches!(err, Err(MotionError::NonFinite { .. })));
    }

    #[test]
    fn resize_correction_only_pulls_back_overflow() {
        let (_, _, bounds) = scenario();
        assert_eq!(resize_correction(Vec2::new(100.0, 100.0), &bounds), None);
        assert_eq!(
            resize_correction(Vec2::new(900.0, 100.0), &bounds),
            Some(Vec2::new(680.0, 100.0))
        );
        assert_eq!(
            resize_correction(Vec2::new(100.0, 550.0), &bounds),
            Some(Vec2::new(100.0, 480.0))
        );
        // Already corrected: second pass is a no-op.
        let fixed = resize_correction(Vec2::new(900.0, 900.0), &bounds).unwrap();
        assert_eq!(resize_correction(fixed, &bounds), None);
    }

    #[test]
    fn centred_start() {
        let (viewport, element, _) = scenario();
        assert_eq!(centered(viewport, element), Vec2::new(350.0, 250.0));
    }
}
