use bytemuck::{Pod, Zeroable};

use crate::motion::{ElementSize, Transform, Viewport};

/// Per-instance data uploaded to GPU each frame.
/// Stride = 20 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SpriteInstance {
    /// Centre of the sprite in screen pixels.
    pub center: [f32; 2],
    /// Width and height in pixels.
    pub size: [f32; 2],
    /// Clockwise rotation in radians.
    pub rotation: f32,
}

impl SpriteInstance {
    /// The blob: transform is top-left translation, rotation about the centre.
    pub fn from_transform(tf: Transform, size: ElementSize) -> Self {
        let half = size.as_vec2() * 0.5;
        Self {
            center: (tf.pos + half).into(),
            size: [size.width, size.height],
            rotation: tf.rotation_deg.to_radians(),
        }
    }

    /// A sprite stretched over the whole window.
    pub fn fullscreen(viewport: Viewport) -> Self {
        Self {
            center: viewport.center().into(),
            size: [viewport.width, viewport.height],
            rotation: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;

    #[test]
    fn blob_instance_is_centred_on_element() {
        let tf = Transform {
            pos: Vec2::new(20.0, 40.0),
            rotation_deg: 180.0,
        };
        let inst = SpriteInstance::from_transform(tf, ElementSize::new(100.0, 60.0));
        assert_eq!(inst.center, [70.0, 70.0]);
        assert_eq!(inst.size, [100.0, 60.0]);
        assert!((inst.rotation - std::f32::consts::PI).abs() < 1e-6);
        assert_eq!(std::mem::size_of::<SpriteInstance>(), 20);
    }
}
