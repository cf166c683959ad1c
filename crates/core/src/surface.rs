use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::geom::Aabb;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceKind {
    Ground,
    Platform,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Result<Self> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(CoreError::InvalidViewport { width, height });
        }
        Ok(Self { width, height })
    }
}

/// Placement rule re-applied on every resize.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Anchor {
    /// Spans the viewport width, bottom edge flush with the viewport bottom.
    FullWidth { height: f32 },
    /// Fixed x and size; y measured upward from the viewport bottom.
    FromBottom { x: f32, rise: f32, width: f32, height: f32 },
}

impl Anchor {
    pub fn resolve(&self, vp: Viewport) -> Aabb {
        match *self {
            Anchor::FullWidth { height } => {
                Aabb::from_size(vp.width * 0.5, vp.height - height * 0.5, vp.width, height)
            }
            Anchor::FromBottom { x, rise, width, height } => {
                Aabb::from_size(x, vp.height - rise, width, height)
            }
        }
    }
}

/// A static rectangle the player can stand on.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Surface {
    pub kind: SurfaceKind,
    pub aabb: Aabb,
    pub fill_color: u32,
    pub anchor: Anchor,
}

impl Surface {
    pub fn new(kind: SurfaceKind, anchor: Anchor, fill_color: u32, vp: Viewport) -> Result<Self> {
        let aabb = anchor.resolve(vp);
        check_extents(kind, aabb.half)?;
        Ok(Self { kind, aabb, fill_color, anchor })
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.aabb.top()
    }

    /// Strictly inside the horizontal extent.
    #[inline]
    pub fn spans_x(&self, x: f32) -> bool {
        self.aabb.left() < x && x < self.aabb.right()
    }

    /// Re-place after a viewport change. Returns true if the box moved or resized.
    pub fn relayout(&mut self, vp: Viewport) -> Result<bool> {
        let aabb = self.anchor.resolve(vp);
        check_extents(self.kind, aabb.half)?;
        let changed = aabb != self.aabb;
        self.aabb = aabb;
        Ok(changed)
    }
}

fn check_extents(kind: SurfaceKind, half: Vec2) -> Result<()> {
    let ok = |v: f32| v.is_finite() && v > 0.0;
    if ok(half.x) && ok(half.y) {
        Ok(())
    } else {
        Err(CoreError::InvalidSurfaceConfiguration {
            kind,
            half_width: half.x,
            half_height: half.y,
        })
    }
}

pub const GROUND_COLOR: u32 = 0x00_ff_00;
pub const PLATFORM_COLOR: u32 = 0x00_00_ff;

/// Ground plus the two platforms of the demo level.
pub fn demo_layout(vp: Viewport) -> Result<Vec<Surface>> {
    Ok(vec![
        Surface::new(SurfaceKind::Ground, Anchor::FullWidth { height: 40.0 }, GROUND_COLOR, vp)?,
        Surface::new(
            SurfaceKind::Platform,
            Anchor::FromBottom { x: 300.0, rise: 100.0, width: 200.0, height: 20.0 },
            PLATFORM_COLOR,
            vp,
        )?,
        Surface::new(
            SurfaceKind::Platform,
            Anchor::FromBottom { x: 600.0, rise: 200.0, width: 200.0, height: 20.0 },
            PLATFORM_COLOR,
            vp,
        )?,
    ])
}
